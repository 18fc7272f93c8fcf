//! Prompt builders for the three AI detection calls. Each prompt pins the
//! exact JSON shape the robustness layer expects back.

use serde_json::Value;

pub fn anomaly_detection_prompt(metrics_payload: &Value) -> String {
    format!(
        r#"You are an IT infrastructure expert. Analyze these system metrics for anomalies:

SYSTEM METRICS:
{metrics}

ANALYSIS MISSION:
1. Identify abnormal metrics with justifications
2. Assess the severity level (1-10)
3. Detect suspicious correlations between metrics
4. Estimate the performance impact
5. Determine the urgency of intervention

OPERATIONAL CONTEXT:
- Critical production infrastructure
- High availability required
- Proactive detection is the priority
- Minimal tolerance for outages

EXPECTED JSON RESPONSE:
{{
    "anomalies_detected": {{
        "cpu": boolean,
        "memory": boolean,
        "disk": boolean,
        "latency": boolean,
        "io": boolean,
        "error_rate": boolean,
        "temperature": boolean,
        "power": boolean,
        "services": boolean
    }},
    "severity_score": integer_between_1_and_10,
    "ai_confidence": float_between_0_and_1,
    "anomaly_explanations": ["explanation1", "explanation2"],
    "correlations_found": ["correlation1", "correlation2"],
    "risk_assessment": "main_risk_statement",
    "is_critical": boolean,
    "recommended_actions": ["action1", "action2"]
}}

IMPORTANT: Respond ONLY with the JSON, no other text."#,
        metrics = serde_json::to_string_pretty(metrics_payload).unwrap_or_default()
    )
}

pub fn severity_assessment_prompt(metrics_payload: &Value) -> String {
    format!(
        r#"Infrastructure expert, assess precisely the severity of this system situation:

FULL DATA:
{metrics}

EVALUATION CRITERIA:
1. Immediate user impact (0-3 points)
2. Cascade failure risk (0-2 points)
3. Progressive degradation vs outage (0-2 points)
4. Criticality of affected services (0-3 points)

RESPONSE JSON:
{{
    "severity_score": integer_1_to_10,
    "severity_justification": "detailed_explanation",
    "immediate_risk": boolean,
    "cascade_risk": boolean,
    "business_impact": "low|moderate|high|critical",
    "time_to_failure": "estimate_in_minutes_or_hours"
}}"#,
        metrics = serde_json::to_string_pretty(metrics_payload).unwrap_or_default()
    )
}

pub fn correlation_analysis_prompt(metrics_payload: &Value) -> String {
    format!(
        r#"Analyze the correlations and patterns in these system metrics:

METRICS:
{metrics}

REQUESTED ANALYSIS:
1. Strong correlations between metrics
2. Detected causal relationships
3. Abnormal behavior patterns
4. Missing correlations (expected but absent)

RESPONSE JSON:
{{
    "strong_correlations": [
        {{
            "metrics_pair": ["metric1", "metric2"],
            "correlation_strength": "strong|moderate|weak",
            "correlation_type": "positive|negative|causal",
            "explanation": "justification_of_the_correlation"
        }}
    ],
    "anomalous_patterns": ["pattern1", "pattern2"],
    "missing_correlations": ["expected_missing_correlation"],
    "insights": ["insight1", "insight2"]
}}"#,
        metrics = serde_json::to_string_pretty(metrics_payload).unwrap_or_default()
    )
}
