/*
* AI anomaly detector
* -------------------
* Issues up to three independent completion calls (detection, severity
* assessment, correlation analysis) and fuses them into one result. Any of
* the three may fail on its own without aborting the other two; only the
* base detection call is load-bearing. If it cannot be reached the run
* reports "strategy unavailable" so the caller can fall back to thresholds;
* if it answers with JSON that breaks the contract the run reports a
* processing failure instead.
*/

use serde::Deserialize;
use serde_json::{json, Value};
use std::sync::Arc;
use tracing::{error, info, warn};

use crate::core::{AnomalyFlags, AnomalyResult, MetricsSnapshot, Strategy};
use crate::errors::StoreError;
use crate::llm::{parse_payload, system_message, user_message, Completions};
use crate::storage::ResultStore;

use super::prompts;
use super::{AnalysisOutcome, BatchStats};

#[derive(Debug, Deserialize, Default)]
struct DetectedKeys {
    #[serde(default)]
    cpu: bool,
    #[serde(default)]
    memory: bool,
    #[serde(default)]
    disk: bool,
    #[serde(default)]
    latency: bool,
    #[serde(default)]
    io: bool,
    #[serde(default)]
    error_rate: bool,
    #[serde(default)]
    temperature: bool,
    #[serde(default)]
    power: bool,
    #[serde(default)]
    services: bool,
}

/// Call (1): the base detection payload.
#[derive(Debug, Deserialize, Default)]
struct DetectionCall {
    #[serde(default)]
    anomalies_detected: DetectedKeys,
    #[serde(default)]
    severity_score: Option<i64>,
    #[serde(default)]
    anomaly_explanations: Vec<String>,
    #[serde(default)]
    correlations_found: Vec<String>,
    #[serde(default)]
    risk_assessment: String,
    #[serde(default)]
    is_critical: bool,
    #[serde(default)]
    recommended_actions: Vec<String>,
}

/// Call (2): severity assessment. Its score overrides the base score.
#[derive(Debug, Deserialize, Default)]
struct SeverityCall {
    #[serde(default)]
    severity_score: Option<i64>,
    #[serde(default)]
    severity_justification: String,
    #[serde(default)]
    immediate_risk: bool,
    #[serde(default)]
    cascade_risk: bool,
    #[serde(default)]
    business_impact: Option<String>,
    #[serde(default)]
    time_to_failure: Option<String>,
}

#[derive(Debug, Deserialize, Default)]
struct CorrelationPair {
    #[serde(default)]
    metrics_pair: Vec<String>,
    #[serde(default)]
    explanation: String,
}

/// Call (3): correlation analysis, appended to the base result.
#[derive(Debug, Deserialize, Default)]
struct CorrelationCall {
    #[serde(default)]
    strong_correlations: Vec<CorrelationPair>,
    #[serde(default)]
    insights: Vec<String>,
}

/// The fused result of the up-to-three calls.
#[derive(Debug, Clone)]
pub struct MergedAnalysis {
    pub flags: AnomalyFlags,
    pub severity_score: u8,
    pub anomaly_explanations: Vec<String>,
    pub correlations_found: Vec<String>,
    pub risk_assessment: String,
    pub is_critical: bool,
    pub recommended_actions: Vec<String>,
    pub severity_justification: Option<String>,
    pub immediate_risk: bool,
    pub cascade_risk: bool,
    pub business_impact: Option<String>,
    pub time_to_failure: Option<String>,
    pub correlation_insights: Vec<String>,
}

/// Why a detection run produced no merged analysis.
#[derive(Debug)]
pub enum DetectFailure {
    /// Service unconfigured, transport failure, or an unusable base
    /// response. The caller should fall back to the classic strategy.
    Unavailable,
    /// The base call answered with structured JSON that does not match the
    /// detection contract. The model did respond; processing failed.
    Malformed(String),
}

pub struct AiAnomalyDetector {
    client: Arc<dyn Completions>,
    store: Arc<dyn ResultStore>,
}

impl AiAnomalyDetector {
    pub fn new(client: Arc<dyn Completions>, store: Arc<dyn ResultStore>) -> Self {
        Self { client, store }
    }

    pub fn is_available(&self) -> bool {
        self.client.is_reachable()
    }

    /// All snapshot fields plus the derived facts, as the prompt payload.
    fn metrics_payload(snapshot: &MetricsSnapshot) -> Value {
        json!({
            "timestamp": snapshot.timestamp.to_rfc3339(),
            "cpu_usage": snapshot.cpu_usage,
            "memory_usage": snapshot.memory_usage,
            "latency_ms": snapshot.latency_ms,
            "disk_usage": snapshot.disk_usage,
            "network_in_kbps": snapshot.network_in_kbps,
            "network_out_kbps": snapshot.network_out_kbps,
            "io_wait": snapshot.io_wait,
            "thread_count": snapshot.thread_count,
            "active_connections": snapshot.active_connections,
            "error_rate": snapshot.error_rate,
            "uptime_hours": snapshot.uptime_hours(),
            "temperature_celsius": snapshot.temperature_celsius,
            "power_consumption_watts": snapshot.power_consumption_watts,
            "service_status": snapshot.service_status,
            "has_degraded_services": snapshot.has_degraded_services(),
        })
    }

    /// One completion round trip parsed through the robustness layer. A
    /// transport failure or a fallback-tier parse both mean this sub-call
    /// produced nothing usable.
    async fn call_json(&self, prompt: String, analysis_type: &str) -> Option<Value> {
        let messages = [
            system_message(
                "IT infrastructure expert",
                "system analysis",
                "valid JSON only",
            ),
            user_message(prompt),
        ];

        let raw = match self.client.complete(&messages).await {
            Ok(raw) => raw,
            Err(e) => {
                warn!("Completion call for {} failed: {}", analysis_type, e);
                return None;
            }
        };

        let parsed = parse_payload(&raw);
        if !parsed.is_usable() {
            warn!("Unusable model response for {}", analysis_type);
            return None;
        }

        info!("AI {} call completed", analysis_type);
        Some(parsed.value)
    }

    /// Runs the three calls and merges whatever succeeded. Only the base
    /// detection call is load-bearing; its failure mode decides whether the
    /// strategy was unavailable or the payload was unprocessable.
    pub async fn detect(
        &self,
        snapshot: &MetricsSnapshot,
    ) -> Result<MergedAnalysis, DetectFailure> {
        if !self.is_available() {
            info!("Completion service not configured, AI analysis unavailable");
            return Err(DetectFailure::Unavailable);
        }

        let payload = Self::metrics_payload(snapshot);

        let base = self
            .call_json(prompts::anomaly_detection_prompt(&payload), "anomaly_detection")
            .await
            .ok_or(DetectFailure::Unavailable)?;
        let detection: DetectionCall = serde_json::from_value(base)
            .map_err(|e| DetectFailure::Malformed(format!("detection payload: {}", e)))?;

        let severity: Option<SeverityCall> = self
            .call_json(
                prompts::severity_assessment_prompt(&payload),
                "severity_assessment",
            )
            .await
            .and_then(|value| serde_json::from_value(value).ok());

        let correlation: Option<CorrelationCall> = self
            .call_json(
                prompts::correlation_analysis_prompt(&payload),
                "correlation_analysis",
            )
            .await
            .and_then(|value| serde_json::from_value(value).ok());

        Ok(Self::merge(detection, severity, correlation))
    }

    /// Fusion rule: the detection call is the base; a successful severity
    /// call overrides the score and adds its risk fields; a successful
    /// correlation call appends up to 3 formatted findings. Scores are
    /// clamped into [0,10] whatever the model claims.
    fn merge(
        detection: DetectionCall,
        severity: Option<SeverityCall>,
        correlation: Option<CorrelationCall>,
    ) -> MergedAnalysis {
        let keys = &detection.anomalies_detected;
        let flags = AnomalyFlags {
            cpu: keys.cpu,
            memory: keys.memory,
            latency: keys.latency,
            disk: keys.disk,
            io: keys.io,
            error_rate: keys.error_rate,
            temperature: keys.temperature,
            power: keys.power,
            service: keys.services,
        };

        let mut score = detection.severity_score;
        let mut merged = MergedAnalysis {
            flags,
            severity_score: 5,
            anomaly_explanations: detection.anomaly_explanations,
            correlations_found: detection.correlations_found,
            risk_assessment: detection.risk_assessment,
            is_critical: detection.is_critical,
            recommended_actions: detection.recommended_actions,
            severity_justification: None,
            immediate_risk: false,
            cascade_risk: false,
            business_impact: None,
            time_to_failure: None,
            correlation_insights: Vec::new(),
        };

        if let Some(assessment) = severity {
            if assessment.severity_score.is_some() {
                score = assessment.severity_score;
            }
            merged.severity_justification = Some(assessment.severity_justification);
            merged.immediate_risk = assessment.immediate_risk;
            merged.cascade_risk = assessment.cascade_risk;
            merged.business_impact = assessment.business_impact;
            merged.time_to_failure = assessment.time_to_failure;
        }

        if let Some(analysis) = correlation {
            let formatted: Vec<String> = analysis
                .strong_correlations
                .iter()
                .take(3)
                .map(|pair| {
                    let explanation = if pair.explanation.is_empty() {
                        "correlation detected"
                    } else {
                        pair.explanation.as_str()
                    };
                    format!("{}: {}", pair.metrics_pair.join(" & "), explanation)
                })
                .collect();
            merged.correlations_found.extend(formatted);
            merged.correlation_insights = analysis.insights;
        }

        // Default 5 when no call supplied a score.
        merged.severity_score = score.unwrap_or(5).clamp(0, 10) as u8;
        merged
    }

    /// Summary: risk statement, top-2 explanations, top-2 correlations.
    pub fn compose_summary(analysis: &MergedAnalysis) -> String {
        let mut parts = Vec::new();

        if !analysis.risk_assessment.trim().is_empty() {
            parts.push(format!("AI: {}", analysis.risk_assessment));
        }
        if !analysis.anomaly_explanations.is_empty() {
            parts.push(format!(
                "Details: {}",
                analysis.anomaly_explanations[..analysis.anomaly_explanations.len().min(2)]
                    .join("; ")
            ));
        }
        if !analysis.correlations_found.is_empty() {
            parts.push(format!(
                "Correlations: {}",
                analysis.correlations_found[..analysis.correlations_found.len().min(2)]
                    .join("; ")
            ));
        }

        if parts.is_empty() {
            return "AI analysis: no significant anomalies detected".to_string();
        }

        parts.join(" | ")
    }

    /// Full run: merged analysis, conversion to the detector-neutral shape,
    /// atomic persistence. StrategyUnavailable signals the caller to use
    /// the classic path instead.
    pub async fn analyze(
        &self,
        snapshot: &MetricsSnapshot,
    ) -> Result<AnalysisOutcome, StoreError> {
        info!("AI analysis of snapshot {}", snapshot.id);

        let analysis = match self.detect(snapshot).await {
            Ok(analysis) => analysis,
            Err(DetectFailure::Unavailable) => {
                info!("AI analysis unavailable for snapshot {}", snapshot.id);
                return Ok(AnalysisOutcome::StrategyUnavailable);
            }
            Err(DetectFailure::Malformed(reason)) => {
                warn!("AI analysis failed for snapshot {}: {}", snapshot.id, reason);
                return Ok(AnalysisOutcome::Failed(reason));
            }
        };

        let summary = Self::compose_summary(&analysis);
        let result = AnomalyResult::new(
            snapshot.id,
            analysis.flags,
            summary,
            analysis.severity_score,
            Strategy::Ai,
        );

        let anomalous = analysis.is_critical || analysis.flags.any();
        let stored = self.store.store_detection(result, anomalous).await?;

        info!(
            "AI analysis done for {} - score: {}",
            snapshot.id, analysis.severity_score
        );
        Ok(AnalysisOutcome::Completed(stored))
    }

    pub async fn analyze_batch(&self, snapshots: &[MetricsSnapshot]) -> BatchStats {
        let mut stats = BatchStats {
            total: snapshots.len(),
            ..BatchStats::default()
        };

        for snapshot in snapshots {
            match self.analyze(snapshot).await {
                Ok(AnalysisOutcome::Completed(result)) => {
                    stats.succeeded += 1;
                    if result.total_anomalies() > 0 {
                        stats.anomalies_found += 1;
                    }
                }
                Ok(AnalysisOutcome::Failed(reason)) => {
                    stats.failed += 1;
                    error!("Batch AI analysis failed for {}: {}", snapshot.id, reason);
                }
                Ok(AnalysisOutcome::StrategyUnavailable) => stats.failed += 1,
                Err(e) => {
                    stats.failed += 1;
                    error!("Batch AI analysis failed for {}: {}", snapshot.id, e);
                }
            }
        }

        info!(
            "AI batch analysis done: {}/{} succeeded",
            stats.succeeded, stats.total
        );
        stats
    }
}
