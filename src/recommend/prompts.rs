//! Prompt builders for the recommendation calls and their specialized
//! variants. Same discipline as the detection prompts: every request pins
//! the exact JSON shape expected back.

use crate::core::MetricsSnapshot;

use super::FocusArea;

/// Shape contract shared by every recommendation call.
pub fn json_contract() -> &'static str {
    r#"Respond ONLY in JSON with this exact structure:
{
  "executive_summary": "executive_summary_2_3_sentences",
  "detailed_analysis": "detailed_analysis_of_the_situation",
  "recommendations": [
    {
      "title": "recommendation_title",
      "description": "detailed_action_description",
      "priority": "low|medium|high|critical",
      "category": "performance|resources|network|storage|services|security|monitoring"
    }
  ],
  "priority_level": "overall_priority_low_medium_high_critical",
  "estimated_impact": "expected_impact_description",
  "implementation_timeframe": "realistic_estimate"
}"#
}

pub fn recommendation_prompt(snapshot: &MetricsSnapshot, anomaly_summary: &str) -> String {
    format!(
        r#"Analyze these infrastructure metrics and generate specific optimization recommendations:

CURRENT SYSTEM METRICS:
- CPU: {cpu}% (attention threshold: >80%, critical: >95%)
- Memory: {memory}% (attention threshold: >85%, critical: >95%)
- Latency: {latency}ms (attention threshold: >300ms, critical: >1000ms)
- Disk: {disk}% (attention threshold: >85%, critical: >95%)
- I/O Wait: {io_wait}% (attention threshold: >20%)
- Threads: {threads} active threads
- Connections: {connections} active connections
- Error rate: {errors:.2}% (attention threshold: >1%, critical: >5%)
- Temperature: {temp}°C (attention threshold: >70°C, critical: >80°C)
- Power draw: {power}W
- Uptime: {uptime}h

SERVICE STATUS:
{services}

DETECTED ANOMALIES:
{anomalies}

OPERATIONAL CONTEXT:
- Critical production infrastructure
- High availability required (99.9%+)
- Optimization budget available
- Experienced technical team
- Limited maintenance windows

PRIORITY OBJECTIVES:
1. Guarantee stability and performance
2. Prevent outages and degradations
3. Optimize resource utilization
4. Improve monitoring and observability
5. Plan for scaling

Provide specific, prioritized, actionable recommendations for this infrastructure.

{contract}"#,
        cpu = snapshot.cpu_usage,
        memory = snapshot.memory_usage,
        latency = snapshot.latency_ms,
        disk = snapshot.disk_usage,
        io_wait = snapshot.io_wait,
        threads = snapshot.thread_count,
        connections = snapshot.active_connections,
        errors = snapshot.error_rate * 100.0,
        temp = snapshot.temperature_celsius,
        power = snapshot.power_consumption_watts,
        uptime = snapshot.uptime_hours(),
        services = serde_json::to_string_pretty(&snapshot.service_status).unwrap_or_default(),
        anomalies = anomaly_summary,
        contract = json_contract(),
    )
}

pub fn focused_prompt(snapshot: &MetricsSnapshot, area: FocusArea) -> String {
    format!(
        r#"Expert in {focus_desc}, analyze these metrics and provide targeted recommendations:

ANALYSIS FOCUS: {focus_upper}

RELEVANT METRICS:
- CPU: {cpu}%
- Memory: {memory}%
- Latency: {latency}ms
- I/O Wait: {io_wait}%
- Degraded services: {degraded}

SPECIFIC REQUEST:
Focus exclusively on {focus_desc}. Provide 3-5 very specific, technical
recommendations for this domain only.

Ignore all other system aspects and detail precisely:
1. The problem identified in this domain
2. The recommended technical solution
3. Concrete implementation steps
4. The metrics to watch to validate the improvement

{contract}"#,
        focus_desc = area.description(),
        focus_upper = area.as_str().to_uppercase(),
        cpu = snapshot.cpu_usage,
        memory = snapshot.memory_usage,
        latency = snapshot.latency_ms,
        io_wait = snapshot.io_wait,
        degraded = snapshot.degraded_services().len(),
        contract = json_contract(),
    )
}

pub fn capacity_planning_prompt(snapshot: &MetricsSnapshot, projection_days: u32) -> String {
    format!(
        r#"Capacity planning expert, analyze these metrics to anticipate future needs:

CURRENT BASELINE METRICS:
- CPU: {cpu}%
- Memory: {memory}%
- Disk: {disk}%
- Connections: {connections}
- Uptime: {uptime}h

PROJECTION HORIZON: {days} days

MISSION:
1. Identify resources approaching saturation
2. Estimate expected growth from the metrics
3. Predict potential breaking points
4. Recommend preventive scaling actions

EXPECTED DELIVERABLES:
- Trend analysis for each critical resource
- Saturation forecasts (approximate dates)
- Sizing recommendations
- Preventive action plan

{contract}"#,
        cpu = snapshot.cpu_usage,
        memory = snapshot.memory_usage,
        disk = snapshot.disk_usage,
        connections = snapshot.active_connections,
        uptime = snapshot.uptime_hours(),
        days = projection_days,
        contract = json_contract(),
    )
}

pub fn emergency_prompt(snapshot: &MetricsSnapshot, critical_issue: &str) -> String {
    format!(
        r#"EMERGENCY SITUATION - IMMEDIATE INTERVENTION REQUIRED

IDENTIFIED CRITICAL PROBLEM:
{issue}

CRITICAL METRICS:
- CPU: {cpu}%
- Memory: {memory}%
- Disk: {disk}%
- Errors: {errors:.2}%
- Degraded services: {degraded}

EMERGENCY CONSTRAINTS:
- Production system with active users
- Risk of service unavailability
- Fast intervention needed (< 30 minutes)
- Avoid full shutdown if possible

PRIORITY REQUEST:
1. IMMEDIATE actions (< 5 min) to stabilize
2. URGENT actions (< 30 min) to resolve
3. FOLLOW-UP actions to prevent recurrence
4. Critical watch points

IMPORTANT: Prioritize stabilization over optimization.

{contract}"#,
        issue = critical_issue,
        cpu = snapshot.cpu_usage,
        memory = snapshot.memory_usage,
        disk = snapshot.disk_usage,
        errors = snapshot.error_rate * 100.0,
        degraded = snapshot.has_degraded_services(),
        contract = json_contract(),
    )
}

pub fn maintenance_prompt(snapshot: &MetricsSnapshot, maintenance_window: &str) -> String {
    format!(
        r#"Scheduled maintenance planning - system optimizations

AVAILABLE MAINTENANCE WINDOW:
{window}

CURRENT SYSTEM STATE:
- CPU: {cpu}%
- Memory: {memory}%
- Uptime: {uptime}h
- Active services: {service_count} services

MAINTENANCE OBJECTIVES:
1. Optimizations requiring restart/shutdown
2. System updates and patches
3. Data cleanup and consolidation
4. Performance and stress tests
5. Backup validation

CONSTRAINTS:
- Limited maintenance window duration
- Rollback procedures required
- Post-maintenance validation tests
- User communication required

Prioritize actions by impact/duration and provide a detailed execution plan.

{contract}"#,
        window = maintenance_window,
        cpu = snapshot.cpu_usage,
        memory = snapshot.memory_usage,
        uptime = snapshot.uptime_hours(),
        service_count = snapshot.service_status.len(),
        contract = json_contract(),
    )
}
