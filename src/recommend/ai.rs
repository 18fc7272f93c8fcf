/*
* AI recommendation generator
* ---------------------------
* Requests one primary structured recommendation payload from the
* completion service, backfills whatever fields the model forgot, then
* optionally enriches the result with a focused sub-analysis of the most
* critical area. Specialized variants exist for focused, capacity,
* emergency and maintenance analyses. Every path has a deterministic
* fallback; this generator never returns nothing.
*/

use serde_json::Value;
use std::sync::Arc;
use tracing::{error, info, warn};

use crate::config::RuleSettings;
use crate::core::{
    GenerationMethod, MetricsSnapshot, Priority, RecommendationAction, RecommendationReport,
};
use crate::errors::StoreError;
use crate::llm::{parse_payload, system_message, user_message, Completions};
use crate::storage::ResultStore;

use super::prompts;
use super::{FocusArea, RecommendationPayload, ReportBatchStats, RuleBasedGenerator};

pub struct AiRecommendationGenerator {
    client: Arc<dyn Completions>,
    store: Arc<dyn ResultStore>,
    rules: RuleBasedGenerator,
}

impl AiRecommendationGenerator {
    pub fn new(
        rule_settings: RuleSettings,
        client: Arc<dyn Completions>,
        store: Arc<dyn ResultStore>,
    ) -> Self {
        Self {
            client,
            store: store.clone(),
            rules: RuleBasedGenerator::new(rule_settings, store),
        }
    }

    pub fn is_available(&self) -> bool {
        self.client.is_reachable()
    }

    /// One completion round trip through the robustness layer. None means
    /// the service itself failed; a degraded parse still yields a value.
    async fn call(&self, role: &str, expertise: &str, prompt: String) -> Option<Value> {
        let messages = [
            system_message(role, expertise, "structured JSON"),
            user_message(prompt),
        ];

        match self.client.complete(&messages).await {
            Ok(raw) => Some(parse_payload(&raw).value),
            Err(e) => {
                warn!("Recommendation completion call failed: {}", e);
                None
            }
        }
    }

    /// Converts a model payload into report fields, backfilling every
    /// missing or malformed field with its fixed default instead of
    /// failing the call.
    fn payload_from_value(value: &Value, method: GenerationMethod) -> RecommendationPayload {
        let executive_summary = non_empty_str(value, "executive_summary")
            .unwrap_or_else(|| "Recommendations generated by AI analysis.".to_string());
        let detailed_analysis = non_empty_str(value, "detailed_analysis")
            .unwrap_or_else(|| "Detailed analysis of system metrics.".to_string());
        let estimated_impact = non_empty_str(value, "estimated_impact")
            .unwrap_or_else(|| "Improved system performance".to_string());
        let implementation_timeframe = non_empty_str(value, "implementation_timeframe")
            .unwrap_or_else(|| "1-2 weeks".to_string());

        let actions: Vec<RecommendationAction> = value
            .get("recommendations")
            .and_then(Value::as_array)
            .map(|items| {
                items
                    .iter()
                    .filter(|item| item.is_object())
                    .map(|item| RecommendationAction {
                        title: non_empty_str(item, "title")
                            .unwrap_or_else(|| "Recommendation".to_string()),
                        description: non_empty_str(item, "description").unwrap_or_default(),
                        priority: item
                            .get("priority")
                            .and_then(Value::as_str)
                            .map(Priority::from_name)
                            .unwrap_or(Priority::Medium),
                        category: non_empty_str(item, "category")
                            .unwrap_or_else(|| "general".to_string()),
                        source: None,
                    })
                    .collect()
            })
            .unwrap_or_default();

        let declared = value
            .get("priority_level")
            .and_then(Value::as_str)
            .map(Priority::from_name)
            .unwrap_or(Priority::Medium);
        // The report level is never lower than any contained action.
        let max_action = actions.iter().map(|a| a.priority).max();
        let priority_level = max_action.map_or(declared, |m| declared.max(m));

        RecommendationPayload {
            executive_summary,
            detailed_analysis,
            actions,
            priority_level,
            estimated_impact,
            implementation_timeframe,
            method,
        }
    }

    /// Primary generation. Service unreachable or call failure delegates to
    /// the rule table, tagged as a fallback.
    pub async fn generate(
        &self,
        snapshot: &MetricsSnapshot,
        anomaly_summary: &str,
    ) -> RecommendationPayload {
        info!("Generating AI recommendations for snapshot {}", snapshot.id);

        if !self.is_available() {
            warn!("Completion service unavailable, using rule-based fallback");
            return self.fallback_from_rules(snapshot, anomaly_summary);
        }

        let value = self
            .call(
                "senior IT infrastructure optimization expert",
                "system analysis and performance recommendations",
                prompts::recommendation_prompt(snapshot, anomaly_summary),
            )
            .await;

        match value {
            Some(value) => {
                let payload = Self::payload_from_value(&value, GenerationMethod::Ai);
                self.enrich(payload, snapshot).await
            }
            None => {
                warn!("AI generation failed, using rule-based fallback");
                self.fallback_from_rules(snapshot, anomaly_summary)
            }
        }
    }

    fn fallback_from_rules(
        &self,
        snapshot: &MetricsSnapshot,
        anomaly_summary: &str,
    ) -> RecommendationPayload {
        let mut payload = self.rules.generate(snapshot, anomaly_summary);
        payload.method = GenerationMethod::AiFallback;
        payload
            .detailed_analysis
            .push_str(" (AI analysis temporarily unavailable)");
        payload
    }

    /// Domains currently in trouble, most critical first. Drives the
    /// focused enrichment pass.
    fn detect_critical_areas(snapshot: &MetricsSnapshot) -> Vec<FocusArea> {
        let mut areas = Vec::new();

        if snapshot.cpu_usage > 85.0 {
            areas.push(FocusArea::Cpu);
        }
        if snapshot.memory_usage > 85.0 {
            areas.push(FocusArea::Memory);
        }
        if snapshot.disk_usage > 85.0 {
            areas.push(FocusArea::Storage);
        }
        if snapshot.latency_ms > 500.0 {
            areas.push(FocusArea::Network);
        }
        if snapshot.has_degraded_services() {
            areas.push(FocusArea::Services);
        }

        areas
    }

    /// Appends at most two actions from a focused sub-analysis of the most
    /// critical area. Enrichment failure never degrades the primary result.
    async fn enrich(
        &self,
        mut payload: RecommendationPayload,
        snapshot: &MetricsSnapshot,
    ) -> RecommendationPayload {
        let areas = Self::detect_critical_areas(snapshot);
        let Some(&area) = areas.first() else {
            return payload;
        };

        if !self.is_available() {
            return payload;
        }

        let focused = self
            .call(
                &format!("{} optimization specialist", area.as_str()),
                area.description(),
                prompts::focused_prompt(snapshot, area),
            )
            .await;

        if let Some(value) = focused {
            let focused_payload = Self::payload_from_value(&value, GenerationMethod::Ai);
            for mut action in focused_payload.actions.into_iter().take(2) {
                action.source = Some(format!("focused_{}", area.as_str()));
                payload.actions.push(action);
            }
            payload
                .detailed_analysis
                .push_str(&format!(" Focused {} analysis included.", area.as_str()));
        }

        payload
    }

    /// Targeted single-domain analysis with its own deterministic fallback.
    pub async fn generate_focused(
        &self,
        snapshot: &MetricsSnapshot,
        area: FocusArea,
    ) -> RecommendationPayload {
        info!(
            "Generating focused {} recommendations for snapshot {}",
            area.as_str(),
            snapshot.id
        );

        if !self.is_available() {
            return Self::focused_fallback(area);
        }

        match self
            .call(
                &format!("{} optimization specialist", area.as_str()),
                area.description(),
                prompts::focused_prompt(snapshot, area),
            )
            .await
        {
            Some(value) => Self::payload_from_value(&value, GenerationMethod::Ai),
            None => Self::focused_fallback(area),
        }
    }

    /// Capacity projection over a given horizon, fallback included.
    pub async fn generate_capacity(
        &self,
        snapshot: &MetricsSnapshot,
        projection_days: u32,
    ) -> RecommendationPayload {
        info!("Generating capacity analysis for snapshot {}", snapshot.id);

        if !self.is_available() {
            return Self::capacity_fallback(projection_days);
        }

        match self
            .call(
                "capacity planning expert",
                "load forecasting and system sizing",
                prompts::capacity_planning_prompt(snapshot, projection_days),
            )
            .await
        {
            Some(value) => Self::payload_from_value(&value, GenerationMethod::Ai),
            None => Self::capacity_fallback(projection_days),
        }
    }

    /// Emergency response: whatever the model says, priority is forced to
    /// critical and the timeframe to immediate.
    pub async fn generate_emergency(
        &self,
        snapshot: &MetricsSnapshot,
        critical_issue: &str,
    ) -> RecommendationPayload {
        warn!("Generating emergency recommendations: {}", critical_issue);

        if !self.is_available() {
            return Self::emergency_fallback(critical_issue);
        }

        match self
            .call(
                "system emergency resolution expert",
                "critical intervention and stabilization",
                prompts::emergency_prompt(snapshot, critical_issue),
            )
            .await
        {
            Some(value) => {
                let mut payload = Self::payload_from_value(&value, GenerationMethod::Ai);
                payload.priority_level = Priority::Critical;
                payload.implementation_timeframe = "Immediate (< 30 min)".to_string();
                payload
            }
            None => Self::emergency_fallback(critical_issue),
        }
    }

    /// Maintenance plan for a given window, fallback included.
    pub async fn generate_maintenance(
        &self,
        snapshot: &MetricsSnapshot,
        maintenance_window: &str,
    ) -> RecommendationPayload {
        info!("Generating maintenance plan for snapshot {}", snapshot.id);

        if !self.is_available() {
            return Self::maintenance_fallback(maintenance_window);
        }

        match self
            .call(
                "system maintenance planner",
                "maintenance optimization and scheduling",
                prompts::maintenance_prompt(snapshot, maintenance_window),
            )
            .await
        {
            Some(value) => Self::payload_from_value(&value, GenerationMethod::Ai),
            None => Self::maintenance_fallback(maintenance_window),
        }
    }

    fn focused_fallback(area: FocusArea) -> RecommendationPayload {
        RecommendationPayload {
            executive_summary: format!(
                "{} analysis via classic method (AI unavailable)",
                area.as_str()
            ),
            detailed_analysis: format!("Baseline recommendations for {}", area.as_str()),
            actions: vec![RecommendationAction::new(
                format!("{} monitoring", area.as_str()),
                format!("Reinforced monitoring of {} metrics", area.as_str()),
                Priority::Medium,
                area.as_str(),
            )],
            priority_level: Priority::Medium,
            estimated_impact: "Moderate impact".to_string(),
            implementation_timeframe: "1 week".to_string(),
            method: GenerationMethod::AiFallback,
        }
    }

    fn capacity_fallback(projection_days: u32) -> RecommendationPayload {
        RecommendationPayload {
            executive_summary: format!(
                "Capacity analysis over {} days (classic method)",
                projection_days
            ),
            detailed_analysis: "Projection based on current metrics".to_string(),
            actions: vec![RecommendationAction::new(
                "Capacity monitoring",
                format!(
                    "Resource monitoring for a {} day projection",
                    projection_days
                ),
                Priority::Medium,
                "monitoring",
            )],
            priority_level: Priority::Medium,
            estimated_impact: "Prevents resource saturation".to_string(),
            implementation_timeframe: format!("{} days", projection_days),
            method: GenerationMethod::AiFallback,
        }
    }

    fn emergency_fallback(critical_issue: &str) -> RecommendationPayload {
        RecommendationPayload {
            executive_summary: format!("Emergency response: {}", critical_issue),
            detailed_analysis: "Emergency recommendations based on critical metrics".to_string(),
            actions: vec![
                RecommendationAction::new(
                    "Immediate investigation",
                    format!("Investigate and resolve: {}", critical_issue),
                    Priority::Critical,
                    "emergency",
                ),
                RecommendationAction::new(
                    "Reinforced monitoring",
                    "Continuous monitoring of critical metrics",
                    Priority::High,
                    "monitoring",
                ),
            ],
            priority_level: Priority::Critical,
            estimated_impact: "System stabilization".to_string(),
            implementation_timeframe: "Immediate".to_string(),
            method: GenerationMethod::AiFallback,
        }
    }

    fn maintenance_fallback(maintenance_window: &str) -> RecommendationPayload {
        RecommendationPayload {
            executive_summary: format!(
                "Maintenance plan for window: {}",
                maintenance_window
            ),
            detailed_analysis: "Standard maintenance checklist based on current metrics"
                .to_string(),
            actions: vec![RecommendationAction::new(
                "Standard maintenance",
                "Apply pending updates, validate backups and run post-maintenance checks",
                Priority::Medium,
                "maintenance",
            )],
            priority_level: Priority::Medium,
            estimated_impact: "Sustained system reliability".to_string(),
            implementation_timeframe: maintenance_window.to_string(),
            method: GenerationMethod::AiFallback,
        }
    }

    /// Upserts the report keyed by snapshot, tagged "ai" or the fallback
    /// tag when the rule table ran internally.
    pub async fn generate_report(
        &self,
        snapshot: &MetricsSnapshot,
    ) -> Result<RecommendationReport, StoreError> {
        let anomaly_summary = match self.store.detection_for(snapshot.id).await? {
            Some(detection) => detection.summary,
            None => "No anomalies detected".to_string(),
        };

        let payload = self.generate(snapshot, &anomaly_summary).await;
        let method = payload.method;
        let (report, created) = self
            .store
            .upsert_report(payload.into_report(snapshot.id))
            .await?;

        info!(
            "AI report ({}) {} for snapshot {}",
            method.as_str(),
            if created { "created" } else { "updated" },
            snapshot.id
        );
        Ok(report)
    }

    pub async fn generate_batch_reports(
        &self,
        snapshots: &[MetricsSnapshot],
    ) -> ReportBatchStats {
        let mut stats = ReportBatchStats {
            total: snapshots.len(),
            ..ReportBatchStats::default()
        };

        for snapshot in snapshots {
            match self.generate_report(snapshot).await {
                Ok(_) => stats.generated += 1,
                Err(e) => {
                    stats.failed += 1;
                    error!("AI report failed for {}: {}", snapshot.id, e);
                }
            }
        }

        info!(
            "AI batch reports done: {}/{} generated",
            stats.generated, stats.total
        );
        stats
    }
}

fn non_empty_str(value: &Value, key: &str) -> Option<String> {
    value
        .get(key)
        .and_then(Value::as_str)
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
}
