/*
* Rule-based recommendation generator
* -----------------------------------
* A declarative rule table keyed by domain, each domain with a high and a
* critical threshold and a canned action for each tier. Deterministic, fast,
* and the permanent safety net underneath the AI generator.
*/

use std::sync::Arc;
use tracing::{error, info};

use crate::config::RuleSettings;
use crate::core::{
    GenerationMethod, MetricsSnapshot, Priority, RecommendationAction, RecommendationReport,
};
use crate::errors::StoreError;
use crate::storage::ResultStore;

use super::{RecommendationPayload, ReportBatchStats};

/// One domain's rule: tier thresholds plus a canned action per tier.
struct DomainRule {
    high_threshold: f64,
    critical_threshold: f64,
    high: TierAction,
    critical: TierAction,
}

struct TierAction {
    title: &'static str,
    description: &'static str,
    priority: Priority,
    category: &'static str,
}

impl DomainRule {
    /// Critical tier wins over high; values use >= comparisons.
    fn evaluate(&self, value: f64, unit: &str) -> Option<RecommendationAction> {
        let tier = if value >= self.critical_threshold {
            &self.critical
        } else if value >= self.high_threshold {
            &self.high
        } else {
            return None;
        };

        Some(RecommendationAction::new(
            tier.title,
            format!("{}{}. {}", value, unit, tier.description),
            tier.priority,
            tier.category,
        ))
    }
}

struct RuleTable {
    cpu: DomainRule,
    memory: DomainRule,
    disk: DomainRule,
    latency: DomainRule,
    temperature: DomainRule,
}

fn build_rule_table(settings: &RuleSettings) -> RuleTable {
    RuleTable {
        cpu: DomainRule {
            high_threshold: settings.cpu_high,
            critical_threshold: settings.cpu_critical,
            high: TierAction {
                title: "CPU optimization",
                description: "High CPU usage detected. Consider adding resources or optimizing processes.",
                priority: Priority::High,
                category: "performance",
            },
            critical: TierAction {
                title: "Critical CPU - immediate action",
                description: "Critical CPU usage. Immediate intervention required to avoid degradation.",
                priority: Priority::Critical,
                category: "performance",
            },
        },
        memory: DomainRule {
            high_threshold: settings.memory_high,
            critical_threshold: settings.memory_critical,
            high: TierAction {
                title: "Memory management",
                description: "High memory usage. Increase available RAM or optimize consumption.",
                priority: Priority::High,
                category: "resources",
            },
            critical: TierAction {
                title: "Critical memory",
                description: "Risk of memory exhaustion. Immediate RAM extension recommended.",
                priority: Priority::Critical,
                category: "resources",
            },
        },
        disk: DomainRule {
            high_threshold: settings.disk_high,
            critical_threshold: settings.disk_critical,
            high: TierAction {
                title: "Disk space management",
                description: "Low disk space. Clean up temporary files and plan an extension.",
                priority: Priority::High,
                category: "storage",
            },
            critical: TierAction {
                title: "Critical disk space",
                description: "Risk of disk saturation. Immediate extension or cleanup required.",
                priority: Priority::Critical,
                category: "storage",
            },
        },
        latency: DomainRule {
            high_threshold: settings.latency_high,
            critical_threshold: settings.latency_critical,
            high: TierAction {
                title: "Latency optimization",
                description: "High latency detected. Optimize queries and network connections.",
                priority: Priority::Medium,
                category: "network",
            },
            critical: TierAction {
                title: "Critical latency",
                description: "Excessive latency impacting users. Urgent network investigation.",
                priority: Priority::Critical,
                category: "network",
            },
        },
        temperature: DomainRule {
            high_threshold: settings.temperature_high,
            critical_threshold: settings.temperature_critical,
            high: TierAction {
                title: "Thermal management",
                description: "High temperature. Check ventilation and environment.",
                priority: Priority::Medium,
                category: "hardware",
            },
            critical: TierAction {
                title: "Critical overheating",
                description: "Overheating risk. Preventive shutdown and cooling inspection required.",
                priority: Priority::Critical,
                category: "hardware",
            },
        },
    }
}

pub struct RuleBasedGenerator {
    rules: RuleTable,
    store: Arc<dyn ResultStore>,
}

impl RuleBasedGenerator {
    pub fn new(settings: RuleSettings, store: Arc<dyn ResultStore>) -> Self {
        Self {
            rules: build_rule_table(&settings),
            store,
        }
    }

    /// Evaluates every rule against the snapshot and assembles the report
    /// fields. Always emits at least one action.
    pub fn generate(
        &self,
        snapshot: &MetricsSnapshot,
        anomaly_summary: &str,
    ) -> RecommendationPayload {
        info!("Generating rule-based recommendations for snapshot {}", snapshot.id);

        let mut actions = Vec::new();

        if let Some(action) = self.rules.cpu.evaluate(snapshot.cpu_usage, "% CPU") {
            actions.push(action);
        }
        if let Some(action) = self.rules.memory.evaluate(snapshot.memory_usage, "% memory") {
            actions.push(action);
        }
        if let Some(action) = self.rules.disk.evaluate(snapshot.disk_usage, "% disk") {
            actions.push(action);
        }
        if let Some(action) = self.rules.latency.evaluate(snapshot.latency_ms, "ms latency") {
            actions.push(action);
        }
        if let Some(action) = self
            .rules
            .temperature
            .evaluate(snapshot.temperature_celsius, "°C")
        {
            actions.push(action);
        }
        if let Some(action) = Self::evaluate_services(snapshot) {
            actions.push(action);
        }
        if let Some(action) = Self::evaluate_errors(snapshot.error_rate) {
            actions.push(action);
        }

        if actions.is_empty() {
            actions.push(RecommendationAction::new(
                "Continue monitoring",
                "Infrastructure stable. Keep proactive metric monitoring in place.",
                Priority::Low,
                "monitoring",
            ));
        }

        let priority_level = actions
            .iter()
            .map(|a| a.priority)
            .max()
            .unwrap_or(Priority::Low);

        Self::build_payload(actions, priority_level, anomaly_summary)
    }

    /// Any degraded service is a high-priority action, no tiers.
    fn evaluate_services(snapshot: &MetricsSnapshot) -> Option<RecommendationAction> {
        if !snapshot.has_degraded_services() {
            return None;
        }

        let degraded = snapshot.degraded_services();
        Some(RecommendationAction::new(
            "Degraded services detected",
            format!(
                "Services in degraded state: {}. Restart or investigation required.",
                degraded[..degraded.len().min(3)].join(", ")
            ),
            Priority::High,
            "services",
        ))
    }

    /// Two tiers for the error rate: >5% high, >1% medium.
    fn evaluate_errors(error_rate: f64) -> Option<RecommendationAction> {
        let error_percentage = error_rate * 100.0;

        if error_percentage > 5.0 {
            Some(RecommendationAction::new(
                "High error rate",
                format!(
                    "Error rate of {:.2}%. Log investigation and error fixing recommended.",
                    error_percentage
                ),
                Priority::High,
                "reliability",
            ))
        } else if error_percentage > 1.0 {
            Some(RecommendationAction::new(
                "Error monitoring",
                format!(
                    "Error rate of {:.2}%. Reinforced monitoring recommended.",
                    error_percentage
                ),
                Priority::Medium,
                "reliability",
            ))
        } else {
            None
        }
    }

    fn build_payload(
        actions: Vec<RecommendationAction>,
        priority_level: Priority,
        anomaly_summary: &str,
    ) -> RecommendationPayload {
        let action_count = actions.len();
        let critical_count = actions
            .iter()
            .filter(|a| a.priority == Priority::Critical)
            .count();

        let executive_summary = if critical_count > 0 {
            format!(
                "Critical analysis: {} critical issues among {} recommendations. Immediate action required.",
                critical_count, action_count
            )
        } else if priority_level == Priority::High {
            format!(
                "Attention: {} priority recommendations identified to optimize the infrastructure.",
                action_count
            )
        } else {
            format!(
                "Analysis identified {} improvement points to maintain performance.",
                action_count
            )
        };

        let summary_ref = if anomaly_summary.is_empty() {
            "No major anomalies"
        } else {
            anomaly_summary
        };
        let detailed_analysis = format!(
            "Analysis based on predefined business rules. Detected anomalies: {}. \
             The metrics reveal {} improvement areas across several system categories.",
            summary_ref, action_count
        );

        let implementation_timeframe = match priority_level {
            Priority::Critical => "Immediate (< 4h)",
            Priority::High => "1-3 days",
            Priority::Medium => "1-2 weeks",
            Priority::Low => "1 month",
        };

        RecommendationPayload {
            executive_summary,
            detailed_analysis,
            actions,
            priority_level,
            estimated_impact: "Improved system stability and performance".to_string(),
            implementation_timeframe: implementation_timeframe.to_string(),
            method: GenerationMethod::Classic,
        }
    }

    /// Pulls the stored anomaly summary (when present) and upserts the
    /// report keyed by snapshot.
    pub async fn generate_report(
        &self,
        snapshot: &MetricsSnapshot,
    ) -> Result<RecommendationReport, StoreError> {
        let anomaly_summary = match self.store.detection_for(snapshot.id).await? {
            Some(detection) => detection.summary,
            None => "No anomalies detected".to_string(),
        };

        let payload = self.generate(snapshot, &anomaly_summary);
        let (report, created) = self
            .store
            .upsert_report(payload.into_report(snapshot.id))
            .await?;

        info!(
            "Rule-based report {} for snapshot {}",
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
                    error!("Rule-based report failed for {}: {}", snapshot.id, e);
                }
            }
        }

        info!(
            "Rule-based batch reports done: {}/{} generated",
            stats.generated, stats.total
        );
        stats
    }
}
