pub mod ai;
pub mod prompts;
pub mod rules;
pub mod service;

use chrono::Utc;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::core::{GenerationMethod, Priority, RecommendationAction, RecommendationReport};

pub use ai::AiRecommendationGenerator;
pub use rules::RuleBasedGenerator;
pub use service::RecommendationService;

/// Report fields before they are bound to a snapshot. Both generators and
/// every specialized AI variant produce this shape.
#[derive(Debug, Clone)]
pub struct RecommendationPayload {
    pub executive_summary: String,
    pub detailed_analysis: String,
    pub actions: Vec<RecommendationAction>,
    pub priority_level: Priority,
    pub estimated_impact: String,
    pub implementation_timeframe: String,
    pub method: GenerationMethod,
}

impl RecommendationPayload {
    pub fn into_report(self, snapshot_id: Uuid) -> RecommendationReport {
        RecommendationReport {
            snapshot_id,
            generated_at: Utc::now(),
            executive_summary: self.executive_summary,
            detailed_analysis: self.detailed_analysis,
            actions: self.actions,
            priority_level: self.priority_level,
            estimated_impact: self.estimated_impact,
            implementation_timeframe: self.implementation_timeframe,
            method: self.method,
        }
    }
}

/// Domains a focused sub-analysis can target.
#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum FocusArea {
    Cpu,
    Memory,
    Storage,
    Network,
    Services,
}

impl FocusArea {
    pub fn as_str(&self) -> &'static str {
        match self {
            FocusArea::Cpu => "cpu",
            FocusArea::Memory => "memory",
            FocusArea::Storage => "storage",
            FocusArea::Network => "network",
            FocusArea::Services => "services",
        }
    }

    pub fn description(&self) -> &'static str {
        match self {
            FocusArea::Cpu => "CPU and processor performance optimization",
            FocusArea::Memory => "system memory management and optimization",
            FocusArea::Network => "network optimization and latency reduction",
            FocusArea::Storage => "storage management and disk I/O",
            FocusArea::Services => "service stabilization and optimization",
        }
    }
}

#[derive(Debug, Serialize, Deserialize, Clone, Copy, Default, PartialEq, Eq)]
pub struct ReportBatchStats {
    pub total: usize,
    pub generated: usize,
    pub failed: usize,
}
