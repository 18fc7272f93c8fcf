use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Action priority, ordered so the report level is always the maximum of
/// its actions' priorities.
#[derive(
    Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq, PartialOrd, Ord,
)]
#[serde(rename_all = "lowercase")]
pub enum Priority {
    Low,
    Medium,
    High,
    Critical,
}

impl Priority {
    pub fn as_str(&self) -> &'static str {
        match self {
            Priority::Low => "low",
            Priority::Medium => "medium",
            Priority::High => "high",
            Priority::Critical => "critical",
        }
    }

    /// Lossy parse for model output: anything unrecognized lands on Medium
    /// so a garbled priority string never sinks the whole payload.
    pub fn from_name(name: &str) -> Self {
        match name.trim().to_lowercase().as_str() {
            "low" => Priority::Low,
            "medium" => Priority::Medium,
            "high" => Priority::High,
            "critical" => Priority::Critical,
            _ => Priority::Medium,
        }
    }
}

/// How a report was produced. AiFallback marks reports the AI generator
/// delegated to the rule table when the completion service was unusable.
#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum GenerationMethod {
    Classic,
    Ai,
    AiFallback,
}

impl GenerationMethod {
    pub fn as_str(&self) -> &'static str {
        match self {
            GenerationMethod::Classic => "classic",
            GenerationMethod::Ai => "ai",
            GenerationMethod::AiFallback => "ai_fallback",
        }
    }
}

#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct RecommendationAction {
    pub title: String,
    pub description: String,
    pub priority: Priority,
    pub category: String,
    /// Set by the focused enrichment pass ("focused_cpu", ...).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub source: Option<String>,
}

impl RecommendationAction {
    pub fn new(
        title: impl Into<String>,
        description: impl Into<String>,
        priority: Priority,
        category: impl Into<String>,
    ) -> Self {
        Self {
            title: title.into(),
            description: description.into(),
            priority,
            category: category.into(),
            source: None,
        }
    }
}

/// Recommendation report, one per snapshot (upsert keyed by snapshot).
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct RecommendationReport {
    pub snapshot_id: Uuid,
    pub generated_at: DateTime<Utc>,
    pub executive_summary: String,
    pub detailed_analysis: String,
    pub actions: Vec<RecommendationAction>,
    pub priority_level: Priority,
    pub estimated_impact: String,
    pub implementation_timeframe: String,
    pub method: GenerationMethod,
}

impl RecommendationReport {
    pub fn action_count(&self) -> usize {
        self.actions.len()
    }

    pub fn is_urgent(&self) -> bool {
        self.priority_level >= Priority::High
    }
}
