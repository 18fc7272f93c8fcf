use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::warn;
use uuid::Uuid;

/// The two interchangeable analysis strategies. Closed set so the selector
/// services can dispatch exhaustively instead of probing by name at runtime.
#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum Strategy {
    Classic,
    Ai,
}

impl Strategy {
    /// Resolves a strategy name, falling back to the classic detector for
    /// anything unrecognized.
    pub fn from_name(name: &str) -> Self {
        match name {
            "classic" => Strategy::Classic,
            "ai" | "llm" => Strategy::Ai,
            other => {
                warn!("Unknown strategy '{}', using 'classic'", other);
                Strategy::Classic
            }
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Strategy::Classic => "classic",
            Strategy::Ai => "ai",
        }
    }
}

/// The nine per-category anomaly flags shared by both detectors.
#[derive(Debug, Serialize, Deserialize, Clone, Copy, Default, PartialEq, Eq)]
pub struct AnomalyFlags {
    pub cpu: bool,
    pub memory: bool,
    pub latency: bool,
    pub disk: bool,
    pub io: bool,
    pub error_rate: bool,
    pub temperature: bool,
    pub power: bool,
    pub service: bool,
}

impl AnomalyFlags {
    pub fn count(&self) -> u32 {
        [
            self.cpu,
            self.memory,
            self.latency,
            self.disk,
            self.io,
            self.error_rate,
            self.temperature,
            self.power,
            self.service,
        ]
        .iter()
        .filter(|&&f| f)
        .count() as u32
    }

    pub fn any(&self) -> bool {
        self.count() > 0
    }
}

/// Result of one detection run. At most one per snapshot; re-analysis under
/// a different strategy replaces it.
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct AnomalyResult {
    pub snapshot_id: Uuid,
    pub detected_at: DateTime<Utc>,
    pub flags: AnomalyFlags,
    pub summary: String,
    pub severity_score: u8,
    pub strategy: Strategy,
}

impl AnomalyResult {
    pub fn new(
        snapshot_id: Uuid,
        flags: AnomalyFlags,
        summary: String,
        severity_score: u8,
        strategy: Strategy,
    ) -> Self {
        Self {
            snapshot_id,
            detected_at: Utc::now(),
            flags,
            summary,
            severity_score: severity_score.min(10),
            strategy,
        }
    }

    pub fn total_anomalies(&self) -> u32 {
        self.flags.count()
    }

    /// Severity 7 and up is treated as critical across the engine.
    pub fn is_critical(&self) -> bool {
        self.severity_score >= 7
    }
}
