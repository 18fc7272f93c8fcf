pub mod ai;
pub mod prompts;
pub mod service;
pub mod threshold;

use serde::{Deserialize, Serialize};

use crate::core::AnomalyResult;

pub use ai::{AiAnomalyDetector, DetectFailure};
pub use service::{DetectionService, StrategyStatus};
pub use threshold::ThresholdDetector;

/// What one detection attempt produced. The boundary layer discriminates
/// "use the other strategy" (StrategyUnavailable) from "processing failed";
/// store faults travel separately as StoreError.
#[derive(Debug, Clone)]
pub enum AnalysisOutcome {
    Completed(AnomalyResult),
    StrategyUnavailable,
    Failed(String),
}

impl AnalysisOutcome {
    pub fn result(&self) -> Option<&AnomalyResult> {
        match self {
            AnalysisOutcome::Completed(result) => Some(result),
            _ => None,
        }
    }
}

/// Batch statistics, accumulated sequentially with continue-on-error
/// semantics: succeeded + failed == total always holds.
#[derive(Debug, Serialize, Deserialize, Clone, Copy, Default, PartialEq, Eq)]
pub struct BatchStats {
    pub total: usize,
    pub succeeded: usize,
    pub failed: usize,
    pub anomalies_found: usize,
}
