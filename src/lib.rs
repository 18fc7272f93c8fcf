pub mod analysis;
pub mod config;
pub mod core;
pub mod errors;
pub mod llm;
pub mod recommend;
pub mod storage;

// Re-exports
pub use analysis::{AnalysisOutcome, BatchStats, DetectionService};
pub use config::Settings;
pub use core::{AnomalyResult, MetricsSnapshot, RecommendationReport, Strategy};
pub use llm::{CompletionClient, Completions};
pub use recommend::RecommendationService;
pub use storage::{InMemoryStore, ResultStore};
