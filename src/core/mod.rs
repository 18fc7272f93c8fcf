pub mod anomaly;
pub mod report;
pub mod snapshot;

pub use anomaly::{AnomalyFlags, AnomalyResult, Strategy};
pub use report::{GenerationMethod, Priority, RecommendationAction, RecommendationReport};
pub use snapshot::{MetricsSnapshot, ServiceState};
