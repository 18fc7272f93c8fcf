//! Strategy selector for anomaly detection. One façade bound to a strategy
//! at construction, exposing the per-snapshot and per-batch contract and
//! enforcing the re-analysis rule: results from different strategies never
//! coexist for one snapshot.

use serde::Serialize;
use std::sync::Arc;
use tracing::{error, info};

use crate::core::{MetricsSnapshot, Strategy};
use crate::errors::StoreError;
use crate::llm::Completions;
use crate::storage::ResultStore;

use super::{AiAnomalyDetector, AnalysisOutcome, BatchStats, ThresholdDetector};
use crate::config::{SeverityWeights, ThresholdSettings};

#[derive(Debug, Serialize, Clone, Copy)]
pub struct StrategyStatus {
    pub name: &'static str,
    pub available: bool,
}

pub struct DetectionService {
    strategy: Strategy,
    threshold: ThresholdDetector,
    ai: AiAnomalyDetector,
    store: Arc<dyn ResultStore>,
}

impl DetectionService {
    /// The service owns its injected completion client; detectors share it
    /// through the trait object.
    pub fn new(
        strategy: Strategy,
        thresholds: ThresholdSettings,
        weights: SeverityWeights,
        store: Arc<dyn ResultStore>,
        client: Arc<dyn Completions>,
    ) -> Self {
        Self {
            strategy,
            threshold: ThresholdDetector::new(thresholds, weights, store.clone()),
            ai: AiAnomalyDetector::new(client, store.clone()),
            store,
        }
    }

    pub fn strategy(&self) -> Strategy {
        self.strategy
    }

    pub fn describe(&self) -> StrategyStatus {
        StrategyStatus {
            name: self.strategy.as_str(),
            available: match self.strategy {
                Strategy::Classic => true,
                Strategy::Ai => self.ai.is_available(),
            },
        }
    }

    /// Per-snapshot analysis with the re-analysis rule: an existing result
    /// from the same strategy is returned unchanged (no duplicate record,
    /// no repeated external calls); an existing result from the other
    /// strategy is discarded before re-running.
    pub async fn analyze(
        &self,
        snapshot: &MetricsSnapshot,
    ) -> Result<AnalysisOutcome, StoreError> {
        if let Some(existing) = self.store.detection_for(snapshot.id).await? {
            if existing.strategy == self.strategy {
                info!(
                    "Snapshot {} already analyzed with '{}', returning existing result",
                    snapshot.id,
                    self.strategy.as_str()
                );
                return Ok(AnalysisOutcome::Completed(existing));
            }

            info!(
                "Snapshot {} switching strategy '{}' -> '{}', discarding old result",
                snapshot.id,
                existing.strategy.as_str(),
                self.strategy.as_str()
            );
            self.store.delete_detection(snapshot.id).await?;
        }

        match self.strategy {
            Strategy::Classic => self.threshold.analyze(snapshot).await,
            Strategy::Ai => self.ai.analyze(snapshot).await,
        }
    }

    /// Sequential batch with continue-on-error semantics; the re-analysis
    /// rule applies to every element.
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
                    error!("Batch analysis failed for {}: {}", snapshot.id, reason);
                }
                Ok(AnalysisOutcome::StrategyUnavailable) => stats.failed += 1,
                Err(e) => {
                    stats.failed += 1;
                    error!("Batch analysis failed for {}: {}", snapshot.id, e);
                }
            }
        }

        info!(
            "Batch analysis with '{}' done: {}/{} succeeded",
            self.strategy.as_str(),
            stats.succeeded,
            stats.total
        );
        stats
    }
}
