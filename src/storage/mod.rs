use async_trait::async_trait;
use std::collections::HashMap;
use tokio::sync::Mutex;
use tracing::debug;
use uuid::Uuid;

use crate::core::{AnomalyResult, MetricsSnapshot, RecommendationReport};
use crate::errors::StoreError;

/// Seam to the persistence collaborator. The engine only ever performs
/// explicit find / store / delete operations; uniqueness per snapshot is the
/// store's contract (at most one AnomalyResult and one RecommendationReport
/// per snapshot).
#[async_trait]
pub trait ResultStore: Send + Sync {
    async fn insert_snapshot(&self, snapshot: MetricsSnapshot) -> Result<(), StoreError>;

    async fn snapshot(&self, id: Uuid) -> Result<MetricsSnapshot, StoreError>;

    async fn unprocessed_snapshots(&self) -> Result<Vec<MetricsSnapshot>, StoreError>;

    async fn detection_for(&self, snapshot_id: Uuid) -> Result<Option<AnomalyResult>, StoreError>;

    /// Persists the detection result and flips the snapshot's
    /// is_anomalous/analysis_completed booleans as one atomic unit. Replaces
    /// any existing result for the snapshot.
    async fn store_detection(
        &self,
        result: AnomalyResult,
        anomalous: bool,
    ) -> Result<AnomalyResult, StoreError>;

    /// Removes the detection result and resets the snapshot's
    /// is_anomalous/analysis_completed booleans under the same lock, so the
    /// snapshot returns to the unanalyzed state instead of carrying flags
    /// with no result record behind them.
    async fn delete_detection(&self, snapshot_id: Uuid) -> Result<(), StoreError>;

    async fn report_for(
        &self,
        snapshot_id: Uuid,
    ) -> Result<Option<RecommendationReport>, StoreError>;

    /// Find-or-create keyed by snapshot. Returns the stored report and
    /// whether it was newly created.
    async fn upsert_report(
        &self,
        report: RecommendationReport,
    ) -> Result<(RecommendationReport, bool), StoreError>;
}

#[derive(Default)]
struct StoreInner {
    snapshots: HashMap<Uuid, MetricsSnapshot>,
    detections: HashMap<Uuid, AnomalyResult>,
    reports: HashMap<Uuid, RecommendationReport>,
}

/// Reference in-memory store used by the binary and the test suite. A single
/// mutex over all three maps keeps the detection + snapshot-flag write atomic.
#[derive(Default)]
pub struct InMemoryStore {
    inner: Mutex<StoreInner>,
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl ResultStore for InMemoryStore {
    async fn insert_snapshot(&self, snapshot: MetricsSnapshot) -> Result<(), StoreError> {
        let mut inner = self.inner.lock().await;
        debug!("Storing snapshot {}", snapshot.id);
        inner.snapshots.insert(snapshot.id, snapshot);
        Ok(())
    }

    async fn snapshot(&self, id: Uuid) -> Result<MetricsSnapshot, StoreError> {
        let inner = self.inner.lock().await;
        inner
            .snapshots
            .get(&id)
            .cloned()
            .ok_or(StoreError::SnapshotNotFound { snapshot_id: id })
    }

    async fn unprocessed_snapshots(&self) -> Result<Vec<MetricsSnapshot>, StoreError> {
        let inner = self.inner.lock().await;
        let mut pending: Vec<MetricsSnapshot> = inner
            .snapshots
            .values()
            .filter(|s| !s.analysis_completed)
            .cloned()
            .collect();
        pending.sort_by_key(|s| s.timestamp);
        Ok(pending)
    }

    async fn detection_for(&self, snapshot_id: Uuid) -> Result<Option<AnomalyResult>, StoreError> {
        let inner = self.inner.lock().await;
        Ok(inner.detections.get(&snapshot_id).cloned())
    }

    async fn store_detection(
        &self,
        result: AnomalyResult,
        anomalous: bool,
    ) -> Result<AnomalyResult, StoreError> {
        let mut inner = self.inner.lock().await;
        let snapshot_id = result.snapshot_id;

        let snapshot = inner
            .snapshots
            .get_mut(&snapshot_id)
            .ok_or(StoreError::SnapshotNotFound { snapshot_id })?;
        snapshot.is_anomalous = anomalous;
        snapshot.analysis_completed = true;

        inner.detections.insert(snapshot_id, result.clone());
        Ok(result)
    }

    async fn delete_detection(&self, snapshot_id: Uuid) -> Result<(), StoreError> {
        let mut inner = self.inner.lock().await;
        if inner.detections.remove(&snapshot_id).is_some() {
            if let Some(snapshot) = inner.snapshots.get_mut(&snapshot_id) {
                snapshot.is_anomalous = false;
                snapshot.analysis_completed = false;
            }
        }
        Ok(())
    }

    async fn report_for(
        &self,
        snapshot_id: Uuid,
    ) -> Result<Option<RecommendationReport>, StoreError> {
        let inner = self.inner.lock().await;
        Ok(inner.reports.get(&snapshot_id).cloned())
    }

    async fn upsert_report(
        &self,
        report: RecommendationReport,
    ) -> Result<(RecommendationReport, bool), StoreError> {
        let mut inner = self.inner.lock().await;
        let snapshot_id = report.snapshot_id;

        if !inner.snapshots.contains_key(&snapshot_id) {
            return Err(StoreError::SnapshotNotFound { snapshot_id });
        }

        let created = inner.reports.insert(snapshot_id, report.clone()).is_none();
        debug!(
            "Report for snapshot {} {}",
            snapshot_id,
            if created { "created" } else { "updated" }
        );
        Ok((report, created))
    }
}
