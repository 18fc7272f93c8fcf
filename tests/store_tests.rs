mod common;

use chrono::Utc;

use infra_sentinel::core::{
    AnomalyFlags, AnomalyResult, GenerationMethod, Priority, RecommendationReport, Strategy,
};
use infra_sentinel::errors::StoreError;
use infra_sentinel::storage::{InMemoryStore, ResultStore};

use common::healthy_snapshot;

fn report_for(snapshot_id: uuid::Uuid) -> RecommendationReport {
    RecommendationReport {
        snapshot_id,
        generated_at: Utc::now(),
        executive_summary: "stable".to_string(),
        detailed_analysis: "nothing notable".to_string(),
        actions: Vec::new(),
        priority_level: Priority::Low,
        estimated_impact: "none".to_string(),
        implementation_timeframe: "1 month".to_string(),
        method: GenerationMethod::Classic,
    }
}

#[tokio::test]
async fn upsert_reports_whether_the_report_was_created() {
    let store = InMemoryStore::new();
    let snapshot = healthy_snapshot();
    store.insert_snapshot(snapshot.clone()).await.unwrap();

    let (_, created) = store.upsert_report(report_for(snapshot.id)).await.unwrap();
    assert!(created);

    let (_, created) = store.upsert_report(report_for(snapshot.id)).await.unwrap();
    assert!(!created);
}

#[tokio::test]
async fn upsert_for_unknown_snapshot_is_rejected() {
    let store = InMemoryStore::new();
    let orphan = uuid::Uuid::new_v4();

    let err = store.upsert_report(report_for(orphan)).await.unwrap_err();

    assert!(matches!(err, StoreError::SnapshotNotFound { snapshot_id } if snapshot_id == orphan));
}

#[tokio::test]
async fn storing_a_second_detection_replaces_the_first() {
    let store = InMemoryStore::new();
    let snapshot = healthy_snapshot();
    store.insert_snapshot(snapshot.clone()).await.unwrap();

    let first = AnomalyResult::new(
        snapshot.id,
        AnomalyFlags::default(),
        "first".to_string(),
        0,
        Strategy::Classic,
    );
    let second = AnomalyResult::new(
        snapshot.id,
        AnomalyFlags {
            cpu: true,
            ..AnomalyFlags::default()
        },
        "second".to_string(),
        6,
        Strategy::Ai,
    );

    store.store_detection(first, false).await.unwrap();
    store.store_detection(second, true).await.unwrap();

    let stored = store.detection_for(snapshot.id).await.unwrap().unwrap();
    assert_eq!(stored.summary, "second");
    assert_eq!(stored.strategy, Strategy::Ai);

    let updated = store.snapshot(snapshot.id).await.unwrap();
    assert!(updated.is_anomalous);
}

#[tokio::test]
async fn delete_detection_is_idempotent() {
    let store = InMemoryStore::new();
    let snapshot = healthy_snapshot();
    store.insert_snapshot(snapshot.clone()).await.unwrap();

    store.delete_detection(snapshot.id).await.unwrap();
    store.delete_detection(snapshot.id).await.unwrap();

    assert!(store.detection_for(snapshot.id).await.unwrap().is_none());
}

#[tokio::test]
async fn delete_detection_resets_the_snapshot_booleans() {
    let store = InMemoryStore::new();
    let snapshot = healthy_snapshot();
    store.insert_snapshot(snapshot.clone()).await.unwrap();

    let result = AnomalyResult::new(
        snapshot.id,
        AnomalyFlags {
            cpu: true,
            ..AnomalyFlags::default()
        },
        "cpu anomaly".to_string(),
        2,
        Strategy::Classic,
    );
    store.store_detection(result, true).await.unwrap();

    store.delete_detection(snapshot.id).await.unwrap();

    let reverted = store.snapshot(snapshot.id).await.unwrap();
    assert!(!reverted.is_anomalous);
    assert!(!reverted.analysis_completed);

    let pending = store.unprocessed_snapshots().await.unwrap();
    assert!(pending.iter().any(|s| s.id == snapshot.id));
}

#[tokio::test]
async fn unprocessed_snapshots_excludes_completed_ones_in_timestamp_order() {
    let store = InMemoryStore::new();

    let mut older = healthy_snapshot();
    older.timestamp = Utc::now() - chrono::Duration::minutes(10);
    let newer = healthy_snapshot();
    let mut done = healthy_snapshot();
    done.analysis_completed = true;

    store.insert_snapshot(newer.clone()).await.unwrap();
    store.insert_snapshot(older.clone()).await.unwrap();
    store.insert_snapshot(done).await.unwrap();

    let pending = store.unprocessed_snapshots().await.unwrap();

    assert_eq!(pending.len(), 2);
    assert_eq!(pending[0].id, older.id);
    assert_eq!(pending[1].id, newer.id);
}
