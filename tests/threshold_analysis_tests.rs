mod common;

use std::sync::Arc;

use infra_sentinel::analysis::{AnalysisOutcome, ThresholdDetector};
use infra_sentinel::config::{SeverityWeights, ThresholdSettings};
use infra_sentinel::core::{AnomalyFlags, AnomalyResult, ServiceState, Strategy};
use infra_sentinel::errors::StoreError;
use infra_sentinel::storage::{InMemoryStore, ResultStore};

use common::{fully_anomalous_snapshot, healthy_snapshot};

fn detector(store: Arc<dyn ResultStore>) -> ThresholdDetector {
    ThresholdDetector::new(
        ThresholdSettings::default(),
        SeverityWeights::default(),
        store,
    )
}

fn standalone_detector() -> ThresholdDetector {
    detector(Arc::new(InMemoryStore::new()))
}

#[test]
fn healthy_snapshot_raises_no_flags() {
    let detector = standalone_detector();
    let snapshot = healthy_snapshot();

    let flags = detector.detect(&snapshot);

    assert_eq!(flags, AnomalyFlags::default());
    assert_eq!(flags.count(), 0);
    assert!(!flags.any());
    assert_eq!(detector.score(&flags), 0);
    assert_eq!(
        detector.summarize(&flags, &snapshot),
        "No anomalies detected by threshold analysis"
    );
}

#[test]
fn every_metric_over_its_limit_raises_all_nine_flags() {
    let detector = standalone_detector();
    let snapshot = fully_anomalous_snapshot();

    let flags = detector.detect(&snapshot);

    assert_eq!(flags.count(), 9);
    // Weight sum is 19, well past the cap.
    assert_eq!(detector.score(&flags), 10);
}

#[test]
fn values_exactly_at_the_limit_are_not_anomalous() {
    let detector = standalone_detector();
    let mut snapshot = healthy_snapshot();
    snapshot.cpu_usage = 80.0;
    snapshot.memory_usage = 85.0;
    snapshot.latency_ms = 500.0;
    snapshot.disk_usage = 90.0;
    snapshot.io_wait = 20.0;
    snapshot.error_rate = 0.05;
    snapshot.temperature_celsius = 75.0;
    snapshot.power_consumption_watts = 400.0;

    let flags = detector.detect(&snapshot);

    assert!(!flags.any());
}

#[test]
fn maintenance_state_does_not_raise_the_service_flag() {
    let detector = standalone_detector();
    let mut snapshot = healthy_snapshot();
    snapshot
        .service_status
        .insert("cache".to_string(), ServiceState::Maintenance);

    let flags = detector.detect(&snapshot);

    assert!(!flags.service);

    snapshot
        .service_status
        .insert("database".to_string(), ServiceState::Degraded);
    let flags = detector.detect(&snapshot);

    assert!(flags.service);
    assert_eq!(snapshot.degraded_services(), vec!["database"]);
}

#[test]
fn score_uses_the_per_category_weights() {
    let detector = standalone_detector();

    let disk_only = AnomalyFlags {
        disk: true,
        ..AnomalyFlags::default()
    };
    assert_eq!(detector.score(&disk_only), 3);

    let cpu_and_io = AnomalyFlags {
        cpu: true,
        io: true,
        ..AnomalyFlags::default()
    };
    assert_eq!(detector.score(&cpu_and_io), 3);
}

#[test]
fn summary_renders_only_triggered_flags_with_measured_values() {
    let detector = standalone_detector();
    let mut snapshot = healthy_snapshot();
    snapshot.cpu_usage = 92.5;
    snapshot.error_rate = 0.06;

    let flags = detector.detect(&snapshot);
    let summary = detector.summarize(&flags, &snapshot);

    assert!(summary.starts_with("Threshold analysis - limits exceeded:"));
    assert!(summary.contains("High CPU: 92.5%"));
    assert!(summary.contains("Errors: 6.00%"));
    assert!(!summary.contains("Latency"));
}

#[test]
fn severity_constructor_clamps_to_ten() {
    let result = AnomalyResult::new(
        uuid::Uuid::new_v4(),
        AnomalyFlags::default(),
        "test".to_string(),
        99,
        Strategy::Classic,
    );

    assert_eq!(result.severity_score, 10);
    assert!(result.is_critical());
}

#[tokio::test]
async fn analyze_persists_result_and_flips_snapshot_booleans() {
    let store: Arc<InMemoryStore> = Arc::new(InMemoryStore::new());
    let detector = detector(store.clone());

    let snapshot = fully_anomalous_snapshot();
    store.insert_snapshot(snapshot.clone()).await.unwrap();

    let outcome = detector.analyze(&snapshot).await.unwrap();
    let result = outcome.result().expect("analysis should complete");

    assert_eq!(result.strategy, Strategy::Classic);
    assert_eq!(result.severity_score, 10);

    let stored = store.detection_for(snapshot.id).await.unwrap();
    assert!(stored.is_some());

    let updated = store.snapshot(snapshot.id).await.unwrap();
    assert!(updated.is_anomalous);
    assert!(updated.analysis_completed);
}

#[tokio::test]
async fn healthy_analysis_completes_without_marking_anomalous() {
    let store: Arc<InMemoryStore> = Arc::new(InMemoryStore::new());
    let detector = detector(store.clone());

    let snapshot = healthy_snapshot();
    store.insert_snapshot(snapshot.clone()).await.unwrap();

    detector.analyze(&snapshot).await.unwrap();

    let updated = store.snapshot(snapshot.id).await.unwrap();
    assert!(!updated.is_anomalous);
    assert!(updated.analysis_completed);
}

#[tokio::test]
async fn analyze_unknown_snapshot_surfaces_store_error() {
    let detector = standalone_detector();
    let snapshot = healthy_snapshot();

    let err = detector.analyze(&snapshot).await.unwrap_err();

    assert!(matches!(err, StoreError::SnapshotNotFound { snapshot_id } if snapshot_id == snapshot.id));
}

#[tokio::test]
async fn batch_continues_past_failures_and_counts_anomalies() {
    let store: Arc<InMemoryStore> = Arc::new(InMemoryStore::new());
    let detector = detector(store.clone());

    let healthy_a = healthy_snapshot();
    let healthy_b = healthy_snapshot();
    let anomalous = fully_anomalous_snapshot();
    let missing = healthy_snapshot(); // never inserted

    store.insert_snapshot(healthy_a.clone()).await.unwrap();
    store.insert_snapshot(healthy_b.clone()).await.unwrap();
    store.insert_snapshot(anomalous.clone()).await.unwrap();

    let stats = detector
        .analyze_batch(&[healthy_a, healthy_b, anomalous, missing])
        .await;

    assert_eq!(stats.total, 4);
    assert_eq!(stats.succeeded, 3);
    assert_eq!(stats.failed, 1);
    assert_eq!(stats.succeeded + stats.failed, stats.total);
    assert_eq!(stats.anomalies_found, 1);
}

#[tokio::test]
async fn analyze_outcome_exposes_the_stored_result() {
    let store: Arc<InMemoryStore> = Arc::new(InMemoryStore::new());
    let detector = detector(store.clone());

    let snapshot = healthy_snapshot();
    store.insert_snapshot(snapshot.clone()).await.unwrap();

    match detector.analyze(&snapshot).await.unwrap() {
        AnalysisOutcome::Completed(result) => {
            assert_eq!(result.snapshot_id, snapshot.id);
            assert_eq!(result.total_anomalies(), 0);
            assert!(!result.is_critical());
        }
        other => panic!("unexpected outcome: {:?}", other),
    }
}
