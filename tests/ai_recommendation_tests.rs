mod common;

use std::sync::Arc;

use infra_sentinel::config::RuleSettings;
use infra_sentinel::core::{GenerationMethod, Priority};
use infra_sentinel::recommend::{AiRecommendationGenerator, FocusArea, RecommendationService};
use infra_sentinel::core::Strategy;
use infra_sentinel::storage::{InMemoryStore, ResultStore};

use common::{healthy_snapshot, ScriptedClient};

fn generator(store: Arc<InMemoryStore>, client: Arc<ScriptedClient>) -> AiRecommendationGenerator {
    AiRecommendationGenerator::new(RuleSettings::default(), client, store)
}

fn primary_response() -> &'static str {
    r#"{
        "executive_summary": "Two optimizations identified.",
        "detailed_analysis": "CPU and memory are trending upward.",
        "recommendations": [
            {"title": "Scale the worker pool", "description": "Add two workers", "priority": "critical", "category": "performance"},
            {"title": "Tune cache TTLs", "description": "Shorten TTLs", "priority": "medium", "category": "resources"}
        ],
        "priority_level": "medium",
        "estimated_impact": "Lower latency",
        "implementation_timeframe": "1 week"
    }"#
}

#[tokio::test]
async fn unreachable_service_falls_back_to_rules_without_calling_out() {
    let store: Arc<InMemoryStore> = Arc::new(InMemoryStore::new());
    let client = Arc::new(ScriptedClient::unreachable());
    let generator = generator(store, client.clone());

    let payload = generator.generate(&healthy_snapshot(), "").await;

    assert_eq!(payload.method, GenerationMethod::AiFallback);
    assert!(payload
        .detailed_analysis
        .ends_with("(AI analysis temporarily unavailable)"));
    assert_eq!(payload.actions[0].title, "Continue monitoring");
    assert_eq!(client.call_count().await, 0);
}

#[tokio::test]
async fn model_payload_is_parsed_and_priority_raised_to_the_action_maximum() {
    let store: Arc<InMemoryStore> = Arc::new(InMemoryStore::new());
    let client = Arc::new(ScriptedClient::with_responses(vec![Some(
        primary_response(),
    )]));
    let generator = generator(store, client.clone());

    let payload = generator.generate(&healthy_snapshot(), "").await;

    assert_eq!(payload.method, GenerationMethod::Ai);
    assert_eq!(payload.executive_summary, "Two optimizations identified.");
    assert_eq!(payload.actions.len(), 2);
    assert_eq!(payload.actions[0].priority, Priority::Critical);
    // The declared "medium" is overridden by the critical action.
    assert_eq!(payload.priority_level, Priority::Critical);
    // No critical area on a healthy snapshot, so no enrichment call.
    assert_eq!(client.call_count().await, 1);
}

#[tokio::test]
async fn unparseable_model_output_is_backfilled_with_defaults() {
    let store: Arc<InMemoryStore> = Arc::new(InMemoryStore::new());
    let client = Arc::new(ScriptedClient::with_responses(vec![Some(
        "no JSON here, sorry",
    )]));
    let generator = generator(store, client);

    let payload = generator.generate(&healthy_snapshot(), "").await;

    assert_eq!(payload.method, GenerationMethod::Ai);
    assert_eq!(
        payload.executive_summary,
        "Recommendations generated by AI analysis."
    );
    assert!(payload.actions.is_empty());
    assert_eq!(payload.priority_level, Priority::Medium);
}

#[tokio::test]
async fn critical_cpu_triggers_a_focused_enrichment_pass() {
    let store: Arc<InMemoryStore> = Arc::new(InMemoryStore::new());
    let focused = r#"{
        "recommendations": [
            {"title": "Pin hot threads", "priority": "high", "category": "performance"},
            {"title": "Profile the scheduler", "priority": "medium", "category": "performance"},
            {"title": "A third one", "priority": "low", "category": "performance"}
        ]
    }"#;
    let client = Arc::new(ScriptedClient::with_responses(vec![
        Some(primary_response()),
        Some(focused),
    ]));
    let generator = generator(store, client.clone());

    let mut snapshot = healthy_snapshot();
    snapshot.cpu_usage = 90.0;

    let payload = generator.generate(&snapshot, "").await;

    assert_eq!(client.call_count().await, 2);
    // 2 primary actions + at most 2 focused ones, the third dropped.
    assert_eq!(payload.actions.len(), 4);
    assert_eq!(payload.actions[2].source.as_deref(), Some("focused_cpu"));
    assert_eq!(payload.actions[3].source.as_deref(), Some("focused_cpu"));
    assert!(payload
        .detailed_analysis
        .contains("Focused cpu analysis included."));
}

#[tokio::test]
async fn enrichment_failure_keeps_the_primary_result() {
    let store: Arc<InMemoryStore> = Arc::new(InMemoryStore::new());
    let client = Arc::new(ScriptedClient::with_responses(vec![
        Some(primary_response()),
        None, // focused call fails
    ]));
    let generator = generator(store, client);

    let mut snapshot = healthy_snapshot();
    snapshot.cpu_usage = 90.0;

    let payload = generator.generate(&snapshot, "").await;

    assert_eq!(payload.method, GenerationMethod::Ai);
    assert_eq!(payload.actions.len(), 2);
    assert!(!payload.detailed_analysis.contains("Focused"));
}

#[tokio::test]
async fn emergency_priority_and_timeframe_are_forced() {
    let store: Arc<InMemoryStore> = Arc::new(InMemoryStore::new());
    let relaxed = r#"{
        "executive_summary": "Nothing to worry about.",
        "recommendations": [{"title": "Take a look sometime", "priority": "low", "category": "general"}],
        "priority_level": "low"
    }"#;
    let client = Arc::new(ScriptedClient::with_responses(vec![Some(relaxed)]));
    let generator = generator(store, client);

    let payload = generator
        .generate_emergency(&healthy_snapshot(), "database unreachable")
        .await;

    assert_eq!(payload.priority_level, Priority::Critical);
    assert_eq!(payload.implementation_timeframe, "Immediate (< 30 min)");
}

#[tokio::test]
async fn emergency_fallback_contains_investigation_and_monitoring_actions() {
    let store: Arc<InMemoryStore> = Arc::new(InMemoryStore::new());
    let generator = generator(store, Arc::new(ScriptedClient::unreachable()));

    let payload = generator
        .generate_emergency(&healthy_snapshot(), "database unreachable")
        .await;

    assert_eq!(payload.method, GenerationMethod::AiFallback);
    assert_eq!(payload.priority_level, Priority::Critical);
    assert_eq!(payload.actions.len(), 2);
    assert_eq!(payload.actions[0].title, "Immediate investigation");
    assert!(payload.actions[0].description.contains("database unreachable"));
    assert_eq!(payload.actions[1].priority, Priority::High);
}

#[tokio::test]
async fn specialized_variants_have_deterministic_fallbacks() {
    let store: Arc<InMemoryStore> = Arc::new(InMemoryStore::new());
    let generator = generator(store, Arc::new(ScriptedClient::unreachable()));
    let snapshot = healthy_snapshot();

    let focused = generator.generate_focused(&snapshot, FocusArea::Memory).await;
    assert_eq!(focused.method, GenerationMethod::AiFallback);
    assert!(focused.executive_summary.contains("memory"));

    let capacity = generator.generate_capacity(&snapshot, 30).await;
    assert_eq!(capacity.method, GenerationMethod::AiFallback);
    assert_eq!(capacity.implementation_timeframe, "30 days");

    let maintenance = generator
        .generate_maintenance(&snapshot, "Saturday 02:00-06:00")
        .await;
    assert_eq!(maintenance.method, GenerationMethod::AiFallback);
    assert_eq!(
        maintenance.implementation_timeframe,
        "Saturday 02:00-06:00"
    );
}

#[tokio::test]
async fn generate_report_upserts_keyed_by_snapshot() {
    let store: Arc<InMemoryStore> = Arc::new(InMemoryStore::new());
    let generator = generator(store.clone(), Arc::new(ScriptedClient::unreachable()));

    let snapshot = healthy_snapshot();
    store.insert_snapshot(snapshot.clone()).await.unwrap();

    generator.generate_report(&snapshot).await.unwrap();
    generator.generate_report(&snapshot).await.unwrap();

    let report = store.report_for(snapshot.id).await.unwrap().unwrap();
    assert_eq!(report.method, GenerationMethod::AiFallback);
    assert_eq!(report.snapshot_id, snapshot.id);
}

#[tokio::test]
async fn service_dispatches_by_strategy() {
    let store: Arc<InMemoryStore> = Arc::new(InMemoryStore::new());
    let snapshot = healthy_snapshot();
    store.insert_snapshot(snapshot.clone()).await.unwrap();

    let classic = RecommendationService::new(
        Strategy::Classic,
        RuleSettings::default(),
        store.clone(),
        Arc::new(ScriptedClient::unreachable()),
    );
    classic.generate_report(&snapshot).await.unwrap();
    let report = store.report_for(snapshot.id).await.unwrap().unwrap();
    assert_eq!(report.method, GenerationMethod::Classic);

    let ai = RecommendationService::new(
        Strategy::Ai,
        RuleSettings::default(),
        store.clone(),
        Arc::new(ScriptedClient::unreachable()),
    );
    assert!(!ai.describe().available);
    ai.generate_report(&snapshot).await.unwrap();
    let report = store.report_for(snapshot.id).await.unwrap().unwrap();
    assert_eq!(report.method, GenerationMethod::AiFallback);
}
