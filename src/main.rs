use anyhow::Context;
use clap::Parser;
use std::sync::Arc;
use tracing::info;

mod analysis;
mod config;
mod core;
mod errors;
mod llm;
mod recommend;
mod storage;

use analysis::DetectionService;
use config::Settings;
use core::{MetricsSnapshot, Strategy};
use llm::CompletionClient;
use recommend::RecommendationService;
use storage::{InMemoryStore, ResultStore};

#[derive(Parser, Debug)]
#[command(name = "infra-sentinel", about = "Dual-strategy infrastructure anomaly analysis")]
struct Cli {
    /// Analysis strategy: "classic" or "ai"
    #[arg(short, long, default_value = "classic")]
    strategy: String,

    /// JSON file containing an array of metrics snapshots
    #[arg(short, long)]
    input: String,

    /// Also generate recommendation reports
    #[arg(short, long)]
    recommend: bool,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt::init();
    info!("Starting Infra Sentinel");

    let cli = Cli::parse();
    let settings = Settings::new().context("failed to load configuration")?;
    let strategy = Strategy::from_name(&cli.strategy);

    let raw = std::fs::read_to_string(&cli.input)
        .with_context(|| format!("failed to read {}", cli.input))?;
    let snapshots: Vec<MetricsSnapshot> =
        serde_json::from_str(&raw).context("invalid snapshot file")?;

    let store: Arc<dyn ResultStore> = Arc::new(InMemoryStore::new());
    for snapshot in &snapshots {
        store.insert_snapshot(snapshot.clone()).await?;
    }
    info!("Loaded {} snapshots from {}", snapshots.len(), cli.input);

    let client = Arc::new(CompletionClient::new(settings.llm.clone()));

    let detection = DetectionService::new(
        strategy,
        settings.thresholds.clone(),
        settings.weights.clone(),
        store.clone(),
        client.clone(),
    );

    let status = detection.describe();
    info!(
        "Detection strategy '{}' (available: {})",
        status.name, status.available
    );

    let stats = detection.analyze_batch(&snapshots).await;
    println!("{}", serde_json::to_string_pretty(&stats)?);

    for snapshot in &snapshots {
        if let Some(result) = store.detection_for(snapshot.id).await? {
            println!("{}", serde_json::to_string_pretty(&result)?);
        }
    }

    if cli.recommend {
        let recommendation = RecommendationService::new(
            strategy,
            settings.rules.clone(),
            store.clone(),
            client,
        );

        let report_stats = recommendation.generate_batch_reports(&snapshots).await;
        println!("{}", serde_json::to_string_pretty(&report_stats)?);

        for snapshot in &snapshots {
            if let Some(report) = store.report_for(snapshot.id).await? {
                println!("{}", serde_json::to_string_pretty(&report)?);
            }
        }
    }

    Ok(())
}
