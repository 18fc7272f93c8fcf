//! Strategy selector for recommendation reports, the mirror of the
//! detection selector. Upsert semantics mean re-generation simply replaces
//! the snapshot's existing report whichever method produced it.

use std::sync::Arc;
use tracing::info;

use crate::analysis::StrategyStatus;
use crate::config::RuleSettings;
use crate::core::{MetricsSnapshot, RecommendationReport, Strategy};
use crate::errors::StoreError;
use crate::llm::Completions;
use crate::storage::ResultStore;

use super::{AiRecommendationGenerator, ReportBatchStats, RuleBasedGenerator};

pub struct RecommendationService {
    strategy: Strategy,
    rules: RuleBasedGenerator,
    ai: AiRecommendationGenerator,
}

impl RecommendationService {
    pub fn new(
        strategy: Strategy,
        rule_settings: RuleSettings,
        store: Arc<dyn ResultStore>,
        client: Arc<dyn Completions>,
    ) -> Self {
        Self {
            strategy,
            rules: RuleBasedGenerator::new(rule_settings.clone(), store.clone()),
            ai: AiRecommendationGenerator::new(rule_settings, client, store),
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

    pub async fn generate_report(
        &self,
        snapshot: &MetricsSnapshot,
    ) -> Result<RecommendationReport, StoreError> {
        info!(
            "Generating '{}' recommendation report for snapshot {}",
            self.strategy.as_str(),
            snapshot.id
        );

        match self.strategy {
            Strategy::Classic => self.rules.generate_report(snapshot).await,
            Strategy::Ai => self.ai.generate_report(snapshot).await,
        }
    }

    pub async fn generate_batch_reports(
        &self,
        snapshots: &[MetricsSnapshot],
    ) -> ReportBatchStats {
        match self.strategy {
            Strategy::Classic => self.rules.generate_batch_reports(snapshots).await,
            Strategy::Ai => self.ai.generate_batch_reports(snapshots).await,
        }
    }
}
