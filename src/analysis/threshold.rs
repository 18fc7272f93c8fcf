/*
* Threshold anomaly detector
* --------------------------
* The classic path: compare each monitored field against a configurable
* limit, weigh the triggered flags into a 0-10 severity score, and render a
* human-readable summary. Fast, deterministic, always available.
*/

use std::sync::Arc;
use tracing::{error, info};

use crate::config::{SeverityWeights, ThresholdSettings};
use crate::core::{AnomalyFlags, AnomalyResult, MetricsSnapshot, Strategy};
use crate::errors::StoreError;
use crate::storage::ResultStore;

use super::{AnalysisOutcome, BatchStats};

pub struct ThresholdDetector {
    thresholds: ThresholdSettings,
    weights: SeverityWeights,
    store: Arc<dyn ResultStore>,
}

impl ThresholdDetector {
    pub fn new(
        thresholds: ThresholdSettings,
        weights: SeverityWeights,
        store: Arc<dyn ResultStore>,
    ) -> Self {
        Self {
            thresholds,
            weights,
            store,
        }
    }

    /// Compares the nine monitored fields against their limits. Strictly
    /// greater-than: a value exactly at the threshold is not anomalous.
    pub fn detect(&self, snapshot: &MetricsSnapshot) -> AnomalyFlags {
        let t = &self.thresholds;
        let flags = AnomalyFlags {
            cpu: snapshot.cpu_usage > t.cpu_usage,
            memory: snapshot.memory_usage > t.memory_usage,
            latency: snapshot.latency_ms > t.latency_ms,
            disk: snapshot.disk_usage > t.disk_usage,
            io: snapshot.io_wait > t.io_wait,
            error_rate: snapshot.error_rate > t.error_rate,
            temperature: snapshot.temperature_celsius > t.temperature_celsius,
            power: snapshot.power_consumption_watts > t.power_consumption_watts,
            service: snapshot.has_degraded_services(),
        };

        if flags.any() {
            info!("Threshold anomalies detected for snapshot {}", snapshot.id);
        }

        flags
    }

    /// Weighted severity score, capped at 10. The weights express
    /// operational severity per category, not distance past the threshold.
    pub fn score(&self, flags: &AnomalyFlags) -> u8 {
        let w = &self.weights;
        let mut score: u32 = 0;

        for (triggered, weight) in [
            (flags.cpu, w.cpu),
            (flags.memory, w.memory),
            (flags.latency, w.latency),
            (flags.disk, w.disk),
            (flags.io, w.io),
            (flags.error_rate, w.error_rate),
            (flags.temperature, w.temperature),
            (flags.power, w.power),
            (flags.service, w.service),
        ] {
            if triggered {
                score += weight as u32;
            }
        }

        score.min(10) as u8
    }

    /// Renders only the triggered flags with their measured values, in a
    /// fixed field order.
    pub fn summarize(&self, flags: &AnomalyFlags, snapshot: &MetricsSnapshot) -> String {
        let mut messages = Vec::new();

        if flags.cpu {
            messages.push(format!("High CPU: {}%", snapshot.cpu_usage));
        }
        if flags.memory {
            messages.push(format!("High memory: {}%", snapshot.memory_usage));
        }
        if flags.latency {
            messages.push(format!("Latency: {}ms", snapshot.latency_ms));
        }
        if flags.disk {
            messages.push(format!("Critical disk: {}%", snapshot.disk_usage));
        }
        if flags.io {
            messages.push(format!("High I/O wait: {}%", snapshot.io_wait));
        }
        if flags.error_rate {
            messages.push(format!("Errors: {:.2}%", snapshot.error_rate * 100.0));
        }
        if flags.temperature {
            messages.push(format!("Temperature: {}°C", snapshot.temperature_celsius));
        }
        if flags.power {
            messages.push(format!(
                "Power draw: {}W",
                snapshot.power_consumption_watts
            ));
        }
        if flags.service {
            let degraded = snapshot.degraded_services();
            if !degraded.is_empty() {
                messages.push(format!(
                    "Degraded services: {}",
                    degraded[..degraded.len().min(3)].join(", ")
                ));
            }
        }

        if messages.is_empty() {
            return "No anomalies detected by threshold analysis".to_string();
        }

        format!("Threshold analysis - limits exceeded: {}", messages.join("; "))
    }

    /// Full run: detect, score, summarize, persist atomically, flip the
    /// snapshot booleans. Store faults surface as-is.
    pub async fn analyze(
        &self,
        snapshot: &MetricsSnapshot,
    ) -> Result<AnalysisOutcome, StoreError> {
        info!("Classic analysis of snapshot {}", snapshot.id);

        let flags = self.detect(snapshot);
        let severity_score = self.score(&flags);
        let summary = self.summarize(&flags, snapshot);

        let result = AnomalyResult::new(
            snapshot.id,
            flags,
            summary,
            severity_score,
            Strategy::Classic,
        );

        let stored = self.store.store_detection(result, flags.any()).await?;

        info!(
            "Classic analysis done for {} - score: {}",
            snapshot.id, severity_score
        );
        Ok(AnalysisOutcome::Completed(stored))
    }

    /// Sequential batch run; one snapshot's failure never stops the rest.
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
                Ok(_) => stats.failed += 1,
                Err(e) => {
                    stats.failed += 1;
                    error!("Batch classic analysis failed for {}: {}", snapshot.id, e);
                }
            }
        }

        info!(
            "Classic batch analysis done: {}/{} succeeded",
            stats.succeeded, stats.total
        );
        stats
    }
}
