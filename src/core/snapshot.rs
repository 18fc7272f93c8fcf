use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use uuid::Uuid;

// One timestamped infrastructure observation. Created once by ingestion;
// the detection engine only ever touches the two status booleans.
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct MetricsSnapshot {
    #[serde(default = "Uuid::new_v4")]
    pub id: Uuid,
    pub timestamp: DateTime<Utc>,

    // System performance
    pub cpu_usage: f64,
    pub memory_usage: f64,
    pub latency_ms: f64,
    pub disk_usage: f64,

    // Network
    pub network_in_kbps: f64,
    pub network_out_kbps: f64,

    // Advanced metrics
    pub io_wait: f64,
    pub thread_count: u32,
    pub active_connections: u32,
    pub error_rate: f64,

    // Hardware
    pub uptime_seconds: u64,
    pub temperature_celsius: f64,
    pub power_consumption_watts: f64,

    // Per-service health (database, api_gateway, cache, ...)
    pub service_status: HashMap<String, ServiceState>,

    // Owned by the detection engine, set exactly once per chosen strategy
    #[serde(default)]
    pub is_anomalous: bool,
    #[serde(default)]
    pub analysis_completed: bool,
}

#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum ServiceState {
    Online,
    Degraded,
    Offline,
    Error,
    Maintenance,
}

impl ServiceState {
    /// Degraded/Offline/Error count as unhealthy. Maintenance is planned
    /// downtime and does not raise the service flag.
    pub fn is_degraded(&self) -> bool {
        matches!(
            self,
            ServiceState::Degraded | ServiceState::Offline | ServiceState::Error
        )
    }
}

impl MetricsSnapshot {
    pub fn uptime_hours(&self) -> f64 {
        (self.uptime_seconds as f64 / 3600.0 * 100.0).round() / 100.0
    }

    pub fn has_degraded_services(&self) -> bool {
        self.service_status.values().any(|s| s.is_degraded())
    }

    pub fn degraded_services(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self
            .service_status
            .iter()
            .filter(|(_, state)| state.is_degraded())
            .map(|(name, _)| name.as_str())
            .collect();
        names.sort_unstable();
        names
    }
}
