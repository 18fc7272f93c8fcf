#![allow(dead_code)]

use async_trait::async_trait;
use chrono::Utc;
use std::collections::{HashMap, VecDeque};
use tokio::sync::Mutex;

use infra_sentinel::core::{MetricsSnapshot, ServiceState};
use infra_sentinel::errors::CompletionError;
use infra_sentinel::llm::{ChatMessage, Completions};

/// A healthy snapshot with every value comfortably under its threshold.
pub fn healthy_snapshot() -> MetricsSnapshot {
    MetricsSnapshot {
        id: uuid::Uuid::new_v4(),
        timestamp: Utc::now(),
        cpu_usage: 30.0,
        memory_usage: 40.0,
        latency_ms: 50.0,
        disk_usage: 45.0,
        network_in_kbps: 1200.0,
        network_out_kbps: 800.0,
        io_wait: 2.0,
        thread_count: 120,
        active_connections: 40,
        error_rate: 0.001,
        uptime_seconds: 86_400,
        temperature_celsius: 45.0,
        power_consumption_watts: 250.0,
        service_status: HashMap::from([
            ("database".to_string(), ServiceState::Online),
            ("api_gateway".to_string(), ServiceState::Online),
            ("cache".to_string(), ServiceState::Online),
        ]),
        is_anomalous: false,
        analysis_completed: false,
    }
}

/// Every monitored value exactly one unit over its default threshold, plus
/// one service in error state.
pub fn fully_anomalous_snapshot() -> MetricsSnapshot {
    let mut snapshot = healthy_snapshot();
    snapshot.cpu_usage = 81.0;
    snapshot.memory_usage = 86.0;
    snapshot.latency_ms = 501.0;
    snapshot.disk_usage = 91.0;
    snapshot.io_wait = 21.0;
    snapshot.error_rate = 0.06;
    snapshot.temperature_celsius = 76.0;
    snapshot.power_consumption_watts = 401.0;
    snapshot
        .service_status
        .insert("cache".to_string(), ServiceState::Error);
    snapshot
}

/// Scripted completion backend: pops one canned response per call. None in
/// the script simulates a transport failure.
pub struct ScriptedClient {
    reachable: bool,
    responses: Mutex<VecDeque<Option<String>>>,
    pub calls: Mutex<usize>,
}

impl ScriptedClient {
    pub fn unreachable() -> Self {
        Self {
            reachable: false,
            responses: Mutex::new(VecDeque::new()),
            calls: Mutex::new(0),
        }
    }

    pub fn with_responses(responses: Vec<Option<&str>>) -> Self {
        Self {
            reachable: true,
            responses: Mutex::new(
                responses
                    .into_iter()
                    .map(|r| r.map(str::to_string))
                    .collect(),
            ),
            calls: Mutex::new(0),
        }
    }

    pub async fn call_count(&self) -> usize {
        *self.calls.lock().await
    }
}

#[async_trait]
impl Completions for ScriptedClient {
    fn is_reachable(&self) -> bool {
        self.reachable
    }

    async fn complete(&self, _messages: &[ChatMessage]) -> Result<String, CompletionError> {
        if !self.reachable {
            return Err(CompletionError::NotConfigured);
        }

        *self.calls.lock().await += 1;
        match self.responses.lock().await.pop_front() {
            Some(Some(text)) => Ok(text),
            Some(None) => Err(CompletionError::Transport {
                message: "connection reset".to_string(),
            }),
            None => Err(CompletionError::EmptyResponse),
        }
    }
}
