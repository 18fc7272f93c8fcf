/*
* Infra Sentinel Configuration
* ----------------------------
* Hierarchical configuration with layered overrides, lowest to highest
* priority:
*
* 1. Hardcoded defaults (the thresholds everyone ends up keeping anyway)
* 2. config/default.toml (base configuration)
* 3. config/local.toml (environment-specific overrides, optional)
* 4. Environment variables with the APP_ prefix
*
* Sections:
* - ThresholdSettings: per-metric limits for the classic detector
* - SeverityWeights: per-flag integer weights for the severity score.
*   These are the given operational defaults; they reflect severity, not
*   threshold distance, and carry no deeper semantics.
* - RuleSettings: high/critical tier thresholds for the rule-based
*   recommendation generator
* - LlmSettings: completion service connection. All three of endpoint,
*   api_key and deployment must be present for the AI strategies to be
*   reachable; anything less means degraded mode, not an error.
*/

use config::{Config, ConfigError, File};
use serde::{Deserialize, Serialize};
use tracing::info;

#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct Settings {
    pub thresholds: ThresholdSettings,
    pub weights: SeverityWeights,
    pub rules: RuleSettings,
    pub llm: LlmSettings,
}

#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct ThresholdSettings {
    pub cpu_usage: f64,
    pub memory_usage: f64,
    pub latency_ms: f64,
    pub disk_usage: f64,
    pub io_wait: f64,
    pub error_rate: f64,
    pub temperature_celsius: f64,
    pub power_consumption_watts: f64,
}

impl Default for ThresholdSettings {
    fn default() -> Self {
        Self {
            cpu_usage: 80.0,
            memory_usage: 85.0,
            latency_ms: 500.0,
            disk_usage: 90.0,
            io_wait: 20.0,
            error_rate: 0.05,
            temperature_celsius: 75.0,
            power_consumption_watts: 400.0,
        }
    }
}

#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct SeverityWeights {
    pub cpu: u8,
    pub memory: u8,
    pub latency: u8,
    pub disk: u8,
    pub io: u8,
    pub error_rate: u8,
    pub temperature: u8,
    pub power: u8,
    pub service: u8,
}

impl Default for SeverityWeights {
    fn default() -> Self {
        Self {
            cpu: 2,
            memory: 2,
            latency: 2,
            disk: 3,
            io: 1,
            error_rate: 3,
            temperature: 2,
            power: 1,
            service: 3,
        }
    }
}

/// High/critical tier thresholds for the recommendation rule table.
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct RuleSettings {
    pub cpu_high: f64,
    pub cpu_critical: f64,
    pub memory_high: f64,
    pub memory_critical: f64,
    pub disk_high: f64,
    pub disk_critical: f64,
    pub latency_high: f64,
    pub latency_critical: f64,
    pub temperature_high: f64,
    pub temperature_critical: f64,
}

impl Default for RuleSettings {
    fn default() -> Self {
        Self {
            cpu_high: 80.0,
            cpu_critical: 95.0,
            memory_high: 85.0,
            memory_critical: 95.0,
            disk_high: 85.0,
            disk_critical: 95.0,
            latency_high: 300.0,
            latency_critical: 1000.0,
            temperature_high: 70.0,
            temperature_critical: 80.0,
        }
    }
}

#[derive(Debug, Serialize, Deserialize, Clone, Default)]
pub struct LlmSettings {
    pub endpoint: Option<String>,
    pub api_key: Option<String>,
    pub deployment: Option<String>,
    pub api_version: Option<String>,
}

impl LlmSettings {
    pub fn api_version(&self) -> &str {
        self.api_version.as_deref().unwrap_or("2024-02-01")
    }

    /// All three connection pieces must be present before we even try.
    pub fn is_configured(&self) -> bool {
        self.endpoint.is_some() && self.api_key.is_some() && self.deployment.is_some()
    }
}

impl Settings {
    pub fn new() -> Result<Self, ConfigError> {
        let config_path =
            std::env::var("CONFIG_PATH").unwrap_or_else(|_| "config".to_string());

        info!("Loading configuration from path: {}", config_path);

        let defaults = generate_default_config();

        let config = Config::builder()
            .add_source(Config::try_from(&defaults)?)
            .add_source(File::with_name(&format!("{}/default", config_path)).required(false))
            .add_source(File::with_name(&format!("{}/local", config_path)).required(false))
            .add_source(config::Environment::with_prefix("APP").separator("__"))
            .build()?;

        config.try_deserialize()
    }
}

pub fn generate_default_config() -> Settings {
    Settings {
        thresholds: ThresholdSettings::default(),
        weights: SeverityWeights::default(),
        rules: RuleSettings::default(),
        llm: LlmSettings::default(),
    }
}
