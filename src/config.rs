pub mod settings;

pub use settings::{
    generate_default_config, LlmSettings, RuleSettings, Settings, SeverityWeights,
    ThresholdSettings,
};
