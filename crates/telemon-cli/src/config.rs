use serde::{Deserialize, Serialize};
use std::path::Path;
use telemon_alert::engine::EngineConfig;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RunnerConfig {
    /// Seed the engine with the shipped default rule set.
    #[serde(default = "default_load_default_rules")]
    pub load_default_rules: bool,
    /// JSON rule set loaded after the defaults; same-id rules replace them.
    #[serde(default)]
    pub rules_file: Option<String>,
    /// Equipment id applied to reading batches that do not name one.
    #[serde(default)]
    pub default_equipment_id: Option<String>,
    #[serde(default)]
    pub engine: EngineConfig,
}

fn default_load_default_rules() -> bool {
    true
}

impl Default for RunnerConfig {
    fn default() -> Self {
        Self {
            load_default_rules: default_load_default_rules(),
            rules_file: None,
            default_equipment_id: None,
            engine: EngineConfig::default(),
        }
    }
}

impl RunnerConfig {
    pub fn load(path: impl AsRef<Path>) -> anyhow::Result<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path)
            .map_err(|e| anyhow::anyhow!("Failed to read config '{}': {}", path.display(), e))?;
        Self::from_toml(&content)
            .map_err(|e| anyhow::anyhow!("Failed to parse config '{}': {}", path.display(), e))
    }

    pub fn from_toml(content: &str) -> anyhow::Result<Self> {
        let config: Self = toml::from_str(content)?;
        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_config_uses_defaults() {
        let config = RunnerConfig::from_toml("").unwrap();
        assert_eq!(config, RunnerConfig::default());
        assert_eq!(config.engine.history_capacity, 100);
        assert_eq!(config.engine.locale, "en");
    }

    #[test]
    fn parses_all_fields() {
        let config = RunnerConfig::from_toml(
            r#"
            load_default_rules = false
            rules_file = "rules/plant-a.json"
            default_equipment_id = "press-01"

            [engine]
            history_capacity = 20
            locale = "zh-CN"
            "#,
        )
        .unwrap();
        assert!(!config.load_default_rules);
        assert_eq!(config.rules_file.as_deref(), Some("rules/plant-a.json"));
        assert_eq!(config.default_equipment_id.as_deref(), Some("press-01"));
        assert_eq!(config.engine.history_capacity, 20);
        assert_eq!(config.engine.locale, "zh-CN");
    }

    #[test]
    fn partial_engine_table_keeps_defaults() {
        let config = RunnerConfig::from_toml("[engine]\nlocale = \"zh-CN\"").unwrap();
        assert_eq!(config.engine.history_capacity, 100);
    }

    #[test]
    fn missing_file_is_an_error() {
        let err = RunnerConfig::load("/nonexistent/telemon.toml").unwrap_err();
        assert!(err.to_string().contains("/nonexistent/telemon.toml"));
    }
}
