use crate::config::RunnerConfig;
use anyhow::Result;
use std::io::Write;
use std::path::Path;
use telemon_alert::engine::{AlertEngine, EngineConfig};
use telemon_alert::rule::AlertRule;
use telemon_alert::rule_set::RuleSet;

/// Default rule set shipped with the runner: vibration and temperature
/// thresholds, a low-OEE rule, a vibration trend and a composite
/// overheat rule.
const DEFAULT_RULES_JSON: &str = include_str!("../config/default_rules.json");

pub fn default_rule_set() -> Result<RuleSet> {
    RuleSet::from_json(DEFAULT_RULES_JSON)
        .map_err(|e| anyhow::anyhow!("invalid built-in rule set: {e}"))
}

pub fn default_rules() -> Result<Vec<AlertRule>> {
    Ok(default_rule_set()?.rules)
}

pub fn load_rules_file(path: impl AsRef<Path>) -> Result<RuleSet> {
    let path = path.as_ref();
    let content = std::fs::read_to_string(path)
        .map_err(|e| anyhow::anyhow!("Failed to read rules file '{}': {}", path.display(), e))?;
    RuleSet::from_json(&content)
        .map_err(|e| anyhow::anyhow!("Failed to parse rules file '{}': {}", path.display(), e))
}

/// Register every rule of `set` that is valid for this engine, skipping the
/// rest with warnings. Returns the number of rules registered.
pub fn seed_engine(engine: &mut AlertEngine, set: RuleSet, source: &str) -> usize {
    let total = set.rules.len();
    let (valid, rejected) = set.partition_with(|rule| engine.validate_rule(rule));

    for (rule_id, error) in &rejected {
        tracing::warn!(source, rule_id = %rule_id, error = %error, "Skipping invalid alert rule");
    }

    let loaded = valid.len();
    engine.add_rules(valid);
    tracing::info!(source, loaded, total, "Alert rules loaded");
    loaded
}

/// Build an engine from configuration: defaults first, then the rules file.
pub fn build_engine(config: &RunnerConfig) -> Result<AlertEngine> {
    let mut engine = AlertEngine::new(config.engine.clone());

    if config.load_default_rules {
        seed_engine(&mut engine, default_rule_set()?, "built-in");
    }
    if let Some(path) = &config.rules_file {
        seed_engine(&mut engine, load_rules_file(path)?, path);
    }
    if engine.rules().is_empty() {
        tracing::warn!("No alert rules loaded; every batch will evaluate to nothing");
    }

    Ok(engine)
}

/// Write one line per rule describing whether it is valid for an engine
/// built from `engine`. Returns the number of invalid rules.
pub fn check_rule_set(set: RuleSet, engine: &EngineConfig, mut out: impl Write) -> Result<usize> {
    let (valid, rejected) =
        set.partition_with(|rule| rule.validate_for_history(engine.history_capacity));

    for rule in &valid {
        let scope = if rule.equipment_ids.is_empty() {
            "all equipment".to_string()
        } else {
            rule.equipment_ids.iter().cloned().collect::<Vec<_>>().join(", ")
        };
        writeln!(
            out,
            "ok       {:<24} {:<8} fields=[{}] scope=[{}]",
            rule.id,
            rule.severity.to_string(),
            rule.condition.fields().join(", "),
            scope,
        )?;
    }
    for (rule_id, error) in &rejected {
        writeln!(out, "invalid  {rule_id:<24} {error}")?;
    }

    Ok(rejected.len())
}

#[cfg(test)]
mod tests {
    use super::*;
    use telemon_alert::condition::AlertCondition;

    #[test]
    fn default_rules_are_valid() {
        let set = default_rule_set().unwrap();
        assert_eq!(set.rules.len(), 7);
        let (valid, rejected) = set.into_valid_rules();
        assert_eq!(valid.len(), 7);
        assert!(rejected.is_empty());
    }

    #[test]
    fn default_rules_cover_every_condition_kind() {
        let rules = default_rules().unwrap();
        assert!(rules
            .iter()
            .any(|r| matches!(r.condition, AlertCondition::Trend { .. })));
        assert!(rules
            .iter()
            .any(|r| matches!(r.condition, AlertCondition::Composite { .. })));
        assert!(rules.iter().all(|r| r.enabled));
    }

    #[test]
    fn build_engine_without_defaults_is_empty() {
        let config = RunnerConfig {
            load_default_rules: false,
            ..RunnerConfig::default()
        };
        assert!(build_engine(&config).unwrap().rules().is_empty());
    }

    #[test]
    fn check_rule_set_reports_invalid_rules() {
        let set = RuleSet::from_json(
            r#"{"rules": [
                {"id": "ok-rule", "name": "Fine", "severity": "info",
                 "condition": {"type": "threshold", "field": "oee", "operator": "lt", "value": 50}},
                {"id": "bad-rule", "name": "Bad", "severity": "info",
                 "condition": {"type": "range", "field": "oee", "min": 9, "max": 1}}
            ]}"#,
        )
        .unwrap();

        let mut out = Vec::new();
        let invalid = check_rule_set(set, &EngineConfig::default(), &mut out).unwrap();
        let text = String::from_utf8(out).unwrap();

        assert_eq!(invalid, 1);
        assert!(text.contains("ok-rule"));
        assert!(text.contains("fields=[oee]"));
        assert!(text.lines().any(|l| l.starts_with("invalid") && l.contains("bad-rule")));
    }

    #[test]
    fn short_history_rejects_default_trend_rule() {
        let config = RunnerConfig::from_toml("[engine]\nhistory_capacity = 5").unwrap();
        let engine = build_engine(&config).unwrap();

        assert_eq!(engine.rules().len(), 6);
        assert!(engine.get_rule("vibration-trend").is_none());
        assert!(engine.get_rule("bearing-overheat").is_some());

        let mut out = Vec::new();
        let invalid = check_rule_set(default_rule_set().unwrap(), &config.engine, &mut out).unwrap();
        let text = String::from_utf8(out).unwrap();
        assert_eq!(invalid, 1);
        assert!(text
            .lines()
            .any(|l| l.starts_with("invalid") && l.contains("vibration-trend") && l.contains("10 samples")));
    }
}
