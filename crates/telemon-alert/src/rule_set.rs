use crate::error::{AlertError, Result};
use crate::rule::AlertRule;
use serde::{Deserialize, Serialize};

/// A document of rule definitions, e.g. a seed file:
///
/// ```json
/// { "rules": [ { "id": "temp-high", "name": "...", "severity": "warning",
///                "condition": { "type": "threshold", ... } } ] }
/// ```
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RuleSet {
    #[serde(default)]
    pub rules: Vec<AlertRule>,
}

impl RuleSet {
    pub fn from_json(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }

    pub fn to_json_pretty(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Split into rules that pass [`AlertRule::validate`] and the rejected
    /// ones with their errors. Duplicate ids are rejected after the first.
    pub fn into_valid_rules(self) -> (Vec<AlertRule>, Vec<(String, AlertError)>) {
        self.partition_with(AlertRule::validate)
    }

    /// Like [`into_valid_rules`](Self::into_valid_rules) with a caller-supplied
    /// check, e.g. [`AlertEngine::validate_rule`](crate::engine::AlertEngine::validate_rule).
    pub fn partition_with(
        self,
        check: impl Fn(&AlertRule) -> Result<()>,
    ) -> (Vec<AlertRule>, Vec<(String, AlertError)>) {
        let mut valid: Vec<AlertRule> = Vec::with_capacity(self.rules.len());
        let mut rejected = Vec::new();

        for rule in self.rules {
            if let Err(e) = check(&rule) {
                rejected.push((rule.id, e));
                continue;
            }
            if valid.iter().any(|r| r.id == rule.id) {
                let err = AlertError::InvalidRule {
                    rule_id: rule.id.clone(),
                    reason: "duplicate rule id in rule set".to_string(),
                };
                rejected.push((rule.id, err));
                continue;
            }
            valid.push(rule);
        }

        (valid, rejected)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const DOC: &str = r#"{
        "rules": [
            {
                "id": "temp-high",
                "name": "High temperature",
                "severity": "warning",
                "cooldown_ms": 60000,
                "equipment_ids": ["press-01"],
                "condition": {"type": "threshold", "field": "temperature", "operator": "gt", "value": 80}
            },
            {
                "id": "broken",
                "name": "Broken composite",
                "severity": "info",
                "condition": {"type": "composite", "operator": "or", "conditions": []}
            },
            {
                "id": "temp-high",
                "name": "Duplicate",
                "severity": "critical",
                "condition": {"type": "threshold", "field": "temperature", "operator": "gt", "value": 90}
            }
        ]
    }"#;

    #[test]
    fn parses_and_splits_valid_rules() {
        let set = RuleSet::from_json(DOC).unwrap();
        assert_eq!(set.rules.len(), 3);

        let (valid, rejected) = set.into_valid_rules();
        assert_eq!(valid.len(), 1);
        assert_eq!(valid[0].cooldown_ms, 60_000);
        assert!(valid[0].equipment_ids.contains("press-01"));

        let rejected_ids: Vec<&str> = rejected.iter().map(|(id, _)| id.as_str()).collect();
        assert_eq!(rejected_ids, vec!["broken", "temp-high"]);
    }

    #[test]
    fn malformed_json_is_an_error() {
        assert!(matches!(
            RuleSet::from_json("{\"rules\": [{}]}"),
            Err(AlertError::Json(_))
        ));
    }

    #[test]
    fn pretty_json_round_trips() {
        let set = RuleSet::from_json(DOC).unwrap();
        let again = RuleSet::from_json(&set.to_json_pretty().unwrap()).unwrap();
        assert_eq!(set, again);
    }

    #[test]
    fn partition_with_applies_history_limit() {
        let set = RuleSet::from_json(
            r#"{"rules": [
                {"id": "vibration-trend", "name": "Vibration rising", "severity": "warning",
                 "condition": {"type": "trend", "field": "vibration", "direction": "increasing",
                               "sample_count": 10, "change_threshold_percent": 20}},
                {"id": "temp-high", "name": "High temperature", "severity": "warning",
                 "condition": {"type": "threshold", "field": "temperature", "operator": "gt", "value": 80}}
            ]}"#,
        )
        .unwrap();

        let (valid, rejected) = set.clone().partition_with(|r| r.validate_for_history(5));
        assert_eq!(valid.len(), 1);
        assert_eq!(valid[0].id, "temp-high");
        assert_eq!(rejected[0].0, "vibration-trend");

        let (valid, rejected) = set.into_valid_rules();
        assert_eq!(valid.len(), 2);
        assert!(rejected.is_empty());
    }
}
