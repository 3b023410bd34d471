use crate::condition::AlertCondition;
use crate::error::{AlertError, Result};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use telemon_common::types::Severity;

/// A declarative alert rule.
///
/// `cooldown_ms` is the minimum time between two firings of the same rule.
/// An empty `equipment_ids` set applies the rule to every piece of equipment.
/// `message_template` may reference readings as `{field}` placeholders.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AlertRule {
    pub id: String,
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    pub condition: AlertCondition,
    pub severity: Severity,
    #[serde(default)]
    pub cooldown_ms: u64,
    #[serde(default = "default_enabled")]
    pub enabled: bool,
    #[serde(default, skip_serializing_if = "BTreeSet::is_empty")]
    pub equipment_ids: BTreeSet<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message_template: Option<String>,
}

fn default_enabled() -> bool {
    true
}

impl AlertRule {
    /// An enabled rule with no cooldown, no equipment scope and no template.
    pub fn new(
        id: impl Into<String>,
        name: impl Into<String>,
        condition: AlertCondition,
        severity: Severity,
    ) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            description: None,
            condition,
            severity,
            cooldown_ms: 0,
            enabled: true,
            equipment_ids: BTreeSet::new(),
            message_template: None,
        }
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    pub fn with_cooldown_ms(mut self, cooldown_ms: u64) -> Self {
        self.cooldown_ms = cooldown_ms;
        self
    }

    pub fn with_enabled(mut self, enabled: bool) -> Self {
        self.enabled = enabled;
        self
    }

    pub fn with_equipment_ids<I, S>(mut self, ids: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.equipment_ids = ids.into_iter().map(Into::into).collect();
        self
    }

    pub fn with_message_template(mut self, template: impl Into<String>) -> Self {
        self.message_template = Some(template.into());
        self
    }

    /// Whether this rule applies to the given call-site equipment id.
    ///
    /// Scoping only filters when both the rule has a scope and the caller
    /// names an equipment id.
    pub fn applies_to(&self, equipment_id: Option<&str>) -> bool {
        match equipment_id {
            Some(id) if !self.equipment_ids.is_empty() => self.equipment_ids.contains(id),
            _ => true,
        }
    }

    /// Check the rule for authoring mistakes the engine itself tolerates
    /// (empty ids, empty composites, inverted ranges, zero-sample trends).
    pub fn validate(&self) -> Result<()> {
        let invalid = |reason: String| AlertError::InvalidRule {
            rule_id: self.id.clone(),
            reason,
        };
        if self.id.trim().is_empty() {
            return Err(invalid("rule id is empty".to_string()));
        }
        if self.name.trim().is_empty() {
            return Err(invalid("rule name is empty".to_string()));
        }
        match self.condition.structural_error() {
            Some(reason) => Err(invalid(reason)),
            None => Ok(()),
        }
    }

    /// [`validate`](Self::validate), then reject trend windows longer than a
    /// history of `history_capacity` samples can ever hold.
    pub fn validate_for_history(&self, history_capacity: usize) -> Result<()> {
        self.validate()?;
        let capacity = history_capacity.max(1);
        match self.condition.max_sample_count() {
            Some(needed) if needed > capacity => Err(AlertError::InvalidRule {
                rule_id: self.id.clone(),
                reason: format!(
                    "trend needs {needed} samples but history keeps only {capacity} per signal"
                ),
            }),
            _ => Ok(()),
        }
    }
}
