use crate::cooldown::CooldownTracker;
use crate::error::Result;
use crate::history::{HistoryStore, DEFAULT_HISTORY_CAPACITY};
use crate::message::format_message;
use crate::registry::RuleRegistry;
use crate::rule::AlertRule;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use telemon_common::i18n::DEFAULT_LOCALE;
use telemon_common::types::{Readings, TriggeredAlert};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EngineConfig {
    /// Samples retained per signal for trend conditions.
    #[serde(default = "default_history_capacity")]
    pub history_capacity: usize,
    /// Locale for generated default messages (`en`, `zh-CN`).
    #[serde(default = "default_locale")]
    pub locale: String,
}

fn default_history_capacity() -> usize {
    DEFAULT_HISTORY_CAPACITY
}

fn default_locale() -> String {
    DEFAULT_LOCALE.to_string()
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            history_capacity: default_history_capacity(),
            locale: default_locale(),
        }
    }
}

/// Evaluates registered rules against reading batches.
///
/// The engine owns the rule registry, the per-signal history used by trend
/// conditions and the per-rule cooldown state. It is a plain synchronous
/// value; wrap it in [`SharedAlertEngine`](crate::shared::SharedAlertEngine)
/// to share it between threads.
pub struct AlertEngine {
    config: EngineConfig,
    registry: RuleRegistry,
    history: HistoryStore,
    cooldowns: CooldownTracker,
}

impl AlertEngine {
    pub fn new(config: EngineConfig) -> Self {
        Self {
            history: HistoryStore::new(config.history_capacity),
            registry: RuleRegistry::new(),
            cooldowns: CooldownTracker::new(),
            config,
        }
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    pub fn rules(&self) -> &[AlertRule] {
        self.registry.list()
    }

    /// Get a rule by its ID.
    pub fn get_rule(&self, id: &str) -> Option<&AlertRule> {
        self.registry.get(id)
    }

    /// Add or replace a rule. The rule is stored as given, without validation.
    pub fn add_rule(&mut self, rule: AlertRule) {
        tracing::debug!(rule_id = %rule.id, enabled = rule.enabled, "Alert rule registered");
        self.registry.add(rule);
    }

    /// Check a rule against this engine: structure, plus trend windows that
    /// fit the configured history capacity.
    pub fn validate_rule(&self, rule: &AlertRule) -> Result<()> {
        rule.validate_for_history(self.config.history_capacity)
    }

    /// Validate a rule and register it, rejecting malformed definitions and
    /// rules that could never fire with this engine's history.
    pub fn try_add_rule(&mut self, rule: AlertRule) -> Result<()> {
        self.validate_rule(&rule)?;
        self.add_rule(rule);
        Ok(())
    }

    pub fn add_rules(&mut self, rules: impl IntoIterator<Item = AlertRule>) {
        for rule in rules {
            self.add_rule(rule);
        }
    }

    /// Remove a rule by ID together with its cooldown state, so a rule later
    /// re-added under the same id starts cold. Returns true if found.
    pub fn remove_rule(&mut self, id: &str) -> bool {
        self.cooldowns.forget(id);
        let removed = self.registry.remove(id);
        if removed {
            tracing::debug!(rule_id = id, "Alert rule removed");
        }
        removed
    }

    /// No-op (returns false) for unknown ids.
    pub fn set_rule_enabled(&mut self, id: &str, enabled: bool) -> bool {
        self.registry.set_enabled(id, enabled)
    }

    /// Record a sample for `field`, stamped with the current time.
    pub fn update_history(&mut self, field: &str, value: f64) {
        self.update_history_at(field, value, Utc::now());
    }

    pub fn update_history_at(&mut self, field: &str, value: f64, now: DateTime<Utc>) {
        self.history.record(field, value, now);
    }

    /// Number of samples currently held for `field`.
    pub fn history_len(&self, field: &str) -> usize {
        self.history.len(field)
    }

    pub fn clear_history(&mut self) {
        self.history.clear();
    }

    pub fn clear_cooldowns(&mut self) {
        self.cooldowns.clear();
    }

    /// Evaluate every enabled, applicable rule at the current time.
    pub fn evaluate(&mut self, readings: &Readings, equipment_id: Option<&str>) -> Vec<TriggeredAlert> {
        self.evaluate_at(readings, equipment_id, Utc::now())
    }

    /// Evaluate every enabled, applicable rule as of `now`.
    ///
    /// Alerts are returned in registry order. Each firing rule has its
    /// cooldown restarted at `now`.
    pub fn evaluate_at(
        &mut self,
        readings: &Readings,
        equipment_id: Option<&str>,
        now: DateTime<Utc>,
    ) -> Vec<TriggeredAlert> {
        let now_ms = now.timestamp_millis();
        let mut alerts = Vec::new();

        for rule in self.registry.list() {
            if !rule.enabled || !rule.applies_to(equipment_id) {
                continue;
            }

            if !self.cooldowns.should_fire(&rule.id, now_ms, rule.cooldown_ms) {
                tracing::debug!(
                    rule_id = %rule.id,
                    equipment_id = equipment_id.unwrap_or("-"),
                    "Alert suppressed (cooldown)"
                );
                continue;
            }

            if !rule.condition.evaluate(readings, &self.history) {
                continue;
            }

            let message = format_message(rule, readings, &self.config.locale);
            tracing::info!(
                rule_id = %rule.id,
                severity = %rule.severity,
                equipment_id = equipment_id.unwrap_or("-"),
                "Alert triggered"
            );

            alerts.push(TriggeredAlert {
                rule_id: rule.id.clone(),
                rule_name: rule.name.clone(),
                severity: rule.severity,
                message,
                timestamp: now,
                triggering_values: readings.clone(),
                equipment_id: equipment_id.map(str::to_string),
            });
            self.cooldowns.record_fired(&rule.id, now_ms);
        }

        alerts
    }
}

impl Default for AlertEngine {
    fn default() -> Self {
        Self::new(EngineConfig::default())
    }
}
