use crate::engine::{AlertEngine, EngineConfig};
use crate::error::Result;
use crate::rule::AlertRule;
use chrono::{DateTime, Utc};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use telemon_common::types::{Readings, TriggeredAlert};

/// A cloneable, thread-safe handle to one [`AlertEngine`].
///
/// Every operation holds the same lock for its whole duration, so the
/// cooldown check and the firing record inside `evaluate` form one critical
/// section and concurrent callers cannot both fire a rule inside its cooldown.
#[derive(Clone, Default)]
pub struct SharedAlertEngine {
    inner: Arc<Mutex<AlertEngine>>,
}

impl SharedAlertEngine {
    pub fn new(config: EngineConfig) -> Self {
        Self::from_engine(AlertEngine::new(config))
    }

    pub fn from_engine(engine: AlertEngine) -> Self {
        Self {
            inner: Arc::new(Mutex::new(engine)),
        }
    }

    /// Lock the engine for a sequence of operations that must not interleave
    /// with other callers (e.g. recording a whole batch and evaluating it).
    pub fn lock(&self) -> MutexGuard<'_, AlertEngine> {
        // Engine state stays consistent between statements, so a panic in
        // another holder does not leave it half-updated.
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }

    pub fn add_rule(&self, rule: AlertRule) {
        self.lock().add_rule(rule);
    }

    pub fn try_add_rule(&self, rule: AlertRule) -> Result<()> {
        self.lock().try_add_rule(rule)
    }

    pub fn remove_rule(&self, id: &str) -> bool {
        self.lock().remove_rule(id)
    }

    pub fn set_rule_enabled(&self, id: &str, enabled: bool) -> bool {
        self.lock().set_rule_enabled(id, enabled)
    }

    pub fn get_rule(&self, id: &str) -> Option<AlertRule> {
        self.lock().get_rule(id).cloned()
    }

    /// Snapshot of all rules in registry order.
    pub fn rules(&self) -> Vec<AlertRule> {
        self.lock().rules().to_vec()
    }

    pub fn evaluate(&self, readings: &Readings, equipment_id: Option<&str>) -> Vec<TriggeredAlert> {
        self.lock().evaluate(readings, equipment_id)
    }

    pub fn evaluate_at(
        &self,
        readings: &Readings,
        equipment_id: Option<&str>,
        now: DateTime<Utc>,
    ) -> Vec<TriggeredAlert> {
        self.lock().evaluate_at(readings, equipment_id, now)
    }

    pub fn update_history(&self, field: &str, value: f64) {
        self.lock().update_history(field, value);
    }

    pub fn update_history_at(&self, field: &str, value: f64, now: DateTime<Utc>) {
        self.lock().update_history_at(field, value, now);
    }

    pub fn clear_history(&self) {
        self.lock().clear_history();
    }

    pub fn clear_cooldowns(&self) {
        self.lock().clear_cooldowns();
    }
}
