use std::collections::HashMap;

/// Per-rule last-fired timestamps (epoch milliseconds).
#[derive(Debug, Clone, Default)]
pub struct CooldownTracker {
    last_fired: HashMap<String, i64>,
}

impl CooldownTracker {
    pub fn new() -> Self {
        Self::default()
    }

    /// `true` when the rule has never fired or at least `cooldown_ms` has
    /// elapsed since it last did.
    pub fn should_fire(&self, rule_id: &str, now_ms: i64, cooldown_ms: u64) -> bool {
        match self.last_fired.get(rule_id) {
            None => true,
            Some(&last) => {
                let cooldown = i64::try_from(cooldown_ms).unwrap_or(i64::MAX);
                now_ms.saturating_sub(last) >= cooldown
            }
        }
    }

    pub fn record_fired(&mut self, rule_id: &str, now_ms: i64) {
        self.last_fired.insert(rule_id.to_string(), now_ms);
    }

    pub fn last_fired(&self, rule_id: &str) -> Option<i64> {
        self.last_fired.get(rule_id).copied()
    }

    /// Drop the state of a single rule.
    pub fn forget(&mut self, rule_id: &str) {
        self.last_fired.remove(rule_id);
    }

    pub fn clear(&mut self) {
        self.last_fired.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fires_when_never_recorded() {
        let tracker = CooldownTracker::new();
        assert!(tracker.should_fire("r1", 0, 60_000));
        assert_eq!(tracker.last_fired("r1"), None);
    }

    #[test]
    fn suppressed_until_cooldown_elapses() {
        let mut tracker = CooldownTracker::new();
        tracker.record_fired("r1", 1_000);

        assert!(!tracker.should_fire("r1", 1_000, 500));
        assert!(!tracker.should_fire("r1", 1_499, 500));
        assert!(tracker.should_fire("r1", 1_500, 500));
        assert!(tracker.should_fire("r2", 1_000, 500));
    }

    #[test]
    fn zero_cooldown_always_fires() {
        let mut tracker = CooldownTracker::new();
        tracker.record_fired("r1", 1_000);
        assert!(tracker.should_fire("r1", 1_000, 0));
    }

    #[test]
    fn clock_going_backwards_stays_suppressed() {
        let mut tracker = CooldownTracker::new();
        tracker.record_fired("r1", 10_000);
        assert!(!tracker.should_fire("r1", 9_000, 1));
    }

    #[test]
    fn record_overwrites_and_forget_clears() {
        let mut tracker = CooldownTracker::new();
        tracker.record_fired("r1", 1_000);
        tracker.record_fired("r1", 5_000);
        tracker.record_fired("r2", 2_000);
        assert_eq!(tracker.last_fired("r1"), Some(5_000));

        tracker.forget("r1");
        assert!(tracker.should_fire("r1", 5_000, 60_000));
        assert_eq!(tracker.last_fired("r2"), Some(2_000));

        tracker.clear();
        assert_eq!(tracker.last_fired("r2"), None);
    }

    #[test]
    fn huge_cooldown_does_not_overflow() {
        let mut tracker = CooldownTracker::new();
        tracker.record_fired("r1", 0);
        assert!(!tracker.should_fire("r1", i64::MAX - 1, u64::MAX));
    }
}
