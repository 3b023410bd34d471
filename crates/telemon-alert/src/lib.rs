//! Declarative alert rule engine for equipment telemetry.
//!
//! Rules pair an [`condition::AlertCondition`] (threshold, range, trend or an
//! AND/OR composite of those) with a severity, a cooldown and an optional
//! equipment scope. The [`engine::AlertEngine`] evaluates every enabled rule
//! against a flat reading set, consults bounded per-signal history for trend
//! conditions, suppresses rules still in cooldown and returns the alerts that
//! fired.
//!
//! ```
//! use std::collections::HashMap;
//! use telemon_alert::condition::{AlertCondition, CompareOp};
//! use telemon_alert::engine::AlertEngine;
//! use telemon_alert::rule::AlertRule;
//! use telemon_common::types::Severity;
//!
//! let mut engine = AlertEngine::default();
//! engine.add_rule(AlertRule::new(
//!     "temp-high",
//!     "High temperature",
//!     AlertCondition::threshold("temperature", CompareOp::GreaterThan, 80.0),
//!     Severity::Warning,
//! ));
//!
//! let readings = HashMap::from([("temperature".to_string(), 85.0)]);
//! let alerts = engine.evaluate(&readings, None);
//! assert_eq!(alerts.len(), 1);
//! ```

pub mod adapter;
pub mod condition;
pub mod cooldown;
pub mod engine;
pub mod error;
pub mod history;
pub mod message;
pub mod registry;
pub mod rule;
pub mod rule_set;
pub mod shared;


pub use condition::AlertCondition;
pub use engine::{AlertEngine, EngineConfig};
pub use rule::AlertRule;
pub use shared::SharedAlertEngine;
