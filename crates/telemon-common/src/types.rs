use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// A flat set of current signal values keyed by signal name
/// (e.g. `"temperature" -> 85.5`).
pub type Readings = HashMap<String, f64>;

/// A single timestamped sample recorded in a signal's history.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DataPoint {
    pub value: f64,
    /// Epoch milliseconds (UTC).
    pub timestamp_ms: i64,
}

impl DataPoint {
    pub fn new(value: f64, timestamp_ms: i64) -> Self {
        Self {
            value,
            timestamp_ms,
        }
    }

    /// Stamp a value with the given wall-clock time.
    pub fn at(value: f64, timestamp: DateTime<Utc>) -> Self {
        Self::new(value, timestamp.timestamp_millis())
    }
}

/// A raw reading as delivered by a collector, labelled with its sensor type.
///
/// Labels may be canonical (`"temperature"`) or localized (`"温度"`,
/// `"temperatura"`); the alert crate's adapter flattens both conventions
/// into [`Readings`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SensorReading {
    pub sensor_type: String,
    pub value: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub unit: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timestamp: Option<DateTime<Utc>>,
}

impl SensorReading {
    pub fn new(sensor_type: impl Into<String>, value: f64) -> Self {
        Self {
            sensor_type: sensor_type.into(),
            value,
            unit: None,
            timestamp: None,
        }
    }
}

/// Alert severity level, ordered from lowest to highest.
///
/// # Examples
///
/// ```
/// use telemon_common::types::Severity;
///
/// let sev: Severity = "warning".parse().unwrap();
/// assert_eq!(sev, Severity::Warning);
/// assert_eq!(sev.to_string(), "warning");
/// assert!(Severity::Critical > Severity::Info);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Info,
    Warning,
    Critical,
}

impl std::fmt::Display for Severity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Severity::Info => write!(f, "info"),
            Severity::Warning => write!(f, "warning"),
            Severity::Critical => write!(f, "critical"),
        }
    }
}

impl std::str::FromStr for Severity {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "info" => Ok(Severity::Info),
            "warning" => Ok(Severity::Warning),
            "critical" => Ok(Severity::Critical),
            _ => Err(format!("unknown severity: {s}")),
        }
    }
}

/// An alert produced by a rule firing. Built once by the engine and handed
/// to the caller; never mutated afterwards.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TriggeredAlert {
    pub rule_id: String,
    pub rule_name: String,
    pub severity: Severity,
    pub message: String,
    /// Serialized as an RFC 3339 / ISO-8601 string.
    pub timestamp: DateTime<Utc>,
    /// Snapshot of the readings the rule was evaluated against.
    pub triggering_values: Readings,
    /// Equipment id supplied to the evaluation call, if any.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub equipment_id: Option<String>,
}

impl TriggeredAlert {
    /// ISO-8601 rendering of the firing time with millisecond precision.
    pub fn timestamp_iso(&self) -> String {
        self.timestamp
            .to_rfc3339_opts(chrono::SecondsFormat::Millis, true)
    }
}
