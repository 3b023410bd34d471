//! The condition algebra: threshold, range, trend and composite conditions,
//! and the pure evaluator over a reading set plus per-signal history.

use crate::history::HistoryStore;
use serde::{Deserialize, Serialize};
use std::str::FromStr;
use telemon_common::types::Readings;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum CompareOp {
    #[serde(rename = "gt", alias = "greater_than")]
    GreaterThan,
    #[serde(rename = "gte", alias = "greater_equal")]
    GreaterEqual,
    #[serde(rename = "lt", alias = "less_than")]
    LessThan,
    #[serde(rename = "lte", alias = "less_equal")]
    LessEqual,
    #[serde(rename = "eq", alias = "equal")]
    Equal,
    #[serde(rename = "neq", alias = "not_equal")]
    NotEqual,
}

impl FromStr for CompareOp {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "gt" | "greater_than" => Ok(Self::GreaterThan),
            "gte" | "greater_equal" => Ok(Self::GreaterEqual),
            "lt" | "less_than" => Ok(Self::LessThan),
            "lte" | "less_equal" => Ok(Self::LessEqual),
            "eq" | "equal" => Ok(Self::Equal),
            "neq" | "not_equal" => Ok(Self::NotEqual),
            _ => Err(format!("unknown compare operator: {s}")),
        }
    }
}

impl std::fmt::Display for CompareOp {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::GreaterThan => write!(f, "gt"),
            Self::GreaterEqual => write!(f, "gte"),
            Self::LessThan => write!(f, "lt"),
            Self::LessEqual => write!(f, "lte"),
            Self::Equal => write!(f, "eq"),
            Self::NotEqual => write!(f, "neq"),
        }
    }
}

impl CompareOp {
    /// Exact numeric comparison; `eq`/`neq` do not apply a tolerance.
    #[allow(clippy::float_cmp)]
    pub fn check(&self, value: f64, threshold: f64) -> bool {
        match self {
            Self::GreaterThan => value > threshold,
            Self::GreaterEqual => value >= threshold,
            Self::LessThan => value < threshold,
            Self::LessEqual => value <= threshold,
            Self::Equal => value == threshold,
            Self::NotEqual => value != threshold,
        }
    }

    pub fn symbol(&self) -> &'static str {
        match self {
            Self::GreaterThan => ">",
            Self::GreaterEqual => ">=",
            Self::LessThan => "<",
            Self::LessEqual => "<=",
            Self::Equal => "==",
            Self::NotEqual => "!=",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RangeMode {
    #[default]
    Inside,
    Outside,
}

impl std::fmt::Display for RangeMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Inside => write!(f, "inside"),
            Self::Outside => write!(f, "outside"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TrendDirection {
    Increasing,
    Decreasing,
    Stable,
}

impl std::fmt::Display for TrendDirection {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Increasing => write!(f, "increasing"),
            Self::Decreasing => write!(f, "decreasing"),
            Self::Stable => write!(f, "stable"),
        }
    }
}

impl TrendDirection {
    /// Classify the move from `first` to `last` as a percentage of `|first|`.
    ///
    /// A zero starting value is always `Stable`.
    ///
    /// ```
    /// use telemon_alert::condition::TrendDirection;
    ///
    /// assert_eq!(TrendDirection::classify(5.0, 6.5, 20.0), TrendDirection::Increasing);
    /// assert_eq!(TrendDirection::classify(5.0, 5.5, 20.0), TrendDirection::Stable);
    /// assert_eq!(TrendDirection::classify(0.0, 9.0, 20.0), TrendDirection::Stable);
    /// ```
    pub fn classify(first: f64, last: f64, threshold_percent: f64) -> Self {
        if first == 0.0 {
            return Self::Stable;
        }
        let change = (last - first) / first.abs() * 100.0;
        if change > threshold_percent {
            Self::Increasing
        } else if change < -threshold_percent {
            Self::Decreasing
        } else {
            Self::Stable
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LogicalOp {
    And,
    Or,
}

impl std::fmt::Display for LogicalOp {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::And => write!(f, "and"),
            Self::Or => write!(f, "or"),
        }
    }
}

/// A rule condition. Serialized with an internal `"type"` tag, e.g.
/// `{"type":"threshold","field":"temperature","operator":"gt","value":80}`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum AlertCondition {
    Threshold {
        field: String,
        operator: CompareOp,
        value: f64,
    },
    Range {
        field: String,
        min: f64,
        max: f64,
        #[serde(default)]
        mode: RangeMode,
    },
    Trend {
        field: String,
        direction: TrendDirection,
        sample_count: usize,
        change_threshold_percent: f64,
    },
    Composite {
        operator: LogicalOp,
        conditions: Vec<AlertCondition>,
    },
}

impl AlertCondition {
    pub fn threshold(field: impl Into<String>, operator: CompareOp, value: f64) -> Self {
        Self::Threshold {
            field: field.into(),
            operator,
            value,
        }
    }

    pub fn range(field: impl Into<String>, min: f64, max: f64, mode: RangeMode) -> Self {
        Self::Range {
            field: field.into(),
            min,
            max,
            mode,
        }
    }

    pub fn trend(
        field: impl Into<String>,
        direction: TrendDirection,
        sample_count: usize,
        change_threshold_percent: f64,
    ) -> Self {
        Self::Trend {
            field: field.into(),
            direction,
            sample_count,
            change_threshold_percent,
        }
    }

    pub fn all(conditions: Vec<AlertCondition>) -> Self {
        Self::Composite {
            operator: LogicalOp::And,
            conditions,
        }
    }

    pub fn any(conditions: Vec<AlertCondition>) -> Self {
        Self::Composite {
            operator: LogicalOp::Or,
            conditions,
        }
    }

    /// Evaluate against the current readings and, for trend conditions, the
    /// recorded history. Missing signals and cold trend windows yield `false`.
    pub fn evaluate(&self, readings: &Readings, history: &HistoryStore) -> bool {
        match self {
            Self::Threshold {
                field,
                operator,
                value,
            } => lookup(readings, field).is_some_and(|v| operator.check(v, *value)),
            Self::Range {
                field,
                min,
                max,
                mode,
            } => lookup(readings, field).is_some_and(|v| {
                let in_range = *min <= v && v <= *max;
                match mode {
                    RangeMode::Inside => in_range,
                    RangeMode::Outside => !in_range,
                }
            }),
            Self::Trend {
                field,
                direction,
                sample_count,
                change_threshold_percent,
            } => {
                let Some(buffer) = history.get(field) else {
                    return false;
                };
                if *sample_count == 0 || buffer.len() < *sample_count {
                    return false;
                }
                let window = buffer.slice(*sample_count);
                let (Some(first), Some(last)) = (window.first(), window.last()) else {
                    return false;
                };
                // NaN samples are treated as absent, like NaN readings.
                if first.value.is_nan() || last.value.is_nan() {
                    return false;
                }
                TrendDirection::classify(first.value, last.value, *change_threshold_percent)
                    == *direction
            }
            // An empty child list never fires, for either operator.
            Self::Composite {
                operator,
                conditions,
            } => {
                if conditions.is_empty() {
                    return false;
                }
                match operator {
                    LogicalOp::And => conditions.iter().all(|c| c.evaluate(readings, history)),
                    LogicalOp::Or => conditions.iter().any(|c| c.evaluate(readings, history)),
                }
            }
        }
    }

    /// Every signal name referenced by this condition, depth-first, without
    /// duplicates.
    pub fn fields(&self) -> Vec<&str> {
        let mut out = Vec::new();
        self.collect_fields(&mut out);
        out
    }

    /// Largest trend `sample_count` anywhere in this condition, if it has
    /// any trend child. A history shorter than this can never satisfy it.
    pub fn max_sample_count(&self) -> Option<usize> {
        match self {
            Self::Trend { sample_count, .. } => Some(*sample_count),
            Self::Threshold { .. } | Self::Range { .. } => None,
            Self::Composite { conditions, .. } => conditions
                .iter()
                .filter_map(AlertCondition::max_sample_count)
                .max(),
        }
    }

    fn collect_fields<'a>(&'a self, out: &mut Vec<&'a str>) {
        match self {
            Self::Threshold { field, .. } | Self::Range { field, .. } | Self::Trend { field, .. } => {
                if !out.contains(&field.as_str()) {
                    out.push(field);
                }
            }
            Self::Composite { conditions, .. } => {
                for c in conditions {
                    c.collect_fields(out);
                }
            }
        }
    }

    /// Describe the first structural problem found, if any.
    pub(crate) fn structural_error(&self) -> Option<String> {
        match self {
            Self::Threshold { field, value, .. } => {
                if field.trim().is_empty() {
                    Some("threshold condition has an empty field".to_string())
                } else if !value.is_finite() {
                    Some(format!("threshold value for '{field}' is not finite"))
                } else {
                    None
                }
            }
            Self::Range { field, min, max, .. } => {
                if field.trim().is_empty() {
                    Some("range condition has an empty field".to_string())
                } else if min.is_nan() || max.is_nan() {
                    Some(format!("range bounds for '{field}' are not numbers"))
                } else if min > max {
                    Some(format!("range for '{field}' has min {min} greater than max {max}"))
                } else {
                    None
                }
            }
            Self::Trend {
                field,
                sample_count,
                change_threshold_percent,
                ..
            } => {
                if field.trim().is_empty() {
                    Some("trend condition has an empty field".to_string())
                } else if *sample_count == 0 {
                    Some(format!("trend for '{field}' needs a sample_count of at least 1"))
                } else if !change_threshold_percent.is_finite() || *change_threshold_percent < 0.0
                {
                    Some(format!(
                        "trend for '{field}' has an invalid change_threshold_percent"
                    ))
                } else {
                    None
                }
            }
            Self::Composite { conditions, .. } => {
                if conditions.is_empty() {
                    return Some("composite condition has no children".to_string());
                }
                conditions.iter().find_map(AlertCondition::structural_error)
            }
        }
    }
}

/// NaN readings are treated as absent.
fn lookup(readings: &Readings, field: &str) -> Option<f64> {
    readings.get(field).copied().filter(|v| !v.is_nan())
}
