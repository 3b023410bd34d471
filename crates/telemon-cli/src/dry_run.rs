//! Replays JSON-lines reading batches through an engine and prints the alerts
//! that would have fired.
//!
//! Each input line is one batch:
//!
//! ```json
//! {"equipment_id": "press-01", "timestamp": "2024-06-01T08:00:00Z",
//!  "readings": [{"sensor_type": "temperature", "value": 85.5}]}
//! ```
//!
//! `equipment_id` and `timestamp` are optional; a missing timestamp means
//! "now". Every reading is recorded into history before the batch is
//! evaluated, and each triggered alert is written as one JSON line.

use anyhow::Result;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::io::{BufRead, Write};
use telemon_alert::adapter::readings_from_sensors;
use telemon_alert::engine::AlertEngine;
use telemon_common::types::SensorReading;

#[derive(Debug, Clone, Deserialize)]
pub struct ReadingBatch {
    #[serde(default)]
    pub equipment_id: Option<String>,
    #[serde(default)]
    pub timestamp: Option<DateTime<Utc>>,
    #[serde(default)]
    pub readings: Vec<SensorReading>,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct DryRunSummary {
    pub batches: usize,
    pub alerts: usize,
    pub malformed: usize,
}

pub fn run(
    engine: &mut AlertEngine,
    input: impl BufRead,
    mut output: impl Write,
    default_equipment_id: Option<&str>,
) -> Result<DryRunSummary> {
    let mut summary = DryRunSummary::default();

    for (index, line) in input.split(b'\n').enumerate() {
        let line = line?;
        let line = match std::str::from_utf8(&line) {
            Ok(line) => line.trim(),
            Err(e) => {
                tracing::warn!(
                    line = index + 1,
                    error = %e,
                    "Skipping reading batch that is not UTF-8"
                );
                summary.malformed += 1;
                continue;
            }
        };
        if line.is_empty() {
            continue;
        }

        let batch: ReadingBatch = match serde_json::from_str(line) {
            Ok(batch) => batch,
            Err(e) => {
                tracing::warn!(line = index + 1, error = %e, "Skipping malformed reading batch");
                summary.malformed += 1;
                continue;
            }
        };
        summary.batches += 1;

        let now = batch.timestamp.unwrap_or_else(Utc::now);
        let equipment_id = batch.equipment_id.as_deref().or(default_equipment_id);
        let readings = readings_from_sensors(&batch.readings);

        for (field, value) in &readings {
            engine.update_history_at(field, *value, now);
        }

        let alerts = engine.evaluate_at(&readings, equipment_id, now);
        tracing::debug!(
            line = index + 1,
            signals = readings.len(),
            alerts = alerts.len(),
            "Batch evaluated"
        );

        for alert in &alerts {
            serde_json::to_writer(&mut output, alert)?;
            writeln!(output)?;
        }
        summary.alerts += alerts.len();
    }

    output.flush()?;
    Ok(summary)
}

#[cfg(test)]
mod tests {
    use super::*;
    use telemon_alert::condition::{AlertCondition, CompareOp};
    use telemon_alert::rule::AlertRule;
    use telemon_common::types::{Severity, TriggeredAlert};

    fn engine() -> AlertEngine {
        let mut engine = AlertEngine::default();
        engine.add_rule(
            AlertRule::new(
                "temp-high",
                "High temperature",
                AlertCondition::threshold("temperature", CompareOp::GreaterThan, 80.0),
                Severity::Warning,
            )
            .with_cooldown_ms(60_000),
        );
        engine
    }

    #[test]
    fn replays_batches_with_cooldown_by_batch_time() {
        let input = concat!(
            r#"{"equipment_id":"press-01","timestamp":"2024-06-01T08:00:00Z","readings":[{"sensor_type":"温度","value":85}]}"#,
            "\n\n",
            r#"{"timestamp":"2024-06-01T08:00:30Z","readings":[{"sensor_type":"temperature","value":90}]}"#,
            "\n",
            "not json\n",
            r#"{"timestamp":"2024-06-01T08:01:00Z","readings":[{"sensor_type":"temperature","value":91}]}"#,
            "\n",
        );

        let mut engine = engine();
        let mut out = Vec::new();
        let summary = run(&mut engine, input.as_bytes(), &mut out, Some("line-2")).unwrap();

        assert_eq!(
            summary,
            DryRunSummary {
                batches: 3,
                alerts: 2,
                malformed: 1
            }
        );

        let alerts: Vec<TriggeredAlert> = String::from_utf8(out)
            .unwrap()
            .lines()
            .map(|l| serde_json::from_str(l).unwrap())
            .collect();
        assert_eq!(alerts.len(), 2);
        assert_eq!(alerts[0].equipment_id.as_deref(), Some("press-01"));
        assert_eq!(alerts[0].triggering_values["temperature"], 85.0);
        assert_eq!(alerts[1].equipment_id.as_deref(), Some("line-2"));
        assert_eq!(alerts[1].triggering_values["temperature"], 91.0);
    }

    #[test]
    fn invalid_utf8_line_is_skipped_as_malformed() {
        let mut input = Vec::new();
        input.extend_from_slice(
            br#"{"timestamp":"2024-06-01T08:00:00Z","readings":[{"sensor_type":"temperature","value":85}]}"#,
        );
        input.extend_from_slice(b"\n\xff\xfe garbage\n");
        input.extend_from_slice(
            br#"{"timestamp":"2024-06-01T08:05:00Z","readings":[{"sensor_type":"temperature","value":88}]}"#,
        );
        input.push(b'\n');

        let mut engine = engine();
        let mut out = Vec::new();
        let summary = run(&mut engine, input.as_slice(), &mut out, None).unwrap();

        assert_eq!(
            summary,
            DryRunSummary {
                batches: 2,
                alerts: 2,
                malformed: 1
            }
        );
        assert_eq!(String::from_utf8(out).unwrap().lines().count(), 2);
    }

    #[test]
    fn readings_are_recorded_into_history() {
        let mut engine = AlertEngine::default();
        let input = r#"{"readings":[{"sensor_type":"vibracao","value":4.0}]}
{"readings":[{"sensor_type":"vibration","value":4.1}]}
"#;
        run(&mut engine, input.as_bytes(), std::io::sink(), None).unwrap();
        assert_eq!(engine.history_len("vibration"), 2);
        assert_eq!(engine.history_len("vibracao"), 1);
    }
}
