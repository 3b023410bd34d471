//! Flattens collector readings into the [`Readings`] map the engine evaluates.

use telemon_common::i18n::canonical_signal;
use telemon_common::types::{Readings, SensorReading};

/// Convert labelled sensor readings into a flat signal map.
///
/// Every reading is keyed by its own label. Localized labels found in the
/// translation table are additionally keyed by their canonical signal name,
/// so rules can be written against either convention. Later readings
/// overwrite earlier ones with the same key; NaN values are dropped.
///
/// ```
/// use telemon_alert::adapter::readings_from_sensors;
/// use telemon_common::types::SensorReading;
///
/// let readings = readings_from_sensors(&[SensorReading::new("温度", 85.0)]);
/// assert_eq!(readings.get("温度"), Some(&85.0));
/// assert_eq!(readings.get("temperature"), Some(&85.0));
/// ```
pub fn readings_from_sensors(sensors: &[SensorReading]) -> Readings {
    let mut readings = Readings::with_capacity(sensors.len() * 2);
    for sensor in sensors {
        if sensor.value.is_nan() {
            tracing::debug!(sensor_type = %sensor.sensor_type, "Dropping NaN sensor reading");
            continue;
        }
        let label = sensor.sensor_type.trim();
        if label.is_empty() {
            continue;
        }
        readings.insert(label.to_string(), sensor.value);
        if let Some(canonical) = canonical_signal(label) {
            readings.insert(canonical.to_string(), sensor.value);
        }
    }
    readings
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn canonical_labels_pass_through() {
        let readings = readings_from_sensors(&[
            SensorReading::new("temperature", 70.0),
            SensorReading::new("vibration", 4.2),
        ]);
        assert_eq!(readings.len(), 2);
        assert_eq!(readings["vibration"], 4.2);
    }

    #[test]
    fn localized_labels_expose_both_keys() {
        let readings = readings_from_sensors(&[
            SensorReading::new("Temperatura", 81.0),
            SensorReading::new("振动", 6.1),
        ]);
        assert_eq!(readings["Temperatura"], 81.0);
        assert_eq!(readings["temperature"], 81.0);
        assert_eq!(readings["振动"], 6.1);
        assert_eq!(readings["vibration"], 6.1);
    }

    #[test]
    fn later_readings_win_and_nan_is_dropped() {
        let readings = readings_from_sensors(&[
            SensorReading::new("temperature", 60.0),
            SensorReading::new("温度", 65.0),
            SensorReading::new("pressure", f64::NAN),
            SensorReading::new("  ", 1.0),
        ]);
        assert_eq!(readings["temperature"], 65.0);
        assert!(!readings.contains_key("pressure"));
        assert_eq!(readings.len(), 2);
    }
}
