//! Test utilities for unit and property-based tests
//!
//! Fixture builders for canonical and raw readings, plus proptest generators
//! for domain values (timestamps in and out of the valid window, coordinates,
//! whole raw documents).

pub mod fixtures {
    use crate::domain::{RawReading, Reading};
    use crate::time::RawTimestamp;
    use crate::validation::validate_reading;

    /// Raw document at a coordinate carrying an epoch-wrapper timestamp and
    /// plausible measurement values.
    pub fn raw_reading_at(latitude: f64, longitude: f64, epoch_seconds: i64) -> RawReading {
        RawReading {
            id: Some(format!("doc-{epoch_seconds}")),
            latitude: Some(latitude),
            longitude: Some(longitude),
            temperature: Some(29.4),
            humidity: Some(71.0),
            voc: Some(120.0),
            pm1: Some(8.0),
            pm25: Some(14.2),
            pm10: Some(21.0),
            rainfall: Some(0.0),
            wind_speed: Some(2.4),
            wind_direction: Some("SW".to_string()),
            co2: Some(417.0),
            device_id: Some("aq-node-1".to_string()),
            timestamp: Some(RawTimestamp::Epoch {
                seconds: epoch_seconds,
                nanoseconds: 0,
            }),
        }
    }

    /// Canonical reading at a coordinate. `epoch_seconds` must fall inside
    /// the valid timestamp window.
    pub fn reading_at(latitude: f64, longitude: f64, epoch_seconds: i64) -> Reading {
        validate_reading(raw_reading_at(latitude, longitude, epoch_seconds))
            .expect("fixture timestamp must be inside the valid window")
    }
}

pub mod generators {
    use proptest::prelude::*;

    use crate::domain::RawReading;
    use crate::time::RawTimestamp;

    /// 2025-01-01T00:00:00Z, the first valid instant.
    pub const CUTOFF_EPOCH_SECONDS: i64 = 1_735_689_600;
    /// 2030-01-01T00:00:00Z, upper bound for generated valid timestamps.
    pub const HORIZON_EPOCH_SECONDS: i64 = 1_893_456_000;

    /// Epoch seconds inside the valid window (2025 through 2029).
    pub fn valid_epoch_seconds() -> impl Strategy<Value = i64> {
        CUTOFF_EPOCH_SECONDS..HORIZON_EPOCH_SECONDS
    }

    /// Epoch seconds before the 2025 floor (1970 through 2024).
    pub fn pre_cutoff_epoch_seconds() -> impl Strategy<Value = i64> {
        0..CUTOFF_EPOCH_SECONDS
    }

    /// A valid timestamp in any of the three wire shapes.
    pub fn valid_raw_timestamp() -> impl Strategy<Value = RawTimestamp> {
        valid_epoch_seconds().prop_flat_map(|seconds| {
            let text = chrono::DateTime::from_timestamp(seconds, 0)
                .expect("generated seconds are in range")
                .to_rfc3339();
            prop_oneof![
                Just(RawTimestamp::Epoch {
                    seconds,
                    nanoseconds: 0
                }),
                Just(RawTimestamp::Millis(seconds * 1000)),
                Just(RawTimestamp::Text(text)),
            ]
        })
    }

    /// A timestamp the validator must reject: pre-cutoff in any wire shape,
    /// or unparseable text.
    pub fn invalid_raw_timestamp() -> impl Strategy<Value = RawTimestamp> {
        prop_oneof![
            pre_cutoff_epoch_seconds().prop_map(|seconds| RawTimestamp::Epoch {
                seconds,
                nanoseconds: 0
            }),
            pre_cutoff_epoch_seconds().prop_map(|seconds| RawTimestamp::Millis(seconds * 1000)),
            Just(RawTimestamp::Text("not-a-date".to_string())),
            Just(RawTimestamp::Text(String::new())),
            Just(RawTimestamp::Text("2024-12-31".to_string())),
        ]
    }

    /// Latitude within the sensor deployment area.
    pub fn latitude() -> impl Strategy<Value = f64> {
        5.9..9.9f64
    }

    /// Longitude within the sensor deployment area.
    pub fn longitude() -> impl Strategy<Value = f64> {
        79.5..81.9f64
    }

    /// A complete raw document with a valid timestamp.
    pub fn raw_reading() -> impl Strategy<Value = RawReading> {
        (
            latitude(),
            longitude(),
            0.0..300.0f64,
            valid_raw_timestamp(),
        )
            .prop_map(|(latitude, longitude, pm25, timestamp)| RawReading {
                latitude: Some(latitude),
                longitude: Some(longitude),
                pm25: Some(pm25),
                timestamp: Some(timestamp),
                ..RawReading::default()
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::time::resolve_timestamp;
    use proptest::prelude::*;

    proptest! {
        #[test]
        fn prop_valid_generator_resolves(ts in generators::valid_raw_timestamp()) {
            prop_assert!(resolve_timestamp(Some(&ts)).is_some());
        }

        #[test]
        fn prop_invalid_generator_rejects(ts in generators::invalid_raw_timestamp()) {
            prop_assert!(resolve_timestamp(Some(&ts)).is_none());
        }
    }

    #[test]
    fn test_fixture_reading_is_valid() {
        let reading = fixtures::reading_at(6.791164, 79.900497, 1_749_945_600);
        assert_eq!(reading.timestamp.timestamp(), 1_749_945_600);
        assert_eq!(reading.wind_direction, "SW");
        assert!(reading.aqi > 0);
    }
}
