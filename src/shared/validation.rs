use std::sync::OnceLock;

use regex::Regex;
use tracing::debug;

use crate::aqi::calculate_aqi;
use crate::config::{FALLBACK_LATITUDE, FALLBACK_LONGITUDE};
use crate::domain::{RawReading, Reading};
use crate::time::resolve_timestamp;

/// Compass label used when a document carries none (or an unrecognized one).
pub const DEFAULT_WIND_DIRECTION: &str = "N";

/// Validate and normalize a batch of raw documents.
///
/// Documents whose timestamp cannot be resolved (or falls before the
/// `time::MIN_VALID_YEAR` floor) are dropped with a debug log line. Survivors
/// get the defaulting policy applied, their AQI derived, and come back sorted
/// descending by timestamp, most recent first. The sort is stable, so
/// readings with equal timestamps keep their input-relative order.
pub fn filter_valid_readings(raw: Vec<RawReading>) -> Vec<Reading> {
    let total = raw.len();
    let mut readings: Vec<Reading> = raw.into_iter().filter_map(validate_reading).collect();
    let dropped = total - readings.len();
    if dropped > 0 {
        debug!(total, dropped, "dropped documents with invalid timestamps");
    }

    readings.sort_by(|a, b| b.timestamp.cmp(&a.timestamp));
    readings
}

/// Validate a single raw document, returning `None` when its timestamp does
/// not resolve to a valid point in time.
///
/// Defaulting policy for the remaining fields: a missing or zero coordinate
/// coerces to the fallback station (a zero coordinate is an unsynced-GPS
/// placeholder in this feed, not a real position off the West African coast);
/// missing measurement fields coerce to 0; a missing or unrecognized wind
/// direction coerces to "N"; missing `id`/`device_id` coerce to "".
pub fn validate_reading(raw: RawReading) -> Option<Reading> {
    let timestamp = match resolve_timestamp(raw.timestamp.as_ref()) {
        Some(ts) => ts,
        None => {
            debug!(
                id = raw.id.as_deref().unwrap_or(""),
                device_id = raw.device_id.as_deref().unwrap_or(""),
                "dropping reading with unresolvable or pre-cutoff timestamp"
            );
            return None;
        }
    };

    let pm1 = raw.pm1.unwrap_or(0.0);
    let pm25 = raw.pm25.unwrap_or(0.0);
    let pm10 = raw.pm10.unwrap_or(0.0);

    Some(Reading {
        id: raw.id.unwrap_or_default(),
        latitude: coordinate_or(raw.latitude, FALLBACK_LATITUDE),
        longitude: coordinate_or(raw.longitude, FALLBACK_LONGITUDE),
        temperature_c: raw.temperature.unwrap_or(0.0),
        humidity_pct: raw.humidity.unwrap_or(0.0),
        voc_ppb: raw.voc.unwrap_or(0.0),
        pm1,
        pm25,
        pm10,
        rainfall_mm: raw.rainfall.unwrap_or(0.0),
        wind_speed_ms: raw.wind_speed.unwrap_or(0.0),
        wind_direction: normalize_wind_direction(raw.wind_direction.as_deref()),
        co2_ppm: raw.co2.unwrap_or(0.0),
        device_id: raw.device_id.unwrap_or_default(),
        timestamp,
        aqi: calculate_aqi(pm1, pm25, pm10),
    })
}

/// Normalize a wind direction label to one of the 16 compass points.
///
/// Case-insensitive; anything that is not a compass point after trimming and
/// uppercasing falls back to `DEFAULT_WIND_DIRECTION`.
pub fn normalize_wind_direction(raw: Option<&str>) -> String {
    static COMPASS_REGEX: OnceLock<Regex> = OnceLock::new();
    let regex = COMPASS_REGEX.get_or_init(|| {
        Regex::new(r"^(N|NNE|NE|ENE|E|ESE|SE|SSE|S|SSW|SW|WSW|W|WNW|NW|NNW)$").unwrap()
    });

    match raw {
        Some(label) => {
            let upper = label.trim().to_ascii_uppercase();
            if regex.is_match(&upper) {
                upper
            } else {
                DEFAULT_WIND_DIRECTION.to_string()
            }
        }
        None => DEFAULT_WIND_DIRECTION.to_string(),
    }
}

// Falsy coalescing mirrors the upstream feed: 0 means "not reported" for
// coordinates only, where the default is a real location.
fn coordinate_or(value: Option<f64>, fallback: f64) -> f64 {
    match value {
        Some(v) if v != 0.0 => v,
        _ => fallback,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_utils::fixtures;
    use crate::time::RawTimestamp;
    use chrono::{Datelike, TimeZone, Utc};

    #[test]
    fn test_pre_2025_reading_excluded() {
        let mut raw = fixtures::raw_reading_at(6.791164, 79.900497, 1_735_689_600);
        raw.timestamp = Some(RawTimestamp::Text("2024-12-31".to_string()));

        assert_eq!(filter_valid_readings(vec![raw]), vec![]);
    }

    #[test]
    fn test_missing_timestamp_excluded() {
        let mut raw = fixtures::raw_reading_at(6.791164, 79.900497, 1_735_689_600);
        raw.timestamp = None;

        assert_eq!(filter_valid_readings(vec![raw]), vec![]);
    }

    #[test]
    fn test_valid_reading_survives_with_resolved_timestamp() {
        let raw = fixtures::raw_reading_at(6.791164, 79.900497, 1_749_945_600);
        let readings = filter_valid_readings(vec![raw]);

        assert_eq!(readings.len(), 1);
        assert_eq!(readings[0].timestamp.year(), 2025);
    }

    #[test]
    fn test_sorted_descending_by_timestamp() {
        let raw = vec![
            fixtures::raw_reading_at(6.79, 79.90, 1_749_945_600),
            fixtures::raw_reading_at(6.79, 79.90, 1_749_945_900),
            fixtures::raw_reading_at(6.79, 79.90, 1_749_945_300),
        ];
        let readings = filter_valid_readings(raw);

        let stamps: Vec<i64> = readings.iter().map(|r| r.timestamp.timestamp()).collect();
        assert_eq!(stamps, vec![1_749_945_900, 1_749_945_600, 1_749_945_300]);
    }

    #[test]
    fn test_equal_timestamps_keep_input_order() {
        let mut first = fixtures::raw_reading_at(6.79, 79.90, 1_749_945_600);
        first.device_id = Some("first".to_string());
        let mut second = fixtures::raw_reading_at(6.79, 79.90, 1_749_945_600);
        second.device_id = Some("second".to_string());

        let readings = filter_valid_readings(vec![first, second]);
        assert_eq!(readings[0].device_id, "first");
        assert_eq!(readings[1].device_id, "second");
    }

    #[test]
    fn test_defaulting_policy_for_empty_document() {
        let raw = RawReading {
            timestamp: Some(RawTimestamp::Epoch {
                seconds: 1_749_945_600,
                nanoseconds: 0,
            }),
            ..RawReading::default()
        };
        let reading = validate_reading(raw).unwrap();

        assert_eq!(reading.latitude, FALLBACK_LATITUDE);
        assert_eq!(reading.longitude, FALLBACK_LONGITUDE);
        assert_eq!(reading.temperature_c, 0.0);
        assert_eq!(reading.humidity_pct, 0.0);
        assert_eq!(reading.voc_ppb, 0.0);
        assert_eq!(reading.pm25, 0.0);
        assert_eq!(reading.rainfall_mm, 0.0);
        assert_eq!(reading.wind_speed_ms, 0.0);
        assert_eq!(reading.wind_direction, "N");
        assert_eq!(reading.co2_ppm, 0.0);
        assert_eq!(reading.id, "");
        assert_eq!(reading.device_id, "");
        assert_eq!(reading.aqi, 0);
    }

    #[test]
    fn test_zero_coordinates_coerce_to_fallback_station() {
        let mut raw = fixtures::raw_reading_at(0.0, 0.0, 1_749_945_600);
        raw.latitude = Some(0.0);
        raw.longitude = Some(0.0);

        let reading = validate_reading(raw).unwrap();
        assert_eq!(reading.latitude, FALLBACK_LATITUDE);
        assert_eq!(reading.longitude, FALLBACK_LONGITUDE);
    }

    #[test]
    fn test_aqi_derived_from_pm25() {
        let mut raw = fixtures::raw_reading_at(6.79, 79.90, 1_749_945_600);
        raw.pm25 = Some(12.0);

        let reading = validate_reading(raw).unwrap();
        assert_eq!(reading.aqi, 50);
    }

    #[test]
    fn test_timestamp_resolution_matches_wrapper_seconds() {
        let raw = RawReading {
            timestamp: Some(RawTimestamp::Epoch {
                seconds: 1_749_945_600,
                nanoseconds: 123,
            }),
            ..RawReading::default()
        };
        let reading = validate_reading(raw).unwrap();
        assert_eq!(
            reading.timestamp,
            Utc.timestamp_opt(1_749_945_600, 0).unwrap()
        );
    }

    #[test]
    fn test_normalize_wind_direction() {
        // All 16 compass points pass through, case-folded
        for label in [
            "N", "NNE", "NE", "ENE", "E", "ESE", "SE", "SSE", "S", "SSW", "SW", "WSW", "W", "WNW",
            "NW", "NNW",
        ] {
            assert_eq!(normalize_wind_direction(Some(label)), label);
            assert_eq!(
                normalize_wind_direction(Some(&label.to_ascii_lowercase())),
                label
            );
        }

        // Everything else defaults
        assert_eq!(normalize_wind_direction(None), "N");
        assert_eq!(normalize_wind_direction(Some("")), "N");
        assert_eq!(normalize_wind_direction(Some("north")), "N");
        assert_eq!(normalize_wind_direction(Some("NNEE")), "N");
        assert_eq!(normalize_wind_direction(Some("42")), "N");
        assert_eq!(normalize_wind_direction(Some(" se ")), "SE");
    }
}
