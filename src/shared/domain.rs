use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::time::RawTimestamp;

/// Raw sensor document as it arrives from the reading collection.
///
/// Every field is optional: devices in the field ship partial payloads, and
/// older firmware used slightly different shapes. Field names follow the
/// store's camelCase convention. Validation and defaulting happen in
/// `validation::filter_valid_readings`, never here.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct RawReading {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub latitude: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub longitude: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub temperature: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub humidity: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub voc: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub pm1: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub pm25: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub pm10: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub rainfall: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub wind_speed: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub wind_direction: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub co2: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub device_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub timestamp: Option<RawTimestamp>,
}

/// Canonical sensor reading after validation.
///
/// Invariant: `timestamp` resolved successfully and its calendar year is at
/// least `time::MIN_VALID_YEAR`. Documents that fail that check are dropped
/// during validation and never reach this type.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Reading {
    /// Opaque store document id; empty when the store supplied none.
    pub id: String,
    pub latitude: f64,
    pub longitude: f64,
    pub temperature_c: f64,
    pub humidity_pct: f64,
    /// Volatile organic compounds, ppb.
    pub voc_ppb: f64,
    /// Particulate matter mass concentration, µg/m³.
    pub pm1: f64,
    pub pm25: f64,
    pub pm10: f64,
    pub rainfall_mm: f64,
    pub wind_speed_ms: f64,
    /// 16-point compass label, defaults to "N".
    pub wind_direction: String,
    pub co2_ppm: f64,
    /// Reporting device identifier; may be empty.
    pub device_id: String,
    pub timestamp: DateTime<Utc>,
    /// Derived Air Quality Index, 0-500. Recomputed on every refresh, never
    /// treated as authoritative store data.
    pub aqi: u16,
}

/// Readings clustered around one physical station.
///
/// The anchor coordinate is fixed at the first (most recent) reading assigned
/// to the group; `readings` stays most-recent-first.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LocationGroup {
    pub latitude: f64,
    pub longitude: f64,
    pub readings: Vec<Reading>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_raw_reading_deserializes_partial_document() {
        let json = r#"{"pm25": 18.5, "deviceId": "aq-12", "windSpeed": 1.2}"#;
        let raw: RawReading = serde_json::from_str(json).unwrap();

        assert_eq!(raw.pm25, Some(18.5));
        assert_eq!(raw.device_id, Some("aq-12".to_string()));
        assert_eq!(raw.wind_speed, Some(1.2));
        assert_eq!(raw.latitude, None);
        assert_eq!(raw.timestamp, None);
    }

    #[test]
    fn test_raw_reading_deserializes_empty_document() {
        let raw: RawReading = serde_json::from_str("{}").unwrap();
        assert_eq!(raw, RawReading::default());
    }

    #[test]
    fn test_raw_reading_ignores_unknown_fields() {
        let json = r#"{"pm25": 5.0, "firmwareRevision": "2.1.0", "battery": 88}"#;
        let raw: RawReading = serde_json::from_str(json).unwrap();
        assert_eq!(raw.pm25, Some(5.0));
    }

    #[test]
    fn test_raw_reading_camel_case_names() {
        let json = r#"{
            "windDirection": "SW",
            "deviceId": "station-3",
            "co2": 412.0,
            "pm1": 3.1,
            "pm10": 22.0
        }"#;
        let raw: RawReading = serde_json::from_str(json).unwrap();

        assert_eq!(raw.wind_direction, Some("SW".to_string()));
        assert_eq!(raw.device_id, Some("station-3".to_string()));
        assert_eq!(raw.co2, Some(412.0));
        assert_eq!(raw.pm1, Some(3.1));
        assert_eq!(raw.pm10, Some(22.0));
    }
}
