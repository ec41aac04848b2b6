use std::env;
use std::fmt::Display;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use thiserror::Error;

use crate::domain::Reading;
use crate::validation::DEFAULT_WIND_DIRECTION;

/// Coordinates of the fallback station shown when the store has nothing
/// usable. Also the defaulting target for documents with missing or zeroed
/// coordinates.
pub const FALLBACK_LATITUDE: f64 = 6.791164;
pub const FALLBACK_LONGITUDE: f64 = 79.900497;

/// Placeholder timestamp carried by the fallback reading: the first valid
/// instant of the scale, so any real reading wins the freshness comparison.
const FALLBACK_TIMESTAMP_SECONDS: i64 = 1_735_689_600; // 2025-01-01T00:00:00Z

pub const DEFAULT_FETCH_LIMIT: usize = 100;
pub const DEFAULT_LIVE_BATCH: usize = 10;
pub const DEFAULT_HISTORY_SIZE: usize = 5;

/// Configuration errors
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("invalid value for {name}: {value:?} ({reason})")]
    InvalidValue {
        name: &'static str,
        value: String,
        reason: String,
    },
}

/// Dashboard configuration.
///
/// Every knob has a default, so an empty environment is a valid deployment.
#[derive(Debug, Clone)]
pub struct DashboardConfig {
    /// Documents requested on the full fetch path. Over-fetched relative to
    /// what the dashboard shows, to compensate for validation drops.
    pub fetch_limit: usize,
    /// Documents per live subscription delivery.
    pub live_batch: usize,
    /// Readings kept in the history panel.
    pub history_size: usize,
    /// Fallback station coordinate.
    pub fallback_latitude: f64,
    pub fallback_longitude: f64,
}

impl Default for DashboardConfig {
    fn default() -> Self {
        Self {
            fetch_limit: DEFAULT_FETCH_LIMIT,
            live_batch: DEFAULT_LIVE_BATCH,
            history_size: DEFAULT_HISTORY_SIZE,
            fallback_latitude: FALLBACK_LATITUDE,
            fallback_longitude: FALLBACK_LONGITUDE,
        }
    }
}

impl DashboardConfig {
    /// Load configuration from environment variables, defaulting every
    /// missing value.
    ///
    /// Recognized variables: `AQM_FETCH_LIMIT`, `AQM_LIVE_BATCH`,
    /// `AQM_HISTORY_SIZE`, `AQM_FALLBACK_LATITUDE`, `AQM_FALLBACK_LONGITUDE`.
    pub fn from_env() -> Result<Self, ConfigError> {
        Ok(Self {
            fetch_limit: parse_var("AQM_FETCH_LIMIT", DEFAULT_FETCH_LIMIT)?,
            live_batch: parse_var("AQM_LIVE_BATCH", DEFAULT_LIVE_BATCH)?,
            history_size: parse_var("AQM_HISTORY_SIZE", DEFAULT_HISTORY_SIZE)?,
            fallback_latitude: parse_var("AQM_FALLBACK_LATITUDE", FALLBACK_LATITUDE)?,
            fallback_longitude: parse_var("AQM_FALLBACK_LONGITUDE", FALLBACK_LONGITUDE)?,
        })
    }

    /// The renderable default reading: the fallback station with zeroed
    /// measurements. Shown when the store is unavailable or empty.
    pub fn fallback_reading(&self) -> Reading {
        Reading {
            id: String::new(),
            latitude: self.fallback_latitude,
            longitude: self.fallback_longitude,
            temperature_c: 0.0,
            humidity_pct: 0.0,
            voc_ppb: 0.0,
            pm1: 0.0,
            pm25: 0.0,
            pm10: 0.0,
            rainfall_mm: 0.0,
            wind_speed_ms: 0.0,
            wind_direction: DEFAULT_WIND_DIRECTION.to_string(),
            co2_ppm: 0.0,
            device_id: String::new(),
            timestamp: fallback_timestamp(),
            aqi: 0,
        }
    }
}

fn fallback_timestamp() -> DateTime<Utc> {
    DateTime::from_timestamp(FALLBACK_TIMESTAMP_SECONDS, 0).expect("valid constant timestamp")
}

fn parse_var<T>(name: &'static str, default: T) -> Result<T, ConfigError>
where
    T: FromStr,
    T::Err: Display,
{
    match env::var(name) {
        Ok(raw) => raw
            .trim()
            .parse()
            .map_err(|err: T::Err| ConfigError::InvalidValue {
                name,
                value: raw.clone(),
                reason: err.to_string(),
            }),
        Err(_) => Ok(default),
    }
}
