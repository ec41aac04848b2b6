use serde::{Deserialize, Serialize};

/// Upper bound of the index scale.
pub const AQI_CEILING: u16 = 500;

// US EPA PM2.5 breakpoints (24-hour average), concentration segment mapped
// onto index segment: (c_low, c_high, i_low, i_high).
const PM25_BREAKPOINTS: [(f64, f64, f64, f64); 5] = [
    (0.0, 12.0, 0.0, 50.0),
    (12.1, 35.4, 51.0, 100.0),
    (35.5, 55.4, 101.0, 150.0),
    (55.5, 150.4, 151.0, 200.0),
    (150.5, 250.4, 201.0, 300.0),
];

/// Compute the Air Quality Index from particulate readings.
///
/// Only the PM2.5 term enters the index; PM1 and PM10 are accepted for
/// call-site symmetry with the sensor payload but do not affect the result.
/// Piecewise-linear interpolation over the EPA breakpoint table, rounded to
/// the nearest integer and capped at `AQI_CEILING`. Input is assumed
/// non-negative.
pub fn calculate_aqi(_pm1: f64, pm25: f64, _pm10: f64) -> u16 {
    for (c_low, c_high, i_low, i_high) in PM25_BREAKPOINTS {
        if pm25 <= c_high {
            let aqi = (i_high - i_low) / (c_high - c_low) * (pm25 - c_low) + i_low;
            return aqi.round() as u16;
        }
    }

    // Above the last tabulated segment the scale runs out at 500
    let aqi = 301.0 + (199.0 / 249.5) * (pm25 - 250.5);
    aqi.round().min(f64::from(AQI_CEILING)) as u16
}

/// Air quality category over the 0-500 index scale.
///
/// Breakpoints at 50/100/150/200/250/300; everything above 300 is Hazardous.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AqiCategory {
    Good,
    Moderate,
    UnhealthyForSensitiveGroups,
    Unhealthy,
    VeryUnhealthy,
    Severe,
    Hazardous,
}

/// Map an index value to its category. Single source of truth for every
/// category-derived lookup below, so status, range label, and class tag can
/// never disagree on where a band starts.
pub fn category_for(aqi: u16) -> AqiCategory {
    match aqi {
        0..=50 => AqiCategory::Good,
        51..=100 => AqiCategory::Moderate,
        101..=150 => AqiCategory::UnhealthyForSensitiveGroups,
        151..=200 => AqiCategory::Unhealthy,
        201..=250 => AqiCategory::VeryUnhealthy,
        251..=300 => AqiCategory::Severe,
        _ => AqiCategory::Hazardous,
    }
}

impl AqiCategory {
    /// Display name for the category.
    pub fn status(self) -> &'static str {
        match self {
            AqiCategory::Good => "Good",
            AqiCategory::Moderate => "Moderate",
            AqiCategory::UnhealthyForSensitiveGroups => "Unhealthy for Sensitive Groups",
            AqiCategory::Unhealthy => "Unhealthy",
            AqiCategory::VeryUnhealthy => "Very Unhealthy",
            AqiCategory::Severe => "Severe",
            AqiCategory::Hazardous => "Hazardous",
        }
    }

    /// Advisory text shown next to the index card.
    pub fn advice(self) -> &'static str {
        match self {
            AqiCategory::Good => "Air quality is satisfactory. Enjoy outdoor activities.",
            AqiCategory::Moderate => {
                "Acceptable air quality. Unusually sensitive people should consider limiting prolonged outdoor exertion."
            }
            AqiCategory::UnhealthyForSensitiveGroups => {
                "Members of sensitive groups may experience health effects. Limit prolonged outdoor exertion."
            }
            AqiCategory::Unhealthy => {
                "Everyone may begin to experience health effects. Reduce outdoor activities."
            }
            AqiCategory::VeryUnhealthy => {
                "Health alert: everyone may experience more serious health effects. Avoid outdoor exertion."
            }
            AqiCategory::Severe => {
                "Serious risk of respiratory effects. Stay indoors and keep activity levels low."
            }
            AqiCategory::Hazardous => {
                "Emergency conditions. Everyone should avoid all outdoor activity."
            }
        }
    }

    /// Textual index band, e.g. "AQI (0-50)".
    pub fn range_label(self) -> &'static str {
        match self {
            AqiCategory::Good => "AQI (0-50)",
            AqiCategory::Moderate => "AQI (51-100)",
            AqiCategory::UnhealthyForSensitiveGroups => "AQI (101-150)",
            AqiCategory::Unhealthy => "AQI (151-200)",
            AqiCategory::VeryUnhealthy => "AQI (201-250)",
            AqiCategory::Severe => "AQI (251-300)",
            AqiCategory::Hazardous => "AQI (301-500)",
        }
    }

    /// Stable kebab-case token for the presentation layer's styling hooks.
    pub fn class_tag(self) -> &'static str {
        match self {
            AqiCategory::Good => "aqi-good",
            AqiCategory::Moderate => "aqi-moderate",
            AqiCategory::UnhealthyForSensitiveGroups => "aqi-sensitive",
            AqiCategory::Unhealthy => "aqi-unhealthy",
            AqiCategory::VeryUnhealthy => "aqi-very-unhealthy",
            AqiCategory::Severe => "aqi-severe",
            AqiCategory::Hazardous => "aqi-hazardous",
        }
    }

    /// Band color for map markers and index cards.
    pub fn color_hex(self) -> &'static str {
        match self {
            AqiCategory::Good => "#00E400",
            AqiCategory::Moderate => "#FFFF00",
            AqiCategory::UnhealthyForSensitiveGroups => "#FF7E00",
            AqiCategory::Unhealthy => "#FF0000",
            AqiCategory::VeryUnhealthy => "#8F3F97",
            AqiCategory::Severe => "#99004C",
            AqiCategory::Hazardous => "#7E0023",
        }
    }
}

/// Category display name plus advisory text for an index value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct AqiStatus {
    pub status: &'static str,
    pub advice: &'static str,
}

/// Status + advisory for an index value.
pub fn aqi_status(aqi: u16) -> AqiStatus {
    let category = category_for(aqi);
    AqiStatus {
        status: category.status(),
        advice: category.advice(),
    }
}

/// Range label for an index value, e.g. `aqi_range_label(42) == "AQI (0-50)"`.
pub fn aqi_range_label(aqi: u16) -> &'static str {
    category_for(aqi).range_label()
}

/// Styling token for an index value.
pub fn aqi_class_tag(aqi: u16) -> &'static str {
    category_for(aqi).class_tag()
}

/// Band color for an index value.
pub fn aqi_color_hex(aqi: u16) -> &'static str {
    category_for(aqi).color_hex()
}
