//! Property Test: Proximity Grouping
//!
//! This property test verifies that:
//! - No more than five groups ever come back, however scattered the input
//! - Jitter inside the station radius never splits a group
//! - Groups partition their readings (no reading lands in two groups)

use aqm_backend::domain::Reading;
use aqm_backend::proximity::{group_by_proximity, haversine_distance, MAX_GROUPS, STATION_RADIUS_M};
use aqm_backend::validation::validate_reading;
use aqm_backend::{domain::RawReading, time::RawTimestamp};
use proptest::prelude::*;

// One microdegree of latitude is about 0.11 m.
const METER_IN_DEGREES: f64 = 1.0 / 111_195.0;

fn reading_at(id: usize, latitude: f64, longitude: f64, epoch_seconds: i64) -> Reading {
    let raw = RawReading {
        id: Some(format!("doc-{id}")),
        latitude: Some(latitude),
        longitude: Some(longitude),
        pm25: Some(10.0),
        timestamp: Some(RawTimestamp::Epoch {
            seconds: epoch_seconds,
            nanoseconds: 0,
        }),
        ..RawReading::default()
    };
    validate_reading(raw).expect("test timestamp is valid")
}

fn scattered_coordinates() -> impl Strategy<Value = Vec<(f64, f64)>> {
    prop::collection::vec((5.9..9.9f64, 79.5..81.9f64), 0..100)
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(100))]

    /// Property: the group count is capped regardless of input spread
    #[test]
    fn prop_never_more_than_max_groups(coordinates in scattered_coordinates()) {
        let readings: Vec<Reading> = coordinates
            .iter()
            .enumerate()
            .map(|(i, (lat, lon))| reading_at(i, *lat, *lon, 1_750_000_000 - i as i64))
            .collect();

        prop_assert!(group_by_proximity(&readings).len() <= MAX_GROUPS);
    }

    /// Property: readings jittered within a couple of meters of one spot
    /// always land in a single group. The jitter box is sized so that any
    /// two points stay under the station radius, whichever one the scan
    /// anchors the group at.
    #[test]
    fn prop_jitter_within_radius_stays_one_group(
        jitters in prop::collection::vec(
            (-1.7..1.7f64, -1.7..1.7f64),
            1..20,
        )
    ) {
        let anchor = (6.791164, 79.900497);
        let readings: Vec<Reading> = jitters
            .iter()
            .enumerate()
            .map(|(i, (north_m, east_m))| {
                reading_at(
                    i,
                    anchor.0 + north_m * METER_IN_DEGREES,
                    anchor.1 + east_m * METER_IN_DEGREES,
                    1_750_000_000 - i as i64,
                )
            })
            .collect();

        let groups = group_by_proximity(&readings);
        prop_assert_eq!(groups.len(), 1);
        prop_assert_eq!(groups[0].readings.len(), readings.len());
    }

    /// Property: no reading is assigned to more than one group, and every
    /// grouped reading is within the radius of its group's anchor
    #[test]
    fn prop_groups_partition_and_respect_radius(coordinates in scattered_coordinates()) {
        let readings: Vec<Reading> = coordinates
            .iter()
            .enumerate()
            .map(|(i, (lat, lon))| reading_at(i, *lat, *lon, 1_750_000_000 - i as i64))
            .collect();

        let groups = group_by_proximity(&readings);

        let mut seen = std::collections::HashSet::new();
        for group in &groups {
            for reading in &group.readings {
                prop_assert!(
                    seen.insert(reading.id.clone()),
                    "reading {} grouped twice",
                    reading.id
                );
                prop_assert!(
                    haversine_distance(
                        group.latitude,
                        group.longitude,
                        reading.latitude,
                        reading.longitude
                    ) < STATION_RADIUS_M
                );
            }
        }
        prop_assert!(seen.len() <= readings.len());
    }
}

#[cfg(test)]
mod additional_tests {
    use super::*;

    #[test]
    fn test_close_pair_shares_group_distant_pair_does_not() {
        // The two canonical spec coordinates: well under a meter apart
        let close = vec![
            reading_at(0, 6.791164, 79.900497, 1_750_000_000),
            reading_at(1, 6.791165, 79.900498, 1_749_999_900),
        ];
        assert_eq!(group_by_proximity(&close).len(), 1);

        // ~111 m apart
        let distant = vec![
            reading_at(0, 6.791164, 79.900497, 1_750_000_000),
            reading_at(1, 6.792164, 79.900497, 1_749_999_900),
        ];
        assert_eq!(group_by_proximity(&distant).len(), 2);
    }

    #[test]
    fn test_seven_distinct_stations_keep_five_most_recent() {
        let readings: Vec<Reading> = (0..7)
            .map(|i| {
                reading_at(
                    i,
                    6.791164 + 0.001 * i as f64,
                    79.900497,
                    1_750_000_000 - i as i64,
                )
            })
            .collect();

        let groups = group_by_proximity(&readings);
        assert_eq!(groups.len(), 5);
        for (i, group) in groups.iter().enumerate() {
            assert_eq!(group.readings.len(), 1);
            assert_eq!(group.readings[0].id, format!("doc-{i}"));
        }
    }
}
