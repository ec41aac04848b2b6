use crate::domain::{LocationGroup, Reading};

/// Readings whose coordinates fall within this distance of a group's anchor
/// are treated as the same physical station.
pub const STATION_RADIUS_M: f64 = 5.0;

/// Only the most-recently-active distinct stations are kept.
pub const MAX_GROUPS: usize = 5;

const EARTH_RADIUS_M: f64 = 6_371_000.0;

/// Great-circle distance between two coordinates, in meters.
pub fn haversine_distance(lat1: f64, lon1: f64, lat2: f64, lon2: f64) -> f64 {
    let lat1_rad = lat1.to_radians();
    let lat2_rad = lat2.to_radians();
    let delta_lat = (lat2 - lat1).to_radians();
    let delta_lon = (lon2 - lon1).to_radians();

    let a = (delta_lat / 2.0).sin().powi(2)
        + lat1_rad.cos() * lat2_rad.cos() * (delta_lon / 2.0).sin().powi(2);
    let c = 2.0 * a.sqrt().atan2((1.0 - a).sqrt());

    EARTH_RADIUS_M * c
}

/// Cluster a recency-ordered batch of readings into distinct stations.
///
/// Greedy single pass: each reading joins the first existing group (in
/// creation order) whose anchor lies within `STATION_RADIUS_M`; otherwise it
/// establishes a new group anchored at its own coordinate. Anchors are fixed
/// at creation and never recomputed, so the result is order-dependent: with
/// recency-sorted input, group order is "most recently active station first".
///
/// Group creation stops at `MAX_GROUPS`: a reading that would establish a
/// sixth station is left ungrouped (it still appears in the flat recency
/// list the dashboard keeps separately). O(n × MAX_GROUPS).
pub fn group_by_proximity(readings: &[Reading]) -> Vec<LocationGroup> {
    let mut groups: Vec<LocationGroup> = Vec::new();

    for reading in readings {
        let existing = groups.iter().position(|group| {
            haversine_distance(group.latitude, group.longitude, reading.latitude, reading.longitude)
                < STATION_RADIUS_M
        });

        match existing {
            Some(index) => groups[index].readings.push(reading.clone()),
            None if groups.len() < MAX_GROUPS => groups.push(LocationGroup {
                latitude: reading.latitude,
                longitude: reading.longitude,
                readings: vec![reading.clone()],
            }),
            None => {}
        }
    }

    groups
}
