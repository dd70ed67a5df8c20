//! Great-circle distance and facility ranking.
//!
//! Distances use the Haversine formula on a sphere of radius
//! [`EARTH_RADIUS_KM`]. Ranking sorts on the numeric distance and only
//! then renders the display string, so mixed units ("850 meters" vs
//! "1.2 km") never affect the order.

use std::cmp::Ordering;

use crate::models::{Coordinate, Facility, RankedFacility};

pub const EARTH_RADIUS_KM: f64 = 6371.0;

/// Great-circle distance between two coordinates, in kilometers.
pub fn haversine_km(a: Coordinate, b: Coordinate) -> f64 {
    let d_lat = (b.lat - a.lat).to_radians();
    let d_lng = (b.lng - a.lng).to_radians();

    let h = (d_lat / 2.0).sin().powi(2)
        + a.lat.to_radians().cos() * b.lat.to_radians().cos() * (d_lng / 2.0).sin().powi(2);
    let c = 2.0 * h.sqrt().atan2((1.0 - h).sqrt());

    EARTH_RADIUS_KM * c
}

/// Render a distance for display.
///
/// Under 1 km: whole meters (`"500 meters"`). Otherwise kilometers with
/// one decimal (`"1.2 km"`).
pub fn format_distance(km: f64) -> String {
    if km < 1.0 {
        format!("{} meters", (km * 1000.0).round() as i64)
    } else {
        format!("{:.1} km", km)
    }
}

/// Attach distances from `origin` and order ascending by distance.
///
/// The sort is stable, so equidistant facilities keep their input order.
/// Facilities whose distance is not a finite number sort last.
pub fn rank_by_distance(origin: Coordinate, facilities: Vec<Facility>) -> Vec<RankedFacility> {
    let mut ranked: Vec<RankedFacility> = facilities
        .into_iter()
        .map(|facility| {
            let distance_km = haversine_km(origin, facility.coordinate);
            RankedFacility {
                distance: format_distance(distance_km),
                distance_km,
                facility,
            }
        })
        .collect();

    ranked.sort_by(|a, b| compare_distance(a.distance_km, b.distance_km));
    ranked
}

fn compare_distance(a: f64, b: f64) -> Ordering {
    match (a.is_finite(), b.is_finite()) {
        (true, true) => a.total_cmp(&b),
        (true, false) => Ordering::Less,
        (false, true) => Ordering::Greater,
        (false, false) => Ordering::Equal,
    }
}
