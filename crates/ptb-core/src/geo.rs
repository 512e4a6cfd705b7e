//! Great-circle distance between two coordinates.

use crate::domain::GeoPoint;

/// Mean Earth radius used by the haversine formula, in kilometers.
pub const EARTH_RADIUS_KM: f64 = 6367.0;

/// Haversine distance in meters.
pub fn distance_m(from: GeoPoint, to: GeoPoint) -> f64 {
    let lat_from = from.lat.to_radians();
    let lon_from = from.lon.to_radians();
    let lat_to = to.lat.to_radians();
    let lon_to = to.lon.to_radians();

    let dlon = lon_to - lon_from;
    let dlat = lat_to - lat_from;
    let a = (dlat / 2.0).sin().powi(2) + lat_from.cos() * lat_to.cos() * (dlon / 2.0).sin().powi(2);
    let c = 2.0 * a.sqrt().asin();
    EARTH_RADIUS_KM * c * 1000.0
}
