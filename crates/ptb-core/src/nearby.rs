//! Proximity query over a user's committed places.

use crate::{domain::GeoPoint, geo::distance_m, place::Place};

/// A place within the search radius.
#[derive(Clone, Debug, PartialEq)]
pub struct NearbyPlace {
    pub place: Place,
    pub location: GeoPoint,
    pub distance_m: f64,
}

/// Places within `radius_m` of `anchor` (inclusive), in input order.
///
/// Places without a location never match.
pub fn within_radius<I>(
    anchor: GeoPoint,
    radius_m: f64,
    places: I,
) -> impl Iterator<Item = NearbyPlace>
where
    I: IntoIterator<Item = Place>,
{
    places.into_iter().filter_map(move |place| {
        let location = place.location?;
        let distance_m = distance_m(anchor, location);
        (distance_m <= radius_m).then_some(NearbyPlace {
            place,
            location,
            distance_m,
        })
    })
}
