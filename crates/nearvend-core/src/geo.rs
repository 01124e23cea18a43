//! Small geographic helpers shared by the discovery engine.

/// Approximate miles per degree of latitude, also used for longitude after
/// correcting for latitude curvature.
pub const MILES_PER_LAT_DEGREE: f64 = 69.0;

/// Mean Earth radius in miles, for great-circle distance.
pub const EARTH_RADIUS_MILES: f64 = 3958.8;

#[derive(Debug, Clone, Copy, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct GeoPoint {
    pub lat: f64,
    pub lng: f64,
}

impl GeoPoint {
    #[must_use]
    pub fn new(lat: f64, lng: f64) -> Self {
        Self { lat, lng }
    }
}

/// Great-circle distance between two points in miles (haversine).
#[must_use]
pub fn haversine_miles(a: GeoPoint, b: GeoPoint) -> f64 {
    let lat_a = a.lat.to_radians();
    let lat_b = b.lat.to_radians();
    let d_lat = (b.lat - a.lat).to_radians();
    let d_lng = (b.lng - a.lng).to_radians();

    let h = (d_lat / 2.0).sin().powi(2) + lat_a.cos() * lat_b.cos() * (d_lng / 2.0).sin().powi(2);
    2.0 * EARTH_RADIUS_MILES * h.sqrt().asin()
}

/// Search radius covering a viewport: the distance from the center to the
/// farthest corner, floored at one mile so a fully-zoomed-in viewport still
/// produces a usable query.
#[must_use]
pub fn radius_miles_for_viewport(center: GeoPoint, north: f64, south: f64, east: f64, west: f64) -> f64 {
    let corners = [
        GeoPoint::new(north, east),
        GeoPoint::new(north, west),
        GeoPoint::new(south, east),
        GeoPoint::new(south, west),
    ];
    corners
        .iter()
        .map(|c| haversine_miles(center, *c))
        .fold(1.0_f64, f64::max)
}
