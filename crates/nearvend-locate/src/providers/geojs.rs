//! Provider 3: geojs.io.
//!
//! ## Observed shape
//!
//! Coordinates are decimal strings, not numbers:
//!
//! ```json
//! {
//!   "latitude": "43.6532",
//!   "longitude": "-79.3832",
//!   "city": "Toronto",
//!   "region": "Ontario",
//!   "country": "Canada"
//! }
//! ```

use super::{coordinate, join_label, text, LocationFix, Provider};

const ENDPOINT: &str = "https://get.geojs.io/v1/ip/geo.json";

pub(super) fn provider() -> Provider {
    Provider::new("geojs", ENDPOINT, parse)
}

pub(super) fn parse(body: &serde_json::Value) -> Option<LocationFix> {
    let lat = coordinate(body, "latitude")?;
    let lng = coordinate(body, "longitude")?;
    let city = text(body, "city")?;
    let formatted_label = join_label(&[
        Some(city.clone()),
        text(body, "region"),
        text(body, "country"),
    ]);
    Some(LocationFix {
        lat,
        lng,
        city,
        formatted_label,
    })
}
