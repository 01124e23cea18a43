//! Provider 2: ipwho.is.
//!
//! ## Observed shape
//!
//! ```json
//! {
//!   "success": true,
//!   "country": "Canada",
//!   "region": "Ontario",
//!   "city": "Toronto",
//!   "latitude": 43.6532,
//!   "longitude": -79.3832
//! }
//! ```

use super::{coordinate, join_label, text, LocationFix, Provider};

const ENDPOINT: &str = "https://ipwho.is/";

pub(super) fn provider() -> Provider {
    Provider::new("ipwho", ENDPOINT, parse)
}

pub(super) fn parse(body: &serde_json::Value) -> Option<LocationFix> {
    if body.get("success").and_then(serde_json::Value::as_bool) != Some(true) {
        return None;
    }
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
