//! Provider 1: ip-api.com.
//!
//! ## Observed shape
//!
//! ```json
//! {
//!   "status": "success",
//!   "country": "Canada",
//!   "regionName": "Ontario",
//!   "city": "Toronto",
//!   "lat": 43.6532,
//!   "lon": -79.3832
//! }
//! ```
//!
//! Failures come back as HTTP 200 with `"status": "fail"`.

use super::{coordinate, join_label, text, LocationFix, Provider};

const ENDPOINT: &str = "http://ip-api.com/json";

pub(super) fn provider() -> Provider {
    Provider::new("ip-api", ENDPOINT, parse)
}

pub(super) fn parse(body: &serde_json::Value) -> Option<LocationFix> {
    if body.get("status").and_then(serde_json::Value::as_str) != Some("success") {
        return None;
    }
    let lat = coordinate(body, "lat")?;
    let lng = coordinate(body, "lon")?;
    let city = text(body, "city")?;
    let formatted_label = join_label(&[
        Some(city.clone()),
        text(body, "regionName"),
        text(body, "country"),
    ]);
    Some(LocationFix {
        lat,
        lng,
        city,
        formatted_label,
    })
}
