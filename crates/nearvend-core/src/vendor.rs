//! Vendor records as returned by the discovery backend.
//!
//! ## Observed shape across endpoints
//!
//! ### Identity fields
//! The backend has gone through several API generations and different
//! endpoints still emit different id fields for the same vendor:
//! `vendorProfileId` (current), `profileId` (category search), and plain
//! `id` (oldest listings payloads). Some legacy payloads emit the id as a
//! JSON string rather than a number. [`VendorRecord::identity_key`] resolves
//! all of these to one canonical key; every merge/dedupe decision in the
//! engine depends on that resolution being deterministic.
//!
//! ### Coordinates
//! `latitude`/`longitude` are absent for vendors that serve a city without a
//! storefront. Records without coordinates still participate in city
//! grouping; they just never get a map marker.
//!
//! ### Unknown fields
//! Profile payloads carry dozens of presentation fields the engine does not
//! interpret (pricing, badges, media). They are preserved in `extra` so the
//! record can round-trip to the rendering layer untouched.

use serde::{Deserialize, Serialize};

/// A vendor id as it appears on the wire: numeric in current payloads,
/// string in some legacy ones.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(untagged)]
pub enum VendorId {
    Num(i64),
    Text(String),
}

impl VendorId {
    /// Canonical form used as the engine-wide identity key. `42` and `"42"`
    /// must compare equal across endpoints.
    #[must_use]
    pub fn canonical(&self) -> String {
        match self {
            VendorId::Num(n) => n.to_string(),
            VendorId::Text(s) => s.trim().to_string(),
        }
    }
}

impl std::fmt::Display for VendorId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.canonical())
    }
}

impl From<i64> for VendorId {
    fn from(n: i64) -> Self {
        VendorId::Num(n)
    }
}

impl From<&str> for VendorId {
    fn from(s: &str) -> Self {
        VendorId::Text(s.to_string())
    }
}

/// A vendor as returned by every discovery endpoint.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VendorRecord {
    /// Current-generation id field.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub vendor_profile_id: Option<VendorId>,

    /// Id field emitted by the category-search endpoint.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub profile_id: Option<VendorId>,

    /// Oldest id field, still present in some listing payloads.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<VendorId>,

    #[serde(default)]
    pub display_name: Option<String>,

    /// City label used for grouping. May be empty string on the wire;
    /// use [`VendorRecord::city_label`] which normalizes that to `None`.
    #[serde(default)]
    pub city: Option<String>,

    #[serde(default)]
    pub region: Option<String>,

    #[serde(default)]
    pub latitude: Option<f64>,

    #[serde(default)]
    pub longitude: Option<f64>,

    /// Category tags, e.g. `["photography", "videography"]`.
    #[serde(default)]
    pub categories: Vec<String>,

    /// Distance from the query origin, when the backend computed one.
    #[serde(default)]
    pub distance_miles: Option<f64>,

    /// Presentation fields the engine passes through without interpreting.
    #[serde(flatten)]
    pub extra: serde_json::Map<String, serde_json::Value>,
}

impl VendorRecord {
    /// Resolves the logical identity key for this record.
    ///
    /// Resolution order is fixed: `vendorProfileId`, then `profileId`, then
    /// `id`. Returns `None` when no id field is present at all; such records
    /// are treated as never-duplicates by the merge layer.
    #[must_use]
    pub fn identity_key(&self) -> Option<String> {
        self.vendor_profile_id
            .as_ref()
            .or(self.profile_id.as_ref())
            .or(self.id.as_ref())
            .map(VendorId::canonical)
    }

    /// City label normalized for grouping: trimmed, empty mapped to `None`.
    #[must_use]
    pub fn city_label(&self) -> Option<&str> {
        self.city
            .as_deref()
            .map(str::trim)
            .filter(|c| !c.is_empty())
    }

    /// Geographic position, when both coordinates are present.
    #[must_use]
    pub fn position(&self) -> Option<crate::geo::GeoPoint> {
        match (self.latitude, self.longitude) {
            (Some(lat), Some(lng)) => Some(crate::geo::GeoPoint { lat, lng }),
            _ => None,
        }
    }
}
