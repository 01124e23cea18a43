//! The authoritative "where is the user searching from" state.

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};

use crate::geo::GeoPoint;

/// How a [`LocationState`] was obtained. A non-expired `UserEntered` state
/// always outranks the auto-detected sources.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum LocationSource {
    /// Detected from an IP-geolocation provider.
    #[serde(rename = "ip")]
    Ip,
    /// Refined from the browser/device geolocation permission flow.
    #[serde(rename = "browser")]
    Browser,
    /// Explicitly chosen by the user (search box, "change city").
    #[serde(rename = "user-entered")]
    UserEntered,
}

/// A resolved location with the metadata the discovery session needs.
///
/// At most one state is authoritative per session. Expiry only applies to
/// persisted user-entered locations; auto-detected states carry
/// `expires_at = None` and live for the session.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LocationState {
    pub lat: f64,
    pub lng: f64,
    /// City label shown in the UI and sent as the `city` query filter.
    pub city: String,
    /// Longer display form, e.g. `"Toronto, ON, Canada"`, when a provider
    /// supplied one.
    #[serde(default)]
    pub formatted_label: Option<String>,
    pub source: LocationSource,
    #[serde(default)]
    pub expires_at: Option<DateTime<Utc>>,
}

impl LocationState {
    /// Builds an auto-detected state (no expiry).
    #[must_use]
    pub fn detected(
        lat: f64,
        lng: f64,
        city: impl Into<String>,
        formatted_label: Option<String>,
    ) -> Self {
        Self {
            lat,
            lng,
            city: city.into(),
            formatted_label,
            source: LocationSource::Ip,
            expires_at: None,
        }
    }

    /// Builds a user-entered state expiring `ttl_hours` from now.
    #[must_use]
    pub fn user_entered(lat: f64, lng: f64, city: impl Into<String>, ttl_hours: i64) -> Self {
        Self {
            lat,
            lng,
            city: city.into(),
            formatted_label: None,
            source: LocationSource::UserEntered,
            expires_at: Some(Utc::now() + Duration::hours(ttl_hours)),
        }
    }

    /// Whether this state has passed its expiry at `now`.
    /// States without an expiry never expire.
    #[must_use]
    pub fn is_expired_at(&self, now: DateTime<Utc>) -> bool {
        self.expires_at.is_some_and(|at| at <= now)
    }

    /// Whether this state has passed its expiry.
    #[must_use]
    pub fn is_expired(&self) -> bool {
        self.is_expired_at(Utc::now())
    }

    /// Applies a device-coordinate refinement: coordinates move, the city
    /// label and expiry are untouched, and the source records the refinement.
    pub fn refine_coordinates(&mut self, lat: f64, lng: f64) {
        self.lat = lat;
        self.lng = lng;
        if self.source == LocationSource::Ip {
            self.source = LocationSource::Browser;
        }
    }

    #[must_use]
    pub fn point(&self) -> GeoPoint {
        GeoPoint::new(self.lat, self.lng)
    }

    /// Label for display: the formatted form when present, else the city.
    #[must_use]
    pub fn display_label(&self) -> &str {
        self.formatted_label.as_deref().unwrap_or(&self.city)
    }
}
