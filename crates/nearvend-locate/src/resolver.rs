//! Location resolution: stored state first, then the provider chain.

use std::sync::Arc;

use chrono::{Duration, Utc};
use tracing::{debug, info, warn};

use nearvend_core::LocationState;

use crate::error::LocateError;
use crate::providers::{self, Provider};
use crate::store::LocationStore;

/// Resolves the user's search location.
///
/// Priority order:
///
/// 1. a stored, unexpired location (an unexpired user-entered location means
///    no provider is ever contacted);
/// 2. the IP-geolocation provider chain, first well-formed fix wins;
/// 3. `None`, and the caller falls back to the default region.
pub struct LocationResolver {
    client: reqwest::Client,
    store: Arc<dyn LocationStore>,
    providers: Vec<Provider>,
    /// How long a freshly detected location stays valid before the chain
    /// is consulted again.
    detected_ttl_hours: i64,
}

impl LocationResolver {
    #[must_use]
    pub fn new(client: reqwest::Client, store: Arc<dyn LocationStore>, ttl_hours: i64) -> Self {
        Self::with_providers(client, store, ttl_hours, providers::default_chain())
    }

    /// Like [`Self::new`] but with an explicit provider chain, so tests can
    /// point every provider at a mock server.
    #[must_use]
    pub fn with_providers(
        client: reqwest::Client,
        store: Arc<dyn LocationStore>,
        ttl_hours: i64,
        providers: Vec<Provider>,
    ) -> Self {
        Self {
            client,
            store,
            providers,
            detected_ttl_hours: ttl_hours,
        }
    }

    /// Resolves the current location.
    ///
    /// Provider and store failures are swallowed (logged, chain continues);
    /// `None` means every source came up empty and the caller should proceed
    /// with the default region.
    pub async fn resolve(&self) -> Option<LocationState> {
        if let Some(stored) = self.load_stored() {
            if stored.is_expired() {
                debug!(city = %stored.city, "stored location expired, re-resolving");
                if let Err(e) = self.store.clear() {
                    debug!(error = %e, "failed to clear expired location");
                }
            } else {
                debug!(city = %stored.city, source = ?stored.source, "using stored location");
                return Some(stored);
            }
        }

        for provider in &self.providers {
            match provider.fetch(&self.client).await {
                Ok(fix) => {
                    let mut state =
                        LocationState::detected(fix.lat, fix.lng, fix.city, fix.formatted_label);
                    state.expires_at = Some(Utc::now() + Duration::hours(self.detected_ttl_hours));
                    info!(provider = provider.name, city = %state.city, "location detected");
                    if let Err(e) = self.store.save(&state) {
                        warn!(error = %e, "failed to persist detected location");
                    }
                    return Some(state);
                }
                Err(e) => {
                    debug!(provider = provider.name, error = %e, "provider failed, trying next");
                }
            }
        }

        warn!("all location providers failed");
        None
    }

    /// Stores an explicit user-selected location. Until `ttl_hours` elapse,
    /// [`Self::resolve`] returns it without contacting any provider.
    ///
    /// # Errors
    ///
    /// Returns a store error when the location cannot be persisted.
    pub fn persist_user_location(
        &self,
        lat: f64,
        lng: f64,
        city: impl Into<String>,
        ttl_hours: i64,
    ) -> Result<LocationState, LocateError> {
        let state = LocationState::user_entered(lat, lng, city, ttl_hours);
        self.store.save(&state)?;
        info!(city = %state.city, ttl_hours, "user location persisted");
        Ok(state)
    }

    /// Drops any stored location so the next [`Self::resolve`] re-detects.
    /// This backs the "use my current location" action.
    ///
    /// # Errors
    ///
    /// Returns a store error when the stored state cannot be removed.
    pub fn clear_stored_location(&self) -> Result<(), LocateError> {
        self.store.clear()
    }

    /// Applies a precise device fix to the stored location: coordinates move,
    /// the resolved city label stays. No-op when nothing usable is stored.
    ///
    /// # Errors
    ///
    /// Returns a store error when the refined state cannot be written back.
    pub fn refine_coordinates(
        &self,
        lat: f64,
        lng: f64,
    ) -> Result<Option<LocationState>, LocateError> {
        let Some(mut state) = self.store.load()? else {
            return Ok(None);
        };
        if state.is_expired() {
            return Ok(None);
        }
        state.refine_coordinates(lat, lng);
        self.store.save(&state)?;
        debug!(lat, lng, city = %state.city, "coordinates refined");
        Ok(Some(state))
    }

    fn load_stored(&self) -> Option<LocationState> {
        match self.store.load() {
            Ok(stored) => stored,
            Err(e) => {
                warn!(error = %e, "failed to load stored location, ignoring");
                None
            }
        }
    }
}
