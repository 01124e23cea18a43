//! The discovery session: one browsing context's search state.
//!
//! Owns the resolved location, filter state, radius ladder, and the active
//! result set, and drives them through the planner's in-flight guard. The
//! two search modes are mutually exclusive: near-me mode accumulates
//! city-grouped ring results, bounds mode fully replaces a flat result set
//! from the visible viewport. Entering bounds mode clears ring state; "load
//! more" from bounds mode re-seeds near-me mode at the smallest radius.

use std::sync::Arc;

use tracing::{debug, info, warn};

use nearvend_client::{ApiError, DiscoveryClient, DiscoverySection, VendorQuery};
use nearvend_core::{AppConfig, LocationState, VendorRecord};

use crate::bounds::BoundsQuery;
use crate::map_bridge::MapSyncBridge;
use crate::merge::{dedupe_by_key, ring_merge, CitySection};
use crate::planner::{
    build_query, select_endpoint, Endpoint, FilterState, Pagination, QueryPlanner,
};
use crate::radius::{RadiusTracker, RingPlan};

/// Which controller currently owns the result set.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SearchMode {
    /// Radius rings around the resolved location, grouped by city.
    NearMe,
    /// Viewport-driven search; results replace, never accumulate.
    Bounds,
}

/// What happened to a search request. Only genuine transport or API
/// failures are errors; everything else is an outcome the UI renders.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome {
    /// The response was merged into session state.
    Applied { vendors_added: usize },
    /// The radius ladder is exhausted. Terminal and informational.
    MaxRadiusReached,
    /// Another discovery query was outstanding; this one was dropped, not
    /// queued. Re-invoke once the slot clears.
    DroppedInFlight,
    /// The response arrived for a query that is no longer current
    /// (location or filters changed mid-flight). Dropped silently.
    DroppedStale,
    /// Bounds events are ignored until the initial load has completed.
    IgnoredBeforeInitialLoad,
}

pub struct DiscoverySession {
    client: Arc<DiscoveryClient>,
    bridge: Arc<MapSyncBridge>,
    planner: QueryPlanner,
    filters: FilterState,
    location: Option<LocationState>,
    default_city: String,
    radius: RadiusTracker,
    mode: SearchMode,
    initial_load_done: bool,
    /// Near-me mode state: city sections accumulated across rings.
    sections: Vec<CitySection>,
    /// Bounds mode state: the flat, replace-on-arrival result set.
    bounds_results: Vec<VendorRecord>,
    /// City label shown in bounds mode, taken from the first returned
    /// vendor since a viewport has no single authoritative city.
    detected_city: Option<String>,
    /// Curated sections from the latest response.
    discovery_sections: Vec<DiscoverySection>,
    total_count: u64,
}

impl DiscoverySession {
    #[must_use]
    pub fn new(
        client: Arc<DiscoveryClient>,
        bridge: Arc<MapSyncBridge>,
        config: &AppConfig,
    ) -> Self {
        Self {
            client,
            bridge,
            planner: QueryPlanner::new(),
            filters: FilterState::default(),
            location: None,
            default_city: config.default_region_city.clone(),
            radius: RadiusTracker::new(),
            mode: SearchMode::NearMe,
            initial_load_done: false,
            sections: Vec::new(),
            bounds_results: Vec::new(),
            detected_city: None,
            discovery_sections: Vec::new(),
            total_count: 0,
        }
    }

    // -- accessors ----------------------------------------------------------

    #[must_use]
    pub fn location(&self) -> Option<&LocationState> {
        self.location.as_ref()
    }

    #[must_use]
    pub fn filters(&self) -> &FilterState {
        &self.filters
    }

    #[must_use]
    pub fn mode(&self) -> SearchMode {
        self.mode
    }

    #[must_use]
    pub fn radius_level(&self) -> usize {
        self.radius.current_level()
    }

    /// City sections accumulated in near-me mode, largest first.
    #[must_use]
    pub fn sections(&self) -> &[CitySection] {
        &self.sections
    }

    /// The flat result set in bounds mode.
    #[must_use]
    pub fn bounds_results(&self) -> &[VendorRecord] {
        &self.bounds_results
    }

    #[must_use]
    pub fn discovery_sections(&self) -> &[DiscoverySection] {
        &self.discovery_sections
    }

    #[must_use]
    pub fn total_count(&self) -> u64 {
        self.total_count
    }

    /// The label to display for "searching near": the resolved location's
    /// city, or in bounds mode the detected city from the viewport.
    #[must_use]
    pub fn display_city(&self) -> &str {
        if self.mode == SearchMode::Bounds {
            if let Some(city) = &self.detected_city {
                return city;
            }
        }
        self.location
            .as_ref()
            .map_or(&self.default_city, |location| &location.city)
    }

    /// Identity keys of every vendor in the active result set, for status
    /// polling.
    #[must_use]
    pub fn active_vendor_keys(&self) -> Vec<String> {
        match self.mode {
            SearchMode::NearMe => self
                .sections
                .iter()
                .flat_map(|section| &section.all_vendors_seen)
                .filter_map(VendorRecord::identity_key)
                .collect(),
            SearchMode::Bounds => self
                .bounds_results
                .iter()
                .filter_map(VendorRecord::identity_key)
                .collect(),
        }
    }

    // -- context changes ----------------------------------------------------

    /// Replaces the resolved location. Ring state is invalid for a new
    /// origin, so the radius resets, sections clear, and any in-flight
    /// response becomes stale.
    pub fn set_location(&mut self, location: Option<LocationState>) {
        info!(
            city = location.as_ref().map(|l| l.city.as_str()).unwrap_or("<none>"),
            "location changed, resetting search context"
        );
        self.location = location;
        self.reset_search_context();
    }

    /// Replaces the category filter, with the same reset semantics as a
    /// location change.
    pub fn set_categories(&mut self, categories: Vec<String>) {
        debug!(count = categories.len(), "category filter changed");
        self.filters.categories = categories;
        self.reset_search_context();
    }

    pub fn set_sort(&mut self, sort_by: Option<String>) {
        self.filters.sort_by = sort_by;
    }

    fn reset_search_context(&mut self) {
        self.radius.reset();
        self.sections.clear();
        self.bounds_results.clear();
        self.detected_city = None;
        self.mode = SearchMode::NearMe;
        self.planner.invalidate();
    }

    // -- searches -----------------------------------------------------------

    /// Runs the initial near-me search at the smallest radius.
    ///
    /// # Errors
    ///
    /// Returns the API error for user-visible reporting; session state is
    /// unchanged on failure.
    pub async fn initial_search(&mut self) -> Result<Outcome, ApiError> {
        let Some(token) = self.planner.begin() else {
            return Ok(Outcome::DroppedInFlight);
        };

        let mut query = self.base_query(Pagination::default());
        if self.location.is_some() {
            query.radius_miles = Some(self.radius.current_radius_miles());
        }

        let result = self.run_query(&query).await;
        self.planner.finish();
        let (vendors, discovery_sections, total_count) = result?;

        if !self.planner.is_current(token) {
            debug!("initial search response superseded, dropping");
            return Ok(Outcome::DroppedStale);
        }

        let vendors_added = vendors.len();
        self.mode = SearchMode::NearMe;
        self.sections = ring_merge(Vec::new(), &vendors, 0);
        self.bounds_results.clear();
        self.detected_city = None;
        self.discovery_sections = discovery_sections;
        self.total_count = total_count;
        self.initial_load_done = true;
        self.bridge.refresh_markers();
        info!(vendors_added, sections = self.sections.len(), "initial search applied");
        Ok(Outcome::Applied { vendors_added })
    }

    /// Widens the search by one radius level and merges the new ring into
    /// the running city sections.
    ///
    /// From bounds mode this re-seeds near-me mode at the smallest radius
    /// instead, since the ring ladder has no valid floor to expand from.
    ///
    /// # Errors
    ///
    /// Returns the API error for a user-visible, dismissible notice. The
    /// radius level is unchanged on failure, so the expansion is retryable.
    pub async fn expand_radius(&mut self) -> Result<Outcome, ApiError> {
        if self.mode == SearchMode::Bounds {
            debug!("load-more from bounds mode, re-seeding near-me search");
            self.radius.reset();
            self.sections.clear();
            return self.initial_search().await;
        }

        let plan = self.radius.plan_expansion();
        let RingPlan::Expand {
            next_level,
            min_radius_miles,
            new_radius_miles,
        } = plan
        else {
            info!("maximum search area reached");
            return Ok(Outcome::MaxRadiusReached);
        };

        let Some(token) = self.planner.begin() else {
            return Ok(Outcome::DroppedInFlight);
        };

        let mut query = self.base_query(Pagination::default());
        query.radius_miles = Some(new_radius_miles);
        query.min_radius_miles = Some(min_radius_miles);

        let result = self.run_query(&query).await;
        self.planner.finish();
        let (vendors, discovery_sections, total_count) = match result {
            Ok(parts) => parts,
            Err(e) => {
                warn!(error = %e, level = self.radius.current_level(), "ring query failed, level unchanged");
                return Err(e);
            }
        };

        if !self.planner.is_current(token) {
            debug!("ring response superseded, dropping");
            return Ok(Outcome::DroppedStale);
        }

        let before: usize = self.sections.iter().map(|s| s.total_count).sum();
        self.radius.commit(&plan);
        self.sections = ring_merge(std::mem::take(&mut self.sections), &vendors, next_level);
        let after: usize = self.sections.iter().map(|s| s.total_count).sum();
        self.discovery_sections = discovery_sections;
        self.total_count = total_count;

        if let Some(location) = &self.location {
            self.bridge.recenter(location.point(), new_radius_miles);
        }
        self.bridge.refresh_markers();

        let vendors_added = after.saturating_sub(before);
        info!(level = next_level, vendors_added, "radius expansion applied");
        Ok(Outcome::Applied { vendors_added })
    }

    /// Runs a bounds search for a settled viewport, replacing the active
    /// result set. The caller is responsible for debouncing map-settled
    /// events before invoking this.
    ///
    /// # Errors
    ///
    /// Returns the API error; the previous result set is kept on failure.
    pub async fn bounds_search(&mut self, bounds: &BoundsQuery) -> Result<Outcome, ApiError> {
        if !self.initial_load_done {
            debug!("bounds event before initial load, ignoring");
            return Ok(Outcome::IgnoredBeforeInitialLoad);
        }
        let Some(token) = self.planner.begin() else {
            // Covers the expansion-in-progress signal too: a ring query in
            // flight holds the slot, so the modes cannot fight over state.
            return Ok(Outcome::DroppedInFlight);
        };

        let tier = bounds.tier();
        let query = VendorQuery {
            page_number: Some(1),
            page_size: Some(tier.page_size),
            categories: self.filters.categories.clone(),
            latitude: Some(bounds.center.lat),
            longitude: Some(bounds.center.lng),
            radius_miles: Some(bounds.radius_miles()),
            sort_by: self
                .filters
                .sort_by
                .clone()
                .or_else(|| Some("distance".to_string())),
            ..VendorQuery::default()
        };

        let result = self.run_query(&query).await;
        self.planner.finish();
        let (vendors, discovery_sections, total_count) = result?;

        if !self.planner.is_current(token) {
            debug!("bounds response superseded, dropping");
            return Ok(Outcome::DroppedStale);
        }

        let vendors = dedupe_by_key(vendors, VendorRecord::identity_key);
        let vendors_added = vendors.len();
        self.detected_city = vendors
            .first()
            .and_then(|v| v.city_label().map(str::to_string));
        self.bounds_results = vendors;
        self.discovery_sections = discovery_sections;
        self.total_count = total_count;
        // Entering bounds mode invalidates ring state.
        self.mode = SearchMode::Bounds;
        self.sections.clear();
        self.radius.reset();
        self.bridge.refresh_markers();
        info!(
            vendors_added,
            tier = tier.name,
            detected_city = self.detected_city.as_deref().unwrap_or("<none>"),
            "bounds search applied"
        );
        Ok(Outcome::Applied { vendors_added })
    }

    // -- internals ----------------------------------------------------------

    fn base_query(&self, pagination: Pagination) -> VendorQuery {
        build_query(
            &self.filters,
            self.location.as_ref(),
            &self.default_city,
            pagination,
        )
    }

    /// Dispatches to the endpoint selected by the filter state and
    /// normalizes the response into one deduped vendor list.
    async fn run_query(
        &self,
        query: &VendorQuery,
    ) -> Result<(Vec<VendorRecord>, Vec<DiscoverySection>, u64), ApiError> {
        match select_endpoint(&self.filters) {
            Endpoint::Listing => {
                let response = self.client.fetch_vendors(query).await?;
                let vendors = dedupe_by_key(response.vendors, VendorRecord::identity_key);
                Ok((vendors, response.discovery_sections, response.total_count))
            }
            Endpoint::CategorySearch => {
                let response = self.client.search_by_categories(query).await?;
                let total_count = response.sections.iter().map(|s| s.total_count).sum();
                // One vendor can appear in several category sections.
                let vendors = dedupe_by_key(
                    response
                        .sections
                        .into_iter()
                        .flat_map(|section| section.vendors)
                        .collect(),
                    VendorRecord::identity_key,
                );
                Ok((vendors, response.discovery_sections, total_count))
            }
        }
    }

    #[cfg(test)]
    fn force_token_then_invalidate(&self) -> crate::planner::QueryToken {
        let token = self.planner.begin().expect("claim");
        self.planner.finish();
        self.planner.invalidate();
        token
    }
}
