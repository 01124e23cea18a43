//! Builds outgoing discovery queries from UI filter state and guards
//! against concurrent duplicates.
//!
//! Query construction is pure. The in-flight guard is a single atomic flag:
//! a second full discovery query started while one is outstanding is
//! dropped, not queued. Staleness is handled by a generation counter; a
//! response is applied only if its token still matches the latest issued
//! one.

use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};

use nearvend_client::VendorQuery;
use nearvend_core::LocationState;

/// Current UI filter state feeding the planner.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FilterState {
    /// Selected category tags. Non-empty routes the query to the
    /// category-search endpoint.
    pub categories: Vec<String>,
    pub sort_by: Option<String>,
}

impl FilterState {
    #[must_use]
    pub fn has_categories(&self) -> bool {
        !self.categories.is_empty()
    }
}

/// Which backend endpoint a query should hit. Both accept the same filter
/// set, so merge logic downstream never cares which one answered.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Endpoint {
    Listing,
    CategorySearch,
}

/// Category presence selects the category-search endpoint.
#[must_use]
pub fn select_endpoint(filters: &FilterState) -> Endpoint {
    if filters.has_categories() {
        Endpoint::CategorySearch
    } else {
        Endpoint::Listing
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Pagination {
    pub page_number: u32,
    pub page_size: u32,
}

impl Default for Pagination {
    fn default() -> Self {
        Self {
            page_number: 1,
            page_size: 24,
        }
    }
}

/// Builds the outgoing query. With a resolved location the query carries its
/// coordinates and city and defaults to distance sort; without one it falls
/// back to an unfiltered query over `default_city`.
#[must_use]
pub fn build_query(
    filters: &FilterState,
    location: Option<&LocationState>,
    default_city: &str,
    pagination: Pagination,
) -> VendorQuery {
    let mut query = VendorQuery {
        page_number: Some(pagination.page_number),
        page_size: Some(pagination.page_size),
        categories: filters.categories.clone(),
        sort_by: filters.sort_by.clone(),
        ..VendorQuery::default()
    };
    match location {
        Some(location) => {
            query.city = Some(location.city.clone());
            query.latitude = Some(location.lat);
            query.longitude = Some(location.lng);
            if query.sort_by.is_none() {
                query.sort_by = Some("distance".to_string());
            }
        }
        None => {
            query.city = Some(default_city.to_string());
        }
    }
    query
}

/// Identifies one issued discovery query. A response tagged with a token
/// that is no longer current is stale and must be dropped silently.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct QueryToken(u64);

/// The concurrency guard for full discovery queries.
#[derive(Debug, Default)]
pub struct QueryPlanner {
    in_flight: AtomicBool,
    generation: AtomicU64,
}

impl QueryPlanner {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Claims the single in-flight slot and issues a fresh token. `None`
    /// means a query is already outstanding; the caller is dropped rather
    /// than queued, and should re-invoke once the slot clears.
    pub fn begin(&self) -> Option<QueryToken> {
        if self
            .in_flight
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .is_err()
        {
            return None;
        }
        let generation = self.generation.fetch_add(1, Ordering::AcqRel) + 1;
        Some(QueryToken(generation))
    }

    /// Releases the in-flight slot. Call exactly once per successful
    /// [`Self::begin`], whether the query succeeded or failed.
    pub fn finish(&self) {
        self.in_flight.store(false, Ordering::Release);
    }

    /// Whether `token` still identifies the latest issued query.
    #[must_use]
    pub fn is_current(&self, token: QueryToken) -> bool {
        self.generation.load(Ordering::Acquire) == token.0
    }

    /// Invalidates every outstanding token. Called when filters or location
    /// change so in-flight responses are dropped on arrival.
    pub fn invalidate(&self) {
        self.generation.fetch_add(1, Ordering::AcqRel);
    }

    #[must_use]
    pub fn is_in_flight(&self) -> bool {
        self.in_flight.load(Ordering::Acquire)
    }
}
