//! Wire types for the vendor discovery API.
//!
//! Every response field carries `#[serde(default)]`: a payload missing an
//! expected field deserializes to an empty value instead of failing, so
//! partial data never takes down a render path.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use nearvend_core::VendorRecord;

/// Query parameters shared by the general listing and category-search
/// endpoints. Both accept the same filter set so downstream merge logic is
/// endpoint-agnostic; unset fields are omitted from the URL.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct VendorQuery {
    pub page_number: Option<u32>,
    pub page_size: Option<u32>,
    pub city: Option<String>,
    /// Repeated `category` query pairs; presence routes the request to the
    /// category-search endpoint.
    pub categories: Vec<String>,
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
    pub radius_miles: Option<f64>,
    /// Exclusion floor for ring queries: only vendors beyond this distance
    /// are returned, so an expansion never refetches the covered disk.
    pub min_radius_miles: Option<f64>,
    pub sort_by: Option<String>,
}

impl VendorQuery {
    /// Flattens set fields into wire-named query pairs, in a stable order.
    #[must_use]
    pub fn to_query_pairs(&self) -> Vec<(&'static str, String)> {
        let mut pairs = Vec::new();
        if let Some(n) = self.page_number {
            pairs.push(("pageNumber", n.to_string()));
        }
        if let Some(n) = self.page_size {
            pairs.push(("pageSize", n.to_string()));
        }
        if let Some(city) = &self.city {
            pairs.push(("city", city.clone()));
        }
        for category in &self.categories {
            pairs.push(("category", category.clone()));
        }
        if let Some(lat) = self.latitude {
            pairs.push(("latitude", lat.to_string()));
        }
        if let Some(lng) = self.longitude {
            pairs.push(("longitude", lng.to_string()));
        }
        if let Some(r) = self.radius_miles {
            pairs.push(("radiusMiles", r.to_string()));
        }
        if let Some(r) = self.min_radius_miles {
            pairs.push(("minRadiusMiles", r.to_string()));
        }
        if let Some(sort) = &self.sort_by {
            pairs.push(("sortBy", sort.clone()));
        }
        pairs
    }
}

/// `GET /vendors` response.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VendorsResponse {
    #[serde(default)]
    pub vendors: Vec<VendorRecord>,
    #[serde(default)]
    pub total_count: u64,
    /// Curated, labeled subsets ("Trending", "Top Rated") the backend may
    /// attach to a listing response.
    #[serde(default)]
    pub discovery_sections: Vec<DiscoverySection>,
}

/// A labeled, curated subset of results shown as a horizontal group.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DiscoverySection {
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub vendors: Vec<VendorRecord>,
    #[serde(default)]
    pub total_count: u64,
}

/// `GET /vendors/search-by-categories` response.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CategorySearchResponse {
    #[serde(default)]
    pub sections: Vec<CategorySection>,
    #[serde(default)]
    pub discovery_sections: Vec<DiscoverySection>,
}

/// One per-category group in a category-search response.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CategorySection {
    #[serde(default)]
    pub category: Option<String>,
    #[serde(default)]
    pub vendors: Vec<VendorRecord>,
    #[serde(default)]
    pub total_count: u64,
}

/// `POST /vendors/online-status/batch` request body.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct StatusBatchRequest<'a> {
    pub vendor_profile_ids: &'a [String],
}

/// `POST /vendors/online-status/batch` response.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StatusBatchResponse {
    #[serde(default)]
    pub success: bool,
    #[serde(default)]
    pub statuses: HashMap<String, OnlineStatus>,
}

/// Per-vendor online status as returned by the batch endpoint.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OnlineStatus {
    #[serde(default)]
    pub is_online: bool,
    /// Fields we do not model are carried through untouched.
    #[serde(flatten)]
    pub extra: serde_json::Map<String, serde_json::Value>,
}
