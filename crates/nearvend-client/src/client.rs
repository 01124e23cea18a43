//! HTTP client for the vendor discovery REST API.
//!
//! Wraps `reqwest` with typed response deserialization, retry with back-off
//! on transient failures, and URL construction via `query_pairs_mut` so every
//! parameter is safely percent-encoded.

use std::collections::HashMap;
use std::time::Duration;

use reqwest::{Client, Url};
use serde::de::DeserializeOwned;
use tracing::debug;

use nearvend_core::AppConfig;

use crate::error::ApiError;
use crate::retry::retry_with_backoff;
use crate::types::{
    CategorySearchResponse, OnlineStatus, StatusBatchRequest, StatusBatchResponse, VendorQuery,
    VendorsResponse,
};

/// Client for the vendor discovery API.
///
/// Use [`DiscoveryClient::new`] for production or
/// [`DiscoveryClient::with_base_url`] to point at a mock server in tests.
pub struct DiscoveryClient {
    client: Client,
    vendors_url: Url,
    category_search_url: Url,
    status_batch_url: Url,
    max_retries: u32,
    backoff_base_ms: u64,
}

impl DiscoveryClient {
    /// Creates a client pointed at the configured backend.
    ///
    /// # Errors
    ///
    /// Returns [`ApiError::Http`] if the underlying `reqwest::Client` cannot
    /// be constructed, or [`ApiError::Api`] if the configured base URL is
    /// invalid.
    pub fn new(config: &AppConfig) -> Result<Self, ApiError> {
        Self::with_base_url(config, &config.api_base_url)
    }

    /// Creates a client with an explicit base URL (for testing with wiremock).
    ///
    /// # Errors
    ///
    /// Same as [`DiscoveryClient::new`].
    pub fn with_base_url(config: &AppConfig, base_url: &str) -> Result<Self, ApiError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.request_timeout_secs))
            .connect_timeout(Duration::from_secs(10))
            .user_agent(&config.user_agent)
            .build()?;

        // Normalise: the base URL must end with exactly one slash so join()
        // appends path segments instead of replacing the last one.
        let normalised = format!("{}/", base_url.trim_end_matches('/'));
        let base = Url::parse(&normalised)
            .map_err(|e| ApiError::Api(format!("invalid base URL '{base_url}': {e}")))?;
        let join = |path: &str| {
            base.join(path)
                .map_err(|e| ApiError::Api(format!("invalid endpoint path '{path}': {e}")))
        };

        Ok(Self {
            client,
            vendors_url: join("vendors")?,
            category_search_url: join("vendors/search-by-categories")?,
            status_batch_url: join("vendors/online-status/batch")?,
            max_retries: config.max_retries,
            backoff_base_ms: config.retry_backoff_base_ms,
        })
    }

    /// Fetches the general vendor listing for `query`.
    ///
    /// # Errors
    ///
    /// - [`ApiError::Http`] on network failure or non-2xx status, after
    ///   transient failures have been retried.
    /// - [`ApiError::Deserialize`] if the response is not valid JSON.
    pub async fn fetch_vendors(&self, query: &VendorQuery) -> Result<VendorsResponse, ApiError> {
        let url = Self::build_url(&self.vendors_url, query);
        debug!(%url, "fetching vendor listing");
        retry_with_backoff(self.max_retries, self.backoff_base_ms, || {
            self.get_json::<VendorsResponse>(url.clone(), "vendors")
        })
        .await
    }

    /// Fetches category-grouped search results for `query`. The endpoint
    /// accepts the same filter set as the general listing.
    ///
    /// # Errors
    ///
    /// Same as [`DiscoveryClient::fetch_vendors`].
    pub async fn search_by_categories(
        &self,
        query: &VendorQuery,
    ) -> Result<CategorySearchResponse, ApiError> {
        let url = Self::build_url(&self.category_search_url, query);
        debug!(%url, "fetching category search");
        retry_with_backoff(self.max_retries, self.backoff_base_ms, || {
            self.get_json::<CategorySearchResponse>(url.clone(), "search-by-categories")
        })
        .await
    }

    /// Fetches online status for a batch of vendor IDs in one request.
    ///
    /// # Errors
    ///
    /// - [`ApiError::Api`] if the envelope reports `"success": false`.
    /// - [`ApiError::Http`] / [`ApiError::Deserialize`] as for the other
    ///   endpoints.
    pub async fn online_status_batch(
        &self,
        vendor_ids: &[String],
    ) -> Result<HashMap<String, OnlineStatus>, ApiError> {
        debug!(count = vendor_ids.len(), "fetching online status batch");
        let response: StatusBatchResponse =
            retry_with_backoff(self.max_retries, self.backoff_base_ms, || async {
                let response = self
                    .client
                    .post(self.status_batch_url.clone())
                    .json(&StatusBatchRequest {
                        vendor_profile_ids: vendor_ids,
                    })
                    .send()
                    .await?
                    .error_for_status()?;
                let body = response.text().await?;
                serde_json::from_str(&body).map_err(|e| ApiError::Deserialize {
                    context: "online-status/batch".to_owned(),
                    source: e,
                })
            })
            .await?;

        if !response.success {
            return Err(ApiError::Api(
                "status batch endpoint reported success=false".to_owned(),
            ));
        }
        Ok(response.statuses)
    }

    /// Clones `endpoint` and appends the query's wire pairs, percent-encoded.
    fn build_url(endpoint: &Url, query: &VendorQuery) -> Url {
        let mut url = endpoint.clone();
        {
            let mut pairs = url.query_pairs_mut();
            for (key, value) in query.to_query_pairs() {
                pairs.append_pair(key, &value);
            }
        }
        url
    }

    /// Sends a GET request, asserts a 2xx status, and parses the body.
    async fn get_json<T: DeserializeOwned>(&self, url: Url, context: &str) -> Result<T, ApiError> {
        let response = self.client.get(url).send().await?;
        let response = response.error_for_status()?;
        let body = response.text().await?;
        serde_json::from_str(&body).map_err(|e| ApiError::Deserialize {
            context: context.to_owned(),
            source: e,
        })
    }
}
