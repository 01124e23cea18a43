//! IP-geolocation provider chain.
//!
//! Tries providers in priority order (ip-api.com, ipwho.is, geojs.io) and
//! returns the first well-formed fix. Each provider has its own response
//! shape, normalized by a provider-specific parse function; a provider that
//! fails or returns an unusable payload is skipped and the chain continues.

mod geojs;
mod ip_api;
mod ipwho;

use crate::error::LocateError;

/// A normalized fix produced by a provider parse function.
#[derive(Debug, Clone, PartialEq)]
pub struct LocationFix {
    pub lat: f64,
    pub lng: f64,
    pub city: String,
    /// Longer display form, e.g. `"Toronto, Ontario, Canada"`.
    pub formatted_label: Option<String>,
}

/// One entry in the provider chain: a name for logging, the endpoint URL,
/// and the parse function that understands this provider's payload.
#[derive(Clone)]
pub struct Provider {
    pub name: &'static str,
    url: String,
    parse: fn(&serde_json::Value) -> Option<LocationFix>,
}

impl Provider {
    #[must_use]
    pub fn new(
        name: &'static str,
        url: impl Into<String>,
        parse: fn(&serde_json::Value) -> Option<LocationFix>,
    ) -> Self {
        Self {
            name,
            url: url.into(),
            parse,
        }
    }

    #[must_use]
    pub fn url(&self) -> &str {
        &self.url
    }

    /// Fetches this provider's endpoint and parses the payload.
    ///
    /// # Errors
    ///
    /// - [`LocateError::ProviderHttp`] on network failure or non-2xx status.
    /// - [`LocateError::ProviderPayload`] when the body parses as JSON but
    ///   does not contain a usable fix.
    pub(crate) async fn fetch(&self, client: &reqwest::Client) -> Result<LocationFix, LocateError> {
        let response = client
            .get(&self.url)
            .send()
            .await
            .and_then(reqwest::Response::error_for_status)
            .map_err(|source| LocateError::ProviderHttp {
                provider: self.name,
                source,
            })?;

        let body: serde_json::Value =
            response
                .json()
                .await
                .map_err(|source| LocateError::ProviderHttp {
                    provider: self.name,
                    source,
                })?;

        (self.parse)(&body).ok_or(LocateError::ProviderPayload {
            provider: self.name,
        })
    }
}

impl std::fmt::Debug for Provider {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Provider")
            .field("name", &self.name)
            .field("url", &self.url)
            .finish_non_exhaustive()
    }
}

/// The production provider chain, in priority order.
#[must_use]
pub fn default_chain() -> Vec<Provider> {
    vec![ip_api::provider(), ipwho::provider(), geojs::provider()]
}

/// Reads a coordinate that some providers encode as a JSON number and others
/// as a decimal string.
pub(crate) fn coordinate(body: &serde_json::Value, key: &str) -> Option<f64> {
    let v = body.get(key)?;
    v.as_f64()
        .or_else(|| v.as_str().and_then(|s| s.trim().parse::<f64>().ok()))
}

/// Reads a non-empty string field.
pub(crate) fn text(body: &serde_json::Value, key: &str) -> Option<String> {
    body.get(key)
        .and_then(serde_json::Value::as_str)
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
}

/// Joins available label parts into `"City, Region, Country"` form.
pub(crate) fn join_label(parts: &[Option<String>]) -> Option<String> {
    let joined: Vec<&str> = parts
        .iter()
        .filter_map(|p| p.as_deref())
        .filter(|s| !s.is_empty())
        .collect();
    if joined.is_empty() {
        None
    } else {
        Some(joined.join(", "))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_chain_order_is_stable() {
        let names: Vec<&str> = default_chain().iter().map(|p| p.name).collect();
        assert_eq!(names, vec!["ip-api", "ipwho", "geojs"]);
    }

    #[test]
    fn coordinate_accepts_numbers_and_strings() {
        let body = serde_json::json!({ "a": 43.65, "b": "-79.38", "c": "nope" });
        assert_eq!(coordinate(&body, "a"), Some(43.65));
        assert_eq!(coordinate(&body, "b"), Some(-79.38));
        assert_eq!(coordinate(&body, "c"), None);
        assert_eq!(coordinate(&body, "missing"), None);
    }

    #[test]
    fn join_label_skips_missing_parts() {
        let label = join_label(&[
            Some("Toronto".to_string()),
            None,
            Some("Canada".to_string()),
        ]);
        assert_eq!(label.as_deref(), Some("Toronto, Canada"));

        assert_eq!(join_label(&[None, None]), None);
    }
}
