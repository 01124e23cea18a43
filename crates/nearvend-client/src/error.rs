use thiserror::Error;

/// Errors returned by the discovery API client.
#[derive(Debug, Error)]
pub enum ApiError {
    /// Network or TLS failure, or a non-2xx HTTP status, from the underlying
    /// HTTP client.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// The API answered 2xx but reported failure in the response envelope
    /// (e.g. `"success": false` on the status batch endpoint).
    #[error("discovery API error: {0}")]
    Api(String),

    /// The response body could not be deserialized into the expected type.
    #[error("JSON deserialization error for {context}: {source}")]
    Deserialize {
        context: String,
        #[source]
        source: serde_json::Error,
    },
}
