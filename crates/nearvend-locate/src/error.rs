use std::path::PathBuf;

use thiserror::Error;

/// Errors from location resolution and the location store.
///
/// Provider errors never escape [`crate::LocationResolver::resolve`] (the
/// chain swallows them and moves on), but they are typed so the chain can
/// log which provider failed and why.
#[derive(Debug, Error)]
pub enum LocateError {
    #[error("provider {provider} request failed: {source}")]
    ProviderHttp {
        provider: &'static str,
        #[source]
        source: reqwest::Error,
    },

    #[error("provider {provider} returned an unusable payload")]
    ProviderPayload { provider: &'static str },

    #[error("location store IO at {}: {source}", path.display())]
    StoreIo {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("location store parse error: {0}")]
    StoreParse(#[from] serde_json::Error),
}
