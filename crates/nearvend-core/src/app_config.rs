use std::path::PathBuf;

/// Application configuration, loaded from the environment by
/// [`crate::config::load_app_config`].
#[derive(Debug, Clone)]
pub struct AppConfig {
    /// Base URL of the discovery backend, e.g. `https://api.example.com`.
    pub api_base_url: String,
    pub log_level: String,
    /// Fallback region used when every location provider fails.
    pub default_region_city: String,
    pub request_timeout_secs: u64,
    pub user_agent: String,
    pub max_retries: u32,
    pub retry_backoff_base_ms: u64,
    /// TTL applied when persisting a user-entered location.
    pub location_ttl_hours: i64,
    /// Floor between two status-batch fetches for the same cache.
    pub status_min_fetch_interval_secs: u64,
    /// Interval for background online-status polling.
    pub status_poll_interval_secs: u64,
    /// Debounce window for map-settled events.
    pub bounds_debounce_ms: u64,
    /// Where the CLI persists the selected location and recently-viewed list.
    pub state_path: PathBuf,
}
