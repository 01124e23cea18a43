use std::path::PathBuf;

use crate::app_config::AppConfig;
use crate::ConfigError;

/// Load application configuration from environment variables.
///
/// Calls `dotenvy::dotenv().ok()` to load `.env` files before reading env vars.
///
/// # Errors
///
/// Returns `ConfigError` if required env vars are missing or values are invalid.
pub fn load_app_config() -> Result<AppConfig, ConfigError> {
    dotenvy::dotenv().ok();
    load_app_config_from_env()
}

/// Load application configuration from environment variables already in the
/// process.
///
/// Unlike [`load_app_config`], this does NOT load `.env` files. Useful for
/// testing or when the caller manages env setup.
///
/// # Errors
///
/// Returns `ConfigError` if required env vars are missing or values are invalid.
pub fn load_app_config_from_env() -> Result<AppConfig, ConfigError> {
    build_app_config(|key| std::env::var(key))
}

/// Build application configuration using the provided env-var lookup function.
///
/// This is the core parsing/validation logic, decoupled from the actual
/// environment so it can be tested with a pure `HashMap` lookup, without
/// any `set_var`/`remove_var`.
fn build_app_config<F>(lookup: F) -> Result<AppConfig, ConfigError>
where
    F: Fn(&str) -> Result<String, std::env::VarError>,
{
    let require = |var: &str| -> Result<String, ConfigError> {
        lookup(var).map_err(|_| ConfigError::MissingEnvVar(var.to_string()))
    };

    let or_default = |var: &str, default: &str| -> String {
        lookup(var).unwrap_or_else(|_| default.to_string())
    };

    let parse_u32 = |var: &str, default: &str| -> Result<u32, ConfigError> {
        let raw = or_default(var, default);
        raw.parse::<u32>().map_err(|e| ConfigError::InvalidEnvVar {
            var: var.to_string(),
            reason: e.to_string(),
        })
    };

    let parse_u64 = |var: &str, default: &str| -> Result<u64, ConfigError> {
        let raw = or_default(var, default);
        raw.parse::<u64>().map_err(|e| ConfigError::InvalidEnvVar {
            var: var.to_string(),
            reason: e.to_string(),
        })
    };

    let parse_i64 = |var: &str, default: &str| -> Result<i64, ConfigError> {
        let raw = or_default(var, default);
        raw.parse::<i64>().map_err(|e| ConfigError::InvalidEnvVar {
            var: var.to_string(),
            reason: e.to_string(),
        })
    };

    let api_base_url = require("NEARVEND_API_BASE_URL")?;

    let log_level = or_default("NEARVEND_LOG_LEVEL", "info");
    let default_region_city = or_default("NEARVEND_DEFAULT_REGION_CITY", "Toronto");
    let request_timeout_secs = parse_u64("NEARVEND_REQUEST_TIMEOUT_SECS", "30")?;
    let user_agent = or_default("NEARVEND_USER_AGENT", "nearvend/0.1 (vendor-discovery)");
    let max_retries = parse_u32("NEARVEND_MAX_RETRIES", "2")?;
    let retry_backoff_base_ms = parse_u64("NEARVEND_RETRY_BACKOFF_BASE_MS", "500")?;
    let location_ttl_hours = parse_i64("NEARVEND_LOCATION_TTL_HOURS", "24")?;
    let status_min_fetch_interval_secs =
        parse_u64("NEARVEND_STATUS_MIN_FETCH_INTERVAL_SECS", "30")?;
    let status_poll_interval_secs = parse_u64("NEARVEND_STATUS_POLL_INTERVAL_SECS", "300")?;
    let bounds_debounce_ms = parse_u64("NEARVEND_BOUNDS_DEBOUNCE_MS", "800")?;
    let state_path = PathBuf::from(or_default("NEARVEND_STATE_PATH", "./.nearvend/state.json"));

    Ok(AppConfig {
        api_base_url,
        log_level,
        default_region_city,
        request_timeout_secs,
        user_agent,
        max_retries,
        retry_backoff_base_ms,
        location_ttl_hours,
        status_min_fetch_interval_secs,
        status_poll_interval_secs,
        bounds_debounce_ms,
        state_path,
    })
}
