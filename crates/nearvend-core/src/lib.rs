pub mod app_config;
pub mod config;
pub mod geo;
pub mod location;
pub mod vendor;

use thiserror::Error;

pub use app_config::AppConfig;
pub use config::{load_app_config, load_app_config_from_env};
pub use geo::{haversine_miles, radius_miles_for_viewport, GeoPoint};
pub use location::{LocationSource, LocationState};
pub use vendor::{VendorId, VendorRecord};

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("missing required environment variable: {0}")]
    MissingEnvVar(String),

    #[error("invalid value for {var}: {reason}")]
    InvalidEnvVar { var: String, reason: String },
}
