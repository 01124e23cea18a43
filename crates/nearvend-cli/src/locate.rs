//! Location command handlers.
//!
//! The `locate` commands manage the persisted search location: the bare
//! command resolves one (stored state first, then the IP provider chain),
//! `set` persists an explicit choice with a TTL, `refine` applies a precise
//! device fix, and `clear` forgets the stored state so the next resolve
//! re-detects.

use std::sync::Arc;
use std::time::Duration;

use clap::Subcommand;

use nearvend_core::{AppConfig, LocationState};
use nearvend_locate::{FileLocationStore, LocationResolver};

/// Sub-commands available under `locate`.
#[derive(Debug, Subcommand)]
pub enum LocateCommands {
    /// Persist a chosen location (outranks auto-detection until it expires)
    Set {
        /// City label, e.g. "Toronto"
        #[arg(long)]
        city: String,
        #[arg(long, allow_negative_numbers = true)]
        lat: f64,
        #[arg(long, allow_negative_numbers = true)]
        lng: f64,
    },
    /// Apply a precise device coordinate fix to the stored location
    Refine {
        #[arg(long)]
        lat: f64,
        #[arg(long)]
        lng: f64,
    },
    /// Forget the stored location and re-detect on the next resolve
    Clear,
}

/// Builds the resolver every location-aware command shares: an HTTP client
/// with the configured timeout and user agent, backed by the on-disk store.
///
/// # Errors
///
/// Returns an error when the HTTP client cannot be constructed.
pub(crate) fn build_resolver(config: &AppConfig) -> anyhow::Result<LocationResolver> {
    let client = reqwest::Client::builder()
        .timeout(Duration::from_secs(config.request_timeout_secs))
        .user_agent(config.user_agent.clone())
        .build()?;
    let store = Arc::new(FileLocationStore::new(config.state_path.clone()));
    Ok(LocationResolver::new(
        client,
        store,
        config.location_ttl_hours,
    ))
}

pub(crate) async fn run_locate(
    config: &AppConfig,
    command: Option<LocateCommands>,
) -> anyhow::Result<()> {
    let resolver = build_resolver(config)?;

    match command {
        None => match resolver.resolve().await {
            Some(location) => print_location(&location),
            None => println!(
                "no location could be resolved; searches will fall back to {}",
                config.default_region_city
            ),
        },
        Some(LocateCommands::Set { city, lat, lng }) => {
            let state = resolver.persist_user_location(lat, lng, city, config.location_ttl_hours)?;
            println!(
                "location set for the next {} hours:",
                config.location_ttl_hours
            );
            print_location(&state);
        }
        Some(LocateCommands::Refine { lat, lng }) => {
            match resolver.refine_coordinates(lat, lng)? {
                Some(state) => {
                    println!("coordinates refined:");
                    print_location(&state);
                }
                None => println!("nothing stored to refine; run `locate` or `locate set` first"),
            }
        }
        Some(LocateCommands::Clear) => {
            resolver.clear_stored_location()?;
            println!("stored location cleared");
        }
    }

    Ok(())
}

fn print_location(location: &LocationState) {
    println!(
        "{} ({:.4}, {:.4}) [{:?}]",
        location.display_label(),
        location.lat,
        location.lng,
        location.source
    );
}
