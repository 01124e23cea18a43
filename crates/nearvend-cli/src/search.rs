//! The `search` command: near-me discovery with optional ring expansion.
//!
//! Resolves a location (unless `--city` overrides it), runs the initial
//! search, optionally widens the radius level by level, then prints city
//! sections annotated with online status.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use nearvend_client::{DiscoveryClient, OnlineStatus};
use nearvend_core::{AppConfig, VendorRecord};
use nearvend_engine::{
    online_status_cache, DiscoverySession, MapSyncBridge, Outcome, RecentlyViewed,
    RADIUS_LEVELS_MILES,
};

pub(crate) async fn run_search(
    config: &AppConfig,
    categories: Vec<String>,
    sort: Option<String>,
    city_override: Option<String>,
    expand: usize,
    open: Option<usize>,
    skip_status: bool,
) -> anyhow::Result<()> {
    let mut config = config.clone();
    let location = match city_override {
        // An explicit city skips resolution entirely; the query goes out
        // city-filtered with no coordinates.
        Some(city) => {
            config.default_region_city = city;
            None
        }
        None => super::locate::build_resolver(&config)?.resolve().await,
    };

    let client = Arc::new(DiscoveryClient::new(&config)?);
    let mut session =
        DiscoverySession::new(Arc::clone(&client), Arc::new(MapSyncBridge::new()), &config);
    session.set_location(location);
    session.set_categories(categories);
    session.set_sort(sort);

    match session.initial_search().await? {
        Outcome::Applied { vendors_added } => {
            tracing::debug!(vendors_added, "initial search applied");
        }
        outcome => anyhow::bail!("initial search was not applied: {outcome:?}"),
    }

    for _ in 0..expand {
        match session.expand_radius().await? {
            Outcome::Applied { vendors_added } => {
                println!(
                    "widened to {} miles: {} more vendors",
                    RADIUS_LEVELS_MILES[session.radius_level()],
                    vendors_added
                );
            }
            Outcome::MaxRadiusReached => {
                println!("maximum search area reached");
                break;
            }
            outcome => {
                tracing::debug!(?outcome, "expansion not applied");
                break;
            }
        }
    }

    let statuses = if skip_status {
        HashMap::new()
    } else {
        fetch_statuses(&config, Arc::clone(&client), &session).await
    };

    print_results(&session, &statuses);

    if let Some(number) = open {
        open_result(&config, &session, number)?;
    }

    Ok(())
}

/// Batch online-status lookup for everything in the result set. Status is
/// decoration here, so failures degrade to "no badge" instead of failing
/// the search.
async fn fetch_statuses(
    config: &AppConfig,
    client: Arc<DiscoveryClient>,
    session: &DiscoverySession,
) -> HashMap<String, OnlineStatus> {
    let keys = session.active_vendor_keys();
    let cache = online_status_cache(
        client,
        Duration::from_secs(config.status_min_fetch_interval_secs),
    );
    match cache.fetch_batch(&keys).await {
        Ok(statuses) => statuses,
        Err(e) => {
            tracing::warn!(error = %e, "online status unavailable");
            HashMap::new()
        }
    }
}

fn print_results(session: &DiscoverySession, statuses: &HashMap<String, OnlineStatus>) {
    if session.sections().is_empty() {
        println!("no vendors found near {}", session.display_city());
        return;
    }

    println!(
        "{} vendors near {}",
        session.total_count(),
        session.display_city()
    );

    let mut number = 1;
    for section in session.sections() {
        println!();
        println!("{} \u{2014} {} vendors", section.city, section.total_count);
        for vendor in &section.vendors {
            println!("{number:>4}. {}", vendor_line(vendor, statuses));
            number += 1;
        }
        let hidden = section.total_count.saturating_sub(section.vendors.len());
        if hidden > 0 {
            println!("      ... and {hidden} more");
        }
    }
}

fn vendor_line(vendor: &VendorRecord, statuses: &HashMap<String, OnlineStatus>) -> String {
    let name = vendor.display_name.as_deref().unwrap_or("(unnamed)");
    let name = if name.chars().count() > 28 {
        format!("{}...", name.chars().take(28).collect::<String>())
    } else {
        name.to_string()
    };
    let distance = vendor
        .distance_miles
        .map_or_else(|| "\u{2014}".to_string(), |d| format!("{d:.1} mi"));
    let badge = vendor
        .identity_key()
        .and_then(|key| statuses.get(&key))
        .map_or("", |status| {
            if status.is_online {
                "online"
            } else {
                "offline"
            }
        });
    format!("{name:<32}{distance:<10}{badge}")
}

/// Marks the N-th printed result (1-based) as viewed, persisting it to the
/// recently-viewed list.
fn open_result(
    config: &AppConfig,
    session: &DiscoverySession,
    number: usize,
) -> anyhow::Result<()> {
    let displayed: Vec<&VendorRecord> = session
        .sections()
        .iter()
        .flat_map(|section| &section.vendors)
        .collect();
    let vendor = number
        .checked_sub(1)
        .and_then(|i| displayed.get(i))
        .ok_or_else(|| anyhow::anyhow!("no result numbered {number}"))?;

    let path = super::recent::recent_path(config);
    let mut recent = RecentlyViewed::load_from(&path)?;
    recent.record((*vendor).clone());
    recent.save_to(&path)?;

    println!();
    println!(
        "viewed: {}",
        vendor.display_name.as_deref().unwrap_or("(unnamed)")
    );
    Ok(())
}
