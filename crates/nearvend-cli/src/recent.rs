//! The `recent` command: the persisted recently-viewed list.

use std::path::PathBuf;

use nearvend_core::AppConfig;
use nearvend_engine::RecentlyViewed;

/// The recently-viewed list lives next to the location state file.
pub(crate) fn recent_path(config: &AppConfig) -> PathBuf {
    config.state_path.with_file_name("recent.json")
}

pub(crate) fn run_recent(config: &AppConfig, clear: bool) -> anyhow::Result<()> {
    let path = recent_path(config);

    if clear {
        RecentlyViewed::new().save_to(&path)?;
        println!("recently viewed list cleared");
        return Ok(());
    }

    let recent = RecentlyViewed::load_from(&path)?;
    if recent.is_empty() {
        println!("no recently viewed vendors");
        return Ok(());
    }

    println!("{:<32}{:<18}VIEWED", "VENDOR", "CITY");
    for entry in recent.entries() {
        let name = entry.vendor.display_name.as_deref().unwrap_or("(unnamed)");
        let city = entry.vendor.city_label().unwrap_or("\u{2014}");
        let viewed = entry.viewed_at.format("%Y-%m-%d %H:%M");
        println!("{name:<32}{city:<18}{viewed}");
    }

    Ok(())
}
