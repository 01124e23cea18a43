//! Recently viewed vendors, newest first, with a size cap and TTL.
//!
//! Viewing a vendor that is already on the list moves it to the front
//! instead of duplicating it. Entries expire after thirty days and fall
//! off the end once the cap is reached.

use std::path::{Path, PathBuf};

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::debug;

use nearvend_core::VendorRecord;

pub const RECENTLY_VIEWED_CAP: usize = 20;
pub const RECENTLY_VIEWED_TTL_DAYS: i64 = 30;

#[derive(Debug, Error)]
pub enum RecentStoreError {
    #[error("recently-viewed store IO at {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("recently-viewed store parse error: {0}")]
    Parse(#[from] serde_json::Error),
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RecentEntry {
    pub vendor: VendorRecord,
    pub viewed_at: DateTime<Utc>,
}

/// The recently-viewed list. Entries are newest first.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RecentlyViewed {
    entries: Vec<RecentEntry>,
}

impl RecentlyViewed {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Records a view now. See [`Self::record_at`].
    pub fn record(&mut self, vendor: VendorRecord) {
        self.record_at(vendor, Utc::now());
    }

    /// Records a view at `now`: expired entries are pruned, an existing
    /// entry for the same vendor moves to the front with a fresh timestamp,
    /// and the list is truncated to the cap. Vendors without an identity key
    /// are ignored, since they cannot be deduplicated on a later view.
    pub fn record_at(&mut self, vendor: VendorRecord, now: DateTime<Utc>) {
        let Some(key) = vendor.identity_key() else {
            debug!("ignoring view of vendor without an identity key");
            return;
        };
        self.prune_expired_at(now);
        self.entries
            .retain(|entry| entry.vendor.identity_key().as_deref() != Some(key.as_str()));
        self.entries.insert(
            0,
            RecentEntry {
                vendor,
                viewed_at: now,
            },
        );
        self.entries.truncate(RECENTLY_VIEWED_CAP);
    }

    /// Drops entries older than the TTL.
    pub fn prune_expired_at(&mut self, now: DateTime<Utc>) {
        let cutoff = now - Duration::days(RECENTLY_VIEWED_TTL_DAYS);
        self.entries.retain(|entry| entry.viewed_at > cutoff);
    }

    /// Non-expired vendors, newest first.
    #[must_use]
    pub fn vendors(&self) -> Vec<&VendorRecord> {
        self.entries.iter().map(|entry| &entry.vendor).collect()
    }

    /// Entries with their view timestamps, newest first.
    #[must_use]
    pub fn entries(&self) -> &[RecentEntry] {
        &self.entries
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Loads the list from a JSON file. A missing file is an empty list;
    /// expired entries are pruned on load.
    ///
    /// # Errors
    ///
    /// Returns [`RecentStoreError`] when the file exists but cannot be read
    /// or parsed.
    pub fn load_from(path: &Path) -> Result<Self, RecentStoreError> {
        let raw = match std::fs::read_to_string(path) {
            Ok(raw) => raw,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(Self::new()),
            Err(e) => {
                return Err(RecentStoreError::Io {
                    path: path.to_path_buf(),
                    source: e,
                })
            }
        };
        let mut list: Self = serde_json::from_str(&raw)?;
        list.prune_expired_at(Utc::now());
        Ok(list)
    }

    /// Saves the list as pretty JSON, creating parent directories.
    ///
    /// # Errors
    ///
    /// Returns [`RecentStoreError`] when the file cannot be written.
    pub fn save_to(&self, path: &Path) -> Result<(), RecentStoreError> {
        let io_err = |source| RecentStoreError::Io {
            path: path.to_path_buf(),
            source,
        };
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent).map_err(io_err)?;
            }
        }
        let raw = serde_json::to_string_pretty(self)?;
        std::fs::write(path, raw).map_err(io_err)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn vendor(id: i64) -> VendorRecord {
        serde_json::from_value(serde_json::json!({
            "id": id,
            "displayName": format!("Vendor {id}"),
            "city": "Toronto"
        }))
        .expect("valid vendor")
    }

    fn keys(list: &RecentlyViewed) -> Vec<String> {
        list.vendors()
            .iter()
            .filter_map(|v| v.identity_key())
            .collect()
    }

    #[test]
    fn views_are_newest_first() {
        let mut list = RecentlyViewed::new();
        list.record(vendor(1));
        list.record(vendor(2));
        assert_eq!(keys(&list), vec!["2", "1"]);
    }

    #[test]
    fn repeat_view_moves_to_front_without_duplicating() {
        let mut list = RecentlyViewed::new();
        list.record(vendor(1));
        list.record(vendor(2));
        list.record(vendor(1));
        assert_eq!(keys(&list), vec!["1", "2"]);
        assert_eq!(list.len(), 2);
    }

    #[test]
    fn list_is_capped() {
        let mut list = RecentlyViewed::new();
        for id in 0..30 {
            list.record(vendor(id));
        }
        assert_eq!(list.len(), RECENTLY_VIEWED_CAP);
        assert_eq!(keys(&list)[0], "29");
        assert_eq!(keys(&list)[RECENTLY_VIEWED_CAP - 1], "10");
    }

    #[test]
    fn expired_views_fall_off() {
        let mut list = RecentlyViewed::new();
        let long_ago = Utc::now() - Duration::days(RECENTLY_VIEWED_TTL_DAYS + 1);
        list.record_at(vendor(1), long_ago);
        list.record(vendor(2));
        assert_eq!(keys(&list), vec!["2"]);
    }

    #[test]
    fn keyless_vendors_are_ignored() {
        let keyless: VendorRecord =
            serde_json::from_value(serde_json::json!({ "displayName": "No ID" })).unwrap();
        let mut list = RecentlyViewed::new();
        list.record(keyless);
        assert!(list.is_empty());
    }

    #[test]
    fn round_trips_through_the_state_file() {
        let dir = std::env::temp_dir().join(format!("nearvend-recent-{}", std::process::id()));
        let path = dir.join("recent.json");

        let mut list = RecentlyViewed::new();
        list.record(vendor(1));
        list.record(vendor(2));
        list.save_to(&path).unwrap();

        let loaded = RecentlyViewed::load_from(&path).unwrap();
        assert_eq!(keys(&loaded), vec!["2", "1"]);

        let _ = std::fs::remove_dir_all(dir);
    }

    #[test]
    fn missing_state_file_is_an_empty_list() {
        let path = std::env::temp_dir().join("nearvend-recent-does-not-exist.json");
        let loaded = RecentlyViewed::load_from(&path).unwrap();
        assert!(loaded.is_empty());
    }
}
