//! Pure merge, dedupe, and grouping over vendor records.
//!
//! Every network response passes through here before touching session state:
//! single pages are deduped (multiple sections can reference the same
//! vendor), "load more" appends are unioned without losing or duplicating
//! rows, and ring batches extend city sections in place so already-rendered
//! cards never reshuffle.

use std::collections::HashMap;
use std::hash::Hash;

use nearvend_core::VendorRecord;

/// How many vendors a city section displays; the rest stay in
/// `all_vendors_seen` and are reflected in `total_count`.
pub const SECTION_DISPLAY_CAP: usize = 12;

/// One city's running slice of ring-query results.
#[derive(Debug, Clone, PartialEq)]
pub struct CitySection {
    pub city: String,
    /// Capped display slice of `all_vendors_seen`.
    pub vendors: Vec<VendorRecord>,
    /// Every vendor ever merged into this section, in arrival order. The
    /// dedupe baseline for subsequent rings.
    pub all_vendors_seen: Vec<VendorRecord>,
    pub total_count: usize,
    /// The radius level whose ring first produced this section.
    pub radius_level_introduced: usize,
}

impl CitySection {
    fn from_vendors(city: String, vendors: Vec<VendorRecord>, level: usize) -> Self {
        let mut section = Self {
            city,
            vendors: Vec::new(),
            all_vendors_seen: vendors,
            total_count: 0,
            radius_level_introduced: level,
        };
        section.recompute();
        section
    }

    fn recompute(&mut self) {
        self.total_count = self.all_vendors_seen.len();
        self.vendors = self
            .all_vendors_seen
            .iter()
            .take(SECTION_DISPLAY_CAP)
            .cloned()
            .collect();
    }
}

/// Keeps the first occurrence per key, in iteration order. Records whose key
/// does not resolve are kept as-is: without an identity there is no way to
/// prove two records are the same vendor.
#[must_use]
pub fn dedupe_by_key<T, K, F>(records: Vec<T>, key_fn: F) -> Vec<T>
where
    K: Eq + Hash,
    F: Fn(&T) -> Option<K>,
{
    let mut seen = std::collections::HashSet::new();
    records
        .into_iter()
        .filter(|record| match key_fn(record) {
            Some(key) => seen.insert(key),
            None => true,
        })
        .collect()
}

/// Union of `existing` and `incoming` for "load more" pagination: existing
/// rows keep their positions, incoming data wins on key collision, and
/// genuinely new rows append in incoming order. Never loses a previously
/// loaded vendor, never duplicates one.
#[must_use]
pub fn merge_append<T, K, F>(existing: Vec<T>, incoming: Vec<T>, key_fn: F) -> Vec<T>
where
    K: Eq + Hash,
    F: Fn(&T) -> Option<K>,
{
    let mut out: Vec<T> = Vec::new();
    let mut position: HashMap<K, usize> = HashMap::new();

    for record in existing {
        match key_fn(&record) {
            Some(key) => {
                if let std::collections::hash_map::Entry::Vacant(slot) = position.entry(key) {
                    slot.insert(out.len());
                    out.push(record);
                }
            }
            None => out.push(record),
        }
    }
    for record in incoming {
        match key_fn(&record) {
            Some(key) => {
                if let Some(&i) = position.get(&key) {
                    out[i] = record;
                } else {
                    position.insert(key, out.len());
                    out.push(record);
                }
            }
            None => out.push(record),
        }
    }
    out
}

/// A labeled partition produced by [`group_by`].
#[derive(Debug, Clone, PartialEq)]
pub struct Group<T> {
    pub key: String,
    pub label: String,
    pub vendors: Vec<T>,
}

/// Partitions records into labeled groups, sorted descending by group size
/// so larger groups surface first. Records whose key does not resolve are
/// dropped; empty groups cannot occur.
#[must_use]
pub fn group_by<T, K, L>(records: Vec<T>, key_fn: K, label_fn: L) -> Vec<Group<T>>
where
    K: Fn(&T) -> Option<String>,
    L: Fn(&T) -> String,
{
    let mut order: Vec<String> = Vec::new();
    let mut groups: HashMap<String, Group<T>> = HashMap::new();

    for record in records {
        let Some(key) = key_fn(&record) else {
            continue;
        };
        if let Some(group) = groups.get_mut(&key) {
            group.vendors.push(record);
        } else {
            order.push(key.clone());
            let label = label_fn(&record);
            groups.insert(
                key.clone(),
                Group {
                    key,
                    label,
                    vendors: vec![record],
                },
            );
        }
    }

    let mut out: Vec<Group<T>> = order
        .into_iter()
        .filter_map(|key| groups.remove(&key))
        .collect();
    // Stable sort: equal-sized groups keep first-encountered order.
    out.sort_by_key(|group| std::cmp::Reverse(group.vendors.len()));
    out
}

/// Folds a ring batch into running city sections.
///
/// Matching sections are extended, never replaced: newly seen vendors
/// (deduped against `all_vendors_seen` by identity key) append, the display
/// slice and `total_count` are recomputed, and new cities get fresh sections
/// stamped with `level`. Sections re-sort by `total_count` descending.
///
/// Applying the same batch twice is a no-op the second time.
#[must_use]
pub fn ring_merge(
    mut sections: Vec<CitySection>,
    incoming: &[VendorRecord],
    level: usize,
) -> Vec<CitySection> {
    let incoming_by_city = group_by(
        incoming.to_vec(),
        |v: &VendorRecord| v.city_label().map(str::to_string),
        |v| v.city_label().unwrap_or_default().to_string(),
    );

    for group in incoming_by_city {
        if let Some(section) = sections.iter_mut().find(|s| s.city == group.key) {
            let mut seen: std::collections::HashSet<String> = section
                .all_vendors_seen
                .iter()
                .filter_map(VendorRecord::identity_key)
                .collect();
            for vendor in group.vendors {
                match vendor.identity_key() {
                    Some(key) => {
                        if seen.insert(key) {
                            section.all_vendors_seen.push(vendor);
                        }
                    }
                    None => section.all_vendors_seen.push(vendor),
                }
            }
            section.recompute();
        } else {
            let vendors = dedupe_by_key(group.vendors, VendorRecord::identity_key);
            sections.push(CitySection::from_vendors(group.key, vendors, level));
        }
    }

    sections.sort_by_key(|section| std::cmp::Reverse(section.total_count));
    sections
}
