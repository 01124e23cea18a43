//! Viewport classification for bounds-driven search.
//!
//! When the map settles after a pan or zoom, the snapshot of its viewport
//! becomes a [`BoundsQuery`]. Classification into a search tier is a pure
//! function of zoom alone, so it is deterministic and trivially testable.

use nearvend_core::{radius_miles_for_viewport, GeoPoint};

/// A search tier derived from map zoom.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ZoomTier {
    pub name: &'static str,
    pub radius_miles: f64,
    pub page_size: u32,
}

const COUNTRY: ZoomTier = ZoomTier {
    name: "country",
    radius_miles: 2000.0,
    page_size: 48,
};
const PROVINCE: ZoomTier = ZoomTier {
    name: "province",
    radius_miles: 500.0,
    page_size: 36,
};
const CITY: ZoomTier = ZoomTier {
    name: "city",
    radius_miles: 100.0,
    page_size: 24,
};

/// Maps a zoom value to its tier: zoom <= 5 is country scale, <= 7 province,
/// everything closer is city scale. Larger radii request proportionally
/// larger pages.
#[must_use]
pub fn classify(zoom: u8) -> ZoomTier {
    match zoom {
        0..=5 => COUNTRY,
        6..=7 => PROVINCE,
        _ => CITY,
    }
}

/// Snapshot of the map viewport when it settled.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BoundsQuery {
    pub center: GeoPoint,
    pub north: f64,
    pub south: f64,
    pub east: f64,
    pub west: f64,
    pub zoom: u8,
}

impl BoundsQuery {
    /// The tier this viewport queries at.
    #[must_use]
    pub fn tier(&self) -> ZoomTier {
        classify(self.zoom)
    }

    /// Search radius for this viewport: the tier radius, widened when the
    /// visible bounds reach beyond it (a short, wide window can out-span its
    /// zoom tier).
    #[must_use]
    pub fn radius_miles(&self) -> f64 {
        let visible =
            radius_miles_for_viewport(self.center, self.north, self.south, self.east, self.west);
        self.tier().radius_miles.max(visible)
    }
}
