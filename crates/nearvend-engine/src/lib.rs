//! Search orchestration for vendor discovery.
//!
//! Sits between the HTTP client and whatever renders results: pure merge
//! and grouping algorithms, the radius-expansion ladder, viewport-driven
//! bounds search, the per-session query planner with its in-flight guard,
//! the online-status cache, the recently-viewed list, and the bridge that
//! keeps map surfaces in sync with list state.

pub mod bounds;
pub mod debounce;
pub mod map_bridge;
pub mod merge;
pub mod planner;
pub mod radius;
pub mod recent;
pub mod session;
pub mod status_cache;

pub use bounds::{classify, BoundsQuery, ZoomTier};
pub use debounce::Debouncer;
pub use map_bridge::{MapCommand, MapSurface, MapSyncBridge, SurfaceId};
pub use merge::{
    dedupe_by_key, group_by, merge_append, ring_merge, CitySection, Group, SECTION_DISPLAY_CAP,
};
pub use planner::{
    build_query, select_endpoint, Endpoint, FilterState, Pagination, QueryPlanner, QueryToken,
};
pub use radius::{RadiusTracker, RingPlan, RADIUS_LEVELS_MILES};
pub use recent::{
    RecentEntry, RecentStoreError, RecentlyViewed, RECENTLY_VIEWED_CAP, RECENTLY_VIEWED_TTL_DAYS,
};
pub use session::{DiscoverySession, Outcome, SearchMode};
pub use status_cache::{
    online_status_cache, OnlineStatusCache, PollSubscription, SharedApiError, StatusCache,
};
