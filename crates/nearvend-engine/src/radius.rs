//! Radius-level tracking for "load more vendors" ring expansion.
//!
//! The level is an index into an ordered radius ladder. It only ever moves
//! forward within a filter context; changing location or category resets it
//! to the floor, because the previously covered ring is no longer valid.

/// Radius ladder, in miles.
pub const RADIUS_LEVELS_MILES: [f64; 5] = [50.0, 100.0, 200.0, 400.0, 800.0];

/// What the next expansion would query, if anything.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum RingPlan {
    /// Query the annulus between `min_radius_miles` (exclusion floor, the
    /// disk already covered) and `new_radius_miles`.
    Expand {
        next_level: usize,
        min_radius_miles: f64,
        new_radius_miles: f64,
    },
    /// The ladder is exhausted. Terminal and informational, not an error.
    MaxRadiusReached,
}

/// Tracks the current radius level and plans ring queries.
///
/// Planning and committing are separate so a failed ring query leaves the
/// level unchanged and the expansion stays retryable.
#[derive(Debug, Clone, PartialEq)]
pub struct RadiusTracker {
    level: usize,
    levels: Vec<f64>,
}

impl Default for RadiusTracker {
    fn default() -> Self {
        Self::new()
    }
}

impl RadiusTracker {
    #[must_use]
    pub fn new() -> Self {
        Self::with_levels(RADIUS_LEVELS_MILES.to_vec())
    }

    /// Custom ladder, for tests. Empty ladders are replaced by the default.
    #[must_use]
    pub fn with_levels(levels: Vec<f64>) -> Self {
        let levels = if levels.is_empty() {
            RADIUS_LEVELS_MILES.to_vec()
        } else {
            levels
        };
        Self { level: 0, levels }
    }

    #[must_use]
    pub fn current_level(&self) -> usize {
        self.level
    }

    /// Radius covered so far.
    #[must_use]
    pub fn current_radius_miles(&self) -> f64 {
        self.levels[self.level.min(self.levels.len() - 1)]
    }

    #[must_use]
    pub fn is_at_max(&self) -> bool {
        self.level + 1 >= self.levels.len()
    }

    /// Plans the next expansion without advancing.
    #[must_use]
    pub fn plan_expansion(&self) -> RingPlan {
        if self.is_at_max() {
            return RingPlan::MaxRadiusReached;
        }
        let next_level = self.level + 1;
        RingPlan::Expand {
            next_level,
            min_radius_miles: self.levels[self.level],
            new_radius_miles: self.levels[next_level],
        }
    }

    /// Advances to the planned level after its ring query succeeded.
    /// The level never moves backward.
    pub fn commit(&mut self, plan: &RingPlan) {
        if let RingPlan::Expand { next_level, .. } = plan {
            self.level = self.level.max(*next_level);
        }
    }

    /// Back to the floor. Triggered by "location changed" or
    /// "category changed".
    pub fn reset(&mut self) {
        self.level = 0;
    }
}
