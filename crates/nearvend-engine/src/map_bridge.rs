//! Synchronization contract between the result list and map surfaces.
//!
//! The bridge owns a registry of live map surfaces (desktop and mobile can
//! render the same data at once) and broadcasts typed commands to all of
//! them, so a hover started on one view is reflected on every view.

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use tracing::debug;
use uuid::Uuid;

use nearvend_core::GeoPoint;

/// Identifies one registered map surface.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SurfaceId(Uuid);

/// Commands pushed to every registered surface.
#[derive(Debug, Clone, PartialEq)]
pub enum MapCommand {
    /// Recenter and zoom so `radius_miles` around `center` is visible.
    /// Emitted when a radius expansion lands.
    Recenter {
        center: GeoPoint,
        radius_miles: f64,
    },
    /// Marker icon state for hover highlight.
    SetHighlight { vendor_key: String, active: bool },
    /// A vendor was selected, by list click or marker click. Both sides
    /// reflect the same selection.
    SelectVendor { vendor_key: String },
    /// The active result set changed; re-render markers.
    RefreshMarkers,
}

/// A rendering surface fed by the bridge.
pub trait MapSurface: Send + Sync {
    fn apply(&self, command: &MapCommand);
}

/// Registry of active map surfaces with broadcast semantics.
///
/// Constructed once per session and injected where needed; surfaces
/// register on mount and unregister on teardown.
#[derive(Default)]
pub struct MapSyncBridge {
    surfaces: Mutex<HashMap<SurfaceId, Arc<dyn MapSurface>>>,
    selected: Mutex<Option<String>>,
}

impl MapSyncBridge {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a surface. A surface registered while a vendor is selected
    /// receives that selection immediately so it renders consistently.
    pub fn register(&self, surface: Arc<dyn MapSurface>) -> SurfaceId {
        let id = SurfaceId(Uuid::new_v4());
        if let Some(vendor_key) = self.selected_vendor() {
            surface.apply(&MapCommand::SelectVendor { vendor_key });
        }
        self.lock_surfaces().insert(id, surface);
        debug!(surface = %id.0, "map surface registered");
        id
    }

    /// Removes a surface; returns whether it was registered.
    pub fn unregister(&self, id: SurfaceId) -> bool {
        let removed = self.lock_surfaces().remove(&id).is_some();
        if removed {
            debug!(surface = %id.0, "map surface unregistered");
        }
        removed
    }

    #[must_use]
    pub fn surface_count(&self) -> usize {
        self.lock_surfaces().len()
    }

    /// Sends `command` to every registered surface.
    pub fn broadcast(&self, command: &MapCommand) {
        let surfaces: Vec<Arc<dyn MapSurface>> =
            self.lock_surfaces().values().cloned().collect();
        for surface in surfaces {
            surface.apply(command);
        }
    }

    /// Hover highlight for a marker, on all surfaces at once.
    pub fn set_highlight(&self, vendor_key: &str, active: bool) {
        self.broadcast(&MapCommand::SetHighlight {
            vendor_key: vendor_key.to_string(),
            active,
        });
    }

    /// Selection from either the list or a map marker.
    pub fn select_vendor(&self, vendor_key: &str) {
        {
            let mut selected = self
                .selected
                .lock()
                .unwrap_or_else(std::sync::PoisonError::into_inner);
            *selected = Some(vendor_key.to_string());
        }
        self.broadcast(&MapCommand::SelectVendor {
            vendor_key: vendor_key.to_string(),
        });
    }

    #[must_use]
    pub fn selected_vendor(&self) -> Option<String> {
        self.selected
            .lock()
            .unwrap_or_else(std::sync::PoisonError::into_inner)
            .clone()
    }

    pub fn recenter(&self, center: GeoPoint, radius_miles: f64) {
        self.broadcast(&MapCommand::Recenter {
            center,
            radius_miles,
        });
    }

    pub fn refresh_markers(&self) {
        self.broadcast(&MapCommand::RefreshMarkers);
    }

    fn lock_surfaces(&self) -> std::sync::MutexGuard<'_, HashMap<SurfaceId, Arc<dyn MapSurface>>> {
        self.surfaces
            .lock()
            .unwrap_or_else(std::sync::PoisonError::into_inner)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Default)]
    struct RecordingSurface {
        commands: Mutex<Vec<MapCommand>>,
    }

    impl RecordingSurface {
        fn commands(&self) -> Vec<MapCommand> {
            self.commands.lock().unwrap().clone()
        }
    }

    impl MapSurface for RecordingSurface {
        fn apply(&self, command: &MapCommand) {
            self.commands.lock().unwrap().push(command.clone());
        }
    }

    #[test]
    fn highlight_reaches_every_registered_surface() {
        let bridge = MapSyncBridge::new();
        let desktop = Arc::new(RecordingSurface::default());
        let mobile = Arc::new(RecordingSurface::default());
        bridge.register(Arc::clone(&desktop) as Arc<dyn MapSurface>);
        bridge.register(Arc::clone(&mobile) as Arc<dyn MapSurface>);

        bridge.set_highlight("12", true);

        let expected = MapCommand::SetHighlight {
            vendor_key: "12".to_string(),
            active: true,
        };
        assert_eq!(desktop.commands(), vec![expected.clone()]);
        assert_eq!(mobile.commands(), vec![expected]);
    }

    #[test]
    fn unregistered_surface_stops_receiving() {
        let bridge = MapSyncBridge::new();
        let surface = Arc::new(RecordingSurface::default());
        let id = bridge.register(Arc::clone(&surface) as Arc<dyn MapSurface>);

        assert!(bridge.unregister(id));
        assert!(!bridge.unregister(id), "second unregister is a no-op");
        bridge.set_highlight("12", true);

        assert!(surface.commands().is_empty());
        assert_eq!(bridge.surface_count(), 0);
    }

    #[test]
    fn selection_is_tracked_and_broadcast() {
        let bridge = MapSyncBridge::new();
        let surface = Arc::new(RecordingSurface::default());
        bridge.register(Arc::clone(&surface) as Arc<dyn MapSurface>);

        bridge.select_vendor("golden-id");

        assert_eq!(bridge.selected_vendor().as_deref(), Some("golden-id"));
        assert_eq!(
            surface.commands(),
            vec![MapCommand::SelectVendor {
                vendor_key: "golden-id".to_string()
            }]
        );
    }

    #[test]
    fn late_surface_receives_current_selection_on_register() {
        let bridge = MapSyncBridge::new();
        bridge.select_vendor("12");

        let late = Arc::new(RecordingSurface::default());
        bridge.register(Arc::clone(&late) as Arc<dyn MapSurface>);

        assert_eq!(
            late.commands(),
            vec![MapCommand::SelectVendor {
                vendor_key: "12".to_string()
            }]
        );
    }

    #[test]
    fn recenter_carries_center_and_radius() {
        let bridge = MapSyncBridge::new();
        let surface = Arc::new(RecordingSurface::default());
        bridge.register(Arc::clone(&surface) as Arc<dyn MapSurface>);

        bridge.recenter(GeoPoint::new(43.65, -79.38), 100.0);

        match &surface.commands()[0] {
            MapCommand::Recenter {
                center,
                radius_miles,
            } => {
                assert!((center.lat - 43.65).abs() < f64::EPSILON);
                assert!((radius_miles - 100.0).abs() < f64::EPSILON);
            }
            other => panic!("unexpected command {other:?}"),
        }
    }
}
