//! Location resolution for the discovery engine.
//!
//! Tries, in priority order: a persisted, unexpired user-selected location;
//! then a chain of IP-geolocation providers (each with its own response
//! shape); device coordinates arrive separately as a passive refinement.
//! Total failure is non-fatal; callers fall back to a default region.

pub mod error;
pub mod providers;
pub mod resolver;
pub mod store;

pub use error::LocateError;
pub use providers::{LocationFix, Provider};
pub use resolver::LocationResolver;
pub use store::{FileLocationStore, LocationStore, MemoryLocationStore};
