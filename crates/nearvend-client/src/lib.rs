//! Typed HTTP client for the vendor discovery backend.
//!
//! Three endpoints: the general vendor listing, the category-grouped search
//! (same filter set, different grouping), and the batched online-status
//! lookup. Transient failures are retried with exponential back-off.

pub mod client;
pub mod error;
pub(crate) mod retry;
pub mod types;

pub use client::DiscoveryClient;
pub use error::ApiError;
pub use types::{
    CategorySearchResponse, CategorySection, DiscoverySection, OnlineStatus, StatusBatchResponse,
    VendorQuery, VendorsResponse,
};
