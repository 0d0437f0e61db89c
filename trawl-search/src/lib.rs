//! Trawl Search - torrent search across many providers

#![deny(clippy::missing_errors_doc)]
#![deny(clippy::missing_panics_doc)]
#![warn(clippy::too_many_lines)]
//!
//! Keeps a registry of torrent providers with per-provider activation,
//! fans searches out to every active provider concurrently and merges the
//! answers into one ranked list. A provider that fails contributes nothing
//! instead of failing the whole search.

pub mod aggregator;
pub mod errors;
pub mod providers;
pub mod registry;
pub mod request;
pub mod service;
pub mod types;

// Re-export main types
pub use aggregator::{AggregateReport, Aggregator, ProviderFailure};
pub use errors::{ProviderError, SearchError};
pub use providers::{CatalogProvider, DemoProvider, ListQuery, SearchQuery, TorrentProvider};
pub use registry::{ProviderHandle, ProviderRegistry};
pub use request::{LastRequest, SearchRequest};
pub use service::TorrentSearch;
pub use types::{ProviderInfo, TorrentDetails, TorrentResult};

/// Convenience type alias for Results with SearchError.
pub type Result<T> = std::result::Result<T, SearchError>;
