//! Provider contract and built-in provider implementations.

use std::path::Path;

use async_trait::async_trait;
use serde_json::Value;

use crate::errors::ProviderError;
use crate::types::{TorrentDetails, TorrentResult};

pub mod catalog;
pub mod demo;
#[cfg(test)]
pub mod mock;

pub use catalog::CatalogProvider;
pub use demo::DemoProvider;
#[cfg(test)]
pub use mock::MockProvider;

/// What a provider hands back from `search`/`last`.
///
/// A provider that fails on one item reports it as `Err` in place and keeps
/// going; the aggregator drops those entries and keeps the rest.
pub type ProviderItems = Vec<Result<TorrentResult, ProviderError>>;

/// Normalized search options as seen by one provider.
///
/// Empty strings never reach a provider; they arrive as `None`.
#[derive(Debug, Clone, Copy, Default)]
pub struct SearchQuery<'a> {
    pub query: Option<&'a str>,
    pub category: Option<&'a str>,
    pub limit: Option<usize>,
    /// Opaque, provider-defined filter
    pub filter: Option<&'a Value>,
}

/// Normalized "latest torrents" options as seen by one provider.
#[derive(Debug, Clone, Copy, Default)]
pub struct ListQuery<'a> {
    pub category: Option<&'a str>,
    pub limit: Option<usize>,
    pub filter: Option<&'a Value>,
}

/// Trait for torrent metadata providers.
///
/// Implementations talk to one origin. Activation state is owned by the
/// registry; `enable`/`disable` are hooks for provider-side setup such as
/// credentials and must not be called directly by users.
#[async_trait]
pub trait TorrentProvider: Send + Sync + std::fmt::Debug {
    /// Stable identifier, unique ignoring case.
    fn name(&self) -> &str;

    /// Whether the provider works without credentials.
    fn is_public(&self) -> bool;

    /// Whether the provider can be switched on at all.
    fn is_activatable(&self) -> bool {
        true
    }

    /// Categories understood by `search` and `last`.
    fn categories(&self) -> Vec<String> {
        Vec::new()
    }

    /// Provider-side activation with provider-specific arguments.
    ///
    /// # Errors
    /// - `ProviderError::Authentication` - Missing or rejected credentials
    /// - `ProviderError::Io` - Provider-specific resources could not be loaded
    fn enable(&self, _args: &[String]) -> Result<(), ProviderError> {
        Ok(())
    }

    /// Provider-side deactivation. Must tolerate repeated calls.
    fn disable(&self) {}

    /// Search the origin.
    ///
    /// # Errors
    /// - `ProviderError::Network` - Origin unreachable
    /// - `ProviderError::Parse` - Response could not be understood
    async fn search(&self, query: SearchQuery<'_>) -> Result<ProviderItems, ProviderError>;

    /// List the most recent torrents of the origin.
    ///
    /// # Errors
    /// - `ProviderError::Unsupported` - Default for providers without a listing
    async fn last(&self, _query: ListQuery<'_>) -> Result<ProviderItems, ProviderError> {
        Err(ProviderError::Unsupported { operation: "last" })
    }

    /// Fetch the detail record for a torrent this provider returned.
    ///
    /// # Errors
    /// - `ProviderError::Unsupported` - Default for providers without details
    async fn torrent_details(
        &self,
        _torrent: &TorrentResult,
    ) -> Result<TorrentDetails, ProviderError> {
        Err(ProviderError::Unsupported {
            operation: "torrent_details",
        })
    }

    /// Write the `.torrent` file for `torrent` to `destination`.
    ///
    /// # Errors
    /// - `ProviderError::Unsupported` - Default for providers without downloads
    /// - `ProviderError::Io` - Destination could not be written
    async fn download_torrent(
        &self,
        _torrent: &TorrentResult,
        _destination: &Path,
    ) -> Result<(), ProviderError> {
        Err(ProviderError::Unsupported {
            operation: "download_torrent",
        })
    }

    /// Resolve the magnet link of a torrent.
    ///
    /// The default returns the link already present on the result.
    ///
    /// # Errors
    /// - `ProviderError::Unsupported` - No magnet link is known
    async fn magnet(&self, torrent: &TorrentResult) -> Result<String, ProviderError> {
        torrent
            .magnet
            .clone()
            .ok_or(ProviderError::Unsupported { operation: "magnet" })
    }
}

/// Case-insensitive substring match used by the bundled providers.
pub(crate) fn title_matches(title: &str, query: Option<&str>) -> bool {
    match query {
        Some(query) => title.to_lowercase().contains(&query.to_lowercase()),
        None => true,
    }
}

/// Case-insensitive category match; `None` and "All" match everything.
pub(crate) fn category_matches(category: &str, wanted: Option<&str>) -> bool {
    match wanted {
        Some(wanted) if !wanted.eq_ignore_ascii_case("all") => {
            category.eq_ignore_ascii_case(wanted)
        }
        _ => true,
    }
}

/// Reads `{"min_seeds": n}` from an opaque filter, ignoring other shapes.
pub(crate) fn min_seeds_filter(filter: Option<&Value>) -> u64 {
    filter
        .and_then(|value| value.get("min_seeds"))
        .and_then(Value::as_u64)
        .unwrap_or(0)
}
