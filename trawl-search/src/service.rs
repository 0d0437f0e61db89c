//! Caller-facing search facade.

use std::path::Path;

use trawl_core::config::SearchConfig;

use crate::aggregator::{AggregateReport, Aggregator};
use crate::errors::SearchError;
use crate::registry::{ProviderHandle, ProviderRegistry};
use crate::request::{LastRequest, SearchRequest};
use crate::types::{ProviderInfo, TorrentDetails, TorrentResult};

/// Torrent search across every registered provider.
///
/// Owns the provider registry and routes fan-out requests through the
/// aggregator and single-torrent requests to the provider that produced
/// the torrent.
#[derive(Debug)]
pub struct TorrentSearch {
    registry: ProviderRegistry,
    aggregator: Aggregator,
}

impl TorrentSearch {
    /// Creates a facade over `registry`.
    ///
    /// Public providers are enabled right away when the config asks for it.
    pub fn new(registry: ProviderRegistry, config: &SearchConfig) -> Self {
        let search = Self {
            registry,
            aggregator: Aggregator::new(config),
        };
        if config.enable_public_on_start {
            search.enable_public_providers();
        }
        search
    }

    /// Creates a facade over the providers bundled with this crate.
    ///
    /// # Errors
    /// - `SearchError::DuplicateProvider` - Bundled providers share a name
    pub fn with_builtin_providers(config: &SearchConfig) -> Result<Self, SearchError> {
        Ok(Self::new(ProviderRegistry::with_builtin_providers()?, config))
    }

    pub fn registry(&self) -> &ProviderRegistry {
        &self.registry
    }

    /// Activates `name` with provider-specific arguments.
    ///
    /// # Errors
    /// - `SearchError::UnknownProvider` - No provider with that name
    /// - `SearchError::ProviderNotActivatable` - Provider refuses activation
    /// - `SearchError::Provider` - The provider's activation hook failed
    pub fn enable_provider(&self, name: &str, args: &[String]) -> Result<(), SearchError> {
        self.registry.enable_provider(name, args)
    }

    /// Activates every public provider and returns the ones that failed.
    pub fn enable_public_providers(&self) -> Vec<SearchError> {
        self.registry.enable_public_providers()
    }

    /// Deactivates `name`.
    ///
    /// # Errors
    /// - `SearchError::UnknownProvider` - No provider with that name
    pub fn disable_provider(&self, name: &str) -> Result<(), SearchError> {
        self.registry.disable_provider(name)
    }

    pub fn list_providers(&self) -> Vec<ProviderInfo> {
        self.registry.list_providers()
    }

    pub fn list_active_providers(&self) -> Vec<ProviderInfo> {
        self.registry.list_active_providers()
    }

    pub fn is_provider_active(&self, name: &str) -> bool {
        self.registry.is_provider_active(name)
    }

    /// Searches the selected providers and returns the merged, ranked results.
    ///
    /// Providers that fail are skipped; see [`Self::search_with_report`].
    pub async fn search(&self, request: SearchRequest) -> Vec<TorrentResult> {
        self.search_with_report(request).await.results
    }

    /// Like [`Self::search`], also reporting which providers failed.
    pub async fn search_with_report(&self, request: SearchRequest) -> AggregateReport {
        let params = request.normalize(&self.registry);
        self.aggregator.search(&params).await
    }

    /// Lists the latest torrents of the selected providers, unranked.
    pub async fn last(&self, request: LastRequest) -> Vec<TorrentResult> {
        self.last_with_report(request).await.results
    }

    /// Like [`Self::last`], also reporting which providers failed.
    pub async fn last_with_report(&self, request: LastRequest) -> AggregateReport {
        let params = request.normalize(&self.registry);
        self.aggregator.last(&params).await
    }

    /// Fetches the detail record of `torrent` from the provider that returned it.
    ///
    /// # Errors
    /// - `SearchError::UnknownProvider` - `torrent.provider` is not registered
    /// - `SearchError::Provider` - The provider failed or timed out
    pub async fn torrent_details(
        &self,
        torrent: &TorrentResult,
    ) -> Result<TorrentDetails, SearchError> {
        let provider = self.owner_of(torrent)?;
        self.aggregator
            .bounded(provider.torrent_details(torrent))
            .await
            .map_err(|source| SearchError::provider(provider.name(), source))
    }

    /// Writes the `.torrent` file of `torrent` to `destination`.
    ///
    /// # Errors
    /// - `SearchError::UnknownProvider` - `torrent.provider` is not registered
    /// - `SearchError::Provider` - The provider failed or timed out
    pub async fn download_torrent(
        &self,
        torrent: &TorrentResult,
        destination: &Path,
    ) -> Result<(), SearchError> {
        let provider = self.owner_of(torrent)?;
        self.aggregator
            .bounded(provider.download_torrent(torrent, destination))
            .await
            .map_err(|source| SearchError::provider(provider.name(), source))?;
        tracing::info!(
            "Downloaded {} from {} to {}",
            torrent.title,
            provider.name(),
            destination.display()
        );
        Ok(())
    }

    /// Resolves the magnet link of `torrent`.
    ///
    /// # Errors
    /// - `SearchError::UnknownProvider` - `torrent.provider` is not registered
    /// - `SearchError::Provider` - The provider failed or timed out
    pub async fn magnet(&self, torrent: &TorrentResult) -> Result<String, SearchError> {
        let provider = self.owner_of(torrent)?;
        self.aggregator
            .bounded(provider.magnet(torrent))
            .await
            .map_err(|source| SearchError::provider(provider.name(), source))
    }

    // Active or not; a torrent can outlive its provider's activation.
    fn owner_of(&self, torrent: &TorrentResult) -> Result<ProviderHandle, SearchError> {
        self.registry
            .resolve(&torrent.provider, true)?
            .ok_or_else(|| SearchError::UnknownProvider {
                name: torrent.provider.clone(),
            })
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;
    use std::time::Duration;

    use tokio_test::{assert_err, assert_ok};

    use super::*;
    use crate::errors::ProviderError;
    use crate::providers::mock::MockItem;
    use crate::providers::{DemoProvider, MockProvider};

    fn config() -> SearchConfig {
        SearchConfig {
            provider_timeout: Some(Duration::from_secs(5)),
            enable_public_on_start: true,
        }
    }

    fn facade(providers: Vec<ProviderHandle>) -> TorrentSearch {
        TorrentSearch::new(ProviderRegistry::new(providers).unwrap(), &config())
    }

    #[test]
    fn test_public_providers_enabled_on_start() {
        let search = facade(vec![
            Arc::new(MockProvider::new("Open")),
            Arc::new(MockProvider::new("Locked").private()),
        ]);

        assert!(search.is_provider_active("open"));
        assert!(!search.is_provider_active("Locked"));
        assert_eq!(search.list_active_providers().len(), 1);
    }

    #[test]
    fn test_nothing_enabled_without_start_flag() {
        let registry = ProviderRegistry::new(vec![Arc::new(MockProvider::new("Open"))]).unwrap();
        let search = TorrentSearch::new(registry, &SearchConfig::default());

        assert!(search.list_active_providers().is_empty());
    }

    #[tokio::test]
    async fn test_search_respects_provider_filter() {
        let alpha = Arc::new(MockProvider::new("Alpha").with_items(vec![MockItem::Seeds(1)]));
        let beta = Arc::new(MockProvider::new("Beta").with_items(vec![MockItem::Seeds(2)]));
        let search = facade(vec![alpha.clone(), beta.clone()]);

        let results = search
            .search(SearchRequest::new("x").with_providers(["beta"]))
            .await;

        assert_eq!(results.len(), 1);
        assert_eq!(results[0].provider, "Beta");
        assert!(alpha.calls().is_empty());
        assert_eq!(beta.calls().len(), 1);
    }

    #[tokio::test]
    async fn test_disabled_provider_is_not_searched() {
        let alpha = Arc::new(MockProvider::new("Alpha").with_items(vec![MockItem::Seeds(1)]));
        let search = facade(vec![alpha.clone()]);

        assert_ok!(search.disable_provider("Alpha"));
        let results = search.search(SearchRequest::new("x")).await;

        assert!(results.is_empty());
        assert!(alpha.calls().is_empty());
    }

    #[tokio::test]
    async fn test_report_lists_failed_providers() {
        let search = facade(vec![
            Arc::new(MockProvider::new("Up").with_items(vec![MockItem::Seeds(4)])),
            Arc::new(MockProvider::new("Down").failing()),
        ]);

        let report = search.last_with_report(LastRequest::new()).await;

        assert_eq!(report.results.len(), 1);
        assert_eq!(report.failures.len(), 1);
        assert_eq!(report.failures[0].provider, "Down");
    }

    #[tokio::test]
    async fn test_details_route_to_owning_provider() {
        let search = facade(vec![
            Arc::new(MockProvider::new("A")),
            Arc::new(MockProvider::new("B")),
        ]);

        let details = assert_ok!(
            search
                .torrent_details(&TorrentResult::reference("b", "Anything"))
                .await
        );

        assert_eq!(details.description.as_deref(), Some("details from B"));
        assert_eq!(details.title, "Anything");
    }

    #[tokio::test]
    async fn test_details_for_unknown_provider() {
        let search = facade(vec![Arc::new(MockProvider::new("A"))]);

        let error = assert_err!(
            search
                .torrent_details(&TorrentResult::reference("Nope", "Anything"))
                .await
        );

        assert!(matches!(error, SearchError::UnknownProvider { ref name } if name == "Nope"));
        assert_eq!(error.to_string(), "Couldn't find 'Nope' provider");
    }

    #[tokio::test]
    async fn test_dispatch_does_not_require_activation() {
        let search = facade(vec![Arc::new(MockProvider::new("Locked").private())]);
        assert!(!search.is_provider_active("Locked"));

        let magnet = assert_ok!(
            search
                .magnet(&TorrentResult::reference("Locked", "Some Title"))
                .await
        );

        assert_eq!(magnet, "magnet:?dn=Some Title&tr=Locked");
    }

    #[tokio::test]
    async fn test_download_reaches_provider() {
        let mock = Arc::new(MockProvider::new("A"));
        let search = facade(vec![mock.clone()]);
        let destination = Path::new("/tmp/trawl-test.torrent");

        assert_ok!(
            search
                .download_torrent(&TorrentResult::reference("A", "Title"), destination)
                .await
        );

        assert_eq!(mock.downloads(), vec![destination.to_path_buf()]);
    }

    #[tokio::test]
    async fn test_slow_dispatch_times_out() {
        let registry = ProviderRegistry::new(vec![Arc::new(
            MockProvider::new("Sluggish").with_delay(Duration::from_secs(30)),
        )])
        .unwrap();
        let search = TorrentSearch::new(
            registry,
            &SearchConfig {
                provider_timeout: Some(Duration::from_millis(50)),
                enable_public_on_start: true,
            },
        );
        let torrent = TorrentResult::reference("Sluggish", "Title");

        let error = assert_err!(search.torrent_details(&torrent).await);
        assert!(matches!(
            error,
            SearchError::Provider {
                ref provider,
                source: ProviderError::Timeout { after },
            } if provider == "Sluggish" && after == Duration::from_millis(50)
        ));

        let error = assert_err!(search.magnet(&torrent).await);
        assert!(matches!(
            error,
            SearchError::Provider {
                source: ProviderError::Timeout { .. },
                ..
            }
        ));
    }

    #[tokio::test]
    async fn test_provider_error_is_wrapped() {
        let search = facade(vec![Arc::new(DemoProvider::new())]);
        let torrent = search
            .search(SearchRequest::new("sintel"))
            .await
            .into_iter()
            .next()
            .unwrap();

        let error = assert_err!(
            search
                .download_torrent(&torrent, Path::new("/tmp/never-written.torrent"))
                .await
        );

        assert!(matches!(
            error,
            SearchError::Provider {
                ref provider,
                source: ProviderError::Unsupported { .. },
            } if provider == "Demo"
        ));
    }
}
