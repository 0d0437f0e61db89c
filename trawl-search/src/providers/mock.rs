//! Mock provider implementation for testing.

use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use async_trait::async_trait;
use parking_lot::Mutex;
use serde_json::Map;

use super::{ListQuery, ProviderItems, SearchQuery, TorrentProvider};
use crate::errors::ProviderError;
use crate::types::{TorrentDetails, TorrentResult};

/// One scripted entry of a mock response.
#[derive(Debug, Clone)]
pub enum MockItem {
    /// A torrent with the given seed count, titled "<provider>-<seeds>"
    Seeds(u64),
    /// A torrent without a seed count
    Unseeded(&'static str),
    /// A per-item failure
    Broken,
}

/// Options one call was made with, recorded for assertions.
#[derive(Debug, Clone, PartialEq)]
pub struct RecordedCall {
    pub operation: &'static str,
    pub query: Option<String>,
    pub category: Option<String>,
    pub limit: Option<usize>,
}

/// Mock provider for testing.
#[derive(Debug)]
pub struct MockProvider {
    name: String,
    public: bool,
    activatable: bool,
    needs_args: bool,
    items: Vec<MockItem>,
    fail_calls: bool,
    delay: Duration,
    calls: Mutex<Vec<RecordedCall>>,
    enables: AtomicUsize,
    downloads: Mutex<Vec<PathBuf>>,
}

impl MockProvider {
    /// Creates a public mock provider returning no results.
    pub fn new(name: &str) -> Self {
        Self {
            name: name.to_string(),
            public: true,
            activatable: true,
            needs_args: false,
            items: Vec::new(),
            fail_calls: false,
            delay: Duration::ZERO,
            calls: Mutex::new(Vec::new()),
            enables: AtomicUsize::new(0),
            downloads: Mutex::new(Vec::new()),
        }
    }

    /// Marks the provider as requiring credentials.
    pub fn private(mut self) -> Self {
        self.public = false;
        self
    }

    /// Makes `enable` fail unless at least one argument is passed.
    pub fn requiring_args(mut self) -> Self {
        self.needs_args = true;
        self
    }

    /// Marks the provider as impossible to activate.
    pub fn not_activatable(mut self) -> Self {
        self.activatable = false;
        self
    }

    /// Sets the scripted items returned by `search` and `last`.
    pub fn with_items(mut self, items: Vec<MockItem>) -> Self {
        self.items = items;
        self
    }

    /// Makes every call fail as a whole.
    pub fn failing(mut self) -> Self {
        self.fail_calls = true;
        self
    }

    /// Delays searches, listings, details and magnet lookups.
    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = delay;
        self
    }

    /// Calls received so far, in order.
    pub fn calls(&self) -> Vec<RecordedCall> {
        self.calls.lock().clone()
    }

    /// Number of successful `enable` hooks.
    pub fn enable_count(&self) -> usize {
        self.enables.load(Ordering::SeqCst)
    }

    /// Destinations passed to `download_torrent`.
    pub fn downloads(&self) -> Vec<PathBuf> {
        self.downloads.lock().clone()
    }

    async fn pause(&self) {
        if !self.delay.is_zero() {
            tokio::time::sleep(self.delay).await;
        }
    }

    async fn respond(&self, call: RecordedCall) -> Result<ProviderItems, ProviderError> {
        self.calls.lock().push(call);
        self.pause().await;
        if self.fail_calls {
            return Err(ProviderError::Network {
                reason: format!("{} is down", self.name),
            });
        }

        Ok(self
            .items
            .iter()
            .map(|item| match item {
                MockItem::Seeds(seeds) => {
                    Ok(TorrentResult::reference(&self.name, format!("{}-{seeds}", self.name))
                        .with_seeds(*seeds))
                }
                MockItem::Unseeded(title) => Ok(TorrentResult::reference(&self.name, *title)),
                MockItem::Broken => Err(ProviderError::Parse {
                    reason: "malformed row".to_string(),
                }),
            })
            .collect())
    }
}

#[async_trait]
impl TorrentProvider for MockProvider {
    fn name(&self) -> &str {
        &self.name
    }

    fn is_public(&self) -> bool {
        self.public
    }

    fn is_activatable(&self) -> bool {
        self.activatable
    }

    fn categories(&self) -> Vec<String> {
        vec!["All".to_string()]
    }

    fn enable(&self, args: &[String]) -> Result<(), ProviderError> {
        if self.needs_args && args.is_empty() {
            return Err(ProviderError::Authentication {
                reason: "missing credentials".to_string(),
            });
        }
        self.enables.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }

    async fn search(&self, query: SearchQuery<'_>) -> Result<ProviderItems, ProviderError> {
        self.respond(RecordedCall {
            operation: "search",
            query: query.query.map(str::to_string),
            category: query.category.map(str::to_string),
            limit: query.limit,
        })
        .await
    }

    async fn last(&self, query: ListQuery<'_>) -> Result<ProviderItems, ProviderError> {
        self.respond(RecordedCall {
            operation: "last",
            query: None,
            category: query.category.map(str::to_string),
            limit: query.limit,
        })
        .await
    }

    async fn torrent_details(
        &self,
        torrent: &TorrentResult,
    ) -> Result<TorrentDetails, ProviderError> {
        self.pause().await;
        Ok(TorrentDetails {
            provider: self.name.clone(),
            title: torrent.title.clone(),
            description: Some(format!("details from {}", self.name)),
            files: Vec::new(),
            extra: Map::new(),
        })
    }

    async fn download_torrent(
        &self,
        _torrent: &TorrentResult,
        destination: &Path,
    ) -> Result<(), ProviderError> {
        self.downloads.lock().push(destination.to_path_buf());
        Ok(())
    }

    async fn magnet(&self, torrent: &TorrentResult) -> Result<String, ProviderError> {
        self.pause().await;
        Ok(format!("magnet:?dn={}&tr={}", torrent.title, self.name))
    }
}
