//! Concurrent fan-out across the selected providers.
//!
//! Every selected provider is called at once and the aggregator waits for
//! all of them before producing anything. A provider that fails (or exceeds
//! the configured timeout) contributes nothing and is reported as a
//! [`ProviderFailure`]; per-item failures are dropped. Search results are
//! then ranked by seed count, listings keep their flatten order.

use std::cmp::Ordering;
use std::future::Future;
use std::time::Duration;

use futures::future::join_all;
use trawl_core::config::SearchConfig;

use crate::errors::ProviderError;
use crate::providers::{ProviderItems, TorrentProvider};
use crate::registry::ProviderHandle;
use crate::request::{ListParams, SearchParams};
use crate::types::TorrentResult;

/// A provider whose whole contribution was dropped.
#[derive(Debug)]
pub struct ProviderFailure {
    pub provider: String,
    pub error: ProviderError,
}

/// Merged results of one fan-out plus the providers that failed.
#[derive(Debug, Default)]
pub struct AggregateReport {
    pub results: Vec<TorrentResult>,
    pub failures: Vec<ProviderFailure>,
}

/// Runs requests against a provider selection.
#[derive(Debug, Clone, Default)]
pub struct Aggregator {
    provider_timeout: Option<Duration>,
}

impl Aggregator {
    /// Creates an aggregator using the configured per-provider timeout.
    pub fn new(config: &SearchConfig) -> Self {
        Self::with_timeout(config.provider_timeout)
    }

    /// Creates an aggregator with an explicit per-provider timeout.
    pub fn with_timeout(provider_timeout: Option<Duration>) -> Self {
        Self { provider_timeout }
    }

    /// Per-provider timeout, if any.
    pub fn provider_timeout(&self) -> Option<Duration> {
        self.provider_timeout
    }

    /// Searches every provider in `params`, then ranks by seeds descending.
    pub async fn search(&self, params: &SearchParams) -> AggregateReport {
        let query = params.as_query();
        let mut report = self
            .fan_out("search", &params.providers, |provider| provider.search(query))
            .await;
        rank_by_seeds(&mut report.results);
        report
    }

    /// Lists the latest torrents of every provider in `params`, unsorted.
    pub async fn last(&self, params: &ListParams) -> AggregateReport {
        let query = params.as_query();
        self.fan_out("last", &params.providers, |provider| provider.last(query))
            .await
    }

    /// Awaits `call`, bounded by the per-provider timeout when one is set.
    ///
    /// # Errors
    /// - `ProviderError::Timeout` - The timeout elapsed first
    /// - Any error returned by `call`
    pub async fn bounded<T, Fut>(&self, call: Fut) -> Result<T, ProviderError>
    where
        Fut: Future<Output = Result<T, ProviderError>>,
    {
        match self.provider_timeout {
            Some(after) => tokio::time::timeout(after, call)
                .await
                .unwrap_or_else(|_| Err(ProviderError::Timeout { after })),
            None => call.await,
        }
    }

    async fn fan_out<'a, F, Fut>(
        &self,
        operation: &'static str,
        providers: &'a [ProviderHandle],
        call: F,
    ) -> AggregateReport
    where
        F: Fn(&'a dyn TorrentProvider) -> Fut,
        Fut: Future<Output = Result<ProviderItems, ProviderError>>,
    {
        if providers.is_empty() {
            tracing::debug!("No providers selected for {}", operation);
            return AggregateReport::default();
        }

        let calls = providers.iter().map(|provider| {
            let name = provider.name().to_string();
            let pending = call(&**provider);
            async move {
                tracing::debug!("Dispatching {} to {}", operation, name);
                (name, self.bounded(pending).await)
            }
        });
        let outcomes = join_all(calls).await;

        let mut report = AggregateReport::default();
        for (provider, outcome) in outcomes {
            match outcome {
                Ok(items) => collect_items(operation, &provider, items, &mut report.results),
                Err(error) => {
                    tracing::warn!("{} on provider {} failed: {}", operation, provider, error);
                    report.failures.push(ProviderFailure { provider, error });
                }
            }
        }

        tracing::debug!(
            "{} merged {} results from {} providers ({} failed)",
            operation,
            report.results.len(),
            providers.len(),
            report.failures.len()
        );
        report
    }
}

fn collect_items(
    operation: &str,
    provider: &str,
    items: ProviderItems,
    results: &mut Vec<TorrentResult>,
) {
    for item in items {
        match item {
            Ok(mut torrent) => {
                if torrent.provider.is_empty() {
                    torrent.provider = provider.to_string();
                }
                results.push(torrent);
            }
            Err(error) => {
                tracing::debug!("Dropped {} item from {}: {}", operation, provider, error);
            }
        }
    }
}

/// Stable sort by seed count, descending.
///
/// Results without a count rank ahead of every counted result; ties keep
/// their flatten order.
pub fn rank_by_seeds(results: &mut [TorrentResult]) {
    results.sort_by(|a, b| compare_seeds(a.seeds, b.seeds));
}

fn compare_seeds(a: Option<u64>, b: Option<u64>) -> Ordering {
    match (a, b) {
        (None, None) => Ordering::Equal,
        (None, Some(_)) => Ordering::Less,
        (Some(_), None) => Ordering::Greater,
        (Some(a), Some(b)) => b.cmp(&a),
    }
}
