//! Demo provider implementation for development and testing.

use async_trait::async_trait;
use serde_json::Map;

use super::{
    ListQuery, ProviderItems, SearchQuery, TorrentProvider, category_matches, min_seeds_filter,
    title_matches,
};
use crate::errors::ProviderError;
use crate::types::{TorrentDetails, TorrentResult, format_size};

/// Name the demo provider registers under.
pub const DEMO_PROVIDER_NAME: &str = "Demo";

struct DemoEntry {
    title: &'static str,
    category: &'static str,
    info_hash: &'static str,
    size: u64,
    seeds: u64,
    peers: u64,
    time: &'static str,
    files: &'static [&'static str],
}

// Newest first, which is the order `last` reports.
const DEMO_CATALOG: &[DemoEntry] = &[
    DemoEntry {
        title: "Ubuntu 24.04 LTS Desktop amd64",
        category: "Applications",
        info_hash: "1234567890abcdef1234567890abcdef12345678",
        size: 6_114_656_256,
        seeds: 1520,
        peers: 84,
        time: "2024-04-25",
        files: &["ubuntu-24.04-desktop-amd64.iso"],
    },
    DemoEntry {
        title: "Fedora Workstation 40 x86_64",
        category: "Applications",
        info_hash: "abcdef1234567890abcdef1234567890abcdef12",
        size: 2_295_853_056,
        seeds: 410,
        peers: 22,
        time: "2024-04-23",
        files: &["Fedora-Workstation-Live-x86_64-40-1.14.iso"],
    },
    DemoEntry {
        title: "Debian 12.5.0 amd64 DVD",
        category: "Applications",
        info_hash: "fedcba0987654321fedcba0987654321fedcba09",
        size: 3_994_091_520,
        seeds: 640,
        peers: 31,
        time: "2024-02-10",
        files: &["debian-12.5.0-amd64-DVD-1.iso"],
    },
    DemoEntry {
        title: "Cosmos Laundromat 1080p",
        category: "Movies",
        info_hash: "0fedcba9876543210fedcba9876543210fedcba9",
        size: 1_210_056_704,
        seeds: 88,
        peers: 9,
        time: "2015-08-10",
        files: &["cosmos_laundromat_1080p.mp4"],
    },
    DemoEntry {
        title: "Tears of Steel 1080p",
        category: "Movies",
        info_hash: "13579bdf02468ace13579bdf02468ace13579bdf",
        size: 584_056_832,
        seeds: 212,
        peers: 17,
        time: "2012-09-26",
        files: &["tears_of_steel_1080p.mov", "tears_of_steel_subtitles.srt"],
    },
    DemoEntry {
        title: "Sintel 4K",
        category: "Movies",
        info_hash: "2468ace013579bdf2468ace013579bdf2468ace0",
        size: 4_428_120_064,
        seeds: 305,
        peers: 26,
        time: "2010-09-27",
        files: &["sintel-4k.mkv"],
    },
    DemoEntry {
        title: "Big Buck Bunny 1080p",
        category: "Movies",
        info_hash: "dd8255ecdc7ca55fb0bbf81323d87062db1f6d1c",
        size: 276_134_947,
        seeds: 980,
        peers: 45,
        time: "2008-05-20",
        files: &["big_buck_bunny_1080p.mp4", "poster.jpg"],
    },
];

/// Demo provider backed by a built-in catalog of freely distributable torrents.
///
/// Lets the full search workflow run offline. Public and always activatable.
#[derive(Debug, Default)]
pub struct DemoProvider;

impl DemoProvider {
    /// Creates the demo provider.
    pub fn new() -> Self {
        Self
    }

    fn find(&self, title: &str) -> Option<&'static DemoEntry> {
        DEMO_CATALOG
            .iter()
            .find(|entry| entry.title.eq_ignore_ascii_case(title))
    }

    fn to_result(entry: &DemoEntry) -> TorrentResult {
        TorrentResult {
            provider: DEMO_PROVIDER_NAME.to_string(),
            title: entry.title.to_string(),
            seeds: Some(entry.seeds),
            peers: Some(entry.peers),
            size: Some(format_size(entry.size)),
            time: Some(entry.time.to_string()),
            magnet: Some(format!(
                "magnet:?xt=urn:btih:{}&dn={}",
                entry.info_hash,
                urlencoding::encode(entry.title)
            )),
            desc: Some(format!("/demo/{}", entry.info_hash)),
            extra: Map::new(),
        }
    }

    fn select(
        &self,
        query: Option<&str>,
        category: Option<&str>,
        limit: Option<usize>,
        min_seeds: u64,
    ) -> ProviderItems {
        DEMO_CATALOG
            .iter()
            .filter(|entry| title_matches(entry.title, query))
            .filter(|entry| category_matches(entry.category, category))
            .filter(|entry| entry.seeds >= min_seeds)
            .take(limit.unwrap_or(usize::MAX))
            .map(|entry| Ok(Self::to_result(entry)))
            .collect()
    }
}

#[async_trait]
impl TorrentProvider for DemoProvider {
    fn name(&self) -> &str {
        DEMO_PROVIDER_NAME
    }

    fn is_public(&self) -> bool {
        true
    }

    fn categories(&self) -> Vec<String> {
        vec![
            "All".to_string(),
            "Applications".to_string(),
            "Movies".to_string(),
        ]
    }

    async fn search(&self, query: SearchQuery<'_>) -> Result<ProviderItems, ProviderError> {
        Ok(self.select(
            query.query,
            query.category,
            query.limit,
            min_seeds_filter(query.filter),
        ))
    }

    async fn last(&self, query: ListQuery<'_>) -> Result<ProviderItems, ProviderError> {
        Ok(self.select(
            None,
            query.category,
            query.limit,
            min_seeds_filter(query.filter),
        ))
    }

    async fn torrent_details(
        &self,
        torrent: &TorrentResult,
    ) -> Result<TorrentDetails, ProviderError> {
        let entry = self.find(&torrent.title).ok_or_else(|| ProviderError::Parse {
            reason: format!("no demo torrent titled '{}'", torrent.title),
        })?;

        Ok(TorrentDetails {
            provider: DEMO_PROVIDER_NAME.to_string(),
            title: entry.title.to_string(),
            description: Some(format!(
                "{} ({}), {} seeders, published {}",
                entry.title,
                format_size(entry.size),
                entry.seeds,
                entry.time
            )),
            files: entry.files.iter().map(|file| file.to_string()).collect(),
            extra: Map::new(),
        })
    }

    async fn magnet(&self, torrent: &TorrentResult) -> Result<String, ProviderError> {
        if let Some(magnet) = &torrent.magnet {
            return Ok(magnet.clone());
        }
        self.find(&torrent.title)
            .and_then(|entry| Self::to_result(entry).magnet)
            .ok_or(ProviderError::Unsupported { operation: "magnet" })
    }
}
