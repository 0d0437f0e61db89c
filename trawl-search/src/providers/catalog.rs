//! Catalog provider serving torrents from a local JSON file.
//!
//! The catalog is a JSON array of entries. It is loaded when the provider is
//! enabled, with the file path as the provider-specific argument, and dropped
//! again when it is disabled.

use std::path::{Path, PathBuf};

use async_trait::async_trait;
use parking_lot::RwLock;
use serde::Deserialize;
use serde_json::{Map, Value};

use super::{
    ListQuery, ProviderItems, SearchQuery, TorrentProvider, category_matches, min_seeds_filter,
    title_matches,
};
use crate::errors::ProviderError;
use crate::types::{TorrentDetails, TorrentResult};

/// Name the catalog provider registers under.
pub const CATALOG_PROVIDER_NAME: &str = "Catalog";

/// One entry of a catalog file.
#[derive(Debug, Clone, Deserialize)]
struct CatalogEntry {
    #[serde(default)]
    title: Option<String>,
    #[serde(default)]
    category: Option<String>,
    #[serde(default)]
    seeds: Option<u64>,
    #[serde(default)]
    peers: Option<u64>,
    #[serde(default)]
    size: Option<String>,
    #[serde(default)]
    time: Option<String>,
    #[serde(default)]
    magnet: Option<String>,
    #[serde(default)]
    description: Option<String>,
    #[serde(default)]
    files: Vec<String>,
    /// Path of the `.torrent` file, relative to the catalog file
    #[serde(default)]
    torrent_file: Option<PathBuf>,
    #[serde(flatten)]
    extra: Map<String, Value>,
}

#[derive(Debug, Default)]
struct LoadedCatalog {
    root: PathBuf,
    entries: Vec<CatalogEntry>,
}

/// Private provider backed by a JSON catalog on disk.
#[derive(Debug, Default)]
pub struct CatalogProvider {
    catalog: RwLock<Option<LoadedCatalog>>,
}

impl CatalogProvider {
    /// Creates an empty catalog provider; it loads its data on `enable`.
    pub fn new() -> Self {
        Self::default()
    }

    fn load(path: &Path) -> Result<LoadedCatalog, ProviderError> {
        let raw = std::fs::read_to_string(path)?;
        let entries: Vec<CatalogEntry> =
            serde_json::from_str(&raw).map_err(|e| ProviderError::Parse {
                reason: format!("catalog {}: {e}", path.display()),
            })?;
        let root = path
            .parent()
            .map(Path::to_path_buf)
            .unwrap_or_default();

        Ok(LoadedCatalog { root, entries })
    }

    fn to_result(index: usize, entry: &CatalogEntry) -> Result<TorrentResult, ProviderError> {
        let title = entry.title.clone().ok_or_else(|| ProviderError::Parse {
            reason: format!("catalog entry #{index} has no title"),
        })?;

        Ok(TorrentResult {
            provider: CATALOG_PROVIDER_NAME.to_string(),
            title,
            seeds: entry.seeds,
            peers: entry.peers,
            size: entry.size.clone(),
            time: entry.time.clone(),
            magnet: entry.magnet.clone(),
            desc: None,
            extra: entry.extra.clone(),
        })
    }

    fn select(
        &self,
        query: Option<&str>,
        category: Option<&str>,
        limit: Option<usize>,
        min_seeds: u64,
    ) -> Result<ProviderItems, ProviderError> {
        let guard = self.catalog.read();
        let catalog = guard.as_ref().ok_or_else(Self::not_loaded)?;

        Ok(catalog
            .entries
            .iter()
            .enumerate()
            .filter(|(_, entry)| match &entry.title {
                Some(title) => title_matches(title, query),
                // Untitled entries are reported so the caller sees the bad record
                None => true,
            })
            .filter(|(_, entry)| {
                category_matches(entry.category.as_deref().unwrap_or_default(), category)
            })
            .filter(|(_, entry)| entry.seeds.unwrap_or(0) >= min_seeds)
            .take(limit.unwrap_or(usize::MAX))
            .map(|(index, entry)| Self::to_result(index, entry))
            .collect())
    }

    fn find_entry(&self, title: &str) -> Result<(PathBuf, CatalogEntry), ProviderError> {
        let guard = self.catalog.read();
        let catalog = guard.as_ref().ok_or_else(Self::not_loaded)?;

        catalog
            .entries
            .iter()
            .find(|entry| {
                entry
                    .title
                    .as_deref()
                    .is_some_and(|candidate| candidate.eq_ignore_ascii_case(title))
            })
            .map(|entry| (catalog.root.clone(), entry.clone()))
            .ok_or_else(|| ProviderError::Parse {
                reason: format!("no catalog torrent titled '{title}'"),
            })
    }

    fn not_loaded() -> ProviderError {
        ProviderError::Authentication {
            reason: "catalog is not loaded; enable the provider with a catalog path".to_string(),
        }
    }
}

#[async_trait]
impl TorrentProvider for CatalogProvider {
    fn name(&self) -> &str {
        CATALOG_PROVIDER_NAME
    }

    fn is_public(&self) -> bool {
        false
    }

    fn categories(&self) -> Vec<String> {
        let guard = self.catalog.read();
        let mut categories: Vec<String> = Vec::new();
        for category in guard
            .iter()
            .flat_map(|catalog| catalog.entries.iter())
            .filter_map(|entry| entry.category.as_ref())
        {
            if !categories.contains(category) {
                categories.push(category.clone());
            }
        }
        categories
    }

    fn enable(&self, args: &[String]) -> Result<(), ProviderError> {
        let path = args.first().ok_or_else(|| ProviderError::Authentication {
            reason: "catalog provider needs the path of a catalog file".to_string(),
        })?;

        let loaded = Self::load(Path::new(path))?;
        tracing::debug!(
            "Loaded {} catalog entries from {}",
            loaded.entries.len(),
            path
        );
        *self.catalog.write() = Some(loaded);
        Ok(())
    }

    fn disable(&self) {
        *self.catalog.write() = None;
    }

    async fn search(&self, query: SearchQuery<'_>) -> Result<ProviderItems, ProviderError> {
        self.select(
            query.query,
            query.category,
            query.limit,
            min_seeds_filter(query.filter),
        )
    }

    async fn last(&self, query: ListQuery<'_>) -> Result<ProviderItems, ProviderError> {
        self.select(
            None,
            query.category,
            query.limit,
            min_seeds_filter(query.filter),
        )
    }

    async fn torrent_details(
        &self,
        torrent: &TorrentResult,
    ) -> Result<TorrentDetails, ProviderError> {
        let (_, entry) = self.find_entry(&torrent.title)?;

        Ok(TorrentDetails {
            provider: CATALOG_PROVIDER_NAME.to_string(),
            title: torrent.title.clone(),
            description: entry.description,
            files: entry.files,
            extra: entry.extra,
        })
    }

    async fn download_torrent(
        &self,
        torrent: &TorrentResult,
        destination: &Path,
    ) -> Result<(), ProviderError> {
        let (root, entry) = self.find_entry(&torrent.title)?;
        let source = entry.torrent_file.ok_or(ProviderError::Unsupported {
            operation: "download_torrent",
        })?;

        tokio::fs::copy(root.join(source), destination).await?;
        Ok(())
    }

    async fn magnet(&self, torrent: &TorrentResult) -> Result<String, ProviderError> {
        if let Some(magnet) = &torrent.magnet {
            return Ok(magnet.clone());
        }
        self.find_entry(&torrent.title)?
            .1
            .magnet
            .ok_or(ProviderError::Unsupported { operation: "magnet" })
    }
}

#[cfg(test)]
mod tests {
    use std::io::Write;

    use serde_json::json;

    use super::*;

    fn write_catalog(dir: &Path) -> PathBuf {
        std::fs::write(dir.join("bunny.torrent"), b"d4:infod4:name5:bunnyee").unwrap();

        let catalog = json!([
            {
                "title": "Big Buck Bunny",
                "category": "Movies",
                "seeds": 40,
                "magnet": "magnet:?xt=urn:btih:bunny",
                "torrent_file": "bunny.torrent",
                "files": ["bunny.mp4"],
                "uploader": "blender"
            },
            { "category": "Movies", "seeds": 7 },
            { "title": "Arch Linux 2024.05.01", "category": "Applications", "seeds": 90 }
        ]);
        let path = dir.join("catalog.json");
        let mut file = std::fs::File::create(&path).unwrap();
        file.write_all(catalog.to_string().as_bytes()).unwrap();
        path
    }

    #[test]
    fn test_enable_requires_path() {
        let provider = CatalogProvider::new();
        assert!(matches!(
            provider.enable(&[]),
            Err(ProviderError::Authentication { .. })
        ));
        assert!(matches!(
            provider.enable(&["/definitely/missing/catalog.json".to_string()]),
            Err(ProviderError::Io(_))
        ));
    }

    #[tokio::test]
    async fn test_search_reports_untitled_entry_in_place() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_catalog(dir.path());
        let provider = CatalogProvider::new();
        provider
            .enable(&[path.to_string_lossy().into_owned()])
            .unwrap();

        let items = provider
            .search(SearchQuery {
                category: Some("Movies"),
                ..Default::default()
            })
            .await
            .unwrap();

        assert_eq!(items.len(), 2);
        let first = items[0].as_ref().unwrap();
        assert_eq!(first.title, "Big Buck Bunny");
        assert_eq!(first.extra.get("uploader"), Some(&json!("blender")));
        assert!(matches!(items[1], Err(ProviderError::Parse { .. })));
        assert_eq!(provider.categories(), vec!["Movies", "Applications"]);
    }

    #[tokio::test]
    async fn test_download_copies_torrent_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_catalog(dir.path());
        let provider = CatalogProvider::new();
        provider
            .enable(&[path.to_string_lossy().into_owned()])
            .unwrap();

        let destination = dir.path().join("out.torrent");
        let reference = TorrentResult::reference(CATALOG_PROVIDER_NAME, "big buck bunny");
        provider
            .download_torrent(&reference, &destination)
            .await
            .unwrap();

        assert_eq!(
            std::fs::read(&destination).unwrap(),
            b"d4:infod4:name5:bunnyee"
        );
    }

    #[tokio::test]
    async fn test_disable_drops_catalog() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_catalog(dir.path());
        let provider = CatalogProvider::new();
        provider
            .enable(&[path.to_string_lossy().into_owned()])
            .unwrap();
        provider.disable();
        provider.disable();

        let result = provider.last(ListQuery::default()).await;
        assert!(matches!(result, Err(ProviderError::Authentication { .. })));
        assert!(provider.categories().is_empty());
    }
}
