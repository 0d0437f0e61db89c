//! Data types shared between providers and the aggregator.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// One torrent contributed by a provider.
///
/// Only `provider` (routing tag) and `seeds` (ranking key) are interpreted by
/// the aggregator; everything else passes through untouched, including any
/// provider-specific fields collected in `extra`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TorrentResult {
    /// Name of the originating provider
    pub provider: String,
    pub title: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub seeds: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub peers: Option<u64>,
    /// Size as reported by the origin, e.g. "1.4 GB"
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub size: Option<String>,
    /// Upload time as reported by the origin
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub time: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub magnet: Option<String>,
    /// Provider-relative link to the detail page
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub desc: Option<String>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl TorrentResult {
    /// Creates the minimal record needed to route a call back to `provider`.
    pub fn reference(provider: impl Into<String>, title: impl Into<String>) -> Self {
        Self {
            provider: provider.into(),
            title: title.into(),
            seeds: None,
            peers: None,
            size: None,
            time: None,
            magnet: None,
            desc: None,
            extra: Map::new(),
        }
    }

    /// Sets the seed count.
    pub fn with_seeds(mut self, seeds: u64) -> Self {
        self.seeds = Some(seeds);
        self
    }

    /// Attaches an opaque provider-specific field.
    pub fn with_extra(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.extra.insert(key.into(), value.into());
        self
    }
}

/// Detail record returned for a single torrent.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TorrentDetails {
    pub provider: String,
    pub title: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// File names contained in the torrent, when the origin lists them
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub files: Vec<String>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// Read-only snapshot of a registered provider.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProviderInfo {
    pub name: String,
    /// Usable without credentials
    pub public: bool,
    /// Can be switched on at all
    pub activatable: bool,
    pub is_active: bool,
    pub categories: Vec<String>,
}

/// Format a byte count in human-readable form.
pub fn format_size(bytes: u64) -> String {
    const GB: u64 = 1024 * 1024 * 1024;
    const MB: u64 = 1024 * 1024;

    if bytes >= GB {
        format!("{:.1} GB", bytes as f64 / GB as f64)
    } else if bytes >= MB {
        format!("{:.1} MB", bytes as f64 / MB as f64)
    } else {
        format!("{:.1} KB", bytes as f64 / 1024.0)
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn test_format_size() {
        assert_eq!(format_size(1_500_000_000), "1.4 GB");
        assert_eq!(format_size(800_000_000), "762.9 MB");
        assert_eq!(format_size(2048), "2.0 KB");
    }

    #[test]
    fn test_unknown_fields_survive_deserialization() {
        let raw = json!({
            "provider": "Catalog",
            "title": "Ubuntu 24.04 Desktop",
            "seeds": 120,
            "imdb": "tt0000000",
            "verified": true
        });

        let torrent: TorrentResult = serde_json::from_value(raw.clone()).unwrap();
        assert_eq!(torrent.seeds, Some(120));
        assert_eq!(torrent.extra.get("imdb"), Some(&json!("tt0000000")));
        assert_eq!(torrent.extra.get("verified"), Some(&json!(true)));

        assert_eq!(serde_json::to_value(&torrent).unwrap(), raw);
    }

    #[test]
    fn test_reference_is_minimal() {
        let reference = TorrentResult::reference("Demo", "Big Buck Bunny");
        assert_eq!(reference.provider, "Demo");
        assert!(reference.seeds.is_none());
        assert!(reference.extra.is_empty());
    }
}
