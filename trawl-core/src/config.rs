//! Centralized configuration for Trawl.
//!
//! All tunable parameters are defined here to avoid hard-coded values
//! scattered throughout the workspace.

use std::path::PathBuf;
use std::time::Duration;

/// Central configuration for all Trawl components.
///
/// Supports environment variable overrides for runtime customization.
#[derive(Debug, Clone, Default)]
pub struct TrawlConfig {
    pub search: SearchConfig,
    pub logging: LoggingConfig,
}

/// Provider fan-out configuration.
#[derive(Debug, Clone, Default)]
pub struct SearchConfig {
    /// Upper bound on a single provider call (None = wait indefinitely)
    pub provider_timeout: Option<Duration>,
    /// Enable every public provider when the registry is built
    pub enable_public_on_start: bool,
}

/// Log file placement.
#[derive(Debug, Clone)]
pub struct LoggingConfig {
    /// Directory receiving the full debug log of the last run
    pub logs_dir: PathBuf,
    /// File name inside `logs_dir`, overwritten on every run
    pub log_file_name: &'static str,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            logs_dir: PathBuf::from("logs"),
            log_file_name: "trawl-last-run.log",
        }
    }
}

impl TrawlConfig {
    /// Creates configuration with environment variable overrides.
    ///
    /// Unparsable values are ignored and the default is kept.
    pub fn from_env() -> Self {
        Self::default().with_env_overrides()
    }

    /// Applies environment variable overrides on top of `self`.
    ///
    /// Lets a binary pick its own defaults while still honouring the
    /// environment. Unparsable values leave the field unchanged.
    pub fn with_env_overrides(self) -> Self {
        let mut config = self;

        if let Ok(timeout) = std::env::var("TRAWL_PROVIDER_TIMEOUT_MS")
            && let Ok(millis) = timeout.parse::<u64>()
        {
            // Zero keeps the "no timeout" behaviour
            config.search.provider_timeout =
                (millis > 0).then(|| Duration::from_millis(millis));
        }

        if let Ok(enabled) = std::env::var("TRAWL_ENABLE_PUBLIC")
            && let Ok(enabled) = enabled.parse()
        {
            config.search.enable_public_on_start = enabled;
        }

        if let Ok(dir) = std::env::var("TRAWL_LOG_DIR")
            && !dir.is_empty()
        {
            config.logging.logs_dir = PathBuf::from(dir);
        }

        config
    }

    /// Creates a configuration optimized for testing.
    ///
    /// Short provider timeout so a stuck mock fails the test quickly.
    pub fn for_testing() -> Self {
        Self {
            search: SearchConfig {
                provider_timeout: Some(Duration::from_millis(500)),
                enable_public_on_start: true,
            },
            ..Default::default()
        }
    }
}
