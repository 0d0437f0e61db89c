//! Trawl Core - Shared configuration and logging setup
//!
//! Holds the pieces every Trawl crate needs regardless of which providers are
//! wired in: tunable settings with environment overrides and the tracing
//! subscriber used by the binaries.

pub mod config;
pub mod tracing_setup;

pub use config::{LoggingConfig, SearchConfig, TrawlConfig};
pub use tracing_setup::{CliLogLevel, init_tracing};
