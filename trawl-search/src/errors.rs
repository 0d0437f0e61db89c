//! Error types for provider aggregation.

use std::time::Duration;

use thiserror::Error;

/// Errors surfaced to callers of the registry and the search facade.
#[derive(Debug, Error)]
pub enum SearchError {
    /// No registered provider matches the name (case-insensitive).
    #[error("Couldn't find '{name}' provider")]
    UnknownProvider {
        /// The name that was looked up
        name: String,
    },

    /// A loosely-typed call could not be turned into a request.
    #[error("Invalid argument: {reason}")]
    InvalidArgument {
        /// What was wrong with the arguments
        reason: String,
    },

    /// The provider exists but cannot be switched on.
    #[error("Provider '{name}' cannot be activated")]
    ProviderNotActivatable {
        /// Name of the provider
        name: String,
    },

    /// Two providers were registered under names equal ignoring case.
    #[error("Provider '{name}' is registered more than once")]
    DuplicateProvider {
        /// The clashing name
        name: String,
    },

    /// A routed call to one provider failed.
    #[error("Provider '{provider}' failed: {source}")]
    Provider {
        /// Name of the provider that failed
        provider: String,
        /// The provider's own error
        #[source]
        source: ProviderError,
    },
}

impl SearchError {
    /// Wraps a provider error with the name of the provider that raised it.
    pub fn provider(provider: impl Into<String>, source: ProviderError) -> Self {
        SearchError::Provider {
            provider: provider.into(),
            source,
        }
    }

    /// Checks if this error is due to caller input rather than a provider.
    pub fn is_user_error(&self) -> bool {
        matches!(
            self,
            SearchError::UnknownProvider { .. }
                | SearchError::InvalidArgument { .. }
                | SearchError::ProviderNotActivatable { .. }
        )
    }
}

/// Errors a provider implementation reports back to the aggregator.
#[derive(Debug, Error)]
pub enum ProviderError {
    /// Network communication with the provider's origin failed.
    #[error("Network error: {reason}")]
    Network {
        /// The reason for the network error
        reason: String,
    },

    /// The origin answered with something that could not be parsed.
    #[error("Parse error: {reason}")]
    Parse {
        /// The reason for the parse error
        reason: String,
    },

    /// Credentials were missing or rejected.
    #[error("Authentication failed: {reason}")]
    Authentication {
        /// The reason for the authentication failure
        reason: String,
    },

    /// The provider does not implement this capability.
    #[error("Operation '{operation}' is not supported by this provider")]
    Unsupported {
        /// Name of the unsupported operation
        operation: &'static str,
    },

    /// The call exceeded the configured per-provider timeout.
    #[error("Provider did not answer within {after:?}")]
    Timeout {
        /// The timeout that elapsed
        after: Duration,
    },

    /// Local file system failure (catalog loading, torrent download).
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unknown_provider_message() {
        let err = SearchError::UnknownProvider {
            name: "Nowhere".to_string(),
        };
        assert_eq!(err.to_string(), "Couldn't find 'Nowhere' provider");
        assert!(err.is_user_error());
    }

    #[test]
    fn test_provider_error_keeps_source() {
        let err = SearchError::provider(
            "Demo",
            ProviderError::Network {
                reason: "connection reset".to_string(),
            },
        );
        assert!(!err.is_user_error());
        assert_eq!(
            err.to_string(),
            "Provider 'Demo' failed: Network error: connection reset"
        );
        let source = std::error::Error::source(&err).map(ToString::to_string);
        assert_eq!(source.as_deref(), Some("Network error: connection reset"));
    }
}
