//! Request normalization.
//!
//! Callers describe a fan-out with [`SearchRequest`] or [`LastRequest`]: an
//! optional provider-name filter plus named optional options. Normalizing a
//! request against the registry yields [`SearchParams`]/[`ListParams`] with a
//! concrete provider selection and with empty strings turned into "unset".
//!
//! Loosely-typed callers (JSON payloads, the CLI `call` command) can use the
//! positional call shape through `from_positional`.

use serde_json::Value;

use crate::errors::SearchError;
use crate::providers::{ListQuery, SearchQuery};
use crate::registry::{ProviderHandle, ProviderRegistry};

const FIRST_ARGUMENT_REASON: &str = "first parameter must be a query or a list of provider names";

/// A search across providers.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SearchRequest {
    /// Explicit provider names; `None` selects every active provider
    pub providers: Option<Vec<String>>,
    pub query: Option<String>,
    pub category: Option<String>,
    pub limit: Option<usize>,
    pub filter: Option<Value>,
}

/// A "latest torrents" listing across providers.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct LastRequest {
    /// Explicit provider names; `None` selects every active provider
    pub providers: Option<Vec<String>>,
    pub category: Option<String>,
    pub limit: Option<usize>,
    pub filter: Option<Value>,
}

/// Normalized search with its provider selection resolved.
#[derive(Debug, Clone)]
pub struct SearchParams {
    pub providers: Vec<ProviderHandle>,
    pub query: Option<String>,
    pub category: Option<String>,
    pub limit: Option<usize>,
    pub filter: Option<Value>,
}

/// Normalized listing with its provider selection resolved.
#[derive(Debug, Clone)]
pub struct ListParams {
    pub providers: Vec<ProviderHandle>,
    pub category: Option<String>,
    pub limit: Option<usize>,
    pub filter: Option<Value>,
}

impl SearchRequest {
    /// Searches every active provider for `query`.
    pub fn new(query: impl Into<String>) -> Self {
        Self {
            query: Some(query.into()),
            ..Default::default()
        }
    }

    /// Restricts the search to the named providers.
    pub fn with_providers<I, S>(mut self, names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.providers = Some(names.into_iter().map(Into::into).collect());
        self
    }

    pub fn with_category(mut self, category: impl Into<String>) -> Self {
        self.category = Some(category.into());
        self
    }

    pub fn with_limit(mut self, limit: usize) -> Self {
        self.limit = Some(limit);
        self
    }

    pub fn with_filter(mut self, filter: Value) -> Self {
        self.filter = Some(filter);
        self
    }

    /// Builds a request from the positional shape
    /// `[providers?], query, category, limit, filter`.
    ///
    /// The first argument is either an array of provider names or the query
    /// string. Empty strings and `null` leave an option unset.
    ///
    /// # Errors
    /// - `SearchError::InvalidArgument` - First argument is neither a query nor a name list,
    ///   or an option has the wrong type
    pub fn from_positional(args: &[Value]) -> Result<Self, SearchError> {
        let (providers, rest) = match args.first() {
            Some(Value::Array(names)) => (Some(provider_names(names)?), &args[1..]),
            Some(Value::String(_)) => (None, args),
            _ => {
                return Err(SearchError::InvalidArgument {
                    reason: FIRST_ARGUMENT_REASON.to_string(),
                });
            }
        };

        let mut slots = PositionalSlots::new(rest);
        Ok(Self {
            providers,
            query: slots.next_text("query")?,
            category: slots.next_text("category")?,
            limit: slots.next_limit()?,
            filter: slots.next_filter(),
        })
    }

    /// Resolves the provider selection and normalizes empty options.
    pub fn normalize(self, registry: &ProviderRegistry) -> SearchParams {
        SearchParams {
            providers: select_providers(registry, self.providers.as_deref()),
            query: unset_if_empty(self.query),
            category: unset_if_empty(self.category),
            limit: self.limit,
            filter: self.filter,
        }
    }
}

impl LastRequest {
    /// Lists the latest torrents of every active provider.
    pub fn new() -> Self {
        Self::default()
    }

    /// Restricts the listing to the named providers.
    pub fn with_providers<I, S>(mut self, names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.providers = Some(names.into_iter().map(Into::into).collect());
        self
    }

    pub fn with_category(mut self, category: impl Into<String>) -> Self {
        self.category = Some(category.into());
        self
    }

    pub fn with_limit(mut self, limit: usize) -> Self {
        self.limit = Some(limit);
        self
    }

    pub fn with_filter(mut self, filter: Value) -> Self {
        self.filter = Some(filter);
        self
    }

    /// Builds a request from the positional shape
    /// `[providers?], category, limit, filter`.
    ///
    /// Without a leading name array every active provider is selected and
    /// the first argument is the category, which must be a string or `null`.
    ///
    /// # Errors
    /// - `SearchError::InvalidArgument` - The name list contains non-strings or an option
    ///   has the wrong type
    pub fn from_positional(args: &[Value]) -> Result<Self, SearchError> {
        let (providers, rest) = match args.first() {
            Some(Value::Array(names)) => (Some(provider_names(names)?), &args[1..]),
            _ => (None, args),
        };

        let mut slots = PositionalSlots::new(rest);
        Ok(Self {
            providers,
            category: slots.next_text("category")?,
            limit: slots.next_limit()?,
            filter: slots.next_filter(),
        })
    }

    /// Resolves the provider selection and normalizes empty options.
    pub fn normalize(self, registry: &ProviderRegistry) -> ListParams {
        ListParams {
            providers: select_providers(registry, self.providers.as_deref()),
            category: unset_if_empty(self.category),
            limit: self.limit,
            filter: self.filter,
        }
    }
}

impl SearchParams {
    /// Per-provider view of the options.
    pub fn as_query(&self) -> SearchQuery<'_> {
        SearchQuery {
            query: self.query.as_deref(),
            category: self.category.as_deref(),
            limit: self.limit,
            filter: self.filter.as_ref(),
        }
    }
}

impl ListParams {
    /// Per-provider view of the options.
    pub fn as_query(&self) -> ListQuery<'_> {
        ListQuery {
            category: self.category.as_deref(),
            limit: self.limit,
            filter: self.filter.as_ref(),
        }
    }
}

fn select_providers(registry: &ProviderRegistry, names: Option<&[String]>) -> Vec<ProviderHandle> {
    match names {
        Some(names) => registry.active_by_names(names),
        None => registry.active_snapshot(),
    }
}

fn unset_if_empty(value: Option<String>) -> Option<String> {
    value.filter(|value| !value.is_empty())
}

fn provider_names(values: &[Value]) -> Result<Vec<String>, SearchError> {
    values
        .iter()
        .map(|value| {
            value
                .as_str()
                .map(str::to_string)
                .ok_or_else(|| SearchError::InvalidArgument {
                    reason: FIRST_ARGUMENT_REASON.to_string(),
                })
        })
        .collect()
}

/// Consumes positional options in order; missing trailing options are unset.
struct PositionalSlots<'a> {
    remaining: std::slice::Iter<'a, Value>,
}

impl<'a> PositionalSlots<'a> {
    fn new(args: &'a [Value]) -> Self {
        Self {
            remaining: args.iter(),
        }
    }

    fn next_text(&mut self, slot: &str) -> Result<Option<String>, SearchError> {
        match self.remaining.next() {
            None | Some(Value::Null) => Ok(None),
            Some(Value::String(text)) => Ok(unset_if_empty(Some(text.clone()))),
            Some(other) => Err(SearchError::InvalidArgument {
                reason: format!("{slot} must be a string, got {other}"),
            }),
        }
    }

    fn next_limit(&mut self) -> Result<Option<usize>, SearchError> {
        let invalid = |value: &Value| SearchError::InvalidArgument {
            reason: format!("limit must be a non-negative integer, got {value}"),
        };

        match self.remaining.next() {
            None | Some(Value::Null) => Ok(None),
            Some(Value::String(text)) if text.is_empty() => Ok(None),
            Some(value @ Value::String(text)) => {
                text.trim().parse().map(Some).map_err(|_| invalid(value))
            }
            Some(value @ Value::Number(number)) => number
                .as_u64()
                .and_then(|limit| usize::try_from(limit).ok())
                .map(Some)
                .ok_or_else(|| invalid(value)),
            Some(other) => Err(invalid(other)),
        }
    }

    fn next_filter(&mut self) -> Option<Value> {
        match self.remaining.next() {
            None | Some(Value::Null) => None,
            Some(Value::String(text)) if text.is_empty() => None,
            Some(value) => Some(value.clone()),
        }
    }
}
