//! Provider registry and activation control.
//!
//! The registry owns every provider for its whole lifetime and is the only
//! place activation flags change. Lookups are case-insensitive. Selections
//! for a fan-out are taken under one read lock, so a concurrent enable or
//! disable never changes which providers an in-flight aggregation talks to.

use std::collections::HashMap;
use std::sync::Arc;

use parking_lot::{Mutex, RwLock};

use crate::errors::SearchError;
use crate::providers::{CatalogProvider, DemoProvider, TorrentProvider};
use crate::types::ProviderInfo;

/// Shared handle to a registered provider.
pub type ProviderHandle = Arc<dyn TorrentProvider>;

/// Fixed, keyed collection of providers with their activation flags.
#[derive(Debug)]
pub struct ProviderRegistry {
    providers: Vec<ProviderHandle>,
    index: HashMap<String, usize>,
    active: RwLock<Vec<bool>>,
    /// Held across a provider hook and its flag write
    activation: Mutex<()>,
}

fn lookup_key(name: &str) -> String {
    name.to_lowercase()
}

impl ProviderRegistry {
    /// Builds a registry over `providers`, all initially inactive.
    ///
    /// # Errors
    /// - `SearchError::DuplicateProvider` - Two names are equal ignoring case
    pub fn new(providers: Vec<ProviderHandle>) -> Result<Self, SearchError> {
        let mut index = HashMap::with_capacity(providers.len());
        for (position, provider) in providers.iter().enumerate() {
            if index
                .insert(lookup_key(provider.name()), position)
                .is_some()
            {
                return Err(SearchError::DuplicateProvider {
                    name: provider.name().to_string(),
                });
            }
        }

        let active = RwLock::new(vec![false; providers.len()]);
        Ok(Self {
            providers,
            index,
            active,
            activation: Mutex::new(()),
        })
    }

    /// Builds a registry with the providers bundled in this crate.
    ///
    /// # Errors
    /// - `SearchError::DuplicateProvider` - Never for the bundled set
    pub fn with_builtin_providers() -> Result<Self, SearchError> {
        Self::new(vec![
            Arc::new(DemoProvider::new()),
            Arc::new(CatalogProvider::new()),
        ])
    }

    /// Number of registered providers.
    pub fn len(&self) -> usize {
        self.providers.len()
    }

    /// Whether no provider is registered.
    pub fn is_empty(&self) -> bool {
        self.providers.is_empty()
    }

    fn position(&self, name: &str) -> Option<usize> {
        self.index.get(&lookup_key(name)).copied()
    }

    fn required_position(&self, name: &str) -> Result<usize, SearchError> {
        self.position(name)
            .ok_or_else(|| SearchError::UnknownProvider {
                name: name.to_string(),
            })
    }

    /// Case-insensitive lookup.
    ///
    /// With `required` a miss is an error, otherwise it is `Ok(None)`.
    ///
    /// # Errors
    /// - `SearchError::UnknownProvider` - No match and `required` is set
    pub fn resolve(
        &self,
        name: &str,
        required: bool,
    ) -> Result<Option<ProviderHandle>, SearchError> {
        match self.position(name) {
            Some(position) => Ok(Some(Arc::clone(&self.providers[position]))),
            None if required => Err(SearchError::UnknownProvider {
                name: name.to_string(),
            }),
            None => Ok(None),
        }
    }

    fn info(&self, position: usize, is_active: bool) -> ProviderInfo {
        let provider = &self.providers[position];
        ProviderInfo {
            name: provider.name().to_string(),
            public: provider.is_public(),
            activatable: provider.is_activatable(),
            is_active,
            categories: provider.categories(),
        }
    }

    /// Snapshot of every provider, in registration order.
    pub fn list_providers(&self) -> Vec<ProviderInfo> {
        let flags = self.active.read().clone();
        flags
            .into_iter()
            .enumerate()
            .map(|(position, is_active)| self.info(position, is_active))
            .collect()
    }

    /// Snapshot of the active providers, in registration order.
    pub fn list_active_providers(&self) -> Vec<ProviderInfo> {
        self.list_providers()
            .into_iter()
            .filter(|info| info.is_active)
            .collect()
    }

    /// Whether `name` is registered and active. Unknown names are inactive.
    pub fn is_provider_active(&self, name: &str) -> bool {
        self.position(name)
            .is_some_and(|position| self.active.read()[position])
    }

    /// Runs the provider's activation hook with `args`, then marks it active.
    ///
    /// # Errors
    /// - `SearchError::UnknownProvider` - No provider with that name
    /// - `SearchError::ProviderNotActivatable` - Provider refuses activation
    /// - `SearchError::Provider` - The activation hook failed; state is unchanged
    pub fn enable_provider(&self, name: &str, args: &[String]) -> Result<(), SearchError> {
        let position = self.required_position(name)?;
        let provider = &self.providers[position];

        if !provider.is_activatable() {
            return Err(SearchError::ProviderNotActivatable {
                name: provider.name().to_string(),
            });
        }

        let _activation = self.activation.lock();
        provider
            .enable(args)
            .map_err(|source| SearchError::provider(provider.name(), source))?;

        self.active.write()[position] = true;
        tracing::info!("Enabled provider {}", provider.name());
        Ok(())
    }

    /// Enables every public provider, each independently of the others.
    ///
    /// Returns the failures; a failing provider never blocks the rest.
    pub fn enable_public_providers(&self) -> Vec<SearchError> {
        let public: Vec<String> = self
            .providers
            .iter()
            .filter(|provider| provider.is_public())
            .map(|provider| provider.name().to_string())
            .collect();

        let mut failures = Vec::new();
        for name in public {
            if let Err(error) = self.enable_provider(&name, &[]) {
                tracing::warn!("Could not enable public provider {}: {}", name, error);
                failures.push(error);
            }
        }
        failures
    }

    /// Runs the provider's deactivation hook and marks it inactive.
    ///
    /// Disabling an inactive provider is a no-op.
    ///
    /// # Errors
    /// - `SearchError::UnknownProvider` - No provider with that name
    pub fn disable_provider(&self, name: &str) -> Result<(), SearchError> {
        let position = self.required_position(name)?;
        let provider = &self.providers[position];

        let _activation = self.activation.lock();
        provider.disable();
        self.active.write()[position] = false;
        tracing::info!("Disabled provider {}", provider.name());
        Ok(())
    }

    /// Consistent selection of every active provider, in registration order.
    pub fn active_snapshot(&self) -> Vec<ProviderHandle> {
        let flags = self.active.read();
        self.providers
            .iter()
            .zip(flags.iter())
            .filter(|(_, is_active)| **is_active)
            .map(|(provider, _)| Arc::clone(provider))
            .collect()
    }

    /// Consistent selection of the active providers named in `names`.
    ///
    /// Unknown or inactive names are ignored. Registration order is kept,
    /// not the order of `names`.
    pub fn active_by_names<S: AsRef<str>>(&self, names: &[S]) -> Vec<ProviderHandle> {
        let wanted: Vec<String> = names.iter().map(|name| lookup_key(name.as_ref())).collect();
        let flags = self.active.read();
        self.providers
            .iter()
            .zip(flags.iter())
            .filter(|(provider, is_active)| {
                **is_active && wanted.contains(&lookup_key(provider.name()))
            })
            .map(|(provider, _)| Arc::clone(provider))
            .collect()
    }
}
