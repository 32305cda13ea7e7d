//! Cache-then-store secret resolution.

use tracing::{debug, warn};

use crate::core::cache::{CacheStats, Clock, SecretCache, SystemClock};
use crate::core::secret::{Lookup, SecretKey};
use crate::core::store::SecretStore;
use crate::error::StoreError;

/// Resolves keys through a [`SecretCache`] in front of a [`SecretStore`].
///
/// Fatal store errors (see [`StoreError::is_fatal`]) are returned as `Err`;
/// every other outcome becomes a [`Lookup`] and is cached. The store's
/// readiness check runs once, before the first fetch, so content without
/// tokens never touches the store.
pub struct Resolver<S: SecretStore, C: Clock = SystemClock> {
    store: S,
    cache: SecretCache<C>,
    offline: bool,
    checked: bool,
    fetches: usize,
}

impl<S: SecretStore, C: Clock> Resolver<S, C> {
    pub fn new(store: S, cache: SecretCache<C>) -> Self {
        Self {
            store,
            cache,
            offline: false,
            checked: false,
            fetches: 0,
        }
    }

    /// Stop calling the store; uncached keys resolve as not found.
    ///
    /// Used for dry runs when the store is not authenticated.
    pub fn set_offline(&mut self, offline: bool) {
        self.offline = offline;
    }

    pub fn is_offline(&self) -> bool {
        self.offline
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    /// Number of calls made to the store.
    pub fn fetches(&self) -> usize {
        self.fetches
    }

    pub fn cache_stats(&self) -> CacheStats {
        self.cache.stats()
    }

    /// Resolve one key.
    ///
    /// # Errors
    ///
    /// Returns a fatal `StoreError` when the store cannot be used at all.
    pub fn resolve(&mut self, key: &SecretKey) -> Result<Lookup, StoreError> {
        if let Some(hit) = self.cache.get(key) {
            return Ok(hit.clone());
        }

        if self.offline {
            return Ok(Lookup::NotFound);
        }

        if !self.checked {
            self.checked = true;
            match self.store.ensure_ready() {
                Ok(()) => {}
                Err(e) if e.is_fatal() => return Err(e),
                Err(e) => warn!(store = self.store.name(), error = %e, "readiness check failed"),
            }
        }

        self.fetches += 1;
        let lookup = match self.store.fetch(key) {
            Ok(Some(value)) => Lookup::Found(value),
            Ok(None) => Lookup::NotFound,
            Err(e) if e.is_fatal() => return Err(e),
            Err(e) => {
                warn!(key = %key, error = %e, "secret lookup failed");
                Lookup::Failed(e.to_string())
            }
        };

        debug!(key = %key, found = !lookup.is_negative(), "resolved secret");
        self.cache.put(key.clone(), lookup.clone());
        Ok(lookup)
    }
}
