use crate::catalog::{ShipTypes, TechTree};
use crate::error::CatalogResult;
use crate::source::CatalogSource;
use std::collections::HashMap;
use std::future::Future;
use std::sync::{Arc, Mutex, PoisonError};
use tokio::sync::OnceCell;
use tracing::{debug, info};

/// Keyed cache of asynchronously fetched values.
///
/// Concurrent `get_or_fetch` calls for one key share a single fetch. A failed
/// fetch leaves the slot empty so the next caller tries again.
pub struct AsyncCache<V> {
    entries: Mutex<HashMap<String, Arc<OnceCell<Arc<V>>>>>,
}

impl<V> Default for AsyncCache<V> {
    fn default() -> Self {
        Self {
            entries: Mutex::new(HashMap::new()),
        }
    }
}

impl<V> AsyncCache<V> {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn get_or_fetch<F, Fut, E>(&self, key: &str, fetch: F) -> Result<Arc<V>, E>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<V, E>>,
    {
        let slot = {
            let mut entries = self.entries.lock().unwrap_or_else(PoisonError::into_inner);
            entries.entry(key.to_string()).or_default().clone()
        };

        let value = slot
            .get_or_try_init(|| async { fetch().await.map(Arc::new) })
            .await?;
        Ok(value.clone())
    }

    /// Drops the entry for `key`. Returns whether a value was cached.
    pub fn invalidate(&self, key: &str) -> bool {
        let mut entries = self.entries.lock().unwrap_or_else(PoisonError::into_inner);
        entries
            .remove(key)
            .is_some_and(|slot| slot.initialized())
    }

    pub fn clear(&self) {
        self.entries
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clear();
    }

    pub fn is_cached(&self, key: &str) -> bool {
        self.entries
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .get(key)
            .is_some_and(|slot| slot.initialized())
    }
}

const SHIP_TYPES_KEY: &str = "platforms";

/// Cached view over a [`CatalogSource`].
pub struct Catalog<S> {
    source: S,
    trees: AsyncCache<TechTree>,
    ship_types: AsyncCache<ShipTypes>,
}

impl<S: CatalogSource> Catalog<S> {
    pub fn new(source: S) -> Self {
        Self {
            source,
            trees: AsyncCache::new(),
            ship_types: AsyncCache::new(),
        }
    }

    pub fn source(&self) -> &S {
        &self.source
    }

    pub async fn tech_tree(&self, ship_type: &str) -> CatalogResult<Arc<TechTree>> {
        self.trees
            .get_or_fetch(ship_type, move || async move {
                info!("📚 Fetching tech tree for '{}'", ship_type);
                self.source.fetch_tech_tree(ship_type).await
            })
            .await
    }

    pub async fn ship_types(&self) -> CatalogResult<Arc<ShipTypes>> {
        self.ship_types
            .get_or_fetch(SHIP_TYPES_KEY, move || async move {
                info!("🚀 Fetching ship types");
                self.source.fetch_ship_types().await
            })
            .await
    }

    /// Known ship type keys, sorted.
    pub async fn ship_type_keys(&self) -> CatalogResult<Vec<String>> {
        Ok(self.ship_types().await?.keys().cloned().collect())
    }

    pub fn invalidate(&self, ship_type: &str) {
        if self.trees.invalidate(ship_type) {
            debug!("Dropped cached tech tree for '{}'", ship_type);
        }
    }

    pub fn clear(&self) {
        self.trees.clear();
        self.ship_types.clear();
    }
}
