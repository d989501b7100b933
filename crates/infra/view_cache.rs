use std::{collections::HashMap, sync::Arc};

use tokio::sync::RwLock;
use tracing::debug;

struct Slot<T> {
    /// Bumped by every revalidation of the path.
    generation: u64,
    value: Option<Arc<T>>,
}

impl<T> Default for Slot<T> {
    fn default() -> Self {
        Self {
            generation: 0,
            value: None,
        }
    }
}

/// Rendered listings keyed by the view path that shows them.
///
/// Entries are derived data only; writers call [`ViewCache::revalidate`] so the
/// next read goes back to the store. Readers take [`ViewCache::generation`]
/// before loading and fill through [`ViewCache::put_if_fresh`], so a snapshot
/// loaded before a revalidation is never cached after it.
pub struct ViewCache<T> {
    entries: RwLock<HashMap<String, Slot<T>>>,
}

impl<T> Default for ViewCache<T> {
    fn default() -> Self {
        Self {
            entries: RwLock::new(HashMap::new()),
        }
    }
}

impl<T> ViewCache<T> {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn get(&self, path: &str) -> Option<Arc<T>> {
        self.entries
            .read()
            .await
            .get(path)
            .and_then(|slot| slot.value.clone())
    }

    pub async fn generation(&self, path: &str) -> u64 {
        self.entries
            .read()
            .await
            .get(path)
            .map(|slot| slot.generation)
            .unwrap_or_default()
    }

    /// Caches `value` only if `path` was not revalidated since `generation` was read.
    /// The value is handed back either way.
    pub async fn put_if_fresh(&self, path: &str, generation: u64, value: T) -> Arc<T> {
        let value = Arc::new(value);
        let mut entries = self.entries.write().await;
        let slot = entries.entry(path.to_string()).or_default();

        if slot.generation == generation {
            slot.value = Some(Arc::clone(&value));
        } else {
            debug!(
                path,
                loaded_at = generation,
                current = slot.generation,
                "view_cache: dropped stale fill"
            );
        }

        value
    }

    pub async fn revalidate(&self, path: &str) {
        let mut entries = self.entries.write().await;
        let slot = entries.entry(path.to_string()).or_default();
        let removed = slot.value.take().is_some();
        slot.generation += 1;
        debug!(path, removed, generation = slot.generation, "view_cache: revalidated");
    }
}
