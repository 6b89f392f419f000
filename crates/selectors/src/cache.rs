//! Cache of derived views keyed by selector id and argument key.

use std::any::Any;
use std::collections::HashMap;
use std::sync::Arc;

use entity_store::CollectionRef;
use parking_lot::Mutex;

type ViewValue = Arc<dyn Any + Send + Sync>;

struct CacheEntry {
    /// Collections the value was computed from, compared by pointer.
    deps: Vec<CollectionRef>,
    value: ViewValue,
}

impl CacheEntry {
    fn is_fresh(&self, deps: &[CollectionRef]) -> bool {
        self.deps.len() == deps.len()
            && self
                .deps
                .iter()
                .zip(deps)
                .all(|(recorded, current)| Arc::ptr_eq(recorded, current))
    }
}

/// Shared cache of derived views.
///
/// An entry is reused while every collection it was computed from is the
/// same allocation as the current one. The store installs a new `Arc` for
/// every collection a merge touches, so pointer identity is the change signal.
/// Entries are never evicted by the cache itself; callers clear or invalidate.
#[derive(Clone, Default)]
pub struct DerivedViewCache {
    entries: Arc<Mutex<HashMap<(String, String), CacheEntry>>>,
}

impl DerivedViewCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the cached view for `(selector_id, key)`, recomputing it when
    /// any dependency changed or no entry exists.
    ///
    /// `compute` runs without the cache lock held, so it may read other views.
    pub fn get_view<T, F>(
        &self,
        selector_id: &str,
        key: &str,
        deps: &[CollectionRef],
        compute: F,
    ) -> Arc<T>
    where
        T: Send + Sync + 'static,
        F: FnOnce() -> T,
    {
        let cache_key = (selector_id.to_string(), key.to_string());

        {
            let entries = self.entries.lock();
            if let Some(entry) = entries.get(&cache_key)
                && entry.is_fresh(deps)
                && let Ok(value) = Arc::clone(&entry.value).downcast::<T>()
            {
                return value;
            }
        }

        tracing::debug!(selector_id, key, "recomputing derived view");
        let value = Arc::new(compute());
        self.entries.lock().insert(
            cache_key,
            CacheEntry {
                deps: deps.to_vec(),
                value: Arc::clone(&value) as ViewValue,
            },
        );
        value
    }

    /// Drops every entry of one selector. Returns the number removed.
    pub fn invalidate(&self, selector_id: &str) -> usize {
        let mut entries = self.entries.lock();
        let before = entries.len();
        entries.retain(|(id, _), _| id != selector_id);
        before - entries.len()
    }

    pub fn clear(&self) {
        self.entries.lock().clear();
    }

    pub fn len(&self) -> usize {
        self.entries.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.lock().is_empty()
    }
}

impl std::fmt::Debug for DerivedViewCache {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DerivedViewCache")
            .field("entries", &self.len())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use entity_store::Entity;

    fn collection(ids: &[&str]) -> CollectionRef {
        Arc::new(ids.iter().map(|id| Entity::with_id(*id)).collect())
    }

    #[test]
    fn test_unchanged_deps_return_the_same_value() {
        let cache = DerivedViewCache::new();
        let bookings = collection(&["b1", "b2"]);

        let first = cache.get_view("count", "", &[Arc::clone(&bookings)], || bookings.len());
        let second = cache.get_view("count", "", &[Arc::clone(&bookings)], || -> usize {
            panic!("recomputed with unchanged deps")
        });

        assert!(Arc::ptr_eq(&first, &second));
        assert_eq!(*second, 2);
    }

    #[test]
    fn test_new_collection_allocation_recomputes() {
        let cache = DerivedViewCache::new();
        let before = collection(&["b1"]);
        let after = collection(&["b1"]);

        let first = cache.get_view("count", "", &[before], || 1usize);
        let second = cache.get_view("count", "", &[after], || 2usize);

        assert_eq!(*first, 1);
        assert_eq!(*second, 2);
        assert_eq!(cache.len(), 1);
    }

    #[test]
    fn test_keys_and_selectors_are_cached_separately() {
        let cache = DerivedViewCache::new();
        let deps = [collection(&["v1"])];

        let a = cache.get_view("venues", "o1", &deps, || "o1".to_string());
        let b = cache.get_view("venues", "o2", &deps, || "o2".to_string());
        let c = cache.get_view("offers", "o1", &deps, || "offers".to_string());

        assert_eq!(a.as_str(), "o1");
        assert_eq!(b.as_str(), "o2");
        assert_eq!(c.as_str(), "offers");
        assert_eq!(cache.len(), 3);

        assert_eq!(cache.invalidate("venues"), 2);
        assert_eq!(cache.len(), 1);
        cache.clear();
        assert!(cache.is_empty());
    }

    #[test]
    fn test_type_mismatch_recomputes() {
        let cache = DerivedViewCache::new();
        let deps = [collection(&[])];

        cache.get_view("shared", "k", &deps, || 1u32);
        let value = cache.get_view("shared", "k", &deps, || "text");

        assert_eq!(*value, "text");
    }
}
