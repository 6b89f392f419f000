//! Cached selectors: input collections + compute function + key function.

use std::sync::Arc;
use std::sync::atomic::{AtomicU64, AtomicUsize, Ordering};

use entity_store::{CollectionRef, Entity, StoreState};

use crate::DerivedViewCache;

/// Reads one dependency collection out of the store.
pub type InputFn = Arc<dyn Fn(&StoreState) -> CollectionRef + Send + Sync>;

static NEXT_SELECTOR: AtomicU64 = AtomicU64::new(1);

/// Input reading the named collection.
///
/// A collection the store does not know resolves to the same empty
/// collection on every call, so it never invalidates the view.
pub fn collection(name: impl Into<String>) -> InputFn {
    let name = name.into();
    let empty: CollectionRef = Arc::new(Vec::new());
    Arc::new(move |state: &StoreState| {
        state
            .collection(&name)
            .cloned()
            .unwrap_or_else(|| Arc::clone(&empty))
    })
}

/// Builds a selector over `inputs`.
///
/// `compute` receives the input collections in order plus the call
/// arguments; `key_fn` maps the arguments to the cache key.
///
/// ```
/// use entity_store::{StoreConfig, StoreState};
/// use selectors::{collection, create_cached_selector};
///
/// let selector = create_cached_selector(
///     vec![collection("bookings")],
///     |inputs, _: &()| inputs[0].len(),
///     |_| String::new(),
/// );
/// let state = StoreState::new(&StoreConfig::default());
/// assert_eq!(*selector.select(&state, &()), 0);
/// assert_eq!(*selector.select(&state, &()), 0);
/// assert_eq!(selector.recomputations(), 1);
/// ```
pub fn create_cached_selector<A, T, C, K>(
    inputs: Vec<InputFn>,
    compute: C,
    key_fn: K,
) -> CachedSelector<A, T>
where
    A: ?Sized,
    T: Send + Sync + 'static,
    C: Fn(&[&[Entity]], &A) -> T + Send + Sync + 'static,
    K: Fn(&A) -> String + Send + Sync + 'static,
{
    let id = format!("selector-{}", NEXT_SELECTOR.fetch_add(1, Ordering::Relaxed));
    CachedSelector {
        id,
        inputs,
        compute: Arc::new(compute),
        key_fn: Arc::new(key_fn),
        cache: DerivedViewCache::new(),
        recomputations: Arc::new(AtomicUsize::new(0)),
    }
}

/// A memoized view function `(state, args) -> Arc<T>`.
///
/// Clones share the cache and the recomputation counter.
pub struct CachedSelector<A: ?Sized, T> {
    id: String,
    inputs: Vec<InputFn>,
    compute: Arc<dyn Fn(&[&[Entity]], &A) -> T + Send + Sync>,
    key_fn: Arc<dyn Fn(&A) -> String + Send + Sync>,
    cache: DerivedViewCache,
    recomputations: Arc<AtomicUsize>,
}

impl<A: ?Sized, T: Send + Sync + 'static> CachedSelector<A, T> {
    /// Keeps this selector's views in `cache` under `selector_id`.
    pub fn with_cache(mut self, cache: DerivedViewCache, selector_id: impl Into<String>) -> Self {
        self.cache = cache;
        self.id = selector_id.into();
        self
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    /// Returns the view for `args` against `state`.
    pub fn select(&self, state: &StoreState, args: &A) -> Arc<T> {
        let deps: Vec<CollectionRef> = self.inputs.iter().map(|input| input(state)).collect();
        let key = (self.key_fn)(args);

        self.cache.get_view(&self.id, &key, &deps, || {
            self.recomputations.fetch_add(1, Ordering::Relaxed);
            let collections: Vec<&[Entity]> = deps.iter().map(|c| c.as_slice()).collect();
            (self.compute)(&collections, args)
        })
    }

    /// Number of times the compute function ran.
    pub fn recomputations(&self) -> usize {
        self.recomputations.load(Ordering::Relaxed)
    }

    pub fn reset_recomputations(&self) {
        self.recomputations.store(0, Ordering::Relaxed);
    }
}

impl<A: ?Sized, T> Clone for CachedSelector<A, T> {
    fn clone(&self) -> Self {
        Self {
            id: self.id.clone(),
            inputs: self.inputs.clone(),
            compute: Arc::clone(&self.compute),
            key_fn: Arc::clone(&self.key_fn),
            cache: self.cache.clone(),
            recomputations: Arc::clone(&self.recomputations),
        }
    }
}

impl<A: ?Sized, T> std::fmt::Debug for CachedSelector<A, T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CachedSelector")
            .field("id", &self.id)
            .field("inputs", &self.inputs.len())
            .field("recomputations", &self.recomputations.load(Ordering::Relaxed))
            .finish_non_exhaustive()
    }
}
