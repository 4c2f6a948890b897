use futures::future::{join_all, BoxFuture, FutureExt, Shared};
use std::collections::{HashMap, HashSet};
use std::fmt::Display;
use std::future::Future;
use std::hash::Hash;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, MutexGuard};
use tracing::{debug, info, warn};

use crate::errors::CoreError;

/// Outcome of a memoized lookup.
#[derive(Debug, Clone, PartialEq)]
pub enum Lookup<V> {
    /// The loader succeeded.
    Resolved(V),
    /// The loader failed and `placeholder` stands in for the real value.
    /// Cached like a success: the key is not retried until invalidated.
    Degraded {
        placeholder: V,
        key: String,
        reason: String,
    },
}

impl<V> Lookup<V> {
    /// The real value or the placeholder.
    pub fn value(&self) -> &V {
        match self {
            Lookup::Resolved(v) => v,
            Lookup::Degraded { placeholder, .. } => placeholder,
        }
    }

    pub fn into_value(self) -> V {
        match self {
            Lookup::Resolved(v) => v,
            Lookup::Degraded { placeholder, .. } => placeholder,
        }
    }

    pub fn is_degraded(&self) -> bool {
        matches!(self, Lookup::Degraded { .. })
    }

    /// Strict view: a degraded lookup becomes `CoreError::DegradedLookup`.
    pub fn into_result(self) -> Result<V, CoreError> {
        match self {
            Lookup::Resolved(v) => Ok(v),
            Lookup::Degraded { key, reason, .. } => Err(CoreError::DegradedLookup { key, reason }),
        }
    }
}

/// Observable state of one cache key.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EntryState {
    Pending,
    Resolved,
    Degraded,
}

type SharedLoad<V> = Shared<BoxFuture<'static, Lookup<V>>>;

enum Slot<V> {
    /// A load is in flight; later callers await the same shared future.
    Pending { load_id: u64, load: SharedLoad<V> },
    Settled(Lookup<V>),
}

/// Session-scoped cache that loads each key at most once.
///
/// - A settled key (resolved or degraded) is served without calling the loader.
/// - Concurrent `resolve` calls for a key that is still loading join the
///   in-flight load instead of starting another one.
/// - A failing loader yields `Lookup::Degraded` carrying the placeholder for
///   that key. Degraded entries stay cached until `invalidate` or `clear`.
///
/// The loader is supplied per call, so different call sites can share one
/// namespace while fetching through different code paths.
pub struct MemoCache<K, V> {
    namespace: String,
    placeholder: Arc<dyn Fn(&K) -> V + Send + Sync>,
    slots: Mutex<HashMap<K, Slot<V>>>,
    next_load_id: AtomicU64,
}

impl<K, V> MemoCache<K, V>
where
    K: Eq + Hash + Clone + Display + Send + Sync + 'static,
    V: Clone + Send + Sync + 'static,
{
    pub fn new(
        namespace: impl Into<String>,
        placeholder: impl Fn(&K) -> V + Send + Sync + 'static,
    ) -> Self {
        Self {
            namespace: namespace.into(),
            placeholder: Arc::new(placeholder),
            slots: Mutex::new(HashMap::new()),
            next_load_id: AtomicU64::new(0),
        }
    }

    pub fn namespace(&self) -> &str {
        &self.namespace
    }

    /// Return the cached value for `key`, loading it through `loader` if
    /// nothing is cached or in flight.
    pub async fn resolve<F, Fut>(&self, key: K, loader: F) -> Lookup<V>
    where
        F: FnOnce(K) -> Fut,
        Fut: Future<Output = Result<V, CoreError>> + Send + 'static,
    {
        if let Some(joined) = self.existing(&key) {
            match joined {
                Slot::Settled(lookup) => return lookup,
                Slot::Pending { load_id, load } => return self.settle(key, load_id, load).await,
            }
        }

        // Build the load with the lock released, so a loader may touch this
        // cache while it is being constructed.
        let candidate = self.start_load(key.clone(), loader);

        let (load_id, load) = {
            let mut slots = self.lock();
            match slots.get(&key) {
                Some(Slot::Settled(lookup)) => return lookup.clone(),
                // Someone else started a load meanwhile; ours is never polled.
                Some(Slot::Pending { load_id, load }) => (*load_id, load.clone()),
                None => {
                    let load_id = self.next_load_id.fetch_add(1, Ordering::Relaxed);
                    debug!(namespace = %self.namespace, %key, load_id, "starting load");
                    slots.insert(
                        key.clone(),
                        Slot::Pending {
                            load_id,
                            load: candidate.clone(),
                        },
                    );
                    (load_id, candidate)
                }
            }
        };

        self.settle(key, load_id, load).await
    }

    /// The settled lookup or in-flight load for `key`, if any.
    fn existing(&self, key: &K) -> Option<Slot<V>> {
        match self.lock().get(key)? {
            Slot::Settled(lookup) => {
                debug!(namespace = %self.namespace, %key, "cache hit");
                Some(Slot::Settled(lookup.clone()))
            }
            Slot::Pending { load_id, load } => {
                debug!(namespace = %self.namespace, %key, "joining in-flight load");
                Some(Slot::Pending {
                    load_id: *load_id,
                    load: load.clone(),
                })
            }
        }
    }

    async fn settle(&self, key: K, load_id: u64, load: SharedLoad<V>) -> Lookup<V> {
        let lookup = load.await;

        // Any awaiter may settle the slot. If it was invalidated (or replaced
        // by a newer load) meanwhile, the result is returned but not stored.
        let mut slots = self.lock();
        if let Some(Slot::Pending { load_id: current, .. }) = slots.get(&key) {
            if *current == load_id {
                slots.insert(key, Slot::Settled(lookup.clone()));
            }
        }
        lookup
    }

    /// Resolve a batch of keys. Duplicates are collapsed first, so a key that
    /// appears many times costs at most one load; the distinct keys are then
    /// resolved concurrently.
    pub async fn resolve_many<I, F, Fut>(&self, keys: I, loader: F) -> HashMap<K, Lookup<V>>
    where
        I: IntoIterator<Item = K>,
        F: Fn(K) -> Fut,
        Fut: Future<Output = Result<V, CoreError>> + Send + 'static,
    {
        let mut seen = HashSet::new();
        let distinct: Vec<K> = keys
            .into_iter()
            .filter(|k| seen.insert(k.clone()))
            .collect();

        let mut pending = Vec::with_capacity(distinct.len());
        for key in distinct {
            pending.push(self.resolve_keyed(key, &loader));
        }
        join_all(pending).await.into_iter().collect()
    }

    async fn resolve_keyed<F, Fut>(&self, key: K, loader: F) -> (K, Lookup<V>)
    where
        F: FnOnce(K) -> Fut,
        Fut: Future<Output = Result<V, CoreError>> + Send + 'static,
    {
        let lookup = self.resolve(key.clone(), loader).await;
        (key, lookup)
    }

    /// Drop the entry for `key` so the next `resolve` loads it again.
    /// Returns whether an entry existed.
    pub fn invalidate(&self, key: &K) -> bool {
        let removed = self.lock().remove(key).is_some();
        if removed {
            debug!(namespace = %self.namespace, %key, "entry invalidated");
        }
        removed
    }

    /// Drop every entry (end of session).
    pub fn clear(&self) {
        let mut slots = self.lock();
        let count = slots.len();
        slots.clear();
        info!(namespace = %self.namespace, count, "cache cleared");
    }

    pub fn state(&self, key: &K) -> Option<EntryState> {
        self.lock().get(key).map(|slot| match slot {
            Slot::Pending { .. } => EntryState::Pending,
            Slot::Settled(Lookup::Resolved(_)) => EntryState::Resolved,
            Slot::Settled(Lookup::Degraded { .. }) => EntryState::Degraded,
        })
    }

    /// The settled lookup for `key`, without loading anything.
    pub fn peek(&self, key: &K) -> Option<Lookup<V>> {
        match self.lock().get(key) {
            Some(Slot::Settled(lookup)) => Some(lookup.clone()),
            _ => None,
        }
    }

    pub fn len(&self) -> usize {
        self.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.lock().is_empty()
    }

    fn start_load<F, Fut>(&self, key: K, loader: F) -> SharedLoad<V>
    where
        F: FnOnce(K) -> Fut,
        Fut: Future<Output = Result<V, CoreError>> + Send + 'static,
    {
        let pending = loader(key.clone());
        let placeholder = Arc::clone(&self.placeholder);
        let namespace = self.namespace.clone();
        async move {
            match pending.await {
                Ok(value) => Lookup::Resolved(value),
                Err(e) => {
                    warn!(%namespace, %key, error = %e, "lookup failed, caching placeholder");
                    Lookup::Degraded {
                        placeholder: placeholder(&key),
                        key: key.to_string(),
                        reason: e.to_string(),
                    }
                }
            }
        }
        .boxed()
        .shared()
    }

    fn lock(&self) -> MutexGuard<'_, HashMap<K, Slot<V>>> {
        self.slots.lock().unwrap_or_else(|e| e.into_inner())
    }
}

impl<K, V> std::fmt::Debug for MemoCache<K, V> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let entries = self.slots.lock().map(|s| s.len()).unwrap_or(0);
        f.debug_struct("MemoCache")
            .field("namespace", &self.namespace)
            .field("entries", &entries)
            .finish()
    }
}
