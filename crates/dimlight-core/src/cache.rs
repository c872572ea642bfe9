//! Single-flight memoization for transformed resources.
//!
//! The first caller for a key becomes the leader and runs the computation
//! outside the map lock. Callers arriving while it runs park on the flight's
//! condvar and receive the leader's result. Successes are stored; failures
//! are handed to every waiter and then forgotten, so the next call retries.

use std::collections::HashMap;
use std::hash::Hash;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

use parking_lot::{Condvar, Mutex};
use serde::{Deserialize, Serialize};
use tracing::trace;

use crate::error::ResolveError;
use crate::id::ResourceId;
use crate::image::TransformedImage;
use crate::transform::params::TransformParams;

/// Identity of a transformed image: the source resource plus the parameters
/// applied to it.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct CacheKey {
    pub id: ResourceId,
    pub params: TransformParams,
}

impl CacheKey {
    pub fn new(id: ResourceId, params: TransformParams) -> Self {
        Self { id, params }
    }
}

/// Cache of transformed images keyed by resource and parameters.
pub type ImageCache = SingleFlightCache<CacheKey, TransformedImage, ResolveError>;

/// Snapshot of cache activity counters.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CacheStats {
    /// Lookups answered from a stored value.
    pub hits: u64,
    /// Lookups that ran the computation.
    pub misses: u64,
    /// Lookups that waited on another caller's computation.
    pub joins: u64,
    /// Computations that returned an error.
    pub failures: u64,
}

#[derive(Default)]
struct Counters {
    hits: AtomicU64,
    misses: AtomicU64,
    joins: AtomicU64,
    failures: AtomicU64,
}

impl Counters {
    fn bump(counter: &AtomicU64) {
        counter.fetch_add(1, Ordering::Relaxed);
    }

    fn snapshot(&self) -> CacheStats {
        CacheStats {
            hits: self.hits.load(Ordering::Relaxed),
            misses: self.misses.load(Ordering::Relaxed),
            joins: self.joins.load(Ordering::Relaxed),
            failures: self.failures.load(Ordering::Relaxed),
        }
    }
}

enum FlightState<V, E> {
    Running,
    Done(Result<Arc<V>, E>),
    /// The leader unwound without producing a result.
    Abandoned,
}

struct Flight<V, E> {
    state: Mutex<FlightState<V, E>>,
    done: Condvar,
}

impl<V, E: Clone> Flight<V, E> {
    fn new() -> Self {
        Self {
            state: Mutex::new(FlightState::Running),
            done: Condvar::new(),
        }
    }

    fn finish(&self, state: FlightState<V, E>) {
        *self.state.lock() = state;
        self.done.notify_all();
    }

    /// Block until the leader finishes. `None` means the leader was abandoned.
    fn wait(&self) -> Option<Result<Arc<V>, E>> {
        let mut state = self.state.lock();
        loop {
            match &*state {
                FlightState::Done(result) => return Some(result.clone()),
                FlightState::Abandoned => return None,
                FlightState::Running => {}
            }
            self.done.wait(&mut state);
        }
    }
}

enum Slot<V, E> {
    Ready(Arc<V>),
    Pending(Arc<Flight<V, E>>),
}

enum Role<V, E> {
    Hit(Arc<V>),
    Join(Arc<Flight<V, E>>),
    Lead(Arc<Flight<V, E>>),
}

/// Thread-safe memoizing map with per-key single-flight computation.
pub struct SingleFlightCache<K, V, E> {
    slots: Mutex<HashMap<K, Slot<V, E>>>,
    counters: Counters,
}

impl<K, V, E> SingleFlightCache<K, V, E>
where
    K: Eq + Hash + Clone,
    E: Clone,
{
    pub fn new() -> Self {
        Self {
            slots: Mutex::new(HashMap::new()),
            counters: Counters::default(),
        }
    }

    /// Return the stored value for `key`, computing it at most once.
    ///
    /// Concurrent callers for the same key share one computation and observe
    /// the same `Arc`. An error is returned to the leader and every waiter
    /// and nothing is stored.
    pub fn get_or_compute<F>(&self, key: K, compute: F) -> Result<Arc<V>, E>
    where
        F: FnOnce() -> Result<V, E>,
    {
        let flight = loop {
            match self.join_or_lead(&key) {
                Role::Hit(value) => return Ok(value),
                Role::Join(flight) => match flight.wait() {
                    Some(result) => return result,
                    None => continue,
                },
                Role::Lead(flight) => break flight,
            }
        };

        let mut guard = LeaderGuard {
            cache: self,
            key: &key,
            flight: &flight,
            armed: true,
        };

        let result = compute().map(Arc::new);
        guard.armed = false;

        {
            let mut slots = self.slots.lock();
            let still_ours = matches!(
                slots.get(&key),
                Some(Slot::Pending(current)) if Arc::ptr_eq(current, &flight)
            );
            if still_ours {
                match &result {
                    Ok(value) => {
                        slots.insert(key.clone(), Slot::Ready(Arc::clone(value)));
                    }
                    Err(_) => {
                        slots.remove(&key);
                    }
                }
            }
        }

        if result.is_err() {
            Counters::bump(&self.counters.failures);
        }
        flight.finish(FlightState::Done(result.clone()));
        result
    }

    fn join_or_lead(&self, key: &K) -> Role<V, E> {
        let mut slots = self.slots.lock();
        match slots.get(key) {
            Some(Slot::Ready(value)) => {
                Counters::bump(&self.counters.hits);
                trace!("cache hit");
                Role::Hit(Arc::clone(value))
            }
            Some(Slot::Pending(flight)) => {
                Counters::bump(&self.counters.joins);
                trace!("joining in-flight computation");
                Role::Join(Arc::clone(flight))
            }
            None => {
                Counters::bump(&self.counters.misses);
                let flight = Arc::new(Flight::new());
                slots.insert(key.clone(), Slot::Pending(Arc::clone(&flight)));
                Role::Lead(flight)
            }
        }
    }

    /// Stored value for `key`, without computing or waiting.
    pub fn get(&self, key: &K) -> Option<Arc<V>> {
        match self.slots.lock().get(key) {
            Some(Slot::Ready(value)) => Some(Arc::clone(value)),
            _ => None,
        }
    }

    /// Whether a value is stored for `key`. In-flight computations do not count.
    pub fn contains(&self, key: &K) -> bool {
        matches!(self.slots.lock().get(key), Some(Slot::Ready(_)))
    }

    /// Number of stored values.
    pub fn len(&self) -> usize {
        self.slots
            .lock()
            .values()
            .filter(|slot| matches!(slot, Slot::Ready(_)))
            .count()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Drop every stored value. In-flight computations still deliver their
    /// result to their callers but are not stored.
    pub fn clear(&self) {
        self.slots.lock().clear();
    }

    pub fn stats(&self) -> CacheStats {
        self.counters.snapshot()
    }
}

impl<K, V, E> Default for SingleFlightCache<K, V, E>
where
    K: Eq + Hash + Clone,
    E: Clone,
{
    fn default() -> Self {
        Self::new()
    }
}

/// Releases waiters if the leader's computation panics.
struct LeaderGuard<'a, K, V, E>
where
    K: Eq + Hash + Clone,
    E: Clone,
{
    cache: &'a SingleFlightCache<K, V, E>,
    key: &'a K,
    flight: &'a Arc<Flight<V, E>>,
    armed: bool,
}

impl<K, V, E> Drop for LeaderGuard<'_, K, V, E>
where
    K: Eq + Hash + Clone,
    E: Clone,
{
    fn drop(&mut self) {
        if !self.armed {
            return;
        }
        {
            let mut slots = self.cache.slots.lock();
            if matches!(
                slots.get(self.key),
                Some(Slot::Pending(current)) if Arc::ptr_eq(current, self.flight)
            ) {
                slots.remove(self.key);
            }
        }
        self.flight.finish(FlightState::Abandoned);
    }
}
