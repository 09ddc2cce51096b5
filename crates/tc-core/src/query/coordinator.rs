//! Query coordinator implementation

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Weak};

use ahash::AHashMap;
use indexmap::IndexMap;
use parking_lot::RwLock;
use rayon::prelude::*;

use super::dims;
use super::{
    Dimension, DimensionKey, FilterChange, FilterChangeKind, FilterContext, FilterError,
    FilterPredicate, FilterSubscriber, GroupEntry, SubscriptionId,
};
use crate::record::{RecordStore, TreeRecord};

/// Upper bound on dimensions, one mask bit each
pub const MAX_DIMENSIONS: usize = 64;

/// Stores at least this large are scanned with rayon
const PARALLEL_SCAN_THRESHOLD: usize = 100_000;

type FilterCallback = dyn Fn(&FilterChange) + Send + Sync;

/// A dimension with its keys materialised for every record
struct DimensionSlot {
    dimension: Dimension,
    /// Distinct keys, ascending
    domain: Vec<DimensionKey>,
    /// Per record, index into `domain`
    codes: Vec<u32>,
}

impl DimensionSlot {
    fn build(dimension: Dimension, store: &RecordStore) -> Self {
        let keys: Vec<DimensionKey> = store.iter().map(|r| dimension.key(r)).collect();

        let mut domain = keys.clone();
        domain.sort_unstable();
        domain.dedup();

        let codes = keys
            .iter()
            .map(|k| domain.binary_search(k).unwrap_or_else(|i| i) as u32)
            .collect();

        tracing::debug!(
            "Dimension '{}' built with {} distinct keys",
            dimension.name(),
            domain.len()
        );

        Self { dimension, domain, codes }
    }

    /// Per domain code, whether the active filter accepts the key
    fn accepted_codes(&self) -> Vec<bool> {
        self.domain.iter().map(|k| self.dimension.accepts(k)).collect()
    }
}

/// Filter state guarded by the coordinator's lock
struct QueryState {
    store: Arc<RecordStore>,
    slots: Vec<DimensionSlot>,
    names: IndexMap<String, usize>,
    /// Per record, bit d is set when the record fails dimension d's filter
    masks: Vec<u64>,
    passing: usize,
    generation: u64,
}

impl QueryState {
    fn new(store: Arc<RecordStore>) -> Self {
        let total = store.len();
        Self {
            store,
            slots: Vec::new(),
            names: IndexMap::new(),
            masks: vec![0; total],
            passing: total,
            generation: 0,
        }
    }

    fn slot_id(&self, name: &str) -> Result<usize, FilterError> {
        self.names.get(name).copied().ok_or_else(|| {
            tracing::warn!("Ignoring request for unknown dimension '{}'", name);
            FilterError::UnknownDimension(name.to_string())
        })
    }

    fn attach(&mut self, dimension: Dimension) -> Result<usize, FilterError> {
        if self.names.contains_key(dimension.name()) {
            return Err(FilterError::DuplicateDimension(dimension.name().to_string()));
        }
        if self.slots.len() >= MAX_DIMENSIONS {
            return Err(FilterError::TooManyDimensions);
        }

        let id = self.slots.len();
        self.names.insert(dimension.name().to_string(), id);
        self.slots.push(DimensionSlot::build(dimension, &self.store));
        self.refresh_bit(id);
        self.generation += 1;
        Ok(id)
    }

    /// Recompute dimension `id`'s bit for every record
    fn refresh_bit(&mut self, id: usize) {
        let slot = &self.slots[id];
        let accepted = slot.accepted_codes();
        let bit = 1u64 << id;

        let update = |(mask, code): (&mut u64, &u32)| {
            if accepted[*code as usize] {
                *mask &= !bit;
            } else {
                *mask |= bit;
            }
        };

        if self.masks.len() >= PARALLEL_SCAN_THRESHOLD {
            self.masks.par_iter_mut().zip(slot.codes.par_iter()).for_each(update);
        } else {
            self.masks.iter_mut().zip(slot.codes.iter()).for_each(update);
        }

        self.passing = self.count_passing();
    }

    fn count_passing(&self) -> usize {
        if self.masks.len() >= PARALLEL_SCAN_THRESHOLD {
            self.masks.par_iter().filter(|m| **m == 0).count()
        } else {
            self.masks.iter().filter(|m| **m == 0).count()
        }
    }

    /// Counts per domain code over records passing every filter but `id`'s
    fn counts_excluding(&self, id: usize) -> Vec<u64> {
        let slot = &self.slots[id];
        let others = !(1u64 << id);
        let width = slot.domain.len();

        if self.masks.len() >= PARALLEL_SCAN_THRESHOLD {
            self.masks
                .par_iter()
                .zip(slot.codes.par_iter())
                .fold(
                    || vec![0u64; width],
                    |mut acc, (mask, code)| {
                        if mask & others == 0 {
                            acc[*code as usize] += 1;
                        }
                        acc
                    },
                )
                .reduce(
                    || vec![0u64; width],
                    |mut a, b| {
                        a.iter_mut().zip(b).for_each(|(x, y)| *x += y);
                        a
                    },
                )
        } else {
            let mut counts = vec![0u64; width];
            for (mask, code) in self.masks.iter().zip(slot.codes.iter()) {
                if mask & others == 0 {
                    counts[*code as usize] += 1;
                }
            }
            counts
        }
    }

    fn context(&self) -> FilterContext {
        FilterContext {
            generation: self.generation,
            passing: self.passing,
            total: self.store.len(),
            active: self
                .slots
                .iter()
                .filter_map(|s| {
                    s.dimension
                        .current_filter()
                        .map(|p| (s.dimension.name().to_string(), p.clone()))
                })
                .collect(),
        }
    }
}

/// Group counts tagged with the generation they were computed for
struct CachedCounts {
    generation: u64,
    counts: Arc<Vec<u64>>,
}

/// Owns the record store, the dimensions and their filters.
///
/// Every read and write of filter state goes through this type. Mutations
/// are committed under the write lock and subscribers are notified after
/// the lock is released, so callbacks may query the coordinator again.
pub struct QueryCoordinator {
    state: Arc<RwLock<QueryState>>,
    group_cache: Arc<RwLock<AHashMap<usize, CachedCounts>>>,
    subscribers: Arc<RwLock<Vec<Weak<dyn FilterSubscriber>>>>,
    callbacks: Arc<RwLock<Vec<(SubscriptionId, Arc<FilterCallback>)>>>,
    next_subscription: AtomicU64,
}

impl QueryCoordinator {
    /// Create a coordinator without dimensions
    pub fn new(store: impl Into<Arc<RecordStore>>) -> Self {
        Self {
            state: Arc::new(RwLock::new(QueryState::new(store.into()))),
            group_cache: Arc::new(RwLock::new(AHashMap::new())),
            subscribers: Arc::new(RwLock::new(Vec::new())),
            callbacks: Arc::new(RwLock::new(Vec::new())),
            next_subscription: AtomicU64::new(0),
        }
    }

    /// Create a coordinator with the standard tree census dimensions
    pub fn tree_census(store: impl Into<Arc<RecordStore>>) -> Self {
        let coordinator = Self::new(store);
        let standard = [
            Dimension::categorical(dims::BOROUGH, |r| &r.borough),
            Dimension::categorical(dims::SPECIES, |r| &r.species),
            Dimension::categorical(dims::STATUS, |r| &r.status),
            Dimension::categorical(dims::HEALTH, |r| &r.health),
            Dimension::location(dims::LOCATION),
            Dimension::numeric(dims::YEAR, |r| r.year as f64),
        ];
        {
            let mut state = coordinator.state.write();
            for dimension in standard {
                if let Err(e) = state.attach(dimension) {
                    tracing::error!("Failed to attach standard dimension: {}", e);
                }
            }
        }
        coordinator
    }

    /// Add a dimension. Keys are computed for every record now, so later
    /// queries never call the key function again.
    pub fn add_dimension(&self, dimension: Dimension) -> Result<(), FilterError> {
        let name = dimension.name().to_string();
        self.state.write().attach(dimension)?;
        self.group_cache.write().clear();
        tracing::info!("Added dimension '{}'", name);
        Ok(())
    }

    pub fn dimension_names(&self) -> Vec<String> {
        self.state.read().names.keys().cloned().collect()
    }

    /// Replace `name`'s filter. Setting the filter it already has is a no-op.
    pub fn set_filter(&self, name: &str, predicate: FilterPredicate) -> Result<(), FilterError> {
        let mut state = self.state.write();
        let id = state.slot_id(name)?;

        if state.slots[id].dimension.current_filter() == Some(&predicate) {
            tracing::debug!("Filter on '{}' unchanged", name);
            return Ok(());
        }

        state.slots[id].dimension.set_filter(predicate.clone())?;
        state.refresh_bit(id);
        state.generation += 1;

        let change = FilterChange {
            kind: FilterChangeKind::Set { dimension: name.to_string(), predicate },
            context: state.context(),
        };
        drop(state);

        tracing::info!(
            "Filter set on '{}': {} of {} records pass",
            name,
            change.context.passing,
            change.context.total
        );
        self.publish(change);
        Ok(())
    }

    /// Reset `name` to accept every record
    pub fn clear_filter(&self, name: &str) -> Result<(), FilterError> {
        let mut state = self.state.write();
        let id = state.slot_id(name)?;

        if state.slots[id].dimension.clear_filter().is_none() {
            return Ok(());
        }
        state.refresh_bit(id);
        state.generation += 1;

        let change = FilterChange {
            kind: FilterChangeKind::Cleared { dimension: name.to_string() },
            context: state.context(),
        };
        drop(state);

        tracing::info!("Filter cleared on '{}'", name);
        self.publish(change);
        Ok(())
    }

    /// Reset every dimension to accept all records
    pub fn clear_all(&self) {
        let mut state = self.state.write();

        let mut cleared = 0;
        for slot in state.slots.iter_mut() {
            if slot.dimension.clear_filter().is_some() {
                cleared += 1;
            }
        }
        if cleared == 0 {
            return;
        }

        state.masks.iter_mut().for_each(|m| *m = 0);
        state.passing = state.masks.len();
        state.generation += 1;

        let change = FilterChange {
            kind: FilterChangeKind::ClearedAll,
            context: state.context(),
        };
        drop(state);

        tracing::info!("Cleared {} filters", cleared);
        self.publish(change);
    }

    pub fn current_filter(&self, name: &str) -> Option<FilterPredicate> {
        let state = self.state.read();
        let id = state.names.get(name)?;
        state.slots[*id].dimension.current_filter().cloned()
    }

    /// Counts per key of `name`, over records passing every filter except
    /// `name`'s own. Keys without passing records are omitted. Unknown
    /// dimensions yield an empty result.
    pub fn group_counts(&self, name: &str) -> Vec<GroupEntry> {
        self.grouped(name, false)
    }

    /// Like `group_counts`, but lists every key of the store, zeros included
    pub fn group_counts_with_zeros(&self, name: &str) -> Vec<GroupEntry> {
        self.grouped(name, true)
    }

    fn grouped(&self, name: &str, keep_zeros: bool) -> Vec<GroupEntry> {
        // The read lock is the filter snapshot for the whole scan
        let state = self.state.read();
        let Ok(id) = state.slot_id(name) else {
            return Vec::new();
        };

        let cached = self
            .group_cache
            .read()
            .get(&id)
            .filter(|c| c.generation == state.generation)
            .map(|c| c.counts.clone());

        let counts = match cached {
            Some(counts) => counts,
            None => {
                tracing::debug!("Recomputing groups for '{}'", name);
                let counts = Arc::new(state.counts_excluding(id));
                self.group_cache.write().insert(
                    id,
                    CachedCounts { generation: state.generation, counts: counts.clone() },
                );
                counts
            }
        };

        state.slots[id]
            .domain
            .iter()
            .zip(counts.iter())
            .filter(|(_, count)| keep_zeros || **count > 0)
            .map(|(key, count)| GroupEntry { key: key.clone(), count: *count })
            .collect()
    }

    /// Records passing every active filter, in store order, at most `limit`
    pub fn passing_records(&self, limit: usize) -> Vec<TreeRecord> {
        let state = self.state.read();
        state
            .masks
            .iter()
            .zip(state.store.records())
            .filter(|(mask, _)| **mask == 0)
            .map(|(_, record)| record.clone())
            .take(limit)
            .collect()
    }

    pub fn passing_count(&self) -> usize {
        self.state.read().passing
    }

    pub fn total_count(&self) -> usize {
        self.state.read().store.len()
    }

    pub fn context(&self) -> FilterContext {
        self.state.read().context()
    }

    /// Register a callback run after every committed filter mutation
    pub fn on_filter_changed<F>(&self, callback: F) -> SubscriptionId
    where
        F: Fn(&FilterChange) + Send + Sync + 'static,
    {
        let id = SubscriptionId(self.next_subscription.fetch_add(1, Ordering::Relaxed));
        self.callbacks.write().push((id, Arc::new(callback)));
        id
    }

    /// Remove a callback. Returns false if it was not registered.
    pub fn unsubscribe(&self, id: SubscriptionId) -> bool {
        let mut callbacks = self.callbacks.write();
        let before = callbacks.len();
        callbacks.retain(|(existing, _)| *existing != id);
        callbacks.len() != before
    }

    /// Add a subscriber; it is held weakly and dropped once its owner goes away
    pub fn add_subscriber(&self, subscriber: Arc<dyn FilterSubscriber>) {
        self.subscribers.write().push(Arc::downgrade(&subscriber));
    }

    /// Invalidate cached groups and notify everyone of a committed change
    fn publish(&self, change: FilterChange) {
        self.group_cache.write().clear();

        let callbacks: Vec<Arc<FilterCallback>> =
            self.callbacks.read().iter().map(|(_, cb)| cb.clone()).collect();

        let subscribers: Vec<Arc<dyn FilterSubscriber>> = {
            let mut subscribers = self.subscribers.write();
            // Remove any dead weak references
            subscribers.retain(|weak| weak.strong_count() > 0);
            subscribers.iter().filter_map(|weak| weak.upgrade()).collect()
        };

        for callback in callbacks {
            callback(&change);
        }
        for subscriber in subscribers {
            subscriber.on_filter_change(&change);
        }
    }
}
