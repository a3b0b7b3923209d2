//! Shared long-term store handle
//!
//! Lets several pipelines use one store. Queries hold the read lock for the
//! whole scan so they observe one consistent snapshot; consolidation, pruning
//! and decay take the write lock and are serialized against each other and
//! against in-flight queries.

use std::sync::{Arc, PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};

use crate::error::Result;
use crate::memory::DecayingRecord;
use crate::storage::long_term::{ConsolidationOutcome, LongTermStore, SimilarRecord};

#[derive(Debug, Clone, Default)]
pub struct SharedStore {
    inner: Arc<RwLock<LongTermStore>>,
}

impl SharedStore {
    pub fn new(store: LongTermStore) -> Self {
        Self {
            inner: Arc::new(RwLock::new(store)),
        }
    }

    /// Read access for a consistent multi-step view.
    ///
    /// Every mutation either fully applies or fully rejects, so a guard
    /// recovered from a poisoned lock still sees a valid store.
    pub fn read(&self) -> RwLockReadGuard<'_, LongTermStore> {
        self.inner.read().unwrap_or_else(PoisonError::into_inner)
    }

    pub fn write(&self) -> RwLockWriteGuard<'_, LongTermStore> {
        self.inner.write().unwrap_or_else(PoisonError::into_inner)
    }

    pub fn query_similar(
        &self,
        query: &[f32],
        k: usize,
        threshold: f64,
    ) -> Result<Vec<SimilarRecord>> {
        self.read().query_similar(query, k, threshold)
    }

    pub fn consolidate(
        &self,
        record: DecayingRecord,
        similarity_threshold: f64,
    ) -> Result<ConsolidationOutcome> {
        self.write().consolidate(record, similarity_threshold)
    }

    /// All-or-nothing batch consolidation under one write guard
    pub fn consolidate_all(
        &self,
        records: Vec<DecayingRecord>,
        similarity_threshold: f64,
    ) -> Result<Vec<ConsolidationOutcome>> {
        self.write().consolidate_all(records, similarity_threshold)
    }

    pub fn prune(&self, min_significance: f64) -> usize {
        self.write().prune(min_significance)
    }

    pub fn apply_decay(&self, elapsed: f64) -> Result<()> {
        self.write().apply_decay(elapsed)
    }

    pub fn len(&self) -> usize {
        self.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.read().is_empty()
    }

    /// Clone of every stored record in insertion order
    pub fn snapshot(&self) -> Vec<DecayingRecord> {
        self.read().records().to_vec()
    }
}
