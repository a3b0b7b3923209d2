//! Long-term store with similarity-based consolidation
//!
//! Holds consolidated records in insertion order and answers exact
//! linear-scan similarity queries. Consolidating a record that closely
//! matches an existing one strengthens the existing record instead of
//! storing a duplicate.

use serde::Serialize;
use uuid::Uuid;

use crate::config::StoreConfig;
use crate::error::{Result, SalienceError};
use crate::memory::{DecayingRecord, SimilarityFn, cosine_similarity};

/// Default significance multiplier applied to a record absorbing a duplicate
pub const DEFAULT_MERGE_BOOST: f64 = 1.2;

/// Similarity floor used by [`LongTermStore::retrieve`]
pub const RETRIEVAL_THRESHOLD: f64 = 0.5;

/// A stored record returned from a similarity query
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SimilarRecord {
    pub record: DecayingRecord,
    pub similarity: f64,
}

/// What happened to a record handed to [`LongTermStore::consolidate`]
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(tag = "action", rename_all = "snake_case")]
pub enum ConsolidationOutcome {
    /// An existing record matched; it was strengthened and the candidate discarded
    Merged {
        into: Uuid,
        discarded: Uuid,
        similarity: f64,
        significance: f64,
    },
    /// No match above the threshold; the candidate was appended unchanged
    Inserted { id: Uuid },
}

impl ConsolidationOutcome {
    /// Id of the record that now holds the memory
    pub fn stored_id(&self) -> Uuid {
        match self {
            ConsolidationOutcome::Merged { into, .. } => *into,
            ConsolidationOutcome::Inserted { id } => *id,
        }
    }

    pub fn is_merged(&self) -> bool {
        matches!(self, ConsolidationOutcome::Merged { .. })
    }
}

/// Insertion-ordered collection of consolidated records
#[derive(Debug, Clone)]
pub struct LongTermStore {
    records: Vec<DecayingRecord>,
    dimension: Option<usize>,
    merge_boost: f64,
}

impl Default for LongTermStore {
    fn default() -> Self {
        Self::new()
    }
}

impl LongTermStore {
    /// Create an empty store whose dimension is fixed by the first insert
    pub fn new() -> Self {
        Self {
            records: Vec::new(),
            dimension: None,
            merge_boost: DEFAULT_MERGE_BOOST,
        }
    }

    /// Create an empty store that only accepts vectors of `dimension` length
    pub fn with_dimension(dimension: usize) -> Result<Self> {
        if dimension == 0 {
            return Err(SalienceError::InvalidArgument(
                "store dimension must be at least 1".to_string(),
            ));
        }
        Ok(Self {
            dimension: Some(dimension),
            ..Self::new()
        })
    }

    pub fn from_config(config: &StoreConfig) -> Result<Self> {
        config.validate()?;
        let mut store = match config.dimension {
            Some(dimension) => Self::with_dimension(dimension)?,
            None => Self::new(),
        };
        store.merge_boost = config.merge_boost;
        Ok(store)
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Established embedding dimension, if any
    pub fn dimension(&self) -> Option<usize> {
        self.dimension
    }

    /// Factor applied to a stored record's significance on merge
    pub fn merge_boost(&self) -> f64 {
        self.merge_boost
    }

    /// Records in insertion order
    pub fn records(&self) -> &[DecayingRecord] {
        &self.records
    }

    pub fn get(&self, id: Uuid) -> Option<&DecayingRecord> {
        self.records.iter().find(|r| r.id() == id)
    }

    /// Records at least `threshold` similar to `query` by cosine similarity,
    /// most similar first, at most `k`.
    ///
    /// Equal similarities rank the most recently inserted record first.
    /// Stored records without an embedding are skipped.
    pub fn query_similar(
        &self,
        query: &[f32],
        k: usize,
        threshold: f64,
    ) -> Result<Vec<SimilarRecord>> {
        self.query_similar_with(query, k, threshold, cosine_similarity)
    }

    /// Same ranking contract as [`query_similar`](Self::query_similar) with a
    /// caller-supplied similarity function.
    pub fn query_similar_with(
        &self,
        query: &[f32],
        k: usize,
        threshold: f64,
        similarity_fn: SimilarityFn,
    ) -> Result<Vec<SimilarRecord>> {
        let ranked = self.rank(query, threshold, similarity_fn)?;
        Ok(ranked
            .into_iter()
            .take(k)
            .map(|(idx, similarity)| SimilarRecord {
                record: self.records[idx].clone(),
                similarity,
            })
            .collect())
    }

    /// Top `k` records above the default retrieval threshold
    pub fn retrieve(&self, query: &[f32], k: usize) -> Result<Vec<SimilarRecord>> {
        self.query_similar(query, k, RETRIEVAL_THRESHOLD)
    }

    /// Promote a record into long-term memory.
    ///
    /// The best match at or above `similarity_threshold` has its significance
    /// multiplied by the merge boost (capped at 1.0) and the incoming record is
    /// dropped. Only significance changes on merge. Without a match the
    /// record is appended as-is.
    pub fn consolidate(
        &mut self,
        record: DecayingRecord,
        similarity_threshold: f64,
    ) -> Result<ConsolidationOutcome> {
        let Some(embedding) = record.embedding() else {
            return Err(SalienceError::MissingEmbedding(record.id()));
        };
        self.check_query(embedding)?;

        let best = self
            .rank(embedding, similarity_threshold, cosine_similarity)?
            .into_iter()
            .next();

        match best {
            Some((idx, similarity)) => {
                let existing = &mut self.records[idx];
                existing.boost_significance(self.merge_boost);
                tracing::debug!(
                    into = %existing.id(),
                    discarded = %record.id(),
                    similarity,
                    significance = existing.significance(),
                    "Merged duplicate into existing memory"
                );
                Ok(ConsolidationOutcome::Merged {
                    into: existing.id(),
                    discarded: record.id(),
                    similarity,
                    significance: existing.significance(),
                })
            }
            None => {
                if self.dimension.is_none() {
                    self.dimension = Some(embedding.len());
                }
                let id = record.id();
                self.records.push(record);
                tracing::info!(%id, total = self.records.len(), "Stored new long-term memory");
                Ok(ConsolidationOutcome::Inserted { id })
            }
        }
    }

    /// Consolidate `records` in order, all or nothing.
    ///
    /// Every record is checked before any is stored, so a missing embedding
    /// or a dimension mismatch anywhere in the batch rejects the whole batch
    /// and leaves the store unchanged.
    pub fn consolidate_all(
        &mut self,
        records: Vec<DecayingRecord>,
        similarity_threshold: f64,
    ) -> Result<Vec<ConsolidationOutcome>> {
        let mut expected = self.dimension;
        for record in &records {
            let Some(embedding) = record.embedding() else {
                return Err(SalienceError::MissingEmbedding(record.id()));
            };
            if embedding.is_empty() {
                return Err(SalienceError::InvalidArgument(
                    "query embedding must not be empty".to_string(),
                ));
            }
            match expected {
                Some(dimension) if dimension != embedding.len() => {
                    return Err(SalienceError::DimensionMismatch {
                        expected: dimension,
                        actual: embedding.len(),
                    });
                }
                Some(_) => {}
                None => expected = Some(embedding.len()),
            }
        }

        records
            .into_iter()
            .map(|record| self.consolidate(record, similarity_threshold))
            .collect()
    }

    /// Remove every record with `significance < min_significance`.
    /// Records exactly at the floor are kept.
    pub fn prune(&mut self, min_significance: f64) -> usize {
        let before = self.records.len();
        self.records.retain(|r| r.significance() >= min_significance);
        let removed = before - self.records.len();
        if removed > 0 {
            tracing::info!(removed, min_significance, "Pruned long-term memories");
        }
        removed
    }

    /// Decay every stored record by `elapsed`
    pub fn apply_decay(&mut self, elapsed: f64) -> Result<()> {
        if !elapsed.is_finite() || elapsed < 0.0 {
            return Err(SalienceError::InvalidArgument(format!(
                "elapsed time must be finite and non-negative, got {elapsed}"
            )));
        }
        for record in &mut self.records {
            record.apply_decay(elapsed)?;
        }
        Ok(())
    }

    fn check_query(&self, query: &[f32]) -> Result<()> {
        if query.is_empty() {
            return Err(SalienceError::InvalidArgument(
                "query embedding must not be empty".to_string(),
            ));
        }
        match self.dimension {
            Some(expected) if expected != query.len() => Err(SalienceError::DimensionMismatch {
                expected,
                actual: query.len(),
            }),
            _ => Ok(()),
        }
    }

    /// Indices and similarities of all records at or above `threshold`,
    /// sorted by similarity descending, then insertion index descending.
    fn rank(
        &self,
        query: &[f32],
        threshold: f64,
        similarity_fn: SimilarityFn,
    ) -> Result<Vec<(usize, f64)>> {
        self.check_query(query)?;

        let mut scored: Vec<(usize, f64)> = self
            .records
            .iter()
            .enumerate()
            .filter_map(|(idx, record)| {
                let embedding = record.embedding()?;
                let similarity = similarity_fn(query, embedding);
                (similarity >= threshold).then_some((idx, similarity))
            })
            .collect();

        scored.sort_by(|a, b| b.1.total_cmp(&a.1).then_with(|| b.0.cmp(&a.0)));
        Ok(scored)
    }
}
