//! Decaying memory records
//!
//! A record is the atomic unit of memory: the original content, an optional
//! embedding and four scalar scores. Salience is derived from the scores on
//! every call and never stored.

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::{Result, SalienceError};

/// Weight of significance in salience
pub const SIGNIFICANCE_WEIGHT: f64 = 0.4;
/// Weight of novelty in salience
pub const NOVELTY_WEIGHT: f64 = 0.4;
/// Weight of absolute valence in salience
pub const VALENCE_WEIGHT: f64 = 0.2;

const DEFAULT_SIGNIFICANCE: f64 = 0.5;
const DEFAULT_NOVELTY: f64 = 0.5;
const DEFAULT_DECAY_RATE: f64 = 0.1;

/// A single memory whose significance fades exponentially over time.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DecayingRecord {
    id: Uuid,
    content: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    embedding: Option<Vec<f32>>,
    significance: f64,
    novelty: f64,
    valence: f64,
    decay_rate: f64,
    created_at: DateTime<Utc>,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    metadata: BTreeMap<String, serde_json::Value>,
}

impl DecayingRecord {
    /// Create a record with default scores and no embedding
    pub fn new(content: impl Into<String>) -> Self {
        Self {
            id: Uuid::new_v4(),
            content: content.into(),
            embedding: None,
            significance: DEFAULT_SIGNIFICANCE,
            novelty: DEFAULT_NOVELTY,
            valence: 0.0,
            decay_rate: DEFAULT_DECAY_RATE,
            created_at: Utc::now(),
            metadata: BTreeMap::new(),
        }
    }

    pub fn with_embedding(mut self, embedding: Vec<f32>) -> Self {
        self.embedding = Some(embedding);
        self
    }

    /// Clamped to [0, 1]
    pub fn with_significance(mut self, significance: f64) -> Self {
        self.significance = clamp_unit(significance);
        self
    }

    /// Clamped to [0, 1]
    pub fn with_novelty(mut self, novelty: f64) -> Self {
        self.novelty = clamp_unit(novelty);
        self
    }

    /// Clamped to [-1, 1]
    pub fn with_valence(mut self, valence: f64) -> Self {
        self.valence = if valence.is_nan() {
            0.0
        } else {
            valence.clamp(-1.0, 1.0)
        };
        self
    }

    /// Clamped to [0, 1]
    pub fn with_decay_rate(mut self, decay_rate: f64) -> Self {
        self.decay_rate = clamp_unit(decay_rate);
        self
    }

    pub fn with_metadata(mut self, metadata: BTreeMap<String, serde_json::Value>) -> Self {
        self.metadata = metadata;
        self
    }

    pub fn id(&self) -> Uuid {
        self.id
    }

    pub fn content(&self) -> &str {
        &self.content
    }

    pub fn embedding(&self) -> Option<&[f32]> {
        self.embedding.as_deref()
    }

    pub fn significance(&self) -> f64 {
        self.significance
    }

    pub fn novelty(&self) -> f64 {
        self.novelty
    }

    pub fn valence(&self) -> f64 {
        self.valence
    }

    pub fn decay_rate(&self) -> f64 {
        self.decay_rate
    }

    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    pub fn metadata(&self) -> &BTreeMap<String, serde_json::Value> {
        &self.metadata
    }

    /// Attach the embedding computed by the external provider.
    ///
    /// An embedding is set at most once; a record that needs a different
    /// vector must be rebuilt.
    pub fn attach_embedding(&mut self, embedding: Vec<f32>) -> Result<()> {
        if self.embedding.is_some() {
            return Err(SalienceError::InvalidArgument(format!(
                "record {} already has an embedding",
                self.id
            )));
        }
        if embedding.is_empty() {
            return Err(SalienceError::InvalidArgument(
                "embedding must not be empty".to_string(),
            ));
        }
        self.embedding = Some(embedding);
        Ok(())
    }

    /// Replace the novelty score after re-scoring against the store
    pub fn rescore_novelty(&mut self, novelty: f64) {
        self.novelty = clamp_unit(novelty);
    }

    /// `0.4·significance + 0.4·novelty + 0.2·|valence|`
    pub fn compute_salience(&self) -> f64 {
        SIGNIFICANCE_WEIGHT * self.significance
            + NOVELTY_WEIGHT * self.novelty
            + VALENCE_WEIGHT * self.valence.abs()
    }

    /// `significance ← significance · exp(-decay_rate · elapsed)`
    pub fn apply_decay(&mut self, elapsed: f64) -> Result<()> {
        if !elapsed.is_finite() || elapsed < 0.0 {
            return Err(SalienceError::InvalidArgument(format!(
                "elapsed time must be finite and non-negative, got {elapsed}"
            )));
        }
        if elapsed == 0.0 {
            return Ok(());
        }
        self.significance *= (-self.decay_rate * elapsed).exp();
        Ok(())
    }

    pub fn should_consolidate(&self, threshold: f64) -> bool {
        self.compute_salience() >= threshold
    }

    /// Multiply significance by `factor`, capped at 1.0
    pub(crate) fn boost_significance(&mut self, factor: f64) {
        self.significance = (self.significance * factor).min(1.0);
    }
}

fn clamp_unit(value: f64) -> f64 {
    if value.is_nan() {
        0.0
    } else {
        value.clamp(0.0, 1.0)
    }
}
