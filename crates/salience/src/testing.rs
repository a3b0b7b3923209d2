//! Test utilities for salience - mock providers and fixed vectors
//!
//! Deterministic stand-ins for the embedding and sentiment collaborators so
//! tests never depend on a model.

use crate::error::Result;
use crate::providers::{Embedder, Sentiment, SentimentAnalyzer};

/// Mock embedder for fast unit tests that don't need meaningful similarity.
/// Produces deterministic vectors in [-1, 1] based on an input text hash.
#[derive(Debug, Clone, Copy)]
pub struct MockEmbedder {
    dimension: usize,
}

impl MockEmbedder {
    pub fn new(dimension: usize) -> Self {
        Self { dimension }
    }
}

impl Default for MockEmbedder {
    fn default() -> Self {
        Self::new(384)
    }
}

impl Embedder for MockEmbedder {
    fn embed(&self, text: &str) -> Result<Vec<f32>> {
        use std::collections::hash_map::DefaultHasher;
        use std::hash::{Hash, Hasher};

        let mut hasher = DefaultHasher::new();
        text.hash(&mut hasher);
        let seed = hasher.finish();

        Ok((0..self.dimension)
            .map(|i| {
                let x = seed
                    .wrapping_mul(i as u64 + 1)
                    .wrapping_add(0x9e37_79b9_7f4a_7c15);
                let normalized = (x as f32) / (u64::MAX as f32);
                (normalized * 2.0) - 1.0
            })
            .collect())
    }

    fn dimension(&self) -> usize {
        self.dimension
    }

    fn name(&self) -> &'static str {
        "mock"
    }
}

/// Sentiment analyzer that returns the same scores for every text
#[derive(Debug, Clone, Copy, Default)]
pub struct FixedSentiment(pub Sentiment);

impl SentimentAnalyzer for FixedSentiment {
    fn analyze(&self, _text: &str) -> Sentiment {
        self.0
    }

    fn name(&self) -> &'static str {
        "fixed"
    }
}

/// Unit vector along `axis` (taken modulo `dimension`); empty when
/// `dimension` is zero
pub fn unit_vector(dimension: usize, axis: usize) -> Vec<f32> {
    let mut v = vec![0.0; dimension];
    if let Some(slot) = axis.checked_rem(dimension).and_then(|i| v.get_mut(i)) {
        *slot = 1.0;
    }
    v
}

/// 2-d unit vector at `degrees` from the x axis
pub fn angled(degrees: f64) -> Vec<f32> {
    let radians = degrees.to_radians();
    vec![radians.cos() as f32, radians.sin() as f32]
}
