//! External collaborator interfaces
//!
//! The pipeline never computes embeddings or sentiment itself. Callers
//! resolve them through these traits (or any other means) and hand the
//! results in as plain values.

pub mod hashing;
pub mod lexicon;

use serde::{Deserialize, Serialize};

use crate::error::Result;

pub use hashing::HashingEmbedder;
pub use lexicon::{LexiconAnalyzer, emotion_label};

/// Turns text into a fixed-length vector
pub trait Embedder: Send + Sync {
    /// Embed a single text
    fn embed(&self, text: &str) -> Result<Vec<f32>>;

    /// Length of every vector this embedder produces
    fn dimension(&self) -> usize;

    /// Provider name for logging
    fn name(&self) -> &'static str;
}

/// Scores the emotional charge of text
pub trait SentimentAnalyzer: Send + Sync {
    fn analyze(&self, text: &str) -> Sentiment;

    /// Provider name for logging
    fn name(&self) -> &'static str;
}

/// Emotional dimensions of one event
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Sentiment {
    /// -1.0 (negative) to 1.0 (positive)
    pub valence: f64,
    /// 0.0 (calm) to 1.0 (intense)
    pub arousal: f64,
}

impl Sentiment {
    pub fn new(valence: f64, arousal: f64) -> Self {
        Self { valence, arousal }
    }

    /// Clamp provider output into range; NaN becomes neutral.
    pub fn clamped(self) -> Self {
        let valence = if self.valence.is_nan() {
            0.0
        } else {
            self.valence.clamp(-1.0, 1.0)
        };
        let arousal = if self.arousal.is_nan() {
            0.0
        } else {
            self.arousal.clamp(0.0, 1.0)
        };
        if valence != self.valence || arousal != self.arousal {
            tracing::warn!(
                valence = self.valence,
                arousal = self.arousal,
                "Sentiment provider returned out-of-range scores, clamping"
            );
        }
        Self { valence, arousal }
    }
}
