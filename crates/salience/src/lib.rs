//! Salience - salience-gated memory pipeline
//!
//! Scores incoming events for novelty against long-term memory, holds the
//! ones worth attention in a bounded working set, and consolidates the
//! significant ones into a deduplicating long-term store. Every record's
//! significance decays over time unless reinforced.

pub mod config;
pub mod error;
pub mod memory;
pub mod pipeline;
pub mod providers;
pub mod scorer;
pub mod storage;
pub mod testing;
pub mod working_set;

pub use config::Config;
pub use error::{Result, SalienceError};
pub use memory::DecayingRecord;
pub use pipeline::{DecayReport, EventInput, Pipeline, PipelineStats, ProcessOutcome};
pub use providers::{Embedder, HashingEmbedder, LexiconAnalyzer, Sentiment, SentimentAnalyzer};
pub use scorer::{EventType, NoveltyScore, NoveltyScorer};
pub use storage::{ConsolidationOutcome, LongTermStore, SharedStore};
pub use working_set::WorkingSet;
