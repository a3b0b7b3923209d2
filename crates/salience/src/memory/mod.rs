//! Memory records and similarity
//!
//! Defines the decaying record that flows through the working set into the
//! long-term store, and the similarity measure used to compare them.

pub mod record;
pub mod similarity;

pub use record::DecayingRecord;
pub use similarity::{SimilarityFn, cosine_similarity};
