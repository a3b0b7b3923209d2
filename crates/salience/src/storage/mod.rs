//! Long-term storage
//!
//! In-memory long-term store with exact similarity search, and a shared
//! handle for pipelines that use one store together.

pub mod long_term;
pub mod shared;

pub use long_term::{
    ConsolidationOutcome, DEFAULT_MERGE_BOOST, LongTermStore, RETRIEVAL_THRESHOLD, SimilarRecord,
};
pub use shared::SharedStore;
