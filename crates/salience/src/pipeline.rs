//! Salience pipeline orchestration
//!
//! Drives one event through scoring, gating, the working set and, when it
//! is significant enough, consolidation into long-term memory. The pipeline
//! owns no clock: callers decide when to [`Pipeline::tick`] decay and when
//! to run a [`Pipeline::consolidate_ready`] pass.

use std::collections::BTreeMap;

use serde::Serialize;
use uuid::Uuid;

use crate::config::{Config, PipelineConfig, SensitivityMode, StoreConfig, WorkingSetConfig};
use crate::error::Result;
use crate::memory::DecayingRecord;
use crate::providers::{Embedder, Sentiment, SentimentAnalyzer};
use crate::scorer::{EventType, NoveltyScore, NoveltyScorer};
use crate::storage::{ConsolidationOutcome, LongTermStore, SharedStore};
use crate::working_set::WorkingSet;

/// One event with its collaborator outputs already resolved
#[derive(Debug, Clone, Default)]
pub struct EventInput {
    pub content: String,
    pub embedding: Vec<f32>,
    pub sentiment: Sentiment,
    /// Falls back to `pipeline.default_significance`
    pub significance: Option<f64>,
    pub metadata: BTreeMap<String, serde_json::Value>,
}

impl EventInput {
    pub fn new(content: impl Into<String>, embedding: Vec<f32>) -> Self {
        Self {
            content: content.into(),
            embedding,
            ..Default::default()
        }
    }

    pub fn with_sentiment(mut self, sentiment: Sentiment) -> Self {
        self.sentiment = sentiment;
        self
    }

    pub fn with_significance(mut self, significance: f64) -> Self {
        self.significance = Some(significance);
        self
    }

    pub fn with_metadata(mut self, key: impl Into<String>, value: serde_json::Value) -> Self {
        self.metadata.insert(key.into(), value);
        self
    }
}

/// What happened to one processed event
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ProcessOutcome {
    /// Id of the record built for the event, `None` when the gate rejected it
    pub record_id: Option<Uuid>,
    pub score: NoveltyScore,
    pub sentiment: Sentiment,
    pub is_flashbulb: bool,
    /// Whether the event passed the attention gate
    pub admitted: bool,
    /// Set when the event was consolidated immediately
    pub consolidation: Option<ConsolidationOutcome>,
}

/// Records removed by one decay tick
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub struct DecayReport {
    pub working_set_pruned: usize,
    pub long_term_pruned: usize,
}

/// Pipeline state for reporting
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PipelineStats {
    pub working_set_count: usize,
    pub working_set_capacity: usize,
    pub long_term_count: usize,
    pub mode: SensitivityMode,
    pub chaos_threshold: f64,
    pub glow_threshold: f64,
    pub gate_threshold: f64,
    pub consolidation_threshold: f64,
}

/// Scorer, working set and long-term store wired together
#[derive(Debug)]
pub struct Pipeline {
    scorer: NoveltyScorer,
    working_set: WorkingSet,
    store: SharedStore,
    config: PipelineConfig,
    working_set_config: WorkingSetConfig,
    store_config: StoreConfig,
}

impl Pipeline {
    /// Build a pipeline with its own empty store
    pub fn new(config: &Config) -> Result<Self> {
        let store = SharedStore::new(LongTermStore::from_config(&config.store)?);
        Self::with_store(config, store)
    }

    /// Build a pipeline over an existing (possibly shared) store.
    ///
    /// The store keeps its own merge boost and dimension; `config.store`
    /// only supplies the similarity threshold and pruning floor here. A
    /// mismatch with the configured values is logged.
    pub fn with_store(config: &Config, store: SharedStore) -> Result<Self> {
        config.validate()?;
        {
            let shared = store.read();
            if config
                .store
                .dimension
                .is_some_and(|dimension| shared.dimension() != Some(dimension))
            {
                tracing::warn!(
                    configured = config.store.dimension,
                    store = shared.dimension(),
                    "Configured store dimension ignored for shared store"
                );
            }
            if shared.merge_boost() != config.store.merge_boost {
                tracing::warn!(
                    configured = config.store.merge_boost,
                    store = shared.merge_boost(),
                    "Configured merge boost ignored for shared store"
                );
            }
        }
        Ok(Self {
            scorer: NoveltyScorer::new(config.scorer)?,
            working_set: WorkingSet::new(config.working_set.capacity)?,
            store,
            config: config.pipeline,
            working_set_config: config.working_set,
            store_config: config.store,
        })
    }

    pub fn store(&self) -> &SharedStore {
        &self.store
    }

    pub fn working_set(&self) -> &WorkingSet {
        &self.working_set
    }

    pub fn scorer(&self) -> &NoveltyScorer {
        &self.scorer
    }

    /// Score, gate and admit one event.
    ///
    /// An admitted event that is a flashbulb, a glow, or at least as novel as
    /// the consolidation threshold goes straight to long-term memory when
    /// immediate consolidation is enabled (the default). Such an event never
    /// enters the working set, so it is never consolidated a second time by
    /// [`Pipeline::consolidate_ready`]. Any other admitted event, or every
    /// admitted event with `pipeline.immediate_consolidation = false`, waits
    /// in the working set.
    pub fn process(&mut self, event: EventInput) -> Result<ProcessOutcome> {
        let sentiment = event.sentiment.clamped();
        let significance = event
            .significance
            .unwrap_or(self.config.default_significance);

        let score = {
            let store = self.store.read();
            self.scorer
                .score_event(&store, &event.content, &event.embedding, Some(significance))?
        };

        let is_flashbulb = sentiment.arousal > self.config.flashbulb_arousal
            && score.novelty > self.config.flashbulb_novelty;

        if !score.should_process {
            tracing::debug!(
                gate_score = score.gate_score,
                "Event rejected by attention gate"
            );
            return Ok(ProcessOutcome {
                record_id: None,
                score,
                sentiment,
                is_flashbulb,
                admitted: false,
                consolidation: None,
            });
        }

        let record = DecayingRecord::new(event.content)
            .with_embedding(event.embedding)
            .with_significance(significance)
            .with_novelty(score.novelty)
            .with_valence(sentiment.valence)
            .with_decay_rate(self.config.default_decay_rate)
            .with_metadata(event.metadata);
        let record_id = record.id();

        let consolidation = if self.config.immediate_consolidation
            && self.consolidates_immediately(&score, is_flashbulb)
        {
            tracing::info!(
                %record_id,
                is_flashbulb,
                event_type = score.event_type.as_str(),
                novelty = score.novelty,
                "Consolidating event immediately"
            );
            Some(
                self.store
                    .consolidate(record, self.store_config.similarity_threshold)?,
            )
        } else {
            let evicted = self.working_set.add(record);
            if !evicted.is_empty() {
                tracing::debug!(evicted = evicted.len(), "Working set over capacity");
            }
            None
        };

        Ok(ProcessOutcome {
            record_id: Some(record_id),
            score,
            sentiment,
            is_flashbulb,
            admitted: true,
            consolidation,
        })
    }

    /// Resolve embedding and sentiment for `text`, then [`Pipeline::process`] it
    pub fn process_text(
        &mut self,
        text: &str,
        embedder: &dyn Embedder,
        analyzer: &dyn SentimentAnalyzer,
        significance: Option<f64>,
    ) -> Result<ProcessOutcome> {
        let embedding = embedder.embed(text)?;
        let sentiment = analyzer.analyze(text);
        self.process(EventInput {
            content: text.to_string(),
            embedding,
            sentiment,
            significance,
            metadata: BTreeMap::new(),
        })
    }

    /// Promote every working-set record whose salience meets the
    /// consolidation threshold, in insertion order.
    ///
    /// The pass is all or nothing: if any candidate cannot be stored, nothing
    /// is written and the working set keeps every record in its original
    /// order.
    pub fn consolidate_ready(&mut self) -> Result<Vec<ConsolidationOutcome>> {
        let threshold = self.config.consolidation_threshold;
        let candidates: Vec<DecayingRecord> = self
            .working_set
            .consolidation_candidates(threshold)
            .into_iter()
            .cloned()
            .collect();
        if candidates.is_empty() {
            return Ok(Vec::new());
        }

        let outcomes = self
            .store
            .consolidate_all(candidates, self.store_config.similarity_threshold)?;
        self.working_set.take_consolidation_candidates(threshold);

        let merged = outcomes.iter().filter(|o| o.is_merged()).count();
        tracing::info!(
            promoted = outcomes.len(),
            merged,
            "Consolidated working set"
        );
        Ok(outcomes)
    }

    /// Decay both tiers by `elapsed`, then prune each below its floor
    pub fn tick(&mut self, elapsed: f64) -> Result<DecayReport> {
        self.working_set.apply_decay(elapsed)?;
        self.store.apply_decay(elapsed)?;

        let report = DecayReport {
            working_set_pruned: self
                .working_set
                .prune_decayed(self.working_set_config.min_significance),
            long_term_pruned: self.store.prune(self.store_config.min_significance),
        };
        tracing::debug!(
            elapsed,
            working_set_pruned = report.working_set_pruned,
            long_term_pruned = report.long_term_pruned,
            "Decay tick"
        );
        Ok(report)
    }

    pub fn stats(&self) -> PipelineStats {
        let scorer = self.scorer.stats(&self.store.read());
        PipelineStats {
            working_set_count: self.working_set.len(),
            working_set_capacity: self.working_set.capacity(),
            long_term_count: scorer.memory_count,
            mode: scorer.mode,
            chaos_threshold: scorer.chaos_threshold,
            glow_threshold: scorer.glow_threshold,
            gate_threshold: scorer.gate_threshold,
            consolidation_threshold: self.config.consolidation_threshold,
        }
    }

    /// Snapshot of every long-term memory in insertion order
    pub fn export_memories(&self) -> Vec<DecayingRecord> {
        self.store.snapshot()
    }

    pub fn clear_working_set(&mut self) {
        self.working_set.clear();
    }

    fn consolidates_immediately(&self, score: &NoveltyScore, is_flashbulb: bool) -> bool {
        is_flashbulb
            || score.event_type == EventType::Glow
            || score.novelty >= self.config.consolidation_threshold
    }
}
