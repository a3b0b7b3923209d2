//! Novelty scoring and gating
//!
//! Novelty is measured against the long-term store: an event that closely
//! resembles something already remembered scores low, one unlike anything
//! stored scores high. The score is classified into three bands, optionally
//! sharpened, and combined with significance into a gate decision.

use serde::{Deserialize, Serialize};

use crate::config::{ScorerConfig, SensitivityMode};
use crate::error::Result;
use crate::storage::LongTermStore;

/// Weight of novelty in the gate score
pub const GATE_NOVELTY_WEIGHT: f64 = 0.6;
/// Weight of significance in the gate score
pub const GATE_SIGNIFICANCE_WEIGHT: f64 = 0.4;
/// Significance assumed when the caller does not supply one
pub const DEFAULT_GATE_SIGNIFICANCE: f64 = 0.5;

/// Novelty band of a single event
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EventType {
    /// Routine noise, close to something already remembered
    Chaos,
    /// Building block, moderately new
    Foundation,
    /// Breakthrough, unlike anything remembered
    Glow,
}

impl EventType {
    pub fn as_str(&self) -> &'static str {
        match self {
            EventType::Chaos => "chaos",
            EventType::Foundation => "foundation",
            EventType::Glow => "glow",
        }
    }
}

impl std::fmt::Display for EventType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Result of scoring one event
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct NoveltyScore {
    /// Novelty after the mode adjustment
    pub novelty: f64,
    /// `1 - nearest similarity`, or 1.0 with nothing stored
    pub raw_novelty: f64,
    pub event_type: EventType,
    pub should_process: bool,
    /// Similarity of the nearest stored record, `None` when nothing was found
    pub nearest_neighbor_similarity: Option<f64>,
    /// `0.6·novelty + 0.4·significance`
    pub gate_score: f64,
}

/// Scorer configuration snapshot, for reporting
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct ScorerStats {
    pub memory_count: usize,
    pub mode: SensitivityMode,
    pub chaos_threshold: f64,
    pub glow_threshold: f64,
    pub gate_threshold: f64,
}

/// Scores events against a long-term store using a validated, immutable
/// configuration.
#[derive(Debug, Clone)]
pub struct NoveltyScorer {
    config: ScorerConfig,
}

impl NoveltyScorer {
    /// Fails with `InvalidConfiguration` unless `0 <= chaos < glow <= 1`
    pub fn new(config: ScorerConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self { config })
    }

    pub fn config(&self) -> &ScorerConfig {
        &self.config
    }

    /// Score one event whose embedding was already computed.
    ///
    /// An empty store (or one without any embedded record) is a defined
    /// branch: novelty is 1.0 and no similarity is reported.
    pub fn score_event(
        &self,
        store: &LongTermStore,
        text: &str,
        embedding: &[f32],
        significance: Option<f64>,
    ) -> Result<NoveltyScore> {
        let nearest = store
            .query_similar(embedding, 1, f64::NEG_INFINITY)?
            .into_iter()
            .next()
            .map(|m| m.similarity);

        let raw_novelty = match nearest {
            Some(similarity) => novelty_from_similarity(similarity),
            None => 1.0,
        };

        let event_type = self.classify(raw_novelty);
        let novelty = self.adjust(raw_novelty, event_type);
        let significance = significance.unwrap_or(DEFAULT_GATE_SIGNIFICANCE);
        let gate_score = gate_score(novelty, significance);
        let should_process = gate_score >= self.config.gate_threshold;

        tracing::debug!(
            text_len = text.len(),
            raw_novelty,
            novelty,
            event_type = event_type.as_str(),
            gate_score,
            should_process,
            "Scored event"
        );

        Ok(NoveltyScore {
            novelty,
            raw_novelty,
            event_type,
            should_process,
            nearest_neighbor_similarity: nearest,
            gate_score,
        })
    }

    /// Chaos at or below the chaos threshold, glow at or above the glow
    /// threshold, foundation in between.
    pub fn classify(&self, novelty: f64) -> EventType {
        if novelty <= self.config.chaos_threshold {
            EventType::Chaos
        } else if novelty >= self.config.glow_threshold {
            EventType::Glow
        } else {
            EventType::Foundation
        }
    }

    /// Heightened mode amplifies glow (capped at 1.0) and suppresses chaos
    pub fn adjust(&self, novelty: f64, event_type: EventType) -> f64 {
        match (self.config.mode, event_type) {
            (SensitivityMode::Disabled, _) => novelty,
            (SensitivityMode::Heightened, EventType::Glow) => {
                (novelty * self.config.glow_amplification).min(1.0)
            }
            (SensitivityMode::Heightened, EventType::Chaos) => {
                novelty * self.config.chaos_suppression
            }
            (SensitivityMode::Heightened, EventType::Foundation) => novelty,
        }
    }

    pub fn stats(&self, store: &LongTermStore) -> ScorerStats {
        ScorerStats {
            memory_count: store.len(),
            mode: self.config.mode,
            chaos_threshold: self.config.chaos_threshold,
            glow_threshold: self.config.glow_threshold,
            gate_threshold: self.config.gate_threshold,
        }
    }
}

/// `1 - similarity`, clamped to [0, 1] so anti-correlated vectors count as
/// fully novel.
pub fn novelty_from_similarity(similarity: f64) -> f64 {
    (1.0 - similarity).clamp(0.0, 1.0)
}

/// `0.6·novelty + 0.4·significance`
pub fn gate_score(novelty: f64, significance: f64) -> f64 {
    GATE_NOVELTY_WEIGHT * novelty + GATE_SIGNIFICANCE_WEIGHT * significance
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::SalienceError;
    use crate::memory::DecayingRecord;

    fn scorer() -> NoveltyScorer {
        NoveltyScorer::new(ScorerConfig::default()).unwrap()
    }

    fn disabled_scorer() -> NoveltyScorer {
        NoveltyScorer::new(ScorerConfig {
            mode: SensitivityMode::Disabled,
            ..ScorerConfig::default()
        })
        .unwrap()
    }

    fn store_with(embedding: Vec<f32>) -> LongTermStore {
        let mut store = LongTermStore::new();
        store
            .consolidate(DecayingRecord::new("stored").with_embedding(embedding), 0.7)
            .unwrap();
        store
    }

    #[test]
    fn test_inverted_thresholds_fail_fast() {
        let err = NoveltyScorer::new(ScorerConfig {
            chaos_threshold: 0.9,
            glow_threshold: 0.2,
            ..ScorerConfig::default()
        })
        .unwrap_err();
        assert!(matches!(err, SalienceError::InvalidConfiguration(_)));
    }

    #[test]
    fn test_classify_bands() {
        let scorer = scorer();
        assert_eq!(scorer.classify(0.0), EventType::Chaos);
        assert_eq!(scorer.classify(0.3), EventType::Chaos);
        assert_eq!(scorer.classify(0.31), EventType::Foundation);
        assert_eq!(scorer.classify(0.65), EventType::Foundation);
        assert_eq!(scorer.classify(0.79), EventType::Foundation);
        assert_eq!(scorer.classify(0.8), EventType::Glow);
        assert_eq!(scorer.classify(1.0), EventType::Glow);
    }

    #[test]
    fn test_classify_uses_configured_thresholds() {
        let scorer = NoveltyScorer::new(ScorerConfig {
            chaos_threshold: 0.1,
            glow_threshold: 0.5,
            ..ScorerConfig::default()
        })
        .unwrap();
        assert_eq!(scorer.classify(0.2), EventType::Foundation);
        assert_eq!(scorer.classify(0.5), EventType::Glow);
        assert_eq!(scorer.classify(0.1), EventType::Chaos);
    }

    #[test]
    fn test_heightened_adjustments() {
        let scorer = scorer();
        assert!((scorer.adjust(0.9, EventType::Glow) - 1.0).abs() < 1e-12);
        assert!((scorer.adjust(0.8, EventType::Glow) - 0.96).abs() < 1e-12);
        assert!((scorer.adjust(0.25, EventType::Chaos) - 0.2).abs() < 1e-12);
        assert_eq!(scorer.adjust(0.5, EventType::Foundation), 0.5);
    }

    #[test]
    fn test_disabled_mode_passes_through() {
        let scorer = disabled_scorer();
        assert_eq!(scorer.adjust(0.9, EventType::Glow), 0.9);
        assert_eq!(scorer.adjust(0.25, EventType::Chaos), 0.25);
    }

    #[test]
    fn test_empty_store_is_fully_novel() {
        let scorer = scorer();
        let store = LongTermStore::new();
        let score = scorer
            .score_event(&store, "first thought", &[0.2, 0.4, 0.1], None)
            .unwrap();

        assert_eq!(score.raw_novelty, 1.0);
        assert_eq!(score.event_type, EventType::Glow);
        assert_eq!(score.novelty, 1.0);
        assert!(score.nearest_neighbor_similarity.is_none());
        assert!(score.should_process);
    }

    #[test]
    fn test_identical_event_is_chaos_and_gated() {
        let scorer = scorer();
        let store = store_with(vec![0.5, 0.1, 0.7]);
        let score = scorer
            .score_event(&store, "again", &[0.5, 0.1, 0.7], None)
            .unwrap();

        assert_eq!(score.nearest_neighbor_similarity, Some(1.0));
        assert_eq!(score.raw_novelty, 0.0);
        assert_eq!(score.event_type, EventType::Chaos);
        assert_eq!(score.novelty, 0.0);
        assert!((score.gate_score - 0.2).abs() < 1e-12);
        assert!(!score.should_process);
    }

    #[test]
    fn test_significance_can_open_gate() {
        let scorer = scorer();
        let store = store_with(vec![1.0, 0.0]);
        // orthogonal: novelty 1.0 regardless of significance
        let score = scorer
            .score_event(&store, "new", &[0.0, 1.0], Some(0.0))
            .unwrap();
        assert!((score.gate_score - 0.6).abs() < 1e-12);
        assert!(score.should_process);

        // identical but very significant: 0.4 < 0.5 still closed
        let score = scorer
            .score_event(&store, "same", &[1.0, 0.0], Some(1.0))
            .unwrap();
        assert!((score.gate_score - 0.4).abs() < 1e-12);
        assert!(!score.should_process);
    }

    #[test]
    fn test_anti_correlated_neighbor_is_fully_novel() {
        let scorer = scorer();
        let store = store_with(vec![1.0, 0.0]);
        let score = scorer
            .score_event(&store, "opposite", &[-1.0, 0.0], None)
            .unwrap();
        assert_eq!(score.nearest_neighbor_similarity, Some(-1.0));
        assert_eq!(score.raw_novelty, 1.0);
    }

    #[test]
    fn test_dimension_mismatch_propagates() {
        let scorer = scorer();
        let store = store_with(vec![1.0, 0.0, 0.0]);
        let err = scorer
            .score_event(&store, "short", &[1.0, 0.0], None)
            .unwrap_err();
        assert!(matches!(err, SalienceError::DimensionMismatch { .. }));
    }

    #[test]
    fn test_novelty_monotonic_in_similarity() {
        let mut previous = f64::INFINITY;
        for step in 0..=100 {
            let similarity = step as f64 / 100.0;
            let novelty = novelty_from_similarity(similarity);
            assert!(novelty <= previous);
            previous = novelty;
        }
        assert_eq!(novelty_from_similarity(0.0), 1.0);
        assert_eq!(novelty_from_similarity(1.0), 0.0);
    }

    #[test]
    fn test_stats_report_configuration() {
        let scorer = scorer();
        let store = store_with(vec![1.0, 0.0]);
        let stats = scorer.stats(&store);
        assert_eq!(stats.memory_count, 1);
        assert_eq!(stats.mode, SensitivityMode::Heightened);
        assert_eq!(stats.chaos_threshold, 0.3);
        assert_eq!(stats.glow_threshold, 0.8);
        assert_eq!(stats.gate_threshold, 0.5);
    }

    #[test]
    fn test_event_type_display() {
        assert_eq!(EventType::Glow.to_string(), "glow");
        assert_eq!(
            serde_json::to_string(&EventType::Foundation).unwrap(),
            "\"foundation\""
        );
    }
}
