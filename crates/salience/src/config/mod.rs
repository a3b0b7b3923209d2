use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::error::{Result, SalienceError};

/// Main configuration structure for the salience pipeline
#[derive(Debug, Clone, Deserialize, Serialize, Default, PartialEq)]
pub struct Config {
    /// Novelty scoring and gating
    #[serde(default)]
    pub scorer: ScorerConfig,
    /// Bounded working set
    #[serde(default)]
    pub working_set: WorkingSetConfig,
    /// Long-term store consolidation
    #[serde(default)]
    pub store: StoreConfig,
    /// Pipeline orchestration
    #[serde(default)]
    pub pipeline: PipelineConfig,
    /// Built-in hashing embedder
    #[serde(default)]
    pub embedding: EmbeddingConfig,
}

impl Config {
    /// Parse and validate a TOML document
    pub fn from_toml_str(content: &str) -> Result<Self> {
        let config: Config = toml::from_str(content)
            .map_err(|e| SalienceError::Config(format!("Failed to parse config: {e}")))?;
        config.validate()?;
        Ok(config)
    }

    /// Load configuration from an explicit path, or from the first default
    /// location that exists, falling back to defaults.
    pub fn load(config_path: Option<&Path>) -> Result<Self> {
        if let Some(path) = config_path {
            tracing::info!("Loading config from: {}", path.display());
            return Self::from_file(path);
        }

        for path in default_config_paths() {
            if path.exists() {
                tracing::info!("Loading config from: {}", path.display());
                return Self::from_file(&path);
            }
        }

        tracing::info!("No config file found, using defaults");
        Ok(Config::default())
    }

    fn from_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path).map_err(|e| {
            SalienceError::Config(format!(
                "Failed to read config file {}: {}",
                path.display(),
                e
            ))
        })?;
        Self::from_toml_str(&content)
    }

    /// Check every section. Thresholds are never silently reordered.
    pub fn validate(&self) -> Result<()> {
        self.scorer.validate()?;
        self.working_set.validate()?;
        self.store.validate()?;
        self.pipeline.validate()?;
        self.embedding.validate()
    }
}

fn default_config_paths() -> Vec<PathBuf> {
    [
        dirs::home_dir().map(|h| h.join(".salience").join("config.toml")),
        dirs::config_dir().map(|c| c.join("salience").join("config.toml")),
        Some(PathBuf::from("config.toml")),
    ]
    .into_iter()
    .flatten()
    .collect()
}

fn check_unit(name: &str, value: f64) -> Result<()> {
    if !(0.0..=1.0).contains(&value) {
        return Err(SalienceError::InvalidConfiguration(format!(
            "{name} must be within [0, 1], got {value}"
        )));
    }
    Ok(())
}

fn check_factor(name: &str, value: f64) -> Result<()> {
    if !value.is_finite() || value < 0.0 {
        return Err(SalienceError::InvalidConfiguration(format!(
            "{name} must be a finite non-negative factor, got {value}"
        )));
    }
    Ok(())
}

/// Whether the scorer amplifies breakthroughs and dampens routine events
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum SensitivityMode {
    /// Glow novelty amplified, chaos novelty suppressed
    #[default]
    Heightened,
    /// Raw novelty passed through unchanged
    Disabled,
}

impl SensitivityMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            SensitivityMode::Heightened => "heightened",
            SensitivityMode::Disabled => "disabled",
        }
    }
}

/// Novelty classification and gate configuration
#[derive(Debug, Clone, Copy, Deserialize, Serialize, PartialEq)]
pub struct ScorerConfig {
    /// Novelty at or below this is routine noise
    #[serde(default = "default_chaos_threshold")]
    pub chaos_threshold: f64,
    /// Novelty at or above this is a breakthrough
    #[serde(default = "default_glow_threshold")]
    pub glow_threshold: f64,
    /// Multiplier applied to glow novelty in heightened mode (result capped at 1.0)
    #[serde(default = "default_glow_amplification")]
    pub glow_amplification: f64,
    /// Multiplier applied to chaos novelty in heightened mode
    #[serde(default = "default_chaos_suppression")]
    pub chaos_suppression: f64,
    /// Minimum gate score for an event to enter the working set
    #[serde(default = "default_gate_threshold")]
    pub gate_threshold: f64,
    #[serde(default)]
    pub mode: SensitivityMode,
}

impl Default for ScorerConfig {
    fn default() -> Self {
        Self {
            chaos_threshold: default_chaos_threshold(),
            glow_threshold: default_glow_threshold(),
            glow_amplification: default_glow_amplification(),
            chaos_suppression: default_chaos_suppression(),
            gate_threshold: default_gate_threshold(),
            mode: SensitivityMode::default(),
        }
    }
}

impl ScorerConfig {
    /// Requires `0 <= chaos_threshold < glow_threshold <= 1`
    pub fn validate(&self) -> Result<()> {
        check_unit("scorer.chaos_threshold", self.chaos_threshold)?;
        check_unit("scorer.glow_threshold", self.glow_threshold)?;
        if self.chaos_threshold >= self.glow_threshold {
            return Err(SalienceError::InvalidConfiguration(format!(
                "scorer.chaos_threshold ({}) must be below scorer.glow_threshold ({})",
                self.chaos_threshold, self.glow_threshold
            )));
        }
        check_unit("scorer.gate_threshold", self.gate_threshold)?;
        check_factor("scorer.glow_amplification", self.glow_amplification)?;
        check_factor("scorer.chaos_suppression", self.chaos_suppression)
    }
}

fn default_chaos_threshold() -> f64 {
    0.3
}

fn default_glow_threshold() -> f64 {
    0.8
}

fn default_glow_amplification() -> f64 {
    1.2
}

fn default_chaos_suppression() -> f64 {
    0.8
}

fn default_gate_threshold() -> f64 {
    0.5
}

/// Working set configuration
#[derive(Debug, Clone, Copy, Deserialize, Serialize, PartialEq)]
pub struct WorkingSetConfig {
    /// Maximum number of records held before eviction
    #[serde(default = "default_working_set_capacity")]
    pub capacity: usize,
    /// Records whose significance decays below this are pruned on tick
    #[serde(default = "default_working_set_min_significance")]
    pub min_significance: f64,
}

impl Default for WorkingSetConfig {
    fn default() -> Self {
        Self {
            capacity: default_working_set_capacity(),
            min_significance: default_working_set_min_significance(),
        }
    }
}

impl WorkingSetConfig {
    pub fn validate(&self) -> Result<()> {
        if self.capacity == 0 {
            return Err(SalienceError::InvalidConfiguration(
                "working_set.capacity must be at least 1".to_string(),
            ));
        }
        check_unit("working_set.min_significance", self.min_significance)
    }
}

fn default_working_set_capacity() -> usize {
    50
}

fn default_working_set_min_significance() -> f64 {
    0.1
}

/// Long-term store configuration
#[derive(Debug, Clone, Copy, Deserialize, Serialize, PartialEq)]
pub struct StoreConfig {
    /// Cosine similarity at or above which a candidate merges into an existing record
    #[serde(default = "default_similarity_threshold")]
    pub similarity_threshold: f64,
    /// Significance multiplier applied to the existing record on merge (capped at 1.0)
    #[serde(default = "default_merge_boost")]
    pub merge_boost: f64,
    /// Records whose significance decays below this are pruned on tick
    #[serde(default = "default_store_min_significance")]
    pub min_significance: f64,
    /// Fixed embedding dimension; established by the first insert when unset
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub dimension: Option<usize>,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            similarity_threshold: default_similarity_threshold(),
            merge_boost: default_merge_boost(),
            min_significance: default_store_min_significance(),
            dimension: None,
        }
    }
}

impl StoreConfig {
    pub fn validate(&self) -> Result<()> {
        if !(-1.0..=1.0).contains(&self.similarity_threshold) {
            return Err(SalienceError::InvalidConfiguration(format!(
                "store.similarity_threshold must be within [-1, 1], got {}",
                self.similarity_threshold
            )));
        }
        check_factor("store.merge_boost", self.merge_boost)?;
        check_unit("store.min_significance", self.min_significance)?;
        if self.dimension == Some(0) {
            return Err(SalienceError::InvalidConfiguration(
                "store.dimension must be at least 1".to_string(),
            ));
        }
        Ok(())
    }
}

fn default_similarity_threshold() -> f64 {
    0.7
}

fn default_merge_boost() -> f64 {
    1.2
}

fn default_store_min_significance() -> f64 {
    0.2
}

/// Pipeline orchestration configuration
#[derive(Debug, Clone, Copy, Deserialize, Serialize, PartialEq)]
pub struct PipelineConfig {
    /// Salience (working set) or novelty (immediate) needed for consolidation
    #[serde(default = "default_consolidation_threshold")]
    pub consolidation_threshold: f64,
    /// Significance used when the caller supplies none
    #[serde(default = "default_significance")]
    pub default_significance: f64,
    /// Decay rate given to newly built records
    #[serde(default = "default_decay_rate")]
    pub default_decay_rate: f64,
    /// Arousal above which an event may be a flashbulb memory
    #[serde(default = "default_flashbulb_arousal")]
    pub flashbulb_arousal: f64,
    /// Novelty above which an event may be a flashbulb memory
    #[serde(default = "default_flashbulb_novelty")]
    pub flashbulb_novelty: f64,
    /// Consolidate flashbulb, glow and highly novel events as soon as they are admitted
    #[serde(default = "default_immediate_consolidation")]
    pub immediate_consolidation: bool,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            consolidation_threshold: default_consolidation_threshold(),
            default_significance: default_significance(),
            default_decay_rate: default_decay_rate(),
            flashbulb_arousal: default_flashbulb_arousal(),
            flashbulb_novelty: default_flashbulb_novelty(),
            immediate_consolidation: default_immediate_consolidation(),
        }
    }
}

impl PipelineConfig {
    pub fn validate(&self) -> Result<()> {
        check_unit("pipeline.consolidation_threshold", self.consolidation_threshold)?;
        check_unit("pipeline.default_significance", self.default_significance)?;
        check_unit("pipeline.default_decay_rate", self.default_decay_rate)?;
        check_unit("pipeline.flashbulb_arousal", self.flashbulb_arousal)?;
        check_unit("pipeline.flashbulb_novelty", self.flashbulb_novelty)
    }
}

fn default_consolidation_threshold() -> f64 {
    0.7
}

fn default_significance() -> f64 {
    0.5
}

fn default_decay_rate() -> f64 {
    0.1
}

fn default_flashbulb_arousal() -> f64 {
    0.7
}

fn default_flashbulb_novelty() -> f64 {
    0.7
}

fn default_immediate_consolidation() -> bool {
    true
}

/// Hashing embedder configuration
#[derive(Debug, Clone, Copy, Deserialize, Serialize, PartialEq)]
pub struct EmbeddingConfig {
    /// Number of hash buckets (vector length)
    #[serde(default = "default_embedding_dimension")]
    pub dimension: usize,
}

impl Default for EmbeddingConfig {
    fn default() -> Self {
        Self {
            dimension: default_embedding_dimension(),
        }
    }
}

impl EmbeddingConfig {
    pub fn validate(&self) -> Result<()> {
        if self.dimension == 0 {
            return Err(SalienceError::InvalidConfiguration(
                "embedding.dimension must be at least 1".to_string(),
            ));
        }
        Ok(())
    }
}

fn default_embedding_dimension() -> usize {
    384
}
