use std::collections::BTreeMap;
use std::fs::File;
use std::io::{self, BufRead, BufReader};
use std::path::PathBuf;

use clap::Parser;
use comfy_table::{ContentArrangement, Table, presets::UTF8_FULL_CONDENSED};
use salience::config::Config;
use salience::pipeline::{EventInput, Pipeline, PipelineStats, ProcessOutcome};
use salience::providers::{
    Embedder, HashingEmbedder, LexiconAnalyzer, Sentiment, SentimentAnalyzer, emotion_label,
};
use salience::storage::ConsolidationOutcome;
use salience::{DecayingRecord, EventType};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::CliResult;
use crate::output::{OutputFormat, format_score, format_timestamp, truncate_string};

#[derive(Parser)]
pub struct ReplayCommand {
    #[clap(help = "JSONL event file, or - for stdin")]
    pub input: PathBuf,

    #[clap(long, help = "Decay both memory tiers by this many seconds after every event")]
    pub decay_step: Option<f64>,

    #[clap(long, help = "Run a consolidation pass after every N events")]
    pub consolidate_every: Option<usize>,

    #[clap(long, help = "List long-term memories after the replay")]
    pub show_memories: bool,
}

/// One line of the replay input
#[derive(Debug, Clone, Deserialize)]
pub struct EventLine {
    pub content: String,
    #[serde(default)]
    pub embedding: Option<Vec<f32>>,
    #[serde(default)]
    pub valence: Option<f64>,
    #[serde(default)]
    pub arousal: Option<f64>,
    #[serde(default)]
    pub significance: Option<f64>,
    #[serde(default)]
    pub metadata: BTreeMap<String, serde_json::Value>,
}

#[derive(Debug, Clone, Serialize)]
pub struct EventRow {
    pub line: usize,
    pub record_id: Option<Uuid>,
    pub content: String,
    pub novelty: f64,
    pub event_type: EventType,
    pub gate_score: f64,
    pub valence: f64,
    pub arousal: f64,
    pub emotion: &'static str,
    pub is_flashbulb: bool,
    pub action: &'static str,
}

impl EventRow {
    fn new(line: usize, content: String, outcome: &ProcessOutcome) -> Self {
        let action = match (outcome.admitted, &outcome.consolidation) {
            (false, _) => "gated",
            (true, None) => "working_set",
            (true, Some(ConsolidationOutcome::Inserted { .. })) => "inserted",
            (true, Some(ConsolidationOutcome::Merged { .. })) => "merged",
        };
        Self {
            line,
            record_id: outcome.record_id,
            content,
            novelty: outcome.score.novelty,
            event_type: outcome.score.event_type,
            gate_score: outcome.score.gate_score,
            valence: outcome.sentiment.valence,
            arousal: outcome.sentiment.arousal,
            emotion: emotion_label(outcome.sentiment.valence, outcome.sentiment.arousal),
            is_flashbulb: outcome.is_flashbulb,
            action,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct ReplayReport {
    pub events: Vec<EventRow>,
    pub consolidated: usize,
    pub merged: usize,
    pub working_set_pruned: usize,
    pub long_term_pruned: usize,
    pub stats: PipelineStats,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub memories: Option<Vec<DecayingRecord>>,
}

impl ReplayCommand {
    pub fn execute(&self, config: &Config, format: OutputFormat) -> CliResult<()> {
        let reader: Box<dyn BufRead> = if self.input.as_os_str() == "-" {
            Box::new(io::stdin().lock())
        } else {
            let file = File::open(&self.input).map_err(|e| {
                format!("Failed to open {}: {e}", self.input.display())
            })?;
            Box::new(BufReader::new(file))
        };

        let report = self.replay(reader, config)?;

        match format {
            OutputFormat::Json => {
                println!("{}", serde_json::to_string_pretty(&report)?);
            }
            OutputFormat::Table => print_report(&report),
        }
        Ok(())
    }

    /// Run every event in `reader` through a fresh pipeline
    pub fn replay<R: BufRead>(&self, reader: R, config: &Config) -> CliResult<ReplayReport> {
        if let Some(step) = self.decay_step.filter(|s| !s.is_finite() || *s < 0.0) {
            return Err(format!("--decay-step must be a non-negative number, got {step}").into());
        }
        if self.consolidate_every == Some(0) {
            return Err("--consolidate-every must be at least 1".into());
        }

        let mut pipeline = Pipeline::new(config)?;
        let embedder = HashingEmbedder::from_config(&config.embedding)?;
        let analyzer = LexiconAnalyzer::new();

        let mut events = Vec::new();
        let mut consolidated = 0;
        let mut merged = 0;
        let mut working_set_pruned = 0;
        let mut long_term_pruned = 0;

        for (idx, line) in reader.lines().enumerate() {
            let line_no = idx + 1;
            let line = line?;
            if line.trim().is_empty() {
                continue;
            }

            let event: EventLine = serde_json::from_str(&line)
                .map_err(|e| format!("line {line_no}: invalid event: {e}"))?;
            let content = event.content.clone();
            let input = resolve_event(event, &embedder, &analyzer)?;
            let outcome = pipeline
                .process(input)
                .map_err(|e| format!("line {line_no}: {e}"))?;

            if let Some(consolidation) = &outcome.consolidation {
                consolidated += 1;
                merged += usize::from(consolidation.is_merged());
            }
            events.push(EventRow::new(line_no, content, &outcome));

            if let Some(step) = self.decay_step {
                let report = pipeline.tick(step)?;
                working_set_pruned += report.working_set_pruned;
                long_term_pruned += report.long_term_pruned;
            }

            if self
                .consolidate_every
                .is_some_and(|every| events.len() % every == 0)
            {
                let outcomes = pipeline.consolidate_ready()?;
                consolidated += outcomes.len();
                merged += outcomes.iter().filter(|o| o.is_merged()).count();
            }
        }

        tracing::info!(
            events = events.len(),
            consolidated,
            merged,
            "Replay finished"
        );

        Ok(ReplayReport {
            events,
            consolidated,
            merged,
            working_set_pruned,
            long_term_pruned,
            stats: pipeline.stats(),
            memories: self.show_memories.then(|| pipeline.export_memories()),
        })
    }
}

/// Fill in whatever the event line left out using the built-in providers
fn resolve_event(
    event: EventLine,
    embedder: &dyn Embedder,
    analyzer: &dyn SentimentAnalyzer,
) -> CliResult<EventInput> {
    let embedding = match event.embedding {
        Some(embedding) => embedding,
        None => embedder.embed(&event.content)?,
    };

    let sentiment = match (event.valence, event.arousal) {
        (Some(valence), Some(arousal)) => Sentiment::new(valence, arousal),
        (valence, arousal) => {
            let analyzed = analyzer.analyze(&event.content);
            Sentiment::new(
                valence.unwrap_or(analyzed.valence),
                arousal.unwrap_or(analyzed.arousal),
            )
        }
    };

    Ok(EventInput {
        content: event.content,
        embedding,
        sentiment,
        significance: event.significance,
        metadata: event.metadata,
    })
}

fn print_report(report: &ReplayReport) {
    if report.events.is_empty() {
        println!("No events found.");
    } else {
        let mut table = Table::new();
        table
            .load_preset(UTF8_FULL_CONDENSED)
            .set_content_arrangement(ContentArrangement::Dynamic)
            .set_header([
                "Line", "Content", "Novelty", "Type", "Gate", "Emotion", "Flashbulb", "Action",
            ]);

        for row in &report.events {
            table.add_row([
                row.line.to_string(),
                truncate_string(&row.content, 40),
                format_score(row.novelty),
                row.event_type.to_string(),
                format_score(row.gate_score),
                row.emotion.to_string(),
                if row.is_flashbulb { "yes" } else { "" }.to_string(),
                row.action.to_string(),
            ]);
        }
        println!("{table}\n");
    }

    if let Some(memories) = &report.memories {
        print_memories(memories);
    }

    let stats = &report.stats;
    println!(
        "Consolidated: {} ({} merged)",
        report.consolidated, report.merged
    );
    println!(
        "Pruned: {} working set, {} long-term",
        report.working_set_pruned, report.long_term_pruned
    );
    println!(
        "Working set: {}/{}  Long-term: {}  Mode: {}",
        stats.working_set_count,
        stats.working_set_capacity,
        stats.long_term_count,
        stats.mode.as_str()
    );
}

fn print_memories(memories: &[DecayingRecord]) {
    if memories.is_empty() {
        println!("No long-term memories.\n");
        return;
    }

    let mut table = Table::new();
    table
        .load_preset(UTF8_FULL_CONDENSED)
        .set_content_arrangement(ContentArrangement::Dynamic)
        .set_header([
            "ID",
            "Content",
            "Significance",
            "Novelty",
            "Valence",
            "Salience",
            "Created",
        ]);

    for memory in memories {
        table.add_row([
            truncate_string(&memory.id().to_string(), 8),
            truncate_string(memory.content(), 40),
            format_score(memory.significance()),
            format_score(memory.novelty()),
            format_score(memory.valence()),
            format_score(memory.compute_salience()),
            format_timestamp(&memory.created_at()),
        ]);
    }
    println!("{table}\n");
}
