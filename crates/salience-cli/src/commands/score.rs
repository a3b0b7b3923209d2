use clap::Parser;
use comfy_table::{ContentArrangement, Table, presets::UTF8_FULL_CONDENSED};
use salience::EventType;
use salience::config::Config;
use salience::pipeline::Pipeline;
use salience::providers::{HashingEmbedder, LexiconAnalyzer, emotion_label};
use serde::Serialize;

use crate::error::CliResult;
use crate::output::{OutputFormat, format_score, truncate_string};

#[derive(Parser)]
pub struct ScoreCommand {
    #[clap(required = true, help = "Texts to score, in order")]
    pub texts: Vec<String>,

    #[clap(long, help = "Significance used for the attention gate")]
    pub significance: Option<f64>,
}

#[derive(Debug, Clone, Serialize)]
pub struct ScoreRow {
    pub text: String,
    pub raw_novelty: f64,
    pub novelty: f64,
    pub event_type: EventType,
    pub nearest_similarity: Option<f64>,
    pub gate_score: f64,
    pub admitted: bool,
    pub valence: f64,
    pub arousal: f64,
    pub emotion: &'static str,
    pub is_flashbulb: bool,
}

impl ScoreCommand {
    pub fn execute(&self, config: &Config, format: OutputFormat) -> CliResult<()> {
        let rows = self.score(config)?;

        match format {
            OutputFormat::Json => {
                println!("{}", serde_json::to_string_pretty(&rows)?);
            }
            OutputFormat::Table => {
                let mut table = Table::new();
                table
                    .load_preset(UTF8_FULL_CONDENSED)
                    .set_content_arrangement(ContentArrangement::Dynamic)
                    .set_header([
                        "Text", "Raw", "Novelty", "Type", "Gate", "Admitted", "Emotion",
                    ]);

                for row in &rows {
                    table.add_row([
                        truncate_string(&row.text, 50),
                        format_score(row.raw_novelty),
                        format_score(row.novelty),
                        row.event_type.to_string(),
                        format_score(row.gate_score),
                        if row.admitted { "yes" } else { "no" }.to_string(),
                        row.emotion.to_string(),
                    ]);
                }
                println!("{table}");
            }
        }
        Ok(())
    }

    /// Score the texts in order; each admitted text becomes memory for the
    /// ones after it.
    pub fn score(&self, config: &Config) -> CliResult<Vec<ScoreRow>> {
        let mut pipeline = Pipeline::new(config)?;
        let embedder = HashingEmbedder::from_config(&config.embedding)?;
        let analyzer = LexiconAnalyzer::new();

        let mut rows = Vec::with_capacity(self.texts.len());
        for text in &self.texts {
            let outcome = pipeline.process_text(text, &embedder, &analyzer, self.significance)?;
            rows.push(ScoreRow {
                text: text.clone(),
                raw_novelty: outcome.score.raw_novelty,
                novelty: outcome.score.novelty,
                event_type: outcome.score.event_type,
                nearest_similarity: outcome.score.nearest_neighbor_similarity,
                gate_score: outcome.score.gate_score,
                admitted: outcome.admitted,
                valence: outcome.sentiment.valence,
                arousal: outcome.sentiment.arousal,
                emotion: emotion_label(outcome.sentiment.valence, outcome.sentiment.arousal),
                is_flashbulb: outcome.is_flashbulb,
            });
        }
        Ok(rows)
    }
}
