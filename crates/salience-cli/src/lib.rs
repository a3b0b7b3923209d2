pub mod commands;
pub mod error;
pub mod output;

pub use commands::{ConfigCommand, ReplayCommand, ScoreCommand};
pub use error::{CliError, CliResult};
pub use output::{OutputFormat, format_score, format_timestamp, truncate_string};
