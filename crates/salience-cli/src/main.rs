use std::path::PathBuf;

use clap::{Parser, Subcommand};
use salience::config::Config;
use salience_cli::commands::{ConfigCommand, ReplayCommand, ScoreCommand};
use salience_cli::error::CliResult;
use salience_cli::output::OutputFormat;
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Parser)]
#[command(name = "salience-cli")]
#[command(about = "Salience CLI - Replay and score events through the memory pipeline")]
#[command(version)]
pub struct Cli {
    #[clap(long, short, global = true, help = "Output in JSON format")]
    pub json: bool,

    #[clap(long, short = 'c', global = true, help = "Path to config file")]
    pub config: Option<PathBuf>,

    #[clap(subcommand)]
    pub command: Command,
}

#[derive(Subcommand)]
pub enum Command {
    #[clap(about = "Replay a JSONL event stream through the pipeline")]
    Replay(ReplayCommand),

    #[clap(about = "Score texts for novelty and sentiment")]
    Score(ScoreCommand),

    #[clap(about = "Configuration commands")]
    Config(ConfigCommand),
}

fn main() {
    init_logging();

    if let Err(e) = run() {
        eprintln!("Error: {e}");
        std::process::exit(1);
    }
}

fn init_logging() {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn,salience=info"));

    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();
}

fn run() -> CliResult<()> {
    let cli = Cli::parse();

    let format = if cli.json {
        OutputFormat::Json
    } else {
        OutputFormat::Table
    };

    let config = Config::load(cli.config.as_deref())?;

    match &cli.command {
        Command::Replay(cmd) => cmd.execute(&config, format),
        Command::Score(cmd) => cmd.execute(&config, format),
        Command::Config(cmd) => cmd.execute(&config, format),
    }
}
