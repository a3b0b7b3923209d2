use clap::{Parser, Subcommand};
use salience::config::Config;

use crate::error::CliResult;
use crate::output::OutputFormat;

#[derive(Parser)]
pub struct ConfigCommand {
    #[clap(subcommand)]
    pub command: ConfigSubcommand,
}

#[derive(Subcommand)]
pub enum ConfigSubcommand {
    #[clap(about = "Show the effective configuration")]
    Show,
}

impl ConfigCommand {
    pub fn execute(&self, config: &Config, format: OutputFormat) -> CliResult<()> {
        match self.command {
            ConfigSubcommand::Show => println!("{}", render(config, format)?),
        }
        Ok(())
    }
}

fn render(config: &Config, format: OutputFormat) -> CliResult<String> {
    Ok(match format {
        OutputFormat::Json => serde_json::to_string_pretty(config)?,
        OutputFormat::Table => toml::to_string_pretty(config)?,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_toml_output_reloads() {
        let config = Config::default();
        let rendered = render(&config, OutputFormat::Table).unwrap();
        assert!(rendered.contains("[scorer]"));
        assert_eq!(Config::from_toml_str(&rendered).unwrap(), config);
    }

    #[test]
    fn test_json_output() {
        let rendered = render(&Config::default(), OutputFormat::Json).unwrap();
        let value: serde_json::Value = serde_json::from_str(&rendered).unwrap();
        assert_eq!(value["working_set"]["capacity"], 50);
        assert_eq!(value["scorer"]["mode"], "heightened");
    }

    #[test]
    fn test_show_reflects_config_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("salience.toml");
        std::fs::write(&path, "[working_set]\ncapacity = 7\n\n[scorer]\nmode = \"disabled\"\n")
            .unwrap();

        let config = Config::load(Some(&path)).unwrap();
        let rendered = render(&config, OutputFormat::Json).unwrap();
        let value: serde_json::Value = serde_json::from_str(&rendered).unwrap();
        assert_eq!(value["working_set"]["capacity"], 7);
        assert_eq!(value["scorer"]["mode"], "disabled");
        assert_eq!(value["pipeline"]["default_significance"], 0.5);
    }

    #[test]
    fn test_bad_config_file_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("salience.toml");
        std::fs::write(&path, "[working_set]\ncapacity = 0\n").unwrap();
        assert!(Config::load(Some(&path)).is_err());
    }
}
