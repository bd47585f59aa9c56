use crate::config::{ImportConfig, TomlConfig};
use crate::utils::error::Result;
use crate::utils::validation::{
    validate_non_empty_string, validate_path, validate_positive_number, Validate,
};
use clap::Parser;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize, Parser)]
#[command(name = "ticket-intake")]
#[command(about = "Import customer support tickets from CSV, JSON or XML files")]
pub struct CliConfig {
    /// File to import.
    pub file: String,

    #[arg(long, help = "File format (CSV, JSON or XML); detected from the extension when omitted")]
    pub format: Option<String>,

    #[arg(long, help = "Validate records without creating tickets")]
    pub validate_only: bool,

    #[arg(long, help = "Batch identifier recorded on every imported ticket")]
    pub import_batch: Option<String>,

    #[arg(long, help = "Tickets processed per batch")]
    pub batch_size: Option<usize>,

    #[arg(long, help = "Maximum accepted file size in bytes")]
    pub max_file_size: Option<u64>,

    #[arg(long, help = "TOML configuration file")]
    pub config: Option<String>,

    #[arg(long, help = "Write the JSON report to this path")]
    pub output: Option<String>,

    #[arg(long, help = "Enable verbose output")]
    pub verbose: bool,

    #[arg(long, help = "Emit logs as JSON lines")]
    pub log_json: bool,
}

impl CliConfig {
    pub fn load_toml(&self) -> Result<Option<TomlConfig>> {
        self.config
            .as_deref()
            .map(TomlConfig::from_file)
            .transpose()
    }

    /// Config-file values overridden by whatever was given on the command line.
    pub fn import_config(&self, toml: Option<&TomlConfig>) -> Result<ImportConfig> {
        let mut config = match toml {
            Some(toml) => toml.import_config()?.clone(),
            None => ImportConfig::default(),
        };
        if let Some(batch_size) = self.batch_size {
            config.batch_size = batch_size;
        }
        if let Some(max_file_size) = self.max_file_size {
            config.max_file_size = max_file_size;
        }
        config.validate()?;
        Ok(config)
    }
}

impl Validate for CliConfig {
    fn validate(&self) -> Result<()> {
        validate_path("file", &self.file)?;

        if let Some(format) = &self.format {
            validate_non_empty_string("format", format)?;
        }
        if let Some(batch_size) = self.batch_size {
            validate_positive_number("batch_size", batch_size as u64, 1)?;
        }
        if let Some(max_file_size) = self.max_file_size {
            validate_positive_number("max_file_size", max_file_size, 1)?;
        }
        if let Some(config) = &self.config {
            validate_path("config", config)?;
        }
        if let Some(output) = &self.output {
            validate_path("output", output)?;
        }

        Ok(())
    }
}
