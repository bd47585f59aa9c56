#[cfg(feature = "cli")]
pub mod cli;
pub mod toml_config;

#[cfg(feature = "cli")]
pub use cli::CliConfig;
pub use toml_config::{LoggingConfig, TomlConfig};

use crate::domain::ports::ConfigProvider;
use crate::utils::error::Result;
use crate::utils::validation::{validate_positive_number, Validate};
use serde::{Deserialize, Serialize};

pub const DEFAULT_BATCH_SIZE: usize = 100;
/// 100 MB.
pub const DEFAULT_MAX_FILE_SIZE: u64 = 104_857_600;

fn default_batch_size() -> usize {
    DEFAULT_BATCH_SIZE
}

fn default_max_file_size() -> u64 {
    DEFAULT_MAX_FILE_SIZE
}

/// Import tuning knobs, the `[import]` table of the config file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ImportConfig {
    #[serde(default = "default_batch_size")]
    pub batch_size: usize,
    /// Upper bound for an uploaded file, in bytes.
    #[serde(default = "default_max_file_size")]
    pub max_file_size: u64,
}

impl Default for ImportConfig {
    fn default() -> Self {
        Self {
            batch_size: DEFAULT_BATCH_SIZE,
            max_file_size: DEFAULT_MAX_FILE_SIZE,
        }
    }
}

impl ConfigProvider for ImportConfig {
    fn batch_size(&self) -> usize {
        self.batch_size
    }

    fn max_file_size(&self) -> u64 {
        self.max_file_size
    }
}

impl Validate for ImportConfig {
    fn validate(&self) -> Result<()> {
        validate_positive_number("import.batch_size", self.batch_size as u64, 1)?;
        validate_positive_number("import.max_file_size", self.max_file_size, 1)?;
        Ok(())
    }
}
