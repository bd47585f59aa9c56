pub mod adapters;
pub mod config;
pub mod core;
pub mod domain;
pub mod parser;
pub mod utils;

#[cfg(feature = "cli")]
pub use config::CliConfig;
pub use config::{ImportConfig, TomlConfig};

pub use adapters::{InMemoryTicketRepository, LocalStorage};
pub use crate::core::{Classifier, ImportEngine, ImportRequest, TicketManager, TicketQuery};
pub use domain::report::{BatchReport, ImportStatus};
pub use parser::ParserRegistry;
pub use utils::error::{IntakeError, Result};
