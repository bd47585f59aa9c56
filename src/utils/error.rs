use std::collections::BTreeMap;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum IntakeError {
    #[error("{message}")]
    Validation {
        message: String,
        errors: BTreeMap<String, String>,
    },

    #[error("Unsupported file format: {format}. Supported formats: {}", .supported.join(", "))]
    UnsupportedFormat {
        format: String,
        supported: Vec<String>,
    },

    #[error("{message}")]
    Parse {
        message: String,
        total_records: usize,
        failed_records: Vec<String>,
    },

    #[error("{message}")]
    Import {
        message: String,
        total_records: usize,
        success_count: usize,
        failed_records: Vec<String>,
    },

    #[error("{resource} not found with id: {id}")]
    NotFound { resource: String, id: String },

    #[error("Invalid value for '{field}': {reason}")]
    InvalidConfigValue {
        field: String,
        value: String,
        reason: String,
    },

    #[error("Missing required configuration: {field}")]
    MissingConfig { field: String },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("TOML parsing error: {0}")]
    Toml(#[from] toml::de::Error),

    #[error("Internal error: {message}")]
    Internal { message: String },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    Input,
    Format,
    Processing,
    Configuration,
    System,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum ErrorSeverity {
    Low,
    Medium,
    High,
    Critical,
}

impl IntakeError {
    /// Field-level validation failure with a single entry.
    pub fn validation(field: &str, message: impl Into<String>) -> Self {
        let message = message.into();
        let mut errors = BTreeMap::new();
        errors.insert(field.to_string(), message.clone());
        IntakeError::Validation { message, errors }
    }

    pub fn import(message: impl Into<String>) -> Self {
        IntakeError::Import {
            message: message.into(),
            total_records: 0,
            success_count: 0,
            failed_records: Vec::new(),
        }
    }

    pub fn category(&self) -> ErrorCategory {
        match self {
            IntakeError::Validation { .. } | IntakeError::NotFound { .. } => ErrorCategory::Input,
            IntakeError::UnsupportedFormat { .. }
            | IntakeError::Parse { .. } => ErrorCategory::Format,
            IntakeError::Import { .. } => ErrorCategory::Processing,
            IntakeError::InvalidConfigValue { .. }
            | IntakeError::MissingConfig { .. }
            | IntakeError::Toml(_) => ErrorCategory::Configuration,
            IntakeError::Io(_) | IntakeError::Internal { .. } => ErrorCategory::System,
        }
    }

    pub fn severity(&self) -> ErrorSeverity {
        match self.category() {
            ErrorCategory::Input => ErrorSeverity::Medium,
            ErrorCategory::Format | ErrorCategory::Processing => ErrorSeverity::High,
            ErrorCategory::Configuration => ErrorSeverity::High,
            ErrorCategory::System => ErrorSeverity::Critical,
        }
    }

    /// Failure count for an aborted import; zero for other variants.
    pub fn failure_count(&self) -> usize {
        match self {
            IntakeError::Import {
                total_records,
                success_count,
                ..
            } => total_records.saturating_sub(*success_count),
            IntakeError::Parse { failed_records, .. } => failed_records.len(),
            _ => 0,
        }
    }

    pub fn recovery_suggestion(&self) -> &'static str {
        match self {
            IntakeError::Validation { .. } => "Correct the reported fields and submit again",
            IntakeError::UnsupportedFormat { .. } => {
                "Pass --format with one of CSV, JSON or XML, or rename the file with a matching extension"
            }
            IntakeError::Parse { .. } => {
                "Check that the file is well-formed and contains ticket records"
            }
            IntakeError::Import { .. } => "Fix the failed rows listed above and import the file again",
            IntakeError::NotFound { .. } => "Check the identifier and try again",
            IntakeError::InvalidConfigValue { .. }
            | IntakeError::MissingConfig { .. }
            | IntakeError::Toml(_) => "Review the configuration file and command line flags",
            IntakeError::Io(_) => "Check that the file exists and is readable",
            IntakeError::Internal { .. } => "Retry the operation; report it if the problem persists",
        }
    }

    /// Message safe to show to an end user. Internal details stay in the logs.
    pub fn user_friendly_message(&self) -> String {
        match self {
            IntakeError::Io(_) => "The input file could not be read".to_string(),
            IntakeError::Internal { .. } => "An unexpected error occurred".to_string(),
            IntakeError::Validation { message, errors } if !errors.is_empty() => {
                let details: Vec<String> = errors
                    .iter()
                    .map(|(field, reason)| format!("{}: {}", field, reason))
                    .collect();
                format!("{} ({})", message, details.join("; "))
            }
            other => other.to_string(),
        }
    }
}

pub type Result<T> = std::result::Result<T, IntakeError>;
