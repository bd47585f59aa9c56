use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ImportedTicket {
    /// Absent for validate-only imports.
    pub ticket_id: Option<Uuid>,
    pub subject: String,
    pub customer_id: String,
    pub row_number: usize,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FailedRecord {
    pub row_number: usize,
    pub reason: String,
    /// Short snippet of the offending record.
    pub data: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ImportStatus {
    Success,
    PartialSuccess,
    Failed,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BatchReport {
    pub import_batch: String,
    pub imported_at: DateTime<Utc>,
    pub total_records: usize,
    pub success_count: usize,
    pub failure_count: usize,
    pub processing_time_ms: u64,
    pub format: String,
    pub successful_tickets: Vec<ImportedTicket>,
    pub failed_records: Vec<FailedRecord>,
}

impl BatchReport {
    pub fn status(&self) -> ImportStatus {
        if self.failure_count == 0 {
            ImportStatus::Success
        } else if self.success_count == 0 {
            ImportStatus::Failed
        } else {
            ImportStatus::PartialSuccess
        }
    }

    pub fn failed_rows(&self) -> Vec<usize> {
        self.failed_records.iter().map(|f| f.row_number).collect()
    }
}

/// Upper bound for the raw-data snippet attached to a failed record.
pub const SNIPPET_MAX_CHARS: usize = 100;

/// Truncates `text` to `SNIPPET_MAX_CHARS` characters, marking the cut with "...".
pub fn snippet(text: &str) -> String {
    if text.chars().count() <= SNIPPET_MAX_CHARS {
        return text.to_string();
    }
    let mut cut: String = text.chars().take(SNIPPET_MAX_CHARS).collect();
    cut.push_str("...");
    cut
}
