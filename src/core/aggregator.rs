use crate::domain::report::{BatchReport, FailedRecord, ImportedTicket};
use crate::parser::RowError;
use chrono::Utc;
use std::time::Instant;

/// Collects per-row outcomes of one import and turns them into a `BatchReport`.
///
/// Counts are taken from the collected lists when the report is built, so
/// they always agree with what the report lists.
#[derive(Debug)]
pub struct ResultAggregator {
    import_batch: String,
    format: String,
    started: Instant,
    successes: Vec<ImportedTicket>,
    failures: Vec<FailedRecord>,
}

impl ResultAggregator {
    pub fn new(import_batch: impl Into<String>, format: impl Into<String>, started: Instant) -> Self {
        Self {
            import_batch: import_batch.into(),
            format: format.into(),
            started,
            successes: Vec::new(),
            failures: Vec::new(),
        }
    }

    pub fn record_success(&mut self, ticket: ImportedTicket) {
        self.successes.push(ticket);
    }

    pub fn record_failure(&mut self, row_number: usize, reason: impl Into<String>, data: impl Into<String>) {
        self.failures.push(FailedRecord {
            row_number,
            reason: reason.into(),
            data: data.into(),
        });
    }

    /// Folds rows the parser already rejected into the failure list.
    pub fn absorb_row_errors(&mut self, errors: Vec<RowError>) {
        for error in errors {
            self.record_failure(error.row_number, error.reason, error.data);
        }
    }

    pub fn finish(self) -> BatchReport {
        let Self {
            import_batch,
            format,
            started,
            mut successes,
            mut failures,
        } = self;

        // Stable sorts keep insertion order for equal row numbers.
        successes.sort_by_key(|ticket| ticket.row_number);
        failures.sort_by_key(|failure| failure.row_number);

        let processing_time_ms = u64::try_from(started.elapsed().as_millis()).unwrap_or(u64::MAX);

        BatchReport {
            import_batch,
            imported_at: Utc::now(),
            total_records: successes.len() + failures.len(),
            success_count: successes.len(),
            failure_count: failures.len(),
            processing_time_ms,
            format,
            successful_tickets: successes,
            failed_records: failures,
        }
    }
}
