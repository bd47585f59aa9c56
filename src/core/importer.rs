use crate::core::aggregator::ResultAggregator;
use crate::core::validator::validate_import_record;
use crate::domain::ports::{ConfigProvider, TicketService};
use crate::domain::report::{BatchReport, ImportedTicket};
use crate::parser::{FileParser, ParseOutcome, ParsedRecord, ParserRegistry};
use crate::utils::error::{IntakeError, Result};
use std::time::Instant;
use uuid::Uuid;

/// Value written into `source` for imported tickets that did not carry one.
pub const IMPORT_SOURCE: &str = "import";

const BYTES_PER_MB: u64 = 1024 * 1024;

/// One uploaded file and how to treat it.
#[derive(Debug, Clone, Default)]
pub struct ImportRequest {
    pub filename: Option<String>,
    pub content: Vec<u8>,
    /// Explicit format name; detected from the filename when absent.
    pub format: Option<String>,
    /// Check every record without creating anything.
    pub validate_only: bool,
    /// Batch identifier; a random UUID is generated when absent.
    pub import_batch: Option<String>,
}

impl ImportRequest {
    pub fn new(filename: impl Into<String>, content: Vec<u8>) -> Self {
        Self {
            filename: Some(filename.into()),
            content,
            ..Default::default()
        }
    }

    pub fn with_format(mut self, format: impl Into<String>) -> Self {
        self.format = Some(format.into());
        self
    }

    pub fn validate_only(mut self, validate_only: bool) -> Self {
        self.validate_only = validate_only;
        self
    }

    pub fn with_import_batch(mut self, import_batch: impl Into<String>) -> Self {
        self.import_batch = Some(import_batch.into());
        self
    }
}

/// Drives a single import: file checks, format resolution, parsing, then
/// either validation or ticket creation, and finally the batch report.
pub struct ImportEngine<T: TicketService, C: ConfigProvider> {
    service: T,
    config: C,
    registry: ParserRegistry,
}

impl<T: TicketService, C: ConfigProvider> ImportEngine<T, C> {
    pub fn new(service: T, config: C) -> Self {
        Self::with_registry(service, config, ParserRegistry::new())
    }

    pub fn with_registry(service: T, config: C, registry: ParserRegistry) -> Self {
        Self {
            service,
            config,
            registry,
        }
    }

    pub fn service(&self) -> &T {
        &self.service
    }

    pub async fn import(&self, request: ImportRequest) -> Result<BatchReport> {
        let started = Instant::now();

        let filename = self.validate_file(&request)?;
        let parser = self.determine_parser(request.format.as_deref(), filename)?;
        let format = parser.supported_format();
        let import_batch = request
            .import_batch
            .clone()
            .unwrap_or_else(|| Uuid::new_v4().to_string());

        tracing::info!(
            "🚀 Starting import - Format: {}, Batch: {}, File: {}",
            format,
            import_batch,
            filename
        );

        let outcome = Self::parse(parser, &request.content)?;
        if outcome.records.is_empty() {
            tracing::error!("❌ No valid tickets found in {}", filename);
            return Err(IntakeError::Import {
                message: "No valid tickets found in the file".to_string(),
                total_records: outcome.total_rows(),
                success_count: 0,
                failed_records: outcome.errors.iter().map(|e| e.reason.clone()).collect(),
            });
        }

        let mut aggregator = ResultAggregator::new(import_batch.clone(), format, started);
        let ParseOutcome { records, errors } = outcome;
        aggregator.absorb_row_errors(errors);

        if request.validate_only {
            Self::validate_records(&records, &mut aggregator);
        } else {
            self.create_tickets(records, &import_batch, &mut aggregator).await;
        }

        let report = aggregator.finish();
        tracing::info!(
            "✅ Import completed - Total: {}, Success: {}, Failed: {}, Time: {}ms",
            report.total_records,
            report.success_count,
            report.failure_count,
            report.processing_time_ms
        );
        Ok(report)
    }

    /// Returns the filename once content, size and name all check out.
    fn validate_file<'a>(&self, request: &'a ImportRequest) -> Result<&'a str> {
        if request.content.is_empty() {
            return Err(IntakeError::validation("file", "File is required"));
        }

        let max_file_size = self.config.max_file_size();
        if request.content.len() as u64 > max_file_size {
            return Err(IntakeError::validation(
                "file",
                format!(
                    "File size exceeds maximum allowed size of {} MB",
                    max_file_size / BYTES_PER_MB
                ),
            ));
        }

        match request.filename.as_deref().map(str::trim) {
            Some(name) if !name.is_empty() => Ok(name),
            _ => Err(IntakeError::validation("file", "File must have a name")),
        }
    }

    fn determine_parser(&self, format: Option<&str>, filename: &str) -> Result<&dyn FileParser> {
        if let Some(format) = format.filter(|f| !f.trim().is_empty()) {
            return self.registry.get_parser(format);
        }

        self.registry.detect_parser(filename).map_err(|e| {
            tracing::warn!("⚠️ Format detection failed for {}: {}", filename, e);
            IntakeError::validation(
                "format",
                "Cannot determine file format. Please specify format parameter (CSV, JSON, or XML)",
            )
        })
    }

    fn parse(parser: &dyn FileParser, content: &[u8]) -> Result<ParseOutcome> {
        parser.parse(content).map_err(|e| {
            tracing::error!("❌ Failed to parse file: {}", e);
            match e {
                IntakeError::Parse {
                    message,
                    total_records,
                    failed_records,
                } => IntakeError::Import {
                    message: format!("Failed to parse file: {}", message),
                    total_records,
                    success_count: 0,
                    failed_records,
                },
                other => IntakeError::import(format!(
                    "Failed to parse file: {}",
                    other.user_friendly_message()
                )),
            }
        })
    }

    fn validate_records(records: &[ParsedRecord], aggregator: &mut ResultAggregator) {
        for record in records {
            match validate_import_record(&record.raw.to_map()) {
                Ok(()) => aggregator.record_success(ImportedTicket {
                    ticket_id: None,
                    subject: record.request.subject.clone(),
                    customer_id: record.request.customer_id.clone(),
                    row_number: record.row_number,
                }),
                Err(e) => {
                    tracing::debug!("Row {} failed validation: {}", record.row_number, e);
                    aggregator.record_failure(
                        record.row_number,
                        e.user_friendly_message(),
                        record.request.subject.clone(),
                    );
                }
            }
        }
    }

    async fn create_tickets(
        &self,
        records: Vec<ParsedRecord>,
        import_batch: &str,
        aggregator: &mut ResultAggregator,
    ) {
        let batch_size = self.config.batch_size().max(1);
        let total_batches = records.len().div_ceil(batch_size);
        tracing::info!(
            "📦 Processing {} tickets in {} batches of size {}",
            records.len(),
            total_batches,
            batch_size
        );

        for (index, batch) in records.chunks(batch_size).enumerate() {
            tracing::debug!(
                "Processing batch {}/{} with {} tickets",
                index + 1,
                total_batches,
                batch.len()
            );

            for record in batch {
                let mut request = record.request.clone();
                if request.source.is_none() {
                    request.source = Some(IMPORT_SOURCE.to_string());
                }
                request.import_batch = Some(import_batch.to_string());

                let data = format!(
                    "Subject: {}, Customer: {}",
                    request.subject, request.customer_id
                );

                match self.service.create_ticket(request).await {
                    Ok(created) => aggregator.record_success(ImportedTicket {
                        ticket_id: Some(created.ticket_id),
                        subject: created.subject,
                        customer_id: created.customer_id,
                        row_number: record.row_number,
                    }),
                    Err(e) => {
                        tracing::warn!(
                            "⚠️ Failed to create ticket at row {}: {}",
                            record.row_number,
                            e
                        );
                        aggregator.record_failure(record.row_number, e.user_friendly_message(), data);
                    }
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::model::{CreatedTicket, TicketRequest};
    use crate::domain::report::ImportStatus;
    use async_trait::async_trait;
    use std::sync::Mutex;

    struct TestConfig {
        batch_size: usize,
        max_file_size: u64,
    }

    impl ConfigProvider for TestConfig {
        fn batch_size(&self) -> usize {
            self.batch_size
        }

        fn max_file_size(&self) -> u64 {
            self.max_file_size
        }
    }

    fn config() -> TestConfig {
        TestConfig {
            batch_size: 2,
            max_file_size: 10 * BYTES_PER_MB,
        }
    }

    /// Records every request; rejects subjects containing "reject".
    #[derive(Default)]
    struct RecordingService {
        received: Mutex<Vec<TicketRequest>>,
    }

    #[async_trait]
    impl TicketService for RecordingService {
        async fn create_ticket(&self, request: TicketRequest) -> Result<CreatedTicket> {
            self.received.lock().unwrap().push(request.clone());
            if request.subject.contains("reject") {
                return Err(IntakeError::validation("subject", "Subject was rejected"));
            }
            Ok(CreatedTicket {
                ticket_id: Uuid::new_v4(),
                subject: request.subject,
                customer_id: request.customer_id,
            })
        }
    }

    fn engine() -> ImportEngine<RecordingService, TestConfig> {
        ImportEngine::new(RecordingService::default(), config())
    }

    const CSV_HEADER: &str = "customer_id,customer_email,customer_name,subject,description";

    fn csv(rows: &[&str]) -> Vec<u8> {
        let mut text = String::from(CSV_HEADER);
        for row in rows {
            text.push('\n');
            text.push_str(row);
        }
        text.into_bytes()
    }

    #[tokio::test]
    async fn test_missing_email_row_is_reported() {
        let content = csv(&[
            "C1,a@example.com,Ann,Login broken,Cannot login since yesterday",
            "C2,b@example.com,Bob,Refund please,I need a refund for my invoice",
            "C3,,Cid,Dark mode,It would be great to have dark mode",
        ]);

        let report = engine()
            .import(ImportRequest::new("tickets.csv", content))
            .await
            .unwrap();

        assert_eq!(report.format, "CSV");
        assert_eq!(report.total_records, 3);
        assert_eq!(report.success_count, 2);
        assert_eq!(report.failure_count, 1);
        assert_eq!(report.status(), ImportStatus::PartialSuccess);
        assert_eq!(report.failed_records[0].row_number, 3);
        assert_eq!(
            report.failed_records[0].reason,
            "Row 4: Missing required field: customer_email"
        );
        assert!(report.successful_tickets.iter().all(|t| t.ticket_id.is_some()));
    }

    #[tokio::test]
    async fn test_service_failures_do_not_abort_the_import() {
        let content = csv(&[
            "C1,a@example.com,Ann,First,Description number one",
            "C2,b@example.com,Bob,please reject,Description number two",
            "C3,c@example.com,Cid,Third,Description number three",
        ]);

        let engine = engine();
        let report = engine
            .import(ImportRequest::new("tickets.csv", content).with_import_batch("batch-7"))
            .await
            .unwrap();

        assert_eq!(report.import_batch, "batch-7");
        assert_eq!(report.success_count, 2);
        assert_eq!(report.failed_rows(), vec![2]);
        assert_eq!(report.failed_records[0].data, "Subject: please reject, Customer: C2");
        assert!(report.failed_records[0].reason.contains("Subject was rejected"));

        let received = engine.service().received.lock().unwrap();
        assert_eq!(received.len(), 3);
        assert!(received
            .iter()
            .all(|r| r.source.as_deref() == Some(IMPORT_SOURCE)));
        assert!(received
            .iter()
            .all(|r| r.import_batch.as_deref() == Some("batch-7")));
    }

    #[tokio::test]
    async fn test_existing_source_is_kept() {
        let content = b"[{\"customer_id\":\"C1\",\"customer_email\":\"a@example.com\",\
            \"customer_name\":\"Ann\",\"subject\":\"Hi\",\"description\":\"Long enough text\",\
            \"source\":\"email\"}]"
            .to_vec();

        let engine = engine();
        engine
            .import(ImportRequest::new("tickets.json", content))
            .await
            .unwrap();

        let received = engine.service().received.lock().unwrap();
        assert_eq!(received[0].source.as_deref(), Some("email"));
    }

    #[tokio::test]
    async fn test_validate_only_creates_nothing() {
        let content = csv(&[
            "C1,a@example.com,Ann,Login broken,Cannot login since yesterday",
            "C2,not-an-email,Bob,Refund please,I need a refund for my invoice",
        ]);

        let engine = engine();
        let report = engine
            .import(ImportRequest::new("tickets.csv", content).validate_only(true))
            .await
            .unwrap();

        assert!(engine.service().received.lock().unwrap().is_empty());
        assert_eq!(report.success_count, 1);
        assert_eq!(report.successful_tickets[0].ticket_id, None);
        assert_eq!(report.failed_rows(), vec![2]);
        assert!(report.failed_records[0].reason.contains("Invalid email format"));
        assert_eq!(report.failed_records[0].data, "Refund please");
    }

    #[tokio::test]
    async fn test_file_preconditions() {
        let engine = engine();

        let err = engine
            .import(ImportRequest::new("tickets.csv", Vec::new()))
            .await
            .unwrap_err();
        assert_eq!(err.to_string(), "File is required");

        let small = ImportEngine::new(
            RecordingService::default(),
            TestConfig {
                batch_size: 10,
                max_file_size: BYTES_PER_MB,
            },
        );
        let err = small
            .import(ImportRequest::new("tickets.csv", vec![b'a'; BYTES_PER_MB as usize + 1]))
            .await
            .unwrap_err();
        assert_eq!(err.to_string(), "File size exceeds maximum allowed size of 1 MB");

        let err = engine
            .import(ImportRequest::new("  ", csv(&[])))
            .await
            .unwrap_err();
        assert_eq!(err.to_string(), "File must have a name");
    }

    #[tokio::test]
    async fn test_format_resolution() {
        let engine = engine();
        let rows = csv(&["C1,a@example.com,Ann,Subject,Long enough description"]);

        let err = engine
            .import(ImportRequest::new("tickets.txt", rows.clone()))
            .await
            .unwrap_err();
        assert!(matches!(err, IntakeError::Validation { .. }));
        assert!(err.to_string().starts_with("Cannot determine file format"));

        let err = engine
            .import(ImportRequest::new("tickets.csv", rows.clone()).with_format("yaml"))
            .await
            .unwrap_err();
        match &err {
            IntakeError::UnsupportedFormat { format, supported } => {
                assert_eq!(format, "yaml");
                assert_eq!(supported, &vec!["CSV", "JSON", "XML"]);
            }
            other => panic!("unexpected error: {other:?}"),
        }
        assert!(err.to_string().starts_with("Unsupported file format: yaml."));

        let report = engine
            .import(ImportRequest::new("upload.bin", rows).with_format("csv"))
            .await
            .unwrap();
        assert_eq!(report.format, "CSV");
        assert_eq!(report.success_count, 1);
    }

    #[tokio::test]
    async fn test_container_failure_becomes_import_failure() {
        let err = engine()
            .import(ImportRequest::new("tickets.json", b"{\"items\": []}".to_vec()))
            .await
            .unwrap_err();

        match err {
            IntakeError::Import {
                message,
                success_count,
                ..
            } => {
                assert!(message.starts_with("Failed to parse file: "));
                assert_eq!(success_count, 0);
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_all_rows_failing_parse_is_import_failure() {
        let content = csv(&["C1,,Ann,Subject,Long enough description"]);
        let err = engine()
            .import(ImportRequest::new("tickets.csv", content))
            .await
            .unwrap_err();
        assert!(matches!(err, IntakeError::Import { total_records: 1, .. }));
        assert_eq!(err.failure_count(), 1);
    }

    #[tokio::test]
    async fn test_header_only_file_has_no_tickets() {
        let err = engine()
            .import(ImportRequest::new("tickets.csv", csv(&[])))
            .await
            .unwrap_err();
        assert_eq!(err.to_string(), "No valid tickets found in the file");
    }

    #[tokio::test]
    async fn test_batches_preserve_row_order() {
        let rows: Vec<String> = (1..=5)
            .map(|n| format!("C{n},c{n}@example.com,Name {n},Subject {n},Description number {n}"))
            .collect();
        let rows: Vec<&str> = rows.iter().map(String::as_str).collect();

        let report = engine()
            .import(ImportRequest::new("tickets.csv", csv(&rows)))
            .await
            .unwrap();

        let numbers: Vec<usize> = report.successful_tickets.iter().map(|t| t.row_number).collect();
        assert_eq!(numbers, vec![1, 2, 3, 4, 5]);
        assert_eq!(report.successful_tickets[4].customer_id, "C5");
    }
}
