use super::{
    container_failure, resolve_field, split_tags, FileParser, ParseOutcome, RawRecord,
    REQUIRED_FIELDS,
};
use crate::utils::error::{IntakeError, Result};
use csv::{ReaderBuilder, Trim};

/// Header-first CSV. Column names are matched case-insensitively and
/// regardless of space/underscore/hyphen separators.
#[derive(Debug, Clone, Copy, Default)]
pub struct CsvParser;

impl CsvParser {
    pub fn new() -> Self {
        Self
    }

    fn map_headers(headers: &csv::StringRecord) -> Result<Vec<Option<&'static str>>> {
        let columns: Vec<Option<&'static str>> = headers.iter().map(resolve_field).collect();

        let missing: Vec<&str> = REQUIRED_FIELDS
            .iter()
            .filter(|required| !columns.contains(&Some(**required)))
            .copied()
            .collect();

        if !missing.is_empty() {
            tracing::error!("❌ CSV header is missing required columns: {:?}", missing);
            return Err(IntakeError::Parse {
                message: format!("Missing required headers: {}", missing.join(", ")),
                total_records: 0,
                failed_records: Vec::new(),
            });
        }

        Ok(columns)
    }
}

impl FileParser for CsvParser {
    fn parse(&self, data: &[u8]) -> Result<ParseOutcome> {
        let mut reader = ReaderBuilder::new()
            .has_headers(true)
            .flexible(true)
            .trim(Trim::All)
            .from_reader(data);

        let headers = reader
            .headers()
            .map_err(|e| container_failure("CSV", e))?
            .clone();
        let columns = Self::map_headers(&headers)?;
        tracing::debug!("CSV columns: {:?}", columns);

        let mut outcome = ParseOutcome::default();

        for (index, result) in reader.records().enumerate() {
            let row_number = index + 1;
            // Reported rows count the header line, matching what spreadsheet users see.
            let label = format!("Row {}", row_number + 1);

            let record = match result {
                Ok(record) => record,
                Err(e) => {
                    outcome.reject(row_number, &label, &e.to_string(), String::new());
                    continue;
                }
            };

            let mut raw = RawRecord::new();
            for (column, value) in columns.iter().zip(record.iter()) {
                match column {
                    Some("tags") => {
                        if !value.is_empty() {
                            raw.set_tags(split_tags(value));
                        }
                    }
                    Some(field) => raw.insert(field, value),
                    None => {}
                }
            }

            outcome.accept(row_number, &label, raw);
        }

        outcome.finish(self.supported_format())
    }

    fn supported_format(&self) -> &'static str {
        "CSV"
    }
}
