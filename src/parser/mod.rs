//! File parsers turning uploaded bytes into ticket requests.
//!
//! Every format extracts a [`RawRecord`] (canonical snake_case field name to
//! trimmed value) and hands it to shared normalization, so the three formats
//! agree on required fields, enum handling and tag splitting. A record that
//! fails normalization becomes a [`RowError`]; only container-level problems
//! are returned as `Err`.

pub mod csv_parser;
pub mod json_parser;
pub mod registry;
pub mod xml_parser;

pub use csv_parser::CsvParser;
pub use json_parser::JsonParser;
pub use registry::ParserRegistry;
pub use xml_parser::XmlParser;

use crate::domain::model::{Category, Priority, Status, TicketRequest};
use crate::domain::report::snippet;
use crate::utils::error::{IntakeError, Result};
use std::collections::{BTreeMap, BTreeSet};

pub const REQUIRED_FIELDS: [&str; 5] = [
    "customer_id",
    "customer_email",
    "customer_name",
    "subject",
    "description",
];

const OPTIONAL_FIELDS: [&str; 8] = [
    "category",
    "priority",
    "status",
    "assigned_to",
    "source",
    "browser",
    "device_type",
    "tags",
];

/// Lower-cases a field name and drops separators, so `Customer ID`,
/// `customer-id`, `customerId` and `customer_id` compare equal.
pub fn canonical_field_name(name: &str) -> String {
    name.trim_start_matches('\u{feff}')
        .chars()
        .filter(|c| !matches!(c, ' ' | '_' | '-'))
        .flat_map(char::to_lowercase)
        .collect()
}

/// Maps a source column/key/element name onto a known snake_case field.
pub fn resolve_field(name: &str) -> Option<&'static str> {
    let canonical = canonical_field_name(name);
    REQUIRED_FIELDS
        .iter()
        .chain(OPTIONAL_FIELDS.iter())
        .find(|field| canonical_field_name(field) == canonical)
        .copied()
}

/// Comma-separated tags, trimmed, empties dropped.
pub fn split_tags(value: &str) -> BTreeSet<String> {
    value
        .split(',')
        .map(str::trim)
        .filter(|tag| !tag.is_empty())
        .map(str::to_string)
        .collect()
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RawRecord {
    fields: BTreeMap<String, String>,
    tags: Option<BTreeSet<String>>,
}

impl RawRecord {
    pub fn new() -> Self {
        Self::default()
    }

    /// Stores a trimmed value. An existing non-empty value wins, which gives
    /// the first occurrence precedence when several names map to one field.
    pub fn insert(&mut self, field: &str, value: &str) {
        let value = value.trim();
        match self.fields.get(field) {
            Some(existing) if !existing.is_empty() => {}
            _ => {
                self.fields.insert(field.to_string(), value.to_string());
            }
        }
    }

    pub fn set_tags(&mut self, tags: BTreeSet<String>) {
        if self.tags.is_none() {
            self.tags = Some(tags);
        }
    }

    pub fn get(&self, field: &str) -> Option<&str> {
        self.fields.get(field).map(String::as_str)
    }

    pub fn fields(&self) -> &BTreeMap<String, String> {
        &self.fields
    }

    /// Snake-case key-value view, tags joined back with commas.
    pub fn to_map(&self) -> BTreeMap<String, String> {
        let mut map = self.fields.clone();
        if let Some(tags) = &self.tags {
            map.insert(
                "tags".to_string(),
                tags.iter().cloned().collect::<Vec<_>>().join(","),
            );
        }
        map
    }

    pub fn snippet(&self) -> String {
        let joined: Vec<String> = REQUIRED_FIELDS
            .iter()
            .filter_map(|field| self.get(field).map(|v| format!("{}={}", field, v)))
            .collect();
        snippet(&joined.join(", "))
    }

    fn optional(&self, field: &str) -> Option<String> {
        self.get(field)
            .filter(|value| !value.is_empty())
            .map(str::to_string)
    }

    fn required(&self, field: &str) -> std::result::Result<String, String> {
        self.optional(field)
            .ok_or_else(|| format!("Missing required field: {}", field))
    }

    /// Normalizes into a ticket request. Unknown enum values are dropped,
    /// never reported as errors.
    pub fn to_request(&self) -> std::result::Result<TicketRequest, String> {
        Ok(TicketRequest {
            customer_id: self.required("customer_id")?,
            customer_email: self.required("customer_email")?,
            customer_name: self.required("customer_name")?,
            subject: self.required("subject")?,
            description: self.required("description")?,
            category: self.optional_enum::<Category>("category"),
            priority: self.optional_enum::<Priority>("priority"),
            status: self.optional_enum::<Status>("status"),
            assigned_to: self.optional("assigned_to"),
            source: self.optional("source"),
            browser: self.optional("browser"),
            device_type: self.optional("device_type"),
            tags: self.tags.clone().unwrap_or_default(),
            import_batch: None,
        })
    }

    fn optional_enum<T: std::str::FromStr>(&self, field: &str) -> Option<T> {
        let value = self.optional(field)?;
        match value.parse::<T>() {
            Ok(parsed) => Some(parsed),
            Err(_) => {
                tracing::debug!("Invalid {} value: {}, using default", field, value);
                None
            }
        }
    }
}

/// A successfully normalized record and where it came from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParsedRecord {
    /// 1-based position of the record in the input.
    pub row_number: usize,
    pub request: TicketRequest,
    pub raw: RawRecord,
}

/// A record skipped during parsing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RowError {
    pub row_number: usize,
    pub reason: String,
    pub data: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ParseOutcome {
    pub records: Vec<ParsedRecord>,
    pub errors: Vec<RowError>,
}

impl ParseOutcome {
    pub fn total_rows(&self) -> usize {
        self.records.len() + self.errors.len()
    }

    /// Normalizes `raw` and files it as a record or a row error.
    /// `label` prefixes the error reason, e.g. "Row 3" or "Record 2".
    pub(crate) fn accept(&mut self, row_number: usize, label: &str, raw: RawRecord) {
        match raw.to_request() {
            Ok(request) => self.records.push(ParsedRecord {
                row_number,
                request,
                raw,
            }),
            Err(reason) => {
                let data = raw.snippet();
                self.reject(row_number, label, &reason, data);
            }
        }
    }

    pub(crate) fn reject(&mut self, row_number: usize, label: &str, reason: &str, data: String) {
        tracing::warn!("⚠️ Skipping {}: {}", label.to_lowercase(), reason);
        self.errors.push(RowError {
            row_number,
            reason: format!("{}: {}", label, reason),
            data,
        });
    }

    /// Fails when nothing could be extracted but at least one row errored.
    pub(crate) fn finish(self, format: &str) -> Result<ParseOutcome> {
        if self.records.is_empty() && !self.errors.is_empty() {
            tracing::error!(
                "❌ All {} {} records failed to parse",
                self.errors.len(),
                format
            );
            return Err(IntakeError::Parse {
                message: "All records failed validation".to_string(),
                total_records: self.errors.len(),
                failed_records: self.errors.iter().map(|e| e.reason.clone()).collect(),
            });
        }
        tracing::info!(
            "✅ Parsed {} tickets from {} ({} skipped)",
            self.records.len(),
            format,
            self.errors.len()
        );
        Ok(self)
    }
}

pub(crate) fn container_failure(format: &str, detail: impl std::fmt::Display) -> IntakeError {
    tracing::error!("❌ Error parsing {} file: {}", format, detail);
    IntakeError::Parse {
        message: format!("Failed to parse {} file: {}", format, detail),
        total_records: 0,
        failed_records: Vec::new(),
    }
}

/// One capability, three formats.
pub trait FileParser: Send + Sync {
    fn parse(&self, data: &[u8]) -> Result<ParseOutcome>;
    fn supported_format(&self) -> &'static str;
}
