use super::{
    container_failure, resolve_field, split_tags, FileParser, ParseOutcome, RawRecord,
};
use crate::domain::report::snippet;
use crate::utils::error::{IntakeError, Result};
use serde_json::{Map, Value};
use std::collections::BTreeSet;

/// Name of the collection property when the document is an object.
const COLLECTION_KEY: &str = "tickets";

/// Accepts a bare array of ticket objects or `{ "tickets": [...] }`.
#[derive(Debug, Clone, Copy, Default)]
pub struct JsonParser;

impl JsonParser {
    pub fn new() -> Self {
        Self
    }

    fn scalar_text(value: &Value) -> Option<String> {
        match value {
            Value::String(s) => Some(s.clone()),
            Value::Number(n) => Some(n.to_string()),
            Value::Bool(b) => Some(b.to_string()),
            Value::Null | Value::Array(_) | Value::Object(_) => None,
        }
    }

    fn tags(value: &Value) -> Option<BTreeSet<String>> {
        match value {
            Value::Array(items) => Some(
                items
                    .iter()
                    .filter_map(Self::scalar_text)
                    .map(|tag| tag.trim().to_string())
                    .filter(|tag| !tag.is_empty())
                    .collect(),
            ),
            Value::String(s) => Some(split_tags(s)),
            _ => None,
        }
    }

    fn raw_record(object: &Map<String, Value>) -> RawRecord {
        let mut raw = RawRecord::new();
        for (key, value) in object {
            match resolve_field(key) {
                Some("tags") => {
                    if let Some(tags) = Self::tags(value) {
                        raw.set_tags(tags);
                    }
                }
                Some(field) => {
                    if let Some(text) = Self::scalar_text(value) {
                        raw.insert(field, &text);
                    }
                }
                None => {}
            }
        }
        raw
    }
}

impl FileParser for JsonParser {
    fn parse(&self, data: &[u8]) -> Result<ParseOutcome> {
        let root: Value =
            serde_json::from_slice(data).map_err(|e| container_failure("JSON", e))?;

        let items = match root {
            Value::Array(items) => items,
            Value::Object(mut object) => match object.remove(COLLECTION_KEY) {
                Some(Value::Array(items)) => items,
                _ => {
                    return Err(IntakeError::Parse {
                        message: "Invalid JSON format. Expected array or object with 'tickets' array"
                            .to_string(),
                        total_records: 0,
                        failed_records: Vec::new(),
                    })
                }
            },
            other => {
                return Err(container_failure(
                    "JSON",
                    format!("unexpected top-level value {}", snippet(&other.to_string())),
                ))
            }
        };

        let mut outcome = ParseOutcome::default();
        for (index, item) in items.iter().enumerate() {
            let row_number = index + 1;
            let label = format!("Record {}", row_number);
            match item {
                Value::Object(object) => outcome.accept(row_number, &label, Self::raw_record(object)),
                other => outcome.reject(
                    row_number,
                    &label,
                    "Record is not an object",
                    snippet(&other.to_string()),
                ),
            }
        }

        outcome.finish(self.supported_format())
    }

    fn supported_format(&self) -> &'static str {
        "JSON"
    }
}
