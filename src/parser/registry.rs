use super::{CsvParser, FileParser, JsonParser, XmlParser};
use crate::utils::error::{IntakeError, Result};
use std::collections::BTreeMap;

/// Maps format names to parsers. Built once; lookups never guess from content.
pub struct ParserRegistry {
    parsers: BTreeMap<String, Box<dyn FileParser>>,
}

impl ParserRegistry {
    /// Registry with the CSV, JSON and XML parsers.
    pub fn new() -> Self {
        Self::with_parsers(vec![
            Box::new(CsvParser::new()),
            Box::new(JsonParser::new()),
            Box::new(XmlParser::new()),
        ])
    }

    pub fn with_parsers(parsers: Vec<Box<dyn FileParser>>) -> Self {
        let parsers = parsers
            .into_iter()
            .map(|parser| (parser.supported_format().to_uppercase(), parser))
            .collect();
        Self { parsers }
    }

    pub fn supported_formats(&self) -> Vec<String> {
        self.parsers.keys().cloned().collect()
    }

    pub fn get_parser(&self, format: &str) -> Result<&dyn FileParser> {
        let normalized = format.trim().to_uppercase();
        if normalized.is_empty() {
            return Err(IntakeError::validation("format", "File format not specified"));
        }

        self.parsers
            .get(&normalized)
            .map(|parser| parser.as_ref())
            .ok_or_else(|| IntakeError::UnsupportedFormat {
                format: format.trim().to_string(),
                supported: self.supported_formats(),
            })
    }

    /// Picks a parser from the filename extension (`.csv`, `.json`, `.xml`).
    pub fn detect_parser(&self, filename: &str) -> Result<&dyn FileParser> {
        let format = match file_extension(filename).map(str::to_ascii_lowercase).as_deref() {
            Some("csv") => "CSV",
            Some("json") => "JSON",
            Some("xml") => "XML",
            _ => {
                tracing::debug!("Cannot detect format from filename: {}", filename);
                return Err(IntakeError::UnsupportedFormat {
                    format: filename.to_string(),
                    supported: self.supported_formats(),
                });
            }
        };

        self.get_parser(format)
    }
}

impl Default for ParserRegistry {
    fn default() -> Self {
        Self::new()
    }
}

/// Text after the last dot. `None` when there is no dot, the dot leads the
/// name, or nothing follows it.
pub fn file_extension(filename: &str) -> Option<&str> {
    let index = filename.rfind('.')?;
    if index == 0 || index + 1 == filename.len() {
        return None;
    }
    Some(&filename[index + 1..])
}
