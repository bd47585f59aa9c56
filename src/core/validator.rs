//! Field-level rules for ticket data.
//!
//! Both entry points collect every violation before failing, so a caller sees
//! the full list of problems in one round trip.

use crate::domain::model::{Category, Priority, Status, TicketRequest};
use crate::parser::REQUIRED_FIELDS;
use crate::utils::error::{IntakeError, Result};
use once_cell::sync::Lazy;
use regex::Regex;
use std::collections::BTreeMap;
use std::str::FromStr;

pub const SUBJECT_MAX_CHARS: usize = 200;
pub const DESCRIPTION_MIN_CHARS: usize = 10;
pub const DESCRIPTION_MAX_CHARS: usize = 2000;

static EMAIL_PATTERN: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^[A-Za-z0-9+_.-]+@[A-Za-z0-9.-]+\.[A-Za-z]{2,}$").expect("email pattern is valid")
});

pub fn is_valid_email(email: &str) -> bool {
    let email = email.trim();
    !email.is_empty() && EMAIL_PATTERN.is_match(email)
}

pub fn is_valid_enum_value<T: FromStr>(value: &str) -> bool {
    !value.trim().is_empty() && value.parse::<T>().is_ok()
}

fn is_blank(value: &str) -> bool {
    value.trim().is_empty()
}

fn check_subject(subject: &str) -> Option<String> {
    if subject.chars().count() > SUBJECT_MAX_CHARS {
        return Some(format!("Subject must not exceed {} characters", SUBJECT_MAX_CHARS));
    }
    None
}

fn check_description(description: &str) -> Option<String> {
    let length = description.chars().count();
    if length < DESCRIPTION_MIN_CHARS {
        Some(format!(
            "Description must be at least {} characters",
            DESCRIPTION_MIN_CHARS
        ))
    } else if length > DESCRIPTION_MAX_CHARS {
        Some(format!(
            "Description must not exceed {} characters",
            DESCRIPTION_MAX_CHARS
        ))
    } else {
        None
    }
}

fn into_result(message: &str, errors: BTreeMap<String, String>) -> Result<()> {
    if errors.is_empty() {
        return Ok(());
    }
    tracing::debug!("{}: {:?}", message, errors);
    Err(IntakeError::Validation {
        message: message.to_string(),
        errors,
    })
}

/// Checks a normalized request. Error keys use the camelCase field names.
pub fn validate_ticket_data(request: &TicketRequest) -> Result<()> {
    let mut errors = BTreeMap::new();

    if is_blank(&request.customer_id) {
        errors.insert("customerId".to_string(), "Customer ID is required".to_string());
    }

    if is_blank(&request.customer_email) {
        errors.insert(
            "customerEmail".to_string(),
            "Customer email is required".to_string(),
        );
    } else if !is_valid_email(&request.customer_email) {
        errors.insert("customerEmail".to_string(), "Invalid email format".to_string());
    }

    if is_blank(&request.customer_name) {
        errors.insert(
            "customerName".to_string(),
            "Customer name is required".to_string(),
        );
    }

    if is_blank(&request.subject) {
        errors.insert("subject".to_string(), "Subject is required".to_string());
    } else if let Some(message) = check_subject(&request.subject) {
        errors.insert("subject".to_string(), message);
    }

    if is_blank(&request.description) {
        errors.insert("description".to_string(), "Description is required".to_string());
    } else if let Some(message) = check_description(&request.description) {
        errors.insert("description".to_string(), message);
    }

    // Typed enums are valid by construction; nothing to check for them here.

    into_result("Validation failed", errors)
}

/// Checks a raw snake_case record before normalization, including the
/// optional enum columns that normalization would silently drop.
pub fn validate_import_record(record: &BTreeMap<String, String>) -> Result<()> {
    let mut errors = BTreeMap::new();

    for field in REQUIRED_FIELDS {
        if record.get(field).map_or(true, |v| is_blank(v)) {
            errors.insert(field.to_string(), format!("{} is required", field));
        }
    }

    if let Some(email) = record.get("customer_email") {
        if !is_blank(email) && !is_valid_email(email) {
            errors.insert("customer_email".to_string(), "Invalid email format".to_string());
        }
    }

    if let Some(message) = record.get("subject").and_then(|s| check_subject(s)) {
        errors.insert("subject".to_string(), message);
    }

    if let Some(description) = record.get("description") {
        if !is_blank(description) {
            if let Some(message) = check_description(description) {
                errors.insert("description".to_string(), message);
            }
        }
    }

    check_enum::<Category>(record, "category", &mut errors);
    check_enum::<Priority>(record, "priority", &mut errors);
    check_enum::<Status>(record, "status", &mut errors);

    into_result("Record validation failed", errors)
}

fn check_enum<T: FromStr>(
    record: &BTreeMap<String, String>,
    field: &str,
    errors: &mut BTreeMap<String, String>,
) {
    if let Some(value) = record.get(field).filter(|v| !v.is_empty()) {
        if !is_valid_enum_value::<T>(value) {
            errors.insert(field.to_string(), format!("Invalid {} value: {}", field, value));
        }
    }
}

/// Validates many raw records; failing rows map (1-based) to their message.
pub fn validate_import_batch(records: &[BTreeMap<String, String>]) -> BTreeMap<usize, String> {
    records
        .iter()
        .enumerate()
        .filter_map(|(index, record)| {
            validate_import_record(record)
                .err()
                .map(|e| (index + 1, e.user_friendly_message()))
        })
        .collect()
}
