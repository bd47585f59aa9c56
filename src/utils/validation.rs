use crate::utils::error::{IntakeError, Result};

pub trait Validate {
    fn validate(&self) -> Result<()>;
}

pub fn validate_path(field_name: &str, path: &str) -> Result<()> {
    if path.is_empty() {
        return Err(IntakeError::InvalidConfigValue {
            field: field_name.to_string(),
            value: path.to_string(),
            reason: "Path cannot be empty".to_string(),
        });
    }

    if path.contains('\0') {
        return Err(IntakeError::InvalidConfigValue {
            field: field_name.to_string(),
            value: path.to_string(),
            reason: "Path contains null bytes".to_string(),
        });
    }

    Ok(())
}

pub fn validate_positive_number(field_name: &str, value: u64, min_value: u64) -> Result<()> {
    if value < min_value {
        return Err(IntakeError::InvalidConfigValue {
            field: field_name.to_string(),
            value: value.to_string(),
            reason: format!("Value must be at least {}", min_value),
        });
    }
    Ok(())
}

pub fn validate_required_field<'a, T>(field_name: &str, value: &'a Option<T>) -> Result<&'a T> {
    value.as_ref().ok_or_else(|| IntakeError::MissingConfig {
        field: field_name.to_string(),
    })
}

pub fn validate_non_empty_string(field_name: &str, value: &str) -> Result<()> {
    if value.trim().is_empty() {
        return Err(IntakeError::InvalidConfigValue {
            field: field_name.to_string(),
            value: value.to_string(),
            reason: "Value cannot be empty or whitespace-only".to_string(),
        });
    }
    Ok(())
}

/// Case-insensitive membership check against a fixed list of choices.
pub fn validate_one_of(field_name: &str, value: &str, allowed: &[&str]) -> Result<()> {
    if allowed.iter().any(|choice| choice.eq_ignore_ascii_case(value.trim())) {
        return Ok(());
    }
    Err(IntakeError::InvalidConfigValue {
        field: field_name.to_string(),
        value: value.to_string(),
        reason: format!("Expected one of: {}", allowed.join(", ")),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_path() {
        assert!(validate_path("output", "./report.json").is_ok());
        assert!(validate_path("output", "").is_err());
        assert!(validate_path("output", "bad\0path").is_err());
    }

    #[test]
    fn test_validate_positive_number() {
        assert!(validate_positive_number("import.batch_size", 1, 1).is_ok());
        match validate_positive_number("import.batch_size", 0, 1) {
            Err(IntakeError::InvalidConfigValue { field, reason, .. }) => {
                assert_eq!(field, "import.batch_size");
                assert_eq!(reason, "Value must be at least 1");
            }
            other => panic!("unexpected result: {other:?}"),
        }
    }

    #[test]
    fn test_validate_required_field() {
        let present = Some(5);
        assert_eq!(*validate_required_field("batch", &present).unwrap(), 5);
        let absent: Option<u32> = None;
        assert!(matches!(
            validate_required_field("batch", &absent),
            Err(IntakeError::MissingConfig { .. })
        ));
    }

    #[test]
    fn test_validate_non_empty_string() {
        assert!(validate_non_empty_string("format", "CSV").is_ok());
        assert!(validate_non_empty_string("format", "   ").is_err());
    }

    #[test]
    fn test_validate_one_of() {
        assert!(validate_one_of("logging.level", "DEBUG", &["info", "debug"]).is_ok());
        assert!(validate_one_of("logging.level", "loud", &["info", "debug"]).is_err());
    }
}
