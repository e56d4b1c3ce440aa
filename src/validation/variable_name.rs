//! Channel variable name validation.

use crate::error::{ModuleError, ValidationErrorKind};

/// Maximum length of a channel variable name.
const MAX_VARIABLE_NAME_LENGTH: usize = 80;

/// Validate a dialplan variable name.
///
/// Rules:
/// - Must not be empty or exceed 80 characters
/// - May only contain ASCII letters, digits, `_`, `-` and `.`
///
/// Leading underscores (variable inheritance markers) are accepted.
pub fn validate_variable_name(name: &str) -> Result<&str, ModuleError> {
    let invalid = || ModuleError::Validation {
        kind: ValidationErrorKind::InvalidVariableName {
            name: name.to_string(),
        },
    };

    if name.is_empty() || name.len() > MAX_VARIABLE_NAME_LENGTH {
        return Err(invalid());
    }

    if !name
        .chars()
        .all(|c| c.is_ascii_alphanumeric() || matches!(c, '_' | '-' | '.'))
    {
        return Err(invalid());
    }

    Ok(name)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_valid_names() {
        assert_eq!(validate_variable_name("X").unwrap(), "X");
        assert!(validate_variable_name("RESULT_1").is_ok());
        assert!(validate_variable_name("__INHERITED").is_ok());
        assert!(validate_variable_name("my.var-2").is_ok());
    }

    #[test]
    fn test_invalid_names() {
        assert!(validate_variable_name("").is_err());
        assert!(validate_variable_name("HAS SPACE").is_err());
        assert!(validate_variable_name("A=B").is_err());
        assert!(validate_variable_name("CDR(userfield)").is_err());
        assert!(validate_variable_name(&"V".repeat(81)).is_err());
    }
}
