//! Validation helpers for DTOs.

use validator::ValidationError;

use crate::dto::parse_timestamp;

/// Longest accepted free-text field (names, labels, locations).
pub const MAX_TEXT_LEN: usize = 120;
/// Lowest accepted skill level.
pub const MIN_SKILL_LEVEL: i32 = 1;
/// Highest accepted skill level.
pub const MAX_SKILL_LEVEL: i32 = 5;

const MIN_PHONE_DIGITS: usize = 6;
const MAX_PHONE_DIGITS: usize = 15;

fn error(code: &'static str, message: String) -> ValidationError {
    let mut err = ValidationError::new(code);
    err.message = Some(message.into());
    err
}

/// Reduce a phone number to its digits, keeping a leading `+`.
///
/// Spaces, dashes, dots and parentheses are dropped so that `+1 (555) 010-2030`
/// and `+15550102030` identify the same contact. Returns `None` for anything
/// else or when the digit count falls outside 6..=15.
///
/// ```ignore
/// normalize_phone("+1 (555) 010-2030") // Some("+15550102030")
/// normalize_phone("555-CALL-NOW")      // None
/// ```
pub fn normalize_phone(raw: &str) -> Option<String> {
    let trimmed = raw.trim();
    let (prefix, rest) = match trimmed.strip_prefix('+') {
        Some(rest) => ("+", rest),
        None => ("", trimmed),
    };

    let mut digits = String::with_capacity(rest.len());
    for c in rest.chars() {
        match c {
            '0'..='9' => digits.push(c),
            ' ' | '-' | '.' | '(' | ')' => {}
            _ => return None,
        }
    }

    if !(MIN_PHONE_DIGITS..=MAX_PHONE_DIGITS).contains(&digits.len()) {
        return None;
    }

    Some(format!("{prefix}{digits}"))
}

/// Validates that a phone number can be normalized.
pub fn validate_phone(raw: &str) -> Result<(), ValidationError> {
    if normalize_phone(raw).is_none() {
        return Err(error(
            "phone_format",
            format!(
                "Phone must hold {MIN_PHONE_DIGITS} to {MAX_PHONE_DIGITS} digits, optionally prefixed with +"
            ),
        ));
    }
    Ok(())
}

/// Validates a skill level in `1..=5`.
pub fn validate_skill_level(level: i32) -> Result<(), ValidationError> {
    if !(MIN_SKILL_LEVEL..=MAX_SKILL_LEVEL).contains(&level) {
        return Err(error(
            "skill_level_range",
            format!("Skill level must be between {MIN_SKILL_LEVEL} and {MAX_SKILL_LEVEL} (got {level})"),
        ));
    }
    Ok(())
}

/// Validates a required free-text field.
pub fn validate_text(value: &str) -> Result<(), ValidationError> {
    if value.trim().is_empty() {
        return Err(error("text_blank", "Value must not be blank".into()));
    }
    if value.chars().count() > MAX_TEXT_LEN {
        return Err(error(
            "text_length",
            format!("Value must be at most {MAX_TEXT_LEN} characters"),
        ));
    }
    Ok(())
}

/// Validates an RFC 3339 timestamp.
pub fn validate_timestamp(value: &str) -> Result<(), ValidationError> {
    if parse_timestamp(value).is_none() {
        return Err(error(
            "timestamp_format",
            "Timestamp must follow RFC 3339 (e.g. 2026-05-02T18:30:00Z)".into(),
        ));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize_phone_strips_punctuation() {
        assert_eq!(
            normalize_phone("+1 (555) 010-2030").as_deref(),
            Some("+15550102030")
        );
        assert_eq!(normalize_phone("06.12.34.56.78").as_deref(), Some("0612345678"));
        assert_eq!(normalize_phone("  555010  ").as_deref(), Some("555010"));
    }

    #[test]
    fn test_normalize_phone_rejects_garbage() {
        assert!(normalize_phone("555-CALL-NOW").is_none());
        assert!(normalize_phone("12345").is_none()); // too short
        assert!(normalize_phone("1234567890123456").is_none()); // too long
        assert!(normalize_phone("++15550102030").is_none());
        assert!(normalize_phone("").is_none());
    }

    #[test]
    fn test_validate_skill_level_bounds() {
        assert!(validate_skill_level(1).is_ok());
        assert!(validate_skill_level(5).is_ok());
        assert!(validate_skill_level(0).is_err());
        assert!(validate_skill_level(6).is_err());
        assert!(validate_skill_level(-3).is_err());
    }

    #[test]
    fn test_validate_text() {
        assert!(validate_text("Riverside pitch").is_ok());
        assert!(validate_text("   ").is_err());
        assert!(validate_text(&"x".repeat(MAX_TEXT_LEN + 1)).is_err());
    }
}
