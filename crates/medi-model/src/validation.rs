//! Field-level validation helpers shared by the create/update payloads.

use crate::error::{ModelError, ModelResult};

/// Maximum length for short text fields (names, numbers, departments).
pub const MAX_SHORT_TEXT: usize = 200;

/// Maximum length for free text fields (notes, history, chat messages).
pub const MAX_LONG_TEXT: usize = 10_000;

/// The ABO/Rh blood groups accepted by the registry, in canonical spelling.
pub const BLOOD_TYPES: [&str; 8] = ["A+", "A-", "B+", "B-", "AB+", "AB-", "O+", "O-"];

/// Require a non-blank short text value.
pub fn require_text(field: &'static str, value: &str) -> ModelResult<()> {
    if value.trim().is_empty() {
        return Err(ModelError::validation(field, "must not be empty"));
    }
    check_len(field, value, MAX_SHORT_TEXT)
}

/// Check an optional short text value, if present.
pub fn optional_text(field: &'static str, value: Option<&str>) -> ModelResult<()> {
    value.map_or(Ok(()), |v| check_len(field, v, MAX_SHORT_TEXT))
}

/// Check an optional free text value, if present.
pub fn optional_long_text(field: &'static str, value: Option<&str>) -> ModelResult<()> {
    value.map_or(Ok(()), |v| check_len(field, v, MAX_LONG_TEXT))
}

fn check_len(field: &'static str, value: &str, max: usize) -> ModelResult<()> {
    if value.chars().count() > max {
        return Err(ModelError::validation(
            field,
            format!("must be at most {max} characters"),
        ));
    }
    Ok(())
}

/// Require one of the canonical blood group spellings (case-sensitive).
pub fn require_blood_type(field: &'static str, value: &str) -> ModelResult<()> {
    if BLOOD_TYPES.contains(&value) {
        Ok(())
    } else {
        Err(ModelError::validation(
            field,
            format!("{value:?} is not one of {}", BLOOD_TYPES.join(", ")),
        ))
    }
}

/// Loose e-mail shape check: one `@` with text on both sides.
pub fn optional_email(field: &'static str, value: Option<&str>) -> ModelResult<()> {
    let Some(value) = value else {
        return Ok(());
    };
    check_len(field, value, MAX_SHORT_TEXT)?;
    match value.split_once('@') {
        Some((local, domain)) if !local.is_empty() && domain.contains('.') && !domain.contains('@') => Ok(()),
        _ => Err(ModelError::validation(field, "is not an e-mail address")),
    }
}
