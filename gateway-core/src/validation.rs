//! Declarative request validation and translation of constraint failures
//! into the stable public error vocabulary.

use std::collections::HashMap;

use uuid::Uuid;
use validator::{ValidationError, ValidationErrors, ValidationErrorsKind};

use crate::error::ResponseErrorMessage;

/// Constraint tag for the US postal code check. A failure on this tag maps
/// to the dedicated ZIP error no matter which field carried it.
pub const ZIP_USA_TAG: &str = "zip_usa";

/// Translation table from failing field names to public errors. Built once
/// at startup and injected through application state.
#[derive(Debug, Clone)]
pub struct ValidationConfig {
    field_errors: HashMap<&'static str, ResponseErrorMessage>,
}

impl ValidationConfig {
    pub fn new() -> Self {
        let mut field_errors = HashMap::new();
        field_errors.insert("order_id", ResponseErrorMessage::incorrect_order_id());
        field_errors.insert("order_uuid", ResponseErrorMessage::incorrect_order_id());
        field_errors.insert("psp_order_uuid", ResponseErrorMessage::incorrect_order_id());
        Self { field_errors }
    }

    /// Translate the first reported constraint failure. The zero-failure
    /// case is defensive only: the caller already knows validation failed,
    /// so an empty set still yields the generic error rather than a panic.
    pub fn translate(&self, errors: &ValidationErrors) -> ResponseErrorMessage {
        let Some((field, tag)) = first_field_error(errors) else {
            return ResponseErrorMessage::validation_failed();
        };

        let base = if tag == ZIP_USA_TAG {
            ResponseErrorMessage::incorrect_zip()
        } else {
            self.field_errors
                .get(field.as_str())
                .cloned()
                .unwrap_or_else(ResponseErrorMessage::validation_failed)
        };

        base.with_details(format!(
            "field validation for '{}' failed on the '{}' tag",
            field, tag
        ))
    }
}

impl Default for ValidationConfig {
    fn default() -> Self {
        Self::new()
    }
}

fn first_field_error(errors: &ValidationErrors) -> Option<(String, String)> {
    for (field, kind) in errors.errors() {
        match kind {
            ValidationErrorsKind::Field(field_errors) => {
                if let Some(err) = field_errors.first() {
                    return Some((field.to_string(), err.code.to_string()));
                }
            }
            ValidationErrorsKind::Struct(nested) => {
                if let Some(found) = first_field_error(nested) {
                    return Some(found);
                }
            }
            ValidationErrorsKind::List(items) => {
                for nested in items.values() {
                    if let Some(found) = first_field_error(nested) {
                        return Some(found);
                    }
                }
            }
        }
    }
    None
}

/// Field must be a canonical UUID.
pub fn validate_uuid(value: &str) -> Result<(), ValidationError> {
    Uuid::parse_str(value)
        .map(|_| ())
        .map_err(|_| ValidationError::new("uuid"))
}

/// Field may be empty, but a non-empty value must be a canonical UUID.
/// Mirrors `omitempty,uuid` semantics for string fields where the empty
/// string means "absent".
pub fn validate_uuid_or_empty(value: &str) -> Result<(), ValidationError> {
    if value.is_empty() {
        return Ok(());
    }
    validate_uuid(value)
}

/// 24-character hexadecimal object identifier.
pub fn validate_object_id(value: &str) -> Result<(), ValidationError> {
    if value.len() == 24 && value.bytes().all(|b| b.is_ascii_hexdigit()) {
        Ok(())
    } else {
        Err(ValidationError::new("hexadecimal"))
    }
}

/// US ZIP: five digits, optionally followed by a dash and four digits.
pub fn is_us_zip(value: &str) -> bool {
    let (head, tail) = match value.split_once('-') {
        Some((head, tail)) => (head, Some(tail)),
        None => (value, None),
    };
    let five = head.len() == 5 && head.bytes().all(|b| b.is_ascii_digit());
    match tail {
        None => five,
        Some(t) => five && t.len() == 4 && t.bytes().all(|b| b.is_ascii_digit()),
    }
}
