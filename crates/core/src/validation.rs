//! Input validation utilities.
//!
//! These checks run on identifiers supplied by callers before they are used to link or look up
//! records.

use crate::ValidationError;
use billcheck_uuid::{is_valid_id, BillId, BillYearWindow};
use serde_json::Value;

/// Validates an identifier referencing another entity.
///
/// Returns `value` unchanged when it is non-empty and has the 8-4-4-4-12 hex grouping.
///
/// # Errors
///
/// Returns [`ValidationError::Missing`] for an empty value and [`ValidationError::Malformed`]
/// for anything that is not a well-formed identifier. Both name `field_name`.
pub fn validate_foreign_key<'a>(
    value: &'a str,
    field_name: &str,
) -> Result<&'a str, ValidationError> {
    if value.is_empty() {
        return Err(ValidationError::missing(field_name));
    }

    if !is_valid_id(value) {
        return Err(ValidationError::malformed(field_name, value));
    }

    Ok(value)
}

/// Validates a foreign key held in an untyped field.
///
/// An absent, `null` or empty-string value is missing; any other non-string is malformed.
pub fn validate_foreign_key_value<'a>(
    value: Option<&'a Value>,
    field_name: &str,
) -> Result<&'a str, ValidationError> {
    match value {
        None | Some(Value::Null) => Err(ValidationError::missing(field_name)),
        Some(Value::String(s)) => validate_foreign_key(s, field_name),
        Some(other) => Err(ValidationError::malformed(field_name, other.to_string())),
    }
}

/// Validates a composite bill identifier in a context where it must be valid.
///
/// # Errors
///
/// Returns [`ValidationError::Missing`] for an empty value and
/// [`ValidationError::InvalidBillId`] when the identifier breaks any of the composite rules.
pub fn validate_bill_id(
    value: &str,
    field_name: &str,
    window: BillYearWindow,
) -> Result<BillId, ValidationError> {
    if value.is_empty() {
        return Err(ValidationError::missing(field_name));
    }

    BillId::parse_with(value, window).map_err(|e| {
        tracing::debug!(field = field_name, error = %e, "rejected bill id");
        ValidationError::InvalidBillId {
            field: field_name.to_string(),
            value: value.to_string(),
        }
    })
}
