use crate::error::{CampusDbError, Result};
use crate::schema::{FieldKind, Record, NOT_APPLICABLE};
use regex::Regex;
use std::sync::OnceLock;

/// Result of validating a record
#[derive(Debug, Clone, Default)]
pub struct ValidationResult {
    pub errors: Vec<String>,
}

impl ValidationResult {
    pub fn is_ok(&self) -> bool {
        self.errors.is_empty()
    }

    /// Turn a failed result into [`CampusDbError::Validation`].
    pub fn into_result(self) -> Result<()> {
        if self.is_ok() {
            Ok(())
        } else {
            Err(CampusDbError::Validation(self.errors))
        }
    }
}

fn student_id_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| Regex::new(r"^\d{4}-\d{4}$").expect("static pattern"))
}

fn name_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| Regex::new(r"^[\p{Alphabetic} -]+$").expect("static pattern"))
}

fn code_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| Regex::new(r"^\p{Alphabetic}+$").expect("static pattern"))
}

/// Check a single value against its declared kind.
/// Returns the reason on failure; `field_name` is only used in the message.
pub fn validate_value(
    field_name: &str,
    kind: FieldKind,
    value: &str,
) -> std::result::Result<(), String> {
    if value.trim().is_empty() {
        return Err(format!("Field '{field_name}' is required"));
    }

    match kind {
        FieldKind::StudentId => {
            if !student_id_pattern().is_match(value) {
                return Err(format!(
                    "Field '{field_name}' must be in the format YYYY-NNNN (e.g. 2024-1234), got '{value}'"
                ));
            }
        }
        FieldKind::PersonName | FieldKind::EntityName => {
            if !name_pattern().is_match(value) {
                return Err(format!(
                    "Field '{field_name}' may only contain letters, spaces and hyphens, got '{value}'"
                ));
            }
        }
        FieldKind::Code => {
            if !code_pattern().is_match(value) {
                return Err(format!(
                    "Field '{field_name}' may only contain letters, got '{value}'"
                ));
            }
        }
        FieldKind::Gender => {
            if value != "Male" && value != "Female" {
                return Err(format!(
                    "Field '{field_name}' must be 'Male' or 'Female', got '{value}'"
                ));
            }
        }
        FieldKind::Year => {
            if !matches!(value, "1" | "2" | "3" | "4") {
                return Err(format!(
                    "Field '{field_name}' must be one of 1, 2, 3, 4, got '{value}'"
                ));
            }
        }
        FieldKind::Reference { nullable } => {
            if !nullable && value == NOT_APPLICABLE {
                return Err(format!("Field '{field_name}' must reference an existing record"));
            }
        }
    }

    Ok(())
}

/// Validate every field of a record, collecting all violations.
pub fn validate_record<R: Record>(record: &R) -> ValidationResult {
    let mut result = ValidationResult::default();
    for (field, value) in record.fields() {
        if let Err(message) = validate_value(field.name, field.kind, value) {
            result.errors.push(message);
        }
    }
    result
}

/// Validate an edited record against its stored version.
///
/// Hand-entered names and codes are format-checked only when they changed,
/// so records loaded from the default catalog stay editable. Presence is
/// always checked, and every other kind is validated in full.
pub fn validate_changes<R: Record>(record: &R, previous: &R) -> ValidationResult {
    let before = previous.values();
    validate_with(record, |i, kind, value| {
        is_hand_entered(kind) && before.get(i) == Some(&value)
    })
}

/// Validate a record as found on disk. Hand-entered names and codes and
/// denormalized references are only checked for presence: a detached
/// reference is a legitimate stored state.
pub fn validate_stored<R: Record>(record: &R) -> ValidationResult {
    validate_with(record, |_, kind, _| {
        is_hand_entered(kind) || matches!(kind, FieldKind::Reference { .. })
    })
}

fn is_hand_entered(kind: FieldKind) -> bool {
    matches!(kind, FieldKind::EntityName | FieldKind::Code)
}

fn validate_with<R: Record>(
    record: &R,
    presence_only: impl Fn(usize, FieldKind, &str) -> bool,
) -> ValidationResult {
    let mut result = ValidationResult::default();

    for (i, (field, value)) in record.fields().into_iter().enumerate() {
        let check = if presence_only(i, field.kind, value) {
            if value.trim().is_empty() {
                Err(format!("Field '{}' is required", field.name))
            } else {
                Ok(())
            }
        } else {
            validate_value(field.name, field.kind, value)
        };

        if let Err(message) = check {
            result.errors.push(message);
        }
    }
    result
}
