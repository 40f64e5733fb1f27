use serde::{Deserialize, Serialize};

use crate::types::DbId;

/// A single field-level rule violation found while validating responses.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldError {
    pub field_id: String,
    pub label: String,
    /// Machine-readable rule name (`required`, `min_length`, `option`, ...).
    pub rule: String,
    pub message: String,
}

impl FieldError {
    pub fn new(field_id: &str, label: &str, rule: &str, message: impl Into<String>) -> Self {
        Self {
            field_id: field_id.to_string(),
            label: label.to_string(),
            rule: rule.to_string(),
            message: message.into(),
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum CoreError {
    #[error("Entity not found: {entity} with id {id}")]
    NotFound { entity: &'static str, id: DbId },

    #[error("Validation failed: {0}")]
    Validation(String),

    /// Field-level violations, one entry per failing field.
    #[error("Validation failed for {} field(s)", .0.len())]
    FieldValidation(Vec<FieldError>),

    #[error("Form {form_id} has already been submitted by this user")]
    DuplicateSubmission { form_id: DbId },

    #[error("Attachment error: {0}")]
    Attachment(String),

    #[error("Conflict: {0}")]
    Conflict(String),

    #[error("Unauthorized: {0}")]
    Unauthorized(String),

    #[error("Forbidden: {0}")]
    Forbidden(String),

    #[error("Internal error: {0}")]
    Internal(String),
}
