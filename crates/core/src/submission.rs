//! Submission validation and lifecycle rules.
//!
//! - [`validate_responses`] re-applies every field rule server-side and
//!   reports all violations, one per failing field.
//! - [`SubmissionStatus`] is the review state machine
//!   (`submitted -> reviewed -> approved | rejected`).
//! - [`ensure_can_submit`] enforces the single-submission rule ahead of the
//!   storage-level unique index.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::{CoreError, FieldError};
use crate::field_types::check_value;
use crate::form::FormField;
use crate::types::DbId;

/// One answer in a submission.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResponseEntry {
    pub field_id: String,
    #[serde(default)]
    pub value: Value,
}

/// Index responses by field id. A later entry for the same field wins.
pub fn index_responses(responses: &[ResponseEntry]) -> HashMap<&str, &Value> {
    responses
        .iter()
        .map(|r| (r.field_id.as_str(), &r.value))
        .collect()
}

/// Validate a candidate response set against the form's fields.
///
/// Every field is checked in form order and every violation is collected.
pub fn validate_responses(fields: &[FormField], responses: &[ResponseEntry]) -> Result<(), CoreError> {
    let errors = collect_errors(fields, responses);
    if errors.is_empty() {
        Ok(())
    } else {
        Err(CoreError::FieldValidation(errors))
    }
}

/// All field errors for a candidate response set, in form order.
pub fn collect_errors(fields: &[FormField], responses: &[ResponseEntry]) -> Vec<FieldError> {
    let index = index_responses(responses);
    let mut ordered: Vec<&FormField> = fields.iter().collect();
    ordered.sort_by_key(|f| f.order);
    ordered
        .into_iter()
        .filter_map(|field| check_value(field, index.get(field.id.as_str()).copied()))
        .collect()
}

/// Rebuild the stored response array: one entry per form field in form
/// order, `null` for unanswered fields. Answers to unknown fields are dropped.
pub fn normalize_responses(fields: &[FormField], responses: &[ResponseEntry]) -> Vec<ResponseEntry> {
    let index = index_responses(responses);
    let mut ordered: Vec<&FormField> = fields.iter().collect();
    ordered.sort_by_key(|f| f.order);
    ordered
        .into_iter()
        .map(|field| ResponseEntry {
            field_id: field.id.clone(),
            value: index
                .get(field.id.as_str())
                .map(|v| (*v).clone())
                .unwrap_or(Value::Null),
        })
        .collect()
}

// ---------------------------------------------------------------------------
// Status lifecycle
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SubmissionStatus {
    Submitted,
    Reviewed,
    Approved,
    Rejected,
}

impl SubmissionStatus {
    pub fn from_str_db(s: &str) -> Result<Self, CoreError> {
        match s {
            "submitted" => Ok(Self::Submitted),
            "reviewed" => Ok(Self::Reviewed),
            "approved" => Ok(Self::Approved),
            "rejected" => Ok(Self::Rejected),
            _ => Err(CoreError::Validation(format!(
                "Invalid submission status '{s}'. Must be one of: submitted, reviewed, approved, rejected"
            ))),
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Submitted => "submitted",
            Self::Reviewed => "reviewed",
            Self::Approved => "approved",
            Self::Rejected => "rejected",
        }
    }

    pub fn is_terminal(self) -> bool {
        matches!(self, Self::Approved | Self::Rejected)
    }

    pub fn can_transition_to(self, next: Self) -> bool {
        match self {
            Self::Submitted => matches!(next, Self::Reviewed | Self::Approved | Self::Rejected),
            Self::Reviewed => matches!(next, Self::Approved | Self::Rejected),
            Self::Approved | Self::Rejected => false,
        }
    }

    /// Validate a reviewer transition, returning the new status.
    pub fn transition(self, next: Self) -> Result<Self, CoreError> {
        if self.can_transition_to(next) {
            Ok(next)
        } else {
            Err(CoreError::Conflict(format!(
                "Cannot move a submission from '{}' to '{}'",
                self.as_str(),
                next.as_str()
            )))
        }
    }
}

// ---------------------------------------------------------------------------
// Single-submission rule
// ---------------------------------------------------------------------------

/// Reject a new submission when the user already has one and the form does
/// not allow several.
pub fn ensure_can_submit(
    form_id: DbId,
    allow_multiple: bool,
    existing_submissions: i64,
) -> Result<(), CoreError> {
    if !allow_multiple && existing_submissions > 0 {
        return Err(CoreError::DuplicateSubmission { form_id });
    }
    Ok(())
}
