//! Form submission rows.

use serde::Serialize;
use sqlx::types::Json;
use sqlx::FromRow;
use sanjesh_core::error::CoreError;
use sanjesh_core::submission::{ResponseEntry, SubmissionStatus};
use sanjesh_core::types::{DbId, Timestamp};

/// A row from the `form_submissions` table.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct FormSubmission {
    pub id: DbId,
    pub form_id: DbId,
    pub user_id: DbId,
    pub responses: Json<Vec<ResponseEntry>>,
    pub status: String,
    pub is_single_submission: bool,
    pub reviewed_by: Option<DbId>,
    pub reviewed_at: Option<Timestamp>,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

impl FormSubmission {
    pub fn status(&self) -> Result<SubmissionStatus, CoreError> {
        SubmissionStatus::from_str_db(&self.status)
    }
}

/// DTO for inserting a new submission.
#[derive(Debug, Clone)]
pub struct CreateSubmission {
    pub form_id: DbId,
    pub user_id: DbId,
    pub responses: Vec<ResponseEntry>,
    /// Copied from the form's settings; drives the partial unique index.
    pub is_single_submission: bool,
}

/// Per-form submission state of one user, used to annotate form listings.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct UserSubmissionState {
    pub form_id: DbId,
    pub submission_count: i64,
    pub latest_status: String,
}
