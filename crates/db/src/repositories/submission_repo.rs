//! Repository for the `form_submissions` table.

use sqlx::types::Json;
use sqlx::PgPool;
use sanjesh_core::error::CoreError;
use sanjesh_core::submission::SubmissionStatus;
use sanjesh_core::types::DbId;

use crate::is_unique_violation;
use crate::models::submission::{CreateSubmission, FormSubmission, UserSubmissionState};

/// Column list for form_submissions queries.
const COLUMNS: &str = "id, form_id, user_id, responses, status, is_single_submission, \
    reviewed_by, reviewed_at, created_at, updated_at";

/// Partial unique index guarding single-submission forms.
pub const SINGLE_SUBMISSION_CONSTRAINT: &str = "uq_form_submissions_single";

/// Error returned by [`SubmissionRepo::create`].
#[derive(Debug, thiserror::Error)]
pub enum CreateSubmissionError {
    /// The single-submission index rejected the row.
    #[error(transparent)]
    Duplicate(CoreError),

    #[error(transparent)]
    Database(#[from] sqlx::Error),
}

/// Provides persistence for submissions.
pub struct SubmissionRepo;

impl SubmissionRepo {
    /// Insert a new submission in the `submitted` state.
    ///
    /// A concurrent second submission to a single-submission form fails on
    /// the partial unique index and is reported as
    /// [`CreateSubmissionError::Duplicate`].
    pub async fn create(
        pool: &PgPool,
        input: &CreateSubmission,
    ) -> Result<FormSubmission, CreateSubmissionError> {
        let query = format!(
            "INSERT INTO form_submissions (form_id, user_id, responses, status, is_single_submission)
             VALUES ($1, $2, $3, $4, $5)
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, FormSubmission>(&query)
            .bind(input.form_id)
            .bind(input.user_id)
            .bind(Json(&input.responses))
            .bind(SubmissionStatus::Submitted.as_str())
            .bind(input.is_single_submission)
            .fetch_one(pool)
            .await
            .map_err(|err| {
                if is_unique_violation(&err, SINGLE_SUBMISSION_CONSTRAINT) {
                    CreateSubmissionError::Duplicate(CoreError::DuplicateSubmission {
                        form_id: input.form_id,
                    })
                } else {
                    CreateSubmissionError::Database(err)
                }
            })
    }

    /// Number of submissions `user_id` has made to `form_id`.
    pub async fn count_for_user(
        pool: &PgPool,
        form_id: DbId,
        user_id: DbId,
    ) -> Result<i64, sqlx::Error> {
        sqlx::query_scalar::<_, i64>(
            "SELECT COUNT(*) FROM form_submissions WHERE form_id = $1 AND user_id = $2",
        )
        .bind(form_id)
        .bind(user_id)
        .fetch_one(pool)
        .await
    }

    /// The user's most recent submission to a form.
    pub async fn latest_for_user(
        pool: &PgPool,
        form_id: DbId,
        user_id: DbId,
    ) -> Result<Option<FormSubmission>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM form_submissions
             WHERE form_id = $1 AND user_id = $2
             ORDER BY created_at DESC, id DESC
             LIMIT 1"
        );
        sqlx::query_as::<_, FormSubmission>(&query)
            .bind(form_id)
            .bind(user_id)
            .fetch_optional(pool)
            .await
    }

    /// Submission count and latest status per form for one user.
    ///
    /// Forms the user never submitted are absent from the result.
    pub async fn states_for_user(
        pool: &PgPool,
        user_id: DbId,
        form_ids: &[DbId],
    ) -> Result<Vec<UserSubmissionState>, sqlx::Error> {
        sqlx::query_as::<_, UserSubmissionState>(
            "SELECT DISTINCT ON (form_id)
                form_id,
                COUNT(*) OVER (PARTITION BY form_id) AS submission_count,
                status AS latest_status
             FROM form_submissions
             WHERE user_id = $1 AND form_id = ANY($2)
             ORDER BY form_id, created_at DESC, id DESC",
        )
        .bind(user_id)
        .bind(form_ids)
        .fetch_all(pool)
        .await
    }

    /// List submissions of a form for reviewers, newest first.
    pub async fn list_for_form(
        pool: &PgPool,
        form_id: DbId,
        status: Option<SubmissionStatus>,
        limit: i64,
        offset: i64,
    ) -> Result<Vec<FormSubmission>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM form_submissions
             WHERE form_id = $1 AND ($2::TEXT IS NULL OR status = $2)
             ORDER BY created_at DESC, id DESC
             LIMIT $3 OFFSET $4"
        );
        sqlx::query_as::<_, FormSubmission>(&query)
            .bind(form_id)
            .bind(status.map(|s| s.as_str()))
            .bind(limit)
            .bind(offset)
            .fetch_all(pool)
            .await
    }

    /// Count the rows [`SubmissionRepo::list_for_form`] pages over.
    pub async fn count_for_form(
        pool: &PgPool,
        form_id: DbId,
        status: Option<SubmissionStatus>,
    ) -> Result<i64, sqlx::Error> {
        sqlx::query_scalar::<_, i64>(
            "SELECT COUNT(*) FROM form_submissions
             WHERE form_id = $1 AND ($2::TEXT IS NULL OR status = $2)",
        )
        .bind(form_id)
        .bind(status.map(|s| s.as_str()))
        .fetch_one(pool)
        .await
    }

    /// Find a submission by its ID.
    pub async fn find_by_id(pool: &PgPool, id: DbId) -> Result<Option<FormSubmission>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM form_submissions WHERE id = $1");
        sqlx::query_as::<_, FormSubmission>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    /// Move a submission from `from` to `to`, recording the reviewer.
    ///
    /// The update only applies while the row still holds `from`; `None`
    /// means the row is missing or another reviewer changed it first.
    pub async fn update_status(
        pool: &PgPool,
        id: DbId,
        from: SubmissionStatus,
        to: SubmissionStatus,
        reviewer_id: DbId,
    ) -> Result<Option<FormSubmission>, sqlx::Error> {
        let query = format!(
            "UPDATE form_submissions
             SET status = $3, reviewed_by = $4, reviewed_at = NOW()
             WHERE id = $1 AND status = $2
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, FormSubmission>(&query)
            .bind(id)
            .bind(from.as_str())
            .bind(to.as_str())
            .bind(reviewer_id)
            .fetch_optional(pool)
            .await
    }
}
