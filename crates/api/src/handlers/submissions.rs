//! Handlers for submitting a form and reviewing its submissions.

use axum::extract::{FromRequest, Multipart, Path, Query, Request, State};
use axum::http::header::CONTENT_TYPE;
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::Json;
use serde::{Deserialize, Serialize};

use sanjesh_core::attachments::PendingUpload;
use sanjesh_core::error::CoreError;
use sanjesh_core::pagination::Pagination;
use sanjesh_core::submission::{ResponseEntry, SubmissionStatus};
use sanjesh_core::types::DbId;
use sanjesh_db::models::submission::FormSubmission;
use sanjesh_db::repositories::SubmissionRepo;

use crate::engine::access::{load_editable_form, load_viewable_form};
use crate::engine::submission::{submit, SubmissionPayload};
use crate::error::{AppError, AppResult};
use crate::middleware::rbac::{RequireAuth, RequireAuthor};
use crate::query::ListParams;
use crate::response::DataResponse;
use crate::state::AppState;

/// Name of the multipart part carrying the JSON responses.
const RESPONSES_PART: &str = "responses";

// ---------------------------------------------------------------------------
// Payload extraction
// ---------------------------------------------------------------------------

/// JSON body of `POST /forms/{id}/submit`.
#[derive(Debug, Deserialize)]
pub struct SubmitRequest {
    #[serde(default)]
    pub responses: Vec<ResponseEntry>,
}

/// Parse the `responses` part: either a bare array or `{ "responses": [...] }`.
fn parse_responses_part(text: &str) -> AppResult<Vec<ResponseEntry>> {
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Part {
        List(Vec<ResponseEntry>),
        Wrapped(SubmitRequest),
    }

    match serde_json::from_str::<Part>(text) {
        Ok(Part::List(responses)) => Ok(responses),
        Ok(Part::Wrapped(body)) => Ok(body.responses),
        Err(e) => Err(AppError::BadRequest(format!("Invalid responses part: {e}"))),
    }
}

/// Field id of a `files[<field_id>]` part name.
fn file_part_field(name: &str) -> Option<&str> {
    name.strip_prefix("files[")?
        .strip_suffix(']')
        .filter(|id| !id.is_empty())
}

impl FromRequest<AppState> for SubmissionPayload {
    type Rejection = AppError;

    async fn from_request(req: Request, state: &AppState) -> Result<Self, Self::Rejection> {
        let is_multipart = req
            .headers()
            .get(CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .is_some_and(|ct| ct.starts_with("multipart/form-data"));

        if !is_multipart {
            let Json(body) = Json::<SubmitRequest>::from_request(req, state)
                .await
                .map_err(|e| AppError::BadRequest(e.body_text()))?;
            return Ok(SubmissionPayload {
                responses: body.responses,
                uploads: Vec::new(),
            });
        }

        let mut multipart = Multipart::from_request(req, state)
            .await
            .map_err(|e| AppError::BadRequest(e.body_text()))?;

        let mut payload = SubmissionPayload::default();
        while let Some(field) = multipart
            .next_field()
            .await
            .map_err(|e| AppError::BadRequest(e.to_string()))?
        {
            let name = field.name().unwrap_or_default().to_string();

            if name == RESPONSES_PART {
                let text = field
                    .text()
                    .await
                    .map_err(|e| AppError::BadRequest(e.to_string()))?;
                payload.responses = parse_responses_part(&text)?;
                continue;
            }

            let Some(field_id) = file_part_field(&name).map(str::to_string) else {
                return Err(AppError::BadRequest(format!(
                    "Unexpected multipart part '{name}'"
                )));
            };
            let file_name = field.file_name().unwrap_or("upload").to_string();
            let content_type = field.content_type().map(str::to_string);
            let data = field
                .bytes()
                .await
                .map_err(|e| AppError::BadRequest(e.to_string()))?;

            payload.uploads.push(PendingUpload {
                field_id,
                file_name,
                content_type,
                data: data.to_vec(),
            });
        }

        Ok(payload)
    }
}

// ---------------------------------------------------------------------------
// Views
// ---------------------------------------------------------------------------

#[derive(Debug, Serialize)]
pub struct SubmitResponse {
    pub success: bool,
    pub message: String,
    pub submission: FormSubmission,
}

#[derive(Debug, Serialize)]
pub struct SubmissionPage {
    pub submissions: Vec<FormSubmission>,
    pub pagination: Pagination,
}

/// Request body for `PATCH /forms/{id}/submissions/{submission_id}/status`.
#[derive(Debug, Deserialize)]
pub struct ReviewRequest {
    pub status: SubmissionStatus,
}

// ---------------------------------------------------------------------------
// Handlers
// ---------------------------------------------------------------------------

/// POST /api/v1/forms/{id}/submit
///
/// Submit a form as JSON, or as multipart with a `responses` part plus
/// `files[<field_id>]` parts.
pub async fn submit_form(
    RequireAuth(user): RequireAuth,
    State(state): State<AppState>,
    Path(form_id): Path<DbId>,
    payload: SubmissionPayload,
) -> AppResult<impl IntoResponse> {
    let outcome = submit(&state, &user, form_id, payload).await?;
    Ok((
        StatusCode::CREATED,
        Json(DataResponse {
            data: SubmitResponse {
                success: true,
                message: outcome.success_message,
                submission: outcome.submission,
            },
        }),
    ))
}

/// GET /api/v1/forms/{id}/my-submission
///
/// The caller's latest submission to the form, or `null`.
pub async fn my_submission(
    RequireAuth(user): RequireAuth,
    State(state): State<AppState>,
    Path(form_id): Path<DbId>,
) -> AppResult<impl IntoResponse> {
    load_viewable_form(&state.pool, &user, form_id).await?;
    let latest = SubmissionRepo::latest_for_user(&state.pool, form_id, user.user_id).await?;
    Ok(Json(DataResponse { data: latest }))
}

/// GET /api/v1/forms/{id}/submissions?status=&limit=&offset=
///
/// Submissions of a form, for reviewers allowed to edit it.
pub async fn list_submissions(
    RequireAuthor(user): RequireAuthor,
    State(state): State<AppState>,
    Path(form_id): Path<DbId>,
    Query(params): Query<ListParams>,
) -> AppResult<impl IntoResponse> {
    load_editable_form(&state.pool, &user, form_id).await?;

    let status = params
        .status_filter()
        .map(SubmissionStatus::from_str_db)
        .transpose()?;
    let (limit, offset) = params.window();

    let total = SubmissionRepo::count_for_form(&state.pool, form_id, status).await?;
    let submissions =
        SubmissionRepo::list_for_form(&state.pool, form_id, status, limit, offset).await?;

    Ok(Json(DataResponse {
        data: SubmissionPage {
            submissions,
            pagination: Pagination {
                total,
                limit,
                offset,
            },
        },
    }))
}

/// PATCH /api/v1/forms/{id}/submissions/{submission_id}/status
///
/// Move a submission through the review lifecycle.
pub async fn review_submission(
    RequireAuthor(user): RequireAuthor,
    State(state): State<AppState>,
    Path((form_id, submission_id)): Path<(DbId, DbId)>,
    Json(input): Json<ReviewRequest>,
) -> AppResult<impl IntoResponse> {
    load_editable_form(&state.pool, &user, form_id).await?;

    let not_found = || {
        AppError::Core(CoreError::NotFound {
            entity: "Submission",
            id: submission_id,
        })
    };
    let submission = SubmissionRepo::find_by_id(&state.pool, submission_id)
        .await?
        .filter(|s| s.form_id == form_id)
        .ok_or_else(not_found)?;

    let current = submission.status()?;
    let next = current.transition(input.status)?;

    let updated = SubmissionRepo::update_status(&state.pool, submission_id, current, next, user.user_id)
        .await?
        .ok_or_else(|| {
            AppError::Core(CoreError::Conflict(
                "The submission was changed by another reviewer".into(),
            ))
        })?;

    tracing::info!(
        user_id = user.user_id,
        form_id,
        submission_id,
        from = current.as_str(),
        to = next.as_str(),
        "Submission status changed"
    );

    Ok(Json(DataResponse { data: updated }))
}
