//! Handlers for form definitions: authoring CRUD, audience-aware listing
//! and step planning.

use std::collections::{HashMap, HashSet};

use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::Json;
use serde::{Deserialize, Serialize};

use sanjesh_core::audience::resolve;
use sanjesh_core::error::CoreError;
use sanjesh_core::field_types::FieldKind;
use sanjesh_core::form::{AudienceTarget, FormDraft, FormField, FormSettings, FormStatus};
use sanjesh_core::pagination::{paginate, Pagination};
use sanjesh_core::roles::Role;
use sanjesh_core::steps::{first_blocking_error, plan, Step};
use sanjesh_core::submission::{index_responses, validate_responses, ResponseEntry};
use sanjesh_core::types::{DbId, Timestamp};
use sanjesh_db::models::form::{CreateForm, Form};
use sanjesh_db::repositories::{FormRepo, SubmissionRepo};

use crate::engine::access::{load_audience, load_editable_form, load_viewable_form};
use crate::error::{AppError, AppResult};
use crate::middleware::rbac::{RequireAuth, RequireAuthor};
use crate::query::ListParams;
use crate::response::DataResponse;
use crate::state::AppState;

// ---------------------------------------------------------------------------
// Views
// ---------------------------------------------------------------------------

/// A form definition as returned by the API.
#[derive(Debug, Serialize)]
pub struct FormView {
    pub id: DbId,
    pub title: String,
    pub description: Option<String>,
    pub status: FormStatus,
    pub fields: Vec<FormField>,
    pub target: AudienceTarget,
    pub settings: FormSettings,
    pub created_by: DbId,
    pub created_by_role: Role,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

impl TryFrom<Form> for FormView {
    type Error = CoreError;

    fn try_from(form: Form) -> Result<Self, Self::Error> {
        Ok(Self {
            status: form.status()?,
            target: form.target()?,
            created_by_role: form.creator_role()?,
            id: form.id,
            title: form.title,
            description: form.description,
            fields: form.fields.0,
            settings: form.settings.0,
            created_by: form.created_by,
            created_at: form.created_at,
            updated_at: form.updated_at,
        })
    }
}

/// A listed form, annotated with the caller's own submission state for
/// target users.
#[derive(Debug, Serialize)]
pub struct FormListItem {
    #[serde(flatten)]
    pub form: FormView,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub has_submitted: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub submission_count: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub submission_status: Option<String>,
}

impl FormListItem {
    fn plain(form: FormView) -> Self {
        Self {
            form,
            has_submitted: None,
            submission_count: None,
            submission_status: None,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct FormPage {
    pub forms: Vec<FormListItem>,
    pub pagination: Pagination,
}

/// Request body for `PATCH /forms/{id}/status`.
#[derive(Debug, Deserialize)]
pub struct SetStatusRequest {
    pub status: FormStatus,
}

/// The step plan of a form.
#[derive(Debug, Serialize)]
pub struct StepPlan {
    pub form_id: DbId,
    pub show_progress_bar: bool,
    pub step_count: usize,
    pub steps: Vec<Step>,
}

/// Request body for `POST /forms/{id}/steps/{index}/check`.
#[derive(Debug, Deserialize)]
pub struct StepCheckRequest {
    #[serde(default)]
    pub responses: Vec<ResponseEntry>,
}

#[derive(Debug, Serialize)]
pub struct StepCheckResult {
    pub step_index: usize,
    pub is_last: bool,
    /// Set on the last step once the whole form validates.
    pub ready_to_submit: bool,
}

fn parse_form_status(raw: Option<&str>) -> AppResult<Option<FormStatus>> {
    raw.map(FormStatus::from_str_db).transpose().map_err(AppError::from)
}

// ---------------------------------------------------------------------------
// Authoring
// ---------------------------------------------------------------------------

/// POST /api/v1/forms
///
/// Create a form definition. The draft is re-validated and normalized
/// server-side regardless of client checks.
pub async fn create_form(
    RequireAuthor(user): RequireAuthor,
    State(state): State<AppState>,
    Json(draft): Json<FormDraft>,
) -> AppResult<impl IntoResponse> {
    let draft = draft.into_validated()?;

    let form = FormRepo::create(
        &state.pool,
        &CreateForm {
            draft,
            created_by: user.user_id,
            created_by_role: user.role,
        },
    )
    .await?;

    // Audience pickers reload their lookups after an audience is saved.
    state.lookups.clear().await;

    tracing::info!(
        user_id = user.user_id,
        form_id = form.id,
        status = %form.status,
        fields = form.fields().len(),
        "Form created"
    );

    let view = FormView::try_from(form)?;
    Ok((StatusCode::CREATED, Json(DataResponse { data: view })))
}

/// PUT /api/v1/forms/{id}
///
/// Replace a form definition. Existing submissions keep their responses.
pub async fn update_form(
    RequireAuthor(user): RequireAuthor,
    State(state): State<AppState>,
    Path(form_id): Path<DbId>,
    Json(draft): Json<FormDraft>,
) -> AppResult<impl IntoResponse> {
    let existing = load_editable_form(&state.pool, &user, form_id).await?;
    let draft = draft.into_validated()?;
    let audience_changed = existing.target()? != draft.target;

    let form = FormRepo::update(&state.pool, form_id, &draft)
        .await?
        .ok_or(AppError::Core(CoreError::NotFound {
            entity: "Form",
            id: form_id,
        }))?;

    if audience_changed {
        state.lookups.clear().await;
    }

    tracing::info!(
        user_id = user.user_id,
        form_id,
        status = %form.status,
        audience_changed,
        "Form updated"
    );

    Ok(Json(DataResponse {
        data: FormView::try_from(form)?,
    }))
}

/// PATCH /api/v1/forms/{id}/status
///
/// Set the definition status. Any status may follow any other.
pub async fn set_form_status(
    RequireAuthor(user): RequireAuthor,
    State(state): State<AppState>,
    Path(form_id): Path<DbId>,
    Json(input): Json<SetStatusRequest>,
) -> AppResult<impl IntoResponse> {
    load_editable_form(&state.pool, &user, form_id).await?;

    let form = FormRepo::set_status(&state.pool, form_id, input.status)
        .await?
        .ok_or(AppError::Core(CoreError::NotFound {
            entity: "Form",
            id: form_id,
        }))?;

    tracing::info!(
        user_id = user.user_id,
        form_id,
        status = input.status.as_str(),
        "Form status changed"
    );

    Ok(Json(DataResponse {
        data: FormView::try_from(form)?,
    }))
}

/// DELETE /api/v1/forms/{id}
///
/// Delete a form together with its submissions.
pub async fn delete_form(
    RequireAuthor(user): RequireAuthor,
    State(state): State<AppState>,
    Path(form_id): Path<DbId>,
) -> AppResult<StatusCode> {
    load_editable_form(&state.pool, &user, form_id).await?;

    if !FormRepo::delete(&state.pool, form_id).await? {
        return Err(AppError::Core(CoreError::NotFound {
            entity: "Form",
            id: form_id,
        }));
    }

    tracing::info!(user_id = user.user_id, form_id, "Form deleted");
    Ok(StatusCode::NO_CONTENT)
}

// ---------------------------------------------------------------------------
// Reading
// ---------------------------------------------------------------------------

/// GET /api/v1/forms?status=&limit=&offset=
///
/// Every caller gets the active forms the audience resolver shows them,
/// annotated with their own submission state. Authoring roles additionally
/// get the forms they may edit, filtered by `status`; those rows carry no
/// annotation unless the resolver also targets the caller with them.
pub async fn list_forms(
    RequireAuth(user): RequireAuth,
    State(state): State<AppState>,
    Query(params): Query<ListParams>,
) -> AppResult<impl IntoResponse> {
    let (limit, offset) = params.window();

    let mut listed = Vec::new();
    let mut include_targeted = true;
    if user.role.is_author() {
        let status = parse_form_status(params.status_filter())?;
        let owner = (!user.role.is_super()).then_some(user.user_id);
        listed = FormRepo::list_editable(&state.pool, owner, status).await?;
        include_targeted = matches!(status, None | Some(FormStatus::Active));
    }

    let mut targeted = HashSet::new();
    if include_targeted {
        let profile = load_audience(&state.pool, &user).await?;
        for form in FormRepo::list_active_for_role(&state.pool, user.role.as_str()).await? {
            if !resolve(&form.target()?, &profile) {
                continue;
            }
            targeted.insert(form.id);
            if !listed.iter().any(|f: &Form| f.id == form.id) {
                listed.push(form);
            }
        }
        listed.sort_by(|a, b| b.created_at.cmp(&a.created_at).then(b.id.cmp(&a.id)));
    }
    let (page, pagination) = paginate(listed, limit, offset);

    let ids: Vec<DbId> = page
        .iter()
        .map(|f| f.id)
        .filter(|id| targeted.contains(id))
        .collect();
    let states: HashMap<DbId, _> = SubmissionRepo::states_for_user(&state.pool, user.user_id, &ids)
        .await?
        .into_iter()
        .map(|s| (s.form_id, s))
        .collect();

    let mut forms = Vec::with_capacity(page.len());
    for form in page {
        if !targeted.contains(&form.id) {
            forms.push(FormListItem::plain(FormView::try_from(form)?));
            continue;
        }
        let own = states.get(&form.id);
        forms.push(FormListItem {
            has_submitted: Some(own.is_some()),
            submission_count: Some(own.map_or(0, |s| s.submission_count)),
            submission_status: own.map(|s| s.latest_status.clone()),
            form: FormView::try_from(form)?,
        });
    }

    Ok(Json(DataResponse {
        data: FormPage { forms, pagination },
    }))
}

/// GET /api/v1/forms/{id}
///
/// Full definition. Forms hidden from the caller are reported as not found.
pub async fn get_form(
    RequireAuth(user): RequireAuth,
    State(state): State<AppState>,
    Path(form_id): Path<DbId>,
) -> AppResult<impl IntoResponse> {
    let form = load_viewable_form(&state.pool, &user, form_id).await?;
    Ok(Json(DataResponse {
        data: FormView::try_from(form)?,
    }))
}

// ---------------------------------------------------------------------------
// Steps
// ---------------------------------------------------------------------------

fn step_plan(state: &AppState, form: &Form) -> Vec<Step> {
    plan(
        form.fields(),
        form.settings().show_progress_bar,
        state.config.form_step_count,
    )
}

/// GET /api/v1/forms/{id}/steps
///
/// The presentation steps of a form.
pub async fn get_steps(
    RequireAuth(user): RequireAuth,
    State(state): State<AppState>,
    Path(form_id): Path<DbId>,
) -> AppResult<impl IntoResponse> {
    let form = load_viewable_form(&state.pool, &user, form_id).await?;
    let steps = step_plan(&state, &form);
    Ok(Json(DataResponse {
        data: StepPlan {
            form_id,
            show_progress_bar: form.settings().show_progress_bar,
            step_count: steps.len(),
            steps,
        },
    }))
}

/// POST /api/v1/forms/{id}/steps/{index}/check
///
/// Check whether the caller may move forward from a step: the first missing
/// required field of the step, or, on the last step, every violation in the
/// form. File fields are skipped; a JSON body cannot carry the upload, so
/// they are only checked by the multipart submission itself.
pub async fn check_step(
    RequireAuth(user): RequireAuth,
    State(state): State<AppState>,
    Path((form_id, step_index)): Path<(DbId, usize)>,
    Json(input): Json<StepCheckRequest>,
) -> AppResult<impl IntoResponse> {
    let form = load_viewable_form(&state.pool, &user, form_id).await?;
    let steps = step_plan(&state, &form);

    let step = steps.get(step_index).ok_or_else(|| {
        AppError::Core(CoreError::Validation(format!(
            "Step {step_index} does not exist; the form has {} step(s)",
            steps.len()
        )))
    })?;
    let is_last = step_index + 1 == steps.len();

    if is_last {
        validate_responses(&without_uploads(form.fields()), &input.responses)?;
    } else {
        let checked = Step {
            index: step.index,
            fields: without_uploads(&step.fields),
        };
        if let Some(error) = first_blocking_error(&checked, &index_responses(&input.responses)) {
            return Err(AppError::Core(CoreError::FieldValidation(vec![error])));
        }
    }

    Ok(Json(DataResponse {
        data: StepCheckResult {
            step_index,
            is_last,
            ready_to_submit: is_last,
        },
    }))
}

/// Fields a step check can judge from a JSON body.
fn without_uploads(fields: &[FormField]) -> Vec<FormField> {
    fields
        .iter()
        .filter(|f| f.kind != FieldKind::File)
        .cloned()
        .collect()
}
