//! Submit pipeline for a single form submission.
//!
//! 1. Load the form and the submitter's audience profile.
//! 2. Re-run the audience resolver; hidden or non-active forms are forbidden.
//! 3. Reject a repeat submission to a single-submission form, before looking
//!    at the answers.
//! 4. Validate every field, using upload metadata as the value of file fields.
//! 5. Store attachments (all or nothing).
//! 6. Insert the normalized responses; a failed insert deletes the stored blobs.
//!
//! The partial unique index on `form_submissions` closes the race between
//! steps 3 and 6.

use std::collections::HashMap;

use serde_json::Value;
use sanjesh_core::attachments::{discard_all, store_all, AttachmentRef, PendingUpload};
use sanjesh_core::error::CoreError;
use sanjesh_core::field_types::FieldKind;
use sanjesh_core::form::FormField;
use sanjesh_core::submission::{
    ensure_can_submit, normalize_responses, validate_responses, ResponseEntry,
};
use sanjesh_core::types::DbId;
use sanjesh_db::models::submission::{CreateSubmission, FormSubmission};
use sanjesh_db::repositories::SubmissionRepo;

use crate::engine::access::{is_visible_to, load_audience, load_form};
use crate::error::{AppError, AppResult};
use crate::middleware::auth::AuthUser;
use crate::state::AppState;

/// Answers and files received with one submit request.
#[derive(Debug, Default)]
pub struct SubmissionPayload {
    pub responses: Vec<ResponseEntry>,
    pub uploads: Vec<PendingUpload>,
}

/// A recorded submission plus the form's configured success message.
#[derive(Debug)]
pub struct SubmitOutcome {
    pub submission: FormSubmission,
    pub success_message: String,
}

/// Run the full submit pipeline for `user` on `form_id`.
pub async fn submit(
    state: &AppState,
    user: &AuthUser,
    form_id: DbId,
    payload: SubmissionPayload,
) -> AppResult<SubmitOutcome> {
    let form = load_form(&state.pool, form_id).await?;
    let profile = load_audience(&state.pool, user).await?;

    if !is_visible_to(&form, &profile)? {
        tracing::warn!(user_id = user.user_id, form_id, "Submission to a form outside the user's audience");
        return Err(AppError::Core(CoreError::Forbidden(
            "This form is not open to you".into(),
        )));
    }

    let settings = form.settings();
    let existing = SubmissionRepo::count_for_user(&state.pool, form_id, user.user_id).await?;
    ensure_can_submit(form_id, settings.allow_multiple_submissions, existing)?;

    let fields = form.fields();
    let candidate = candidate_responses(fields, &payload.responses, &payload.uploads)?;
    if let Err(err) = validate_responses(fields, &candidate) {
        if let CoreError::FieldValidation(errors) = &err {
            tracing::info!(user_id = user.user_id, form_id, errors = errors.len(), "Submission failed validation");
        }
        return Err(err.into());
    }

    let stored = store_all(state.attachments.as_ref(), &payload.uploads).await?;
    let responses = normalize_responses(fields, &with_attachments(fields, &payload.responses, &stored));

    let input = CreateSubmission {
        form_id,
        user_id: user.user_id,
        responses,
        is_single_submission: !settings.allow_multiple_submissions,
    };

    let submission = match SubmissionRepo::create(&state.pool, &input).await {
        Ok(submission) => submission,
        Err(err) => {
            let refs: Vec<AttachmentRef> = stored.into_iter().map(|(_, r)| r).collect();
            discard_all(state.attachments.as_ref(), &refs).await;
            tracing::warn!(user_id = user.user_id, form_id, error = %err, "Submission insert failed");
            return Err(err.into());
        }
    };

    tracing::info!(
        user_id = user.user_id,
        form_id,
        submission_id = submission.id,
        attachments = payload.uploads.len(),
        "Form submitted"
    );

    Ok(SubmitOutcome {
        submission,
        success_message: settings.success_message.clone(),
    })
}

/// Responses as the validator should see them.
///
/// File fields take their value from the uploads (one metadata object per
/// file); whatever the client sent for a file field is ignored. Uploads
/// addressed to a field that is not a file field are rejected.
pub fn candidate_responses(
    fields: &[FormField],
    responses: &[ResponseEntry],
    uploads: &[PendingUpload],
) -> Result<Vec<ResponseEntry>, CoreError> {
    let file_fields: HashMap<&str, &FormField> = fields
        .iter()
        .filter(|f| f.kind == FieldKind::File)
        .map(|f| (f.id.as_str(), f))
        .collect();

    let mut described: HashMap<&str, Vec<Value>> = HashMap::new();
    for upload in uploads {
        if !file_fields.contains_key(upload.field_id.as_str()) {
            return Err(CoreError::Validation(format!(
                "Field '{}' does not accept files",
                upload.field_id
            )));
        }
        described
            .entry(upload.field_id.as_str())
            .or_default()
            .push(upload.describe());
    }

    let mut candidate: Vec<ResponseEntry> = responses
        .iter()
        .filter(|r| !file_fields.contains_key(r.field_id.as_str()))
        .cloned()
        .collect();
    for field in fields.iter().filter(|f| f.kind == FieldKind::File) {
        if let Some(items) = described.remove(field.id.as_str()) {
            candidate.push(ResponseEntry {
                field_id: field.id.clone(),
                value: Value::Array(items),
            });
        }
    }
    Ok(candidate)
}

/// Responses to persist: client answers for ordinary fields, stored
/// attachment references for file fields.
pub fn with_attachments(
    fields: &[FormField],
    responses: &[ResponseEntry],
    stored: &[(String, AttachmentRef)],
) -> Vec<ResponseEntry> {
    let mut refs: HashMap<&str, Vec<Value>> = HashMap::new();
    for (field_id, reference) in stored {
        refs.entry(field_id.as_str())
            .or_default()
            .push(serde_json::json!(reference));
    }

    let mut out: Vec<ResponseEntry> = responses
        .iter()
        .filter(|r| {
            fields
                .iter()
                .any(|f| f.id == r.field_id && f.kind != FieldKind::File)
        })
        .cloned()
        .collect();
    for (field_id, items) in refs {
        out.push(ResponseEntry {
            field_id: field_id.to_string(),
            value: Value::Array(items),
        });
    }
    out
}
