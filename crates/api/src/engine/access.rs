//! Form access rules applied by every handler that touches a form.

use sanjesh_core::audience::{self, UserAudience};
use sanjesh_core::error::CoreError;
use sanjesh_core::roles::{can_edit_form, ensure_can_edit_form};
use sanjesh_core::types::DbId;
use sanjesh_db::models::form::Form;
use sanjesh_db::repositories::{FormRepo, UserRepo};
use sanjesh_db::DbPool;

use crate::error::{AppError, AppResult};
use crate::middleware::auth::AuthUser;

/// Load a form or fail with 404.
pub async fn load_form(pool: &DbPool, form_id: DbId) -> AppResult<Form> {
    FormRepo::find_by_id(pool, form_id)
        .await?
        .ok_or(AppError::Core(CoreError::NotFound {
            entity: "Form",
            id: form_id,
        }))
}

/// Whether `user` may edit (and review submissions of) `form`.
pub fn is_editor(user: &AuthUser, form: &Form) -> AppResult<bool> {
    Ok(can_edit_form(
        user.user_id,
        user.role,
        form.created_by,
        form.creator_role()?,
    ))
}

/// Load a form and require edit rights on it.
pub async fn load_editable_form(pool: &DbPool, user: &AuthUser, form_id: DbId) -> AppResult<Form> {
    let form = load_form(pool, form_id).await?;
    ensure_can_edit_form(user.user_id, user.role, form.created_by, form.creator_role()?)?;
    Ok(form)
}

/// Load the role, district and exam-center attributes the resolver needs.
pub async fn load_audience(pool: &DbPool, user: &AuthUser) -> AppResult<UserAudience> {
    let row = UserRepo::find_audience_profile(pool, user.user_id)
        .await?
        .ok_or_else(|| AppError::Core(CoreError::Unauthorized("Unknown user".into())))?;
    Ok(row.into_audience()?)
}

/// Whether the resolver shows `form` to `user` (targeting plus `active`).
pub fn is_visible_to(form: &Form, user: &UserAudience) -> AppResult<bool> {
    Ok(audience::is_visible(form.status()?, &form.target()?, user))
}

/// Load a form that `user` may see: editors always, everyone else only when
/// the resolver shows it to them. Hidden forms are reported as missing.
pub async fn load_viewable_form(pool: &DbPool, user: &AuthUser, form_id: DbId) -> AppResult<Form> {
    let form = load_form(pool, form_id).await?;
    if is_editor(user, &form)? {
        return Ok(form);
    }
    let profile = load_audience(pool, user).await?;
    if is_visible_to(&form, &profile)? {
        Ok(form)
    } else {
        tracing::debug!(user_id = user.user_id, form_id, "Form hidden from user");
        Err(AppError::Core(CoreError::NotFound {
            entity: "Form",
            id: form_id,
        }))
    }
}
