//! Repository for the `forms` table.

use sqlx::types::Json;
use sqlx::PgPool;
use sanjesh_core::form::{FormDraft, FormStatus};
use sanjesh_core::types::DbId;

use crate::models::form::{role_names, CreateForm, Form};

/// Column list for forms queries.
const COLUMNS: &str = "id, title, description, status, fields, target_roles, target_districts, \
    target_gender, target_period, target_organization_type, settings, \
    created_by, created_by_role, created_at, updated_at";

/// Provides CRUD operations for form definitions.
pub struct FormRepo;

impl FormRepo {
    /// Insert a new form, returning the created row.
    ///
    /// The draft is expected to have passed `FormDraft::into_validated`.
    pub async fn create(pool: &PgPool, input: &CreateForm) -> Result<Form, sqlx::Error> {
        let draft = &input.draft;
        let query = format!(
            "INSERT INTO forms
                (title, description, status, fields, target_roles, target_districts,
                 target_gender, target_period, target_organization_type, settings,
                 created_by, created_by_role)
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12)
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Form>(&query)
            .bind(&draft.title)
            .bind(&draft.description)
            .bind(draft.status.as_str())
            .bind(Json(&draft.fields))
            .bind(role_names(&draft.target))
            .bind(&draft.target.districts)
            .bind(&draft.target.gender)
            .bind(&draft.target.period)
            .bind(&draft.target.organization_type)
            .bind(Json(&draft.settings))
            .bind(input.created_by)
            .bind(input.created_by_role.as_str())
            .fetch_one(pool)
            .await
    }

    /// Find a form by its ID.
    pub async fn find_by_id(pool: &PgPool, id: DbId) -> Result<Option<Form>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM forms WHERE id = $1");
        sqlx::query_as::<_, Form>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    /// Replace the whole definition. Existing submissions are left untouched.
    ///
    /// Returns `None` if no row with the given `id` exists.
    pub async fn update(
        pool: &PgPool,
        id: DbId,
        draft: &FormDraft,
    ) -> Result<Option<Form>, sqlx::Error> {
        let query = format!(
            "UPDATE forms SET
                title = $2,
                description = $3,
                status = $4,
                fields = $5,
                target_roles = $6,
                target_districts = $7,
                target_gender = $8,
                target_period = $9,
                target_organization_type = $10,
                settings = $11
             WHERE id = $1
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Form>(&query)
            .bind(id)
            .bind(&draft.title)
            .bind(&draft.description)
            .bind(draft.status.as_str())
            .bind(Json(&draft.fields))
            .bind(role_names(&draft.target))
            .bind(&draft.target.districts)
            .bind(&draft.target.gender)
            .bind(&draft.target.period)
            .bind(&draft.target.organization_type)
            .bind(Json(&draft.settings))
            .fetch_optional(pool)
            .await
    }

    /// Set the definition status alone.
    pub async fn set_status(
        pool: &PgPool,
        id: DbId,
        status: FormStatus,
    ) -> Result<Option<Form>, sqlx::Error> {
        let query = format!("UPDATE forms SET status = $2 WHERE id = $1 RETURNING {COLUMNS}");
        sqlx::query_as::<_, Form>(&query)
            .bind(id)
            .bind(status.as_str())
            .fetch_optional(pool)
            .await
    }

    /// Delete a form; its submissions cascade. Returns `true` if a row was removed.
    pub async fn delete(pool: &PgPool, id: DbId) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("DELETE FROM forms WHERE id = $1")
            .bind(id)
            .execute(pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    /// List forms an editor may manage, newest first.
    ///
    /// `owner` restricts the list to forms created by that user; `None` lists
    /// every form (general managers). Paging happens after these rows are
    /// merged with the forms targeted at the editor.
    pub async fn list_editable(
        pool: &PgPool,
        owner: Option<DbId>,
        status: Option<FormStatus>,
    ) -> Result<Vec<Form>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM forms
             WHERE ($1::BIGINT IS NULL OR created_by = $1)
               AND ($2::TEXT IS NULL OR status = $2)
             ORDER BY created_at DESC, id DESC"
        );
        sqlx::query_as::<_, Form>(&query)
            .bind(owner)
            .bind(status.map(|s| s.as_str()))
            .fetch_all(pool)
            .await
    }

    /// Active forms whose target roles include `role`, newest first.
    ///
    /// District and attribute filters are applied by the audience resolver.
    pub async fn list_active_for_role(pool: &PgPool, role: &str) -> Result<Vec<Form>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM forms
             WHERE status = 'active' AND $1 = ANY(target_roles)
             ORDER BY created_at DESC, id DESC"
        );
        sqlx::query_as::<_, Form>(&query)
            .bind(role)
            .fetch_all(pool)
            .await
    }
}
