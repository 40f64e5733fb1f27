//! Form definition rows.

use serde::Serialize;
use sqlx::types::Json;
use sqlx::FromRow;
use sanjesh_core::error::CoreError;
use sanjesh_core::form::{AudienceTarget, FormDraft, FormField, FormSettings, FormStatus};
use sanjesh_core::roles::Role;
use sanjesh_core::types::{DbId, Timestamp};

/// A row from the `forms` table.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct Form {
    pub id: DbId,
    pub title: String,
    pub description: Option<String>,
    pub status: String,
    pub fields: Json<Vec<FormField>>,
    pub target_roles: Vec<String>,
    pub target_districts: Vec<DbId>,
    pub target_gender: Option<String>,
    pub target_period: Option<String>,
    pub target_organization_type: Option<String>,
    pub settings: Json<FormSettings>,
    pub created_by: DbId,
    pub created_by_role: String,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

impl Form {
    pub fn status(&self) -> Result<FormStatus, CoreError> {
        FormStatus::from_str_db(&self.status)
    }

    pub fn creator_role(&self) -> Result<Role, CoreError> {
        Role::from_str_db(&self.created_by_role)
    }

    pub fn fields(&self) -> &[FormField] {
        &self.fields.0
    }

    pub fn settings(&self) -> &FormSettings {
        &self.settings.0
    }

    /// Rebuild the audience predicate from the flattened target columns.
    pub fn target(&self) -> Result<AudienceTarget, CoreError> {
        let roles = self
            .target_roles
            .iter()
            .map(|r| Role::from_str_db(r))
            .collect::<Result<Vec<_>, _>>()?;
        Ok(AudienceTarget {
            roles,
            districts: self.target_districts.clone(),
            gender: self.target_gender.clone(),
            period: self.target_period.clone(),
            organization_type: self.target_organization_type.clone(),
        })
    }
}

/// DTO for inserting a validated form definition.
#[derive(Debug, Clone)]
pub struct CreateForm {
    pub draft: FormDraft,
    pub created_by: DbId,
    pub created_by_role: Role,
}

/// Target roles as stored in the `TEXT[]` column.
pub(crate) fn role_names(target: &AudienceTarget) -> Vec<String> {
    target.roles.iter().map(|r| r.as_str().to_string()).collect()
}
