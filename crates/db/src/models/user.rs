//! User audience profile rows.

use sqlx::FromRow;
use sanjesh_core::audience::{ExamCenterAttributes, UserAudience};
use sanjesh_core::error::CoreError;
use sanjesh_core::roles::Role;
use sanjesh_core::types::DbId;

/// `users` joined with the exam center the user manages, if any.
#[derive(Debug, Clone, FromRow)]
pub struct AudienceProfileRow {
    pub id: DbId,
    pub role: String,
    pub district_id: Option<DbId>,
    pub exam_center_id: Option<DbId>,
    pub gender: Option<String>,
    pub period: Option<String>,
    pub organization_type: Option<String>,
}

impl AudienceProfileRow {
    pub fn into_audience(self) -> Result<UserAudience, CoreError> {
        let role = Role::from_str_db(&self.role)?;
        let exam_center = self.exam_center_id.map(|_| ExamCenterAttributes {
            gender: self.gender,
            period: self.period,
            organization_type: self.organization_type,
        });
        Ok(UserAudience {
            user_id: self.id,
            role,
            district_id: self.district_id,
            exam_center,
        })
    }
}
