//! Repository for reading user audience profiles.

use sqlx::PgPool;
use sanjesh_core::types::DbId;

use crate::models::user::AudienceProfileRow;

/// Read-only access to the `users` table.
pub struct UserRepo;

impl UserRepo {
    /// Load the role, district and exam-center attributes of a user.
    pub async fn find_audience_profile(
        pool: &PgPool,
        user_id: DbId,
    ) -> Result<Option<AudienceProfileRow>, sqlx::Error> {
        sqlx::query_as::<_, AudienceProfileRow>(
            "SELECT u.id, u.role, u.district_id, u.exam_center_id,
                    ec.gender, ec.period, ec.organization_type
             FROM users u
             LEFT JOIN exam_centers ec ON ec.id = u.exam_center_id
             WHERE u.id = $1",
        )
        .bind(user_id)
        .fetch_optional(pool)
        .await
    }
}
