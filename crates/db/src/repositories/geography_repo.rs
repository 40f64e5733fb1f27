//! Repository for the `provinces`, `districts` and `exam_centers` lookups.

use sqlx::PgPool;
use sanjesh_core::types::DbId;

use crate::models::geography::{District, ExamCenter, Province};

/// Read-only geography queries, ordered by name.
pub struct GeographyRepo;

impl GeographyRepo {
    pub async fn list_provinces(pool: &PgPool) -> Result<Vec<Province>, sqlx::Error> {
        sqlx::query_as::<_, Province>("SELECT id, name FROM provinces ORDER BY name ASC, id ASC")
            .fetch_all(pool)
            .await
    }

    pub async fn districts_for_province(
        pool: &PgPool,
        province_id: DbId,
    ) -> Result<Vec<District>, sqlx::Error> {
        sqlx::query_as::<_, District>(
            "SELECT id, province_id, name FROM districts
             WHERE province_id = $1
             ORDER BY name ASC, id ASC",
        )
        .bind(province_id)
        .fetch_all(pool)
        .await
    }

    pub async fn exam_centers_for_district(
        pool: &PgPool,
        district_id: DbId,
    ) -> Result<Vec<ExamCenter>, sqlx::Error> {
        sqlx::query_as::<_, ExamCenter>(
            "SELECT id, district_id, name, gender, period, organization_type
             FROM exam_centers
             WHERE district_id = $1
             ORDER BY name ASC, id ASC",
        )
        .bind(district_id)
        .fetch_all(pool)
        .await
    }
}
