//! Seed helpers shared by the repository integration tests.

#![allow(dead_code)]

use serde_json::json;
use sqlx::PgPool;
use sanjesh_core::form::FormDraft;
use sanjesh_core::roles::Role;
use sanjesh_core::types::DbId;
use sanjesh_db::models::form::{CreateForm, Form};
use sanjesh_db::repositories::FormRepo;

/// Insert a province, one district in it and one exam center in that district.
/// Returns `(province_id, district_id, exam_center_id)`.
pub async fn seed_geography(pool: &PgPool) -> (DbId, DbId, DbId) {
    let province_id: DbId =
        sqlx::query_scalar("INSERT INTO provinces (name) VALUES ('تهران') RETURNING id")
            .fetch_one(pool)
            .await
            .unwrap();
    let district_id: DbId = sqlx::query_scalar(
        "INSERT INTO districts (province_id, name) VALUES ($1, 'منطقه ۱') RETURNING id",
    )
    .bind(province_id)
    .fetch_one(pool)
    .await
    .unwrap();
    let exam_center_id: DbId = sqlx::query_scalar(
        "INSERT INTO exam_centers (district_id, name, gender, period, organization_type)
         VALUES ($1, 'حوزه ۱۲', 'دختر', 'متوسطه اول', 'دولتی')
         RETURNING id",
    )
    .bind(district_id)
    .fetch_one(pool)
    .await
    .unwrap();
    (province_id, district_id, exam_center_id)
}

pub async fn seed_user(
    pool: &PgPool,
    username: &str,
    role: Role,
    district_id: Option<DbId>,
    exam_center_id: Option<DbId>,
) -> DbId {
    sqlx::query_scalar(
        "INSERT INTO users (username, role, district_id, exam_center_id)
         VALUES ($1, $2, $3, $4)
         RETURNING id",
    )
    .bind(username)
    .bind(role.as_str())
    .bind(district_id)
    .bind(exam_center_id)
    .fetch_one(pool)
    .await
    .unwrap()
}

/// A validated two-field draft aimed at exam-center managers.
pub fn sample_draft(allow_multiple: bool) -> FormDraft {
    serde_json::from_value::<FormDraft>(json!({
        "title": "Readiness checklist",
        "status": "active",
        "fields": [
            { "id": "center_name", "type": "text", "label": "Center name", "required": true, "order": 0 },
            {
                "id": "shift", "type": "radio", "label": "Shift", "order": 1,
                "options": [{ "label": "Morning", "value": "am" }, { "label": "Evening", "value": "pm" }]
            }
        ],
        "target": { "roles": ["exam_center_manager"], "gender": "دختر" },
        "settings": { "allow_multiple_submissions": allow_multiple }
    }))
    .unwrap()
    .into_validated()
    .unwrap()
}

pub async fn create_form(pool: &PgPool, author: DbId, allow_multiple: bool) -> Form {
    FormRepo::create(
        pool,
        &CreateForm {
            draft: sample_draft(allow_multiple),
            created_by: author,
            created_by_role: Role::ProvinceManager,
        },
    )
    .await
    .unwrap()
}
