//! Read-only geography lookups used when choosing a form's audience.

use serde::Serialize;
use sqlx::FromRow;
use sanjesh_core::types::DbId;

/// A row from the `provinces` table.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct Province {
    pub id: DbId,
    pub name: String,
}

/// A row from the `districts` table.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct District {
    pub id: DbId,
    pub province_id: DbId,
    pub name: String,
}

/// A row from the `exam_centers` table.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct ExamCenter {
    pub id: DbId,
    pub district_id: DbId,
    pub name: String,
    pub gender: Option<String>,
    pub period: Option<String>,
    pub organization_type: Option<String>,
}
