//! Read-only geography lookups used when choosing a form's audience.
//!
//! Served from the in-process read-through cache; the database is only hit
//! on the first request per parent id.

use axum::extract::{Path, State};
use axum::response::IntoResponse;
use axum::Json;

use sanjesh_core::types::DbId;
use sanjesh_db::repositories::GeographyRepo;

use crate::error::AppResult;
use crate::middleware::rbac::RequireAuth;
use crate::response::DataResponse;
use crate::state::AppState;

/// GET /api/v1/lookups/provinces
pub async fn list_provinces(
    RequireAuth(_user): RequireAuth,
    State(state): State<AppState>,
) -> AppResult<impl IntoResponse> {
    let pool = state.pool.clone();
    let provinces = state
        .lookups
        .provinces
        .get_or_load((), || async move { GeographyRepo::list_provinces(&pool).await })
        .await?;
    Ok(Json(DataResponse {
        data: provinces.as_ref().clone(),
    }))
}

/// GET /api/v1/lookups/provinces/{province_id}/districts
pub async fn list_districts(
    RequireAuth(_user): RequireAuth,
    State(state): State<AppState>,
    Path(province_id): Path<DbId>,
) -> AppResult<impl IntoResponse> {
    let pool = state.pool.clone();
    let districts = state
        .lookups
        .districts
        .get_or_load(province_id, || async move {
            GeographyRepo::districts_for_province(&pool, province_id).await
        })
        .await?;
    Ok(Json(DataResponse {
        data: districts.as_ref().clone(),
    }))
}

/// GET /api/v1/lookups/districts/{district_id}/exam-centers
pub async fn list_exam_centers(
    RequireAuth(_user): RequireAuth,
    State(state): State<AppState>,
    Path(district_id): Path<DbId>,
) -> AppResult<impl IntoResponse> {
    let pool = state.pool.clone();
    let centers = state
        .lookups
        .exam_centers
        .get_or_load(district_id, || async move {
            GeographyRepo::exam_centers_for_district(&pool, district_id).await
        })
        .await?;
    Ok(Json(DataResponse {
        data: centers.as_ref().clone(),
    }))
}
