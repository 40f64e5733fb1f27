use axum::routing::get;
use axum::Router;

use crate::handlers::lookups;
use crate::state::AppState;

/// Routes mounted at `/lookups`.
///
/// ```text
/// GET /provinces                                 list_provinces
/// GET /provinces/{province_id}/districts         list_districts
/// GET /districts/{district_id}/exam-centers      list_exam_centers
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/provinces", get(lookups::list_provinces))
        .route("/provinces/{province_id}/districts", get(lookups::list_districts))
        .route(
            "/districts/{district_id}/exam-centers",
            get(lookups::list_exam_centers),
        )
}
