pub mod forms;
pub mod health;
pub mod lookups;

use axum::Router;

use crate::state::AppState;

/// Build the `/api/v1` route tree.
///
/// Route hierarchy:
///
/// ```text
/// /forms                                            list, create
/// /forms/{id}                                       get, update, delete
/// /forms/{id}/status                                set definition status (PATCH)
/// /forms/{id}/steps                                 step plan (GET)
/// /forms/{id}/steps/{index}/check                   check a step (POST)
/// /forms/{id}/submit                                submit (POST, JSON or multipart)
/// /forms/{id}/my-submission                         caller's latest submission (GET)
/// /forms/{id}/submissions                           reviewer listing (GET)
/// /forms/{id}/submissions/{submission_id}/status    review transition (PATCH)
///
/// /lookups/provinces                                provinces (GET)
/// /lookups/provinces/{province_id}/districts        districts of a province (GET)
/// /lookups/districts/{district_id}/exam-centers     exam centers of a district (GET)
/// ```
pub fn api_routes() -> Router<AppState> {
    Router::new()
        .nest("/forms", forms::router())
        .nest("/lookups", lookups::router())
}
