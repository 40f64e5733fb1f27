use axum::routing::{get, patch, post};
use axum::Router;

use crate::handlers::{forms, submissions};
use crate::state::AppState;

/// Routes mounted at `/forms`.
///
/// ```text
/// GET    /                                        list_forms
/// POST   /                                        create_form
/// GET    /{id}                                    get_form
/// PUT    /{id}                                    update_form
/// DELETE /{id}                                    delete_form
/// PATCH  /{id}/status                             set_form_status
/// GET    /{id}/steps                              get_steps
/// POST   /{id}/steps/{index}/check                check_step
/// POST   /{id}/submit                             submit_form
/// GET    /{id}/my-submission                      my_submission
/// GET    /{id}/submissions                        list_submissions
/// PATCH  /{id}/submissions/{submission_id}/status review_submission
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(forms::list_forms).post(forms::create_form))
        .route(
            "/{id}",
            get(forms::get_form)
                .put(forms::update_form)
                .delete(forms::delete_form),
        )
        .route("/{id}/status", patch(forms::set_form_status))
        .route("/{id}/steps", get(forms::get_steps))
        .route("/{id}/steps/{index}/check", post(forms::check_step))
        .route("/{id}/submit", post(submissions::submit_form))
        .route("/{id}/my-submission", get(submissions::my_submission))
        .route("/{id}/submissions", get(submissions::list_submissions))
        .route(
            "/{id}/submissions/{submission_id}/status",
            patch(submissions::review_submission),
        )
}
