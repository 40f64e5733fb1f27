//! Integration tests for `SubmissionRepo`.
//!
//! - The partial unique index rejects a second single submission
//! - Multiple-submission forms accept any number of rows
//! - Per-user listing state reports counts and the latest status
//! - Status updates only apply from the expected current status

mod common;

use assert_matches::assert_matches;
use sqlx::PgPool;
use sanjesh_core::error::CoreError;
use sanjesh_core::roles::Role;
use sanjesh_core::submission::SubmissionStatus;
use sanjesh_core::types::DbId;
use sanjesh_db::models::submission::CreateSubmission;
use sanjesh_db::repositories::submission_repo::CreateSubmissionError;
use sanjesh_db::repositories::{SubmissionRepo, UserRepo};

use common::{create_form, seed_geography, seed_user};

fn new_submission(form_id: DbId, user_id: DbId, single: bool) -> CreateSubmission {
    CreateSubmission {
        form_id,
        user_id,
        responses: Vec::new(),
        is_single_submission: single,
    }
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn second_single_submission_is_rejected_by_the_index(pool: PgPool) {
    let author = seed_user(&pool, "pm", Role::ProvinceManager, None, None).await;
    let user = seed_user(&pool, "ecm", Role::ExamCenterManager, None, None).await;
    let form = create_form(&pool, author, false).await;

    let first = SubmissionRepo::create(&pool, &new_submission(form.id, user, true))
        .await
        .unwrap();
    assert_eq!(first.status().unwrap(), SubmissionStatus::Submitted);

    let second = SubmissionRepo::create(&pool, &new_submission(form.id, user, true)).await;
    assert_matches!(
        second,
        Err(CreateSubmissionError::Duplicate(CoreError::DuplicateSubmission { form_id })) if form_id == form.id
    );
    assert_eq!(SubmissionRepo::count_for_user(&pool, form.id, user).await.unwrap(), 1);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn multiple_submissions_are_uncapped(pool: PgPool) {
    let author = seed_user(&pool, "pm", Role::ProvinceManager, None, None).await;
    let user = seed_user(&pool, "ecm", Role::ExamCenterManager, None, None).await;
    let form = create_form(&pool, author, true).await;

    for _ in 0..5 {
        SubmissionRepo::create(&pool, &new_submission(form.id, user, false))
            .await
            .unwrap();
    }
    assert_eq!(SubmissionRepo::count_for_user(&pool, form.id, user).await.unwrap(), 5);
    assert_eq!(SubmissionRepo::count_for_form(&pool, form.id, None).await.unwrap(), 5);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn user_states_report_count_and_latest_status(pool: PgPool) {
    let author = seed_user(&pool, "pm", Role::ProvinceManager, None, None).await;
    let user = seed_user(&pool, "ecm", Role::ExamCenterManager, None, None).await;
    let multi = create_form(&pool, author, true).await;
    let untouched = create_form(&pool, author, false).await;

    SubmissionRepo::create(&pool, &new_submission(multi.id, user, false))
        .await
        .unwrap();
    let latest = SubmissionRepo::create(&pool, &new_submission(multi.id, user, false))
        .await
        .unwrap();
    SubmissionRepo::update_status(
        &pool,
        latest.id,
        SubmissionStatus::Submitted,
        SubmissionStatus::Approved,
        author,
    )
    .await
    .unwrap()
    .unwrap();

    let states = SubmissionRepo::states_for_user(&pool, user, &[multi.id, untouched.id])
        .await
        .unwrap();
    assert_eq!(states.len(), 1);
    assert_eq!(states[0].form_id, multi.id);
    assert_eq!(states[0].submission_count, 2);
    assert_eq!(states[0].latest_status, "approved");

    let mine = SubmissionRepo::latest_for_user(&pool, multi.id, user).await.unwrap().unwrap();
    assert_eq!(mine.id, latest.id);
    assert_eq!(mine.reviewed_by, Some(author));
    assert!(mine.reviewed_at.is_some());
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn status_update_requires_expected_current_status(pool: PgPool) {
    let author = seed_user(&pool, "pm", Role::ProvinceManager, None, None).await;
    let user = seed_user(&pool, "ecm", Role::ExamCenterManager, None, None).await;
    let form = create_form(&pool, author, false).await;
    let submission = SubmissionRepo::create(&pool, &new_submission(form.id, user, true))
        .await
        .unwrap();

    let stale = SubmissionRepo::update_status(
        &pool,
        submission.id,
        SubmissionStatus::Reviewed,
        SubmissionStatus::Approved,
        author,
    )
    .await
    .unwrap();
    assert!(stale.is_none());

    let reviewed = SubmissionRepo::update_status(
        &pool,
        submission.id,
        SubmissionStatus::Submitted,
        SubmissionStatus::Reviewed,
        author,
    )
    .await
    .unwrap()
    .unwrap();
    assert_eq!(reviewed.status().unwrap(), SubmissionStatus::Reviewed);

    let filtered = SubmissionRepo::list_for_form(&pool, form.id, Some(SubmissionStatus::Reviewed), 10, 0)
        .await
        .unwrap();
    assert_eq!(filtered.len(), 1);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn audience_profile_joins_exam_center(pool: PgPool) {
    let (_, district, center) = seed_geography(&pool).await;
    let user = seed_user(&pool, "ecm", Role::ExamCenterManager, Some(district), Some(center)).await;

    let audience = UserRepo::find_audience_profile(&pool, user)
        .await
        .unwrap()
        .unwrap()
        .into_audience()
        .unwrap();
    assert_eq!(audience.district_id, Some(district));
    assert_eq!(
        audience.exam_center.unwrap().gender.as_deref(),
        Some("دختر")
    );
}
