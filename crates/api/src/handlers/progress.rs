//! Handlers for watched-lesson tracking and progress reads.

use axum::extract::{Path, State};
use axum::Json;
use chrono::Utc;
use learnhub_core::entitlement::ChapterProgress;
use learnhub_core::error::CoreError;
use learnhub_core::progress::{
    course_completion, ChapterProgressView, CourseCompletion, WatchOutcome,
};
use learnhub_core::roles::ensure_self_or_admin;
use learnhub_core::types::ContentId;
use learnhub_db::repositories::{CourseRepo, EntitlementRepo};
use serde::Serialize;

use crate::error::{AppError, AppResult};
use crate::middleware::auth::AuthUser;
use crate::response::DataResponse;
use crate::state::AppState;

#[derive(Debug, Serialize)]
pub struct WatchResponse {
    /// `true` iff the lesson was added to at least one watched list.
    pub newly_recorded: bool,
    pub outcome: WatchOutcome,
}

#[derive(Debug, Serialize)]
pub struct CourseProgressResponse {
    pub course_id: ContentId,
    /// Per-chapter progress stored on the course grant.
    pub chapters: Vec<ChapterProgress>,
    /// Watched vs. total lessons, merging chapter-grant progress in.
    /// Absent when the course is no longer in the catalog.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub completion: Option<CourseCompletion>,
}

/// POST /api/v1/learners/{learner_id}/courses/{course_id}/chapters/{chapter_id}/lessons/{lesson_id}/watched
///
/// Without a currently valid grant the request is rejected with 403 and the
/// document is left untouched.
pub async fn mark_watched(
    State(state): State<AppState>,
    user: AuthUser,
    Path((learner_id, course_id, chapter_id, lesson_id)): Path<(String, String, String, String)>,
) -> AppResult<Json<DataResponse<WatchResponse>>> {
    ensure_self_or_admin(&user.learner_id, &user.role, &learner_id)?;

    let course = CourseRepo::find_by_id(&state.pool, &course_id)
        .await?
        .ok_or_else(|| CoreError::not_found("Course", &course_id))?;
    if course.find_lesson(&chapter_id, &lesson_id).is_none() {
        return Err(CoreError::not_found("VideoLesson", &lesson_id).into());
    }

    let now = Utc::now();
    let outcome = EntitlementRepo::modify(&state.pool, &learner_id, |e| {
        match e.mark_lesson_watched(&course_id, &chapter_id, &lesson_id, now) {
            WatchOutcome::NotEnrolled => Err(AppError::Core(CoreError::Forbidden(format!(
                "No active enrollment covers chapter {chapter_id} of course {course_id}"
            )))),
            outcome => Ok(outcome),
        }
    })
    .await?
    .ok_or_else(|| CoreError::not_found("Learner", &learner_id))?;

    tracing::info!(
        %learner_id,
        %course_id,
        %chapter_id,
        %lesson_id,
        outcome = ?outcome,
        "Lesson watched"
    );

    Ok(Json(DataResponse {
        data: WatchResponse {
            newly_recorded: outcome.is_newly_recorded(),
            outcome,
        },
    }))
}

/// GET /api/v1/learners/{learner_id}/courses/{course_id}/progress
///
/// 404 only when the learner holds no grant for the course. Stored progress
/// is returned even if the course has since left the catalog.
pub async fn course_progress(
    State(state): State<AppState>,
    user: AuthUser,
    Path((learner_id, course_id)): Path<(String, String)>,
) -> AppResult<Json<DataResponse<CourseProgressResponse>>> {
    ensure_self_or_admin(&user.learner_id, &user.role, &learner_id)?;

    let entitlements = EntitlementRepo::find(&state.pool, &learner_id)
        .await?
        .ok_or_else(|| CoreError::not_found("Learner", &learner_id))?;
    let chapters = entitlements
        .course_progress(&course_id)
        .ok_or_else(|| CoreError::not_found("CourseEnrollment", &course_id))?
        .to_vec();

    let completion = CourseRepo::find_by_id(&state.pool, &course_id)
        .await?
        .map(|course| course_completion(&course, &entitlements));
    if completion.is_none() {
        tracing::warn!(%learner_id, %course_id, "Enrolled course missing from catalog");
    }

    Ok(Json(DataResponse {
        data: CourseProgressResponse {
            course_id,
            chapters,
            completion,
        },
    }))
}

/// GET /api/v1/learners/{learner_id}/courses/{course_id}/chapters/{chapter_id}/progress
pub async fn chapter_progress(
    State(state): State<AppState>,
    user: AuthUser,
    Path((learner_id, course_id, chapter_id)): Path<(String, String, String)>,
) -> AppResult<Json<DataResponse<ChapterProgressView>>> {
    ensure_self_or_admin(&user.learner_id, &user.role, &learner_id)?;

    let entitlements = EntitlementRepo::find(&state.pool, &learner_id)
        .await?
        .ok_or_else(|| CoreError::not_found("Learner", &learner_id))?;
    let view = entitlements
        .chapter_progress(&course_id, &chapter_id, Utc::now())
        .ok_or_else(|| CoreError::not_found("ChapterEnrollment", &chapter_id))?;

    Ok(Json(DataResponse { data: view }))
}
