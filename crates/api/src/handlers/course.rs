//! Handlers for the course catalog and the lesson content gate.

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::Json;
use chrono::Utc;
use learnhub_core::catalog::{
    lesson_gate, validate_new_course, Course, LessonGate, NewCourse, VideoLesson,
};
use learnhub_core::error::CoreError;
use learnhub_db::repositories::{CourseRepo, EntitlementRepo, LearnerRepo};
use serde::Serialize;

use crate::error::AppResult;
use crate::middleware::auth::AuthUser;
use crate::middleware::rbac::{RequireAuth, RequireInstructor};
use crate::response::DataResponse;
use crate::state::AppState;

/// A lesson the caller is allowed to watch, with the reason it is open.
#[derive(Debug, Serialize)]
pub struct LessonContent {
    pub course_id: String,
    pub chapter_id: String,
    pub lesson: VideoLesson,
    pub gate: LessonGate,
}

/// POST /api/v1/courses
///
/// Create a course with its full chapter/section/lesson tree.
pub async fn create(
    State(state): State<AppState>,
    RequireInstructor(user): RequireInstructor,
    Json(input): Json<NewCourse>,
) -> AppResult<(StatusCode, Json<DataResponse<Course>>)> {
    validate_new_course(&input)?;

    // Authors who never created a profile are recorded as unknown.
    let created_by = LearnerRepo::find_by_id(&state.pool, &user.learner_id)
        .await?
        .map(|l| l.id);

    let course = CourseRepo::create(&state.pool, &input, created_by.as_deref()).await?;
    tracing::info!(course_id = %course.id, author = %user.learner_id, "Course created via API");
    Ok((StatusCode::CREATED, Json(DataResponse { data: course })))
}

/// GET /api/v1/courses/{course_id}
pub async fn get_by_id(
    State(state): State<AppState>,
    RequireAuth(_user): RequireAuth,
    Path(course_id): Path<String>,
) -> AppResult<Json<DataResponse<Course>>> {
    let course = CourseRepo::find_by_id(&state.pool, &course_id)
        .await?
        .ok_or_else(|| CoreError::not_found("Course", &course_id))?;
    Ok(Json(DataResponse { data: course }))
}

/// GET /api/v1/courses/{course_id}/chapters/{chapter_id}/lessons/{lesson_id}
///
/// Preview lessons are served to anyone, signed in or not. Other lessons
/// need a caller holding a valid course or chapter grant; entitlements are
/// only loaded for them.
pub async fn get_lesson(
    State(state): State<AppState>,
    user: Option<AuthUser>,
    Path((course_id, chapter_id, lesson_id)): Path<(String, String, String)>,
) -> AppResult<Json<DataResponse<LessonContent>>> {
    let course = CourseRepo::find_by_id(&state.pool, &course_id)
        .await?
        .ok_or_else(|| CoreError::not_found("Course", &course_id))?;
    let lesson = course
        .find_lesson(&chapter_id, &lesson_id)
        .ok_or_else(|| CoreError::not_found("VideoLesson", &lesson_id))?;

    let entitlements = match (&user, lesson.preview) {
        (_, true) => None,
        (None, false) => {
            return Err(CoreError::Unauthorized(
                "Sign in to watch this lesson".into(),
            )
            .into())
        }
        (Some(user), false) => EntitlementRepo::find(&state.pool, &user.learner_id).await?,
    };

    let now = Utc::now();
    let gate = lesson_gate(lesson, || {
        entitlements
            .as_ref()
            .is_some_and(|e| e.has_access(&course_id, Some(&chapter_id), now))
    });

    if !gate.is_open() {
        if let Some(user) = &user {
            tracing::debug!(
                learner_id = %user.learner_id,
                %course_id,
                %chapter_id,
                %lesson_id,
                "Lesson locked"
            );
        }
        return Err(CoreError::Forbidden(
            "This lesson requires an active course or chapter enrollment".into(),
        )
        .into());
    }

    Ok(Json(DataResponse {
        data: LessonContent {
            lesson: lesson.clone(),
            course_id,
            chapter_id,
            gate,
        },
    }))
}
