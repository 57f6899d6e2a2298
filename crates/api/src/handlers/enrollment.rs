//! Handlers for access checks and enrollment under
//! `/learners/{learner_id}`.
//!
//! Every handler first checks that the caller is the learner or an admin.
//! Writes go through [`EntitlementRepo::modify`] so each request is one
//! locked read-modify-write of the learner's entitlement document.

use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::Json;
use chrono::Utc;
use learnhub_core::entitlement::{AccessType, EnrolledChapter, EnrolledCourse};
use learnhub_core::error::CoreError;
use learnhub_core::pricing::{access_window, effective_pricing, DurationKey};
use learnhub_core::roles::ensure_self_or_admin;
use learnhub_core::types::{ContentId, Timestamp};
use learnhub_db::repositories::{CourseRepo, EntitlementRepo};
use serde::{Deserialize, Serialize};

use crate::error::{AppError, AppResult};
use crate::middleware::auth::AuthUser;
use crate::response::DataResponse;
use crate::state::AppState;

// ---------------------------------------------------------------------------
// Request / response types
// ---------------------------------------------------------------------------

#[derive(Debug, Deserialize)]
pub struct AccessQuery {
    pub chapter_id: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct AccessResponse {
    pub course_id: ContentId,
    pub chapter_id: Option<ContentId>,
    pub has_access: bool,
}

#[derive(Debug, Deserialize)]
pub struct EnrollCourseRequest {
    pub course_id: ContentId,
    pub access_type: AccessType,
    pub end_at: Option<Timestamp>,
}

#[derive(Debug, Deserialize)]
pub struct EnrollChapterRequest {
    pub course_id: ContentId,
    pub chapter_id: ContentId,
    pub access_type: AccessType,
    pub end_at: Option<Timestamp>,
}

/// Buy a duration of access to a whole course or, with `chapter_id`, to
/// one chapter. Payment is settled elsewhere before this is called.
#[derive(Debug, Deserialize)]
pub struct PurchaseRequest {
    pub course_id: ContentId,
    pub chapter_id: Option<ContentId>,
    pub duration: DurationKey,
}

#[derive(Debug, Serialize)]
pub struct PurchaseReceipt {
    pub course_id: ContentId,
    pub chapter_id: Option<ContentId>,
    pub duration: DurationKey,
    /// Effective price in minor currency units.
    pub price: i64,
    pub access_type: AccessType,
    pub enrolled_at: Timestamp,
    pub end_at: Option<Timestamp>,
}

fn learner_not_found(learner_id: &str) -> AppError {
    CoreError::not_found("Learner", learner_id).into()
}

// ---------------------------------------------------------------------------
// Handlers
// ---------------------------------------------------------------------------

/// GET /api/v1/learners/{learner_id}/courses/{course_id}/access[?chapter_id=]
pub async fn check_access(
    State(state): State<AppState>,
    user: AuthUser,
    Path((learner_id, course_id)): Path<(String, String)>,
    Query(query): Query<AccessQuery>,
) -> AppResult<Json<DataResponse<AccessResponse>>> {
    ensure_self_or_admin(&user.learner_id, &user.role, &learner_id)?;

    let entitlements = EntitlementRepo::find(&state.pool, &learner_id)
        .await?
        .ok_or_else(|| learner_not_found(&learner_id))?;

    let has_access = entitlements.has_access(&course_id, query.chapter_id.as_deref(), Utc::now());

    Ok(Json(DataResponse {
        data: AccessResponse {
            course_id,
            chapter_id: query.chapter_id,
            has_access,
        },
    }))
}

/// POST /api/v1/learners/{learner_id}/enrollments/courses
pub async fn enroll_course(
    State(state): State<AppState>,
    user: AuthUser,
    Path(learner_id): Path<String>,
    Json(input): Json<EnrollCourseRequest>,
) -> AppResult<(StatusCode, Json<DataResponse<EnrolledCourse>>)> {
    ensure_self_or_admin(&user.learner_id, &user.role, &learner_id)?;

    if !CourseRepo::exists(&state.pool, &input.course_id).await? {
        return Err(CoreError::not_found("Course", &input.course_id).into());
    }

    let now = Utc::now();
    let grant = EntitlementRepo::modify(&state.pool, &learner_id, |e| {
        e.enroll_in_course(&input.course_id, input.access_type, input.end_at, now)
            .cloned()
            .map_err(AppError::from)
    })
    .await?
    .ok_or_else(|| learner_not_found(&learner_id))?;

    tracing::info!(
        %learner_id,
        course_id = %grant.course_id,
        access_type = grant.access_type.as_str(),
        "Enrolled in course"
    );
    Ok((StatusCode::CREATED, Json(DataResponse { data: grant })))
}

/// POST /api/v1/learners/{learner_id}/enrollments/chapters
pub async fn enroll_chapter(
    State(state): State<AppState>,
    user: AuthUser,
    Path(learner_id): Path<String>,
    Json(input): Json<EnrollChapterRequest>,
) -> AppResult<(StatusCode, Json<DataResponse<EnrolledChapter>>)> {
    ensure_self_or_admin(&user.learner_id, &user.role, &learner_id)?;

    let course = CourseRepo::find_by_id(&state.pool, &input.course_id)
        .await?
        .ok_or_else(|| CoreError::not_found("Course", &input.course_id))?;
    if course.find_chapter(&input.chapter_id).is_none() {
        return Err(CoreError::not_found("Chapter", &input.chapter_id).into());
    }

    let now = Utc::now();
    let grant = EntitlementRepo::modify(&state.pool, &learner_id, |e| {
        e.enroll_in_chapter(
            &input.course_id,
            &input.chapter_id,
            input.access_type,
            input.end_at,
            now,
        )
        .cloned()
        .map_err(AppError::from)
    })
    .await?
    .ok_or_else(|| learner_not_found(&learner_id))?;

    tracing::info!(
        %learner_id,
        course_id = %grant.course_id,
        chapter_id = %grant.chapter_id,
        access_type = grant.access_type.as_str(),
        "Enrolled in chapter"
    );
    Ok((StatusCode::CREATED, Json(DataResponse { data: grant })))
}

/// POST /api/v1/learners/{learner_id}/purchases
///
/// Resolve the effective price for the requested duration, convert the
/// duration into an access window starting now, and enroll.
pub async fn purchase(
    State(state): State<AppState>,
    user: AuthUser,
    Path(learner_id): Path<String>,
    Json(input): Json<PurchaseRequest>,
) -> AppResult<(StatusCode, Json<DataResponse<PurchaseReceipt>>)> {
    ensure_self_or_admin(&user.learner_id, &user.role, &learner_id)?;

    let course = CourseRepo::find_by_id(&state.pool, &input.course_id)
        .await?
        .ok_or_else(|| CoreError::not_found("Course", &input.course_id))?;

    let chapter = match input.chapter_id.as_deref() {
        Some(chapter_id) => Some(
            course
                .find_chapter(chapter_id)
                .ok_or_else(|| CoreError::not_found("Chapter", chapter_id))?,
        ),
        None => None,
    };

    let price = effective_pricing(
        course.pricing.as_ref(),
        chapter.and_then(|c| c.pricing.as_ref()),
    )
    .and_then(|p| p.price_for(input.duration))
    .ok_or_else(|| {
        CoreError::Validation(format!(
            "Duration '{}' is not offered for this item",
            input.duration.as_str()
        ))
    })?;

    let now = Utc::now();
    let window = access_window(input.duration, now)?;

    let enrolled_at = EntitlementRepo::modify(&state.pool, &learner_id, |e| {
        let enrolled_at = match input.chapter_id.as_deref() {
            Some(chapter_id) => {
                e.enroll_in_chapter(
                    &input.course_id,
                    chapter_id,
                    window.access_type,
                    window.end_at,
                    now,
                )?
                .enrolled_at
            }
            None => {
                e.enroll_in_course(&input.course_id, window.access_type, window.end_at, now)?
                    .enrolled_at
            }
        };
        Ok::<_, AppError>(enrolled_at)
    })
    .await?
    .ok_or_else(|| learner_not_found(&learner_id))?;

    tracing::info!(
        %learner_id,
        course_id = %input.course_id,
        chapter_id = ?input.chapter_id,
        duration = input.duration.as_str(),
        price,
        "Purchase recorded"
    );

    Ok((
        StatusCode::CREATED,
        Json(DataResponse {
            data: PurchaseReceipt {
                course_id: input.course_id,
                chapter_id: input.chapter_id,
                duration: input.duration,
                price,
                access_type: window.access_type,
                enrolled_at,
                end_at: window.end_at,
            },
        }),
    ))
}
