//! Route definitions for the `/learners` resource and the learner-scoped
//! entitlement and progress endpoints.

use axum::routing::{get, post};
use axum::Router;

use crate::handlers::{enrollment, learner, progress};
use crate::state::AppState;

/// Routes mounted at `/learners`.
///
/// ```text
/// GET    /{learner_id}                                     -> learner::get_by_id
/// DELETE /{learner_id}                                     -> learner::delete
/// POST   /{learner_id}/enrollments/courses                 -> enrollment::enroll_course
/// POST   /{learner_id}/enrollments/chapters                -> enrollment::enroll_chapter
/// POST   /{learner_id}/purchases                           -> enrollment::purchase
/// GET    /{learner_id}/courses/{course_id}/access          -> enrollment::check_access
/// GET    /{learner_id}/courses/{course_id}/progress        -> progress::course_progress
/// GET    /{learner_id}/courses/{course_id}/chapters/{chapter_id}/progress
///                                                          -> progress::chapter_progress
/// POST   /{learner_id}/courses/{course_id}/chapters/{chapter_id}/lessons/{lesson_id}/watched
///                                                          -> progress::mark_watched
/// ```
pub fn router() -> Router<AppState> {
    let course_routes = Router::new()
        .route("/access", get(enrollment::check_access))
        .route("/progress", get(progress::course_progress))
        .route("/chapters/{chapter_id}/progress", get(progress::chapter_progress))
        .route(
            "/chapters/{chapter_id}/lessons/{lesson_id}/watched",
            post(progress::mark_watched),
        );

    Router::new()
        .route("/{learner_id}", get(learner::get_by_id).delete(learner::delete))
        .route("/{learner_id}/enrollments/courses", post(enrollment::enroll_course))
        .route("/{learner_id}/enrollments/chapters", post(enrollment::enroll_chapter))
        .route("/{learner_id}/purchases", post(enrollment::purchase))
        .nest("/{learner_id}/courses/{course_id}", course_routes)
}
