pub mod course;
pub mod health;
pub mod learner;

use axum::routing::put;
use axum::Router;

use crate::handlers;
use crate::state::AppState;

/// Build the `/api/v1` route tree.
///
/// ```text
/// /me                                                    upsert caller profile (PUT)
///
/// /courses                                               create (instructor/admin)
/// /courses/{course_id}                                   catalog tree
/// /courses/{course_id}/chapters/{chapter_id}/lessons/{lesson_id}
///                                                        content gate
///
/// /learners/{learner_id}                                 get (self/admin), delete (admin)
/// /learners/{learner_id}/enrollments/courses             enroll in course (POST)
/// /learners/{learner_id}/enrollments/chapters            enroll in chapter (POST)
/// /learners/{learner_id}/purchases                       duration purchase (POST)
/// /learners/{learner_id}/courses/{course_id}/access      access check (?chapter_id)
/// /learners/{learner_id}/courses/{course_id}/progress    course progress
/// /learners/{learner_id}/courses/{course_id}/chapters/{chapter_id}/progress
///                                                        chapter progress
/// /learners/{learner_id}/courses/{course_id}/chapters/{chapter_id}/lessons/{lesson_id}/watched
///                                                        mark watched (POST)
/// ```
pub fn api_routes() -> Router<AppState> {
    Router::new()
        .route("/me", put(handlers::learner::upsert_me))
        .nest("/courses", course::router())
        .nest("/learners", learner::router())
}
