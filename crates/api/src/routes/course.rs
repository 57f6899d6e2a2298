//! Route definitions for the `/courses` catalog resource.

use axum::routing::{get, post};
use axum::Router;

use crate::handlers::course;
use crate::state::AppState;

/// Routes mounted at `/courses`.
///
/// ```text
/// POST   /                                                 -> create
/// GET    /{course_id}                                      -> get_by_id
/// GET    /{course_id}/chapters/{chapter_id}/lessons/{lesson_id}  -> get_lesson
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", post(course::create))
        .route("/{course_id}", get(course::get_by_id))
        .route(
            "/{course_id}/chapters/{chapter_id}/lessons/{lesson_id}",
            get(course::get_lesson),
        )
}
