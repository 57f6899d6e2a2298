//! Handlers for the caller's profile and the `/learners` resource.

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::Json;
use learnhub_core::error::CoreError;
use learnhub_core::roles::ensure_self_or_admin;
use learnhub_db::models::learner::{Learner, UpsertLearner};
use learnhub_db::repositories::LearnerRepo;

use crate::error::AppResult;
use crate::middleware::auth::AuthUser;
use crate::middleware::rbac::RequireAdmin;
use crate::response::DataResponse;
use crate::state::AppState;

/// PUT /api/v1/me
///
/// Create or refresh the caller's learner profile. The id and role come
/// from the token; a new learner starts with no entitlements.
pub async fn upsert_me(
    State(state): State<AppState>,
    user: AuthUser,
    Json(input): Json<UpsertLearner>,
) -> AppResult<Json<DataResponse<Learner>>> {
    if input.display_name.trim().is_empty() {
        return Err(CoreError::Validation("display_name must not be empty".into()).into());
    }

    let learner = LearnerRepo::upsert(&state.pool, &user.learner_id, &user.role, &input).await?;
    tracing::info!(learner_id = %learner.id, role = %learner.role, "Learner profile upserted");
    Ok(Json(DataResponse { data: learner }))
}

/// GET /api/v1/learners/{learner_id}
pub async fn get_by_id(
    State(state): State<AppState>,
    user: AuthUser,
    Path(learner_id): Path<String>,
) -> AppResult<Json<DataResponse<Learner>>> {
    ensure_self_or_admin(&user.learner_id, &user.role, &learner_id)?;

    let learner = LearnerRepo::find_by_id(&state.pool, &learner_id)
        .await?
        .ok_or_else(|| CoreError::not_found("Learner", &learner_id))?;
    Ok(Json(DataResponse { data: learner }))
}

/// DELETE /api/v1/learners/{learner_id}
///
/// Removes the learner together with every grant and progress record.
pub async fn delete(
    State(state): State<AppState>,
    RequireAdmin(admin): RequireAdmin,
    Path(learner_id): Path<String>,
) -> AppResult<StatusCode> {
    if !LearnerRepo::delete(&state.pool, &learner_id).await? {
        return Err(CoreError::not_found("Learner", &learner_id).into());
    }
    tracing::info!(%learner_id, admin_id = %admin.learner_id, "Learner deleted");
    Ok(StatusCode::NO_CONTENT)
}
