//! Learner entity model and DTOs.

use learnhub_core::types::{LearnerId, Timestamp};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// A row from the `learners` table.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct Learner {
    pub id: LearnerId,
    pub display_name: String,
    pub email: Option<String>,
    pub role: String,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

/// DTO for creating or refreshing the caller's learner profile.
///
/// The id and role come from the verified token, never from the body.
#[derive(Debug, Clone, Deserialize)]
pub struct UpsertLearner {
    pub display_name: String,
    pub email: Option<String>,
}
