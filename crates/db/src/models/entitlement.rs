//! Persisted learner entitlement document.

use learnhub_core::entitlement::LearnerEntitlements;
use learnhub_core::types::{LearnerId, Timestamp};
use sqlx::types::Json;
use sqlx::FromRow;

/// A row from the `learner_entitlements` table.
#[derive(Debug, Clone, FromRow)]
pub struct EntitlementDocument {
    pub learner_id: LearnerId,
    pub document: Json<LearnerEntitlements>,
    pub updated_at: Timestamp,
}
