//! Repository for the `learner_entitlements` table.
//!
//! A learner's grants and progress are one JSONB document. Writers go
//! through [`EntitlementRepo::modify`], which locks the row, applies the
//! change in memory and writes the whole document back in one
//! transaction, so concurrent writes for the same learner serialize.

use learnhub_core::entitlement::LearnerEntitlements;
use sqlx::types::Json;
use sqlx::{PgPool, Postgres, Transaction};

use crate::models::entitlement::EntitlementDocument;

/// Column list shared across queries to avoid repetition.
const COLUMNS: &str = "learner_id, document, updated_at";

/// Provides read and read-modify-write access to entitlement documents.
pub struct EntitlementRepo;

impl EntitlementRepo {
    /// Load a learner's entitlements. Returns `None` if the learner is unknown.
    pub async fn find(
        pool: &PgPool,
        learner_id: &str,
    ) -> Result<Option<LearnerEntitlements>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM learner_entitlements WHERE learner_id = $1");
        let row = sqlx::query_as::<_, EntitlementDocument>(&query)
            .bind(learner_id)
            .fetch_optional(pool)
            .await?;
        Ok(row.map(|r| r.document.0))
    }

    /// Lock and load a learner's document inside `tx` (`SELECT ... FOR UPDATE`).
    pub async fn lock(
        tx: &mut Transaction<'_, Postgres>,
        learner_id: &str,
    ) -> Result<Option<LearnerEntitlements>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM learner_entitlements WHERE learner_id = $1 FOR UPDATE"
        );
        let row = sqlx::query_as::<_, EntitlementDocument>(&query)
            .bind(learner_id)
            .fetch_optional(&mut **tx)
            .await?;
        Ok(row.map(|r| r.document.0))
    }

    /// Replace a learner's whole document inside `tx`.
    pub async fn save(
        tx: &mut Transaction<'_, Postgres>,
        learner_id: &str,
        entitlements: &LearnerEntitlements,
    ) -> Result<(), sqlx::Error> {
        sqlx::query(
            "UPDATE learner_entitlements SET document = $2, updated_at = NOW()
             WHERE learner_id = $1",
        )
        .bind(learner_id)
        .bind(Json(entitlements))
        .execute(&mut **tx)
        .await?;
        Ok(())
    }

    /// Read-modify-write a learner's document as one unit.
    ///
    /// `f` receives the locked document. When it returns `Ok`, the document is
    /// written back and committed; when it returns `Err`, the transaction is
    /// rolled back and nothing is persisted. Returns `Ok(None)` if the learner
    /// is unknown.
    pub async fn modify<T, E, F>(pool: &PgPool, learner_id: &str, f: F) -> Result<Option<T>, E>
    where
        F: FnOnce(&mut LearnerEntitlements) -> Result<T, E>,
        E: From<sqlx::Error>,
    {
        let mut tx = pool.begin().await?;

        let Some(mut entitlements) = Self::lock(&mut tx, learner_id).await? else {
            return Ok(None);
        };

        let value = f(&mut entitlements)?;

        Self::save(&mut tx, learner_id, &entitlements).await?;
        tx.commit().await?;

        tracing::debug!(learner_id, "Entitlement document updated");
        Ok(Some(value))
    }
}
