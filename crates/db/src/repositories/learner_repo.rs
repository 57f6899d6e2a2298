//! Repository for the `learners` table.

use sqlx::PgPool;

use crate::models::learner::{Learner, UpsertLearner};

/// Column list shared across queries to avoid repetition.
const COLUMNS: &str = "id, display_name, email, role, created_at, updated_at";

/// Provides create/read/delete operations for learners.
pub struct LearnerRepo;

impl LearnerRepo {
    /// Insert the learner or refresh its profile, returning the stored row.
    ///
    /// Also creates the learner's empty entitlement document on first insert.
    /// The role is only set on insert; later calls never change it.
    pub async fn upsert(
        pool: &PgPool,
        id: &str,
        role: &str,
        input: &UpsertLearner,
    ) -> Result<Learner, sqlx::Error> {
        let mut tx = pool.begin().await?;

        let query = format!(
            "INSERT INTO learners (id, display_name, email, role)
             VALUES ($1, $2, $3, $4)
             ON CONFLICT (id) DO UPDATE SET
                display_name = EXCLUDED.display_name,
                email = EXCLUDED.email,
                updated_at = NOW()
             RETURNING {COLUMNS}"
        );
        let learner = sqlx::query_as::<_, Learner>(&query)
            .bind(id)
            .bind(&input.display_name)
            .bind(&input.email)
            .bind(role)
            .fetch_one(&mut *tx)
            .await?;

        sqlx::query(
            "INSERT INTO learner_entitlements (learner_id) VALUES ($1)
             ON CONFLICT (learner_id) DO NOTHING",
        )
        .bind(id)
        .execute(&mut *tx)
        .await?;

        tx.commit().await?;
        Ok(learner)
    }

    /// Find a learner by id.
    pub async fn find_by_id(pool: &PgPool, id: &str) -> Result<Option<Learner>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM learners WHERE id = $1");
        sqlx::query_as::<_, Learner>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    /// Permanently delete a learner. Entitlements and progress cascade.
    ///
    /// Returns `true` if a row was removed.
    pub async fn delete(pool: &PgPool, id: &str) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("DELETE FROM learners WHERE id = $1")
            .bind(id)
            .execute(pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }
}
