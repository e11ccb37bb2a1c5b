use uuid::Uuid;

use crate::models::{rating_for, score_for, CreditScore};
use crate::Result;

#[derive(Clone)]
pub struct CreditStorage {
    pool: sqlx::PgPool,
}

impl CreditStorage {
    pub fn new(pool: sqlx::PgPool) -> Self {
        Self { pool }
    }

    /// Readers get the default profile for users with no recorded activity.
    pub async fn get(&self, user_id: Uuid) -> Result<CreditScore> {
        let existing = sqlx::query_as::<_, CreditScore>(
            "SELECT * FROM credit_scores WHERE user_id = $1",
        )
        .bind(user_id)
        .fetch_optional(&self.pool)
        .await?;
        match existing {
            Some(score) => Ok(score),
            None => Ok(CreditScore::fresh(user_id)),
        }
    }

    pub async fn record_completion(&self, user_id: Uuid) -> Result<CreditScore> {
        self.bump(user_id, 1, 0).await
    }

    pub async fn record_report(&self, user_id: Uuid) -> Result<CreditScore> {
        self.bump(user_id, 0, 1).await
    }

    /// Concurrent bumps must both land: the conflict arm adds the deltas to
    /// the stored counters instead of overwriting them, then score and rating
    /// are recomputed from the summed totals.
    async fn bump(
        &self,
        user_id: Uuid,
        campaigns: i32,
        reports: i32,
    ) -> Result<CreditScore> {
        let initial = score_for(campaigns, reports);
        let mut tx = self.pool.begin().await?;
        let (campaigns_completed, reports_submitted) = sqlx::query_as::<_, (i32, i32)>(
            "INSERT INTO credit_scores (id, user_id, score, rating, campaigns_completed, reports_submitted)
             VALUES ($1, $2, $3, $4, $5, $6)
             ON CONFLICT (user_id) DO UPDATE
             SET campaigns_completed = credit_scores.campaigns_completed + EXCLUDED.campaigns_completed,
                 reports_submitted = credit_scores.reports_submitted + EXCLUDED.reports_submitted,
                 updated_at = now()
             RETURNING campaigns_completed, reports_submitted",
        )
        .bind(Uuid::new_v4())
        .bind(user_id)
        .bind(initial)
        .bind(rating_for(initial))
        .bind(campaigns)
        .bind(reports)
        .fetch_one(&mut *tx)
        .await?;
        let score = score_for(campaigns_completed, reports_submitted);
        let updated = sqlx::query_as::<_, CreditScore>(
            "UPDATE credit_scores SET score = $2, rating = $3 WHERE user_id = $1 RETURNING *",
        )
        .bind(user_id)
        .bind(score)
        .bind(rating_for(score))
        .fetch_one(&mut *tx)
        .await?;
        tx.commit().await?;
        Ok(updated)
    }
}
