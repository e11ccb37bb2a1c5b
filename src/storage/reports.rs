use uuid::Uuid;

use crate::models::{Campaign, NewReport, ProgressReport};
use crate::{AppError, Result};

#[derive(Clone)]
pub struct ReportStorage {
    pool: sqlx::PgPool,
}

impl ReportStorage {
    pub fn new(pool: sqlx::PgPool) -> Self {
        Self { pool }
    }

    pub async fn create(&self, campaign_id: Uuid, new: NewReport) -> Result<ProgressReport> {
        let mut tx = self.pool.begin().await?;
        let campaign = sqlx::query_as::<_, Campaign>("SELECT * FROM campaigns WHERE id = $1")
            .bind(campaign_id)
            .fetch_optional(&mut *tx)
            .await?
            .ok_or(AppError::not_found("Campaign"))?;
        if campaign.creator_id != new.author_id {
            return Err(AppError::validation(
                "Only the campaign creator can file progress reports",
            ));
        }
        let report = sqlx::query_as::<_, ProgressReport>(
            "INSERT INTO progress_reports (id, campaign_id, author_id, title, body, amount_spent)
             VALUES ($1, $2, $3, $4, $5, $6)
             RETURNING *",
        )
        .bind(Uuid::new_v4())
        .bind(campaign_id)
        .bind(new.author_id)
        .bind(new.title)
        .bind(new.body)
        .bind(new.amount_spent)
        .fetch_one(&mut *tx)
        .await?;
        tx.commit().await?;
        Ok(report)
    }

    pub async fn list_by_campaign(&self, campaign_id: Uuid) -> Result<Vec<ProgressReport>> {
        let query = "SELECT * FROM progress_reports
            WHERE campaign_id = $1
            ORDER BY created_at DESC";
        let rows = sqlx::query_as::<_, ProgressReport>(query)
            .bind(campaign_id)
            .fetch_all(&self.pool)
            .await?;
        Ok(rows)
    }
}
