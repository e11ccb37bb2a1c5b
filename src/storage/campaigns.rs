use uuid::Uuid;

use crate::models::{Campaign, CampaignStatus, NewCampaign};
use crate::Result;

#[derive(Debug, Clone, Default)]
pub struct CampaignFilter {
    pub status: Option<String>,
    pub category: Option<String>,
    pub creator_id: Option<Uuid>,
    pub limit: i64,
    pub offset: i64,
}

#[derive(Clone)]
pub struct CampaignStorage {
    pool: sqlx::PgPool,
}

impl CampaignStorage {
    pub fn new(pool: sqlx::PgPool) -> Self {
        Self { pool }
    }

    pub async fn create(&self, new: NewCampaign) -> Result<Campaign> {
        let query = "INSERT INTO campaigns
            (id, creator_id, title, description, category, goal_amount)
            VALUES ($1, $2, $3, $4, $5, $6) RETURNING *";
        let campaign = sqlx::query_as::<_, Campaign>(query)
            .bind(Uuid::new_v4())
            .bind(new.creator_id)
            .bind(new.title.trim())
            .bind(new.description)
            .bind(new.category)
            .bind(new.goal_amount)
            .fetch_one(&self.pool)
            .await?;
        Ok(campaign)
    }

    pub async fn get(&self, id: Uuid) -> Result<Option<Campaign>> {
        let query = "SELECT * FROM campaigns WHERE id = $1";
        let campaign = sqlx::query_as::<_, Campaign>(query)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(campaign)
    }

    pub async fn list(&self, filter: CampaignFilter) -> Result<Vec<Campaign>> {
        let mut builder = sqlx::QueryBuilder::new("SELECT * FROM campaigns WHERE TRUE");
        if let Some(status) = &filter.status {
            builder.push(" AND status = ").push_bind(status);
        }
        if let Some(category) = &filter.category {
            builder.push(" AND category = ").push_bind(category);
        }
        if let Some(creator_id) = filter.creator_id {
            builder.push(" AND creator_id = ").push_bind(creator_id);
        }
        builder
            .push(" ORDER BY created_at DESC LIMIT ")
            .push_bind(filter.limit)
            .push(" OFFSET ")
            .push_bind(filter.offset);
        let campaigns = builder
            .build_query_as::<Campaign>()
            .fetch_all(&self.pool)
            .await?;
        Ok(campaigns)
    }

    /// Creator shuts down their own active campaign.
    pub async fn close(&self, id: Uuid, creator_id: Uuid) -> Result<Option<Campaign>> {
        let query = "UPDATE campaigns
            SET status = $3, updated_at = now()
            WHERE id = $1 AND creator_id = $2 AND status = $4
            RETURNING *";
        let campaign = sqlx::query_as::<_, Campaign>(query)
            .bind(id)
            .bind(creator_id)
            .bind(CampaignStatus::Closed.as_str())
            .bind(CampaignStatus::Active.as_str())
            .fetch_optional(&self.pool)
            .await?;
        Ok(campaign)
    }

    /// Moderation approval: pending → active, marks the TES vetting flag.
    pub async fn approve(&self, id: Uuid) -> Result<Option<Campaign>> {
        let query = "UPDATE campaigns
            SET status = $2, tes_verified = TRUE, updated_at = now()
            WHERE id = $1 AND status = $3
            RETURNING *";
        let campaign = sqlx::query_as::<_, Campaign>(query)
            .bind(id)
            .bind(CampaignStatus::Active.as_str())
            .bind(CampaignStatus::Pending.as_str())
            .fetch_optional(&self.pool)
            .await?;
        Ok(campaign)
    }

    pub async fn reject(&self, id: Uuid, reason: Option<String>) -> Result<Option<Campaign>> {
        let query = "UPDATE campaigns
            SET status = $2, rejection_reason = $3, updated_at = now()
            WHERE id = $1 AND status = $4
            RETURNING *";
        let campaign = sqlx::query_as::<_, Campaign>(query)
            .bind(id)
            .bind(CampaignStatus::Rejected.as_str())
            .bind(reason)
            .bind(CampaignStatus::Pending.as_str())
            .fetch_optional(&self.pool)
            .await?;
        Ok(campaign)
    }
}
