use rust_decimal::Decimal;
use uuid::Uuid;

use crate::models::{
    Campaign, CampaignStatus, Contribution, Currency, NewContribution, NewTip, NewTransaction, Tip,
    TransactionKind, TransactionStatus,
};
use crate::storage::transactions::record;
use crate::{AppError, Result};

/// What a contribution did, for the notification/credit fan-out after
/// commit.
#[derive(Debug, Clone)]
pub struct ContributionOutcome {
    pub contribution: Contribution,
    pub campaign: Campaign,
    /// True when this contribution pushed the campaign over its goal.
    pub reached_goal: bool,
}

#[derive(Debug, Clone)]
pub struct TipOutcome {
    pub tip: Tip,
    pub campaign: Campaign,
}

#[derive(Clone)]
pub struct ContributionStorage {
    pool: sqlx::PgPool,
}

impl ContributionStorage {
    pub fn new(pool: sqlx::PgPool) -> Self {
        Self { pool }
    }

    /// Moves PUSO from the contributor to the campaign: debit, contribution
    /// row, campaign roll-up and ledger row all commit together.
    pub async fn create(&self, new: NewContribution) -> Result<ContributionOutcome> {
        let mut tx = self.pool.begin().await?;
        let campaign = sqlx::query_as::<_, Campaign>("SELECT * FROM campaigns WHERE id = $1")
            .bind(new.campaign_id)
            .fetch_optional(&mut *tx)
            .await?
            .ok_or(AppError::not_found("Campaign"))?;
        if campaign.status != CampaignStatus::Active.as_str() {
            return Err(AppError::validation("Campaign is not accepting contributions"));
        }
        if campaign.creator_id == new.contributor_id {
            return Err(AppError::validation("Cannot contribute to your own campaign"));
        }
        debit_puso(&mut tx, new.contributor_id, new.amount).await?;
        let contribution = sqlx::query_as::<_, Contribution>(
            "INSERT INTO contributions
             (id, campaign_id, contributor_id, amount, message, is_anonymous)
             VALUES ($1, $2, $3, $4, $5, $6)
             RETURNING *",
        )
        .bind(Uuid::new_v4())
        .bind(new.campaign_id)
        .bind(new.contributor_id)
        .bind(new.amount)
        .bind(new.message)
        .bind(new.is_anonymous)
        .fetch_one(&mut *tx)
        .await?;
        let campaign = sqlx::query_as::<_, Campaign>(
            "UPDATE campaigns
             SET current_amount = current_amount + $2,
                 status = CASE
                     WHEN current_amount + $2 >= goal_amount THEN 'completed'
                     ELSE status
                 END,
                 updated_at = now()
             WHERE id = $1
             RETURNING *",
        )
        .bind(new.campaign_id)
        .bind(new.amount)
        .fetch_one(&mut *tx)
        .await?;
        record(
            &mut *tx,
            NewTransaction {
                user_id: new.contributor_id,
                kind: TransactionKind::Contribution,
                amount: new.amount,
                currency: Currency::Puso.to_string(),
                status: TransactionStatus::Completed,
                exchange_rate: None,
                fee_amount: None,
                provider_ref: None,
                description: Some(format!("Contribution to {}", campaign.title)),
            },
        )
        .await?;
        tx.commit().await?;
        let reached_goal = campaign.status == CampaignStatus::Completed.as_str();
        Ok(ContributionOutcome {
            contribution,
            campaign,
            reached_goal,
        })
    }

    pub async fn list_by_campaign(&self, campaign_id: Uuid) -> Result<Vec<Contribution>> {
        let query = "SELECT * FROM contributions
            WHERE campaign_id = $1 ORDER BY created_at DESC";
        let rows = sqlx::query_as::<_, Contribution>(query)
            .bind(campaign_id)
            .fetch_all(&self.pool)
            .await?;
        Ok(rows)
    }

    pub async fn list_by_user(&self, user_id: Uuid) -> Result<Vec<Contribution>> {
        let query = "SELECT * FROM contributions
            WHERE contributor_id = $1 ORDER BY created_at DESC";
        let rows = sqlx::query_as::<_, Contribution>(query)
            .bind(user_id)
            .fetch_all(&self.pool)
            .await?;
        Ok(rows)
    }

    /// Tips go straight to the creator's PUSO wallet; the campaign row only
    /// keeps the running total.
    pub async fn create_tip(&self, new: NewTip) -> Result<TipOutcome> {
        let mut tx = self.pool.begin().await?;
        let campaign = sqlx::query_as::<_, Campaign>("SELECT * FROM campaigns WHERE id = $1")
            .bind(new.campaign_id)
            .fetch_optional(&mut *tx)
            .await?
            .ok_or(AppError::not_found("Campaign"))?;
        let accepts_tips = campaign.status == CampaignStatus::Active.as_str()
            || campaign.status == CampaignStatus::Completed.as_str();
        if !accepts_tips {
            return Err(AppError::validation("Campaign is not accepting tips"));
        }
        if campaign.creator_id == new.tipper_id {
            return Err(AppError::validation("Cannot tip your own campaign"));
        }
        debit_puso(&mut tx, new.tipper_id, new.amount).await?;
        sqlx::query("UPDATE users SET puso_balance = puso_balance + $1 WHERE id = $2")
            .bind(new.amount)
            .bind(campaign.creator_id)
            .execute(&mut *tx)
            .await?;
        let tip = sqlx::query_as::<_, Tip>(
            "INSERT INTO tips (id, campaign_id, tipper_id, amount, message)
             VALUES ($1, $2, $3, $4, $5)
             RETURNING *",
        )
        .bind(Uuid::new_v4())
        .bind(new.campaign_id)
        .bind(new.tipper_id)
        .bind(new.amount)
        .bind(new.message)
        .fetch_one(&mut *tx)
        .await?;
        let campaign = sqlx::query_as::<_, Campaign>(
            "UPDATE campaigns SET tip_amount = tip_amount + $2, updated_at = now()
             WHERE id = $1
             RETURNING *",
        )
        .bind(new.campaign_id)
        .bind(new.amount)
        .fetch_one(&mut *tx)
        .await?;
        record(
            &mut *tx,
            NewTransaction {
                user_id: new.tipper_id,
                kind: TransactionKind::Tip,
                amount: new.amount,
                currency: Currency::Puso.to_string(),
                status: TransactionStatus::Completed,
                exchange_rate: None,
                fee_amount: None,
                provider_ref: None,
                description: Some(format!("Tip for {}", campaign.title)),
            },
        )
        .await?;
        tx.commit().await?;
        Ok(TipOutcome { tip, campaign })
    }
}

async fn debit_puso(
    tx: &mut sqlx::Transaction<'_, sqlx::Postgres>,
    user_id: Uuid,
    amount: Decimal,
) -> Result<()> {
    let balance: Option<(Decimal,)> =
        sqlx::query_as("SELECT puso_balance FROM users WHERE id = $1")
            .bind(user_id)
            .fetch_optional(&mut **tx)
            .await?;
    let Some((balance,)) = balance else {
        return Err(AppError::not_found("User"));
    };
    if balance < amount {
        return Err(AppError::validation("Insufficient PUSO balance"));
    }
    let debited =
        sqlx::query("UPDATE users SET puso_balance = puso_balance - $1 WHERE id = $2 AND puso_balance >= $1")
            .bind(amount)
            .bind(user_id)
            .execute(&mut **tx)
            .await?;
    if debited.rows_affected() == 0 {
        return Err(AppError::validation("Insufficient PUSO balance"));
    }
    Ok(())
}
