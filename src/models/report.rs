use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

/// Spending/progress update a creator files against their campaign; feeds
/// the creator's credit score.
#[derive(Debug, Clone, Serialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct ProgressReport {
    pub id: Uuid,
    pub campaign_id: Uuid,
    pub author_id: Uuid,
    pub title: String,
    pub body: String,
    pub amount_spent: Option<Decimal>,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewReport {
    pub author_id: Uuid,
    pub title: String,
    pub body: String,
    pub amount_spent: Option<Decimal>,
}
