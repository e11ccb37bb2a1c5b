use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

#[derive(Debug, Clone, Serialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct Contribution {
    pub id: Uuid,
    pub campaign_id: Uuid,
    pub contributor_id: Uuid,
    pub amount: Decimal,
    pub message: Option<String>,
    pub is_anonymous: bool,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewContribution {
    pub campaign_id: Uuid,
    pub contributor_id: Uuid,
    pub amount: Decimal,
    pub message: Option<String>,
    #[serde(default)]
    pub is_anonymous: bool,
}

/// A voluntary extra amount sent to a campaign's creator, on top of any
/// contribution.
#[derive(Debug, Clone, Serialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct Tip {
    pub id: Uuid,
    pub campaign_id: Uuid,
    pub tipper_id: Uuid,
    pub amount: Decimal,
    pub message: Option<String>,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewTip {
    pub campaign_id: Uuid,
    pub tipper_id: Uuid,
    pub amount: Decimal,
    pub message: Option<String>,
}
