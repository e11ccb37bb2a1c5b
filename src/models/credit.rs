use chrono::{DateTime, Utc};
use serde::Serialize;
use sqlx::FromRow;
use uuid::Uuid;

#[derive(Debug, Clone, Serialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct CreditScore {
    pub id: Uuid,
    pub user_id: Uuid,
    pub score: i32,
    pub rating: String,
    pub reports_submitted: i32,
    pub campaigns_completed: i32,
    pub updated_at: DateTime<Utc>,
}

impl CreditScore {
    /// Profile for a user with no recorded activity yet.
    pub fn fresh(user_id: Uuid) -> Self {
        let score = score_for(0, 0);
        Self {
            id: Uuid::new_v4(),
            user_id,
            score,
            rating: rating_for(score).to_string(),
            reports_submitted: 0,
            campaigns_completed: 0,
            updated_at: Utc::now(),
        }
    }
}

const BASE_SCORE: i32 = 50;
const COMPLETED_CAMPAIGN_POINTS: i32 = 8;
const REPORT_POINTS: i32 = 3;

/// Accountability score derived from a creator's track record, clamped to
/// 0..=100.
pub fn score_for(campaigns_completed: i32, reports_submitted: i32) -> i32 {
    let score = BASE_SCORE
        + campaigns_completed * COMPLETED_CAMPAIGN_POINTS
        + reports_submitted * REPORT_POINTS;
    score.clamp(0, 100)
}

pub fn rating_for(score: i32) -> &'static str {
    match score {
        90..=100 => "Excellent",
        75..=89 => "Good",
        60..=74 => "Fair",
        _ => "Building",
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn score_starts_at_base_and_climbs() {
        assert_eq!(score_for(0, 0), 50);
        assert_eq!(score_for(1, 0), 58);
        assert_eq!(score_for(0, 2), 56);
        assert_eq!(score_for(3, 4), 86);
    }

    #[test]
    fn score_is_clamped_to_100() {
        assert_eq!(score_for(10, 10), 100);
    }

    #[test]
    fn rating_labels_follow_bands() {
        assert_eq!(rating_for(95), "Excellent");
        assert_eq!(rating_for(90), "Excellent");
        assert_eq!(rating_for(80), "Good");
        assert_eq!(rating_for(60), "Fair");
        assert_eq!(rating_for(50), "Building");
    }
}
