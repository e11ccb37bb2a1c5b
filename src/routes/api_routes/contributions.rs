use axum::extract::{Query, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::Json;
use rust_decimal::Decimal;
use serde::Deserialize;
use uuid::Uuid;

use crate::models::{AppState, NewContribution, NewNotification, NewTip, NotificationKind};
use crate::{AppError, Result};

pub async fn create(
    State(state): State<AppState>,
    Json(new): Json<NewContribution>,
) -> Result<impl IntoResponse> {
    if new.amount <= Decimal::ZERO {
        return Err(AppError::validation("Amount must be greater than 0"));
    }
    let outcome = state.contributions.create(new).await?;
    super::notify(
        &state,
        NewNotification {
            user_id: outcome.campaign.creator_id,
            title: "New contribution".to_string(),
            body: format!(
                "\"{}\" received a contribution of {} PUSO",
                outcome.campaign.title, outcome.contribution.amount
            ),
            kind: NotificationKind::Contribution,
        },
    )
    .await;
    if outcome.reached_goal {
        super::notify(
            &state,
            NewNotification {
                user_id: outcome.campaign.creator_id,
                title: "Goal reached".to_string(),
                body: format!("\"{}\" hit its funding goal", outcome.campaign.title),
                kind: NotificationKind::Campaign,
            },
        )
        .await;
        if let Err(err) = state
            .credit
            .record_completion(outcome.campaign.creator_id)
            .await
        {
            tracing::error!("failed to update credit score: {err:?}");
        }
    }
    Ok((StatusCode::CREATED, Json(outcome.contribution)))
}

#[derive(Deserialize)]
pub struct HistoryQuery {
    user_id: Uuid,
}

pub async fn list(
    State(state): State<AppState>,
    Query(query): Query<HistoryQuery>,
) -> Result<impl IntoResponse> {
    let contributions = state.contributions.list_by_user(query.user_id).await?;
    Ok(Json(contributions))
}

pub async fn tip(
    State(state): State<AppState>,
    Json(new): Json<NewTip>,
) -> Result<impl IntoResponse> {
    if new.amount <= Decimal::ZERO {
        return Err(AppError::validation("Amount must be greater than 0"));
    }
    let outcome = state.contributions.create_tip(new).await?;
    super::notify(
        &state,
        NewNotification {
            user_id: outcome.campaign.creator_id,
            title: "You received a tip".to_string(),
            body: format!(
                "A supporter of \"{}\" tipped you {} PUSO",
                outcome.campaign.title, outcome.tip.amount
            ),
            kind: NotificationKind::Tip,
        },
    )
    .await;
    Ok((StatusCode::CREATED, Json(outcome.tip)))
}
