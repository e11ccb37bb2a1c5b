use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::Json;
use rust_decimal::Decimal;
use serde::Deserialize;
use uuid::Uuid;

use crate::models::{AppState, NewCampaign, NewNotification, NewReport, NotificationKind};
use crate::storage::CampaignFilter;
use crate::{AppError, Result};

pub async fn create(
    State(state): State<AppState>,
    Json(new): Json<NewCampaign>,
) -> Result<impl IntoResponse> {
    if new.title.trim().is_empty() {
        return Err(AppError::validation("Title is required"));
    }
    if new.goal_amount <= Decimal::ZERO {
        return Err(AppError::validation("Goal amount must be greater than 0"));
    }
    let campaign = state.campaigns.create(new).await?;
    Ok((StatusCode::CREATED, Json(campaign)))
}

#[derive(Deserialize)]
pub struct ListQuery {
    status: Option<String>,
    category: Option<String>,
    creator_id: Option<Uuid>,
    limit: Option<i64>,
    offset: Option<i64>,
}

pub async fn list(
    State(state): State<AppState>,
    Query(query): Query<ListQuery>,
) -> Result<impl IntoResponse> {
    let filter = CampaignFilter {
        status: query.status,
        category: query.category,
        creator_id: query.creator_id,
        limit: query.limit.unwrap_or(20),
        offset: query.offset.unwrap_or(0),
    };
    let campaigns = state.campaigns.list(filter).await?;
    Ok(Json(campaigns))
}

pub async fn get(State(state): State<AppState>, Path(id): Path<Uuid>) -> Result<impl IntoResponse> {
    let campaign = state
        .campaigns
        .get(id)
        .await?
        .ok_or(AppError::not_found("Campaign"))?;
    Ok(Json(campaign))
}

pub async fn contributions(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse> {
    let contributions = state.contributions.list_by_campaign(id).await?;
    Ok(Json(contributions))
}

pub async fn reports(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse> {
    let reports = state.reports.list_by_campaign(id).await?;
    Ok(Json(reports))
}

pub async fn create_report(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(new): Json<NewReport>,
) -> Result<impl IntoResponse> {
    if new.title.trim().is_empty() || new.body.trim().is_empty() {
        return Err(AppError::validation("Report title and body are required"));
    }
    let report = state.reports.create(id, new).await?;
    if let Err(err) = state.credit.record_report(report.author_id).await {
        tracing::error!("failed to update credit score: {err:?}");
    }
    Ok((StatusCode::CREATED, Json(report)))
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CloseRequest {
    creator_id: Uuid,
}

pub async fn close(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(request): Json<CloseRequest>,
) -> Result<impl IntoResponse> {
    let campaign = state
        .campaigns
        .close(id, request.creator_id)
        .await?
        .ok_or(AppError::not_found("Active campaign"))?;
    super::notify(
        &state,
        NewNotification {
            user_id: campaign.creator_id,
            title: "Campaign closed".to_string(),
            body: format!("\"{}\" is no longer accepting contributions", campaign.title),
            kind: NotificationKind::Campaign,
        },
    )
    .await;
    Ok(Json(campaign))
}
