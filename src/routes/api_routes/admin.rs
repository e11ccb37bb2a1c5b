use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::routing::{get, patch, post};
use axum::{Json, Router};
use serde::Deserialize;
use uuid::Uuid;

use crate::models::{
    AppState, KycStatus, NewNotification, NotificationKind, SetRateRequest, TicketStatus,
};
use crate::{AppError, Result};

pub fn init() -> Router<AppState> {
    Router::new()
        .route("/campaigns/{id}/approve", patch(approve_campaign))
        .route("/campaigns/{id}/reject", patch(reject_campaign))
        .route("/kyc/{user_id}", patch(review_kyc))
        .route("/rates", post(set_rate).get(rate_history))
        .route("/tickets/{id}/status", patch(set_ticket_status))
}

async fn approve_campaign(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse> {
    let campaign = state
        .campaigns
        .approve(id)
        .await?
        .ok_or(AppError::not_found("Pending campaign"))?;
    super::notify(
        &state,
        NewNotification {
            user_id: campaign.creator_id,
            title: "Campaign approved".to_string(),
            body: format!("\"{}\" is now live and accepting contributions", campaign.title),
            kind: NotificationKind::Campaign,
        },
    )
    .await;
    Ok(Json(campaign))
}

#[derive(Deserialize)]
pub struct RejectRequest {
    reason: Option<String>,
}

async fn reject_campaign(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(request): Json<RejectRequest>,
) -> Result<impl IntoResponse> {
    let campaign = state
        .campaigns
        .reject(id, request.reason.clone())
        .await?
        .ok_or(AppError::not_found("Pending campaign"))?;
    let body = match request.reason {
        Some(reason) => format!("\"{}\" was not approved: {reason}", campaign.title),
        None => format!("\"{}\" was not approved", campaign.title),
    };
    super::notify(
        &state,
        NewNotification {
            user_id: campaign.creator_id,
            title: "Campaign rejected".to_string(),
            body,
            kind: NotificationKind::Campaign,
        },
    )
    .await;
    Ok(Json(campaign))
}

#[derive(Deserialize)]
pub struct KycDecision {
    approved: bool,
}

async fn review_kyc(
    State(state): State<AppState>,
    Path(user_id): Path<Uuid>,
    Json(decision): Json<KycDecision>,
) -> Result<impl IntoResponse> {
    let status = if decision.approved {
        KycStatus::Verified
    } else {
        KycStatus::Rejected
    };
    let user = state
        .users
        .set_kyc_status(user_id, status)
        .await?
        .ok_or(AppError::not_found("User"))?;
    let (title, body) = if decision.approved {
        (
            "KYC verified",
            "Your identity has been verified. Withdrawals are now available.",
        )
    } else {
        ("KYC rejected", "Your identity documents could not be verified.")
    };
    super::notify(
        &state,
        NewNotification {
            user_id: user.id,
            title: title.to_string(),
            body: body.to_string(),
            kind: NotificationKind::Kyc,
        },
    )
    .await;
    Ok(Json(user))
}

async fn set_rate(
    State(state): State<AppState>,
    Json(request): Json<SetRateRequest>,
) -> Result<impl IntoResponse> {
    let rate = state.conversions.set_rate(&request).await?;
    Ok((StatusCode::CREATED, Json(rate)))
}

#[derive(Deserialize)]
pub struct HistoryQuery {
    from: String,
    to: String,
    limit: Option<i64>,
}

async fn rate_history(
    State(state): State<AppState>,
    Query(query): Query<HistoryQuery>,
) -> Result<impl IntoResponse> {
    let rates = state
        .conversions
        .history(&query.from, &query.to, query.limit.unwrap_or(20))
        .await?;
    Ok(Json(rates))
}

#[derive(Deserialize)]
pub struct TicketStatusRequest {
    status: String,
}

async fn set_ticket_status(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(request): Json<TicketStatusRequest>,
) -> Result<impl IntoResponse> {
    let status: TicketStatus = request.status.parse()?;
    let ticket = state
        .tickets
        .set_status(id, status)
        .await?
        .ok_or(AppError::not_found("Ticket"))?;
    super::notify(
        &state,
        NewNotification {
            user_id: ticket.user_id,
            title: "Ticket updated".to_string(),
            body: format!("\"{}\" is now {}", ticket.subject, ticket.status),
            kind: NotificationKind::Ticket,
        },
    )
    .await;
    Ok(Json(ticket))
}
