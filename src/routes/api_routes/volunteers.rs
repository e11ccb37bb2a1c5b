use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::Json;
use serde::Deserialize;
use uuid::Uuid;

use crate::models::{AppState, ApplicationStatus, NewApplication, NewOpportunity};
use crate::{AppError, Result};

pub async fn create_opportunity(
    State(state): State<AppState>,
    Json(new): Json<NewOpportunity>,
) -> Result<impl IntoResponse> {
    if new.slots <= 0 {
        return Err(AppError::validation("Slots must be greater than 0"));
    }
    if new.ends_at <= new.starts_at {
        return Err(AppError::validation("End time must be after start time"));
    }
    let opportunity = state.volunteers.create_opportunity(new).await?;
    Ok((StatusCode::CREATED, Json(opportunity)))
}

#[derive(Deserialize)]
pub struct OpportunityQuery {
    campaign_id: Option<Uuid>,
}

pub async fn list_opportunities(
    State(state): State<AppState>,
    Query(query): Query<OpportunityQuery>,
) -> Result<impl IntoResponse> {
    let opportunities = state.volunteers.list_open(query.campaign_id).await?;
    Ok(Json(opportunities))
}

pub async fn apply(
    State(state): State<AppState>,
    Json(new): Json<NewApplication>,
) -> Result<impl IntoResponse> {
    let application = state.volunteers.apply(new).await?;
    Ok((StatusCode::CREATED, Json(application)))
}

#[derive(Deserialize)]
pub struct ApplicationQuery {
    opportunity_id: Uuid,
}

pub async fn list_applications(
    State(state): State<AppState>,
    Query(query): Query<ApplicationQuery>,
) -> Result<impl IntoResponse> {
    let applications = state
        .volunteers
        .list_applications(query.opportunity_id)
        .await?;
    Ok(Json(applications))
}

#[derive(Deserialize)]
pub struct DecisionRequest {
    status: String,
}

pub async fn decide(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(request): Json<DecisionRequest>,
) -> Result<impl IntoResponse> {
    let status: ApplicationStatus = request.status.parse()?;
    if status == ApplicationStatus::Pending {
        return Err(AppError::validation(
            "Decision must be accepted or rejected",
        ));
    }
    let application = state
        .volunteers
        .decide(id, status)
        .await?
        .ok_or(AppError::not_found("Pending application"))?;
    Ok(Json(application))
}
