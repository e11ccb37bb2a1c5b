use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::Json;
use serde::Deserialize;
use uuid::Uuid;

use crate::models::{AppState, NewReply, NewTicket};
use crate::{AppError, Result};

pub async fn create(
    State(state): State<AppState>,
    Json(new): Json<NewTicket>,
) -> Result<impl IntoResponse> {
    if new.subject.trim().is_empty() {
        return Err(AppError::validation("Subject is required"));
    }
    if new.body.trim().is_empty() {
        return Err(AppError::validation("Ticket body is required"));
    }
    let ticket = state.tickets.create(new).await?;
    Ok((StatusCode::CREATED, Json(ticket)))
}

#[derive(Deserialize)]
pub struct ListQuery {
    user_id: Option<Uuid>,
}

pub async fn list(
    State(state): State<AppState>,
    Query(query): Query<ListQuery>,
) -> Result<impl IntoResponse> {
    let tickets = state.tickets.list(query.user_id).await?;
    Ok(Json(tickets))
}

pub async fn get(State(state): State<AppState>, Path(id): Path<Uuid>) -> Result<impl IntoResponse> {
    let ticket = state
        .tickets
        .get_with_replies(id)
        .await?
        .ok_or(AppError::not_found("Ticket"))?;
    Ok(Json(ticket))
}

pub async fn reply(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(new): Json<NewReply>,
) -> Result<impl IntoResponse> {
    if new.body.trim().is_empty() {
        return Err(AppError::validation("Reply body is required"));
    }
    let reply = state.tickets.add_reply(id, new).await?;
    Ok((StatusCode::CREATED, Json(reply)))
}
