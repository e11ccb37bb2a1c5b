use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::Json;
use uuid::Uuid;

use crate::models::{AppState, NewUser};
use crate::{AppError, Result};

pub async fn create(
    State(state): State<AppState>,
    Json(new): Json<NewUser>,
) -> Result<impl IntoResponse> {
    if !new.email.contains('@') {
        return Err(AppError::validation("A valid email is required"));
    }
    if new.display_name.trim().is_empty() {
        return Err(AppError::validation("Display name is required"));
    }
    let user = state.users.create(new).await?;
    Ok((StatusCode::CREATED, Json(user)))
}

pub async fn get(State(state): State<AppState>, Path(id): Path<Uuid>) -> Result<impl IntoResponse> {
    let user = state
        .users
        .get(id)
        .await?
        .ok_or(AppError::not_found("User"))?;
    Ok(Json(user))
}

pub async fn submit_kyc(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse> {
    let user = state.users.submit_kyc(id).await?;
    Ok(Json(user))
}

pub async fn credit_score(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse> {
    state
        .users
        .get(id)
        .await?
        .ok_or(AppError::not_found("User"))?;
    let score = state.credit.get(id).await?;
    Ok(Json(score))
}
