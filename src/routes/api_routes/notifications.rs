use axum::extract::{Path, Query, State};
use axum::response::IntoResponse;
use axum::Json;
use serde::Deserialize;
use uuid::Uuid;

use crate::models::AppState;
use crate::{AppError, Result};

#[derive(Deserialize)]
pub struct ListQuery {
    user_id: Uuid,
    #[serde(default)]
    unread_only: bool,
}

pub async fn list(
    State(state): State<AppState>,
    Query(query): Query<ListQuery>,
) -> Result<impl IntoResponse> {
    let notifications = state
        .notifications
        .list(query.user_id, query.unread_only)
        .await?;
    Ok(Json(notifications))
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OwnerRequest {
    user_id: Uuid,
}

pub async fn mark_read(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(request): Json<OwnerRequest>,
) -> Result<impl IntoResponse> {
    let notification = state
        .notifications
        .mark_read(id, request.user_id)
        .await?
        .ok_or(AppError::not_found("Notification"))?;
    Ok(Json(notification))
}

pub async fn mark_all_read(
    State(state): State<AppState>,
    Json(request): Json<OwnerRequest>,
) -> Result<impl IntoResponse> {
    let updated = state.notifications.mark_all_read(request.user_id).await?;
    Ok(Json(serde_json::json!({ "updated": updated })))
}
