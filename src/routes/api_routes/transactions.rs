use axum::extract::{Path, Query, State};
use axum::response::IntoResponse;
use axum::Json;
use serde::Deserialize;
use uuid::Uuid;

use crate::models::AppState;
use crate::{AppError, Result};

#[derive(Deserialize)]
pub struct LedgerQuery {
    user_id: Uuid,
}

pub async fn list(
    State(state): State<AppState>,
    Query(query): Query<LedgerQuery>,
) -> Result<impl IntoResponse> {
    let transactions = state.transactions.list_by_user(query.user_id).await?;
    Ok(Json(transactions))
}

pub async fn get(State(state): State<AppState>, Path(id): Path<Uuid>) -> Result<impl IntoResponse> {
    let transaction = state
        .transactions
        .get(id)
        .await?
        .ok_or(AppError::not_found("Transaction"))?;
    Ok(Json(transaction))
}
