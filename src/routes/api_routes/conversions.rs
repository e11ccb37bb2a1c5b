use axum::extract::State;
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::Json;

use crate::models::{AppState, ConvertRequest, QuoteRequest};
use crate::Result;

pub async fn quote(
    State(state): State<AppState>,
    Json(request): Json<QuoteRequest>,
) -> Result<impl IntoResponse> {
    let quote = state.conversions.quote(&request).await?;
    Ok(Json(quote))
}

/// Quotes at the current rate, then moves the balances at exactly that
/// quote. The response carries both the ledger row and the quote it
/// executed at.
pub async fn create(
    State(state): State<AppState>,
    Json(request): Json<ConvertRequest>,
) -> Result<impl IntoResponse> {
    let quote = state
        .conversions
        .quote(&QuoteRequest {
            from_amount: request.from_amount,
            from_currency: request.from_currency,
            to_currency: request.to_currency,
        })
        .await?;
    let transaction = state
        .transactions
        .execute_conversion(request.user_id, &quote)
        .await?;
    Ok((
        StatusCode::CREATED,
        Json(serde_json::json!({ "transaction": transaction, "quote": quote })),
    ))
}
