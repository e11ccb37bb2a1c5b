use axum::extract::State;
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::Json;
use rust_decimal::prelude::ToPrimitive;
use rust_decimal::{Decimal, RoundingStrategy};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::models::AppState;
use crate::{AppError, Result};

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DepositRequest {
    user_id: Uuid,
    amount: Decimal,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DepositResponse {
    transaction_id: Uuid,
    intent_id: String,
    client_key: Option<String>,
    status: String,
}

/// Opens a deposit: a provider payment intent plus a pending ledger row
/// keyed by the intent id. The balance is only credited when the provider's
/// webhook confirms payment.
pub async fn create_deposit(
    State(state): State<AppState>,
    Json(request): Json<DepositRequest>,
) -> Result<impl IntoResponse> {
    if request.amount <= Decimal::ZERO {
        return Err(AppError::validation("Amount must be greater than 0"));
    }
    let user = state
        .users
        .get(request.user_id)
        .await?
        .ok_or(AppError::not_found("User"))?;
    let centavos = to_centavos(request.amount)?;
    let intent = state
        .payments
        .create_payment_intent(
            centavos,
            "PHP",
            "VeriFund wallet deposit",
            serde_json::json!({ "userId": user.id }),
        )
        .await?;
    let transaction = state
        .transactions
        .create_pending_deposit(user.id, request.amount, &intent.id)
        .await?;
    Ok((
        StatusCode::CREATED,
        Json(DepositResponse {
            transaction_id: transaction.id,
            intent_id: intent.id,
            client_key: intent.client_key,
            status: intent.status,
        }),
    ))
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WithdrawalRequest {
    user_id: Uuid,
    amount: Decimal,
    destination: String,
}

/// Withdrawals debit the wallet up front, then ask the provider for a
/// payout. A rejected payout refunds the debit and surfaces the provider's
/// reason.
pub async fn create_withdrawal(
    State(state): State<AppState>,
    Json(request): Json<WithdrawalRequest>,
) -> Result<impl IntoResponse> {
    if request.amount <= Decimal::ZERO {
        return Err(AppError::validation("Amount must be greater than 0"));
    }
    if request.destination.trim().is_empty() {
        return Err(AppError::validation("A payout destination is required"));
    }
    let centavos = to_centavos(request.amount)?;
    let transaction = state
        .transactions
        .create_pending_withdrawal(request.user_id, request.amount)
        .await?;
    match state
        .payments
        .create_payout(
            centavos,
            "PHP",
            request.destination.trim(),
            "VeriFund wallet withdrawal",
        )
        .await
    {
        Ok(payout) => {
            let settled = state
                .transactions
                .complete_withdrawal(transaction.id, &payout.id)
                .await?
                .unwrap_or(transaction);
            Ok((StatusCode::CREATED, Json(settled)))
        }
        Err(err) => {
            tracing::warn!("payout rejected, refunding withdrawal: {err}");
            state.transactions.fail_withdrawal(transaction.id).await?;
            Err(err.into())
        }
    }
}

/// The provider counts in centavos; our ledger rows are decimal pesos.
fn to_centavos(amount: Decimal) -> Result<i64> {
    (amount * Decimal::ONE_HUNDRED)
        .round_dp_with_strategy(0, RoundingStrategy::MidpointAwayFromZero)
        .to_i64()
        .ok_or_else(|| AppError::validation("Amount is out of range"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn centavos_conversion_rounds_to_minor_units() {
        assert_eq!(to_centavos(dec!(1500)).unwrap(), 150000);
        assert_eq!(to_centavos(dec!(10.55)).unwrap(), 1055);
        assert_eq!(to_centavos(dec!(0.005)).unwrap(), 1);
    }
}
