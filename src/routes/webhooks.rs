use axum::body::Bytes;
use axum::extract::State;
use axum::http::{HeaderMap, StatusCode};
use axum::routing::post;
use axum::Router;

use crate::models::{AppState, NewNotification, NotificationKind, WebhookRequest};
use crate::payments::verify_webhook_signature;

pub fn init(state: AppState) -> Router {
    Router::new()
        .route("/paymongo", post(paymongo_webhook))
        .with_state(state)
}

/// Signature check runs against the raw bytes before any parsing. The
/// provider retries on non-2xx, so unknown events and already-settled
/// deposits are acknowledged rather than errored.
async fn paymongo_webhook(
    State(state): State<AppState>,
    headers: HeaderMap,
    body: Bytes,
) -> StatusCode {
    let signature = headers
        .get("Paymongo-Signature")
        .and_then(|value| value.to_str().ok())
        .unwrap_or_default();
    if !verify_webhook_signature(&body, signature, &state.webhook_secret) {
        tracing::warn!("rejected webhook with a bad signature");
        return StatusCode::UNAUTHORIZED;
    }
    let event = match serde_json::from_slice::<WebhookRequest>(&body) {
        Ok(event) => event,
        Err(err) => {
            tracing::error!("could not parse webhook payload: {err}");
            return StatusCode::BAD_REQUEST;
        }
    };
    match event.event_type() {
        "payment.paid" | "payment_intent.succeeded" => {
            settle(&state, event.intent_ref(), true).await
        }
        "payment.failed" | "payment_intent.payment_failed" => {
            settle(&state, event.intent_ref(), false).await
        }
        other => {
            tracing::debug!("ignoring webhook event {other}");
            StatusCode::OK
        }
    }
}

async fn settle(state: &AppState, provider_ref: Option<&str>, paid: bool) -> StatusCode {
    let Some(provider_ref) = provider_ref else {
        tracing::error!("payment webhook carried no intent reference");
        return StatusCode::OK;
    };
    match state.transactions.settle_deposit(provider_ref, paid).await {
        Ok(Some(transaction)) => {
            if paid {
                super::api_routes::notify(
                    state,
                    NewNotification {
                        user_id: transaction.user_id,
                        title: "Deposit received".to_string(),
                        body: format!("₱{} has been added to your wallet", transaction.amount),
                        kind: NotificationKind::Payment,
                    },
                )
                .await;
            }
            StatusCode::OK
        }
        Ok(None) => {
            tracing::debug!("webhook for unknown or settled deposit {provider_ref}");
            StatusCode::OK
        }
        Err(err) => {
            tracing::error!("failed to settle deposit {provider_ref}: {err:?}");
            StatusCode::INTERNAL_SERVER_ERROR
        }
    }
}
