use axum::routing::{get, patch, post};
use axum::Router;

use crate::models::{AppState, NewNotification};

mod admin;
mod campaigns;
mod contributions;
mod conversions;
mod notifications;
mod payments;
mod tickets;
mod transactions;
mod users;
mod volunteers;

pub fn init(state: AppState) -> Router {
    Router::new()
        .route("/campaigns", post(campaigns::create).get(campaigns::list))
        .route("/campaigns/{id}", get(campaigns::get))
        .route(
            "/campaigns/{id}/contributions",
            get(campaigns::contributions),
        )
        .route(
            "/campaigns/{id}/reports",
            get(campaigns::reports).post(campaigns::create_report),
        )
        .route("/campaigns/{id}/close", post(campaigns::close))
        .route(
            "/contributions",
            post(contributions::create).get(contributions::list),
        )
        .route("/tips", post(contributions::tip))
        .route("/conversions/quote", post(conversions::quote))
        .route("/conversions/create", post(conversions::create))
        .route("/deposits/create", post(payments::create_deposit))
        .route("/withdrawals/create", post(payments::create_withdrawal))
        .route("/transactions", get(transactions::list))
        .route("/transactions/{id}", get(transactions::get))
        .route("/users", post(users::create))
        .route("/users/{id}", get(users::get))
        .route("/users/{id}/kyc/submit", post(users::submit_kyc))
        .route("/users/{id}/credit-score", get(users::credit_score))
        .route(
            "/volunteers/opportunities",
            post(volunteers::create_opportunity).get(volunteers::list_opportunities),
        )
        .route(
            "/volunteers/applications",
            post(volunteers::apply).get(volunteers::list_applications),
        )
        .route("/volunteers/applications/{id}", patch(volunteers::decide))
        .route("/tickets", post(tickets::create).get(tickets::list))
        .route("/tickets/{id}", get(tickets::get))
        .route("/tickets/{id}/replies", post(tickets::reply))
        .route("/notifications", get(notifications::list))
        .route("/notifications/{id}/read", patch(notifications::mark_read))
        .route("/notifications/read-all", post(notifications::mark_all_read))
        .nest("/admin", admin::init())
        .with_state(state)
}

/// Post-commit fan-out. A notification that fails to store must never fail
/// the request that triggered it.
pub(crate) async fn notify(state: &AppState, note: NewNotification) {
    if let Err(err) = state.notifications.create(note).await {
        tracing::error!("failed to store notification: {err:?}");
    }
}
