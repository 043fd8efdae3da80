//! Axum router configuration for webhook and liveness endpoints.

use axum::{
    routing::{get, post},
    Router,
};

use super::handlers::{handle_payment_webhook, health, WebhookAppState};

/// Create the payment webhook router.
///
/// # Routes
/// - `POST /payment` - Credit an account from a signed payment webhook
pub fn webhook_routes() -> Router<WebhookAppState> {
    Router::new().route("/payment", post(handle_payment_webhook))
}

/// Liveness routes.
///
/// # Routes
/// - `GET /` - Liveness
/// - `GET /health` - Liveness
pub fn health_routes() -> Router<WebhookAppState> {
    Router::new()
        .route("/", get(health))
        .route("/health", get(health))
}

/// Create the complete ledger API router, mounting webhooks under `/webhooks`.
///
/// # Example
///
/// ```ignore
/// let app = ledger_router().with_state(WebhookAppState::new(store, verifier));
/// ```
pub fn ledger_router() -> Router<WebhookAppState> {
    Router::new()
        .merge(health_routes())
        .nest("/webhooks", webhook_routes())
}
