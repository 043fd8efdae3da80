//! HTTP adapter for payment webhooks.
//!
//! - `POST /webhooks/payment` - Credit an account from a signed payment webhook
//! - `GET /` and `GET /health` - Liveness

pub mod dto;
pub mod handlers;
pub mod routes;

pub use dto::{ErrorResponse, StatusResponse};
pub use handlers::{WebhookApiError, WebhookAppState};
pub use routes::{health_routes, ledger_router, webhook_routes};
