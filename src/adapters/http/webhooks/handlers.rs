//! HTTP handlers for payment webhooks and liveness.
//!
//! The webhook endpoint takes the raw body so the signature is checked
//! against exactly the fields the provider sent.

use std::sync::Arc;

use axum::{body::Bytes, extract::State, http::StatusCode, response::IntoResponse, Json};

use super::dto::{ErrorResponse, StatusResponse};
use crate::application::handlers::payment::{
    HandlePaymentWebhookCommand, HandlePaymentWebhookHandler, HandlePaymentWebhookResult,
};
use crate::domain::ledger::{PaymentWebhookVerifier, WebhookError};
use crate::ports::LedgerStore;

// ════════════════════════════════════════════════════════════════════════════════
// Application State
// ════════════════════════════════════════════════════════════════════════════════

/// Shared application state containing all dependencies.
#[derive(Clone)]
pub struct WebhookAppState {
    pub store: Arc<dyn LedgerStore>,
    pub verifier: Arc<PaymentWebhookVerifier>,
}

impl WebhookAppState {
    pub fn new(store: Arc<dyn LedgerStore>, verifier: PaymentWebhookVerifier) -> Self {
        Self {
            store,
            verifier: Arc::new(verifier),
        }
    }

    pub fn webhook_handler(&self) -> HandlePaymentWebhookHandler {
        HandlePaymentWebhookHandler::new(self.store.clone(), self.verifier.clone())
    }
}

// ════════════════════════════════════════════════════════════════════════════════
// Handlers
// ════════════════════════════════════════════════════════════════════════════════

/// POST /webhooks/payment - Credit an account from a signed payment webhook
pub async fn handle_payment_webhook(
    State(state): State<WebhookAppState>,
    body: Bytes,
) -> Result<impl IntoResponse, WebhookApiError> {
    let handler = state.webhook_handler();
    let cmd = HandlePaymentWebhookCommand {
        payload: body.to_vec(),
    };

    match handler.handle(cmd).await? {
        HandlePaymentWebhookResult::Credited { .. } => {}
        HandlePaymentWebhookResult::AlreadyProcessed { transaction_id } => {
            tracing::debug!(transaction_id = %transaction_id, "Duplicate payment webhook acknowledged");
        }
    }

    Ok(Json(StatusResponse::ok()))
}

/// GET / and GET /health - Liveness check
pub async fn health() -> Json<StatusResponse> {
    Json(StatusResponse::ok())
}

// ════════════════════════════════════════════════════════════════════════════════
// Error Handling
// ════════════════════════════════════════════════════════════════════════════════

/// API error type that converts webhook errors to HTTP responses.
#[derive(Debug)]
pub struct WebhookApiError(WebhookError);

impl From<WebhookError> for WebhookApiError {
    fn from(err: WebhookError) -> Self {
        Self(err)
    }
}

impl IntoResponse for WebhookApiError {
    fn into_response(self) -> axum::response::Response {
        let status: StatusCode = self.0.status_code();
        let error_code = self.0.error_code();

        let body = match &self.0 {
            WebhookError::Store(err) => {
                tracing::error!(error = %err, retryable = true, "Payment webhook processing failed");
                ErrorResponse::new(error_code, "Webhook processing failed")
            }
            WebhookError::UserNotFound(user_id) => {
                tracing::error!(user_id = %user_id, retryable = true, "Payment webhook names unknown user");
                ErrorResponse::new(error_code, self.0.to_string())
            }
            WebhookError::MissingField(field) => ErrorResponse::with_details(
                error_code,
                self.0.to_string(),
                serde_json::json!({ "field": field }),
            ),
            _ => ErrorResponse::new(error_code, self.0.to_string()),
        };

        (status, Json(body)).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::foundation::{AccountId, DomainError, ErrorCode, UserId};
    use axum::body::to_bytes;
    use serde_json::{json, Value};

    async fn render(err: WebhookError) -> (StatusCode, Value) {
        let response = WebhookApiError::from(err).into_response();
        let status = response.status();
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        (status, serde_json::from_slice(&bytes).unwrap())
    }

    #[tokio::test]
    async fn invalid_signature_renders_bad_request() {
        let (status, body) = render(WebhookError::InvalidSignature).await;

        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(
            body,
            json!({"error_code": "INVALID_SIGNATURE", "message": "Invalid signature"})
        );
    }

    #[tokio::test]
    async fn missing_field_names_the_field() {
        let (status, body) = render(WebhookError::MissingField("signature")).await;

        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["error_code"], "MALFORMED_PAYLOAD");
        assert_eq!(body["details"]["field"], "signature");
    }

    #[tokio::test]
    async fn ownership_mismatch_renders_bad_request() {
        let (status, body) = render(WebhookError::AccountOwnershipMismatch {
            account_id: AccountId::new(5),
            user_id: UserId::new(2),
        })
        .await;

        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["error_code"], "ACCOUNT_OWNERSHIP_MISMATCH");
    }

    #[tokio::test]
    async fn store_error_hides_database_detail() {
        let (status, body) = render(WebhookError::Store(DomainError::new(
            ErrorCode::DatabaseError,
            "relation \"payments\" does not exist",
        )))
        .await;

        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(body["error_code"], "PROCESSING_FAILED");
        assert!(!body["message"].as_str().unwrap().contains("relation"));
    }

    #[tokio::test]
    async fn unknown_user_renders_server_error() {
        let (status, body) = render(WebhookError::UserNotFound(UserId::new(9))).await;

        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(body["error_code"], "PROCESSING_FAILED");
    }
}
