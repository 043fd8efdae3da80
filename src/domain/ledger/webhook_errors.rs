//! Webhook error types for payment webhook handling.
//!
//! Defines all error conditions that can occur during webhook processing,
//! with HTTP status code mapping and retryability semantics.

use axum::http::StatusCode;
use thiserror::Error;

use crate::domain::foundation::{AccountId, DomainError, UserId};

/// Errors that occur during webhook processing.
///
/// A duplicate delivery is not an error; it resolves to
/// `HandlePaymentWebhookResult::AlreadyProcessed`.
#[derive(Debug, Error)]
pub enum WebhookError {
    /// Body is empty, not JSON, not a flat object, or has an invalid field.
    #[error("Malformed payload: {0}")]
    MalformedPayload(String),

    /// Required field missing from webhook payload.
    #[error("Missing field: {0}")]
    MissingField(&'static str),

    /// Signature does not match the canonical digest.
    #[error("Invalid signature")]
    InvalidSignature,

    /// The account id exists but belongs to a different user.
    #[error("Account {account_id} is not owned by user {user_id}")]
    AccountOwnershipMismatch {
        account_id: AccountId,
        user_id: UserId,
    },

    /// The user named by the webhook does not exist (yet).
    #[error("User {0} not found")]
    UserNotFound(UserId),

    /// Ledger store operation failed. The transaction was rolled back.
    #[error("Store error: {0}")]
    Store(DomainError),
}

impl WebhookError {
    /// Returns true if the provider should retry delivering this webhook.
    ///
    /// Retryable errors indicate temporary failures that may succeed
    /// on subsequent attempts (database issues, user replication lag).
    pub fn is_retryable(&self) -> bool {
        matches!(
            self,
            WebhookError::Store(_) | WebhookError::UserNotFound(_)
        )
    }

    /// Maps the error to an appropriate HTTP status code.
    ///
    /// - 4xx: Client error, no retry
    /// - 5xx: Server error, will retry
    pub fn status_code(&self) -> StatusCode {
        match self {
            WebhookError::MalformedPayload(_)
            | WebhookError::MissingField(_)
            | WebhookError::InvalidSignature
            | WebhookError::AccountOwnershipMismatch { .. } => StatusCode::BAD_REQUEST,

            WebhookError::UserNotFound(_) | WebhookError::Store(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }

    /// Stable machine-readable code for API responses.
    pub fn error_code(&self) -> &'static str {
        match self {
            WebhookError::MalformedPayload(_) | WebhookError::MissingField(_) => {
                "MALFORMED_PAYLOAD"
            }
            WebhookError::InvalidSignature => "INVALID_SIGNATURE",
            WebhookError::AccountOwnershipMismatch { .. } => "ACCOUNT_OWNERSHIP_MISMATCH",
            WebhookError::UserNotFound(_) | WebhookError::Store(_) => "PROCESSING_FAILED",
        }
    }

    pub fn malformed(reason: impl Into<String>) -> Self {
        WebhookError::MalformedPayload(reason.into())
    }
}

impl From<DomainError> for WebhookError {
    fn from(err: DomainError) -> Self {
        WebhookError::Store(err)
    }
}
