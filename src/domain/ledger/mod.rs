//! Ledger domain - users, accounts, payments and the webhooks that credit them.
//!
//! # Components
//!
//! - `Account` / `Payment` / `User` - Ledger entities and their store descriptors
//! - `WebhookPayload` / `PaymentWebhook` - Raw and typed webhook bodies
//! - `PaymentWebhookVerifier` - Shared-secret SHA-256 signature verification
//! - `WebhookError` - Error types with HTTP status mapping

mod account;
mod payment;
mod user;
mod webhook_errors;
mod webhook_payload;
mod webhook_verifier;

pub use account::{Account, AccountChanges, AccountFilter, NewAccount};
pub use payment::{NewPayment, Payment, PaymentFilter};
pub use user::{NewUser, User, UserChanges, UserFilter};
pub use webhook_errors::WebhookError;
pub use webhook_payload::{PaymentWebhook, WebhookPayload, SIGNATURE_FIELD};
pub use webhook_verifier::{canonical_string, PaymentWebhookVerifier};
