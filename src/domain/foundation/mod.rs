//! Foundation module - Shared domain primitives.
//!
//! Contains value objects, identifiers, and error types
//! that form the vocabulary of the ledger domain.

mod errors;
mod ids;
mod money;
mod timestamp;

pub use errors::{DomainError, ErrorCode, ValidationError};
pub use ids::{AccountId, PaymentId, TransactionId, UserId};
pub use money::{Money, MoneyError, MONEY_SCALE};
pub use timestamp::Timestamp;
