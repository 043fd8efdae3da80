//! Payment entity. Append-only record of a credited webhook.

use serde::Serialize;

use crate::domain::foundation::{AccountId, Money, PaymentId, Timestamp, TransactionId};

/// A credited payment. Immutable once recorded.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Payment {
    pub id: PaymentId,
    pub transaction_id: TransactionId,
    pub amount: Money,
    pub account_id: AccountId,
    pub created_at: Timestamp,
}

/// Fields for recording a payment. Id and creation time come from the store.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewPayment {
    pub transaction_id: TransactionId,
    pub amount: Money,
    pub account_id: AccountId,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PaymentFilter {
    pub transaction_id: Option<TransactionId>,
    pub account_id: Option<AccountId>,
}

impl PaymentFilter {
    pub fn by_transaction(transaction_id: TransactionId) -> Self {
        Self {
            transaction_id: Some(transaction_id),
            ..Default::default()
        }
    }

    pub fn by_account(account_id: AccountId) -> Self {
        Self {
            account_id: Some(account_id),
            ..Default::default()
        }
    }

    pub fn matches(&self, payment: &Payment) -> bool {
        self.transaction_id
            .as_ref()
            .map_or(true, |tx| &payment.transaction_id == tx)
            && self.account_id.map_or(true, |id| payment.account_id == id)
    }
}
