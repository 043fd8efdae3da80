//! HandlePaymentWebhookHandler - Command handler for crediting accounts from payment webhooks.
//!
//! Processing is idempotent per `transaction_id` and atomic: the idempotency
//! check, account creation, balance credit and payment insert share one
//! ledger transaction.

use std::sync::Arc;

use tracing::{debug, info, warn};

use crate::domain::foundation::{AccountId, Money, PaymentId, TransactionId};
use crate::domain::ledger::{
    Account, AccountFilter, NewAccount, NewPayment, PaymentFilter, PaymentWebhook,
    PaymentWebhookVerifier, UserFilter, WebhookError, WebhookPayload,
};
use crate::ports::{LedgerStore, LedgerTransaction};

/// Command to handle a payment webhook.
#[derive(Debug, Clone)]
pub struct HandlePaymentWebhookCommand {
    /// Raw webhook body, signature included.
    pub payload: Vec<u8>,
}

/// Result of webhook processing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HandlePaymentWebhookResult {
    /// Balance credited and payment recorded.
    Credited {
        account_id: AccountId,
        payment_id: PaymentId,
        balance: Money,
        account_created: bool,
    },
    /// A payment for this transaction already exists. Nothing changed.
    AlreadyProcessed { transaction_id: TransactionId },
}

/// Handler for processing payment provider webhooks.
pub struct HandlePaymentWebhookHandler {
    store: Arc<dyn LedgerStore>,
    verifier: Arc<PaymentWebhookVerifier>,
}

impl HandlePaymentWebhookHandler {
    pub fn new(store: Arc<dyn LedgerStore>, verifier: Arc<PaymentWebhookVerifier>) -> Self {
        Self { store, verifier }
    }

    pub async fn handle(
        &self,
        cmd: HandlePaymentWebhookCommand,
    ) -> Result<HandlePaymentWebhookResult, WebhookError> {
        // 1. Parse body and verify signature before touching the store
        let payload = WebhookPayload::from_slice(&cmd.payload)?;
        let webhook = match self.verifier.verify_and_parse(&payload) {
            Err(WebhookError::InvalidSignature) => {
                warn!(
                    transaction_id = ?payload.get("transaction_id"),
                    "Rejected payment webhook with invalid signature"
                );
                return Err(WebhookError::InvalidSignature);
            }
            result => result?,
        };

        // 2. Apply inside a single transaction
        self.process(webhook).await
    }

    async fn process(
        &self,
        webhook: PaymentWebhook,
    ) -> Result<HandlePaymentWebhookResult, WebhookError> {
        let mut tx = self.store.begin().await?;

        // Idempotency check
        let existing = tx
            .payments()
            .find_one(&PaymentFilter::by_transaction(webhook.transaction_id.clone()))
            .await?;
        if existing.is_some() {
            tx.rollback().await?;
            debug!(
                transaction_id = %webhook.transaction_id,
                "Duplicate payment webhook ignored"
            );
            return Ok(already_processed(webhook));
        }

        let (account, account_created) = resolve_account(tx.as_mut(), &webhook).await?;

        let balance = tx.credit_balance(account.id, webhook.amount).await?;

        let payment = match tx
            .payments()
            .create(NewPayment {
                transaction_id: webhook.transaction_id.clone(),
                amount: webhook.amount,
                account_id: account.id,
            })
            .await
        {
            Ok(payment) => payment,
            Err(e) if e.is_conflict() => {
                // Lost a race with a concurrent delivery of the same transaction
                tx.rollback().await?;
                debug!(
                    transaction_id = %webhook.transaction_id,
                    "Concurrent duplicate payment webhook ignored"
                );
                return Ok(already_processed(webhook));
            }
            Err(e) => return Err(e.into()),
        };

        tx.commit().await?;

        info!(
            transaction_id = %webhook.transaction_id,
            account_id = %account.id,
            amount = %webhook.amount,
            balance = %balance,
            "Payment credited"
        );

        Ok(HandlePaymentWebhookResult::Credited {
            account_id: account.id,
            payment_id: payment.id,
            balance,
            account_created,
        })
    }
}

/// Finds the user's account, creating it with the provider's id if absent.
///
/// Returns the account and whether it was created by this call.
async fn resolve_account(
    tx: &mut dyn LedgerTransaction,
    webhook: &PaymentWebhook,
) -> Result<(Account, bool), WebhookError> {
    let owned = AccountFilter::by_id(webhook.account_id).owned_by(webhook.user_id);
    if let Some(account) = tx.accounts().find_one(&owned).await? {
        return Ok((account, false));
    }

    let mismatch = || {
        warn!(
            account_id = %webhook.account_id,
            user_id = %webhook.user_id,
            "Payment webhook names an account owned by another user"
        );
        WebhookError::AccountOwnershipMismatch {
            account_id: webhook.account_id,
            user_id: webhook.user_id,
        }
    };

    if tx
        .accounts()
        .find_one(&AccountFilter::by_id(webhook.account_id))
        .await?
        .is_some()
    {
        return Err(mismatch());
    }

    if tx
        .users()
        .find_one(&UserFilter::by_id(webhook.user_id))
        .await?
        .is_none()
    {
        return Err(WebhookError::UserNotFound(webhook.user_id));
    }

    match tx
        .create_account_if_absent(NewAccount::with_id(webhook.account_id, webhook.user_id))
        .await?
    {
        Some(account) => {
            info!(
                account_id = %account.id,
                user_id = %account.user_id,
                "Created account for payment webhook"
            );
            Ok((account, true))
        }
        // Created concurrently; usable only if it went to the same user
        None => tx
            .accounts()
            .find_one(&owned)
            .await?
            .map(|account| (account, false))
            .ok_or_else(mismatch),
    }
}

fn already_processed(webhook: PaymentWebhook) -> HandlePaymentWebhookResult {
    HandlePaymentWebhookResult::AlreadyProcessed {
        transaction_id: webhook.transaction_id,
    }
}
