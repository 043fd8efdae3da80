//! LedgerStore port - Transactional storage for users, accounts and payments.
//!
//! Every operation runs inside a caller-owned `LedgerTransaction`. The store
//! never opens or commits a transaction on its own, so a webhook's
//! idempotency check, account creation, credit and payment insert either all
//! persist or none do.
//!
//! ## Uniqueness
//!
//! - `payments.transaction_id` is unique. A duplicate insert fails with
//!   `ErrorCode::Conflict`; callers treat it as an already-processed delivery.
//! - `accounts.id` may be chosen by the caller. `create_account_if_absent`
//!   reports an existing id as `Ok(None)` without poisoning the transaction.

use std::convert::Infallible;
use std::fmt;

use async_trait::async_trait;

use crate::domain::foundation::{AccountId, DomainError, Money, PaymentId, UserId};
use crate::domain::ledger::{
    Account, AccountChanges, AccountFilter, NewAccount, NewPayment, NewUser, Payment,
    PaymentFilter, User, UserChanges, UserFilter,
};

/// A stored entity and the shapes used to query and mutate it.
pub trait Entity: Clone + Send + Sync + 'static {
    type Id: Copy + Send + Sync + fmt::Display + 'static;
    /// Conjunctive lookup criteria.
    type Filter: Send + Sync;
    /// Fields for insertion.
    type New: Send;
    /// Fields for partial update.
    type Changes: Send;
}

impl Entity for Account {
    type Id = AccountId;
    type Filter = AccountFilter;
    type New = NewAccount;
    type Changes = AccountChanges;
}

impl Entity for Payment {
    type Id = PaymentId;
    type Filter = PaymentFilter;
    type New = NewPayment;
    /// Payments are immutable once recorded.
    type Changes = Infallible;
}

impl Entity for User {
    type Id = UserId;
    type Filter = UserFilter;
    type New = NewUser;
    type Changes = UserChanges;
}

/// Generic CRUD over one entity type, bound to an open transaction.
#[async_trait]
pub trait EntityStore<E: Entity>: Send {
    /// Returns the first match, if any.
    async fn find_one(&mut self, filter: &E::Filter) -> Result<Option<E>, DomainError>;

    /// Returns every match, ordered by id.
    async fn find_all(&mut self, filter: &E::Filter) -> Result<Vec<E>, DomainError>;

    /// Inserts a new entity and returns it as stored.
    ///
    /// # Errors
    ///
    /// `ErrorCode::Conflict` on a uniqueness violation.
    async fn create(&mut self, fields: E::New) -> Result<E, DomainError>;

    /// Applies changes to the entity with `id`. `Ok(None)` if absent.
    async fn update(&mut self, id: E::Id, changes: E::Changes) -> Result<Option<E>, DomainError>;

    /// Removes every match and returns how many rows went.
    async fn delete(&mut self, filter: &E::Filter) -> Result<u64, DomainError>;
}

/// One open unit of work against the ledger.
///
/// Dropping a transaction without calling `commit` rolls it back.
#[async_trait]
pub trait LedgerTransaction: Send {
    fn accounts(&mut self) -> &mut dyn EntityStore<Account>;

    fn payments(&mut self) -> &mut dyn EntityStore<Payment>;

    fn users(&mut self) -> &mut dyn EntityStore<User>;

    /// Inserts the account unless its id is taken.
    ///
    /// Returns `Ok(None)` when an account with the same id already exists,
    /// whoever owns it. The transaction stays usable.
    async fn create_account_if_absent(
        &mut self,
        account: NewAccount,
    ) -> Result<Option<Account>, DomainError>;

    /// Atomically adds `amount` to the balance and returns the new balance.
    ///
    /// # Errors
    ///
    /// `ErrorCode::AccountNotFound` if the account does not exist,
    /// `ErrorCode::OutOfRange` if the balance would overflow `NUMERIC(10,2)`.
    async fn credit_balance(
        &mut self,
        account_id: AccountId,
        amount: Money,
    ) -> Result<Money, DomainError>;

    async fn commit(self: Box<Self>) -> Result<(), DomainError>;

    async fn rollback(self: Box<Self>) -> Result<(), DomainError>;
}

/// Entry point to the ledger: hands out independent transactions.
#[async_trait]
pub trait LedgerStore: Send + Sync {
    async fn begin(&self) -> Result<Box<dyn LedgerTransaction>, DomainError>;
}
