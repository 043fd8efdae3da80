//! In-memory implementation of the LedgerStore port.
//!
//! A transaction holds the store lock from `begin` until it is committed or
//! dropped, and works on a private copy of the ledger. Commit swaps the copy
//! in; anything else discards it. Uniqueness and foreign keys are enforced
//! the same way the PostgreSQL schema enforces them.

use std::collections::{BTreeMap, BTreeSet};
use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::{Mutex, OwnedMutexGuard};

use crate::domain::foundation::{
    AccountId, DomainError, ErrorCode, Money, PaymentId, Timestamp, UserId,
};
use crate::domain::ledger::{
    Account, AccountChanges, AccountFilter, NewAccount, NewPayment, NewUser, Payment,
    PaymentFilter, User, UserChanges, UserFilter,
};
use crate::ports::{EntityStore, LedgerStore, LedgerTransaction};

/// Store operations that can be forced to fail.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LedgerOperation {
    Begin,
    CreateAccount,
    CreditBalance,
    CreatePayment,
    Commit,
}

/// Concurrent writes a transaction can be made to observe.
///
/// Rows committed before `begin` stay invisible to lookups, as if another
/// delivery committed them between this transaction's read and its write.
/// Uniqueness checks still see every row.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Interleaving {
    /// Payments committed earlier are missed by the duplicate lookup.
    PaymentCommittedAfterLookup,
    /// Accounts committed earlier are missed until `create_account_if_absent`
    /// finds their id taken.
    AccountCreatedAfterLookup,
}

#[derive(Debug, Clone, Default)]
struct LedgerState {
    users: BTreeMap<UserId, User>,
    accounts: BTreeMap<AccountId, Account>,
    payments: BTreeMap<PaymentId, Payment>,
}

impl LedgerState {
    fn next_user_id(&self) -> UserId {
        UserId::new(self.users.keys().last().map_or(1, |id| id.as_i64() + 1))
    }

    fn next_account_id(&self) -> AccountId {
        AccountId::new(self.accounts.keys().last().map_or(1, |id| id.as_i64() + 1))
    }

    fn next_payment_id(&self) -> PaymentId {
        PaymentId::new(self.payments.keys().last().map_or(1, |id| id.as_i64() + 1))
    }
}

/// In-memory ledger for tests and local runs.
///
/// Clones share the same underlying ledger.
#[derive(Debug, Clone, Default)]
pub struct InMemoryLedgerStore {
    state: Arc<Mutex<LedgerState>>,
    failing_on: Option<LedgerOperation>,
    interleaving: Option<Interleaving>,
}

impl InMemoryLedgerStore {
    /// Creates an empty ledger.
    pub fn new() -> Self {
        Self::default()
    }

    /// Forces every call of `operation` to fail with a database error.
    ///
    /// Useful for testing rollback paths.
    pub fn with_failure(mut self, operation: LedgerOperation) -> Self {
        self.failing_on = Some(operation);
        self
    }

    /// Makes every transaction observe `interleaving`.
    pub fn with_interleaving(mut self, interleaving: Interleaving) -> Self {
        self.interleaving = Some(interleaving);
        self
    }

    /// Inserts and commits a user.
    pub async fn seed_user(&self, user: NewUser) -> Result<User, DomainError> {
        let mut tx = self.begin().await?;
        let created = tx.users().create(user).await?;
        tx.commit().await?;
        Ok(created)
    }

    /// Committed accounts, ordered by id.
    pub async fn accounts(&self) -> Vec<Account> {
        self.state.lock().await.accounts.values().cloned().collect()
    }

    /// Committed payments, ordered by id.
    pub async fn payments(&self) -> Vec<Payment> {
        self.state.lock().await.payments.values().cloned().collect()
    }

    /// Committed users, ordered by id.
    pub async fn users(&self) -> Vec<User> {
        self.state.lock().await.users.values().cloned().collect()
    }
}

#[async_trait]
impl LedgerStore for InMemoryLedgerStore {
    async fn begin(&self) -> Result<Box<dyn LedgerTransaction>, DomainError> {
        fail_if(self.failing_on, LedgerOperation::Begin)?;

        let committed = self.state.clone().lock_owned().await;
        let working = committed.clone();

        let mut hidden_accounts = BTreeSet::new();
        let mut hidden_payments = BTreeSet::new();
        match self.interleaving {
            Some(Interleaving::AccountCreatedAfterLookup) => {
                hidden_accounts.extend(working.accounts.keys().copied());
            }
            Some(Interleaving::PaymentCommittedAfterLookup) => {
                hidden_payments.extend(working.payments.keys().copied());
            }
            None => {}
        }

        Ok(Box::new(InMemoryLedgerTransaction {
            committed,
            working,
            failing_on: self.failing_on,
            hidden_accounts,
            hidden_payments,
        }))
    }
}

/// Open in-memory transaction. Holds the ledger lock until it ends.
pub struct InMemoryLedgerTransaction {
    committed: OwnedMutexGuard<LedgerState>,
    working: LedgerState,
    failing_on: Option<LedgerOperation>,
    hidden_accounts: BTreeSet<AccountId>,
    hidden_payments: BTreeSet<PaymentId>,
}

impl InMemoryLedgerTransaction {
    fn visible_accounts(&self) -> impl Iterator<Item = &Account> {
        self.working
            .accounts
            .values()
            .filter(|account| !self.hidden_accounts.contains(&account.id))
    }

    fn visible_payments(&self) -> impl Iterator<Item = &Payment> {
        self.working
            .payments
            .values()
            .filter(|payment| !self.hidden_payments.contains(&payment.id))
    }
}

fn fail_if(failing_on: Option<LedgerOperation>, operation: LedgerOperation) -> Result<(), DomainError> {
    if failing_on == Some(operation) {
        return Err(DomainError::new(
            ErrorCode::DatabaseError,
            format!("Injected failure on {:?}", operation),
        ));
    }
    Ok(())
}

fn foreign_key_violation(message: impl Into<String>) -> DomainError {
    DomainError::new(ErrorCode::DatabaseError, message)
}

// ════════════════════════════════════════════════════════════════════════════════
// Accounts
// ════════════════════════════════════════════════════════════════════════════════

#[async_trait]
impl EntityStore<Account> for InMemoryLedgerTransaction {
    async fn find_one(&mut self, filter: &AccountFilter) -> Result<Option<Account>, DomainError> {
        Ok(self
            .visible_accounts()
            .find(|account| filter.matches(account))
            .cloned())
    }

    async fn find_all(&mut self, filter: &AccountFilter) -> Result<Vec<Account>, DomainError> {
        Ok(self
            .visible_accounts()
            .filter(|account| filter.matches(account))
            .cloned()
            .collect())
    }

    async fn create(&mut self, fields: NewAccount) -> Result<Account, DomainError> {
        fail_if(self.failing_on, LedgerOperation::CreateAccount)?;

        let id = fields.id.unwrap_or_else(|| self.working.next_account_id());
        if self.working.accounts.contains_key(&id) {
            return Err(DomainError::conflict(format!("Account {} already exists", id)));
        }
        if !self.working.users.contains_key(&fields.user_id) {
            return Err(foreign_key_violation(format!(
                "Account owner {} does not exist",
                fields.user_id
            )));
        }

        let account = Account {
            id,
            user_id: fields.user_id,
            balance: fields.balance,
        };
        self.working.accounts.insert(id, account.clone());
        Ok(account)
    }

    async fn update(
        &mut self,
        id: AccountId,
        changes: AccountChanges,
    ) -> Result<Option<Account>, DomainError> {
        if let Some(user_id) = changes.user_id {
            if !self.working.users.contains_key(&user_id) {
                return Err(foreign_key_violation(format!(
                    "Account owner {} does not exist",
                    user_id
                )));
            }
        }

        Ok(self.working.accounts.get_mut(&id).map(|account| {
            if let Some(user_id) = changes.user_id {
                account.user_id = user_id;
            }
            account.clone()
        }))
    }

    async fn delete(&mut self, filter: &AccountFilter) -> Result<u64, DomainError> {
        let doomed: Vec<AccountId> = self
            .working
            .accounts
            .values()
            .filter(|account| filter.matches(account))
            .map(|account| account.id)
            .collect();

        if self
            .working
            .payments
            .values()
            .any(|payment| doomed.contains(&payment.account_id))
        {
            return Err(foreign_key_violation("Account still has payments"));
        }

        for id in &doomed {
            self.working.accounts.remove(id);
        }
        Ok(doomed.len() as u64)
    }
}

// ════════════════════════════════════════════════════════════════════════════════
// Payments
// ════════════════════════════════════════════════════════════════════════════════

#[async_trait]
impl EntityStore<Payment> for InMemoryLedgerTransaction {
    async fn find_one(&mut self, filter: &PaymentFilter) -> Result<Option<Payment>, DomainError> {
        Ok(self
            .visible_payments()
            .find(|payment| filter.matches(payment))
            .cloned())
    }

    async fn find_all(&mut self, filter: &PaymentFilter) -> Result<Vec<Payment>, DomainError> {
        Ok(self
            .visible_payments()
            .filter(|payment| filter.matches(payment))
            .cloned()
            .collect())
    }

    async fn create(&mut self, fields: NewPayment) -> Result<Payment, DomainError> {
        fail_if(self.failing_on, LedgerOperation::CreatePayment)?;

        if self
            .working
            .payments
            .values()
            .any(|payment| payment.transaction_id == fields.transaction_id)
        {
            return Err(DomainError::conflict(format!(
                "Payment for transaction {} already exists",
                fields.transaction_id
            )));
        }
        if !self.working.accounts.contains_key(&fields.account_id) {
            return Err(foreign_key_violation(format!(
                "Account {} does not exist",
                fields.account_id
            )));
        }

        let payment = Payment {
            id: self.working.next_payment_id(),
            transaction_id: fields.transaction_id,
            amount: fields.amount,
            account_id: fields.account_id,
            created_at: Timestamp::now(),
        };
        self.working.payments.insert(payment.id, payment.clone());
        Ok(payment)
    }

    async fn update(
        &mut self,
        _id: PaymentId,
        changes: std::convert::Infallible,
    ) -> Result<Option<Payment>, DomainError> {
        match changes {}
    }

    async fn delete(&mut self, filter: &PaymentFilter) -> Result<u64, DomainError> {
        let before = self.working.payments.len();
        self.working
            .payments
            .retain(|_, payment| !filter.matches(payment));
        Ok((before - self.working.payments.len()) as u64)
    }
}

// ════════════════════════════════════════════════════════════════════════════════
// Users
// ════════════════════════════════════════════════════════════════════════════════

#[async_trait]
impl EntityStore<User> for InMemoryLedgerTransaction {
    async fn find_one(&mut self, filter: &UserFilter) -> Result<Option<User>, DomainError> {
        Ok(self
            .working
            .users
            .values()
            .find(|user| filter.matches(user))
            .cloned())
    }

    async fn find_all(&mut self, filter: &UserFilter) -> Result<Vec<User>, DomainError> {
        Ok(self
            .working
            .users
            .values()
            .filter(|user| filter.matches(user))
            .cloned()
            .collect())
    }

    async fn create(&mut self, fields: NewUser) -> Result<User, DomainError> {
        if self.working.users.values().any(|u| u.email == fields.email) {
            return Err(DomainError::conflict(format!(
                "User with email {} already exists",
                fields.email
            )));
        }

        let user = User {
            id: self.working.next_user_id(),
            email: fields.email,
            full_name: fields.full_name,
            hashed_password: fields.hashed_password,
            is_admin: fields.is_admin,
        };
        self.working.users.insert(user.id, user.clone());
        Ok(user)
    }

    async fn update(&mut self, id: UserId, changes: UserChanges) -> Result<Option<User>, DomainError> {
        if let Some(email) = &changes.email {
            if self
                .working
                .users
                .values()
                .any(|u| u.id != id && &u.email == email)
            {
                return Err(DomainError::conflict(format!(
                    "User with email {} already exists",
                    email
                )));
            }
        }

        Ok(self.working.users.get_mut(&id).map(|user| {
            changes.apply_to(user);
            user.clone()
        }))
    }

    async fn delete(&mut self, filter: &UserFilter) -> Result<u64, DomainError> {
        let doomed: Vec<UserId> = self
            .working
            .users
            .values()
            .filter(|user| filter.matches(user))
            .map(|user| user.id)
            .collect();

        if self
            .working
            .accounts
            .values()
            .any(|account| doomed.contains(&account.user_id))
        {
            return Err(foreign_key_violation("User still owns accounts"));
        }

        for id in &doomed {
            self.working.users.remove(id);
        }
        Ok(doomed.len() as u64)
    }
}

// ════════════════════════════════════════════════════════════════════════════════
// Transaction
// ════════════════════════════════════════════════════════════════════════════════

#[async_trait]
impl LedgerTransaction for InMemoryLedgerTransaction {
    fn accounts(&mut self) -> &mut dyn EntityStore<Account> {
        self
    }

    fn payments(&mut self) -> &mut dyn EntityStore<Payment> {
        self
    }

    fn users(&mut self) -> &mut dyn EntityStore<User> {
        self
    }

    async fn create_account_if_absent(
        &mut self,
        account: NewAccount,
    ) -> Result<Option<Account>, DomainError> {
        if let Some(id) = account.id {
            if self.working.accounts.contains_key(&id) {
                // The conflicting row is now known; later reads see it
                self.hidden_accounts.clear();
                return Ok(None);
            }
        }
        EntityStore::<Account>::create(self, account).await.map(Some)
    }

    async fn credit_balance(
        &mut self,
        account_id: AccountId,
        amount: Money,
    ) -> Result<Money, DomainError> {
        fail_if(self.failing_on, LedgerOperation::CreditBalance)?;

        let account = self.working.accounts.get_mut(&account_id).ok_or_else(|| {
            DomainError::new(
                ErrorCode::AccountNotFound,
                format!("Account {} not found", account_id),
            )
        })?;

        account.balance = account
            .balance
            .checked_add(amount)
            .map_err(|e| DomainError::new(ErrorCode::OutOfRange, e.to_string()))?;
        Ok(account.balance)
    }

    async fn commit(self: Box<Self>) -> Result<(), DomainError> {
        fail_if(self.failing_on, LedgerOperation::Commit)?;

        let InMemoryLedgerTransaction {
            mut committed,
            working,
            ..
        } = *self;
        *committed = working;
        Ok(())
    }

    async fn rollback(self: Box<Self>) -> Result<(), DomainError> {
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::foundation::TransactionId;

    async fn store_with_user() -> (InMemoryLedgerStore, User) {
        let store = InMemoryLedgerStore::new();
        let user = store
            .seed_user(NewUser::new("ada@example.com", "hash").unwrap())
            .await
            .unwrap();
        (store, user)
    }

    fn new_payment(tx: &str, account_id: AccountId, amount: &str) -> NewPayment {
        NewPayment {
            transaction_id: TransactionId::new(tx).unwrap(),
            amount: Money::parse(amount).unwrap(),
            account_id,
        }
    }

    // ══════════════════════════════════════════════════════════════
    // Transaction Boundary Tests
    // ══════════════════════════════════════════════════════════════

    #[tokio::test]
    async fn commit_persists_changes() {
        let (store, user) = store_with_user().await;

        let mut tx = store.begin().await.unwrap();
        tx.accounts()
            .create(NewAccount::with_id(AccountId::new(5), user.id))
            .await
            .unwrap();
        tx.commit().await.unwrap();

        assert_eq!(store.accounts().await.len(), 1);
    }

    #[tokio::test]
    async fn rollback_discards_changes() {
        let (store, user) = store_with_user().await;

        let mut tx = store.begin().await.unwrap();
        tx.accounts()
            .create(NewAccount::with_id(AccountId::new(5), user.id))
            .await
            .unwrap();
        tx.rollback().await.unwrap();

        assert!(store.accounts().await.is_empty());
    }

    #[tokio::test]
    async fn dropped_transaction_rolls_back() {
        let (store, user) = store_with_user().await;

        {
            let mut tx = store.begin().await.unwrap();
            tx.accounts()
                .create(NewAccount::with_id(AccountId::new(5), user.id))
                .await
                .unwrap();
        }

        assert!(store.accounts().await.is_empty());
    }

    #[tokio::test]
    async fn failed_commit_leaves_ledger_untouched() {
        let (store, user) = store_with_user().await;
        let failing = store.clone().with_failure(LedgerOperation::Commit);

        let mut tx = failing.begin().await.unwrap();
        tx.accounts()
            .create(NewAccount::with_id(AccountId::new(5), user.id))
            .await
            .unwrap();
        assert!(tx.commit().await.is_err());

        assert!(store.accounts().await.is_empty());
    }

    // ══════════════════════════════════════════════════════════════
    // Constraint Tests
    // ══════════════════════════════════════════════════════════════

    #[tokio::test]
    async fn duplicate_transaction_id_conflicts() {
        let (store, user) = store_with_user().await;
        let mut tx = store.begin().await.unwrap();
        let account = tx
            .accounts()
            .create(NewAccount::with_id(AccountId::new(5), user.id))
            .await
            .unwrap();

        tx.payments()
            .create(new_payment("tx-1", account.id, "1.00"))
            .await
            .unwrap();
        let err = tx
            .payments()
            .create(new_payment("tx-1", account.id, "2.00"))
            .await
            .unwrap_err();

        assert!(err.is_conflict());
    }

    #[tokio::test]
    async fn account_requires_existing_owner() {
        let store = InMemoryLedgerStore::new();
        let mut tx = store.begin().await.unwrap();

        let err = tx
            .accounts()
            .create(NewAccount::with_id(AccountId::new(5), UserId::new(99)))
            .await
            .unwrap_err();

        assert_eq!(err.code, ErrorCode::DatabaseError);
    }

    #[tokio::test]
    async fn create_account_if_absent_reports_taken_id() {
        let (store, user) = store_with_user().await;
        let mut tx = store.begin().await.unwrap();

        let first = tx
            .create_account_if_absent(NewAccount::with_id(AccountId::new(5), user.id))
            .await
            .unwrap();
        let second = tx
            .create_account_if_absent(NewAccount::with_id(AccountId::new(5), user.id))
            .await
            .unwrap();

        assert!(first.is_some());
        assert!(second.is_none());
    }

    #[tokio::test]
    async fn generated_account_ids_skip_explicit_ones() {
        let (store, user) = store_with_user().await;
        let mut tx = store.begin().await.unwrap();

        tx.accounts()
            .create(NewAccount::with_id(AccountId::new(5), user.id))
            .await
            .unwrap();
        let generated = tx
            .accounts()
            .create(NewAccount {
                id: None,
                user_id: user.id,
                balance: Money::zero(),
            })
            .await
            .unwrap();

        assert_eq!(generated.id, AccountId::new(6));
    }

    #[tokio::test]
    async fn duplicate_email_conflicts() {
        let (store, _) = store_with_user().await;

        let err = store
            .seed_user(NewUser::new("ada@example.com", "other").unwrap())
            .await
            .unwrap_err();

        assert!(err.is_conflict());
    }

    #[tokio::test]
    async fn deleting_owner_of_accounts_is_refused() {
        let (store, user) = store_with_user().await;
        let mut tx = store.begin().await.unwrap();
        tx.accounts()
            .create(NewAccount::with_id(AccountId::new(5), user.id))
            .await
            .unwrap();

        assert!(tx.users().delete(&UserFilter::by_id(user.id)).await.is_err());
    }

    // ══════════════════════════════════════════════════════════════
    // Interleaving Tests
    // ══════════════════════════════════════════════════════════════

    async fn store_with_account_and_payment() -> (InMemoryLedgerStore, User) {
        let (store, user) = store_with_user().await;
        let mut tx = store.begin().await.unwrap();
        tx.accounts()
            .create(NewAccount::with_id(AccountId::new(5), user.id))
            .await
            .unwrap();
        tx.payments()
            .create(new_payment("tx-1", AccountId::new(5), "1.00"))
            .await
            .unwrap();
        tx.commit().await.unwrap();
        (store, user)
    }

    #[tokio::test]
    async fn late_payment_is_missed_by_lookup_but_still_conflicts() {
        let (store, _) = store_with_account_and_payment().await;
        let racing = store
            .clone()
            .with_interleaving(Interleaving::PaymentCommittedAfterLookup);
        let mut tx = racing.begin().await.unwrap();

        let found = tx
            .payments()
            .find_one(&PaymentFilter::by_transaction(TransactionId::new("tx-1").unwrap()))
            .await
            .unwrap();
        let err = tx
            .payments()
            .create(new_payment("tx-1", AccountId::new(5), "1.00"))
            .await
            .unwrap_err();

        assert!(found.is_none());
        assert!(err.is_conflict());
        assert!(tx
            .accounts()
            .find_one(&AccountFilter::by_id(AccountId::new(5)))
            .await
            .unwrap()
            .is_some());
    }

    #[tokio::test]
    async fn late_account_becomes_visible_after_taken_id() {
        let (store, user) = store_with_account_and_payment().await;
        let racing = store
            .clone()
            .with_interleaving(Interleaving::AccountCreatedAfterLookup);
        let mut tx = racing.begin().await.unwrap();
        let by_id = AccountFilter::by_id(AccountId::new(5));

        assert!(tx.accounts().find_one(&by_id).await.unwrap().is_none());
        assert!(tx.accounts().find_all(&by_id).await.unwrap().is_empty());

        let created = tx
            .create_account_if_absent(NewAccount::with_id(AccountId::new(5), user.id))
            .await
            .unwrap();

        assert!(created.is_none());
        let account = tx.accounts().find_one(&by_id).await.unwrap().unwrap();
        assert_eq!(account.user_id, user.id);
    }

    #[tokio::test]
    async fn interleaving_does_not_hide_rows_written_in_transaction() {
        let (store, user) = store_with_user().await;
        let racing = store
            .clone()
            .with_interleaving(Interleaving::AccountCreatedAfterLookup);
        let mut tx = racing.begin().await.unwrap();

        tx.accounts()
            .create(NewAccount::with_id(AccountId::new(7), user.id))
            .await
            .unwrap();

        assert!(tx
            .accounts()
            .find_one(&AccountFilter::by_id(AccountId::new(7)))
            .await
            .unwrap()
            .is_some());
    }

    // ══════════════════════════════════════════════════════════════
    // Credit Tests
    // ══════════════════════════════════════════════════════════════

    #[tokio::test]
    async fn credit_adds_exactly() {
        let (store, user) = store_with_user().await;
        let mut tx = store.begin().await.unwrap();
        let account = tx
            .accounts()
            .create(NewAccount::with_id(AccountId::new(5), user.id))
            .await
            .unwrap();

        tx.credit_balance(account.id, Money::parse("0.10").unwrap())
            .await
            .unwrap();
        let balance = tx
            .credit_balance(account.id, Money::parse("0.20").unwrap())
            .await
            .unwrap();

        assert_eq!(balance.to_string(), "0.30");
    }

    #[tokio::test]
    async fn credit_unknown_account_fails() {
        let store = InMemoryLedgerStore::new();
        let mut tx = store.begin().await.unwrap();

        let err = tx
            .credit_balance(AccountId::new(1), Money::parse("1.00").unwrap())
            .await
            .unwrap_err();

        assert_eq!(err.code, ErrorCode::AccountNotFound);
    }

    #[tokio::test]
    async fn credit_past_numeric_range_fails() {
        let (store, user) = store_with_user().await;
        let mut tx = store.begin().await.unwrap();
        let account = tx
            .accounts()
            .create(NewAccount {
                id: Some(AccountId::new(1)),
                user_id: user.id,
                balance: Money::max(),
            })
            .await
            .unwrap();

        let err = tx
            .credit_balance(account.id, Money::parse("0.01").unwrap())
            .await
            .unwrap_err();

        assert_eq!(err.code, ErrorCode::OutOfRange);
    }

    // ══════════════════════════════════════════════════════════════
    // Query Tests
    // ══════════════════════════════════════════════════════════════

    #[tokio::test]
    async fn find_all_and_update_accounts() {
        let (store, user) = store_with_user().await;
        let other = store
            .seed_user(NewUser::new("bob@example.com", "hash").unwrap())
            .await
            .unwrap();
        let mut tx = store.begin().await.unwrap();
        for id in [1, 2] {
            tx.accounts()
                .create(NewAccount::with_id(AccountId::new(id), user.id))
                .await
                .unwrap();
        }

        let moved = tx
            .accounts()
            .update(
                AccountId::new(2),
                AccountChanges {
                    user_id: Some(other.id),
                },
            )
            .await
            .unwrap();
        let owned = tx
            .accounts()
            .find_all(&AccountFilter::by_user(user.id))
            .await
            .unwrap();

        assert_eq!(moved.map(|a| a.user_id), Some(other.id));
        assert_eq!(owned.len(), 1);
        assert_eq!(owned[0].id, AccountId::new(1));
    }

    #[tokio::test]
    async fn delete_payments_by_account() {
        let (store, user) = store_with_user().await;
        let mut tx = store.begin().await.unwrap();
        let account = tx
            .accounts()
            .create(NewAccount::with_id(AccountId::new(5), user.id))
            .await
            .unwrap();
        tx.payments()
            .create(new_payment("tx-1", account.id, "1.00"))
            .await
            .unwrap();
        tx.payments()
            .create(new_payment("tx-2", account.id, "1.00"))
            .await
            .unwrap();

        let removed = tx
            .payments()
            .delete(&PaymentFilter::by_account(account.id))
            .await
            .unwrap();

        assert_eq!(removed, 2);
        assert_eq!(
            tx.accounts()
                .delete(&AccountFilter::by_id(account.id))
                .await
                .unwrap(),
            1
        );
    }
}
