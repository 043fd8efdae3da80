//! PostgreSQL implementation of the LedgerStore port.
//!
//! Each `begin` checks out a pooled connection and opens a transaction on it.
//! Filters are static SQL with nullable parameters: an unset field binds
//! `NULL` and its predicate collapses to true.

use std::convert::Infallible;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use sqlx::{PgPool, Postgres, Transaction};

use crate::domain::foundation::{
    AccountId, DomainError, ErrorCode, Money, PaymentId, Timestamp, TransactionId, UserId,
};
use crate::domain::ledger::{
    Account, AccountChanges, AccountFilter, NewAccount, NewPayment, NewUser, Payment,
    PaymentFilter, User, UserChanges, UserFilter,
};
use crate::ports::{EntityStore, LedgerStore, LedgerTransaction};

/// SQLSTATE raised when a value does not fit `NUMERIC(10,2)`.
const NUMERIC_VALUE_OUT_OF_RANGE: &str = "22003";

/// PostgreSQL implementation of the LedgerStore port.
///
/// Uses sqlx for database operations with connection pooling.
#[derive(Clone)]
pub struct PostgresLedgerStore {
    pool: PgPool,
}

impl PostgresLedgerStore {
    /// Creates a new PostgresLedgerStore with the given connection pool.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl LedgerStore for PostgresLedgerStore {
    async fn begin(&self) -> Result<Box<dyn LedgerTransaction>, DomainError> {
        let tx = self.pool.begin().await.map_err(|e| {
            DomainError::new(ErrorCode::DatabaseError, format!("Failed to begin transaction: {}", e))
        })?;
        Ok(Box::new(PostgresLedgerTransaction { tx }))
    }
}

/// An open PostgreSQL transaction. Rolled back by sqlx when dropped.
pub struct PostgresLedgerTransaction {
    tx: Transaction<'static, Postgres>,
}

// ════════════════════════════════════════════════════════════════════════════════
// Row Mapping
// ════════════════════════════════════════════════════════════════════════════════

#[derive(Debug, sqlx::FromRow)]
struct AccountRow {
    id: i64,
    user_id: i64,
    balance: Decimal,
}

impl TryFrom<AccountRow> for Account {
    type Error = DomainError;

    fn try_from(row: AccountRow) -> Result<Self, Self::Error> {
        Ok(Account {
            id: AccountId::new(row.id),
            user_id: UserId::new(row.user_id),
            balance: money_column("accounts.balance", row.balance)?,
        })
    }
}

#[derive(Debug, sqlx::FromRow)]
struct PaymentRow {
    id: i64,
    transaction_id: String,
    amount: Decimal,
    account_id: i64,
    created_at: DateTime<Utc>,
}

impl TryFrom<PaymentRow> for Payment {
    type Error = DomainError;

    fn try_from(row: PaymentRow) -> Result<Self, Self::Error> {
        Ok(Payment {
            id: PaymentId::new(row.id),
            transaction_id: TransactionId::new(row.transaction_id).map_err(|e| {
                DomainError::new(ErrorCode::DatabaseError, format!("Invalid transaction_id: {}", e))
            })?,
            amount: money_column("payments.amount", row.amount)?,
            account_id: AccountId::new(row.account_id),
            created_at: Timestamp::from_datetime(row.created_at),
        })
    }
}

#[derive(Debug, sqlx::FromRow)]
struct UserRow {
    id: i64,
    email: String,
    full_name: Option<String>,
    hashed_password: String,
    is_admin: bool,
}

impl From<UserRow> for User {
    fn from(row: UserRow) -> Self {
        User {
            id: UserId::new(row.id),
            email: row.email,
            full_name: row.full_name,
            hashed_password: row.hashed_password,
            is_admin: row.is_admin,
        }
    }
}

fn money_column(column: &str, value: Decimal) -> Result<Money, DomainError> {
    Money::try_from(value).map_err(|e| {
        DomainError::new(ErrorCode::DatabaseError, format!("Invalid {} value: {}", column, e))
    })
}

/// Maps sqlx errors, surfacing uniqueness and range violations by code.
fn database_error(action: &str, e: sqlx::Error) -> DomainError {
    if let sqlx::Error::Database(db_err) = &e {
        if db_err.is_unique_violation() {
            return DomainError::conflict(format!("Failed to {}: {}", action, db_err.message()))
                .with_detail("constraint", db_err.constraint().unwrap_or_default());
        }
        if db_err.code().as_deref() == Some(NUMERIC_VALUE_OUT_OF_RANGE) {
            return DomainError::new(
                ErrorCode::OutOfRange,
                format!("Failed to {}: {}", action, db_err.message()),
            );
        }
    }
    DomainError::new(ErrorCode::DatabaseError, format!("Failed to {}: {}", action, e))
}

// ════════════════════════════════════════════════════════════════════════════════
// Accounts
// ════════════════════════════════════════════════════════════════════════════════

#[async_trait]
impl EntityStore<Account> for PostgresLedgerTransaction {
    async fn find_one(&mut self, filter: &AccountFilter) -> Result<Option<Account>, DomainError> {
        let row = sqlx::query_as::<_, AccountRow>(
            r#"
            SELECT id, user_id, balance FROM accounts
            WHERE ($1::BIGINT IS NULL OR id = $1)
              AND ($2::BIGINT IS NULL OR user_id = $2)
            ORDER BY id
            LIMIT 1
            "#,
        )
        .bind(filter.id.map(|id| id.as_i64()))
        .bind(filter.user_id.map(|id| id.as_i64()))
        .fetch_optional(&mut *self.tx)
        .await
        .map_err(|e| database_error("fetch account", e))?;

        row.map(Account::try_from).transpose()
    }

    async fn find_all(&mut self, filter: &AccountFilter) -> Result<Vec<Account>, DomainError> {
        let rows = sqlx::query_as::<_, AccountRow>(
            r#"
            SELECT id, user_id, balance FROM accounts
            WHERE ($1::BIGINT IS NULL OR id = $1)
              AND ($2::BIGINT IS NULL OR user_id = $2)
            ORDER BY id
            "#,
        )
        .bind(filter.id.map(|id| id.as_i64()))
        .bind(filter.user_id.map(|id| id.as_i64()))
        .fetch_all(&mut *self.tx)
        .await
        .map_err(|e| database_error("fetch accounts", e))?;

        rows.into_iter().map(Account::try_from).collect()
    }

    async fn create(&mut self, fields: NewAccount) -> Result<Account, DomainError> {
        let row = match fields.id {
            Some(id) => {
                sqlx::query_as::<_, AccountRow>(
                    r#"
                    INSERT INTO accounts (id, user_id, balance)
                    VALUES ($1, $2, $3)
                    RETURNING id, user_id, balance
                    "#,
                )
                .bind(id.as_i64())
                .bind(fields.user_id.as_i64())
                .bind(fields.balance.as_decimal())
                .fetch_one(&mut *self.tx)
                .await
            }
            None => {
                sqlx::query_as::<_, AccountRow>(
                    r#"
                    INSERT INTO accounts (user_id, balance)
                    VALUES ($1, $2)
                    RETURNING id, user_id, balance
                    "#,
                )
                .bind(fields.user_id.as_i64())
                .bind(fields.balance.as_decimal())
                .fetch_one(&mut *self.tx)
                .await
            }
        }
        .map_err(|e| database_error("insert account", e))?;

        Account::try_from(row)
    }

    async fn update(
        &mut self,
        id: AccountId,
        changes: AccountChanges,
    ) -> Result<Option<Account>, DomainError> {
        let row = sqlx::query_as::<_, AccountRow>(
            r#"
            UPDATE accounts SET user_id = COALESCE($2, user_id)
            WHERE id = $1
            RETURNING id, user_id, balance
            "#,
        )
        .bind(id.as_i64())
        .bind(changes.user_id.map(|id| id.as_i64()))
        .fetch_optional(&mut *self.tx)
        .await
        .map_err(|e| database_error("update account", e))?;

        row.map(Account::try_from).transpose()
    }

    async fn delete(&mut self, filter: &AccountFilter) -> Result<u64, DomainError> {
        let result = sqlx::query(
            r#"
            DELETE FROM accounts
            WHERE ($1::BIGINT IS NULL OR id = $1)
              AND ($2::BIGINT IS NULL OR user_id = $2)
            "#,
        )
        .bind(filter.id.map(|id| id.as_i64()))
        .bind(filter.user_id.map(|id| id.as_i64()))
        .execute(&mut *self.tx)
        .await
        .map_err(|e| database_error("delete accounts", e))?;

        Ok(result.rows_affected())
    }
}

// ════════════════════════════════════════════════════════════════════════════════
// Payments
// ════════════════════════════════════════════════════════════════════════════════

#[async_trait]
impl EntityStore<Payment> for PostgresLedgerTransaction {
    async fn find_one(&mut self, filter: &PaymentFilter) -> Result<Option<Payment>, DomainError> {
        let row = sqlx::query_as::<_, PaymentRow>(
            r#"
            SELECT id, transaction_id, amount, account_id, created_at FROM payments
            WHERE ($1::TEXT IS NULL OR transaction_id = $1)
              AND ($2::BIGINT IS NULL OR account_id = $2)
            ORDER BY id
            LIMIT 1
            "#,
        )
        .bind(filter.transaction_id.as_ref().map(|tx| tx.as_str()))
        .bind(filter.account_id.map(|id| id.as_i64()))
        .fetch_optional(&mut *self.tx)
        .await
        .map_err(|e| database_error("fetch payment", e))?;

        row.map(Payment::try_from).transpose()
    }

    async fn find_all(&mut self, filter: &PaymentFilter) -> Result<Vec<Payment>, DomainError> {
        let rows = sqlx::query_as::<_, PaymentRow>(
            r#"
            SELECT id, transaction_id, amount, account_id, created_at FROM payments
            WHERE ($1::TEXT IS NULL OR transaction_id = $1)
              AND ($2::BIGINT IS NULL OR account_id = $2)
            ORDER BY id
            "#,
        )
        .bind(filter.transaction_id.as_ref().map(|tx| tx.as_str()))
        .bind(filter.account_id.map(|id| id.as_i64()))
        .fetch_all(&mut *self.tx)
        .await
        .map_err(|e| database_error("fetch payments", e))?;

        rows.into_iter().map(Payment::try_from).collect()
    }

    async fn create(&mut self, fields: NewPayment) -> Result<Payment, DomainError> {
        let row = sqlx::query_as::<_, PaymentRow>(
            r#"
            INSERT INTO payments (transaction_id, amount, account_id)
            VALUES ($1, $2, $3)
            RETURNING id, transaction_id, amount, account_id, created_at
            "#,
        )
        .bind(fields.transaction_id.as_str())
        .bind(fields.amount.as_decimal())
        .bind(fields.account_id.as_i64())
        .fetch_one(&mut *self.tx)
        .await
        .map_err(|e| database_error("insert payment", e))?;

        Payment::try_from(row)
    }

    async fn update(
        &mut self,
        _id: PaymentId,
        changes: Infallible,
    ) -> Result<Option<Payment>, DomainError> {
        match changes {}
    }

    async fn delete(&mut self, filter: &PaymentFilter) -> Result<u64, DomainError> {
        let result = sqlx::query(
            r#"
            DELETE FROM payments
            WHERE ($1::TEXT IS NULL OR transaction_id = $1)
              AND ($2::BIGINT IS NULL OR account_id = $2)
            "#,
        )
        .bind(filter.transaction_id.as_ref().map(|tx| tx.as_str()))
        .bind(filter.account_id.map(|id| id.as_i64()))
        .execute(&mut *self.tx)
        .await
        .map_err(|e| database_error("delete payments", e))?;

        Ok(result.rows_affected())
    }
}

// ════════════════════════════════════════════════════════════════════════════════
// Users
// ════════════════════════════════════════════════════════════════════════════════

#[async_trait]
impl EntityStore<User> for PostgresLedgerTransaction {
    async fn find_one(&mut self, filter: &UserFilter) -> Result<Option<User>, DomainError> {
        let row = sqlx::query_as::<_, UserRow>(
            r#"
            SELECT id, email, full_name, hashed_password, is_admin FROM users
            WHERE ($1::BIGINT IS NULL OR id = $1)
              AND ($2::TEXT IS NULL OR email = $2)
            ORDER BY id
            LIMIT 1
            "#,
        )
        .bind(filter.id.map(|id| id.as_i64()))
        .bind(filter.email.as_deref())
        .fetch_optional(&mut *self.tx)
        .await
        .map_err(|e| database_error("fetch user", e))?;

        Ok(row.map(User::from))
    }

    async fn find_all(&mut self, filter: &UserFilter) -> Result<Vec<User>, DomainError> {
        let rows = sqlx::query_as::<_, UserRow>(
            r#"
            SELECT id, email, full_name, hashed_password, is_admin FROM users
            WHERE ($1::BIGINT IS NULL OR id = $1)
              AND ($2::TEXT IS NULL OR email = $2)
            ORDER BY id
            "#,
        )
        .bind(filter.id.map(|id| id.as_i64()))
        .bind(filter.email.as_deref())
        .fetch_all(&mut *self.tx)
        .await
        .map_err(|e| database_error("fetch users", e))?;

        Ok(rows.into_iter().map(User::from).collect())
    }

    async fn create(&mut self, fields: NewUser) -> Result<User, DomainError> {
        let row = sqlx::query_as::<_, UserRow>(
            r#"
            INSERT INTO users (email, full_name, hashed_password, is_admin)
            VALUES ($1, $2, $3, $4)
            RETURNING id, email, full_name, hashed_password, is_admin
            "#,
        )
        .bind(&fields.email)
        .bind(&fields.full_name)
        .bind(&fields.hashed_password)
        .bind(fields.is_admin)
        .fetch_one(&mut *self.tx)
        .await
        .map_err(|e| database_error("insert user", e))?;

        Ok(User::from(row))
    }

    async fn update(&mut self, id: UserId, changes: UserChanges) -> Result<Option<User>, DomainError> {
        let row = sqlx::query_as::<_, UserRow>(
            r#"
            UPDATE users SET
                email = COALESCE($2, email),
                full_name = CASE WHEN $3 THEN $4 ELSE full_name END,
                hashed_password = COALESCE($5, hashed_password),
                is_admin = COALESCE($6, is_admin)
            WHERE id = $1
            RETURNING id, email, full_name, hashed_password, is_admin
            "#,
        )
        .bind(id.as_i64())
        .bind(&changes.email)
        .bind(changes.full_name.is_some())
        .bind(changes.full_name.clone().flatten())
        .bind(&changes.hashed_password)
        .bind(changes.is_admin)
        .fetch_optional(&mut *self.tx)
        .await
        .map_err(|e| database_error("update user", e))?;

        Ok(row.map(User::from))
    }

    async fn delete(&mut self, filter: &UserFilter) -> Result<u64, DomainError> {
        let result = sqlx::query(
            r#"
            DELETE FROM users
            WHERE ($1::BIGINT IS NULL OR id = $1)
              AND ($2::TEXT IS NULL OR email = $2)
            "#,
        )
        .bind(filter.id.map(|id| id.as_i64()))
        .bind(filter.email.as_deref())
        .execute(&mut *self.tx)
        .await
        .map_err(|e| database_error("delete users", e))?;

        Ok(result.rows_affected())
    }
}

// ════════════════════════════════════════════════════════════════════════════════
// Transaction
// ════════════════════════════════════════════════════════════════════════════════

#[async_trait]
impl LedgerTransaction for PostgresLedgerTransaction {
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
        let Some(id) = account.id else {
            return EntityStore::<Account>::create(self, account).await.map(Some);
        };

        // ON CONFLICT keeps the transaction usable when the id is taken.
        let row = sqlx::query_as::<_, AccountRow>(
            r#"
            INSERT INTO accounts (id, user_id, balance)
            VALUES ($1, $2, $3)
            ON CONFLICT (id) DO NOTHING
            RETURNING id, user_id, balance
            "#,
        )
        .bind(id.as_i64())
        .bind(account.user_id.as_i64())
        .bind(account.balance.as_decimal())
        .fetch_optional(&mut *self.tx)
        .await
        .map_err(|e| database_error("insert account", e))?;

        row.map(Account::try_from).transpose()
    }

    async fn credit_balance(
        &mut self,
        account_id: AccountId,
        amount: Money,
    ) -> Result<Money, DomainError> {
        let balance: Option<Decimal> = sqlx::query_scalar(
            r#"
            UPDATE accounts SET balance = balance + $2
            WHERE id = $1
            RETURNING balance
            "#,
        )
        .bind(account_id.as_i64())
        .bind(amount.as_decimal())
        .fetch_optional(&mut *self.tx)
        .await
        .map_err(|e| database_error("credit account", e))?;

        let balance = balance.ok_or_else(|| {
            DomainError::new(
                ErrorCode::AccountNotFound,
                format!("Account {} not found", account_id),
            )
        })?;
        money_column("accounts.balance", balance)
    }

    async fn commit(self: Box<Self>) -> Result<(), DomainError> {
        let PostgresLedgerTransaction { tx } = *self;
        tx.commit().await.map_err(|e| {
            DomainError::new(ErrorCode::DatabaseError, format!("Failed to commit transaction: {}", e))
        })
    }

    async fn rollback(self: Box<Self>) -> Result<(), DomainError> {
        let PostgresLedgerTransaction { tx } = *self;
        tx.rollback().await.map_err(|e| {
            DomainError::new(ErrorCode::DatabaseError, format!("Failed to roll back transaction: {}", e))
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn account_row_converts_with_exact_balance() {
        let row = AccountRow {
            id: 5,
            user_id: 1,
            balance: Decimal::new(2500, 2),
        };

        let account = Account::try_from(row).unwrap();

        assert_eq!(account.id, AccountId::new(5));
        assert_eq!(account.user_id, UserId::new(1));
        assert_eq!(account.balance.to_string(), "25.00");
    }

    #[test]
    fn account_row_rejects_sub_cent_balance() {
        let row = AccountRow {
            id: 5,
            user_id: 1,
            balance: Decimal::new(12345, 3),
        };

        let err = Account::try_from(row).unwrap_err();

        assert_eq!(err.code, ErrorCode::DatabaseError);
    }

    #[test]
    fn payment_row_converts() {
        let created_at = Utc.with_ymd_and_hms(2024, 1, 1, 12, 0, 0).unwrap();
        let row = PaymentRow {
            id: 7,
            transaction_id: "tx-1".to_string(),
            amount: Decimal::new(1010, 2),
            account_id: 5,
            created_at,
        };

        let payment = Payment::try_from(row).unwrap();

        assert_eq!(payment.id, PaymentId::new(7));
        assert_eq!(payment.transaction_id.as_str(), "tx-1");
        assert_eq!(payment.amount.to_string(), "10.10");
        assert_eq!(payment.created_at.as_datetime(), &created_at);
    }

    #[test]
    fn payment_row_rejects_blank_transaction_id() {
        let row = PaymentRow {
            id: 7,
            transaction_id: String::new(),
            amount: Decimal::new(100, 2),
            account_id: 5,
            created_at: Utc::now(),
        };

        assert!(Payment::try_from(row).is_err());
    }

    #[test]
    fn user_row_converts() {
        let row = UserRow {
            id: 1,
            email: "ada@example.com".to_string(),
            full_name: Some("Ada".to_string()),
            hashed_password: "hash".to_string(),
            is_admin: true,
        };

        let user = User::from(row);

        assert_eq!(user.id, UserId::new(1));
        assert!(user.is_admin);
    }

    #[test]
    fn non_database_errors_map_to_database_error_code() {
        let err = database_error("fetch account", sqlx::Error::RowNotFound);

        assert_eq!(err.code, ErrorCode::DatabaseError);
        assert!(err.message.starts_with("Failed to fetch account"));
    }
}
