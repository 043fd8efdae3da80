//! PostgreSQL adapters - Database implementations for storage ports.
//!
//! This module provides adapters for PostgreSQL-backed persistence:
//! - `PostgresLedgerStore` - Transactional ledger storage
//! - `connect_pool` / `run_migrations` - Pool setup and schema management

mod ledger_store;
mod pool;

pub use ledger_store::{PostgresLedgerStore, PostgresLedgerTransaction};
pub use pool::{connect_pool, run_migrations};
