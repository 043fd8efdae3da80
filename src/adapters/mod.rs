//! Adapters - Implementations of port interfaces.
//!
//! Adapters connect the domain to external systems:
//! - `http` - axum router for webhooks and liveness
//! - `memory` - In-memory ledger store for tests and local runs
//! - `postgres` - PostgreSQL ledger store (sqlx)

pub mod http;
pub mod memory;
pub mod postgres;

pub use memory::InMemoryLedgerStore;
pub use postgres::PostgresLedgerStore;
