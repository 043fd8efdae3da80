//! Ports - Interfaces for external dependencies.
//!
//! Following hexagonal architecture, ports define the contracts between
//! the domain and the outside world. Adapters implement these ports.
//!
//! ## Storage Ports
//!
//! - `LedgerStore` - Opens ledger transactions
//! - `LedgerTransaction` - Unit of work with atomic balance credit
//! - `EntityStore` - Generic find/create/update/delete per entity

mod ledger_store;

pub use ledger_store::{Entity, EntityStore, LedgerStore, LedgerTransaction};
