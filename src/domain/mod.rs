//! Domain layer containing business logic and domain types.
//!
//! # Module Organization
//!
//! - `foundation` - Shared domain primitives (ids, money, timestamps, errors)
//! - `ledger` - Users, accounts, payments and webhook verification

pub mod foundation;
pub mod ledger;
