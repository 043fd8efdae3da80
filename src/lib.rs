//! Payment Ledger - Webhook-driven account crediting
//!
//! This crate verifies signed payment-provider webhooks and credits user
//! accounts exactly once per provider transaction.

pub mod adapters;
pub mod application;
pub mod config;
pub mod domain;
pub mod ports;
