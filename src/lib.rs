//! remitlock - Hash-Locked Escrow Transfer Ledger
//!
//! A sender deposits value addressed to a recipient; the value sits in
//! custody until the recipient claims it with a shared secret, or the
//! sender reclaims it after a deadline. Funds are released to at most one
//! party, exactly once.
//!
//! # Modules
//!
//! - [`core_types`] - Core type aliases (AccountId, Amount, etc.)
//! - [`identifier`] - Hash-derived capability identifiers
//! - [`entry`] - Escrow entry record and lifecycle status
//! - [`fee`] - Fee policy and accumulator
//! - [`deadline`] - Deadline window policy
//! - [`ledger`] - TransferLedger, the authoritative entry state machine
//! - [`events`] - Domain events for external indexing
//! - [`ports`] - Collaborator traits (clock, settlement, access guard)
//! - [`service`] - EscrowService facade
//! - [`error`] - Typed error surface
//! - [`config`] / [`logging`] - host configuration and tracing setup

// Core types - must be first!
pub mod core_types;

// Engine components
pub mod deadline;
pub mod entry;
pub mod error;
pub mod events;
pub mod fee;
pub mod identifier;
pub mod ledger;
pub mod ports;
pub mod service;

// Host glue
pub mod config;
pub mod logging;

// Convenient re-exports at crate root
pub use core_types::{AccountId, Amount, DurationMs, NULL_ACCOUNT, ScopeId, TimestampMs};
pub use deadline::DeadlinePolicy;
pub use entry::{Entry, EntryStatus};
pub use error::EscrowError;
pub use events::EscrowEvent;
pub use fee::FeePolicy;
pub use identifier::{RemitId, Secret};
pub use ledger::TransferLedger;
pub use ports::{AccessGuard, Clock, FundTransfer};
pub use service::EscrowService;

pub use config::{AppConfig, EscrowConfig};
