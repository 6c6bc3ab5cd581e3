//! Events - domain events emitted by the escrow service
//!
//! Every committed mutation produces exactly one event carrying the full
//! set of fields it changed. Events are buffered inside the commit unit and
//! drained by the host for external indexing; they serialize with a `type`
//! tag for downstream consumers.

use serde::Serialize;

use crate::core_types::{AccountId, Amount, DurationMs, TimestampMs};
use crate::identifier::RemitId;

/// Domain events, one per committed mutation.
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum EscrowEvent {
    TransferCreated {
        id: RemitId,
        sender: AccountId,
        recipient: AccountId,
        amount: Amount,
        fee: Amount,
        deadline: TimestampMs,
    },

    TransferClaimed {
        id: RemitId,
        recipient: AccountId,
        amount: Amount,
    },

    TransferReclaimed {
        id: RemitId,
        sender: AccountId,
        amount: Amount,
        /// Fee charged on the reclaim path (zero unless the double-charge
        /// policy is on)
        fee: Amount,
    },

    FeesWithdrawn {
        admin: AccountId,
        amount: Amount,
    },

    FeeChanged {
        changed_by: AccountId,
        old_fee: Amount,
        new_fee: Amount,
    },

    DeadlineRangeChanged {
        changed_by: AccountId,
        old_range: (DurationMs, DurationMs),
        new_range: (DurationMs, DurationMs),
    },
}

impl EscrowEvent {
    /// Short event name for logs
    pub fn name(&self) -> &'static str {
        match self {
            EscrowEvent::TransferCreated { .. } => "transfer_created",
            EscrowEvent::TransferClaimed { .. } => "transfer_claimed",
            EscrowEvent::TransferReclaimed { .. } => "transfer_reclaimed",
            EscrowEvent::FeesWithdrawn { .. } => "fees_withdrawn",
            EscrowEvent::FeeChanged { .. } => "fee_changed",
            EscrowEvent::DeadlineRangeChanged { .. } => "deadline_range_changed",
        }
    }
}
