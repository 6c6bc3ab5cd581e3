//! Escrow entry and its lifecycle status
//!
//! One [`Entry`] exists per active or historical transfer. Terminal entries
//! are retained forever with a zeroed amount; absence ("never existed") is
//! a lookup miss, never a status value.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::core_types::{AccountId, Amount, TimestampMs};

/// Entry lifecycle status
///
/// Transitions: `Created → {Claimed | Reclaimed}` (terminal).
/// A terminal entry is never mutated again and never deleted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EntryStatus {
    /// Funds are in custody, waiting for a claim or the deadline
    Created,

    /// Terminal: released to the recipient
    Claimed,

    /// Terminal: returned to the sender after the deadline
    Reclaimed,
}

impl EntryStatus {
    /// Check if this is a terminal status (no more transitions possible)
    #[inline]
    pub fn is_terminal(&self) -> bool {
        matches!(self, EntryStatus::Claimed | EntryStatus::Reclaimed)
    }

    /// Get human-readable status name
    pub fn as_str(&self) -> &'static str {
        match self {
            EntryStatus::Created => "CREATED",
            EntryStatus::Claimed => "CLAIMED",
            EntryStatus::Reclaimed => "RECLAIMED",
        }
    }
}

impl fmt::Display for EntryStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// One escrowed transfer record.
///
/// `amount` is the principal net of fee. On close it drops to zero while
/// `sender`, `recipient`, `fee` and `deadline` are retained for audit, so
/// the identifier can never be silently reused for a second transfer.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Entry {
    pub sender: AccountId,
    pub recipient: AccountId,
    pub amount: Amount,
    pub fee: Amount,
    pub deadline: TimestampMs,
    pub created_at: TimestampMs,
    pub status: EntryStatus,
}

impl Entry {
    pub fn new(
        sender: AccountId,
        recipient: AccountId,
        amount: Amount,
        fee: Amount,
        deadline: TimestampMs,
        created_at: TimestampMs,
    ) -> Self {
        Self {
            sender,
            recipient,
            amount,
            fee,
            deadline,
            created_at,
            status: EntryStatus::Created,
        }
    }
}
