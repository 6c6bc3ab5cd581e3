//! TransferLedger - authoritative escrow state
//!
//! The single-threaded core that owns ALL entries and enforces the
//! per-identifier state machine:
//!
//! ```text
//! Absent → Created → {Claimed | Reclaimed}   (terminal)
//! ```
//!
//! # Responsibilities
//!
//! 1. **Entry State Management** - in-memory entry map, exclusively owned
//! 2. **Uniqueness** - an identifier is accepted exactly once, ever
//! 3. **Release Guards** - secret re-derivation, identity and deadline checks
//!
//! # Thread Safety
//!
//! Designed for SINGLE-THREADED execution; every operation is a
//! read-modify-write on `&mut self`. The facade serializes access behind
//! one lock, which makes each transition naturally atomic.

use rustc_hash::FxHashMap;

use crate::core_types::{AccountId, Amount, ScopeId, TimestampMs};
use crate::entry::{Entry, EntryStatus};
use crate::error::EscrowError;
use crate::identifier::{RemitId, Secret};

/// TransferLedger - the mapping from identifier to entry.
///
/// All validation happens before any mutation: a rejected request leaves
/// the map and the escrowed total untouched.
pub struct TransferLedger {
    /// This instance's scope tag, bound into every verified identifier
    scope: ScopeId,
    /// Entries - the authoritative escrow state (terminal entries retained)
    entries: FxHashMap<RemitId, Entry>,
    /// Sum of principal across active entries
    escrowed_total: Amount,
}

impl TransferLedger {
    pub fn new(scope: ScopeId) -> Self {
        Self {
            scope,
            entries: FxHashMap::default(),
            escrowed_total: 0,
        }
    }

    /// Get the scope tag of this instance
    #[inline]
    pub fn scope(&self) -> ScopeId {
        self.scope
    }

    /// Sum of principal currently held in custody (read-only)
    #[inline]
    pub fn escrowed_total(&self) -> Amount {
        self.escrowed_total
    }

    /// Number of entries ever created, active and closed (read-only)
    #[inline]
    pub fn entry_count(&self) -> usize {
        self.entries.len()
    }

    /// Read-only lookup of an entry by identifier
    #[inline]
    pub fn get(&self, id: &RemitId) -> Option<&Entry> {
        self.entries.get(id)
    }

    /// Create an entry under `id`.
    ///
    /// # Errors
    /// - `DuplicateIdentifier` if `id` was ever used before. Closed entries
    ///   are retained precisely so this check also blocks replaying an old
    ///   identifier for a second, unrelated transfer.
    pub fn create(&mut self, id: RemitId, entry: Entry) -> Result<(), EscrowError> {
        if self.entries.contains_key(&id) {
            return Err(EscrowError::DuplicateIdentifier);
        }
        self.escrowed_total = self
            .escrowed_total
            .checked_add(entry.amount)
            .ok_or(EscrowError::InsufficientValue)?;
        self.entries.insert(id, entry);
        Ok(())
    }

    /// Close an entry as claimed by its recipient.
    ///
    /// Lookup-then-verify: the stored sender, the caller and the presented
    /// secret must re-derive exactly the identifier being claimed. This
    /// blocks replaying a known secret against a different identifier.
    ///
    /// # Errors
    /// In validation order: `NotFound`, `AlreadyClaimed`, `AccountMismatch`,
    /// `IdentifierMismatch`.
    ///
    /// # Effects
    /// - Status → `Claimed`, amount zeroed, escrowed total reduced
    /// - Returns the released amount
    pub fn close_claimed(
        &mut self,
        id: &RemitId,
        caller: AccountId,
        secret: &Secret,
    ) -> Result<Amount, EscrowError> {
        let (sender, _) = self.verify_open(id, caller, Party::Recipient)?;

        let expected = RemitId::derive(self.scope, sender, caller, secret)?;
        if expected != *id {
            return Err(EscrowError::IdentifierMismatch);
        }

        Ok(self.zero_out(id, EntryStatus::Claimed))
    }

    /// Close an entry as reclaimed by its sender after the deadline.
    ///
    /// # Errors
    /// In validation order: `NotFound`, `AlreadyClaimed`, `AccountMismatch`,
    /// `IdentifierMismatch`, `TooEarly` (when `now <= deadline`).
    ///
    /// # Effects
    /// - Status → `Reclaimed`, amount zeroed, escrowed total reduced
    /// - Returns the released amount
    pub fn close_reclaimed(
        &mut self,
        id: &RemitId,
        caller: AccountId,
        secret: &Secret,
        now: TimestampMs,
    ) -> Result<Amount, EscrowError> {
        let (_, recipient) = self.verify_open(id, caller, Party::Sender)?;

        let expected = RemitId::derive(self.scope, caller, recipient, secret)?;
        if expected != *id {
            return Err(EscrowError::IdentifierMismatch);
        }

        // Reclaim only strictly after expiry
        let deadline = self.entries[id].deadline;
        if now <= deadline {
            return Err(EscrowError::TooEarly);
        }

        Ok(self.zero_out(id, EntryStatus::Reclaimed))
    }

    /// Shared open-entry checks: existence, liveness, caller identity.
    /// Returns the stored participants for re-derivation.
    fn verify_open(
        &self,
        id: &RemitId,
        caller: AccountId,
        expected: Party,
    ) -> Result<(AccountId, AccountId), EscrowError> {
        let entry = self.entries.get(id).ok_or(EscrowError::NotFound)?;
        if entry.status.is_terminal() {
            return Err(EscrowError::AlreadyClaimed);
        }
        let required = match expected {
            Party::Sender => entry.sender,
            Party::Recipient => entry.recipient,
        };
        if caller != required {
            return Err(EscrowError::AccountMismatch);
        }
        Ok((entry.sender, entry.recipient))
    }

    /// Commit the terminal transition: zero the amount, keep the record.
    fn zero_out(&mut self, id: &RemitId, terminal: EntryStatus) -> Amount {
        let entry = self
            .entries
            .get_mut(id)
            .expect("verified open entry must exist");
        let released = entry.amount;
        entry.amount = 0;
        entry.status = terminal;
        // released was counted into the total at creation
        self.escrowed_total -= released;
        released
    }
}

#[derive(Clone, Copy)]
enum Party {
    Sender,
    Recipient,
}
