//! EscrowService - the facade over ledger, fee and deadline policy
//!
//! The only component with externally visible side effects: it emits domain
//! events and invokes the settlement primitive. Everything mutable (ledger,
//! fee accumulator, deadline window, event buffer) lives behind ONE mutex,
//! so a state transition and its paired event emission commit as a single
//! atomic unit.
//!
//! # Ordering
//!
//! ```text
//! gate → validate → mutate + emit (locked) → transfer_out (unlocked)
//! ```
//!
//! The terminal state is committed BEFORE the outbound transfer is invoked.
//! A re-entrant or duplicate release attempt therefore observes the closed
//! entry and fails; a failed outbound transfer propagates as
//! `TransferFailed` without reopening the entry.

use std::sync::{Arc, Mutex};
use tracing::{error, info, warn};

use crate::config::EscrowConfig;
use crate::core_types::{AccountId, Amount, DurationMs, NULL_ACCOUNT, TimestampMs};
use crate::deadline::DeadlinePolicy;
use crate::entry::Entry;
use crate::error::EscrowError;
use crate::events::EscrowEvent;
use crate::fee::FeePolicy;
use crate::identifier::{RemitId, Secret};
use crate::ledger::TransferLedger;
use crate::ports::{AccessGuard, Clock, FundTransfer};

/// Mutable engine state - guarded by the service's single mutex.
struct EngineState {
    ledger: TransferLedger,
    fees: FeePolicy,
    deadlines: DeadlinePolicy,
    events: Vec<EscrowEvent>,
}

/// EscrowService - initiate / claim / reclaim plus the admin surface.
pub struct EscrowService {
    state: Mutex<EngineState>,
    guard: Arc<dyn AccessGuard>,
    bank: Arc<dyn FundTransfer>,
    clock: Arc<dyn Clock>,
    charge_fee_on_reclaim: bool,
    queries_while_paused: bool,
}

impl EscrowService {
    /// Create a service from policy configuration and collaborator handles.
    ///
    /// # Errors
    /// - `InvalidFee` / `InvalidRange` if the configured policy values are
    ///   themselves invalid
    pub fn new(
        config: &EscrowConfig,
        guard: Arc<dyn AccessGuard>,
        bank: Arc<dyn FundTransfer>,
        clock: Arc<dyn Clock>,
    ) -> Result<Self, EscrowError> {
        let state = EngineState {
            ledger: TransferLedger::new(config.scope),
            fees: FeePolicy::new(config.fee, config.allow_zero_fee)?,
            deadlines: DeadlinePolicy::new(config.min_duration_ms, config.max_duration_ms)?,
            events: Vec::new(),
        };
        Ok(Self {
            state: Mutex::new(state),
            guard,
            bank,
            clock,
            charge_fee_on_reclaim: config.charge_fee_on_reclaim,
            queries_while_paused: config.queries_while_paused,
        })
    }

    // ============================================================
    // TRANSFER LIFECYCLE
    // ============================================================

    /// Accept a deposit into escrow under a caller-supplied identifier.
    ///
    /// The sender computes `id` off-ledger via [`RemitId::derive`], so the
    /// secret never reaches the ledger at initiation time. The deposit
    /// itself arrives with this call (transfer-in is atomic with
    /// initiation); no outbound transfer happens here.
    ///
    /// # Errors
    /// `ServicePaused`, `InvalidRecipient`, `InvalidParticipant`,
    /// `DuplicateIdentifier`, `InsufficientValue`, `DeadlineOutOfRange`.
    pub fn initiate(
        &self,
        caller: AccountId,
        id: RemitId,
        recipient: AccountId,
        deposited: Amount,
        duration: DurationMs,
    ) -> Result<(), EscrowError> {
        self.gate_mutation()?;
        if recipient == NULL_ACCOUNT {
            return Err(EscrowError::InvalidRecipient);
        }
        if caller == NULL_ACCOUNT {
            return Err(EscrowError::InvalidParticipant);
        }

        let now = self.clock.now_ms();
        let mut state = self.state.lock().unwrap();

        // All checks precede the first mutation.
        if state.ledger.get(&id).is_some() {
            return Err(EscrowError::DuplicateIdentifier);
        }
        if deposited <= state.fees.current_fee() {
            return Err(EscrowError::InsufficientValue);
        }
        let deadline = state.deadlines.validate(now, duration)?;

        let (amount, fee) = state.fees.charge(deposited)?;
        state
            .ledger
            .create(id, Entry::new(caller, recipient, amount, fee, deadline, now))?;

        state.events.push(EscrowEvent::TransferCreated {
            id,
            sender: caller,
            recipient,
            amount,
            fee,
            deadline,
        });
        info!(
            id = %id,
            sender = caller,
            recipient,
            amount,
            fee,
            deadline,
            "Escrow created"
        );
        Ok(())
    }

    /// Release escrowed funds to the recipient.
    ///
    /// The caller proves knowledge of the secret by re-derivation
    /// (lookup-then-verify, see [`TransferLedger::close_claimed`]).
    ///
    /// # Errors
    /// `ServicePaused`, `NotFound`, `AlreadyClaimed`, `AccountMismatch`,
    /// `IdentifierMismatch`; `TransferFailed` after the commit if the
    /// settlement primitive rejects the payout.
    pub fn claim(
        &self,
        caller: AccountId,
        id: RemitId,
        secret: &Secret,
    ) -> Result<Amount, EscrowError> {
        self.gate_mutation()?;

        let amount = {
            let mut state = self.state.lock().unwrap();
            let amount = state.ledger.close_claimed(&id, caller, secret)?;
            state.events.push(EscrowEvent::TransferClaimed {
                id,
                recipient: caller,
                amount,
            });
            info!(id = %id, recipient = caller, amount, "Escrow claimed");
            amount
        };

        // Terminal state is durably committed; the payout happens outside
        // the lock and cannot be rolled back into the ledger.
        self.pay_out(caller, amount, &id)?;
        Ok(amount)
    }

    /// Return escrowed funds to the sender after the deadline.
    ///
    /// When the reclaim-fee policy is on, the current fee is charged again,
    /// capped at the remaining amount so a fee raise can never strand the
    /// funds.
    ///
    /// # Errors
    /// `ServicePaused`, `NotFound`, `AlreadyClaimed`, `AccountMismatch`,
    /// `IdentifierMismatch`, `TooEarly`; `TransferFailed` after the commit.
    pub fn reclaim(
        &self,
        caller: AccountId,
        id: RemitId,
        secret: &Secret,
    ) -> Result<Amount, EscrowError> {
        self.gate_mutation()?;

        let now = self.clock.now_ms();
        let refund = {
            let mut state = self.state.lock().unwrap();
            let amount = state.ledger.close_reclaimed(&id, caller, secret, now)?;
            let fee = if self.charge_fee_on_reclaim {
                state.fees.charge_capped(amount)?
            } else {
                0
            };
            // amount >= fee by construction of charge_capped
            let refund = amount - fee;
            state.events.push(EscrowEvent::TransferReclaimed {
                id,
                sender: caller,
                amount: refund,
                fee,
            });
            info!(id = %id, sender = caller, refund, fee, "Escrow reclaimed");
            refund
        };

        if refund == 0 {
            // Entire remainder went to the reclaim fee; nothing to move.
            warn!(id = %id, sender = caller, "Reclaim refund fully consumed by fee");
            return Ok(0);
        }
        self.pay_out(caller, refund, &id)?;
        Ok(refund)
    }

    // ============================================================
    // ADMIN SURFACE
    // ============================================================

    /// Settle the accrued fee balance and pay it to the administrator.
    ///
    /// # Errors
    /// `ServicePaused`, `Unauthorized`, `NoBalance`; `TransferFailed`
    /// after the commit.
    pub fn withdraw_fees(&self, caller: AccountId) -> Result<Amount, EscrowError> {
        self.gate_mutation()?;
        self.gate_admin(caller)?;

        let amount = {
            let mut state = self.state.lock().unwrap();
            let amount = state.fees.settle()?;
            state.events.push(EscrowEvent::FeesWithdrawn {
                admin: caller,
                amount,
            });
            info!(admin = caller, amount, "Fees withdrawn");
            amount
        };

        self.pay_out_fees(caller, amount)?;
        Ok(amount)
    }

    /// Change the per-transfer fee.
    ///
    /// # Errors
    /// `ServicePaused`, `Unauthorized`, `InvalidFee`.
    pub fn set_fee(&self, caller: AccountId, new_fee: Amount) -> Result<(), EscrowError> {
        self.gate_mutation()?;
        self.gate_admin(caller)?;

        let mut state = self.state.lock().unwrap();
        let old_fee = state.fees.current_fee();
        state.fees.set_fee(new_fee)?;
        state.events.push(EscrowEvent::FeeChanged {
            changed_by: caller,
            old_fee,
            new_fee,
        });
        info!(changed_by = caller, old_fee, new_fee, "Fee changed");
        Ok(())
    }

    /// Change the permitted deadline window.
    ///
    /// # Errors
    /// `ServicePaused`, `Unauthorized`, `InvalidRange`.
    pub fn set_deadline_range(
        &self,
        caller: AccountId,
        min: DurationMs,
        max: DurationMs,
    ) -> Result<(), EscrowError> {
        self.gate_mutation()?;
        self.gate_admin(caller)?;

        let mut state = self.state.lock().unwrap();
        let old_range = state.deadlines.range();
        state.deadlines.set_range(min, max)?;
        state.events.push(EscrowEvent::DeadlineRangeChanged {
            changed_by: caller,
            old_range,
            new_range: (min, max),
        });
        info!(
            changed_by = caller,
            old_min = old_range.0,
            old_max = old_range.1,
            new_min = min,
            new_max = max,
            "Deadline range changed"
        );
        Ok(())
    }

    // ============================================================
    // QUERY SURFACE
    // ============================================================

    /// Look up an entry by identifier
    pub fn entry(&self, id: &RemitId) -> Result<Option<Entry>, EscrowError> {
        self.gate_query()?;
        Ok(self.state.lock().unwrap().ledger.get(id).cloned())
    }

    /// Current per-transfer fee
    pub fn current_fee(&self) -> Result<Amount, EscrowError> {
        self.gate_query()?;
        Ok(self.state.lock().unwrap().fees.current_fee())
    }

    /// Accrued, unsettled fee balance
    pub fn fee_balance(&self) -> Result<Amount, EscrowError> {
        self.gate_query()?;
        Ok(self.state.lock().unwrap().fees.accumulated())
    }

    /// Permitted deadline window
    pub fn deadline_range(&self) -> Result<(DurationMs, DurationMs), EscrowError> {
        self.gate_query()?;
        Ok(self.state.lock().unwrap().deadlines.range())
    }

    /// Sum of principal currently in custody
    pub fn escrowed_total(&self) -> Result<Amount, EscrowError> {
        self.gate_query()?;
        Ok(self.state.lock().unwrap().ledger.escrowed_total())
    }

    /// Current ledger time as seen by the engine
    pub fn now_ms(&self) -> TimestampMs {
        self.clock.now_ms()
    }

    /// Take all buffered domain events (outbox drain for external indexing)
    pub fn drain_events(&self) -> Vec<EscrowEvent> {
        std::mem::take(&mut self.state.lock().unwrap().events)
    }

    // ============================================================
    // GATES & SETTLEMENT
    // ============================================================

    fn gate_mutation(&self) -> Result<(), EscrowError> {
        if self.guard.is_paused() {
            return Err(EscrowError::ServicePaused);
        }
        Ok(())
    }

    fn gate_query(&self) -> Result<(), EscrowError> {
        if !self.queries_while_paused && self.guard.is_paused() {
            return Err(EscrowError::ServicePaused);
        }
        Ok(())
    }

    fn gate_admin(&self, caller: AccountId) -> Result<(), EscrowError> {
        if !self.guard.is_admin(caller) {
            return Err(EscrowError::Unauthorized);
        }
        Ok(())
    }

    /// Outbound payout for a closed entry. Runs strictly after the commit;
    /// a failure is surfaced for manual recovery, never auto-reverted.
    fn pay_out(&self, to: AccountId, amount: Amount, id: &RemitId) -> Result<(), EscrowError> {
        self.bank.transfer_out(to, amount).map_err(|e| {
            error!(
                id = %id,
                to,
                amount,
                error = %e,
                "Outbound transfer failed AFTER state commit; manual recovery required"
            );
            e
        })
    }

    fn pay_out_fees(&self, to: AccountId, amount: Amount) -> Result<(), EscrowError> {
        self.bank.transfer_out(to, amount).map_err(|e| {
            error!(
                to,
                amount,
                error = %e,
                "Fee payout failed AFTER settlement; manual recovery required"
            );
            e
        })
    }
}
