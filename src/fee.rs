//! Fee policy and accumulator
//!
//! One flat fee per transfer, deducted from the deposit at initiation and
//! accumulated separately from escrowed principal. The accumulator is
//! settled (returned and zeroed) by the administrator.

use crate::core_types::Amount;
use crate::error::EscrowError;

/// Per-transfer fee policy plus the accrued fee balance.
///
/// # Invariants:
/// - `accumulated` equals the sum of all fees ever charged minus fees
///   already settled
/// - `current_fee == 0` only when `allow_zero_fee` is configured
#[derive(Debug, Clone)]
pub struct FeePolicy {
    current_fee: Amount,
    accumulated: Amount,
    allow_zero_fee: bool,
}

impl FeePolicy {
    /// Create a policy with the initial fee.
    ///
    /// # Errors
    /// - `InvalidFee` if `fee == 0` and zero fees are not allowed
    pub fn new(fee: Amount, allow_zero_fee: bool) -> Result<Self, EscrowError> {
        if fee == 0 && !allow_zero_fee {
            return Err(EscrowError::InvalidFee);
        }
        Ok(Self {
            current_fee: fee,
            accumulated: 0,
            allow_zero_fee,
        })
    }

    /// Get the current per-transfer fee (read-only)
    #[inline]
    pub fn current_fee(&self) -> Amount {
        self.current_fee
    }

    /// Get the accrued, unsettled fee balance (read-only)
    #[inline]
    pub fn accumulated(&self) -> Amount {
        self.accumulated
    }

    /// Set a new per-transfer fee. Re-setting the same value is a no-op.
    ///
    /// # Errors
    /// - `InvalidFee` if `new_fee == 0` and zero fees are not allowed
    pub fn set_fee(&mut self, new_fee: Amount) -> Result<(), EscrowError> {
        if new_fee == 0 && !self.allow_zero_fee {
            return Err(EscrowError::InvalidFee);
        }
        self.current_fee = new_fee;
        Ok(())
    }

    /// Charge the fee against a deposited value.
    ///
    /// # Errors
    /// - `InsufficientValue` if `deposited <= current_fee` (the deposit must
    ///   strictly exceed the fee, never merely equal it)
    ///
    /// # Effects
    /// - Adds `current_fee` to the accumulated balance
    /// - Returns `(net, fee)` where `net + fee == deposited`
    pub fn charge(&mut self, deposited: Amount) -> Result<(Amount, Amount), EscrowError> {
        if deposited <= self.current_fee {
            return Err(EscrowError::InsufficientValue);
        }
        let fee = self.current_fee;
        // deposited > fee, so the subtraction cannot underflow
        let net = deposited - fee;
        self.accumulated = self
            .accumulated
            .checked_add(fee)
            .ok_or(EscrowError::InsufficientValue)?;
        Ok((net, fee))
    }

    /// Charge the fee capped at what is available.
    ///
    /// Used on the reclaim path when the double-charge policy is on: a fee
    /// raise after initiation must never strand the sender's funds, so the
    /// charge is `min(current_fee, available)`.
    ///
    /// # Effects
    /// - Adds the charged portion to the accumulated balance
    /// - Returns the fee actually charged
    pub fn charge_capped(&mut self, available: Amount) -> Result<Amount, EscrowError> {
        let fee = self.current_fee.min(available);
        self.accumulated = self
            .accumulated
            .checked_add(fee)
            .ok_or(EscrowError::InsufficientValue)?;
        Ok(fee)
    }

    /// Settle the accumulated balance: return it and zero the accumulator.
    ///
    /// # Errors
    /// - `NoBalance` if nothing has accrued
    pub fn settle(&mut self) -> Result<Amount, EscrowError> {
        if self.accumulated == 0 {
            return Err(EscrowError::NoBalance);
        }
        let settled = self.accumulated;
        self.accumulated = 0;
        Ok(settled)
    }
}
