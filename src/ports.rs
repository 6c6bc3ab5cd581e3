//! Collaborator ports
//!
//! The engine's view of its host environment: a time source, the settlement
//! primitive that actually moves funds, and the admin/pause capability.
//! All three are injected as trait objects; the engine owns no ambient
//! authority of its own.

use crate::core_types::{AccountId, Amount, TimestampMs};
use crate::error::EscrowError;

/// Host-supplied time source.
///
/// The engine never reads the wall clock; whatever notion of "now" the host
/// trusts (e.g. a consensus timestamp) comes through here.
pub trait Clock: Send + Sync {
    fn now_ms(&self) -> TimestampMs;
}

/// External settlement primitive.
///
/// Invoked only AFTER the terminal state is committed. A failure here is
/// fatal for the call: the engine does not retry and does not reopen the
/// entry (see [`EscrowError::TransferFailed`]).
pub trait FundTransfer: Send + Sync {
    fn transfer_out(&self, to: AccountId, amount: Amount) -> Result<(), EscrowError>;
}

/// Admin and pause capability.
///
/// Checked at the start of every mutating operation; the flags are owned by
/// the host, not the engine.
pub trait AccessGuard: Send + Sync {
    fn is_paused(&self) -> bool;
    fn is_admin(&self, who: AccountId) -> bool;
}

/// Mock collaborators for tests and local runs.
#[cfg(feature = "mock-ports")]
pub mod mock {
    use super::*;
    use std::collections::HashSet;
    use std::sync::Mutex;
    use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};

    /// Settable clock
    pub struct MockClock {
        now: AtomicU64,
    }

    impl MockClock {
        pub fn new(now: TimestampMs) -> Self {
            Self {
                now: AtomicU64::new(now),
            }
        }

        pub fn set(&self, now: TimestampMs) {
            self.now.store(now, Ordering::SeqCst);
        }

        pub fn advance(&self, delta_ms: u64) {
            self.now.fetch_add(delta_ms, Ordering::SeqCst);
        }
    }

    impl Clock for MockClock {
        fn now_ms(&self) -> TimestampMs {
            self.now.load(Ordering::SeqCst)
        }
    }

    /// Records outbound transfers; can be told to fail.
    pub struct MockBank {
        transfers: Mutex<Vec<(AccountId, Amount)>>,
        fail_next: AtomicBool,
    }

    impl MockBank {
        pub fn new() -> Self {
            Self {
                transfers: Mutex::new(Vec::new()),
                fail_next: AtomicBool::new(false),
            }
        }

        pub fn set_fail_next(&self, fail: bool) {
            self.fail_next.store(fail, Ordering::SeqCst);
        }

        /// All transfers executed so far, in order
        pub fn transfers(&self) -> Vec<(AccountId, Amount)> {
            self.transfers.lock().unwrap().clone()
        }

        pub fn transfer_count(&self) -> usize {
            self.transfers.lock().unwrap().len()
        }

        /// Total paid out to one account
        pub fn paid_to(&self, who: AccountId) -> Amount {
            self.transfers
                .lock()
                .unwrap()
                .iter()
                .filter(|(to, _)| *to == who)
                .map(|(_, amount)| amount)
                .sum()
        }
    }

    impl Default for MockBank {
        fn default() -> Self {
            Self::new()
        }
    }

    impl FundTransfer for MockBank {
        fn transfer_out(&self, to: AccountId, amount: Amount) -> Result<(), EscrowError> {
            if self.fail_next.swap(false, Ordering::SeqCst) {
                return Err(EscrowError::TransferFailed("mock bank failure".into()));
            }
            self.transfers.lock().unwrap().push((to, amount));
            Ok(())
        }
    }

    /// Settable pause flag plus an admin set.
    pub struct MockGuard {
        paused: AtomicBool,
        admins: Mutex<HashSet<AccountId>>,
    }

    impl MockGuard {
        pub fn new(admin: AccountId) -> Self {
            let mut admins = HashSet::new();
            admins.insert(admin);
            Self {
                paused: AtomicBool::new(false),
                admins: Mutex::new(admins),
            }
        }

        pub fn set_paused(&self, paused: bool) {
            self.paused.store(paused, Ordering::SeqCst);
        }

        pub fn add_admin(&self, who: AccountId) {
            self.admins.lock().unwrap().insert(who);
        }
    }

    impl AccessGuard for MockGuard {
        fn is_paused(&self) -> bool {
            self.paused.load(Ordering::SeqCst)
        }

        fn is_admin(&self, who: AccountId) -> bool {
            self.admins.lock().unwrap().contains(&who)
        }
    }
}
