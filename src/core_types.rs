//! Core types used throughout the engine
//!
//! These are fundamental type aliases used by all modules.
//! They provide semantic meaning and enable future type evolution.

/// Account ID - globally unique identity of a participant.
///
/// # Constraints:
/// - **Immutable**: Once assigned, NEVER changes
/// - **Null identity**: `0` is reserved as the absent/null identity and is
///   never a valid sender or recipient
pub type AccountId = u64;

/// The reserved null identity. Rejected everywhere a real participant is
/// required.
pub const NULL_ACCOUNT: AccountId = 0;

/// Amount in smallest indivisible units (no fractional values).
///
/// All arithmetic on amounts is checked; overflow is a rejected operation,
/// never a wrap.
pub type Amount = u64;

/// Timestamp in milliseconds.
///
/// Supplied by the host [`Clock`](crate::ports::Clock). The engine never
/// reads the wall clock itself, so replays stay deterministic.
pub type TimestampMs = u64;

/// Duration in milliseconds, used for deadline windows.
pub type DurationMs = u64;

/// Scope ID - tags one ledger instance.
///
/// Mixed into every derived identifier so a token computed against one
/// instance cannot be replayed against another.
pub type ScopeId = u64;
