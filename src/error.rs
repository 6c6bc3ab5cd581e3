//! Escrow Error Types
//!
//! All failures surface as typed results; nothing crosses the API boundary
//! as a panic. Every validation error is raised BEFORE any state mutation.
//! The single post-commit failure is [`EscrowError::TransferFailed`].

use thiserror::Error;

/// Escrow error types
///
/// Error codes are stable strings for external indexing and API responses.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum EscrowError {
    // === Participant / identifier errors ===
    #[error("Participant identity is null")]
    InvalidParticipant,

    #[error("Recipient identity is null")]
    InvalidRecipient,

    #[error("Identifier already used by a previous remittance")]
    DuplicateIdentifier,

    #[error("Remittance not set")]
    NotFound,

    #[error("Remittance already claimed or reclaimed")]
    AlreadyClaimed,

    #[error("Caller does not match the stored participant")]
    AccountMismatch,

    #[error("Secret does not re-derive the stored identifier")]
    IdentifierMismatch,

    // === Value errors ===
    #[error("Deposited value must exceed the fee")]
    InsufficientValue,

    #[error("No fee balance accrued")]
    NoBalance,

    // === Deadline errors ===
    #[error("Requested duration outside the permitted window")]
    DeadlineOutOfRange,

    #[error("Deadline has not passed yet")]
    TooEarly,

    // === Admin / policy errors ===
    #[error("Caller is not the administrator")]
    Unauthorized,

    #[error("Zero fee is not a permitted configuration")]
    InvalidFee,

    #[error("Deadline range requires 0 < min <= max")]
    InvalidRange,

    // === Gate / collaborator errors ===
    #[error("Service is paused")]
    ServicePaused,

    #[error("Outbound fund transfer failed: {0}")]
    TransferFailed(String),
}

impl EscrowError {
    /// Get the stable error code for external consumers
    pub fn code(&self) -> &'static str {
        match self {
            EscrowError::InvalidParticipant => "INVALID_PARTICIPANT",
            EscrowError::InvalidRecipient => "INVALID_RECIPIENT",
            EscrowError::DuplicateIdentifier => "DUPLICATE_IDENTIFIER",
            EscrowError::NotFound => "NOT_FOUND",
            EscrowError::AlreadyClaimed => "ALREADY_CLAIMED",
            EscrowError::AccountMismatch => "ACCOUNT_MISMATCH",
            EscrowError::IdentifierMismatch => "IDENTIFIER_MISMATCH",
            EscrowError::InsufficientValue => "INSUFFICIENT_VALUE",
            EscrowError::NoBalance => "NO_BALANCE",
            EscrowError::DeadlineOutOfRange => "DEADLINE_OUT_OF_RANGE",
            EscrowError::TooEarly => "TOO_EARLY",
            EscrowError::Unauthorized => "UNAUTHORIZED",
            EscrowError::InvalidFee => "INVALID_FEE",
            EscrowError::InvalidRange => "INVALID_RANGE",
            EscrowError::ServicePaused => "SERVICE_PAUSED",
            EscrowError::TransferFailed(_) => "TRANSFER_FAILED",
        }
    }

    /// True for the one failure that occurs after the state commit.
    ///
    /// The entry is already closed when this is returned; recovery is a
    /// manual, administrative step. The engine never retries and never
    /// re-credits.
    #[inline]
    pub fn is_post_commit(&self) -> bool {
        matches!(self, EscrowError::TransferFailed(_))
    }
}
