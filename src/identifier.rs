//! Remittance identifier derivation
//!
//! A [`RemitId`] is a hash-derived capability token: whoever can compute it
//! (knowing both identities and the secret) can reference the entry. The
//! derivation is SHA-256 over a fixed-width encoding, so the token is
//! deterministic, collision-resistant and one-way.
//!
//! Equality on [`RemitId`] is constant time over the full 32 bytes. Code
//! must never branch on partial byte content of an identifier.

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use sha2::{Digest, Sha256};
use std::fmt;
use std::str::FromStr;
use subtle::ConstantTimeEq;

use crate::core_types::{AccountId, NULL_ACCOUNT, ScopeId};
use crate::error::EscrowError;

/// Domain separation prefix. Keeps these digests disjoint from any other
/// SHA-256 use the host may have.
const DERIVE_TAG: &[u8] = b"remitlock.id.v1";

/// Shared secret presented at claim/reclaim time.
///
/// Opaque 32 bytes. The engine never stores a secret; it only ever hashes
/// one to check it against a stored identifier.
#[derive(Clone, Copy)]
pub struct Secret([u8; 32]);

impl Secret {
    pub const LEN: usize = 32;

    #[inline]
    pub fn from_bytes(bytes: [u8; 32]) -> Self {
        Secret(bytes)
    }

    #[inline]
    pub fn as_bytes(&self) -> &[u8; 32] {
        &self.0
    }
}

// Secrets must not leak through debug output.
impl fmt::Debug for Secret {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Secret(..)")
    }
}

/// Remittance identifier - fixed-width, hash-derived capability token.
#[derive(Clone, Copy)]
pub struct RemitId([u8; 32]);

impl RemitId {
    pub const LEN: usize = 32;

    /// Derive the identifier for `(scope, sender, recipient, secret)`.
    ///
    /// Encoding is fixed: tag, then big-endian scope, sender, recipient,
    /// then the raw secret bytes. All fields are fixed width, so no field
    /// can bleed into its neighbor.
    ///
    /// # Errors
    /// - `InvalidParticipant` if `sender` or `recipient` is the null identity
    pub fn derive(
        scope: ScopeId,
        sender: AccountId,
        recipient: AccountId,
        secret: &Secret,
    ) -> Result<Self, EscrowError> {
        if sender == NULL_ACCOUNT || recipient == NULL_ACCOUNT {
            return Err(EscrowError::InvalidParticipant);
        }

        let mut hasher = Sha256::new();
        hasher.update(DERIVE_TAG);
        hasher.update(scope.to_be_bytes());
        hasher.update(sender.to_be_bytes());
        hasher.update(recipient.to_be_bytes());
        hasher.update(secret.as_bytes());

        let out = hasher.finalize();
        let mut id = [0u8; 32];
        id.copy_from_slice(&out);
        Ok(RemitId(id))
    }

    #[inline]
    pub fn from_bytes(bytes: [u8; 32]) -> Self {
        RemitId(bytes)
    }

    #[inline]
    pub fn as_bytes(&self) -> &[u8; 32] {
        &self.0
    }
}

impl PartialEq for RemitId {
    /// Constant-time comparison over all 32 bytes (no early exit).
    fn eq(&self, other: &Self) -> bool {
        self.0.ct_eq(&other.0).into()
    }
}

impl Eq for RemitId {}

// Hash over the raw bytes; consistent with the byte-wise equality above.
impl std::hash::Hash for RemitId {
    fn hash<H: std::hash::Hasher>(&self, state: &mut H) {
        self.0.hash(state);
    }
}

// Serialize as the hex form so events and query payloads stay readable.
impl Serialize for RemitId {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&hex::encode(self.0))
    }
}

impl<'de> Deserialize<'de> for RemitId {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        s.parse().map_err(serde::de::Error::custom)
    }
}

impl fmt::Display for RemitId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", hex::encode(self.0))
    }
}

impl fmt::Debug for RemitId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "RemitId({})", hex::encode(self.0))
    }
}

impl FromStr for RemitId {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let raw = hex::decode(s).map_err(|e| format!("Invalid identifier hex: {}", e))?;
        let bytes: [u8; 32] = raw
            .try_into()
            .map_err(|_| format!("Identifier must be {} bytes", Self::LEN))?;
        Ok(RemitId(bytes))
    }
}
