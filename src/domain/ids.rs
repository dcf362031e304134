//! Content-derived match and chain identifiers.
//!
//! Both ids are a pure function of a transaction id: the first four bytes of
//! its SHA-256 digest, hex encoded. Deriving from content instead of from a
//! counter keeps assignments stable when unrelated rows are added to or
//! removed from the input.

use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use std::fmt;

use super::TransactionId;

/// Label shared by all transactions that filled against each other while one
/// inventory stayed continuously non-empty. Rendered with a "&" prefix to
/// keep it visually distinct from transaction and chain ids.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct MatchId(pub String);

impl MatchId {
    /// Mint the match id keyed off the transaction that opened the position.
    pub fn from_opening(transaction_id: &TransactionId) -> Self {
        MatchId(format!("&{}", digest_prefix(transaction_id.as_str())))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for MatchId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Chain (episode) identifier, derived from the earliest transaction in the
/// connected component.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct ChainId(pub String);

impl ChainId {
    pub fn from_earliest(transaction_id: &TransactionId) -> Self {
        ChainId(digest_prefix(transaction_id.as_str()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ChainId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// First 4 digest bytes as 8 hex chars.
fn digest_prefix(input: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(input.as_bytes());
    let digest = hasher.finalize();
    hex::encode(&digest[..4])
}
