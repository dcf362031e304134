//! Pure computation engines for matching and chain grouping.

use crate::domain::{Decimal, MatchId};

pub mod chains;
pub mod inventory;
pub mod matcher;

pub use chains::chain_transactions;
pub use inventory::{FifoInventory, Lot};
pub use matcher::{match_transactions, MatchConfig};

/// Outcome of applying one change (or expiration) to an inventory.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MatchResult {
    /// Units consumed from pre-existing lots. Positive magnitude for
    /// `apply`, signed by the closed position's direction for `expire`,
    /// zero for a pure augmentation or a pure new open.
    pub matched_quantity: Decimal,
    /// Cost basis of the consumed units, with the same sign convention as
    /// `matched_quantity`.
    pub matched_basis: Decimal,
    /// The id to stamp on the row; None only when expiring an inventory
    /// that was already empty.
    pub match_id: Option<MatchId>,
}

impl MatchResult {
    pub fn empty() -> Self {
        MatchResult {
            matched_quantity: Decimal::ZERO,
            matched_basis: Decimal::ZERO,
            match_id: None,
        }
    }
}

/// Read-only view of an inventory's residual state.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Position {
    /// Signed net quantity; positive long, negative short.
    pub quantity: Decimal,
    /// Positive cost-basis magnitude of the open lots.
    pub basis: Decimal,
    /// Current match id, None when flat.
    pub match_id: Option<MatchId>,
}
