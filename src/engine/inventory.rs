//! FIFO lot inventory for a single instrument key.
//!
//! Lots are consumed oldest first, partial reductions split the front lot,
//! and a reduction larger than the whole position crosses over: the
//! remainder opens a new lot in the opposite direction within the same
//! call. No quantity imbalance is ever an error here; callers own the
//! time-ordering precondition.

use std::collections::VecDeque;

use crate::domain::{Decimal, MatchId, TransactionId};

use super::{MatchResult, Position};

/// A quantity acquired at one cost basis. Owned by exactly one inventory;
/// created on augmentation, split or removed on reduction.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Lot {
    /// Signed quantity; every lot in an inventory shares one sign.
    pub quantity: Decimal,
    /// Unit cost basis (always positive).
    pub basis: Decimal,
}

/// Per-instrument ledger of open lots plus the match id being assigned.
///
/// The match id is minted the instant the inventory goes non-empty and
/// cleared the instant it returns to empty, so all rows that filled against
/// each other during one continuously-open position share it. A crossing
/// reduction leaves the lot sequence non-empty and therefore keeps the same
/// id across the flip; that linkage is intentional (the crossing trade
/// belongs to both sides of the flip).
#[derive(Debug, Default)]
pub struct FifoInventory {
    lots: VecDeque<Lot>,
    match_id: Option<MatchId>,
}

impl FifoInventory {
    pub fn new() -> Self {
        Self::default()
    }

    /// Apply a signed quantity change at the given unit cost.
    ///
    /// Same-sign changes append a lot; opposite-sign changes consume lots
    /// oldest-first and report the magnitude and basis actually consumed.
    /// A remainder past the last lot reopens in the opposite direction.
    pub fn apply(
        &mut self,
        quantity: Decimal,
        cost: Decimal,
        transaction_id: &TransactionId,
    ) -> MatchResult {
        if self.match_id.is_none() {
            self.match_id = Some(MatchId::from_opening(transaction_id));
        }

        let mut matched = Decimal::ZERO;
        let mut basis = Decimal::ZERO;

        if self.lots.is_empty() {
            self.lots.push_back(Lot { quantity, basis: cost });
        } else {
            let sign = if self.lots[0].quantity.is_negative() { -1 } else { 1 };
            if !(quantity * sign).is_negative() {
                // Augmentation.
                self.lots.push_back(Lot { quantity, basis: cost });
            } else {
                // Reduction; `remaining` is a positive magnitude.
                let mut remaining = quantity * -sign;
                while remaining.is_positive() {
                    let Some(lot) = self.lots.pop_front() else {
                        break;
                    };
                    let lot_units = lot.quantity * sign;
                    let lot_matched = lot_units.min(remaining);
                    matched += lot_matched;
                    basis += lot_matched * lot.basis;
                    remaining -= lot_matched;

                    if lot_matched < lot_units {
                        // Partial match; reinsert the remainder at the front.
                        self.lots.push_front(Lot {
                            quantity: lot.quantity - lot_matched * sign,
                            basis: lot.basis,
                        });
                        break;
                    }
                }

                // Crossing over: the unmatched remainder opens the opposite way.
                if !remaining.is_zero() {
                    self.lots.push_back(Lot {
                        quantity: remaining * -sign,
                        basis: cost,
                    });
                }
            }
        }

        let match_id = self.match_id.clone();
        if self.lots.is_empty() {
            self.match_id = None;
        }

        MatchResult {
            matched_quantity: matched,
            matched_basis: basis,
            match_id,
        }
    }

    /// Force-close the whole position at its recorded basis.
    ///
    /// Returns the closed quantity and basis signed by the position's
    /// direction, under the current match id. Mints an id first if the
    /// position was built without one recorded (logs that omit the opening
    /// transaction). Empty inventory is a no-op with no id.
    pub fn expire(&mut self, transaction_id: &TransactionId) -> MatchResult {
        if self.lots.is_empty() {
            return MatchResult::empty();
        }

        let mut quantity = Decimal::ZERO;
        let mut basis = Decimal::ZERO;
        for lot in &self.lots {
            quantity += lot.quantity;
            basis += lot.quantity * lot.basis;
        }
        self.lots.clear();

        let match_id = self
            .match_id
            .take()
            .or_else(|| Some(MatchId::from_opening(transaction_id)));

        MatchResult {
            matched_quantity: quantity,
            matched_basis: basis,
            match_id,
        }
    }

    /// Residual net quantity, basis magnitude, and current match id.
    pub fn position(&self) -> Position {
        let mut quantity = Decimal::ZERO;
        let mut basis = Decimal::ZERO;
        for lot in &self.lots {
            quantity += lot.quantity;
            basis += lot.quantity.abs() * lot.basis;
        }
        Position {
            quantity,
            basis,
            match_id: self.match_id.clone(),
        }
    }
}
