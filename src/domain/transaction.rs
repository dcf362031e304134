//! The normalized transaction row: engine input and annotated output.

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

use super::{
    Account, ChainId, Decimal, Effect, Instruction, Instrument, InstrumentKey, MatchId, OrderId,
    RowType, TransactionId,
};

/// One row of the normalized transaction table.
///
/// Rows arrive from upstream importers with `match_id`/`chain_id` unset;
/// the pipeline fills both and appends synthetic Mark/Expire rows. `Expire`
/// rows may arrive without `quantity`/`instruction`; those are resolved
/// against the inventory during matching.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Transaction {
    pub account: Account,
    pub transaction_id: TransactionId,
    pub datetime: NaiveDateTime,
    pub rowtype: RowType,
    pub order_id: Option<OrderId>,
    pub instrument: Instrument,
    pub effect: Effect,
    pub instruction: Option<Instruction>,
    /// Non-negative magnitude; the sign lives in `instruction`.
    pub quantity: Option<Decimal>,
    pub price: Decimal,
    /// Signed cash effect: buying costs cash (negative), selling credits it.
    pub cost: Decimal,
    pub commissions: Decimal,
    pub fees: Decimal,
    pub description: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub match_id: Option<MatchId>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub chain_id: Option<ChainId>,
}

impl Transaction {
    /// The inventory this row draws from.
    pub fn instrument_key(&self) -> InstrumentKey {
        InstrumentKey {
            account: self.account.clone(),
            instrument: self.instrument.clone(),
        }
    }

    /// Check an annotated row for conformance with the output contract.
    /// Returns the first violated condition.
    pub fn conformance_error(&self) -> Option<String> {
        if self.account.as_str().is_empty() {
            return Some("empty account".to_string());
        }
        if self.transaction_id.as_str().is_empty() {
            return Some("empty transaction id".to_string());
        }
        if let Some(order_id) = &self.order_id {
            if order_id.as_str().is_empty() {
                return Some("empty order id".to_string());
            }
        }
        let quantity = match self.quantity {
            Some(quantity) => quantity,
            None => return Some("unresolved quantity".to_string()),
        };
        if quantity.is_negative() {
            return Some("negative quantity magnitude".to_string());
        }
        if self.instruction.is_none() {
            return Some("unresolved instruction".to_string());
        }
        // The one legitimate unmatched row: an expiration reported against
        // an inventory with no recorded position.
        let vacuous_expire = self.rowtype == RowType::Expire && quantity.is_zero();
        if self.match_id.is_none() && !vacuous_expire {
            return Some("missing match id".to_string());
        }
        if self.chain_id.is_none() {
            return Some("missing chain id".to_string());
        }
        None
    }
}
