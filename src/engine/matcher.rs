//! Match orchestration: stream the transaction table through per-key
//! inventories, resolve expirations, and close out whatever is left open.

use std::collections::BTreeMap;

use chrono::{Duration, NaiveDateTime};

use crate::domain::{
    Decimal, Effect, Instruction, InstrumentKey, RowType, Transaction, TransactionId,
    TxnOrderingKey,
};
use crate::error::{EngineError, StructuralError, ValidationError};

use super::inventory::FifoInventory;

/// The only externally tunable knobs: the "now" used for mark synthesis and
/// the slack allowed before a past expiration is considered missing from
/// the log. `now` is threaded explicitly so repeated runs reproduce output.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MatchConfig {
    pub now: NaiveDateTime,
    pub grace_days: i64,
}

impl MatchConfig {
    pub const DEFAULT_GRACE_DAYS: i64 = 2;

    pub fn new(now: NaiveDateTime) -> Self {
        MatchConfig {
            now,
            grace_days: Self::DEFAULT_GRACE_DAYS,
        }
    }
}

/// Run the matching phase over a full transaction table.
///
/// Rows are annotated with match ids in their original order; synthetic
/// closing rows (Mark for live positions, Expire for positions past their
/// expiration with no closing event in the log) are appended at the end.
pub fn match_transactions(
    mut rows: Vec<Transaction>,
    config: &MatchConfig,
) -> Result<Vec<Transaction>, EngineError> {
    check_time_monotonic(&rows)?;

    // Arena of inventories, one per key, keyed deterministically.
    let mut inventories: BTreeMap<InstrumentKey, FifoInventory> = BTreeMap::new();

    for index in partition_order(&rows) {
        let row = &mut rows[index];
        let inventory = inventories.entry(row.instrument_key()).or_default();
        match row.rowtype {
            RowType::Trade => apply_trade(inventory, row)?,
            RowType::Expire => apply_expire(inventory, row)?,
            RowType::Mark => {
                return Err(ValidationError::Conformance {
                    transaction_id: row.transaction_id.clone(),
                    reason: "Mark rows are synthesized, not accepted as input".to_string(),
                }
                .into())
            }
        }
    }

    rows.extend(synthesize_closing_rows(&inventories, config));
    Ok(rows)
}

/// Cheap precondition check: the incoming table must be sorted by time.
fn check_time_monotonic(rows: &[Transaction]) -> Result<(), StructuralError> {
    for pair in rows.windows(2) {
        if pair[1].datetime < pair[0].datetime {
            return Err(StructuralError::UnsortedInput {
                transaction_id: pair[1].transaction_id.clone(),
            });
        }
    }
    Ok(())
}

/// Index order that visits rows partition by partition, each partition in
/// canonical (datetime, transaction_id) order. Partitions themselves are
/// visited in key order; inventories never interact, so only the intra-key
/// order is semantically meaningful.
fn partition_order(rows: &[Transaction]) -> Vec<usize> {
    let mut partitions: BTreeMap<InstrumentKey, Vec<usize>> = BTreeMap::new();
    for (index, row) in rows.iter().enumerate() {
        partitions.entry(row.instrument_key()).or_default().push(index);
    }
    let mut order = Vec::with_capacity(rows.len());
    for mut indices in partitions.into_values() {
        indices.sort_by(|&a, &b| TxnOrderingKey::of(&rows[a]).cmp(&TxnOrderingKey::of(&rows[b])));
        order.extend(indices);
    }
    order
}

fn apply_trade(inventory: &mut FifoInventory, row: &mut Transaction) -> Result<(), EngineError> {
    let instruction = row.instruction.ok_or_else(|| ValidationError::Conformance {
        transaction_id: row.transaction_id.clone(),
        reason: "Trade row without an instruction".to_string(),
    })?;
    let quantity = row.quantity.ok_or_else(|| ValidationError::Conformance {
        transaction_id: row.transaction_id.clone(),
        reason: "Trade row without a quantity".to_string(),
    })?;

    if row.effect == Effect::Closing && inventory.position().quantity.is_zero() {
        // Usually means the opening transaction is missing upstream.
        tracing::warn!(
            transaction_id = %row.transaction_id,
            symbol = %row.instrument.symbol(),
            "closing trade against an empty inventory"
        );
    }

    let signed_quantity = quantity * instruction.sign();
    let unit_basis = row.instrument.multiplier * row.price;
    let result = inventory.apply(signed_quantity, unit_basis, &row.transaction_id);
    row.match_id = result.match_id;
    Ok(())
}

fn apply_expire(inventory: &mut FifoInventory, row: &mut Transaction) -> Result<(), EngineError> {
    let result = inventory.expire(&row.transaction_id);
    let resolved = result.matched_quantity;

    if resolved.is_zero() {
        tracing::warn!(
            transaction_id = %row.transaction_id,
            symbol = %row.instrument.symbol(),
            "expiration against an empty inventory"
        );
    }

    // An explicitly stated magnitude must agree with what the lots resolve
    // to; disagreement indicates importer drift, not something to paper over.
    if let Some(stated) = row.quantity {
        if !stated.is_zero() && stated != resolved.abs() {
            return Err(ValidationError::ExpireQuantityMismatch {
                transaction_id: row.transaction_id.clone(),
                stated,
                resolved: resolved.abs(),
            }
            .into());
        }
    }

    row.quantity = Some(resolved.abs());
    if row.instruction.is_none() {
        row.instruction = Some(if resolved.is_negative() {
            Instruction::Buy
        } else if resolved.is_positive() {
            Instruction::Sell
        } else {
            // Vacuous expiration; direction is moot.
            Instruction::Buy
        });
    }
    row.match_id = result.match_id;
    Ok(())
}

/// One synthetic closing row per inventory left non-flat: an Expire when
/// the contract's expiration is already behind `now` (less the grace
/// window, to allow for late expiration notices), a Mark otherwise.
fn synthesize_closing_rows(
    inventories: &BTreeMap<InstrumentKey, FifoInventory>,
    config: &MatchConfig,
) -> Vec<Transaction> {
    let cutoff = config.now.date() - Duration::days(config.grace_days);
    let mut closing_rows = Vec::new();
    let mut mark_ids = 0u32;
    let mut expire_ids = 0u32;

    for (key, inventory) in inventories {
        let position = inventory.position();
        if position.quantity.is_zero() {
            continue;
        }

        let expired = key
            .instrument
            .expiration
            .map(|expiration| expiration <= cutoff)
            .unwrap_or(false);
        let (rowtype, transaction_id, description) = if expired {
            expire_ids += 1;
            (
                RowType::Expire,
                TransactionId::new(format!("^expire{:06}", expire_ids)),
                "Synthetic expiration of option".to_string(),
            )
        } else {
            mark_ids += 1;
            (
                RowType::Mark,
                TransactionId::new(format!("^mark{:06}", mark_ids)),
                "Mark-to-market of open position".to_string(),
            )
        };

        let sign = position.quantity.signum();
        closing_rows.push(Transaction {
            account: key.account.clone(),
            transaction_id,
            datetime: config.now,
            rowtype,
            order_id: None,
            instrument: key.instrument.clone(),
            effect: Effect::Closing,
            instruction: Some(Instruction::closing(sign)),
            quantity: Some(position.quantity.abs()),
            price: Decimal::ZERO,
            cost: position.basis * sign,
            commissions: Decimal::ZERO,
            fees: Decimal::ZERO,
            description,
            match_id: position.match_id,
            chain_id: None,
        });
    }
    closing_rows
}
