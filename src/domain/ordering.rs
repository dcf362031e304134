//! Stable transaction ordering for deterministic processing.

use super::{Transaction, TransactionId};
use chrono::NaiveDateTime;

/// Stable ordering key: datetime first, transaction id as the tie-breaker.
///
/// Ties on datetime are common (multi-leg orders stamp every leg with the
/// same time), so the id fallback is what makes match and chain assignment
/// reproducible.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord)]
pub struct TxnOrderingKey {
    pub datetime: NaiveDateTime,
    pub transaction_id: TransactionId,
}

impl TxnOrderingKey {
    pub fn of(txn: &Transaction) -> Self {
        TxnOrderingKey {
            datetime: txn.datetime,
            transaction_id: txn.transaction_id.clone(),
        }
    }
}

/// Sort a partition of rows into canonical processing order.
pub fn sort_deterministic(rows: &mut [Transaction]) {
    rows.sort_by(|a, b| TxnOrderingKey::of(a).cmp(&TxnOrderingKey::of(b)));
}
