//! The full annotation pipeline: match, chain, then conformance-check.

use crate::domain::Transaction;
use crate::engine::{chain_transactions, match_transactions, MatchConfig};
use crate::error::{EngineError, ValidationError};

/// Annotate a normalized transaction table with match and chain ids.
///
/// Input rows must be sorted by datetime (the importer contract); `Expire`
/// rows may arrive without quantity/instruction. The output is the input
/// (annotated, original order preserved) plus synthetic closing rows, every
/// row carrying both ids and passing the output conformance contract.
pub fn annotate(
    transactions: Vec<Transaction>,
    config: &MatchConfig,
) -> Result<Vec<Transaction>, EngineError> {
    let mut rows = match_transactions(transactions, config)?;
    chain_transactions(&mut rows)?;

    for row in &rows {
        if let Some(reason) = row.conformance_error() {
            return Err(ValidationError::Conformance {
                transaction_id: row.transaction_id.clone(),
                reason,
            }
            .into());
        }
    }

    tracing::debug!(rows = rows.len(), "annotated transaction table");
    Ok(rows)
}
