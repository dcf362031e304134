//! Error taxonomy for the matching pipeline.
//!
//! Only two things abort a run: upstream data that contradicts itself
//! (validation) and input that violates the ordering precondition
//! (structural). Crossing-over, reductions exceeding the open lots, and
//! activity on a key with no history are all normal control flow; broker
//! logs are frequently incomplete and a best-effort reconciliation beats
//! wholesale rejection.

use thiserror::Error;

use crate::domain::{Decimal, TransactionId, Underlying};

/// Upstream data disagrees with the state the engine reconstructed.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ValidationError {
    #[error(
        "expiration quantity mismatch for {transaction_id}: stated {stated} != resolved {resolved}"
    )]
    ExpireQuantityMismatch {
        transaction_id: TransactionId,
        stated: Decimal,
        resolved: Decimal,
    },

    #[error("active span never closed for underlying {underlying}")]
    UnclosedSpan { underlying: Underlying },

    #[error("row {transaction_id} failed conformance: {reason}")]
    Conformance {
        transaction_id: TransactionId,
        reason: String,
    },
}

/// The input table violates a precondition of the engine.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum StructuralError {
    #[error("input not sorted by time: row {transaction_id} precedes an earlier row")]
    UnsortedInput { transaction_id: TransactionId },
}

/// Any failure the pipeline can surface to callers.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum EngineError {
    #[error(transparent)]
    Validation(#[from] ValidationError),
    #[error(transparent)]
    Structural(#[from] StructuralError),
}
