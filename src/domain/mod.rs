//! Domain types and determinism layer for the transaction matching engine.
//!
//! This module provides:
//! - Lossless numeric handling via the Decimal wrapper
//! - Row primitives: Account, Underlying, ids, RowType, Instruction, Effect
//! - Instrument identity and the compact symbol codec
//! - The Transaction row with output-contract conformance checks
//! - Stable ordering and content-derived match/chain ids

pub mod decimal;
pub mod ids;
pub mod instrument;
pub mod ordering;
pub mod primitives;
pub mod transaction;

pub use decimal::Decimal;
pub use ids::{ChainId, MatchId};
pub use instrument::{Instrument, InstrumentKey, SymbolError};
pub use ordering::{sort_deterministic, TxnOrderingKey};
pub use primitives::{
    Account, Effect, Instruction, OptionSide, OrderId, RowType, TransactionId, Underlying,
};
pub use transaction::Transaction;
