//! Loading and storing the normalized transaction table.
//!
//! The engine is agnostic about where the table comes from; importer
//! collaborators deliver it through the `TransactionSource` trait. The CSV
//! codec here reads/writes the system's own interchange format, not any
//! broker's wire format.

use crate::domain::Transaction;
use thiserror::Error;

pub mod csv;
pub mod mock;

pub use self::csv::{
    read_csv, store_csv, store_json, write_csv, write_json, CsvTransactionSource,
};
pub use mock::MockTransactionSource;

/// A supplier of normalized transaction rows, sorted by datetime.
pub trait TransactionSource {
    /// Load the full batch of rows this source holds.
    fn load(&self) -> Result<Vec<Transaction>, DataSourceError>;
}

/// Error type for table load/store operations.
#[derive(Debug, Error)]
pub enum DataSourceError {
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    #[error("csv error: {0}")]
    Csv(#[from] ::csv::Error),

    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("invalid row '{transaction_id}': {reason}")]
    InvalidRow {
        transaction_id: String,
        reason: String,
    },
}
