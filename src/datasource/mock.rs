//! In-memory source for tests: no files involved.

use super::{DataSourceError, TransactionSource};
use crate::domain::Transaction;

/// Serves a predefined batch of rows.
#[derive(Debug, Clone, Default)]
pub struct MockTransactionSource {
    rows: Vec<Transaction>,
}

impl MockTransactionSource {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_row(mut self, row: Transaction) -> Self {
        self.rows.push(row);
        self
    }

    pub fn with_rows(mut self, rows: Vec<Transaction>) -> Self {
        self.rows.extend(rows);
        self
    }
}

impl TransactionSource for MockTransactionSource {
    fn load(&self) -> Result<Vec<Transaction>, DataSourceError> {
        Ok(self.rows.clone())
    }
}
