pub mod config;
pub mod datasource;
pub mod domain;
pub mod engine;
pub mod error;
pub mod orchestration;

pub use config::{Config, OutputFormat};
pub use datasource::{CsvTransactionSource, MockTransactionSource, TransactionSource};
pub use domain::{
    Account, ChainId, Decimal, Effect, Instruction, Instrument, InstrumentKey, MatchId, OptionSide,
    OrderId, RowType, Transaction, TransactionId, Underlying,
};
pub use engine::{FifoInventory, MatchConfig};
pub use error::{EngineError, StructuralError, ValidationError};
pub use orchestration::annotate;
