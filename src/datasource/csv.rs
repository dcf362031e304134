//! CSV and JSON codecs for the normalized transaction table.
//!
//! Layout matches the importer contract: fourteen input columns, plus
//! `match_id`/`chain_id` appended on output. The instrument travels as a
//! compact symbol string and is expanded into its component fields on load,
//! shrunk back on store.

use std::fs::File;
use std::io::{BufWriter, Read, Write};
use std::path::{Path, PathBuf};

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

use crate::domain::{
    Account, ChainId, Decimal, Effect, Instruction, Instrument, MatchId, OrderId, RowType,
    Transaction, TransactionId,
};

use super::{DataSourceError, TransactionSource};

const DATETIME_FORMAT: &str = "%Y-%m-%dT%H:%M:%S%.f";
// Some exports use a space separator instead of the T.
const DATETIME_FORMAT_SPACED: &str = "%Y-%m-%d %H:%M:%S%.f";

/// File-backed CSV source.
#[derive(Debug, Clone)]
pub struct CsvTransactionSource {
    path: PathBuf,
}

impl CsvTransactionSource {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        CsvTransactionSource { path: path.into() }
    }
}

impl TransactionSource for CsvTransactionSource {
    fn load(&self) -> Result<Vec<Transaction>, DataSourceError> {
        let file = File::open(&self.path)?;
        read_csv(file)
    }
}

/// Flat row as it appears in the file; conversion to the domain type does
/// all parsing and error reporting.
#[derive(Debug, Serialize, Deserialize)]
struct CsvRecord {
    account: String,
    transaction_id: String,
    datetime: String,
    rowtype: String,
    order_id: Option<String>,
    symbol: String,
    effect: String,
    instruction: Option<String>,
    quantity: Option<String>,
    price: String,
    cost: String,
    commissions: String,
    fees: String,
    description: String,
    #[serde(default)]
    match_id: Option<String>,
    #[serde(default)]
    chain_id: Option<String>,
}

impl CsvRecord {
    fn into_transaction(self) -> Result<Transaction, DataSourceError> {
        let invalid = |reason: &str| DataSourceError::InvalidRow {
            transaction_id: self.transaction_id.clone(),
            reason: reason.to_string(),
        };

        let datetime = parse_datetime(&self.datetime)
            .ok_or_else(|| invalid(&format!("unparseable datetime '{}'", self.datetime)))?;
        let rowtype = match self.rowtype.as_str() {
            "Trade" => RowType::Trade,
            "Expire" => RowType::Expire,
            "Mark" => RowType::Mark,
            other => return Err(invalid(&format!("unknown rowtype '{}'", other))),
        };
        let effect = match self.effect.as_str() {
            "OPENING" => Effect::Opening,
            "CLOSING" => Effect::Closing,
            "?" | "" => Effect::Unknown,
            other => return Err(invalid(&format!("unknown effect '{}'", other))),
        };
        let instruction = match self.instruction.as_deref() {
            None | Some("") => None,
            Some("BUY") => Some(Instruction::Buy),
            Some("SELL") => Some(Instruction::Sell),
            Some(other) => return Err(invalid(&format!("unknown instruction '{}'", other))),
        };
        let instrument = Instrument::from_symbol(&self.symbol)
            .map_err(|e| invalid(&e.to_string()))?;

        let parse_decimal = |field: &str, value: &str| {
            Decimal::parse(value)
                .map_err(|_| invalid(&format!("unparseable {} '{}'", field, value)))
        };
        let quantity = match self.quantity.as_deref() {
            None | Some("") => None,
            Some(value) => Some(parse_decimal("quantity", value)?),
        };
        let price = parse_decimal("price", &self.price)?;
        let cost = parse_decimal("cost", &self.cost)?;
        let commissions = parse_decimal("commissions", &self.commissions)?;
        let fees = parse_decimal("fees", &self.fees)?;

        Ok(Transaction {
            account: Account::new(self.account),
            transaction_id: TransactionId::new(self.transaction_id),
            datetime,
            rowtype,
            order_id: self.order_id.filter(|id| !id.is_empty()).map(OrderId::new),
            instrument,
            effect,
            instruction,
            quantity,
            price,
            cost,
            commissions,
            fees,
            description: self.description,
            match_id: self.match_id.filter(|id| !id.is_empty()).map(MatchId),
            chain_id: self.chain_id.filter(|id| !id.is_empty()).map(ChainId),
        })
    }

    fn from_transaction(txn: &Transaction) -> Self {
        CsvRecord {
            account: txn.account.as_str().to_string(),
            transaction_id: txn.transaction_id.as_str().to_string(),
            datetime: txn.datetime.format(DATETIME_FORMAT).to_string(),
            rowtype: txn.rowtype.to_string(),
            order_id: txn.order_id.as_ref().map(|id| id.as_str().to_string()),
            symbol: txn.instrument.symbol(),
            effect: txn.effect.to_string(),
            instruction: txn.instruction.map(|i| i.to_string()),
            quantity: txn.quantity.map(|q| q.canonical()),
            price: txn.price.canonical(),
            cost: txn.cost.canonical(),
            commissions: txn.commissions.canonical(),
            fees: txn.fees.canonical(),
            description: txn.description.clone(),
            match_id: txn.match_id.as_ref().map(|id| id.as_str().to_string()),
            chain_id: txn.chain_id.as_ref().map(|id| id.as_str().to_string()),
        }
    }
}

fn parse_datetime(value: &str) -> Option<NaiveDateTime> {
    NaiveDateTime::parse_from_str(value, DATETIME_FORMAT)
        .or_else(|_| NaiveDateTime::parse_from_str(value, DATETIME_FORMAT_SPACED))
        .ok()
}

/// Read a transaction table from any reader.
pub fn read_csv<R: Read>(reader: R) -> Result<Vec<Transaction>, DataSourceError> {
    let mut csv_reader = csv::Reader::from_reader(reader);
    let mut rows = Vec::new();
    for record in csv_reader.deserialize::<CsvRecord>() {
        rows.push(record?.into_transaction()?);
    }
    Ok(rows)
}

/// Write a transaction table to any writer, all sixteen columns.
pub fn write_csv<W: Write>(writer: W, rows: &[Transaction]) -> Result<(), DataSourceError> {
    let mut csv_writer = csv::Writer::from_writer(writer);
    for row in rows {
        csv_writer.serialize(CsvRecord::from_transaction(row))?;
    }
    csv_writer.flush()?;
    Ok(())
}

/// Write the table as a JSON array of row objects.
pub fn write_json<W: Write>(writer: W, rows: &[Transaction]) -> Result<(), DataSourceError> {
    serde_json::to_writer_pretty(writer, rows)?;
    Ok(())
}

pub fn store_csv(path: &Path, rows: &[Transaction]) -> Result<(), DataSourceError> {
    let file = BufWriter::new(File::create(path)?);
    write_csv(file, rows)
}

pub fn store_json(path: &Path, rows: &[Transaction]) -> Result<(), DataSourceError> {
    let mut file = BufWriter::new(File::create(path)?);
    write_json(&mut file, rows)?;
    file.write_all(b"\n")?;
    Ok(())
}
