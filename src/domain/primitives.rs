//! Domain primitives: account/id newtypes and the row enumerations.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Brokerage account number, as reported by the upstream importer.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct Account(pub String);

impl Account {
    pub fn new(account: impl Into<String>) -> Self {
        Account(account.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Account {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Underlying instrument name. Futures carry a leading slash and calendar
/// code, e.g. "/CLZ21"; equities are the bare ticker.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct Underlying(pub String);

impl Underlying {
    pub fn new(name: impl Into<String>) -> Self {
        Underlying(name.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn is_future(&self) -> bool {
        self.0.starts_with('/')
    }
}

impl fmt::Display for Underlying {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Stable unique transaction identifier. Synthetic rows use a reserved
/// "^mark"/"^expire" prefix so they can never collide with importer ids.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct TransactionId(pub String);

impl TransactionId {
    pub fn new(id: impl Into<String>) -> Self {
        TransactionId(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn is_synthetic(&self) -> bool {
        self.0.starts_with('^')
    }
}

impl fmt::Display for TransactionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Order placement id; present only for user-placed orders.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct OrderId(pub String);

impl OrderId {
    pub fn new(id: impl Into<String>) -> Self {
        OrderId(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for OrderId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Kind of event a row records.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum RowType {
    /// An executed trade.
    Trade,
    /// A contract expiration, explicit or synthesized.
    Expire,
    /// Synthetic mark-to-market of a position still open as of "now".
    Mark,
}

impl fmt::Display for RowType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RowType::Trade => write!(f, "Trade"),
            RowType::Expire => write!(f, "Expire"),
            RowType::Mark => write!(f, "Mark"),
        }
    }
}

/// Trade direction. Quantity magnitudes are unsigned in the table; the sign
/// is carried here.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Instruction {
    Buy,
    Sell,
}

impl Instruction {
    /// Signed multiplier: +1 for Buy, -1 for Sell.
    pub fn sign(&self) -> i32 {
        match self {
            Instruction::Buy => 1,
            Instruction::Sell => -1,
        }
    }

    /// The instruction that closes a position of the given sign.
    pub fn closing(position_sign: i32) -> Instruction {
        if position_sign < 0 {
            Instruction::Buy
        } else {
            Instruction::Sell
        }
    }
}

impl fmt::Display for Instruction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Instruction::Buy => write!(f, "BUY"),
            Instruction::Sell => write!(f, "SELL"),
        }
    }
}

/// Whether the row augments or reduces a position, as stated by the
/// importer. "?" means the importer could not tell.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Effect {
    #[serde(rename = "OPENING")]
    Opening,
    #[serde(rename = "CLOSING")]
    Closing,
    #[serde(rename = "?")]
    Unknown,
}

impl fmt::Display for Effect {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Effect::Opening => write!(f, "OPENING"),
            Effect::Closing => write!(f, "CLOSING"),
            Effect::Unknown => write!(f, "?"),
        }
    }
}

/// Option side letter.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum OptionSide {
    #[serde(rename = "C")]
    Call,
    #[serde(rename = "P")]
    Put,
}

impl OptionSide {
    pub fn from_letter(letter: char) -> Option<OptionSide> {
        match letter {
            'C' => Some(OptionSide::Call),
            'P' => Some(OptionSide::Put),
            _ => None,
        }
    }

    pub fn letter(&self) -> char {
        match self {
            OptionSide::Call => 'C',
            OptionSide::Put => 'P',
        }
    }
}

impl fmt::Display for OptionSide {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.letter())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_instruction_sign() {
        assert_eq!(Instruction::Buy.sign(), 1);
        assert_eq!(Instruction::Sell.sign(), -1);
    }

    #[test]
    fn test_instruction_closing() {
        assert_eq!(Instruction::closing(1), Instruction::Sell);
        assert_eq!(Instruction::closing(-1), Instruction::Buy);
    }

    #[test]
    fn test_instruction_serde() {
        assert_eq!(serde_json::to_string(&Instruction::Buy).unwrap(), "\"BUY\"");
        assert_eq!(
            serde_json::from_str::<Instruction>("\"SELL\"").unwrap(),
            Instruction::Sell
        );
    }

    #[test]
    fn test_effect_serde() {
        assert_eq!(serde_json::to_string(&Effect::Unknown).unwrap(), "\"?\"");
        assert_eq!(
            serde_json::from_str::<Effect>("\"OPENING\"").unwrap(),
            Effect::Opening
        );
    }

    #[test]
    fn test_underlying_is_future() {
        assert!(Underlying::new("/CLZ21").is_future());
        assert!(!Underlying::new("SPY").is_future());
    }

    #[test]
    fn test_synthetic_transaction_id() {
        assert!(TransactionId::new("^mark000001").is_synthetic());
        assert!(!TransactionId::new("t1234").is_synthetic());
    }

    #[test]
    fn test_option_side_letters() {
        assert_eq!(OptionSide::from_letter('C'), Some(OptionSide::Call));
        assert_eq!(OptionSide::from_letter('P'), Some(OptionSide::Put));
        assert_eq!(OptionSide::from_letter('X'), None);
        assert_eq!(OptionSide::Put.letter(), 'P');
    }
}
