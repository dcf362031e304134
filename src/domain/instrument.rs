//! Instrument identity: the fields that decide which inventory a row affects.
//!
//! The table codec carries instruments as a compact symbol string; this
//! module parses that string into its component fields and formats it back.
//! Symbol grammar:
//!
//!   Equity           `SPY`
//!   Equity option    `SPY_210617_C410` (expiration as YYMMDD)
//!   Future           `/CLZ21`
//!   Futures option   `/CLZ21_LOM21_P55.5` (date implicit in the option code)

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

use super::{Account, Decimal, OptionSide, Underlying};

/// Contract size applied to equity and futures options when the table does
/// not state one.
const OPTION_CONTRACT_SIZE: i64 = 100;

/// Per-root contract sizes for futures. Roots not listed fall back to 1.
const FUTURES_MULTIPLIERS: &[(&str, i64)] = &[
    ("/6A", 100_000),
    ("/6E", 125_000),
    ("/CL", 1_000),
    ("/ES", 50),
    ("/GC", 100),
    ("/MES", 5),
    ("/MNQ", 2),
    ("/NG", 10_000),
    ("/NQ", 20),
    ("/SI", 5_000),
    ("/VX", 1_000),
    ("/ZB", 1_000),
    ("/ZC", 50),
    ("/ZN", 1_000),
    ("/ZS", 50),
    ("/ZW", 50),
];

#[derive(Debug, Error, PartialEq, Eq)]
pub enum SymbolError {
    #[error("invalid strike in symbol '{0}'")]
    InvalidStrike(String),
    #[error("invalid expiration date in symbol '{0}'")]
    InvalidExpiration(String),
    #[error("invalid option side in symbol '{0}'")]
    InvalidSide(String),
}

/// An instrument broken down into the fields the matching engine keys on.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct Instrument {
    /// Underlying name; futures include the calendar code ("/CLZ21").
    pub underlying: Underlying,

    /// For futures options, the option contract + calendar code ("LOM21").
    pub expcode: Option<String>,

    /// Option expiration date. None for futures options (the date is
    /// implicit in `expcode`) and for outright positions.
    pub expiration: Option<NaiveDate>,

    /// Option side, None for outrights.
    pub putcall: Option<OptionSide>,

    /// Option strike, None for outrights.
    pub strike: Option<Decimal>,

    /// Contract multiplier applied when converting price to cash.
    pub multiplier: Decimal,
}

impl Instrument {
    /// Build an outright equity instrument (multiplier 1).
    pub fn equity(underlying: impl Into<String>) -> Self {
        Instrument {
            underlying: Underlying::new(underlying),
            expcode: None,
            expiration: None,
            putcall: None,
            strike: None,
            multiplier: Decimal::from(1),
        }
    }

    /// Parse the compact symbol form, inferring the multiplier.
    pub fn from_symbol(symbol: &str) -> Result<Self, SymbolError> {
        let parts: Vec<&str> = symbol.split('_').collect();
        if parts.len() != 3 {
            // Outright equity or future.
            let underlying = Underlying::new(symbol);
            let multiplier = infer_outright_multiplier(&underlying);
            return Ok(Instrument {
                underlying,
                expcode: None,
                expiration: None,
                putcall: None,
                strike: None,
                multiplier,
            });
        }

        let underlying = Underlying::new(parts[0]);
        let (expcode, expiration) = parse_middle(symbol, parts[1])?;

        let mut side_chars = parts[2].chars();
        let putcall = side_chars
            .next()
            .and_then(OptionSide::from_letter)
            .ok_or_else(|| SymbolError::InvalidSide(symbol.to_string()))?;
        let strike = Decimal::parse(side_chars.as_str())
            .map_err(|_| SymbolError::InvalidStrike(symbol.to_string()))?;

        let multiplier = if underlying.is_future() {
            futures_multiplier(&underlying)
        } else {
            Decimal::from(OPTION_CONTRACT_SIZE)
        };

        Ok(Instrument {
            underlying,
            expcode,
            expiration,
            putcall: Some(putcall),
            strike: Some(strike),
            multiplier,
        })
    }

    /// Format back into the compact symbol form.
    pub fn symbol(&self) -> String {
        match (&self.putcall, &self.strike) {
            (Some(side), Some(strike)) => {
                if let Some(expcode) = &self.expcode {
                    format!("{}_{}_{}{}", self.underlying, expcode, side, strike)
                } else if let Some(expiration) = self.expiration {
                    format!(
                        "{}_{}_{}{}",
                        self.underlying,
                        expiration.format("%y%m%d"),
                        side,
                        strike
                    )
                } else {
                    self.underlying.to_string()
                }
            }
            _ => self.underlying.to_string(),
        }
    }
}

impl fmt::Display for Instrument {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.symbol())
    }
}

/// Middle symbol segment: a 6-digit expiration date or a futures option code.
fn parse_middle(
    symbol: &str,
    segment: &str,
) -> Result<(Option<String>, Option<NaiveDate>), SymbolError> {
    if segment.len() == 6 && segment.chars().all(|c| c.is_ascii_digit()) {
        let date = NaiveDate::parse_from_str(segment, "%y%m%d")
            .map_err(|_| SymbolError::InvalidExpiration(symbol.to_string()))?;
        Ok((None, Some(date)))
    } else {
        Ok((Some(segment.to_string()), None))
    }
}

fn infer_outright_multiplier(underlying: &Underlying) -> Decimal {
    if underlying.is_future() {
        futures_multiplier(underlying)
    } else {
        Decimal::from(1)
    }
}

/// Contract size for a dated futures underlying, looked up by root (the
/// name with its trailing calendar code stripped).
fn futures_multiplier(underlying: &Underlying) -> Decimal {
    let name = underlying.as_str();
    let root = if name.len() > 3 { &name[..name.len() - 3] } else { name };
    match FUTURES_MULTIPLIERS.iter().find(|(r, _)| *r == root) {
        Some((_, size)) => Decimal::from(*size),
        None => {
            tracing::warn!(underlying = name, "unknown futures root, multiplier defaults to 1");
            Decimal::from(1)
        }
    }
}

/// The identity of one fungible inventory: account plus the full instrument.
/// Two rows sharing a key draw from the same lots; no two keys ever
/// interact. Ord so the per-key arena iterates deterministically.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct InstrumentKey {
    pub account: Account,
    pub instrument: Instrument,
}
