//! End-to-end pipeline scenarios: matching, synthesis, and validation.

use chrono::{NaiveDate, NaiveDateTime};
use tradechains::{
    annotate, Account, Decimal, Effect, EngineError, Instruction, Instrument, MatchConfig, OrderId,
    RowType, Transaction, TransactionId, ValidationError,
};

fn dt(day: u32, hour: u32) -> NaiveDateTime {
    NaiveDate::from_ymd_opt(2021, 6, day)
        .unwrap()
        .and_hms_opt(hour, 0, 0)
        .unwrap()
}

fn dec(s: &str) -> Decimal {
    Decimal::parse(s).unwrap()
}

fn trade(
    id: &str,
    day: u32,
    hour: u32,
    symbol: &str,
    instruction: Instruction,
    quantity: &str,
    price: &str,
) -> Transaction {
    let instrument = Instrument::from_symbol(symbol).unwrap();
    let quantity = dec(quantity);
    let price = dec(price);
    let cost = price * quantity * instrument.multiplier * -instruction.sign();
    Transaction {
        account: Account::new("X100"),
        transaction_id: TransactionId::new(id),
        datetime: dt(day, hour),
        rowtype: RowType::Trade,
        order_id: Some(OrderId::new(format!("o-{}", id))),
        instrument,
        effect: Effect::Unknown,
        instruction: Some(instruction),
        quantity: Some(quantity),
        price,
        cost,
        commissions: Decimal::ZERO,
        fees: Decimal::ZERO,
        description: String::new(),
        match_id: None,
        chain_id: None,
    }
}

fn expire(id: &str, day: u32, symbol: &str, quantity: Option<&str>) -> Transaction {
    let mut row = trade(id, day, 16, symbol, Instruction::Sell, "0", "0");
    row.rowtype = RowType::Expire;
    row.order_id = None;
    row.instruction = None;
    row.quantity = quantity.map(dec);
    row.cost = Decimal::ZERO;
    row
}

#[test]
fn test_partial_close_appends_mark_sharing_match_and_chain() {
    // Buy 2 @ $10 at 09:00, sell 1 @ $12 at 10:00, marked at 11:00.
    let rows = vec![
        trade("A", 1, 9, "XYZ", Instruction::Buy, "2", "10"),
        trade("B", 1, 10, "XYZ", Instruction::Sell, "1", "12"),
    ];
    let output = annotate(rows, &MatchConfig::new(dt(1, 11))).unwrap();
    assert_eq!(output.len(), 3);

    let a = &output[0];
    let b = &output[1];
    let mark = &output[2];
    assert_eq!(a.match_id, b.match_id);
    assert!(a.match_id.is_some());

    assert_eq!(mark.rowtype, RowType::Mark);
    assert_eq!(mark.datetime, dt(1, 11));
    assert_eq!(mark.quantity, Some(dec("1")));
    assert_eq!(mark.effect, Effect::Closing);
    assert_eq!(mark.match_id, a.match_id);

    assert!(a.chain_id.is_some());
    assert_eq!(a.chain_id, b.chain_id);
    assert_eq!(a.chain_id, mark.chain_id);
}

#[test]
fn test_flatten_then_reopen_forms_two_chains() {
    // Full round trip, then a fresh opening three days later.
    let rows = vec![
        trade("A", 1, 9, "XYZ", Instruction::Buy, "1", "5"),
        trade("B", 1, 10, "XYZ", Instruction::Sell, "1", "6"),
        trade("C", 4, 9, "XYZ", Instruction::Buy, "1", "7"),
    ];
    let output = annotate(rows, &MatchConfig::new(dt(4, 10))).unwrap();
    assert_eq!(output.len(), 4);

    let (a, b, c, mark) = (&output[0], &output[1], &output[2], &output[3]);
    assert_eq!(a.match_id, b.match_id);
    assert_ne!(a.match_id, c.match_id);
    assert_eq!(mark.rowtype, RowType::Mark);
    assert_eq!(mark.match_id, c.match_id);

    assert_eq!(a.chain_id, b.chain_id);
    assert_eq!(c.chain_id, mark.chain_id);
    assert_ne!(a.chain_id, c.chain_id);
}

#[test]
fn test_explicit_expiration_closes_position() {
    let rows = vec![
        trade("A", 1, 9, "QQQ_210604_P330", Instruction::Sell, "2", "1.25"),
        expire("B", 4, "QQQ_210604_P330", None),
    ];
    let output = annotate(rows, &MatchConfig::new(dt(10, 9))).unwrap();
    // Position fully closed by the expiration: no synthetic rows.
    assert_eq!(output.len(), 2);
    let resolved = &output[1];
    assert_eq!(resolved.quantity, Some(dec("2")));
    assert_eq!(resolved.instruction, Some(Instruction::Buy));
    assert_eq!(resolved.match_id, output[0].match_id);
    assert_eq!(resolved.chain_id, output[0].chain_id);
}

#[test]
fn test_expiration_quantity_mismatch_aborts() {
    let rows = vec![
        trade("A", 1, 9, "QQQ_210604_P330", Instruction::Sell, "2", "1.25"),
        expire("B", 4, "QQQ_210604_P330", Some("5")),
    ];
    let err = annotate(rows, &MatchConfig::new(dt(10, 9))).unwrap_err();
    assert_eq!(
        err,
        EngineError::Validation(ValidationError::ExpireQuantityMismatch {
            transaction_id: TransactionId::new("B"),
            stated: dec("5"),
            resolved: dec("2"),
        })
    );
}

#[test]
fn test_missing_expiration_notice_synthesized() {
    // Option expired June 4, log carries no expiration row, now is June 10.
    let rows = vec![trade(
        "A", 1, 9, "QQQ_210604_P330", Instruction::Sell, "1", "2",
    )];
    let output = annotate(rows, &MatchConfig::new(dt(10, 9))).unwrap();
    assert_eq!(output.len(), 2);
    let synthesized = &output[1];
    assert_eq!(synthesized.rowtype, RowType::Expire);
    assert_eq!(synthesized.transaction_id.as_str(), "^expire000001");
    assert_eq!(synthesized.instruction, Some(Instruction::Buy));
    assert_eq!(synthesized.quantity, Some(dec("1")));
    assert_eq!(synthesized.match_id, output[0].match_id);
    assert_eq!(synthesized.chain_id, output[0].chain_id);
}

#[test]
fn test_crossing_over_stays_one_chain() {
    // +1 then -3 crosses to a short of 2; one match id throughout, so one
    // chain covers the flip and its mark.
    let rows = vec![
        trade("A", 1, 9, "XYZ", Instruction::Buy, "1", "10"),
        trade("B", 1, 10, "XYZ", Instruction::Sell, "3", "11"),
    ];
    let output = annotate(rows, &MatchConfig::new(dt(1, 11))).unwrap();
    assert_eq!(output.len(), 3);
    assert_eq!(output[0].match_id, output[1].match_id);
    let mark = &output[2];
    assert_eq!(mark.quantity, Some(dec("2")));
    assert_eq!(mark.instruction, Some(Instruction::Buy));
    assert_eq!(mark.match_id, output[0].match_id);
    assert!(output.iter().all(|r| r.chain_id == output[0].chain_id));
}

#[test]
fn test_multi_account_inventories_are_isolated() {
    let mut other = trade("B", 1, 10, "XYZ", Instruction::Sell, "1", "12");
    other.account = Account::new("Y200");
    let rows = vec![trade("A", 1, 9, "XYZ", Instruction::Buy, "1", "10"), other];
    let output = annotate(rows, &MatchConfig::new(dt(1, 11))).unwrap();
    // The sell opens a short in the other account instead of reducing.
    assert_ne!(output[0].match_id, output[1].match_id);
    assert_ne!(output[0].chain_id, output[1].chain_id);
    // One closing row per account.
    assert_eq!(output.len(), 4);
}

#[test]
fn test_every_output_row_is_conformant() {
    let rows = vec![
        trade("A", 1, 9, "XYZ", Instruction::Buy, "2", "10"),
        trade("B", 1, 10, "XYZ", Instruction::Sell, "1", "12"),
        trade("C", 2, 9, "QQQ_210604_P330", Instruction::Sell, "1", "2"),
    ];
    let output = annotate(rows, &MatchConfig::new(dt(10, 9))).unwrap();
    for row in &output {
        assert!(row.quantity.is_some(), "row {} quantity", row.transaction_id);
        assert!(
            row.instruction.is_some(),
            "row {} instruction",
            row.transaction_id
        );
        assert!(row.match_id.is_some(), "row {} match id", row.transaction_id);
        assert!(row.chain_id.is_some(), "row {} chain id", row.transaction_id);
    }
}
