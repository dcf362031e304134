//! Repeated runs over identical input must produce byte-identical output.

use chrono::{NaiveDate, NaiveDateTime};
use tradechains::datasource::write_csv;
use tradechains::{
    annotate, Account, Decimal, Effect, Instruction, Instrument, MatchConfig, OrderId, RowType,
    Transaction, TransactionId,
};

fn dt(day: u32, hour: u32, minute: u32) -> NaiveDateTime {
    NaiveDate::from_ymd_opt(2021, 6, day)
        .unwrap()
        .and_hms_opt(hour, minute, 0)
        .unwrap()
}

fn dec(s: &str) -> Decimal {
    Decimal::parse(s).unwrap()
}

/// A moderately busy book: two accounts, options and outrights, an
/// expiration, same-timestamp legs, and positions left open for marking.
fn fixture() -> Vec<Transaction> {
    let mut rows = Vec::new();
    let mut push = |id: &str,
                    account: &str,
                    day: u32,
                    hour: u32,
                    minute: u32,
                    symbol: &str,
                    order_id: Option<&str>,
                    instruction: Instruction,
                    quantity: &str,
                    price: &str| {
        let instrument = Instrument::from_symbol(symbol).unwrap();
        let quantity = dec(quantity);
        let price = dec(price);
        let cost = price * quantity * instrument.multiplier * -instruction.sign();
        rows.push(Transaction {
            account: Account::new(account),
            transaction_id: TransactionId::new(id),
            datetime: dt(day, hour, minute),
            rowtype: RowType::Trade,
            order_id: order_id.map(OrderId::new),
            instrument,
            effect: Effect::Unknown,
            instruction: Some(instruction),
            quantity: Some(quantity),
            price,
            cost,
            commissions: dec("-0.65"),
            fees: dec("-0.1"),
            description: format!("fixture row {}", id),
            match_id: None,
            chain_id: None,
        });
    };

    push("t01", "X100", 1, 9, 30, "SPY_210618_C420", Some("o1"), Instruction::Sell, "2", "2.1");
    push("t02", "X100", 1, 9, 30, "SPY_210618_P400", Some("o1"), Instruction::Sell, "2", "2.6");
    push("t03", "X100", 1, 14, 0, "QQQ", None, Instruction::Buy, "10", "334.5");
    push("t04", "Y200", 2, 10, 0, "/CLZ21", None, Instruction::Buy, "1", "71.25");
    push("t05", "X100", 2, 11, 0, "SPY_210618_C420", None, Instruction::Buy, "1", "1.8");
    push("t06", "X100", 2, 11, 0, "QQQ", None, Instruction::Sell, "4", "335.1");
    push("t07", "Y200", 3, 9, 0, "/CLZ21", None, Instruction::Sell, "2", "72.4");
    push("t08", "X100", 3, 15, 30, "SPY_210618_P400", None, Instruction::Buy, "2", "2.9");
    rows
}

#[test]
fn test_two_runs_identical_annotations() {
    let config = MatchConfig::new(dt(4, 11, 0));
    let first = annotate(fixture(), &config).unwrap();
    let second = annotate(fixture(), &config).unwrap();
    assert_eq!(first, second);
}

#[test]
fn test_two_runs_identical_bytes() {
    let config = MatchConfig::new(dt(4, 11, 0));
    let mut first = Vec::new();
    write_csv(&mut first, &annotate(fixture(), &config).unwrap()).unwrap();
    let mut second = Vec::new();
    write_csv(&mut second, &annotate(fixture(), &config).unwrap()).unwrap();
    assert!(!first.is_empty());
    assert_eq!(first, second);
}

#[test]
fn test_ids_are_functions_of_content_not_position() {
    // Dropping an unrelated account's rows must not disturb the other
    // account's assignments.
    let config = MatchConfig::new(dt(4, 11, 0));
    let full = annotate(fixture(), &config).unwrap();
    let pruned_input: Vec<Transaction> = fixture()
        .into_iter()
        .filter(|row| row.account.as_str() == "X100")
        .collect();
    let pruned = annotate(pruned_input, &config).unwrap();

    for row in pruned.iter().filter(|r| !r.transaction_id.is_synthetic()) {
        let same = full
            .iter()
            .find(|r| r.transaction_id == row.transaction_id)
            .unwrap();
        assert_eq!(row.match_id, same.match_id, "match id of {}", row.transaction_id);
        assert_eq!(row.chain_id, same.chain_id, "chain id of {}", row.transaction_id);
    }
}

#[test]
fn test_now_is_threaded_not_ambient() {
    // Different "now" values change only the synthetic rows' timestamps,
    // never the match ids of real rows.
    let first = annotate(fixture(), &MatchConfig::new(dt(4, 11, 0))).unwrap();
    let second = annotate(fixture(), &MatchConfig::new(dt(28, 9, 0))).unwrap();
    for (a, b) in first
        .iter()
        .zip(second.iter())
        .filter(|(a, _)| !a.transaction_id.is_synthetic())
    {
        assert_eq!(a.match_id, b.match_id);
    }
}
