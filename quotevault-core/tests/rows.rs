use chrono::NaiveDate;
use rust_decimal::Decimal;

use quotevault_core::{CanonicalRow, RowKey, VaultError, row_key};

fn d(y: i32, m: u32, day: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, day).unwrap()
}

#[test]
fn row_renders_with_and_without_volume() {
    let mut row = CanonicalRow {
        symbol: "AAPL".to_string(),
        date: d(2024, 1, 5),
        open: Decimal::new(18125, 2),
        high: Decimal::new(18250, 2),
        low: Decimal::new(18050, 2),
        close: Decimal::new(18199, 2),
        volume: Some(61_234_500),
    };
    assert_eq!(
        row.to_string(),
        "AAPL,20240105,181.25,182.50,180.50,181.99,61234500"
    );
    row.volume = None;
    assert_eq!(row.to_string(), "AAPL,20240105,181.25,182.50,180.50,181.99");
}

#[test]
fn row_parse_round_trip() {
    for raw in [
        "AAPL,20240105,181.25,182.50,180.50,181.99,61234500",
        "AAPL,20240105,181.25,182.50,180.50,181.99",
    ] {
        let row: CanonicalRow = raw.parse().unwrap();
        assert_eq!(row.to_string(), raw);
    }
}

#[test]
fn row_parse_rejects_malformed_lines() {
    let cases = [
        "AAPL,20240105,181.25,182.50,180.50",            // too few fields
        "AAPL,20240105,181.25,182.50,180.50,181.99,1,2", // too many
        ",20240105,181.25,182.50,180.50,181.99",         // empty symbol
        "AAPL,2024-01-05,181.25,182.50,180.50,181.99",   // wrong date format
        "AAPL,20240105,abc,182.50,180.50,181.99",        // bad price
        "AAPL,20240105,181.25,182.50,180.50,181.99,-1",  // bad volume
    ];
    for raw in cases {
        let err = raw.parse::<CanonicalRow>();
        assert!(matches!(err, Err(VaultError::Data(_))), "accepted: {raw}");
    }
}

#[test]
fn row_key_extracts_without_full_parse() {
    let key = row_key("AAPL,20240105,181.25,182.50,180.50,181.99").unwrap();
    assert_eq!(key.date, "20240105");
    assert_eq!(key.symbol, "AAPL");

    assert_eq!(row_key(""), None);
    assert_eq!(row_key("AAPL"), None);
    assert_eq!(row_key("AAPL,2024"), None);
    assert_eq!(row_key(",20240105,1,1,1,1"), None);
}

#[test]
fn row_key_orders_by_date_then_symbol() {
    let older = RowKey {
        date: "20240104".to_string(),
        symbol: "ZZZ".to_string(),
    };
    let newer = RowKey {
        date: "20240105".to_string(),
        symbol: "AAA".to_string(),
    };
    assert!(older < newer);

    let a = RowKey {
        date: "20240105".to_string(),
        symbol: "AAPL".to_string(),
    };
    let b = RowKey {
        date: "20240105".to_string(),
        symbol: "MSFT".to_string(),
    };
    assert!(a < b);
}

#[test]
fn error_helpers_and_scoping() {
    assert!(VaultError::item_timeout("AAPL").is_item_scoped());
    assert!(VaultError::cancelled("AAPL").is_item_scoped());
    assert!(VaultError::adapter("mock", "boom").is_item_scoped());
    assert!(!VaultError::invalid_arg("bad").is_item_scoped());
    assert!(!VaultError::empty_source("a.csv").is_item_scoped());

    let io: VaultError = std::io::Error::other("disk gone").into();
    assert!(matches!(io, VaultError::Io(_)));
}
