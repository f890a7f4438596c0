use pit_ledger::{ChipFloat, LedgerError, RawFloat};
use rust_decimal::Decimal;

fn raw(lines: &[(&str, i64)]) -> RawFloat {
    lines.iter().map(|(k, q)| (k.to_string(), *q)).collect()
}

#[test]
fn total_is_sum_of_denomination_times_quantity() {
    let f = ChipFloat::parse(&raw(&[("5", 10), ("25", 4)])).unwrap();
    assert_eq!(f.total(), Decimal::from(150));
    assert_eq!(f.quantity(Decimal::from(25)), 4);
    assert_eq!(f.quantity(Decimal::from(100)), 0);
}

#[test]
fn fractional_denominations_are_exact() {
    let f = ChipFloat::parse(&raw(&[("0.25", 3), ("2.5", 2)])).unwrap();
    assert_eq!(f.total(), Decimal::new(575, 2));
}

#[test]
fn empty_float_totals_zero() {
    let f = ChipFloat::parse(&RawFloat::new()).unwrap();
    assert!(f.is_empty());
    assert_eq!(f.total(), Decimal::ZERO);
}

#[test]
fn zero_quantity_is_allowed() {
    let f = ChipFloat::parse(&raw(&[("100", 0), ("5", 1)])).unwrap();
    assert_eq!(f.total(), Decimal::from(5));
}

#[test]
fn negative_quantities_are_all_listed() {
    let err = ChipFloat::parse(&raw(&[("5", -1), ("25", 3), ("100", -2)])).unwrap_err();
    match &err {
        LedgerError::NegativeQuantity { denominations } => {
            assert_eq!(denominations, &vec!["100".to_string(), "5".to_string()]);
        }
        other => panic!("expected NegativeQuantity, got {other:?}"),
    }
    let msg = err.to_string();
    assert!(msg.contains("100") && msg.contains('5'), "{msg}");
}

#[test]
fn malformed_keys_are_rejected() {
    for key in ["abc", "", "0", "-5", "1.00001"] {
        let err = ChipFloat::parse(&raw(&[(key, 1)])).unwrap_err();
        assert!(
            matches!(err, LedgerError::InvalidDenomination { .. }),
            "key {key:?} gave {err:?}"
        );
    }
}

#[test]
fn overflow_is_an_error_not_a_panic() {
    let err = ChipFloat::parse(&raw(&[("10000000000000", i64::MAX)])).unwrap_err();
    assert_eq!(err, LedgerError::Overflow);
}

#[test]
fn json_round_trip_uses_string_keys() {
    let f: ChipFloat = serde_json::from_str(r#"{"25": 4, "5.0": 10}"#).unwrap();
    let v = serde_json::to_value(&f).unwrap();
    assert_eq!(v, serde_json::json!({"25": 4, "5": 10}));
}

#[test]
fn json_with_negative_quantity_fails_to_deserialize() {
    let res: Result<ChipFloat, _> = serde_json::from_str(r#"{"5": -1}"#);
    assert!(res.is_err());
}
