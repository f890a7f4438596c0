//! Chip floats: denomination -> quantity mappings and their totals.

use std::collections::BTreeMap;
use std::str::FromStr;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::LedgerError;

/// Largest number of fractional digits a denomination may carry.
/// Matches the `NUMERIC(18,4)` money columns.
pub const MAX_DENOMINATION_SCALE: u32 = 4;

/// Largest magnitude a money column holds: `10^14 - 0.0001`.
pub const MAX_MONEY: Decimal = Decimal::from_parts(0xA763_FFFF, 0x0DE0_B6B3, 0, false, 4);

/// Float exactly as submitted over the wire: decimal-string keys, signed counts.
pub type RawFloat = BTreeMap<String, i64>;

/// A validated chip count.
///
/// Keys are positive denominations (normalised, so `"5.00"` and `"5"` are the
/// same chip), quantities are non-negative. The total is computed once at
/// construction with checked arithmetic.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "RawFloat", into = "RawFloat")]
pub struct ChipFloat {
    counts: BTreeMap<Decimal, i64>,
    total: Decimal,
}

impl ChipFloat {
    pub fn empty() -> Self {
        Self::default()
    }

    /// Validate a raw float.
    ///
    /// Key errors are reported first (one at a time); negative quantities are
    /// reported together so the operator sees every bad line in one go.
    pub fn parse(raw: &RawFloat) -> Result<Self, LedgerError> {
        let mut counts: BTreeMap<Decimal, i64> = BTreeMap::new();
        let mut negatives: Vec<String> = Vec::new();

        for (key, &quantity) in raw {
            let denomination = parse_denomination(key)?;
            if counts.insert(denomination, quantity).is_some() {
                return Err(LedgerError::InvalidDenomination {
                    key: key.clone(),
                    reason: "duplicate denomination",
                });
            }
            if quantity < 0 {
                negatives.push(key.trim().to_string());
            }
        }

        if !negatives.is_empty() {
            return Err(LedgerError::NegativeQuantity {
                denominations: negatives,
            });
        }

        let mut total = Decimal::ZERO;
        for (denomination, quantity) in &counts {
            let line = denomination
                .checked_mul(Decimal::from(*quantity))
                .ok_or(LedgerError::Overflow)?;
            total = total.checked_add(line).ok_or(LedgerError::Overflow)?;
        }
        if total > MAX_MONEY {
            return Err(LedgerError::Overflow);
        }

        Ok(Self { counts, total })
    }

    /// `Σ denomination × quantity`.
    pub fn total(&self) -> Decimal {
        self.total
    }

    pub fn is_empty(&self) -> bool {
        self.counts.is_empty()
    }

    pub fn quantity(&self, denomination: Decimal) -> i64 {
        self.counts
            .get(&denomination.normalize())
            .copied()
            .unwrap_or(0)
    }

    /// Iterate lines in ascending denomination order.
    pub fn lines(&self) -> impl Iterator<Item = (Decimal, i64)> + '_ {
        self.counts.iter().map(|(d, q)| (*d, *q))
    }

    pub fn to_raw(&self) -> RawFloat {
        self.counts
            .iter()
            .map(|(d, q)| (d.to_string(), *q))
            .collect()
    }
}

impl TryFrom<RawFloat> for ChipFloat {
    type Error = LedgerError;

    fn try_from(raw: RawFloat) -> Result<Self, Self::Error> {
        ChipFloat::parse(&raw)
    }
}

impl From<ChipFloat> for RawFloat {
    fn from(f: ChipFloat) -> Self {
        f.to_raw()
    }
}

fn parse_denomination(key: &str) -> Result<Decimal, LedgerError> {
    let invalid = |reason| LedgerError::InvalidDenomination {
        key: key.to_string(),
        reason,
    };

    let d = Decimal::from_str(key.trim()).map_err(|_| invalid("not a decimal number"))?;
    if d <= Decimal::ZERO {
        return Err(invalid("must be positive"));
    }
    let d = d.normalize();
    if d.scale() > MAX_DENOMINATION_SCALE {
        return Err(invalid("too many decimal places"));
    }
    Ok(d)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn raw(lines: &[(&str, i64)]) -> RawFloat {
        lines.iter().map(|(k, q)| (k.to_string(), *q)).collect()
    }

    #[test]
    fn normalises_equivalent_keys() {
        let f = ChipFloat::parse(&raw(&[("5.00", 2), ("0.50", 4)])).unwrap();
        assert_eq!(f.to_raw(), raw(&[("0.5", 4), ("5", 2)]));
        assert_eq!(f.total(), Decimal::from(12));
    }

    #[test]
    fn duplicate_after_normalisation_is_rejected() {
        let err = ChipFloat::parse(&raw(&[("5", 1), ("5.0", 1)])).unwrap_err();
        assert!(matches!(err, LedgerError::InvalidDenomination { .. }));
    }

    #[test]
    fn lines_are_sorted_by_value_not_text() {
        let f = ChipFloat::parse(&raw(&[("100", 1), ("25", 1), ("5", 1)])).unwrap();
        let order: Vec<String> = f.lines().map(|(d, _)| d.to_string()).collect();
        assert_eq!(order, vec!["5", "25", "100"]);
    }
}
