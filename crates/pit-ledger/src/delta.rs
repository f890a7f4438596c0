//! Deltas against a table's running result.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::{ChipFloat, LedgerError, MAX_DENOMINATION_SCALE, MAX_MONEY};

/// Which record type a contribution belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Source {
    CloseFloot,
    Plaque,
    FillCredit,
}

impl Source {
    pub fn as_str(&self) -> &'static str {
        match self {
            Source::CloseFloot => "close_floot",
            Source::Plaque => "plaque",
            Source::FillCredit => "fill_credit",
        }
    }
}

/// A signed change to the running result of one (table, game day).
///
/// Constructed only through [`Delta::create`], [`Delta::replace`] and
/// [`Delta::remove`], so every record mutation is expressed as
/// "remove the old contribution, add the new one".
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Delta {
    pub source: Source,
    #[serde(with = "rust_decimal::serde::float")]
    pub amount: Decimal,
}

impl Delta {
    /// A new record contributes `new`.
    pub fn create(source: Source, new: Decimal) -> Self {
        Self {
            source,
            amount: new,
        }
    }

    /// An existing record changes its contribution from `old` to `new`.
    pub fn replace(source: Source, old: Decimal, new: Decimal) -> Self {
        Self {
            source,
            amount: new - old,
        }
    }

    /// A record is removed; its contribution `old` is taken back.
    pub fn remove(source: Source, old: Decimal) -> Self {
        Self {
            source,
            amount: -old,
        }
    }

    pub fn is_zero(&self) -> bool {
        self.amount.is_zero()
    }
}

/// Win/loss of a closed table: what was found minus what it opened with.
pub fn close_result(close: &ChipFloat, open_total: Decimal) -> Decimal {
    close.total() - open_total
}

/// Fill removes chips from the table, credit adds chips to it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FillKind {
    Fill,
    Credit,
}

impl FillKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            FillKind::Fill => "fill",
            FillKind::Credit => "credit",
        }
    }
}

/// Classify a signed fill/credit amount. Zero is not a ledger entry.
///
/// Amounts finer than the money columns can store are rejected rather than
/// rounded, so the stored entry and its delta can never disagree.
pub fn classify_fill_credit(amount: Decimal) -> Result<FillKind, LedgerError> {
    if amount.is_zero() {
        return Err(LedgerError::ZeroAmount);
    }
    if amount.normalize().scale() > MAX_DENOMINATION_SCALE {
        return Err(LedgerError::TooPrecise(amount.to_string()));
    }
    if amount.abs() > MAX_MONEY {
        return Err(LedgerError::Overflow);
    }
    if amount.is_sign_negative() {
        Ok(FillKind::Fill)
    } else {
        Ok(FillKind::Credit)
    }
}
