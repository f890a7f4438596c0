//! Running-result audit.
//!
//! Recomputes `close result + plaques total + Σ fill/credit` for every table
//! of a game day and compares it against the stored running result.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Stored running result of one table alongside the records feeding it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResultBreakdown {
    pub table_id: i64,
    #[serde(with = "rust_decimal::serde::float")]
    pub recorded: Decimal,
    #[serde(with = "rust_decimal::serde::float")]
    pub close_result: Decimal,
    #[serde(with = "rust_decimal::serde::float")]
    pub plaques_total: Decimal,
    #[serde(with = "rust_decimal::serde::float")]
    pub fill_credit_sum: Decimal,
    pub fill_credit_count: i64,
}

impl ResultBreakdown {
    pub fn expected(&self) -> Decimal {
        self.close_result + self.plaques_total + self.fill_credit_sum
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResultDrift {
    pub table_id: i64,
    #[serde(with = "rust_decimal::serde::float")]
    pub recorded: Decimal,
    #[serde(with = "rust_decimal::serde::float")]
    pub expected: Decimal,
    /// `recorded - expected`
    #[serde(with = "rust_decimal::serde::float")]
    pub difference: Decimal,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuditReport {
    pub game_day_id: i64,
    pub tables_checked: usize,
    pub drifts: Vec<ResultDrift>,
}

impl AuditReport {
    pub fn is_clean(&self) -> bool {
        self.drifts.is_empty()
    }
}

/// Deterministic audit: drifts come out in table order.
pub fn audit(game_day_id: i64, breakdowns: &[ResultBreakdown]) -> AuditReport {
    let mut drifts: Vec<ResultDrift> = breakdowns
        .iter()
        .filter_map(|b| {
            let expected = b.expected();
            (b.recorded != expected).then(|| ResultDrift {
                table_id: b.table_id,
                recorded: b.recorded,
                expected,
                difference: b.recorded - expected,
            })
        })
        .collect();
    drifts.sort_by_key(|d| d.table_id);

    AuditReport {
        game_day_id,
        tables_checked: breakdowns.len(),
        drifts,
    }
}
