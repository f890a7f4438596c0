//! Request and response types for pit-daemon HTTP endpoints.
//!
//! Field names follow the floor's existing clients (`table`, `game_day`,
//! `close_flot`, ...). Money is carried as JSON numbers. No business logic
//! lives here.

use chrono::{DateTime, NaiveDate, Utc};
use pit_ledger::RawFloat;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// /v1/health
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthResponse {
    pub ok: bool,
    pub service: String,
    pub version: String,
}

// ---------------------------------------------------------------------------
// Close floats / plaques
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CloseFlootRequest {
    pub table: i64,
    pub game_day: i64,
    pub close_flot: RawFloat,
}

/// Absent `close_flot` leaves the record unchanged.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CloseFlootUpdate {
    #[serde(default)]
    pub close_flot: Option<RawFloat>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PlaqueRequest {
    pub table: i64,
    pub game_day: i64,
    pub plaques: RawFloat,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PlaqueUpdate {
    #[serde(default)]
    pub plaques: Option<RawFloat>,
}

// ---------------------------------------------------------------------------
// Fills / credits
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FillCreditRequest {
    pub table: i64,
    /// Required unless `action_time` is given.
    #[serde(default)]
    pub game_day: Option<i64>,
    /// Negative = fill, positive = credit.
    #[serde(with = "rust_decimal::serde::float")]
    pub fill_credit: Decimal,
    #[serde(default)]
    pub action_time: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct FillCreditUpdate {
    #[serde(default, with = "rust_decimal::serde::float_option")]
    pub fill_credit: Option<Decimal>,
    #[serde(default)]
    pub action_time: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct FillCreditQuery {
    pub table: Option<i64>,
    pub game_day: Option<i64>,
}

// ---------------------------------------------------------------------------
// Game days
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateGameDayRequest {
    pub date: NaiveDate,
    /// Seed only this hall's tables and slot machines.
    #[serde(default)]
    pub hall: Option<i64>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RollGameDayRequest {
    #[serde(default)]
    pub hall: Option<i64>,
}

// ---------------------------------------------------------------------------
// Floor registry
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateTableRequest {
    pub name: String,
    #[serde(default)]
    pub open_flot: RawFloat,
    #[serde(default)]
    pub hall: Option<i64>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OpenFloatUpdate {
    pub open_flot: RawFloat,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TableListQuery {
    pub hall: Option<i64>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateHallRequest {
    pub name: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateChipRequest {
    #[serde(with = "rust_decimal::serde::float")]
    pub denomination: Decimal,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateSlotMachineRequest {
    pub name: String,
    #[serde(default)]
    pub brand: String,
    #[serde(default)]
    pub hall: Option<i64>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DailyAmountRequest {
    pub game_day: i64,
    #[serde(with = "rust_decimal::serde::float")]
    pub amount: Decimal,
}

/// Inclusive game day date range.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HallSummaryQuery {
    pub from: NaiveDate,
    pub to: NaiveDate,
}
