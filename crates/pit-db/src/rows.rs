//! Row types and their decoders.

use chrono::{DateTime, NaiveDate, Utc};
use pit_ledger::{ChipFloat, FillKind};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sqlx::postgres::PgRow;
use sqlx::types::Json;
use sqlx::Row;

use crate::StoreError;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Hall {
    pub id: i64,
    pub name: String,
    pub created_at: DateTime<Utc>,
}

impl Hall {
    pub(crate) fn from_row(row: &PgRow) -> Result<Self, sqlx::Error> {
        Ok(Self {
            id: row.try_get("id")?,
            name: row.try_get("name")?,
            created_at: row.try_get("created_at")?,
        })
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChipDenomination {
    pub id: i64,
    #[serde(with = "rust_decimal::serde::float")]
    pub denomination: Decimal,
    pub created_at: DateTime<Utc>,
}

impl ChipDenomination {
    pub(crate) fn from_row(row: &PgRow) -> Result<Self, sqlx::Error> {
        Ok(Self {
            id: row.try_get("id")?,
            denomination: row.try_get::<Decimal, _>("denomination")?.normalize(),
            created_at: row.try_get("created_at")?,
        })
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GamingTable {
    pub id: i64,
    pub name: String,
    pub hall_id: Option<i64>,
    pub open_flot: ChipFloat,
    #[serde(with = "rust_decimal::serde::float")]
    pub open_flot_total: Decimal,
    pub created_at: DateTime<Utc>,
    pub updated_at: Option<DateTime<Utc>>,
}

impl GamingTable {
    pub(crate) fn from_row(row: &PgRow) -> Result<Self, sqlx::Error> {
        Ok(Self {
            id: row.try_get("id")?,
            name: row.try_get("name")?,
            hall_id: row.try_get("hall_id")?,
            open_flot: row.try_get::<Json<ChipFloat>, _>("open_flot")?.0,
            open_flot_total: row.try_get::<Decimal, _>("open_flot_total")?.normalize(),
            created_at: row.try_get("created_at")?,
            updated_at: row.try_get("updated_at")?,
        })
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SlotMachine {
    pub id: i64,
    pub name: String,
    pub brand: String,
    pub hall_id: Option<i64>,
    pub created_at: DateTime<Utc>,
}

impl SlotMachine {
    pub(crate) fn from_row(row: &PgRow) -> Result<Self, sqlx::Error> {
        Ok(Self {
            id: row.try_get("id")?,
            name: row.try_get("name")?,
            brand: row.try_get("brand")?,
            hall_id: row.try_get("hall_id")?,
            created_at: row.try_get("created_at")?,
        })
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DailyAmount {
    pub id: i64,
    pub slot_machine_id: i64,
    pub game_day_id: i64,
    #[serde(with = "rust_decimal::serde::float")]
    pub amount: Decimal,
    pub updated_at: Option<DateTime<Utc>>,
}

impl DailyAmount {
    pub(crate) fn from_row(row: &PgRow) -> Result<Self, sqlx::Error> {
        Ok(Self {
            id: row.try_get("id")?,
            slot_machine_id: row.try_get("slot_machine_id")?,
            game_day_id: row.try_get("game_day_id")?,
            amount: row.try_get::<Decimal, _>("amount")?.normalize(),
            updated_at: row.try_get("updated_at")?,
        })
    }
}

/// A hall's slot-machine takings summed over a date range.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HallDailyTotal {
    pub hall_id: i64,
    pub name: String,
    #[serde(with = "rust_decimal::serde::float")]
    pub total: Decimal,
    /// Daily amount rows that fell inside the range.
    pub entries: i64,
}

impl HallDailyTotal {
    pub(crate) fn from_row(row: &PgRow) -> Result<Self, sqlx::Error> {
        Ok(Self {
            hall_id: row.try_get("hall_id")?,
            name: row.try_get("name")?,
            total: row.try_get::<Decimal, _>("total")?.normalize(),
            entries: row.try_get("entries")?,
        })
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GameDay {
    pub id: i64,
    pub date: NaiveDate,
    pub created_at: DateTime<Utc>,
}

impl GameDay {
    pub(crate) fn from_row(row: &PgRow) -> Result<Self, sqlx::Error> {
        Ok(Self {
            id: row.try_get("id")?,
            date: row.try_get("date")?,
            created_at: row.try_get("created_at")?,
        })
    }
}

/// Result of opening a game day: the day plus how many child rows were seeded.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OpenedGameDay {
    pub game_day: GameDay,
    pub seeded_tables: u64,
    pub seeded_slot_machines: u64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum CloseStatus {
    Open,
    Closed,
}

impl CloseStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            CloseStatus::Open => "OPEN",
            CloseStatus::Closed => "CLOSED",
        }
    }

    pub fn parse(s: &str) -> Result<Self, StoreError> {
        match s {
            "OPEN" => Ok(CloseStatus::Open),
            "CLOSED" => Ok(CloseStatus::Closed),
            other => Err(StoreError::Database(sqlx::Error::Decode(
                format!("invalid close status: {other}").into(),
            ))),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CloseFloot {
    pub id: i64,
    pub table_id: i64,
    pub game_day_id: i64,
    pub close_flot: ChipFloat,
    #[serde(with = "rust_decimal::serde::float")]
    pub close_flot_total: Decimal,
    #[serde(with = "rust_decimal::serde::float")]
    pub result: Decimal,
    pub status: CloseStatus,
    pub close_date: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: Option<DateTime<Utc>>,
}

impl CloseFloot {
    pub(crate) fn from_row(row: &PgRow) -> Result<Self, StoreError> {
        Ok(Self {
            id: row.try_get("id")?,
            table_id: row.try_get("table_id")?,
            game_day_id: row.try_get("game_day_id")?,
            close_flot: row.try_get::<Json<ChipFloat>, _>("close_flot")?.0,
            close_flot_total: row.try_get::<Decimal, _>("close_flot_total")?.normalize(),
            result: row.try_get::<Decimal, _>("result")?.normalize(),
            status: CloseStatus::parse(&row.try_get::<String, _>("status")?)?,
            close_date: row.try_get("close_date")?,
            created_at: row.try_get("created_at")?,
            updated_at: row.try_get("updated_at")?,
        })
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Plaque {
    pub id: i64,
    pub table_id: i64,
    pub game_day_id: i64,
    pub plaques: ChipFloat,
    #[serde(with = "rust_decimal::serde::float")]
    pub plaques_total: Decimal,
    pub created_at: DateTime<Utc>,
    pub updated_at: Option<DateTime<Utc>>,
}

impl Plaque {
    pub(crate) fn from_row(row: &PgRow) -> Result<Self, sqlx::Error> {
        Ok(Self {
            id: row.try_get("id")?,
            table_id: row.try_get("table_id")?,
            game_day_id: row.try_get("game_day_id")?,
            plaques: row.try_get::<Json<ChipFloat>, _>("plaques")?.0,
            plaques_total: row.try_get::<Decimal, _>("plaques_total")?.normalize(),
            created_at: row.try_get("created_at")?,
            updated_at: row.try_get("updated_at")?,
        })
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FillCredit {
    pub id: i64,
    pub table_id: i64,
    pub game_day_id: i64,
    #[serde(with = "rust_decimal::serde::float")]
    pub fill_credit: Decimal,
    pub kind: FillKind,
    pub action_time: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: Option<DateTime<Utc>>,
}

impl FillCredit {
    pub(crate) fn from_row(row: &PgRow) -> Result<Self, StoreError> {
        let fill_credit = row.try_get::<Decimal, _>("fill_credit")?.normalize();
        Ok(Self {
            id: row.try_get("id")?,
            table_id: row.try_get("table_id")?,
            game_day_id: row.try_get("game_day_id")?,
            kind: pit_ledger::classify_fill_credit(fill_credit)?,
            fill_credit,
            action_time: row.try_get("action_time")?,
            created_at: row.try_get("created_at")?,
            updated_at: row.try_get("updated_at")?,
        })
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TableResult {
    pub id: i64,
    pub table_id: i64,
    pub game_day_id: i64,
    #[serde(with = "rust_decimal::serde::float")]
    pub result: Decimal,
    pub updated_at: DateTime<Utc>,
}

impl TableResult {
    pub(crate) fn from_row(row: &PgRow) -> Result<Self, sqlx::Error> {
        Ok(Self {
            id: row.try_get("id")?,
            table_id: row.try_get("table_id")?,
            game_day_id: row.try_get("game_day_id")?,
            result: row.try_get::<Decimal, _>("result")?.normalize(),
            updated_at: row.try_get("updated_at")?,
        })
    }
}
