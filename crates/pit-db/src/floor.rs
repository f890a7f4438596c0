//! Floor registry: halls, chip denominations, gaming tables, slot machines.

use chrono::NaiveDate;
use pit_ledger::{ChipFloat, RawFloat, MAX_DENOMINATION_SCALE, MAX_MONEY};
use rust_decimal::Decimal;
use sqlx::types::Json;
use sqlx::PgPool;
use tracing::info;

use crate::error::{conflict_on, missing_ref};
use crate::{
    ChipDenomination, DailyAmount, GamingTable, Hall, HallDailyTotal, SlotMachine, StoreError,
    StoreResult,
};

fn required_name(field: &str, value: &str) -> StoreResult<String> {
    let v = value.trim();
    if v.is_empty() {
        return Err(StoreError::Validation(format!("{field} cannot be empty")));
    }
    Ok(v.to_string())
}

async fn ensure_hall(pool: &PgPool, hall_id: Option<i64>) -> StoreResult<()> {
    let Some(id) = hall_id else {
        return Ok(());
    };
    let exists: Option<(i64,)> = sqlx::query_as("select id from halls where id = $1")
        .bind(id)
        .fetch_optional(pool)
        .await?;
    match exists {
        Some(_) => Ok(()),
        None => Err(StoreError::not_found("hall", id)),
    }
}

// ---------------------------------------------------------------------------
// Halls
// ---------------------------------------------------------------------------

pub async fn create_hall(pool: &PgPool, name: &str) -> StoreResult<Hall> {
    let name = required_name("hall name", name)?;
    let row = sqlx::query("insert into halls (name) values ($1) returning id, name, created_at")
        .bind(&name)
        .fetch_one(pool)
        .await
        .map_err(conflict_on(
            "uq_halls_name",
            format!("a hall named {name:?} already exists"),
        ))?;
    Ok(Hall::from_row(&row)?)
}

pub async fn list_halls(pool: &PgPool) -> StoreResult<Vec<Hall>> {
    let rows = sqlx::query("select id, name, created_at from halls order by name")
        .fetch_all(pool)
        .await?;
    rows.iter()
        .map(|r| Hall::from_row(r).map_err(StoreError::from))
        .collect()
}

// ---------------------------------------------------------------------------
// Chip denominations
// ---------------------------------------------------------------------------

pub async fn create_chip_denomination(
    pool: &PgPool,
    denomination: Decimal,
) -> StoreResult<ChipDenomination> {
    let denomination = denomination.normalize();
    if denomination <= Decimal::ZERO {
        return Err(StoreError::Validation(
            "denomination must be positive".to_string(),
        ));
    }
    if denomination.scale() > MAX_DENOMINATION_SCALE {
        return Err(StoreError::Validation(format!(
            "denomination {denomination} has more than {MAX_DENOMINATION_SCALE} decimal places"
        )));
    }

    let row = sqlx::query(
        r#"
        insert into chip_denominations (denomination)
        values ($1)
        returning id, denomination, created_at
        "#,
    )
    .bind(denomination)
    .fetch_one(pool)
    .await
    .map_err(conflict_on(
        "uq_chip_denominations_value",
        format!("denomination {denomination} already exists"),
    ))?;
    Ok(ChipDenomination::from_row(&row)?)
}

pub async fn list_chip_denominations(pool: &PgPool) -> StoreResult<Vec<ChipDenomination>> {
    let rows = sqlx::query(
        "select id, denomination, created_at from chip_denominations order by denomination",
    )
    .fetch_all(pool)
    .await?;
    rows.iter()
        .map(|r| ChipDenomination::from_row(r).map_err(StoreError::from))
        .collect()
}

// ---------------------------------------------------------------------------
// Gaming tables
// ---------------------------------------------------------------------------

const TABLE_COLUMNS: &str =
    "id, name, hall_id, open_flot, open_flot_total, created_at, updated_at";

#[derive(Debug, Clone)]
pub struct NewTable {
    pub name: String,
    pub open_flot: RawFloat,
    pub hall_id: Option<i64>,
}

pub async fn create_table(pool: &PgPool, new: &NewTable) -> StoreResult<GamingTable> {
    let name = required_name("table name", &new.name)?;
    let open = ChipFloat::parse(&new.open_flot)?;
    ensure_hall(pool, new.hall_id).await?;

    let sql = format!(
        r#"
        insert into gaming_tables (name, hall_id, open_flot, open_flot_total)
        values ($1, $2, $3, $4)
        returning {TABLE_COLUMNS}
        "#
    );
    let row = sqlx::query(&sql)
        .bind(&name)
        .bind(new.hall_id)
        .bind(Json(&open))
        .bind(open.total())
        .fetch_one(pool)
        .await
        .map_err(conflict_on(
            "uq_gaming_tables_name",
            format!("a table named {name:?} already exists"),
        ))?;

    let table = GamingTable::from_row(&row)?;
    info!(table_id = table.id, name = %table.name, open_total = %table.open_flot_total, "table created");
    Ok(table)
}

pub async fn fetch_table(pool: &PgPool, table_id: i64) -> StoreResult<GamingTable> {
    let sql = format!("select {TABLE_COLUMNS} from gaming_tables where id = $1");
    let row = sqlx::query(&sql)
        .bind(table_id)
        .fetch_optional(pool)
        .await?
        .ok_or_else(|| StoreError::not_found("table", table_id))?;
    Ok(GamingTable::from_row(&row)?)
}

/// All tables, optionally restricted to one hall, ordered by name.
pub async fn list_tables(pool: &PgPool, hall_id: Option<i64>) -> StoreResult<Vec<GamingTable>> {
    let sql = format!(
        "select {TABLE_COLUMNS} from gaming_tables \
         where ($1::bigint is null or hall_id = $1) order by name"
    );
    let rows = sqlx::query(&sql).bind(hall_id).fetch_all(pool).await?;
    rows.iter()
        .map(|r| GamingTable::from_row(r).map_err(StoreError::from))
        .collect()
}

/// Replace a table's opening float wholesale.
///
/// Rows already seeded for open game days keep the float they were seeded
/// with; the new float applies from the next `open_game_day`.
pub async fn replace_open_float(
    pool: &PgPool,
    table_id: i64,
    open_flot: &RawFloat,
) -> StoreResult<GamingTable> {
    let open = ChipFloat::parse(open_flot)?;
    let sql = format!(
        r#"
        update gaming_tables
        set open_flot = $2, open_flot_total = $3, updated_at = now()
        where id = $1
        returning {TABLE_COLUMNS}
        "#
    );
    let row = sqlx::query(&sql)
        .bind(table_id)
        .bind(Json(&open))
        .bind(open.total())
        .fetch_optional(pool)
        .await?
        .ok_or_else(|| StoreError::not_found("table", table_id))?;

    let table = GamingTable::from_row(&row)?;
    info!(table_id, open_total = %table.open_flot_total, "opening float replaced");
    Ok(table)
}

/// Remove a table together with every close float, plaque, fill/credit and
/// running result recorded against it. Returns the deleted table.
pub async fn delete_table(pool: &PgPool, table_id: i64) -> StoreResult<GamingTable> {
    let sql = format!("delete from gaming_tables where id = $1 returning {TABLE_COLUMNS}");
    let row = sqlx::query(&sql)
        .bind(table_id)
        .fetch_optional(pool)
        .await?
        .ok_or_else(|| StoreError::not_found("table", table_id))?;

    let table = GamingTable::from_row(&row)?;
    info!(table_id, name = %table.name, "table deleted");
    Ok(table)
}

/// Move a table into a hall, or out of any hall with `None`.
pub async fn assign_table_hall(
    pool: &PgPool,
    table_id: i64,
    hall_id: Option<i64>,
) -> StoreResult<GamingTable> {
    ensure_hall(pool, hall_id).await?;
    let sql = format!(
        r#"
        update gaming_tables
        set hall_id = $2, updated_at = now()
        where id = $1
        returning {TABLE_COLUMNS}
        "#
    );
    let row = sqlx::query(&sql)
        .bind(table_id)
        .bind(hall_id)
        .fetch_optional(pool)
        .await
        .map_err(missing_ref(format!("hall {hall_id:?} not found")))?
        .ok_or_else(|| StoreError::not_found("table", table_id))?;
    Ok(GamingTable::from_row(&row)?)
}

// ---------------------------------------------------------------------------
// Slot machines
// ---------------------------------------------------------------------------

const DAILY_AMOUNT_COLUMNS: &str = "id, slot_machine_id, game_day_id, amount, updated_at";

#[derive(Debug, Clone)]
pub struct NewSlotMachine {
    pub name: String,
    pub brand: String,
    pub hall_id: Option<i64>,
}

pub async fn create_slot_machine(pool: &PgPool, new: &NewSlotMachine) -> StoreResult<SlotMachine> {
    let name = required_name("slot machine name", &new.name)?;
    ensure_hall(pool, new.hall_id).await?;

    let row = sqlx::query(
        r#"
        insert into slot_machines (name, brand, hall_id)
        values ($1, $2, $3)
        returning id, name, brand, hall_id, created_at
        "#,
    )
    .bind(&name)
    .bind(new.brand.trim())
    .bind(new.hall_id)
    .fetch_one(pool)
    .await
    .map_err(conflict_on(
        "uq_slot_machines_name",
        format!("a slot machine named {name:?} already exists"),
    ))?;
    Ok(SlotMachine::from_row(&row)?)
}

pub async fn list_slot_machines(pool: &PgPool) -> StoreResult<Vec<SlotMachine>> {
    let rows =
        sqlx::query("select id, name, brand, hall_id, created_at from slot_machines order by name")
            .fetch_all(pool)
            .await?;
    rows.iter()
        .map(|r| SlotMachine::from_row(r).map_err(StoreError::from))
        .collect()
}

/// Record a slot machine's takings for an explicit game day.
///
/// The row must have been seeded by `open_game_day`.
pub async fn set_daily_amount(
    pool: &PgPool,
    slot_machine_id: i64,
    game_day_id: i64,
    amount: Decimal,
) -> StoreResult<DailyAmount> {
    if amount.abs() > MAX_MONEY {
        return Err(pit_ledger::LedgerError::Overflow.into());
    }
    let sql = format!(
        r#"
        update daily_amounts
        set amount = $3, updated_at = now()
        where slot_machine_id = $1 and game_day_id = $2
        returning {DAILY_AMOUNT_COLUMNS}
        "#
    );
    let row = sqlx::query(&sql)
        .bind(slot_machine_id)
        .bind(game_day_id)
        .bind(amount.round_dp(2))
        .fetch_optional(pool)
        .await?
        .ok_or_else(|| {
            StoreError::NotFound(format!(
                "no daily amount for slot machine {slot_machine_id} on game day {game_day_id}"
            ))
        })?;

    info!(slot_machine_id, game_day_id, amount = %amount, "daily amount set");
    Ok(DailyAmount::from_row(&row)?)
}

/// Every slot machine's takings on one game day, ordered by machine.
pub async fn list_daily_amounts(pool: &PgPool, game_day_id: i64) -> StoreResult<Vec<DailyAmount>> {
    let day: Option<(i64,)> = sqlx::query_as("select id from game_days where id = $1")
        .bind(game_day_id)
        .fetch_optional(pool)
        .await?;
    if day.is_none() {
        return Err(StoreError::not_found("game day", game_day_id));
    }

    let sql = format!(
        "select {DAILY_AMOUNT_COLUMNS} from daily_amounts \
         where game_day_id = $1 order by slot_machine_id"
    );
    let rows = sqlx::query(&sql).bind(game_day_id).fetch_all(pool).await?;
    rows.iter()
        .map(|r| DailyAmount::from_row(r).map_err(StoreError::from))
        .collect()
}

/// Per-hall slot takings for game days dated `from..=to`.
///
/// Every hall is listed, with a zero total when none of its machines has a
/// daily amount in the range. Machines outside any hall are not counted.
pub async fn hall_daily_totals(
    pool: &PgPool,
    from: NaiveDate,
    to: NaiveDate,
) -> StoreResult<Vec<HallDailyTotal>> {
    if from > to {
        return Err(StoreError::Validation(format!(
            "date range is empty: {from} is after {to}"
        )));
    }

    let rows = sqlx::query(
        r#"
        select h.id as hall_id,
               h.name,
               coalesce(sum(d.amount), 0) as total,
               count(d.id) as entries
        from halls h
        left join slot_machines s on s.hall_id = h.id
        left join (
            select da.id, da.slot_machine_id, da.amount
            from daily_amounts da
            join game_days g on g.id = da.game_day_id
            where g.date between $1 and $2
        ) d on d.slot_machine_id = s.id
        group by h.id, h.name
        order by h.name
        "#,
    )
    .bind(from)
    .bind(to)
    .fetch_all(pool)
    .await?;
    rows.iter()
        .map(|r| HallDailyTotal::from_row(r).map_err(StoreError::from))
        .collect()
}
