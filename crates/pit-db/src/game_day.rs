//! Game day lifecycle.
//!
//! Opening a day materialises one close float, one plaque and one running
//! result per table (and one daily amount per slot machine), so ledger
//! operations on that day always find their rows.

use chrono::{Days, NaiveDate};
use sqlx::{PgPool, Postgres, Transaction};
use tracing::info;

use crate::{GameDay, OpenedGameDay, StoreError, StoreResult};

const GAME_DAY_COLUMNS: &str = "id, date, created_at";

/// Open the game day for `date`, seeding child rows for every table and slot
/// machine (or only those in `hall_id`).
///
/// Fails with `Conflict` if the date already has a game day; nothing is
/// seeded in that case.
pub async fn open_game_day(
    pool: &PgPool,
    date: NaiveDate,
    hall_id: Option<i64>,
) -> StoreResult<OpenedGameDay> {
    let mut tx = pool.begin().await?;

    if let Some(id) = hall_id {
        let hall: Option<(i64,)> = sqlx::query_as("select id from halls where id = $1")
            .bind(id)
            .fetch_optional(&mut *tx)
            .await?;
        if hall.is_none() {
            return Err(StoreError::not_found("hall", id));
        }
    }

    let sql = format!(
        r#"
        insert into game_days (date)
        values ($1)
        on conflict (date) do nothing
        returning {GAME_DAY_COLUMNS}
        "#
    );
    let row = sqlx::query(&sql)
        .bind(date)
        .fetch_optional(&mut *tx)
        .await?
        .ok_or_else(|| StoreError::Conflict(format!("a game day for {date} already exists")))?;
    let game_day = GameDay::from_row(&row)?;

    let (seeded_tables, seeded_slot_machines) = seed_day(&mut tx, game_day.id, hall_id).await?;
    tx.commit().await?;

    info!(
        game_day_id = game_day.id,
        %date,
        ?hall_id,
        seeded_tables,
        seeded_slot_machines,
        "game day opened"
    );

    Ok(OpenedGameDay {
        game_day,
        seeded_tables,
        seeded_slot_machines,
    })
}

async fn seed_day(
    tx: &mut Transaction<'_, Postgres>,
    game_day_id: i64,
    hall_id: Option<i64>,
) -> StoreResult<(u64, u64)> {
    // Close floats start as the opening float: close total == open total, result 0.
    let tables = sqlx::query(
        r#"
        insert into close_floots (table_id, game_day_id, close_flot, close_flot_total, result, status)
        select t.id, $1, t.open_flot, t.open_flot_total, 0, 'OPEN'
        from gaming_tables t
        where ($2::bigint is null or t.hall_id = $2)
        "#,
    )
    .bind(game_day_id)
    .bind(hall_id)
    .execute(&mut **tx)
    .await?
    .rows_affected();

    sqlx::query(
        r#"
        insert into plaques (table_id, game_day_id)
        select t.id, $1
        from gaming_tables t
        where ($2::bigint is null or t.hall_id = $2)
        "#,
    )
    .bind(game_day_id)
    .bind(hall_id)
    .execute(&mut **tx)
    .await?;

    sqlx::query(
        r#"
        insert into table_results (table_id, game_day_id, result)
        select t.id, $1, 0
        from gaming_tables t
        where ($2::bigint is null or t.hall_id = $2)
        "#,
    )
    .bind(game_day_id)
    .bind(hall_id)
    .execute(&mut **tx)
    .await?;

    let slot_machines = sqlx::query(
        r#"
        insert into daily_amounts (slot_machine_id, game_day_id, amount)
        select s.id, $1, 0
        from slot_machines s
        where ($2::bigint is null or s.hall_id = $2)
        "#,
    )
    .bind(game_day_id)
    .bind(hall_id)
    .execute(&mut **tx)
    .await?
    .rows_affected();

    Ok((tables, slot_machines))
}

/// Open the day after the most recent game day.
pub async fn roll_game_day(pool: &PgPool, hall_id: Option<i64>) -> StoreResult<OpenedGameDay> {
    let (latest,): (Option<NaiveDate>,) = sqlx::query_as("select max(date) from game_days")
        .fetch_one(pool)
        .await?;
    let Some(latest) = latest else {
        return Err(StoreError::NotFound(
            "no game day exists yet; open one with an explicit date".to_string(),
        ));
    };
    let next = latest
        .checked_add_days(Days::new(1))
        .ok_or_else(|| StoreError::Validation(format!("no day after {latest}")))?;
    open_game_day(pool, next, hall_id).await
}

pub async fn list_game_days(pool: &PgPool) -> StoreResult<Vec<GameDay>> {
    let sql = format!("select {GAME_DAY_COLUMNS} from game_days order by date");
    let rows = sqlx::query(&sql).fetch_all(pool).await?;
    rows.iter()
        .map(|r| GameDay::from_row(r).map_err(StoreError::from))
        .collect()
}

pub async fn fetch_game_day(pool: &PgPool, game_day_id: i64) -> StoreResult<GameDay> {
    let sql = format!("select {GAME_DAY_COLUMNS} from game_days where id = $1");
    let row = sqlx::query(&sql)
        .bind(game_day_id)
        .fetch_optional(pool)
        .await?
        .ok_or_else(|| StoreError::not_found("game day", game_day_id))?;
    Ok(GameDay::from_row(&row)?)
}

pub async fn find_game_day_by_date(pool: &PgPool, date: NaiveDate) -> StoreResult<Option<GameDay>> {
    let sql = format!("select {GAME_DAY_COLUMNS} from game_days where date = $1");
    let row = sqlx::query(&sql).bind(date).fetch_optional(pool).await?;
    row.map(|r| GameDay::from_row(&r).map_err(StoreError::from))
        .transpose()
}
