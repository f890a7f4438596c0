//! Reconciliation engine.
//!
//! Close floats, plaques and fill/credits each contribute to the running
//! `table_results.result` of their (table, game day). Every mutation here:
//! 1. locks the record row it changes (`FOR UPDATE`),
//! 2. writes the record,
//! 3. moves the running result by the net [`Delta`] via [`apply_delta`],
//!
//! all inside one transaction, so `result == close result + plaques total +
//! Σ fill/credit` holds after every commit, also under concurrent writers.

use chrono::{DateTime, Utc};
use pit_ledger::{
    audit, classify_fill_credit, close_result, AuditReport, ChipFloat, Delta, GamingDayClock,
    RawFloat, ResultBreakdown, Source,
};
use rust_decimal::Decimal;
use sqlx::types::Json;
use sqlx::{PgConnection, PgPool, Row};
use tracing::info;

use crate::error::out_of_range;
use crate::{CloseFloot, FillCredit, Plaque, StoreError, StoreResult, TableResult};

const CLOSE_FLOOT_COLUMNS: &str = "id, table_id, game_day_id, close_flot, close_flot_total, \
                                   result, status, close_date, created_at, updated_at";
const PLAQUE_COLUMNS: &str =
    "id, table_id, game_day_id, plaques, plaques_total, created_at, updated_at";
const FILL_CREDIT_COLUMNS: &str =
    "id, table_id, game_day_id, fill_credit, action_time, created_at, updated_at";
const TABLE_RESULT_COLUMNS: &str = "id, table_id, game_day_id, result, updated_at";

// ---------------------------------------------------------------------------
// The running-result primitive
// ---------------------------------------------------------------------------

/// Move the running result of (table, game day) by `delta`, creating the row
/// if absent. Returns the new running result.
///
/// Single statement: the upsert takes the row lock, so concurrent deltas on
/// the same pair serialise instead of losing updates. Callers pass their
/// open transaction so the record write and the delta commit together.
pub async fn apply_delta(
    conn: &mut PgConnection,
    table_id: i64,
    game_day_id: i64,
    delta: Delta,
) -> StoreResult<Decimal> {
    let (result,): (Decimal,) = sqlx::query_as(
        r#"
        insert into table_results (table_id, game_day_id, result, updated_at)
        values ($1, $2, $3, now())
        on conflict (table_id, game_day_id)
        do update set result = table_results.result + excluded.result,
                      updated_at = now()
        returning result
        "#,
    )
    .bind(table_id)
    .bind(game_day_id)
    .bind(delta.amount)
    .fetch_one(&mut *conn)
    .await
    .map_err(out_of_range)?;

    let result = result.normalize();
    info!(
        table_id,
        game_day_id,
        source = delta.source.as_str(),
        delta = %delta.amount,
        running = %result,
        "running result moved"
    );
    Ok(result)
}

// ---------------------------------------------------------------------------
// Lookups shared by the mutating paths
// ---------------------------------------------------------------------------

async fn table_open_total(conn: &mut PgConnection, table_id: i64) -> StoreResult<Decimal> {
    let row: Option<(Decimal,)> =
        sqlx::query_as("select open_flot_total from gaming_tables where id = $1")
            .bind(table_id)
            .fetch_optional(&mut *conn)
            .await?;
    row.map(|(t,)| t)
        .ok_or_else(|| StoreError::not_found("table", table_id))
}

async fn ensure_game_day(conn: &mut PgConnection, game_day_id: i64) -> StoreResult<()> {
    let row: Option<(i64,)> = sqlx::query_as("select id from game_days where id = $1")
        .bind(game_day_id)
        .fetch_optional(&mut *conn)
        .await?;
    row.map(|_| ())
        .ok_or_else(|| StoreError::not_found("game day", game_day_id))
}

/// Game day a fill/credit books against.
///
/// An action time wins over the caller's id: the day is re-derived from the
/// timestamp's gaming date and must exist.
async fn resolve_game_day(
    conn: &mut PgConnection,
    clock: &GamingDayClock,
    game_day_id: Option<i64>,
    action_time: Option<DateTime<Utc>>,
) -> StoreResult<i64> {
    if let Some(at) = action_time {
        let date = clock.gaming_date(at);
        let row: Option<(i64,)> = sqlx::query_as("select id from game_days where date = $1")
            .bind(date)
            .fetch_optional(&mut *conn)
            .await?;
        return row.map(|(id,)| id).ok_or_else(|| {
            StoreError::NotFound(format!("no game day for gaming date {date} (action_time {at})"))
        });
    }

    let id = game_day_id.ok_or_else(|| {
        StoreError::Validation("game_day is required when action_time is absent".to_string())
    })?;
    ensure_game_day(conn, id).await?;
    Ok(id)
}

// ---------------------------------------------------------------------------
// Close floats
// ---------------------------------------------------------------------------

/// Close a table for a game day: upsert its close float and move the running
/// result by the change in close result.
pub async fn submit_close_floot(
    pool: &PgPool,
    table_id: i64,
    game_day_id: i64,
    close_flot: &RawFloat,
) -> StoreResult<CloseFloot> {
    let close = ChipFloat::parse(close_flot)?;

    let mut tx = pool.begin().await?;
    let open_total = table_open_total(&mut tx, table_id).await?;
    ensure_game_day(&mut tx, game_day_id).await?;

    // Make sure the (table, day) row exists, then lock it. A placeholder
    // contributes 0 and is overwritten below in the same transaction.
    sqlx::query(
        r#"
        insert into close_floots (table_id, game_day_id)
        values ($1, $2)
        on conflict (table_id, game_day_id) do nothing
        "#,
    )
    .bind(table_id)
    .bind(game_day_id)
    .execute(&mut *tx)
    .await?;

    let (id, old_result): (i64, Decimal) = sqlx::query_as(
        r#"
        select id, result
        from close_floots
        where table_id = $1 and game_day_id = $2
        for update
        "#,
    )
    .bind(table_id)
    .bind(game_day_id)
    .fetch_one(&mut *tx)
    .await?;

    let new_result = close_result(&close, open_total);
    let sql = format!(
        r#"
        update close_floots
        set close_flot = $2,
            close_flot_total = $3,
            result = $4,
            status = 'CLOSED',
            close_date = now(),
            updated_at = now()
        where id = $1
        returning {CLOSE_FLOOT_COLUMNS}
        "#
    );
    let row = sqlx::query(&sql)
        .bind(id)
        .bind(Json(&close))
        .bind(close.total())
        .bind(new_result)
        .fetch_one(&mut *tx)
        .await?;
    let saved = CloseFloot::from_row(&row)?;

    apply_delta(
        &mut tx,
        table_id,
        game_day_id,
        Delta::replace(Source::CloseFloot, old_result, new_result),
    )
    .await?;
    tx.commit().await?;

    info!(
        close_floot_id = saved.id,
        table_id,
        game_day_id,
        close_total = %saved.close_flot_total,
        result = %saved.result,
        "table closed"
    );
    Ok(saved)
}

/// Correct an existing close float. `None` leaves the row as it is.
pub async fn update_close_floot(
    pool: &PgPool,
    close_floot_id: i64,
    close_flot: Option<&RawFloat>,
) -> StoreResult<CloseFloot> {
    let Some(close_flot) = close_flot else {
        return fetch_close_floot(pool, close_floot_id).await;
    };
    let close = ChipFloat::parse(close_flot)?;

    let mut tx = pool.begin().await?;
    let locked: Option<(i64, i64, Decimal)> = sqlx::query_as(
        "select table_id, game_day_id, result from close_floots where id = $1 for update",
    )
    .bind(close_floot_id)
    .fetch_optional(&mut *tx)
    .await?;
    let (table_id, game_day_id, old_result) =
        locked.ok_or_else(|| StoreError::not_found("close floot", close_floot_id))?;

    let open_total = table_open_total(&mut tx, table_id).await?;
    let new_result = close_result(&close, open_total);

    let sql = format!(
        r#"
        update close_floots
        set close_flot = $2,
            close_flot_total = $3,
            result = $4,
            status = 'CLOSED',
            close_date = coalesce(close_date, now()),
            updated_at = now()
        where id = $1
        returning {CLOSE_FLOOT_COLUMNS}
        "#
    );
    let row = sqlx::query(&sql)
        .bind(close_floot_id)
        .bind(Json(&close))
        .bind(close.total())
        .bind(new_result)
        .fetch_one(&mut *tx)
        .await?;
    let saved = CloseFloot::from_row(&row)?;

    apply_delta(
        &mut tx,
        table_id,
        game_day_id,
        Delta::replace(Source::CloseFloot, old_result, new_result),
    )
    .await?;
    tx.commit().await?;

    info!(close_floot_id, table_id, game_day_id, result = %saved.result, "close float updated");
    Ok(saved)
}

pub async fn fetch_close_floot(pool: &PgPool, close_floot_id: i64) -> StoreResult<CloseFloot> {
    let sql = format!("select {CLOSE_FLOOT_COLUMNS} from close_floots where id = $1");
    let row = sqlx::query(&sql)
        .bind(close_floot_id)
        .fetch_optional(pool)
        .await?
        .ok_or_else(|| StoreError::not_found("close floot", close_floot_id))?;
    CloseFloot::from_row(&row)
}

// ---------------------------------------------------------------------------
// Plaques
// ---------------------------------------------------------------------------

/// Record the plaque count of a table for a game day (upsert).
pub async fn submit_plaque(
    pool: &PgPool,
    table_id: i64,
    game_day_id: i64,
    plaques: &RawFloat,
) -> StoreResult<Plaque> {
    let counted = ChipFloat::parse(plaques)?;

    let mut tx = pool.begin().await?;
    table_open_total(&mut tx, table_id).await?;
    ensure_game_day(&mut tx, game_day_id).await?;

    sqlx::query(
        r#"
        insert into plaques (table_id, game_day_id)
        values ($1, $2)
        on conflict (table_id, game_day_id) do nothing
        "#,
    )
    .bind(table_id)
    .bind(game_day_id)
    .execute(&mut *tx)
    .await?;

    let (id, old_total): (i64, Decimal) = sqlx::query_as(
        r#"
        select id, plaques_total
        from plaques
        where table_id = $1 and game_day_id = $2
        for update
        "#,
    )
    .bind(table_id)
    .bind(game_day_id)
    .fetch_one(&mut *tx)
    .await?;

    let saved = write_plaque(&mut tx, id, &counted).await?;
    apply_delta(
        &mut tx,
        table_id,
        game_day_id,
        Delta::replace(Source::Plaque, old_total, counted.total()),
    )
    .await?;
    tx.commit().await?;

    info!(plaque_id = saved.id, table_id, game_day_id, total = %saved.plaques_total, "plaques counted");
    Ok(saved)
}

/// Correct an existing plaque count. `None` leaves the row as it is.
pub async fn update_plaque(
    pool: &PgPool,
    plaque_id: i64,
    plaques: Option<&RawFloat>,
) -> StoreResult<Plaque> {
    let Some(plaques) = plaques else {
        return fetch_plaque(pool, plaque_id).await;
    };
    let counted = ChipFloat::parse(plaques)?;

    let mut tx = pool.begin().await?;
    let locked: Option<(i64, i64, Decimal)> = sqlx::query_as(
        "select table_id, game_day_id, plaques_total from plaques where id = $1 for update",
    )
    .bind(plaque_id)
    .fetch_optional(&mut *tx)
    .await?;
    let (table_id, game_day_id, old_total) =
        locked.ok_or_else(|| StoreError::not_found("plaque", plaque_id))?;

    let saved = write_plaque(&mut tx, plaque_id, &counted).await?;
    apply_delta(
        &mut tx,
        table_id,
        game_day_id,
        Delta::replace(Source::Plaque, old_total, counted.total()),
    )
    .await?;
    tx.commit().await?;

    info!(plaque_id, table_id, game_day_id, total = %saved.plaques_total, "plaques updated");
    Ok(saved)
}

async fn write_plaque(
    conn: &mut PgConnection,
    plaque_id: i64,
    counted: &ChipFloat,
) -> StoreResult<Plaque> {
    let sql = format!(
        r#"
        update plaques
        set plaques = $2, plaques_total = $3, updated_at = now()
        where id = $1
        returning {PLAQUE_COLUMNS}
        "#
    );
    let row = sqlx::query(&sql)
        .bind(plaque_id)
        .bind(Json(counted))
        .bind(counted.total())
        .fetch_one(&mut *conn)
        .await?;
    Ok(Plaque::from_row(&row)?)
}

pub async fn fetch_plaque(pool: &PgPool, plaque_id: i64) -> StoreResult<Plaque> {
    let sql = format!("select {PLAQUE_COLUMNS} from plaques where id = $1");
    let row = sqlx::query(&sql)
        .bind(plaque_id)
        .fetch_optional(pool)
        .await?
        .ok_or_else(|| StoreError::not_found("plaque", plaque_id))?;
    Ok(Plaque::from_row(&row)?)
}

// ---------------------------------------------------------------------------
// Fills / credits
// ---------------------------------------------------------------------------

#[derive(Debug, Clone)]
pub struct NewFillCredit {
    pub table_id: i64,
    /// Ignored when `action_time` is set.
    pub game_day_id: Option<i64>,
    /// Negative = fill, positive = credit.
    pub amount: Decimal,
    pub action_time: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, Default)]
pub struct FillCreditPatch {
    pub amount: Option<Decimal>,
    /// Re-books the entry onto the game day of this instant.
    pub action_time: Option<DateTime<Utc>>,
}

pub async fn record_fill_credit(
    pool: &PgPool,
    clock: &GamingDayClock,
    new: &NewFillCredit,
) -> StoreResult<FillCredit> {
    let kind = classify_fill_credit(new.amount)?;

    let mut tx = pool.begin().await?;
    table_open_total(&mut tx, new.table_id).await?;
    let game_day_id = resolve_game_day(&mut tx, clock, new.game_day_id, new.action_time).await?;

    let sql = format!(
        r#"
        insert into fill_credits (table_id, game_day_id, fill_credit, action_time)
        values ($1, $2, $3, $4)
        returning {FILL_CREDIT_COLUMNS}
        "#
    );
    let row = sqlx::query(&sql)
        .bind(new.table_id)
        .bind(game_day_id)
        .bind(new.amount)
        .bind(new.action_time)
        .fetch_one(&mut *tx)
        .await?;
    let saved = FillCredit::from_row(&row)?;

    apply_delta(
        &mut tx,
        new.table_id,
        game_day_id,
        Delta::create(Source::FillCredit, new.amount),
    )
    .await?;
    tx.commit().await?;

    info!(
        fill_credit_id = saved.id,
        table_id = new.table_id,
        game_day_id,
        kind = kind.as_str(),
        amount = %new.amount,
        "fill/credit recorded"
    );
    Ok(saved)
}

pub async fn update_fill_credit(
    pool: &PgPool,
    clock: &GamingDayClock,
    fill_credit_id: i64,
    patch: &FillCreditPatch,
) -> StoreResult<FillCredit> {
    if let Some(amount) = patch.amount {
        classify_fill_credit(amount)?;
    }

    let mut tx = pool.begin().await?;
    let locked: Option<(i64, i64, Decimal)> = sqlx::query_as(
        "select table_id, game_day_id, fill_credit from fill_credits where id = $1 for update",
    )
    .bind(fill_credit_id)
    .fetch_optional(&mut *tx)
    .await?;
    let (table_id, old_day, old_amount) =
        locked.ok_or_else(|| StoreError::not_found("fill credit", fill_credit_id))?;

    let new_amount = patch.amount.unwrap_or(old_amount);
    let new_day = match patch.action_time {
        Some(at) => resolve_game_day(&mut tx, clock, None, Some(at)).await?,
        None => old_day,
    };

    let sql = format!(
        r#"
        update fill_credits
        set fill_credit = $2,
            game_day_id = $3,
            action_time = coalesce($4, action_time),
            updated_at = now()
        where id = $1
        returning {FILL_CREDIT_COLUMNS}
        "#
    );
    let row = sqlx::query(&sql)
        .bind(fill_credit_id)
        .bind(new_amount)
        .bind(new_day)
        .bind(patch.action_time)
        .fetch_one(&mut *tx)
        .await?;
    let saved = FillCredit::from_row(&row)?;

    if new_day == old_day {
        apply_delta(
            &mut tx,
            table_id,
            old_day,
            Delta::replace(Source::FillCredit, old_amount, new_amount),
        )
        .await?;
    } else {
        // Lock the two running results in ascending day order so opposite
        // moves on one table cannot deadlock.
        let mut moves = [
            (old_day, Delta::remove(Source::FillCredit, old_amount)),
            (new_day, Delta::create(Source::FillCredit, new_amount)),
        ];
        moves.sort_by_key(|(day, _)| *day);
        for (day, delta) in moves {
            apply_delta(&mut tx, table_id, day, delta).await?;
        }
    }
    tx.commit().await?;

    info!(fill_credit_id, table_id, old_day, new_day, amount = %new_amount, "fill/credit updated");
    Ok(saved)
}

/// Take a fill/credit's contribution back out of the running result, then
/// remove it. Returns the deleted entry.
pub async fn delete_fill_credit(pool: &PgPool, fill_credit_id: i64) -> StoreResult<FillCredit> {
    let mut tx = pool.begin().await?;
    let sql = format!("select {FILL_CREDIT_COLUMNS} from fill_credits where id = $1 for update");
    let row = sqlx::query(&sql)
        .bind(fill_credit_id)
        .fetch_optional(&mut *tx)
        .await?
        .ok_or_else(|| StoreError::not_found("fill credit", fill_credit_id))?;
    let entry = FillCredit::from_row(&row)?;

    apply_delta(
        &mut tx,
        entry.table_id,
        entry.game_day_id,
        Delta::remove(Source::FillCredit, entry.fill_credit),
    )
    .await?;
    sqlx::query("delete from fill_credits where id = $1")
        .bind(fill_credit_id)
        .execute(&mut *tx)
        .await?;
    tx.commit().await?;

    info!(fill_credit_id, table_id = entry.table_id, game_day_id = entry.game_day_id, "fill/credit deleted");
    Ok(entry)
}

pub async fn fetch_fill_credit(pool: &PgPool, fill_credit_id: i64) -> StoreResult<FillCredit> {
    let sql = format!("select {FILL_CREDIT_COLUMNS} from fill_credits where id = $1");
    let row = sqlx::query(&sql)
        .bind(fill_credit_id)
        .fetch_optional(pool)
        .await?
        .ok_or_else(|| StoreError::not_found("fill credit", fill_credit_id))?;
    FillCredit::from_row(&row)
}

/// Entries in booking order, optionally filtered by table and/or game day.
pub async fn list_fill_credits(
    pool: &PgPool,
    table_id: Option<i64>,
    game_day_id: Option<i64>,
) -> StoreResult<Vec<FillCredit>> {
    let sql = format!(
        r#"
        select {FILL_CREDIT_COLUMNS}
        from fill_credits
        where ($1::bigint is null or table_id = $1)
          and ($2::bigint is null or game_day_id = $2)
        order by created_at, id
        "#
    );
    let rows = sqlx::query(&sql)
        .bind(table_id)
        .bind(game_day_id)
        .fetch_all(pool)
        .await?;
    rows.iter().map(FillCredit::from_row).collect()
}

// ---------------------------------------------------------------------------
// Running results
// ---------------------------------------------------------------------------

pub async fn fetch_table_result(
    pool: &PgPool,
    table_id: i64,
    game_day_id: i64,
) -> StoreResult<TableResult> {
    let sql = format!(
        "select {TABLE_RESULT_COLUMNS} from table_results where table_id = $1 and game_day_id = $2"
    );
    let row = sqlx::query(&sql)
        .bind(table_id)
        .bind(game_day_id)
        .fetch_optional(pool)
        .await?
        .ok_or_else(|| {
            StoreError::NotFound(format!(
                "no table result for table {table_id} on game day {game_day_id}"
            ))
        })?;
    Ok(TableResult::from_row(&row)?)
}

pub async fn list_table_results(pool: &PgPool, game_day_id: i64) -> StoreResult<Vec<TableResult>> {
    let mut conn = pool.acquire().await?;
    ensure_game_day(&mut conn, game_day_id).await?;

    let sql = format!(
        "select {TABLE_RESULT_COLUMNS} from table_results where game_day_id = $1 order by table_id"
    );
    let rows = sqlx::query(&sql)
        .bind(game_day_id)
        .fetch_all(&mut *conn)
        .await?;
    rows.iter()
        .map(|r| TableResult::from_row(r).map_err(StoreError::from))
        .collect()
}

/// Recompute every running result of a game day from its records.
pub async fn audit_game_day(pool: &PgPool, game_day_id: i64) -> StoreResult<AuditReport> {
    let mut conn = pool.acquire().await?;
    ensure_game_day(&mut conn, game_day_id).await?;

    let rows = sqlx::query(
        r#"
        select
          tr.table_id,
          tr.result as recorded,
          coalesce(cf.result, 0) as close_result,
          coalesce(p.plaques_total, 0) as plaques_total,
          coalesce(fc.total, 0) as fill_credit_sum,
          coalesce(fc.n, 0) as fill_credit_count
        from table_results tr
        left join close_floots cf
          on cf.table_id = tr.table_id and cf.game_day_id = tr.game_day_id
        left join plaques p
          on p.table_id = tr.table_id and p.game_day_id = tr.game_day_id
        left join (
          select table_id, game_day_id, sum(fill_credit) as total, count(*)::bigint as n
          from fill_credits
          group by table_id, game_day_id
        ) fc
          on fc.table_id = tr.table_id and fc.game_day_id = tr.game_day_id
        where tr.game_day_id = $1
        order by tr.table_id
        "#,
    )
    .bind(game_day_id)
    .fetch_all(&mut *conn)
    .await?;

    let mut breakdowns = Vec::with_capacity(rows.len());
    for row in &rows {
        breakdowns.push(ResultBreakdown {
            table_id: row.try_get("table_id")?,
            recorded: row.try_get::<Decimal, _>("recorded")?.normalize(),
            close_result: row.try_get::<Decimal, _>("close_result")?.normalize(),
            plaques_total: row.try_get::<Decimal, _>("plaques_total")?.normalize(),
            fill_credit_sum: row.try_get::<Decimal, _>("fill_credit_sum")?.normalize(),
            fill_credit_count: row.try_get("fill_credit_count")?,
        });
    }

    let report = audit(game_day_id, &breakdowns);
    if report.is_clean() {
        info!(game_day_id, tables = report.tables_checked, "game day audit clean");
    } else {
        tracing::warn!(game_day_id, drifts = report.drifts.len(), "game day audit found drift");
    }
    Ok(report)
}
