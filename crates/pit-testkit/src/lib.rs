//! Shared fixtures for pit scenario tests.
//!
//! DB-backed helpers return `None` when PIT_DATABASE_URL is unset so callers
//! can skip instead of fail on machines without Postgres.

use anyhow::{Context, Result};
use chrono::{Days, NaiveDate};
use pit_db::{GameDay, GamingTable, NewTable};
use pit_ledger::RawFloat;
use sqlx::PgPool;

/// Connect and migrate, or `None` (with a SKIP line on stderr) if no DB is configured.
pub async fn db_or_skip(test: &str) -> Result<Option<PgPool>> {
    let url = match std::env::var(pit_db::ENV_DB_URL) {
        Ok(v) => v,
        Err(_) => {
            eprintln!("SKIP {test}: {} not set", pit_db::ENV_DB_URL);
            return Ok(None);
        }
    };
    let pool = pit_db::connect(&url, 4).await?;
    pit_db::migrate(&pool).await?;
    Ok(Some(pool))
}

/// Name that will not collide with rows left by earlier runs.
pub fn unique_name(prefix: &str) -> String {
    let id = uuid::Uuid::new_v4().simple().to_string();
    format!("{prefix}-{}", &id[..12])
}

/// A calendar date no other test run is likely to have opened.
///
/// Spread over ~2700 years starting at 3000-01-01, so parallel tests sharing
/// one database do not trip the unique-date constraint.
pub fn unique_date() -> NaiveDate {
    let n = uuid::Uuid::new_v4().as_u128() % 1_000_000;
    let base = NaiveDate::from_ymd_opt(3000, 1, 1).unwrap_or(NaiveDate::MIN);
    base.checked_add_days(Days::new(n as u64)).unwrap_or(base)
}

/// Build a raw float from `(denomination, quantity)` pairs.
pub fn float(lines: &[(&str, i64)]) -> RawFloat {
    lines.iter().map(|(k, v)| (k.to_string(), *v)).collect()
}

/// Create a table with a unique name and the given opening float.
pub async fn seed_table(
    pool: &PgPool,
    open: &[(&str, i64)],
    hall_id: Option<i64>,
) -> Result<GamingTable> {
    let table = pit_db::create_table(
        pool,
        &NewTable {
            name: unique_name("table"),
            open_flot: float(open),
            hall_id,
        },
    )
    .await
    .context("seed table")?;
    Ok(table)
}

/// Open a game day on a fresh date, scoped to `hall_id`.
pub async fn seed_game_day(pool: &PgPool, hall_id: Option<i64>) -> Result<GameDay> {
    let opened = pit_db::open_game_day(pool, unique_date(), hall_id)
        .await
        .context("open game day")?;
    Ok(opened.game_day)
}

/// A hall of its own, so seeding a day only touches this test's tables.
pub async fn seed_hall(pool: &PgPool) -> Result<i64> {
    let hall = pit_db::create_hall(pool, &unique_name("hall"))
        .await
        .context("seed hall")?;
    Ok(hall.id)
}
