//! pit-db
//!
//! PostgreSQL persistence for the pit ledger: floor registry, game days,
//! and the per-(table, game day) records whose contributions roll up into
//! the running `table_results` balance.
//!
//! Every ledger mutation runs in one transaction and moves the running
//! result only through [`apply_delta`].

use anyhow::{Context, Result};
use sqlx::{postgres::PgPoolOptions, PgPool};

mod error;
mod floor;
mod game_day;
mod ledger;
mod rows;

pub use error::{StoreError, StoreResult};
pub use floor::{
    assign_table_hall, create_chip_denomination, create_hall, create_slot_machine, create_table,
    delete_table, fetch_table, hall_daily_totals, list_chip_denominations, list_daily_amounts,
    list_halls, list_slot_machines, list_tables, replace_open_float, set_daily_amount,
    NewSlotMachine, NewTable,
};
pub use game_day::{
    fetch_game_day, find_game_day_by_date, list_game_days, open_game_day, roll_game_day,
};
pub use ledger::{
    apply_delta, audit_game_day, delete_fill_credit, fetch_close_floot, fetch_fill_credit,
    fetch_plaque, fetch_table_result, list_fill_credits, list_table_results, record_fill_credit,
    submit_close_floot, submit_plaque, update_close_floot, update_fill_credit, update_plaque,
    FillCreditPatch, NewFillCredit,
};
pub use rows::{
    ChipDenomination, CloseFloot, CloseStatus, DailyAmount, FillCredit, GameDay, GamingTable,
    Hall, HallDailyTotal, OpenedGameDay, Plaque, SlotMachine, TableResult,
};

pub const ENV_DB_URL: &str = "PIT_DATABASE_URL";

/// Connect to Postgres using PIT_DATABASE_URL.
pub async fn connect_from_env() -> Result<PgPool> {
    let url = std::env::var(ENV_DB_URL)
        .with_context(|| format!("missing env var {ENV_DB_URL}"))?;
    connect(&url, 10).await
}

pub async fn connect(url: &str, max_connections: u32) -> Result<PgPool> {
    let pool = PgPoolOptions::new()
        .max_connections(max_connections)
        .connect(url)
        .await
        .context("failed to connect to Postgres")?;
    Ok(pool)
}

/// Run embedded SQLx migrations.
pub async fn migrate(pool: &PgPool) -> Result<()> {
    sqlx::migrate!("./migrations")
        .run(pool)
        .await
        .context("db migrate failed")?;
    Ok(())
}

#[derive(Debug, Clone)]
pub struct DbStatus {
    pub ok: bool,
    pub has_ledger_tables: bool,
}

/// Simple status query (connectivity + schema presence).
pub async fn status(pool: &PgPool) -> Result<DbStatus> {
    let (one,): (i32,) = sqlx::query_as::<_, (i32,)>("select 1")
        .fetch_one(pool)
        .await
        .context("status connectivity query failed")?;

    let (exists,): (bool,) = sqlx::query_as::<_, (bool,)>(
        r#"
        select exists (
            select 1
            from information_schema.tables
            where table_schema = 'public' and table_name = 'table_results'
        )
        "#,
    )
    .fetch_one(pool)
    .await
    .context("status table-exists query failed")?;

    Ok(DbStatus {
        ok: one == 1,
        has_ledger_tables: exists,
    })
}
