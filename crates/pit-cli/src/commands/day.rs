//! `pit day ...`: game day lifecycle and audit.

use anyhow::{bail, Result};
use chrono::NaiveDate;
use pit_db::OpenedGameDay;
use sqlx::PgPool;

fn print_opened(o: &OpenedGameDay) {
    println!("game_day_id={}", o.game_day.id);
    println!("date={}", o.game_day.date);
    println!("seeded_tables={}", o.seeded_tables);
    println!("seeded_slot_machines={}", o.seeded_slot_machines);
}

pub async fn open(pool: &PgPool, date: NaiveDate, hall: Option<i64>) -> Result<()> {
    let opened = pit_db::open_game_day(pool, date, hall).await?;
    print_opened(&opened);
    Ok(())
}

pub async fn roll(pool: &PgPool, hall: Option<i64>) -> Result<()> {
    let opened = pit_db::roll_game_day(pool, hall).await?;
    print_opened(&opened);
    Ok(())
}

pub async fn list(pool: &PgPool) -> Result<()> {
    for d in pit_db::list_game_days(pool).await? {
        println!("{}\t{}", d.id, d.date);
    }
    Ok(())
}

/// Print the audit report as JSON. With `strict`, drift is an error exit.
pub async fn audit(pool: &PgPool, game_day_id: i64, strict: bool) -> Result<()> {
    let report = pit_db::audit_game_day(pool, game_day_id).await?;
    println!("{}", serde_json::to_string_pretty(&report)?);
    if strict && !report.is_clean() {
        bail!(
            "AUDIT_DRIFT: {} table(s) on game day {} do not reconcile",
            report.drifts.len(),
            game_day_id
        );
    }
    Ok(())
}
