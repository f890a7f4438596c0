//! `pit hall ...` / `pit table ...`: floor registry setup from the shell.

use anyhow::Result;
use pit_db::NewTable;
use sqlx::PgPool;

use super::parse_float_arg;

pub async fn hall_create(pool: &PgPool, name: &str) -> Result<()> {
    let hall = pit_db::create_hall(pool, name).await?;
    println!("hall_id={}", hall.id);
    Ok(())
}

pub async fn hall_list(pool: &PgPool) -> Result<()> {
    for h in pit_db::list_halls(pool).await? {
        println!("{}\t{}", h.id, h.name);
    }
    Ok(())
}

pub async fn table_create(
    pool: &PgPool,
    name: String,
    open_flot: &str,
    hall: Option<i64>,
) -> Result<()> {
    let new = NewTable {
        name,
        open_flot: parse_float_arg(open_flot)?,
        hall_id: hall,
    };
    let table = pit_db::create_table(pool, &new).await?;
    println!("table_id={}", table.id);
    println!("open_flot_total={}", table.open_flot_total);
    Ok(())
}

pub async fn table_list(pool: &PgPool, hall: Option<i64>) -> Result<()> {
    for t in pit_db::list_tables(pool, hall).await? {
        let hall = t.hall_id.map(|h| h.to_string()).unwrap_or_else(|| "-".to_string());
        println!("{}\t{}\t{}\t{}", t.id, t.name, hall, t.open_flot_total);
    }
    Ok(())
}
