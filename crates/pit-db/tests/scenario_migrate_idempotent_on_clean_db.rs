/// Migrating twice must be idempotent.
///
/// DB-backed test, skipped if PIT_DATABASE_URL is not set.
#[tokio::test]
async fn migrate_idempotent_on_clean_db() -> anyhow::Result<()> {
    let url = match std::env::var(pit_db::ENV_DB_URL) {
        Ok(v) => v,
        Err(_) => {
            eprintln!("SKIP: PIT_DATABASE_URL not set");
            return Ok(());
        }
    };

    let pool = sqlx::postgres::PgPoolOptions::new()
        .max_connections(2)
        .connect(&url)
        .await?;

    pit_db::migrate(&pool).await?;
    pit_db::migrate(&pool).await?;

    let st = pit_db::status(&pool).await?;
    assert!(st.ok);
    assert!(st.has_ledger_tables);
    Ok(())
}
