//! Close float and plaque submissions move the running result by their net
//! change, and the day audits clean afterwards.

use pit_db::CloseStatus;
use pit_testkit::{db_or_skip, float, seed_game_day, seed_hall, seed_table};
use rust_decimal::Decimal;

#[tokio::test]
async fn close_float_then_update_moves_result_by_net_delta() -> anyhow::Result<()> {
    let Some(pool) = db_or_skip("close_float_then_update").await? else {
        return Ok(());
    };

    let hall = seed_hall(&pool).await?;
    let table = seed_table(&pool, &[("5", 10), ("25", 4)], Some(hall)).await?;
    assert_eq!(table.open_flot_total, Decimal::from(150));
    let day = seed_game_day(&pool, Some(hall)).await?;

    let tr = pit_db::fetch_table_result(&pool, table.id, day.id).await?;
    assert_eq!(tr.result, Decimal::ZERO);

    // Same chips back: result 0, running result unchanged.
    let closed =
        pit_db::submit_close_floot(&pool, table.id, day.id, &float(&[("5", 10), ("25", 4)]))
            .await?;
    assert_eq!(closed.close_flot_total, Decimal::from(150));
    assert_eq!(closed.result, Decimal::ZERO);
    assert_eq!(closed.status, CloseStatus::Closed);
    assert!(closed.close_date.is_some());
    let tr = pit_db::fetch_table_result(&pool, table.id, day.id).await?;
    assert_eq!(tr.result, Decimal::ZERO);

    // {"5": 20} = 100 against 150 opened.
    let updated = pit_db::update_close_floot(&pool, closed.id, Some(&float(&[("5", 20)]))).await?;
    assert_eq!(updated.id, closed.id);
    assert_eq!(updated.result, Decimal::from(-50));
    let tr = pit_db::fetch_table_result(&pool, table.id, day.id).await?;
    assert_eq!(tr.result, Decimal::from(-50));

    // Re-submitting overwrites the seeded row in place.
    let again =
        pit_db::submit_close_floot(&pool, table.id, day.id, &float(&[("25", 8)])).await?;
    assert_eq!(again.id, closed.id);
    assert_eq!(again.result, Decimal::from(50));
    let tr = pit_db::fetch_table_result(&pool, table.id, day.id).await?;
    assert_eq!(tr.result, Decimal::from(50));

    // No body: row unchanged, result unchanged.
    let same = pit_db::update_close_floot(&pool, closed.id, None).await?;
    assert_eq!(same.result, Decimal::from(50));

    let report = pit_db::audit_game_day(&pool, day.id).await?;
    assert!(report.is_clean(), "drifts: {:?}", report.drifts);
    assert_eq!(report.tables_checked, 1);
    Ok(())
}

#[tokio::test]
async fn plaques_enter_running_result_as_net_change() -> anyhow::Result<()> {
    let Some(pool) = db_or_skip("plaques_net_change").await? else {
        return Ok(());
    };

    let hall = seed_hall(&pool).await?;
    let table = seed_table(&pool, &[("100", 2)], Some(hall)).await?;
    let day = seed_game_day(&pool, Some(hall)).await?;

    let p = pit_db::submit_plaque(&pool, table.id, day.id, &float(&[("500", 1), ("1000", 1)]))
        .await?;
    assert_eq!(p.plaques_total, Decimal::from(1500));
    let tr = pit_db::fetch_table_result(&pool, table.id, day.id).await?;
    assert_eq!(tr.result, Decimal::from(1500));

    let p2 = pit_db::update_plaque(&pool, p.id, Some(&float(&[("500", 1)]))).await?;
    assert_eq!(p2.plaques_total, Decimal::from(500));
    let tr = pit_db::fetch_table_result(&pool, table.id, day.id).await?;
    assert_eq!(tr.result, Decimal::from(500));

    let fetched = pit_db::fetch_plaque(&pool, p.id).await?;
    assert_eq!(fetched.plaques.quantity(Decimal::from(500)), 1);
    assert_eq!(fetched.plaques.quantity(Decimal::from(1000)), 0);

    let report = pit_db::audit_game_day(&pool, day.id).await?;
    assert!(report.is_clean(), "drifts: {:?}", report.drifts);
    Ok(())
}

#[tokio::test]
async fn close_float_on_unseeded_pair_creates_rows() -> anyhow::Result<()> {
    let Some(pool) = db_or_skip("close_float_unseeded").await? else {
        return Ok(());
    };

    // Day opened for an unrelated hall: this table gets no seeded rows.
    let hall = seed_hall(&pool).await?;
    let day = seed_game_day(&pool, Some(hall)).await?;
    let table = seed_table(&pool, &[("10", 10)], None).await?;
    assert!(pit_db::fetch_table_result(&pool, table.id, day.id).await.is_err());

    let closed = pit_db::submit_close_floot(&pool, table.id, day.id, &float(&[("10", 7)])).await?;
    assert_eq!(closed.result, Decimal::from(-30));
    let tr = pit_db::fetch_table_result(&pool, table.id, day.id).await?;
    assert_eq!(tr.result, Decimal::from(-30));
    Ok(())
}
