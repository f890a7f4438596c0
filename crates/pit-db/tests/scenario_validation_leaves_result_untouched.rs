//! Rejected submissions must not touch the running result.

use pit_db::{NewFillCredit, StoreError};
use pit_ledger::GamingDayClock;
use pit_testkit::{db_or_skip, float, seed_game_day, seed_hall, seed_table};
use rust_decimal::Decimal;

#[tokio::test]
async fn negative_quantities_are_rejected_without_side_effects() -> anyhow::Result<()> {
    let Some(pool) = db_or_skip("negative_quantities").await? else {
        return Ok(());
    };

    let hall = seed_hall(&pool).await?;
    let table = seed_table(&pool, &[("5", 10)], Some(hall)).await?;
    let day = seed_game_day(&pool, Some(hall)).await?;

    pit_db::submit_plaque(&pool, table.id, day.id, &float(&[("100", 1)])).await?;

    let err = pit_db::submit_plaque(&pool, table.id, day.id, &float(&[("100", -1)]))
        .await
        .unwrap_err();
    assert!(matches!(err, StoreError::Validation(ref m) if m.contains("100")), "{err:?}");

    let err = pit_db::submit_close_floot(&pool, table.id, day.id, &float(&[("5", 3), ("25", -2)]))
        .await
        .unwrap_err();
    assert!(matches!(err, StoreError::Validation(_)), "{err:?}");

    let tr = pit_db::fetch_table_result(&pool, table.id, day.id).await?;
    assert_eq!(tr.result, Decimal::from(100));
    Ok(())
}

#[tokio::test]
async fn zero_fill_credit_is_a_validation_error() -> anyhow::Result<()> {
    let Some(pool) = db_or_skip("zero_fill_credit").await? else {
        return Ok(());
    };

    let hall = seed_hall(&pool).await?;
    let table = seed_table(&pool, &[("5", 10)], Some(hall)).await?;
    let day = seed_game_day(&pool, Some(hall)).await?;

    let err = pit_db::record_fill_credit(
        &pool,
        &GamingDayClock::default(),
        &NewFillCredit {
            table_id: table.id,
            game_day_id: Some(day.id),
            amount: Decimal::ZERO,
            action_time: None,
        },
    )
    .await
    .unwrap_err();
    assert_eq!(err.kind(), "validation");

    let listed = pit_db::list_fill_credits(&pool, Some(table.id), Some(day.id)).await?;
    assert!(listed.is_empty());
    Ok(())
}

#[tokio::test]
async fn unknown_records_are_not_found() -> anyhow::Result<()> {
    let Some(pool) = db_or_skip("unknown_records").await? else {
        return Ok(());
    };

    let hall = seed_hall(&pool).await?;
    let day = seed_game_day(&pool, Some(hall)).await?;

    let err = pit_db::submit_close_floot(&pool, i64::MAX, day.id, &float(&[("5", 1)]))
        .await
        .unwrap_err();
    assert_eq!(err.kind(), "not_found");

    let err = pit_db::update_plaque(&pool, i64::MAX, Some(&float(&[("5", 1)])))
        .await
        .unwrap_err();
    assert_eq!(err.kind(), "not_found");

    let err = pit_db::delete_fill_credit(&pool, i64::MAX).await.unwrap_err();
    assert_eq!(err.kind(), "not_found");

    let err = pit_db::audit_game_day(&pool, i64::MAX).await.unwrap_err();
    assert_eq!(err.kind(), "not_found");
    Ok(())
}

#[tokio::test]
async fn amounts_past_the_money_range_are_validation_errors() -> anyhow::Result<()> {
    let Some(pool) = db_or_skip("money_range").await? else {
        return Ok(());
    };

    let hall = seed_hall(&pool).await?;
    let table = seed_table(&pool, &[("5", 10)], Some(hall)).await?;
    let day = seed_game_day(&pool, Some(hall)).await?;
    let clock = GamingDayClock::default();
    let credit = |amount: Decimal| NewFillCredit {
        table_id: table.id,
        game_day_id: Some(day.id),
        amount,
        action_time: None,
    };

    let err = pit_db::submit_close_floot(&pool, table.id, day.id, &float(&[("1000", 1_000_000_000_000)]))
        .await
        .unwrap_err();
    assert_eq!(err.kind(), "validation", "{err:?}");

    let err = pit_db::record_fill_credit(&pool, &clock, &credit(Decimal::from(1_000_000_000_000_000_000i64)))
        .await
        .unwrap_err();
    assert_eq!(err.kind(), "validation", "{err:?}");

    // Each entry fits, the running sum does not.
    pit_db::record_fill_credit(&pool, &clock, &credit(pit_ledger::MAX_MONEY)).await?;
    let err = pit_db::record_fill_credit(&pool, &clock, &credit(pit_ledger::MAX_MONEY))
        .await
        .unwrap_err();
    assert_eq!(err.kind(), "validation", "{err:?}");

    let tr = pit_db::fetch_table_result(&pool, table.id, day.id).await?;
    assert_eq!(tr.result, pit_ledger::MAX_MONEY);
    let listed = pit_db::list_fill_credits(&pool, Some(table.id), Some(day.id)).await?;
    assert_eq!(listed.len(), 1);
    Ok(())
}
