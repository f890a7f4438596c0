//! Concurrent writers on one (table, game day) pair: no lost updates, no
//! deadlocks, and the audit stays clean.

use chrono::{NaiveDate, TimeZone, Utc};
use pit_db::{FillCreditPatch, NewFillCredit};
use pit_ledger::GamingDayClock;
use pit_testkit::{db_or_skip, seed_game_day, seed_hall, seed_table};
use rust_decimal::Decimal;

const WRITERS: i64 = 32;

fn noon(date: NaiveDate) -> chrono::DateTime<Utc> {
    Utc.from_utc_datetime(&date.and_hms_opt(12, 0, 0).unwrap())
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn racing_fill_credits_all_land_in_the_running_result() -> anyhow::Result<()> {
    let Some(pool) = db_or_skip("racing_fill_credits").await? else {
        return Ok(());
    };

    let hall = seed_hall(&pool).await?;
    let table = seed_table(&pool, &[("25", 4)], Some(hall)).await?;
    let day = seed_game_day(&pool, Some(hall)).await?;
    let amount = Decimal::new(1250, 2);

    let mut handles = Vec::new();
    for _ in 0..WRITERS {
        let pool = pool.clone();
        let entry = NewFillCredit {
            table_id: table.id,
            game_day_id: Some(day.id),
            amount,
            action_time: None,
        };
        handles.push(tokio::spawn(async move {
            pit_db::record_fill_credit(&pool, &GamingDayClock::default(), &entry).await
        }));
    }
    for h in handles {
        h.await??;
    }

    let tr = pit_db::fetch_table_result(&pool, table.id, day.id).await?;
    assert_eq!(tr.result, amount * Decimal::from(WRITERS));

    let listed = pit_db::list_fill_credits(&pool, Some(table.id), Some(day.id)).await?;
    assert_eq!(listed.len() as i64, WRITERS);

    let report = pit_db::audit_game_day(&pool, day.id).await?;
    assert!(report.is_clean(), "{:?}", report.drifts);
    Ok(())
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn opposite_day_moves_on_one_table_all_commit() -> anyhow::Result<()> {
    let Some(pool) = db_or_skip("opposite_day_moves").await? else {
        return Ok(());
    };
    let clock = GamingDayClock::default();

    let hall = seed_hall(&pool).await?;
    let table = seed_table(&pool, &[("25", 4)], Some(hall)).await?;
    let first = seed_game_day(&pool, Some(hall)).await?;
    let second = seed_game_day(&pool, Some(hall)).await?;

    // Half the entries start on each day and swap over concurrently.
    let mut moves = Vec::new();
    for i in 0..WRITERS {
        let (from, to) = if i % 2 == 0 {
            (&first, &second)
        } else {
            (&second, &first)
        };
        let entry = pit_db::record_fill_credit(
            &pool,
            &clock,
            &NewFillCredit {
                table_id: table.id,
                game_day_id: Some(from.id),
                amount: Decimal::from(-10),
                action_time: None,
            },
        )
        .await?;
        moves.push((entry.id, noon(to.date)));
    }

    let mut handles = Vec::new();
    for (id, at) in moves {
        let pool = pool.clone();
        handles.push(tokio::spawn(async move {
            pit_db::update_fill_credit(
                &pool,
                &GamingDayClock::default(),
                id,
                &FillCreditPatch {
                    amount: None,
                    action_time: Some(at),
                },
            )
            .await
        }));
    }
    for h in handles {
        h.await??;
    }

    let half = Decimal::from(-10 * WRITERS / 2);
    for day in [first.id, second.id] {
        let tr = pit_db::fetch_table_result(&pool, table.id, day).await?;
        assert_eq!(tr.result, half, "day {day}");
        let report = pit_db::audit_game_day(&pool, day).await?;
        assert!(report.is_clean(), "day {day}: {:?}", report.drifts);
    }
    Ok(())
}
