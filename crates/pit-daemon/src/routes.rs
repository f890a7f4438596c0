//! Axum router and all HTTP handlers for pit-daemon.
//!
//! `build_router` is the single entry point; `main.rs` calls it and attaches
//! middleware layers. Handlers only translate HTTP to `pit_db` calls; every
//! ledger rule lives below them.

use std::sync::Arc;

use axum::{
    body::Bytes,
    extract::{
        rejection::{JsonRejection, PathRejection, QueryRejection},
        Path, Query, State,
    },
    http::StatusCode,
    routing::{get, post, put},
    Json, Router,
};
use pit_db::{
    ChipDenomination, CloseFloot, DailyAmount, FillCredit, FillCreditPatch, GameDay, GamingTable,
    Hall, HallDailyTotal, NewFillCredit, NewSlotMachine, NewTable, OpenedGameDay, Plaque, SlotMachine,
    TableResult,
};
use pit_ledger::AuditReport;
use tracing::info;

use crate::{
    api_types::{
        CloseFlootRequest, CloseFlootUpdate, CreateChipRequest, CreateGameDayRequest,
        CreateHallRequest, CreateSlotMachineRequest, CreateTableRequest, DailyAmountRequest,
        FillCreditQuery, FillCreditRequest, FillCreditUpdate, HallSummaryQuery, HealthResponse,
        OpenFloatUpdate,
        PlaqueRequest, PlaqueUpdate, RollGameDayRequest, TableListQuery,
    },
    error::ApiError,
    state::AppState,
};

type Shared = State<Arc<AppState>>;
type Created<T> = Result<(StatusCode, Json<T>), ApiError>;
type Found<T> = Result<Json<T>, ApiError>;

// ---------------------------------------------------------------------------
// Router
// ---------------------------------------------------------------------------

/// Build the complete application router wired to the given shared state.
///
/// Middleware layers (CORS, tracing) are **not** applied here; `main.rs`
/// attaches them after this call so tests can use the bare router.
pub fn build_router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/v1/health", get(health))
        // ledger records
        .route("/game-table/close-table/", post(close_floot_submit))
        .route(
            "/game-table/close-table/:id/",
            get(close_floot_fetch).put(close_floot_update),
        )
        .route("/game-table/plaque/", post(plaque_submit))
        .route(
            "/game-table/plaque/:id/",
            get(plaque_fetch).put(plaque_update),
        )
        .route(
            "/transactions/fill-credit/",
            get(fill_credit_list).post(fill_credit_record),
        )
        .route(
            "/transactions/fill-credit/:id/",
            get(fill_credit_fetch)
                .put(fill_credit_update)
                .delete(fill_credit_delete),
        )
        // game days
        .route("/game-table/create-game-day/", post(game_day_open))
        .route("/game-table/roll-game-day/", post(game_day_roll))
        .route("/game-table/game-day/", get(game_day_list))
        .route("/game-table/game-day/:id/", get(game_day_fetch))
        .route(
            "/game-table/table-result/:game_day/",
            get(table_result_list),
        )
        .route(
            "/game-table/table-result/:game_day/audit/",
            get(game_day_audit),
        )
        .route(
            "/game-table/table-result/:game_day/:table/",
            get(table_result_fetch),
        )
        // floor registry
        .route("/game-table/create/", get(table_list).post(table_create))
        .route(
            "/game-table/tables/:id/",
            get(table_fetch)
                .put(table_replace_open_float)
                .delete(table_delete),
        )
        .route("/game-table/hall/", get(hall_list).post(hall_create))
        .route("/game-table/add-to-hall/:table/:hall/", put(table_add_to_hall))
        .route(
            "/game-table/remove-from-hall/:table/",
            put(table_remove_from_hall),
        )
        .route("/chip/", get(chip_list).post(chip_create))
        .route("/slot-machine/", get(slot_machine_list).post(slot_machine_create))
        .route(
            "/slot-machine/close-slot-machine/:id/",
            put(slot_machine_close),
        )
        .route(
            "/slot-machine/daily-amount/:game_day/",
            get(daily_amount_list),
        )
        .route("/slot-machine/hall-summary/", get(hall_summary))
        .with_state(state)
}

// ---------------------------------------------------------------------------
// GET /v1/health
// ---------------------------------------------------------------------------

pub(crate) async fn health(State(st): Shared) -> Json<HealthResponse> {
    Json(HealthResponse {
        ok: true,
        service: st.build.service.to_string(),
        version: st.build.version.to_string(),
    })
}

// ---------------------------------------------------------------------------
// Close floats
// ---------------------------------------------------------------------------

pub(crate) async fn close_floot_submit(
    State(st): Shared,
    body: Result<Json<CloseFlootRequest>, JsonRejection>,
) -> Created<CloseFloot> {
    let Json(req) = body?;
    let saved =
        pit_db::submit_close_floot(&st.pool, req.table, req.game_day, &req.close_flot).await?;
    Ok((StatusCode::CREATED, Json(saved)))
}

pub(crate) async fn close_floot_fetch(
    State(st): Shared,
    id: Result<Path<i64>, PathRejection>,
) -> Found<CloseFloot> {
    let Path(id) = id?;
    Ok(Json(pit_db::fetch_close_floot(&st.pool, id).await?))
}

pub(crate) async fn close_floot_update(
    State(st): Shared,
    id: Result<Path<i64>, PathRejection>,
    body: Result<Json<CloseFlootUpdate>, JsonRejection>,
) -> Found<CloseFloot> {
    let Path(id) = id?;
    let Json(req) = body?;
    let saved = pit_db::update_close_floot(&st.pool, id, req.close_flot.as_ref()).await?;
    Ok(Json(saved))
}

// ---------------------------------------------------------------------------
// Plaques
// ---------------------------------------------------------------------------

pub(crate) async fn plaque_submit(
    State(st): Shared,
    body: Result<Json<PlaqueRequest>, JsonRejection>,
) -> Created<Plaque> {
    let Json(req) = body?;
    let saved = pit_db::submit_plaque(&st.pool, req.table, req.game_day, &req.plaques).await?;
    Ok((StatusCode::CREATED, Json(saved)))
}

pub(crate) async fn plaque_fetch(
    State(st): Shared,
    id: Result<Path<i64>, PathRejection>,
) -> Found<Plaque> {
    let Path(id) = id?;
    Ok(Json(pit_db::fetch_plaque(&st.pool, id).await?))
}

pub(crate) async fn plaque_update(
    State(st): Shared,
    id: Result<Path<i64>, PathRejection>,
    body: Result<Json<PlaqueUpdate>, JsonRejection>,
) -> Found<Plaque> {
    let Path(id) = id?;
    let Json(req) = body?;
    Ok(Json(
        pit_db::update_plaque(&st.pool, id, req.plaques.as_ref()).await?,
    ))
}

// ---------------------------------------------------------------------------
// Fills / credits
// ---------------------------------------------------------------------------

pub(crate) async fn fill_credit_list(
    State(st): Shared,
    q: Result<Query<FillCreditQuery>, QueryRejection>,
) -> Found<Vec<FillCredit>> {
    let Query(q) = q?;
    Ok(Json(
        pit_db::list_fill_credits(&st.pool, q.table, q.game_day).await?,
    ))
}

pub(crate) async fn fill_credit_record(
    State(st): Shared,
    body: Result<Json<FillCreditRequest>, JsonRejection>,
) -> Created<FillCredit> {
    let Json(req) = body?;
    let new = NewFillCredit {
        table_id: req.table,
        game_day_id: req.game_day,
        amount: req.fill_credit,
        action_time: req.action_time,
    };
    let saved = pit_db::record_fill_credit(&st.pool, &st.clock, &new).await?;
    Ok((StatusCode::CREATED, Json(saved)))
}

pub(crate) async fn fill_credit_fetch(
    State(st): Shared,
    id: Result<Path<i64>, PathRejection>,
) -> Found<FillCredit> {
    let Path(id) = id?;
    Ok(Json(pit_db::fetch_fill_credit(&st.pool, id).await?))
}

pub(crate) async fn fill_credit_update(
    State(st): Shared,
    id: Result<Path<i64>, PathRejection>,
    body: Result<Json<FillCreditUpdate>, JsonRejection>,
) -> Found<FillCredit> {
    let Path(id) = id?;
    let Json(req) = body?;
    let patch = FillCreditPatch {
        amount: req.fill_credit,
        action_time: req.action_time,
    };
    Ok(Json(
        pit_db::update_fill_credit(&st.pool, &st.clock, id, &patch).await?,
    ))
}

pub(crate) async fn fill_credit_delete(
    State(st): Shared,
    id: Result<Path<i64>, PathRejection>,
) -> Found<FillCredit> {
    let Path(id) = id?;
    Ok(Json(pit_db::delete_fill_credit(&st.pool, id).await?))
}

// ---------------------------------------------------------------------------
// Game days
// ---------------------------------------------------------------------------

pub(crate) async fn game_day_open(
    State(st): Shared,
    body: Result<Json<CreateGameDayRequest>, JsonRejection>,
) -> Created<OpenedGameDay> {
    let Json(req) = body?;
    let opened = pit_db::open_game_day(&st.pool, req.date, req.hall).await?;
    info!(game_day_id = opened.game_day.id, date = %req.date, "create-game-day");
    Ok((StatusCode::CREATED, Json(opened)))
}

/// Body is optional; `{}` or no body rolls every hall. A body that is
/// present must parse.
pub(crate) async fn game_day_roll(State(st): Shared, body: Bytes) -> Created<OpenedGameDay> {
    let req: RollGameDayRequest = if body.iter().all(u8::is_ascii_whitespace) {
        RollGameDayRequest::default()
    } else {
        serde_json::from_slice(&body)
            .map_err(|e| ApiError::Validation(format!("invalid roll request: {e}")))?
    };
    let opened = pit_db::roll_game_day(&st.pool, req.hall).await?;
    info!(game_day_id = opened.game_day.id, date = %opened.game_day.date, "roll-game-day");
    Ok((StatusCode::CREATED, Json(opened)))
}

pub(crate) async fn game_day_list(State(st): Shared) -> Found<Vec<GameDay>> {
    Ok(Json(pit_db::list_game_days(&st.pool).await?))
}

pub(crate) async fn game_day_fetch(
    State(st): Shared,
    id: Result<Path<i64>, PathRejection>,
) -> Found<GameDay> {
    let Path(id) = id?;
    Ok(Json(pit_db::fetch_game_day(&st.pool, id).await?))
}

pub(crate) async fn table_result_list(
    State(st): Shared,
    game_day: Result<Path<i64>, PathRejection>,
) -> Found<Vec<TableResult>> {
    let Path(game_day) = game_day?;
    Ok(Json(pit_db::list_table_results(&st.pool, game_day).await?))
}

pub(crate) async fn table_result_fetch(
    State(st): Shared,
    ids: Result<Path<(i64, i64)>, PathRejection>,
) -> Found<TableResult> {
    let Path((game_day, table)) = ids?;
    Ok(Json(
        pit_db::fetch_table_result(&st.pool, table, game_day).await?,
    ))
}

pub(crate) async fn game_day_audit(
    State(st): Shared,
    game_day: Result<Path<i64>, PathRejection>,
) -> Found<AuditReport> {
    let Path(game_day) = game_day?;
    Ok(Json(pit_db::audit_game_day(&st.pool, game_day).await?))
}

// ---------------------------------------------------------------------------
// Floor registry
// ---------------------------------------------------------------------------

pub(crate) async fn table_list(
    State(st): Shared,
    q: Result<Query<TableListQuery>, QueryRejection>,
) -> Found<Vec<GamingTable>> {
    let Query(q) = q?;
    Ok(Json(pit_db::list_tables(&st.pool, q.hall).await?))
}

pub(crate) async fn table_create(
    State(st): Shared,
    body: Result<Json<CreateTableRequest>, JsonRejection>,
) -> Created<GamingTable> {
    let Json(req) = body?;
    let new = NewTable {
        name: req.name,
        open_flot: req.open_flot,
        hall_id: req.hall,
    };
    let table = pit_db::create_table(&st.pool, &new).await?;
    Ok((StatusCode::CREATED, Json(table)))
}

pub(crate) async fn table_fetch(
    State(st): Shared,
    id: Result<Path<i64>, PathRejection>,
) -> Found<GamingTable> {
    let Path(id) = id?;
    Ok(Json(pit_db::fetch_table(&st.pool, id).await?))
}

pub(crate) async fn table_replace_open_float(
    State(st): Shared,
    id: Result<Path<i64>, PathRejection>,
    body: Result<Json<OpenFloatUpdate>, JsonRejection>,
) -> Found<GamingTable> {
    let Path(id) = id?;
    let Json(req) = body?;
    Ok(Json(
        pit_db::replace_open_float(&st.pool, id, &req.open_flot).await?,
    ))
}

/// Deletes the table and everything recorded against it.
pub(crate) async fn table_delete(
    State(st): Shared,
    id: Result<Path<i64>, PathRejection>,
) -> Found<GamingTable> {
    let Path(id) = id?;
    let table = pit_db::delete_table(&st.pool, id).await?;
    info!(table_id = id, "delete-table");
    Ok(Json(table))
}

pub(crate) async fn table_add_to_hall(
    State(st): Shared,
    ids: Result<Path<(i64, i64)>, PathRejection>,
) -> Found<GamingTable> {
    let Path((table, hall)) = ids?;
    Ok(Json(
        pit_db::assign_table_hall(&st.pool, table, Some(hall)).await?,
    ))
}

pub(crate) async fn table_remove_from_hall(
    State(st): Shared,
    id: Result<Path<i64>, PathRejection>,
) -> Found<GamingTable> {
    let Path(table) = id?;
    Ok(Json(pit_db::assign_table_hall(&st.pool, table, None).await?))
}

pub(crate) async fn hall_list(State(st): Shared) -> Found<Vec<Hall>> {
    Ok(Json(pit_db::list_halls(&st.pool).await?))
}

pub(crate) async fn hall_create(
    State(st): Shared,
    body: Result<Json<CreateHallRequest>, JsonRejection>,
) -> Created<Hall> {
    let Json(req) = body?;
    let hall = pit_db::create_hall(&st.pool, &req.name).await?;
    Ok((StatusCode::CREATED, Json(hall)))
}

pub(crate) async fn chip_list(State(st): Shared) -> Found<Vec<ChipDenomination>> {
    Ok(Json(pit_db::list_chip_denominations(&st.pool).await?))
}

pub(crate) async fn chip_create(
    State(st): Shared,
    body: Result<Json<CreateChipRequest>, JsonRejection>,
) -> Created<ChipDenomination> {
    let Json(req) = body?;
    let chip = pit_db::create_chip_denomination(&st.pool, req.denomination).await?;
    Ok((StatusCode::CREATED, Json(chip)))
}

pub(crate) async fn slot_machine_list(State(st): Shared) -> Found<Vec<SlotMachine>> {
    Ok(Json(pit_db::list_slot_machines(&st.pool).await?))
}

pub(crate) async fn slot_machine_create(
    State(st): Shared,
    body: Result<Json<CreateSlotMachineRequest>, JsonRejection>,
) -> Created<SlotMachine> {
    let Json(req) = body?;
    let new = NewSlotMachine {
        name: req.name,
        brand: req.brand,
        hall_id: req.hall,
    };
    let slot = pit_db::create_slot_machine(&st.pool, &new).await?;
    Ok((StatusCode::CREATED, Json(slot)))
}

/// Record a slot machine's takings for an explicit game day.
pub(crate) async fn slot_machine_close(
    State(st): Shared,
    id: Result<Path<i64>, PathRejection>,
    body: Result<Json<DailyAmountRequest>, JsonRejection>,
) -> Found<DailyAmount> {
    let Path(id) = id?;
    let Json(req) = body?;
    Ok(Json(
        pit_db::set_daily_amount(&st.pool, id, req.game_day, req.amount).await?,
    ))
}

pub(crate) async fn daily_amount_list(
    State(st): Shared,
    game_day: Result<Path<i64>, PathRejection>,
) -> Found<Vec<DailyAmount>> {
    let Path(game_day) = game_day?;
    Ok(Json(pit_db::list_daily_amounts(&st.pool, game_day).await?))
}

/// Per-hall takings; both ends of the date range are required.
pub(crate) async fn hall_summary(
    State(st): Shared,
    q: Result<Query<HallSummaryQuery>, QueryRejection>,
) -> Found<Vec<HallDailyTotal>> {
    let Query(q) = q?;
    Ok(Json(pit_db::hall_daily_totals(&st.pool, q.from, q.to).await?))
}
