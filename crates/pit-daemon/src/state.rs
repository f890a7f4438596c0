//! Shared runtime state for pit-daemon.
//!
//! Handlers receive `State<Arc<AppState>>` from Axum. The pool is the only
//! mutable resource and it lives in Postgres; nothing here needs a lock.

use pit_ledger::GamingDayClock;
use serde::{Deserialize, Serialize};
use sqlx::PgPool;

/// Static build metadata included in health responses.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct BuildInfo {
    pub service: &'static str,
    pub version: &'static str,
}

impl Default for BuildInfo {
    fn default() -> Self {
        Self {
            service: "pit-daemon",
            version: env!("CARGO_PKG_VERSION"),
        }
    }
}

#[derive(Clone)]
pub struct AppState {
    pub pool: PgPool,
    pub build: BuildInfo,
    /// Maps fill/credit action times onto gaming dates.
    pub clock: GamingDayClock,
}

impl AppState {
    pub fn new(pool: PgPool, clock: GamingDayClock) -> Self {
        Self {
            pool,
            build: BuildInfo::default(),
            clock,
        }
    }
}
