//! Typed view over the merged config, with defaults for every key.
//!
//! Config files never hold the database URL itself, only the NAME of the
//! environment variable carrying it (`/db/url_env`).

use anyhow::{anyhow, Context, Result};
use pit_ledger::GamingDayClock;
use serde::Deserialize;
use serde_json::Value;

pub const DEFAULT_DB_URL_ENV: &str = "PIT_DATABASE_URL";

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ServerConfig {
    pub addr: String,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            addr: "127.0.0.1:8890".to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct DbConfig {
    pub url_env: String,
    pub max_connections: u32,
    pub migrate_on_boot: bool,
}

impl Default for DbConfig {
    fn default() -> Self {
        Self {
            url_env: DEFAULT_DB_URL_ENV.to_string(),
            max_connections: 10,
            migrate_on_boot: false,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct CorsConfig {
    pub allowed_origins: Vec<String>,
}

impl Default for CorsConfig {
    fn default() -> Self {
        let allowed_origins = [
            "http://localhost",
            "http://127.0.0.1",
            "http://localhost:3000",
            "http://127.0.0.1:3000",
            "http://localhost:5173",
            "http://127.0.0.1:5173",
        ]
        .iter()
        .map(|s| s.to_string())
        .collect();
        Self { allowed_origins }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct GameDayConfig {
    /// IANA zone name.
    pub timezone: String,
    /// `HH:MM` local time at which one gaming day rolls into the next.
    pub cutoff: String,
}

impl Default for GameDayConfig {
    fn default() -> Self {
        Self {
            timezone: "UTC".to_string(),
            cutoff: "00:00".to_string(),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct ServiceConfig {
    pub server: ServerConfig,
    pub db: DbConfig,
    pub cors: CorsConfig,
    pub game_day: GameDayConfig,
}

impl ServiceConfig {
    /// Build from merged config JSON. Unknown top-level sections are left to
    /// [`crate::report_unused_keys`]; unknown keys inside a known section fail.
    pub fn from_json(v: &Value) -> Result<Self> {
        let cfg: ServiceConfig =
            serde_json::from_value(v.clone()).context("config does not match service schema")?;
        if cfg.db.max_connections == 0 {
            return Err(anyhow!("/db/max_connections must be > 0"));
        }
        cfg.clock()?;
        Ok(cfg)
    }

    pub fn clock(&self) -> Result<GamingDayClock> {
        GamingDayClock::parse(&self.game_day.timezone, &self.game_day.cutoff)
            .map_err(|e| anyhow!("/game_day: {e}"))
    }

    /// Resolve the database URL from the environment variable named in config.
    pub fn database_url(&self) -> Result<String> {
        let name = self.db.url_env.trim();
        match std::env::var(name) {
            Ok(v) if !v.trim().is_empty() => Ok(v),
            _ => Err(anyhow!("missing env var {name} (named by /db/url_env)")),
        }
    }
}
