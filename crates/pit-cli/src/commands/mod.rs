//! Command handler modules for pit-cli.
//!
//! Shared utilities used by multiple command paths live here.
//! Command-specific logic lives in the submodules.

pub mod day;
pub mod floor;

use anyhow::{bail, Context, Result};
use pit_config::{ConfigMode, ServiceConfig, UnusedKeyPolicy};
use pit_ledger::RawFloat;
use sqlx::PgPool;
use tracing::warn;

// ---------------------------------------------------------------------------
// Shared helpers
// ---------------------------------------------------------------------------

/// Load layered config from PIT_CONFIG (or the default base layer).
pub fn load_service_config() -> Result<ServiceConfig> {
    let loaded = pit_config::load_from_env().context("load config")?;
    let unused =
        pit_config::report_unused_keys(ConfigMode::Cli, &loaded.config_json, UnusedKeyPolicy::Warn)?;
    if !unused.is_clean() {
        warn!(keys = ?unused.unused_leaf_pointers, "config keys unused by the CLI");
    }
    ServiceConfig::from_json(&loaded.config_json)
}

pub async fn connect(cfg: &ServiceConfig) -> Result<PgPool> {
    pit_db::connect(&cfg.database_url()?, cfg.db.max_connections).await
}

/// Parse `"5=10,25=4"` into a raw float. A denomination given twice is
/// rejected here; everything else about keys and quantities is left to the
/// ledger so the CLI reports the same errors as the API.
pub fn parse_float_arg(s: &str) -> Result<RawFloat> {
    let mut out = RawFloat::new();
    for part in s.split(',').map(str::trim).filter(|p| !p.is_empty()) {
        let Some((denomination, quantity)) = part.split_once('=') else {
            bail!("invalid float entry '{part}': expected DENOMINATION=QUANTITY");
        };
        let quantity: i64 = quantity
            .trim()
            .parse()
            .with_context(|| format!("invalid quantity in '{part}'"))?;
        let denomination = denomination.trim();
        if out.insert(denomination.to_string(), quantity).is_some() {
            bail!("duplicate denomination '{denomination}' in float");
        }
    }
    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_pairs_and_ignores_blank_entries() {
        let f = parse_float_arg("5=10, 25=4,").unwrap();
        assert_eq!(f.len(), 2);
        assert_eq!(f["5"], 10);
        assert_eq!(f["25"], 4);
    }

    #[test]
    fn empty_string_is_empty_float() {
        assert!(parse_float_arg("").unwrap().is_empty());
    }

    #[test]
    fn missing_equals_is_rejected() {
        let err = parse_float_arg("5:10").unwrap_err();
        assert!(err.to_string().contains("DENOMINATION=QUANTITY"));
    }

    #[test]
    fn repeated_denomination_is_rejected() {
        let err = parse_float_arg("5=1,25=2,5=2").unwrap_err();
        assert!(err.to_string().contains("duplicate denomination '5'"));
        let err = parse_float_arg("5=1, 5 =2").unwrap_err();
        assert!(err.to_string().contains("duplicate"));
    }

    #[test]
    fn negative_quantities_pass_through_for_ledger_validation() {
        let f = parse_float_arg("5=-1").unwrap();
        assert_eq!(f["5"], -1);
    }
}
