use assert_cmd::prelude::*;
use predicates::prelude::*;
use std::process::Command;

fn repo_root() -> std::path::PathBuf {
    std::path::Path::new(env!("CARGO_MANIFEST_DIR"))
        .join("..")
        .join("..")
        .canonicalize()
        .expect("repo root")
}

/// `pit config-hash` prints the same hash the library computes.
#[test]
fn config_hash_matches_library() -> anyhow::Result<()> {
    let base = repo_root().join("config/defaults/base.yaml");
    let base_s = base.to_string_lossy().to_string();
    let loaded = pit_config::load_layered_yaml(&[base_s.as_str()])?;

    Command::cargo_bin("pit")?
        .arg("config-hash")
        .arg(&base_s)
        .assert()
        .success()
        .stdout(predicate::str::contains(format!(
            "config_hash={}",
            loaded.config_hash
        )));
    Ok(())
}

#[test]
fn config_hash_requires_paths() -> anyhow::Result<()> {
    Command::cargo_bin("pit")?
        .arg("config-hash")
        .assert()
        .failure();
    Ok(())
}

#[test]
fn day_open_rejects_malformed_date_before_connecting() -> anyhow::Result<()> {
    Command::cargo_bin("pit")?
        .args(["day", "open", "--date", "2024-13-40"])
        .env_remove("PIT_DATABASE_URL")
        .assert()
        .failure()
        .stderr(predicate::str::contains("--date"));
    Ok(())
}

#[test]
fn db_status_without_url_fails_with_env_var_name() -> anyhow::Result<()> {
    Command::cargo_bin("pit")?
        .args(["db", "status"])
        .current_dir(env!("CARGO_MANIFEST_DIR"))
        .env_remove("PIT_DATABASE_URL")
        .env_remove("PIT_CONFIG")
        .assert()
        .failure()
        .stderr(predicate::str::contains("PIT_DATABASE_URL"));
    Ok(())
}
