use pit_config::{load_layered_yaml_from_strings, ServiceConfig};

#[test]
fn empty_config_yields_defaults() {
    let loaded = load_layered_yaml_from_strings(&[]).unwrap();
    let cfg = ServiceConfig::from_json(&loaded.config_json).unwrap();
    assert_eq!(cfg, ServiceConfig::default());
    assert_eq!(cfg.server.addr, "127.0.0.1:8890");
    assert_eq!(cfg.db.url_env, "PIT_DATABASE_URL");
    assert!(!cfg.db.migrate_on_boot);
}

#[test]
fn overrides_are_applied_per_key() {
    let loaded = load_layered_yaml_from_strings(&[r#"
db:
  max_connections: 3
  migrate_on_boot: true
game_day:
  timezone: "America/Los_Angeles"
  cutoff: "06:00"
"#])
    .unwrap();
    let cfg = ServiceConfig::from_json(&loaded.config_json).unwrap();
    assert_eq!(cfg.db.max_connections, 3);
    assert!(cfg.db.migrate_on_boot);
    assert_eq!(cfg.db.url_env, "PIT_DATABASE_URL");
    let clock = cfg.clock().unwrap();
    assert_eq!(clock.tz().name(), "America/Los_Angeles");
    assert_eq!(clock.cutoff().format("%H:%M").to_string(), "06:00");
}

#[test]
fn invalid_values_fail_at_load() {
    for yaml in [
        "db:\n  max_connections: 0\n",
        "game_day:\n  timezone: \"Nowhere/Special\"\n",
        "game_day:\n  cutoff: \"25:00\"\n",
        "server:\n  adress: \"typo\"\n",
    ] {
        let loaded = load_layered_yaml_from_strings(&[yaml]).unwrap();
        assert!(
            ServiceConfig::from_json(&loaded.config_json).is_err(),
            "expected failure for {yaml:?}"
        );
    }
}

#[test]
fn database_url_comes_from_named_env_var() {
    let loaded = load_layered_yaml_from_strings(&[r#"
db:
  url_env: "PIT_TEST_URL_FOR_SERVICE_CONFIG"
"#])
    .unwrap();
    let cfg = ServiceConfig::from_json(&loaded.config_json).unwrap();
    assert!(cfg.database_url().is_err());

    std::env::set_var("PIT_TEST_URL_FOR_SERVICE_CONFIG", "postgres://localhost/pit");
    assert_eq!(cfg.database_url().unwrap(), "postgres://localhost/pit");
    std::env::remove_var("PIT_TEST_URL_FOR_SERVICE_CONFIG");
}
