//! Layered config hashing must be deterministic and order-insensitive with
//! respect to keys inside a layer.

use pit_config::load_layered_yaml_from_strings;

const BASE_YAML: &str = r#"
server:
  addr: "0.0.0.0:8890"
db:
  url_env: "PIT_DATABASE_URL"
  max_connections: 10
game_day:
  timezone: "Asia/Tbilisi"
  cutoff: "06:00"
"#;

const BASE_YAML_REORDERED: &str = r#"
game_day:
  cutoff: "06:00"
  timezone: "Asia/Tbilisi"
db:
  max_connections: 10
  url_env: "PIT_DATABASE_URL"
server:
  addr: "0.0.0.0:8890"
"#;

const OVERLAY_YAML: &str = r#"
db:
  max_connections: 4
"#;

#[test]
fn same_input_produces_identical_hash() {
    let a = load_layered_yaml_from_strings(&[BASE_YAML]).unwrap();
    let b = load_layered_yaml_from_strings(&[BASE_YAML]).unwrap();
    assert_eq!(a.config_hash, b.config_hash);
    assert_eq!(a.canonical_json, b.canonical_json);
}

#[test]
fn key_order_does_not_change_hash() {
    let a = load_layered_yaml_from_strings(&[BASE_YAML]).unwrap();
    let b = load_layered_yaml_from_strings(&[BASE_YAML_REORDERED]).unwrap();
    assert_eq!(a.config_hash, b.config_hash);
}

#[test]
fn overlay_overrides_and_changes_hash() {
    let base = load_layered_yaml_from_strings(&[BASE_YAML]).unwrap();
    let merged = load_layered_yaml_from_strings(&[BASE_YAML, OVERLAY_YAML]).unwrap();
    assert_ne!(base.config_hash, merged.config_hash);
    assert_eq!(merged.config_json["db"]["max_connections"], 4);
    // Siblings of the overridden key survive the merge.
    assert_eq!(merged.config_json["db"]["url_env"], "PIT_DATABASE_URL");
    assert_eq!(merged.config_hash.len(), 64);
}

#[test]
fn empty_layer_is_a_no_op() {
    let a = load_layered_yaml_from_strings(&[BASE_YAML]).unwrap();
    let b = load_layered_yaml_from_strings(&[BASE_YAML, ""]).unwrap();
    assert_eq!(a.config_hash, b.config_hash);
}
