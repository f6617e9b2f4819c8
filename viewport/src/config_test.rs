#![allow(clippy::float_cmp)]

use std::collections::HashMap;

use super::*;

fn lookup_from(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
    let map: HashMap<String, String> = pairs
        .iter()
        .map(|(k, v)| ((*k).to_string(), (*v).to_string()))
        .collect();
    move |key| map.get(key).cloned()
}

// =============================================================
// Defaults
// =============================================================

#[test]
fn defaults_match_stock_animation() {
    let config = EngineConfig::default();
    assert_eq!(config.drag_margin, 15.0);
    assert_eq!(config.flow_lifetime_ms, 8000.0);
    assert_eq!(config.ambient_interval_ms, 1800.0);
    assert_eq!(config.ambient_probability, 0.6);
    assert_eq!(config.checkpoint_interval_ms, 5000.0);
    assert_eq!(config.checkpoint_probability, 0.3);
    assert_eq!(config.speed, 1.0);
}

#[test]
fn defaults_validate() {
    assert!(EngineConfig::default().validate().is_ok());
}

// =============================================================
// from_json
// =============================================================

#[test]
fn empty_json_object_is_all_defaults() {
    let config = EngineConfig::from_json("{}").unwrap();
    assert_eq!(config, EngineConfig::default());
}

#[test]
fn json_overrides_selected_fields() {
    let config = EngineConfig::from_json(r#"{ "drag_margin": 20, "seed": 7, "speed": 2.5 }"#).unwrap();
    assert_eq!(config.drag_margin, 20.0);
    assert_eq!(config.seed, 7);
    assert_eq!(config.speed, 2.5);
    assert_eq!(config.flow_lifetime_ms, 8000.0);
}

#[test]
fn malformed_json_is_json_error() {
    let err = EngineConfig::from_json("{ drag_margin: ").unwrap_err();
    assert!(matches!(err, ConfigError::Json(_)));
}

#[test]
fn wrongly_typed_field_is_json_error() {
    let err = EngineConfig::from_json(r#"{ "drag_margin": "wide" }"#).unwrap_err();
    assert!(matches!(err, ConfigError::Json(_)));
}

#[test]
fn negative_margin_is_out_of_range() {
    let err = EngineConfig::from_json(r#"{ "drag_margin": -1 }"#).unwrap_err();
    assert!(matches!(err, ConfigError::OutOfRange { field: "drag_margin", .. }));
    assert!(err.to_string().contains("drag_margin"));
}

#[test]
fn zero_interval_is_out_of_range() {
    let err = EngineConfig::from_json(r#"{ "ambient_interval_ms": 0 }"#).unwrap_err();
    assert!(matches!(err, ConfigError::OutOfRange { field: "ambient_interval_ms", .. }));
}

#[test]
fn probability_above_one_is_out_of_range() {
    let err = EngineConfig::from_json(r#"{ "checkpoint_probability": 1.5 }"#).unwrap_err();
    assert!(matches!(err, ConfigError::OutOfRange { field: "checkpoint_probability", .. }));
}

#[test]
fn config_roundtrips_through_json() {
    let config = EngineConfig { drag_margin: 3.0, seed: 123, ..Default::default() };
    let raw = serde_json::to_string(&config).unwrap();
    assert_eq!(EngineConfig::from_json(&raw).unwrap(), config);
}

// =============================================================
// from_lookup
// =============================================================

#[test]
fn lookup_with_no_keys_is_default() {
    let config = EngineConfig::from_lookup(lookup_from(&[])).unwrap();
    assert_eq!(config, EngineConfig::default());
}

#[test]
fn lookup_reads_viewport_keys() {
    let config = EngineConfig::from_lookup(lookup_from(&[
        ("VIEWPORT_DRAG_MARGIN", "25"),
        ("VIEWPORT_FLOW_LIFETIME_MS", "4000"),
        ("VIEWPORT_SEED", " 42 "),
    ]))
    .unwrap();
    assert_eq!(config.drag_margin, 25.0);
    assert_eq!(config.flow_lifetime_ms, 4000.0);
    assert_eq!(config.seed, 42);
}

#[test]
fn lookup_unparseable_value_falls_back() {
    let config = EngineConfig::from_lookup(lookup_from(&[("VIEWPORT_SPEED", "fast")])).unwrap();
    assert_eq!(config.speed, 1.0);
}

#[test]
fn lookup_invalid_value_is_rejected() {
    let err = EngineConfig::from_lookup(lookup_from(&[("VIEWPORT_AMBIENT_PROBABILITY", "2")])).unwrap_err();
    assert!(matches!(err, ConfigError::OutOfRange { field: "ambient_probability", .. }));
}
