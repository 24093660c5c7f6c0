#![allow(clippy::float_cmp)]

use std::collections::HashMap;

use super::*;

fn lookup_from(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
    let map: HashMap<String, String> = pairs.iter().map(|(k, v)| ((*k).to_string(), (*v).to_string())).collect();
    move |key| map.get(key).cloned()
}

#[test]
fn defaults_when_nothing_set() {
    let cfg = MapConfig::from_lookup(lookup_from(&[])).unwrap();
    assert_eq!(cfg, MapConfig::default());
    assert_eq!(cfg.chunk_size, 1000.0);
    assert_eq!(cfg.reveal_warn_chunks, 1000);
    assert_eq!(cfg.drag_threshold_px, 3.0);
    assert_eq!(cfg.zoom_step, 1.5);
    assert!(cfg.statistics_enabled);
}

#[test]
fn parses_overrides() {
    let cfg = MapConfig::from_lookup(lookup_from(&[
        (ENV_CHUNK_SIZE, "250"),
        (ENV_BASE_GRID_SIZE, " 500.5 "),
        (ENV_REVEAL_WARN_CHUNKS, "64"),
        (ENV_DRAG_THRESHOLD_PX, "0"),
        (ENV_ZOOM_STEP, "2"),
        (ENV_STATISTICS, "off"),
    ]))
    .unwrap();
    assert_eq!(cfg.chunk_size, 250.0);
    assert_eq!(cfg.base_grid_size, 500.5);
    assert_eq!(cfg.reveal_warn_chunks, 64);
    assert_eq!(cfg.drag_threshold_px, 0.0);
    assert_eq!(cfg.zoom_step, 2.0);
    assert!(!cfg.statistics_enabled);
}

#[test]
fn unparseable_number_errors() {
    let err = MapConfig::from_lookup(lookup_from(&[(ENV_CHUNK_SIZE, "huge")])).unwrap_err();
    assert_eq!(err, ConfigError::Parse { key: ENV_CHUNK_SIZE, value: "huge".into() });
    assert!(err.to_string().contains("STELLAR_MAP_CHUNK_SIZE"));
}

#[test]
fn unparseable_flag_errors() {
    let err = MapConfig::from_lookup(lookup_from(&[(ENV_STATISTICS, "maybe")])).unwrap_err();
    assert!(matches!(err, ConfigError::Parse { key: ENV_STATISTICS, .. }));
}

#[test]
fn non_positive_chunk_size_rejected() {
    let err = MapConfig::from_lookup(lookup_from(&[(ENV_CHUNK_SIZE, "0")])).unwrap_err();
    assert!(matches!(err, ConfigError::Invalid { key: ENV_CHUNK_SIZE, .. }));
    let err = MapConfig::from_lookup(lookup_from(&[(ENV_BASE_GRID_SIZE, "-10")])).unwrap_err();
    assert!(matches!(err, ConfigError::Invalid { key: ENV_BASE_GRID_SIZE, .. }));
}

#[test]
fn zoom_step_must_exceed_one() {
    let err = MapConfig::from_lookup(lookup_from(&[(ENV_ZOOM_STEP, "1.0")])).unwrap_err();
    assert!(err.to_string().contains("greater than 1.0"));
}

#[test]
fn negative_drag_threshold_rejected() {
    let err = MapConfig::from_lookup(lookup_from(&[(ENV_DRAG_THRESHOLD_PX, "-1")])).unwrap_err();
    assert!(matches!(err, ConfigError::Invalid { key: ENV_DRAG_THRESHOLD_PX, .. }));
}

#[test]
fn chunk_area_is_square_of_size() {
    let cfg = MapConfig { chunk_size: 20.0, ..MapConfig::default() };
    assert_eq!(cfg.chunk_area(), 400.0);
}

#[test]
fn from_env_reads_process_environment() {
    unsafe {
        std::env::set_var(ENV_REVEAL_WARN_CHUNKS, "12");
    }
    let cfg = MapConfig::from_env().unwrap();
    assert_eq!(cfg.reveal_warn_chunks, 12);
    unsafe {
        std::env::remove_var(ENV_REVEAL_WARN_CHUNKS);
    }
}
