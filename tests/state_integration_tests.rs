//! Integration tests for StatePersistence and the on-disk state format
//!
//! These tests verify:
//! - States round-trip through save/load unchanged
//! - Unset integration sections stay unset
//! - Missing, malformed and incomplete files are rejected
//! - The JSON layout matches files written by other tools

use camino::Utf8PathBuf;
use proptest::prelude::*;
use statekeep::models::{AggregatorConfig, DatabaseConfig, GitConfig, OutputLine};
use statekeep::{AppConfig, AppState, ErrorItem, PersistenceError, StatePersistence};
use std::fs;
use tempfile::TempDir;

fn create_test_state_path() -> (TempDir, Utf8PathBuf) {
    let temp_dir = TempDir::new().unwrap();
    let path = Utf8PathBuf::try_from(temp_dir.path().join("app.state")).unwrap();
    (temp_dir, path)
}

fn full_state() -> AppState {
    AppState {
        name: "ingest".to_string(),
        version: "2.4.1".to_string(),
        data: "batch=17".to_string(),
        status: "Running".to_string(),
        pid: 4242,
        last_updated: 1_700_000_100,
        stared_at: 1_700_000_000,
        event_counter: 9,
        error_log: vec![
            ErrorItem::new("GeneralError", "first failure"),
            ErrorItem::new("IoError", "disk full"),
        ],
        config: AppConfig {
            app_name: "ingest".to_string(),
            max_ram_usage: 512,
            max_cpu_usage: 30,
            environment: "production".to_string(),
            debug_mode: true,
            log_level: "Debug".to_string(),
            git: Some(GitConfig {
                default_server: "GitLab".to_string(),
                credentials_file: "/opt/artisan/artisan.cf".to_string(),
            }),
            database: Some(DatabaseConfig {
                url: "postgres://db/ingest".to_string(),
                pool_size: 5,
            }),
            aggregator: Some(AggregatorConfig {
                socket_path: "/run/aggregator.sock".to_string(),
                socket_permission: Some(0o660),
            }),
        },
        system_application: true,
        stdout: vec![(1_700_000_001, "started".to_string())],
        stderr: vec![(1_700_000_002, "warning: slow disk".to_string())],
    }
}

fn minimal_state() -> AppState {
    AppState {
        name: "idle".to_string(),
        version: "0.0.1".to_string(),
        data: String::new(),
        status: "Idle".to_string(),
        pid: 1,
        last_updated: 0,
        stared_at: 0,
        event_counter: 0,
        error_log: Vec::new(),
        config: AppConfig::default(),
        system_application: false,
        stdout: Vec::new(),
        stderr: Vec::new(),
    }
}

#[test]
fn test_round_trip_full_state() {
    let (_temp_dir, path) = create_test_state_path();
    let state = full_state();

    StatePersistence::save_state(&state, &path).unwrap();
    let loaded = StatePersistence::load_state(&path).unwrap();

    assert_eq!(loaded, state);
}

#[test]
fn test_round_trip_keeps_unset_sections_unset() {
    let (_temp_dir, path) = create_test_state_path();
    let state = minimal_state();

    StatePersistence::save_state(&state, &path).unwrap();
    let loaded = StatePersistence::load_state(&path).unwrap();

    assert_eq!(loaded, state);
    assert!(loaded.config.git.is_none());
    assert!(loaded.config.database.is_none());
    assert!(loaded.config.aggregator.is_none());
    assert!(loaded.error_log.is_empty());
    assert!(loaded.stdout.is_empty());
    assert!(loaded.stderr.is_empty());
}

#[test]
fn test_load_nonexistent_file() {
    let (_temp_dir, path) = create_test_state_path();

    let err = StatePersistence::load_state(&path).unwrap_err();

    assert!(err.is_not_found(), "expected not-found, got: {}", err);
}

#[test]
fn test_load_malformed_json() {
    let (_temp_dir, path) = create_test_state_path();
    fs::write(&path, "not json").unwrap();

    let err = StatePersistence::load_state(&path).unwrap_err();

    match err {
        PersistenceError::Format { source, .. } => assert!(source.is_syntax()),
        other => panic!("expected a format error, got: {}", other),
    }
}

#[test]
fn test_load_missing_required_fields() {
    let (_temp_dir, path) = create_test_state_path();
    fs::write(&path, r#"{"name": "x"}"#).unwrap();

    let err = StatePersistence::load_state(&path).unwrap_err();

    match err {
        PersistenceError::Format { source, .. } => assert!(source.is_data()),
        other => panic!("expected a format error, got: {}", other),
    }
}

#[test]
fn test_load_missing_config_fails() {
    let (_temp_dir, path) = create_test_state_path();
    let mut value = serde_json::to_value(minimal_state()).unwrap();
    value.as_object_mut().unwrap().remove("config");
    fs::write(&path, value.to_string()).unwrap();

    assert!(StatePersistence::load_state(&path).is_err());
}

#[test]
fn test_second_save_overwrites_first() {
    let (_temp_dir, path) = create_test_state_path();

    StatePersistence::save_state(&full_state(), &path).unwrap();
    StatePersistence::save_state(&minimal_state(), &path).unwrap();

    let loaded = StatePersistence::load_state(&path).unwrap();
    assert_eq!(loaded, minimal_state());
}

#[test]
fn test_saved_layout() {
    let (_temp_dir, path) = create_test_state_path();
    StatePersistence::save_state(&full_state(), &path).unwrap();

    let contents = fs::read_to_string(&path).unwrap();

    // Two-space indentation, keys in record order
    assert!(contents.starts_with("{\n  \"name\": \"ingest\",\n  \"version\": \"2.4.1\","));
    assert!(contents.contains("\n  \"stared_at\": 1700000000,"));
    assert!(!contents.contains("started_at"));

    let value: serde_json::Value = serde_json::from_str(&contents).unwrap();
    assert_eq!(value["stdout"], serde_json::json!([[1_700_000_001u64, "started"]]));
    assert_eq!(
        value["error_log"][1],
        serde_json::json!({"err_type": "IoError", "err_mesg": "disk full"})
    );
    assert_eq!(value["config"]["aggregator"]["socket_permission"], 0o660);
}

#[test]
fn test_unset_sections_written_as_null() {
    let (_temp_dir, path) = create_test_state_path();
    StatePersistence::save_state(&minimal_state(), &path).unwrap();

    let value: serde_json::Value =
        serde_json::from_str(&fs::read_to_string(&path).unwrap()).unwrap();

    assert!(value["config"]["git"].is_null());
    assert!(value["config"]["database"].is_null());
    assert!(value["config"]["aggregator"].is_null());
}

#[test]
fn test_load_hand_written_file() {
    let (_temp_dir, path) = create_test_state_path();
    let contents = r#"{
  "name": "legacy",
  "version": "1.0.0",
  "data": "",
  "status": "Stopped",
  "pid": 77,
  "last_updated": 10,
  "stared_at": 5,
  "event_counter": 3,
  "config": {
    "app_name": "legacy",
    "max_ram_usage": 0,
    "max_cpu_usage": 0,
    "environment": "production",
    "debug_mode": false,
    "log_level": "Info",
    "database": null,
    "aggregator": {"socket_path": "/tmp/agg.sock"}
  }
}"#;
    fs::write(&path, contents).unwrap();

    let state = StatePersistence::load_state(&path).unwrap();

    assert_eq!(state.name, "legacy");
    assert_eq!(state.stared_at, 5);
    assert!(state.error_log.is_empty());
    assert!(state.stdout.is_empty());
    assert!(state.stderr.is_empty());
    assert!(!state.system_application);
    assert!(state.config.git.is_none());
    assert!(state.config.database.is_none());

    let aggregator = state.config.aggregator.unwrap();
    assert_eq!(aggregator.socket_path, "/tmp/agg.sock");
    assert_eq!(aggregator.socket_permission, None);
}

#[test]
fn test_load_rejects_wrong_field_type() {
    let (_temp_dir, path) = create_test_state_path();
    let mut value = serde_json::to_value(minimal_state()).unwrap();
    value["pid"] = serde_json::json!("not a pid");
    fs::write(&path, value.to_string()).unwrap();

    assert!(StatePersistence::load_state(&path).is_err());
}

prop_compose! {
    fn arb_output()(lines in prop::collection::vec((any::<u64>(), ".{0,24}"), 0..4)) -> Vec<OutputLine> {
        lines
    }
}

prop_compose! {
    fn arb_config()(
        app_name in "[a-z][a-z0-9-]{0,12}",
        max_ram_usage in any::<u64>(),
        max_cpu_usage in any::<u64>(),
        environment in "(development|staging|production)",
        debug_mode in any::<bool>(),
        log_level in "(Error|Warn|Info|Debug|Trace)",
        git in proptest::option::of(("[A-Za-z]{1,8}", ".{0,16}")),
        database in proptest::option::of((".{0,20}", any::<u32>())),
        aggregator in proptest::option::of((".{0,20}", proptest::option::of(any::<u32>()))),
    ) -> AppConfig {
        AppConfig {
            app_name,
            max_ram_usage,
            max_cpu_usage,
            environment,
            debug_mode,
            log_level,
            git: git.map(|(default_server, credentials_file)| GitConfig { default_server, credentials_file }),
            database: database.map(|(url, pool_size)| DatabaseConfig { url, pool_size }),
            aggregator: aggregator.map(|(socket_path, socket_permission)| AggregatorConfig { socket_path, socket_permission }),
        }
    }
}

prop_compose! {
    fn arb_runtime()(
        pid in any::<u32>(),
        last_updated in any::<u64>(),
        stared_at in any::<u64>(),
        event_counter in any::<u32>(),
        system_application in any::<bool>(),
    ) -> (u32, u64, u64, u32, bool) {
        (pid, last_updated, stared_at, event_counter, system_application)
    }
}

prop_compose! {
    fn arb_state()(
        name in ".{0,16}",
        version in "[0-9]{1,2}\\.[0-9]{1,2}\\.[0-9]{1,2}",
        data in ".{0,32}",
        status in "[A-Za-z]{0,10}",
        runtime in arb_runtime(),
        error_log in prop::collection::vec(("[A-Za-z]{1,12}", ".{0,24}"), 0..4),
        config in arb_config(),
        stdout in arb_output(),
        stderr in arb_output(),
    ) -> AppState {
        let (pid, last_updated, stared_at, event_counter, system_application) = runtime;
        AppState {
            name,
            version,
            data,
            status,
            pid,
            last_updated,
            stared_at,
            event_counter,
            error_log: error_log
                .into_iter()
                .map(|(err_type, err_mesg)| ErrorItem { err_type, err_mesg })
                .collect(),
            config,
            system_application,
            stdout,
            stderr,
        }
    }
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(64))]

    #[test]
    fn prop_save_then_load_is_identity(state in arb_state()) {
        let (_temp_dir, path) = create_test_state_path();

        StatePersistence::save_state(&state, &path).unwrap();
        let loaded = StatePersistence::load_state(&path).unwrap();

        prop_assert_eq!(loaded, state);
    }
}
