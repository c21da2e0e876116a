//! Integration tests for Settings loading with layered merge semantics.
//!
//! Layers (lowest to highest): global file, explicit file, env vars.
//! Each test uses its own env prefix so parallel tests do not interfere.

use std::fs;
use std::path::PathBuf;

use tempfile::TempDir;

use svcpack::application::demo::{bootstrap, Greeter, GREETER};
use svcpack::application::ApplicationError;
use svcpack::config::Settings;
use svcpack::domain::Value;

fn write_config(dir: &TempDir, name: &str, content: &str) -> PathBuf {
    let path = dir.path().join(name);
    fs::write(&path, content).expect("write config");
    path
}

#[test]
fn given_no_layers_when_loading_then_settings_are_empty() {
    let settings =
        Settings::load_layers(None, None, "SVCPACK_TEST_EMPTY").expect("load settings");
    assert!(settings.services.is_empty());
}

#[test]
fn given_explicit_file_when_loading_then_reads_service_tables() {
    let dir = TempDir::new().unwrap();
    let path = write_config(
        &dir,
        "custom.toml",
        r#"
[greeter]
greeting = "Howdy"

[db.pool]
size = 4
"#,
    );

    let settings =
        Settings::load_layers(None, Some(&path), "SVCPACK_TEST_EXPLICIT").expect("load settings");

    assert_eq!(
        settings.service("greeter").and_then(|s| s.get("greeting")),
        Some(&Value::from("Howdy"))
    );
    assert_eq!(
        settings
            .service("db")
            .and_then(|s| s.lookup("pool.size"))
            .and_then(Value::as_i64),
        Some(4)
    );
}

#[test]
fn given_global_and_explicit_files_when_loading_then_explicit_wins_and_tables_merge() {
    let dir = TempDir::new().unwrap();
    let global = write_config(
        &dir,
        "global.toml",
        r#"
[greeter]
greeting = "Hello"
excitement = 2
"#,
    );
    let explicit = write_config(
        &dir,
        "local.toml",
        r#"
[greeter]
greeting = "Ahoy"
"#,
    );

    let settings = Settings::load_layers(Some(&global), Some(&explicit), "SVCPACK_TEST_LAYERS")
        .expect("load settings");

    let greeter = settings.service("greeter").expect("greeter settings");
    assert_eq!(greeter.get("greeting"), Some(&Value::from("Ahoy")));
    assert_eq!(greeter.get("excitement"), Some(&Value::from(2)));
}

#[test]
fn given_missing_global_file_when_loading_then_is_skipped() {
    let dir = TempDir::new().unwrap();
    let missing = dir.path().join("absent.toml");

    let settings = Settings::load_layers(Some(&missing), None, "SVCPACK_TEST_MISSING_GLOBAL")
        .expect("load settings");

    assert!(settings.services.is_empty());
}

#[test]
fn given_missing_explicit_file_when_loading_then_config_error() {
    let dir = TempDir::new().unwrap();
    let missing = dir.path().join("absent.toml");

    let result = Settings::load_layers(None, Some(&missing), "SVCPACK_TEST_MISSING_EXPLICIT");

    assert!(matches!(result, Err(ApplicationError::Config { .. })));
}

#[test]
fn given_invalid_toml_when_loading_then_config_error_names_file() {
    let dir = TempDir::new().unwrap();
    let path = write_config(&dir, "broken.toml", "[greeter\ngreeting = ");

    let err = Settings::load_layers(None, Some(&path), "SVCPACK_TEST_BROKEN").unwrap_err();

    assert!(err.to_string().contains("broken.toml"), "{err}");
}

#[test]
fn given_env_override_when_loading_then_env_beats_file() {
    let dir = TempDir::new().unwrap();
    let path = write_config(
        &dir,
        "custom.toml",
        r#"
[greeter]
greeting = "Hello"
excitement = 1
"#,
    );
    std::env::set_var("SVCPACK_TEST_ENV__greeter__excitement", "5");

    let settings =
        Settings::load_layers(None, Some(&path), "SVCPACK_TEST_ENV").expect("load settings");

    let greeter = settings.service("greeter").expect("greeter settings");
    assert_eq!(greeter.get("excitement"), Some(&Value::from(5)));
    assert_eq!(greeter.get("greeting"), Some(&Value::from("Hello")));
}

#[test]
fn given_file_settings_when_bootstrapping_then_custom_values_beat_package_defaults() {
    let dir = TempDir::new().unwrap();
    let path = write_config(
        &dir,
        "custom.toml",
        r#"
[greeter]
excitement = 3
"#,
    );
    let settings =
        Settings::load_layers(None, Some(&path), "SVCPACK_TEST_BOOTSTRAP").expect("load settings");

    let container = bootstrap(settings.into_container()).expect("bootstrap");
    let greeter = container.resolve::<Greeter>(GREETER).expect("greeter");

    assert_eq!(greeter.greet("Ada"), "Hello, Ada!!!");
}

#[test]
fn given_settings_when_rendering_toml_then_round_trips() {
    let dir = TempDir::new().unwrap();
    let path = write_config(
        &dir,
        "custom.toml",
        r#"
[greeter]
greeting = "Hi"
"#,
    );
    let settings =
        Settings::load_layers(None, Some(&path), "SVCPACK_TEST_TOML").expect("load settings");

    let rendered = settings.to_toml().expect("render toml");
    let reparsed = write_config(&dir, "rendered.toml", &rendered);
    let again =
        Settings::load_layers(None, Some(&reparsed), "SVCPACK_TEST_TOML").expect("reload");

    assert_eq!(settings, again);
}

#[test]
fn given_toml_datetime_when_loading_then_setting_is_its_text() {
    let dir = TempDir::new().unwrap();
    let path = write_config(
        &dir,
        "custom.toml",
        r#"
[svc]
start = 1979-05-27T07:32:00Z
days = [1979-05-27, 1980-01-01]
"#,
    );

    let settings =
        Settings::load_layers(None, Some(&path), "SVCPACK_TEST_DATETIME").expect("load settings");
    let container = settings.into_container();

    assert_eq!(
        container.setting_str("svc", "start").expect("start setting"),
        "1979-05-27T07:32:00Z"
    );
    assert_eq!(
        container.setting("svc", "days").expect("days setting"),
        &Value::List(vec!["1979-05-27".into(), "1980-01-01".into()])
    );
}

#[test]
fn given_mixed_case_service_in_file_when_env_overrides_then_existing_spelling_wins() {
    let dir = TempDir::new().unwrap();
    let path = write_config(
        &dir,
        "custom.toml",
        r#"
[SomeService]
someValue = 10
"#,
    );
    std::env::set_var("SVCPACK_TEST_CASE__SomeService__someValue", "7");

    let settings =
        Settings::load_layers(None, Some(&path), "SVCPACK_TEST_CASE").expect("load settings");

    let service = settings.service("SomeService").expect("SomeService settings");
    assert_eq!(service.get("someValue"), Some(&Value::from(7)));
    assert!(settings.service("someservice").is_none());
}

#[test]
fn given_env_override_without_file_entry_when_loading_then_key_is_lowercase() {
    std::env::set_var("SVCPACK_TEST_CASE_ONLY__Fresh__Port", "9");

    let settings =
        Settings::load_layers(None, None, "SVCPACK_TEST_CASE_ONLY").expect("load settings");

    assert_eq!(
        settings.service("fresh").and_then(|s| s.get("port")),
        Some(&Value::from(9))
    );
}
