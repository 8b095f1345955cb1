// tests/config_layers.rs

mod common;
use crate::common::{TestResult, init_tracing};

use assetflow::config::{BuildInfo, ConfigLoader, ConfigSeed};
use assetflow::errors::AssetflowError;
use assetflow::fs::mock::MockFileSystem;
use assetflow::types::RebuildWhileRunning;
use serde_json::json;

fn seed(env_flag: Option<&str>) -> ConfigSeed {
    ConfigSeed {
        env_flag: env_flag.map(str::to_string),
        uglify_flag: None,
        env_var: None,
        build: BuildInfo {
            date: "2024-05-01T12:00:00.000Z".into(),
            user: "builder".into(),
            hostname: "ci".into(),
        },
    }
}

#[test]
fn env_specific_layer_overrides_generic_layer() -> TestResult {
    init_tracing();
    let fs = MockFileSystem::new();
    fs.add_file("./config/config.json", r#"{"a": 1}"#);
    fs.add_file("./config/config-dev.json", r#"{"a": 2, "b": 3}"#);

    let config = ConfigLoader::new(&fs, "./config").load(&seed(None))?;

    assert_eq!(config.get("a"), Some(&json!(2)));
    assert_eq!(config.get("b"), Some(&json!(3)));
    assert_eq!(config.env(), "dev");
    Ok(())
}

#[test]
fn layers_merge_in_fixed_order() -> TestResult {
    let fs = MockFileSystem::new();
    fs.add_file("./config/config.json", r#"{"order": "json", "json": true}"#);
    fs.add_file("./config/config.hjson", "{\n  order: hjson\n  hjson: true\n}\n");
    fs.add_file("./config/config-qa.json", r#"{"order": "qa-json"}"#);
    fs.add_file("./config/config-qa.hjson", "{\n  // last one wins\n  order: qa-hjson\n}\n");
    fs.add_file("./config/config-dev.json", r#"{"order": "never read"}"#);

    let config = ConfigLoader::new(&fs, "./config").load(&seed(Some("qa")))?;

    assert_eq!(config.get("order"), Some(&json!("qa-hjson")));
    assert_eq!(config.get("json"), Some(&json!(true)));
    assert_eq!(config.get("hjson"), Some(&json!(true)));
    Ok(())
}

#[test]
fn merge_is_shallow() -> TestResult {
    let fs = MockFileSystem::new();
    fs.add_file("./config/config.json", r#"{"server": {"host": "a", "port": 1}}"#);
    fs.add_file("./config/config-dev.json", r#"{"server": {"port": 2}}"#);

    let config = ConfigLoader::new(&fs, "./config").load(&seed(None))?;

    assert_eq!(config.get("server"), Some(&json!({"port": 2})));
    Ok(())
}

#[test]
fn seeded_defaults_survive_without_layers() -> TestResult {
    let fs = MockFileSystem::new();

    let config = ConfigLoader::new(&fs, "./config").load(&seed(Some("production")))?;

    assert_eq!(config.env(), "production");
    assert!(!config.uglify());
    assert!(config.should_minify());
    assert_eq!(config.get("buildDate"), Some(&json!("2024-05-01T12:00:00.000Z")));
    assert_eq!(config.get("buildUser"), Some(&json!("builder")));
    assert_eq!(config.get("buildHostname"), Some(&json!("ci")));
    assert_eq!(config.server_port()?, 3000);
    assert_eq!(config.rebuild_while_running()?, RebuildWhileRunning::Queue);
    Ok(())
}

#[test]
fn env_override_does_not_change_layer_selection() -> TestResult {
    let fs = MockFileSystem::new();
    fs.add_file("./config/config.json", r#"{"env": "production"}"#);
    fs.add_file("./config/config-dev.json", r#"{"picked": "dev"}"#);
    fs.add_file("./config/config-production.json", r#"{"picked": "production"}"#);

    let config = ConfigLoader::new(&fs, "./config").load(&seed(None))?;

    assert_eq!(config.env(), "production");
    assert_eq!(config.get("picked"), Some(&json!("dev")));
    Ok(())
}

#[test]
fn malformed_layer_names_the_file() {
    let fs = MockFileSystem::new();
    fs.add_file("./config/config.json", r#"{"ok": true}"#);
    fs.add_file("./config/config-dev.hjson", "{ unterminated: [1, 2");

    let err = ConfigLoader::new(&fs, "./config")
        .load(&seed(None))
        .unwrap_err();

    match err {
        AssetflowError::ConfigParse { path, .. } => {
            assert!(path.ends_with("config-dev.hjson"), "unexpected path {path:?}");
        }
        other => panic!("expected ConfigParse, got {other:?}"),
    }
}

#[test]
fn layer_settings_feed_typed_accessors() -> TestResult {
    let fs = MockFileSystem::new();
    fs.add_file(
        "./config/config.json",
        r#"{"serverPort": 8080, "rebuildWhileRunning": "drop", "skipTests": true}"#,
    );

    let config = ConfigLoader::new(&fs, "./config").load(&seed(None))?;

    assert_eq!(config.server_port()?, 8080);
    assert_eq!(config.rebuild_while_running()?, RebuildWhileRunning::Drop);
    assert!(config.skip_tests());
    Ok(())
}

#[test]
fn invalid_typed_settings_are_config_errors() -> TestResult {
    let fs = MockFileSystem::new();
    fs.add_file(
        "./config/config.json",
        r#"{"serverPort": 70000, "rebuildWhileRunning": "cancel"}"#,
    );

    let config = ConfigLoader::new(&fs, "./config").load(&seed(None))?;

    assert!(matches!(config.server_port(), Err(AssetflowError::ConfigError(_))));
    assert!(matches!(
        config.rebuild_while_running(),
        Err(AssetflowError::ConfigError(_))
    ));
    Ok(())
}

#[test]
fn string_flags_from_layers_are_set_when_non_empty() -> TestResult {
    let fs = MockFileSystem::new();
    fs.add_file(
        "./config/config.json",
        r#"{"skipTests": "always", "uglify": "false"}"#,
    );

    let config = ConfigLoader::new(&fs, "./config").load(&seed(None))?;

    assert!(config.skip_tests());
    assert!(config.uglify());
    assert!(config.should_minify());
    Ok(())
}

#[test]
fn empty_string_flags_stay_unset() -> TestResult {
    let fs = MockFileSystem::new();
    fs.add_file("./config/config.json", r#"{"skipTests": "", "uglify": ""}"#);

    let config = ConfigLoader::new(&fs, "./config").load(&seed(None))?;

    assert!(!config.skip_tests());
    assert!(!config.should_minify());
    Ok(())
}

#[test]
fn env_with_path_separators_is_rejected() {
    let fs = MockFileSystem::new();
    fs.add_file("./x.json", r#"{"leaked": true}"#);

    for env in ["../x", "a/b", r"..\x"] {
        let err = ConfigLoader::new(&fs, "./config")
            .load(&seed(Some(env)))
            .unwrap_err();
        assert!(
            matches!(err, AssetflowError::ConfigError(ref msg) if msg.contains("path separators")),
            "env {env}: {err:?}"
        );
    }
}
