// src/config/model.rs

use serde::Serialize;
use serde_json::{Map, Value};

use crate::errors::{AssetflowError, Result};
use crate::types::RebuildWhileRunning;

/// Default port of the dev server when `serverPort` is not configured.
pub const DEFAULT_SERVER_PORT: u16 = 3000;

/// Build-time identity stamped into the configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BuildInfo {
    /// RFC 3339 UTC timestamp.
    pub date: String,
    pub user: String,
    pub hostname: String,
}

impl BuildInfo {
    /// Compute fresh build info for this process.
    pub fn current() -> Self {
        let date = chrono::Utc::now().to_rfc3339_opts(chrono::SecondsFormat::Millis, true);
        let user = std::env::var("USER")
            .or_else(|_| std::env::var("USERNAME"))
            .unwrap_or_else(|_| "unknown".to_string());
        let hostname = std::env::var("HOSTNAME")
            .ok()
            .or_else(|| {
                std::fs::read_to_string("/etc/hostname")
                    .ok()
                    .map(|s| s.trim().to_string())
            })
            .filter(|s| !s.is_empty())
            .unwrap_or_else(|| "localhost".to_string());

        Self {
            date,
            user,
            hostname,
        }
    }
}

/// The resolved, immutable build configuration.
///
/// A flat JSON object: the seeded keys (`env`, `uglify`, `buildDate`,
/// `buildUser`, `buildHostname`) plus whatever the override layers added.
/// It is created once by [`ConfigLoader`](super::ConfigLoader) and then only
/// shared (behind an `Arc`) with task actions, templates and the emitted
/// `dist/js/config.js`.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(transparent)]
pub struct Configuration {
    values: Map<String, Value>,
}

impl Configuration {
    pub fn from_map(values: Map<String, Value>) -> Self {
        Self { values }
    }

    pub fn get(&self, key: &str) -> Option<&Value> {
        self.values.get(key)
    }

    pub fn as_map(&self) -> &Map<String, Value> {
        &self.values
    }

    /// The build environment; `dev` if a layer removed or retyped it.
    pub fn env(&self) -> &str {
        self.values
            .get("env")
            .and_then(Value::as_str)
            .unwrap_or("dev")
    }

    pub fn uglify(&self) -> bool {
        self.values.get("uglify").is_some_and(truthy)
    }

    /// Minification runs when forced, or in any environment other than `dev`.
    pub fn should_minify(&self) -> bool {
        self.uglify() || self.env() != "dev"
    }

    pub fn is_production(&self) -> bool {
        self.env() == "production"
    }

    pub fn skip_tests(&self) -> bool {
        self.values.get("skipTests").is_some_and(truthy)
    }

    pub fn server_port(&self) -> Result<u16> {
        match self.values.get("serverPort") {
            None | Some(Value::Null) => Ok(DEFAULT_SERVER_PORT),
            Some(v) => v
                .as_u64()
                .and_then(|n| u16::try_from(n).ok())
                .ok_or_else(|| {
                    AssetflowError::ConfigError(format!("serverPort must be a port number (got {v})"))
                }),
        }
    }

    pub fn rebuild_while_running(&self) -> Result<RebuildWhileRunning> {
        match self.values.get("rebuildWhileRunning") {
            None | Some(Value::Null) => Ok(RebuildWhileRunning::default()),
            Some(Value::String(s)) => s.parse().map_err(AssetflowError::ConfigError),
            Some(other) => Err(AssetflowError::ConfigError(format!(
                "rebuildWhileRunning must be a string (got {other})"
            ))),
        }
    }

    /// Compact JSON rendering, as embedded in `dist/js/config.js`.
    pub fn to_json(&self) -> String {
        Value::Object(self.values.clone()).to_string()
    }

    pub fn to_pretty_json(&self) -> String {
        serde_json::to_string_pretty(&self.values).unwrap_or_else(|_| self.to_json())
    }
}

/// Truthiness of a flag set by a config layer.
///
/// Any non-empty string counts as set, so `"false"` is truthy.
fn truthy(value: &Value) -> bool {
    match value {
        Value::Bool(b) => *b,
        Value::Number(n) => n.as_f64().is_some_and(|f| f != 0.0),
        Value::String(s) => !s.is_empty(),
        Value::Null => false,
        Value::Array(_) | Value::Object(_) => true,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn config(value: Value) -> Configuration {
        match value {
            Value::Object(map) => Configuration::from_map(map),
            _ => panic!("test config must be an object"),
        }
    }

    #[test]
    fn minify_policy_follows_env_and_flag() {
        assert!(!config(json!({"env": "dev", "uglify": false})).should_minify());
        assert!(config(json!({"env": "dev", "uglify": true})).should_minify());
        assert!(config(json!({"env": "production", "uglify": false})).should_minify());
        assert!(config(json!({"env": "staging"})).should_minify());
    }

    #[test]
    fn flags_accept_loose_values() {
        assert!(config(json!({"skipTests": "true"})).skip_tests());
        assert!(config(json!({"skipTests": 1})).skip_tests());
        assert!(config(json!({"skipTests": "no"})).skip_tests());
        assert!(!config(json!({"skipTests": ""})).skip_tests());
        assert!(!config(json!({"skipTests": 0})).skip_tests());
        assert!(!config(json!({})).skip_tests());
    }

    #[test]
    fn server_port_defaults_and_validates() {
        assert_eq!(config(json!({})).server_port().unwrap(), DEFAULT_SERVER_PORT);
        assert_eq!(config(json!({"serverPort": 8080})).server_port().unwrap(), 8080);
        assert!(config(json!({"serverPort": "nope"})).server_port().is_err());
        assert!(config(json!({"serverPort": 70000})).server_port().is_err());
    }

    #[test]
    fn rebuild_behaviour_is_parsed() {
        assert_eq!(
            config(json!({})).rebuild_while_running().unwrap(),
            RebuildWhileRunning::Queue
        );
        assert_eq!(
            config(json!({"rebuildWhileRunning": "Drop"}))
                .rebuild_while_running()
                .unwrap(),
            RebuildWhileRunning::Drop
        );
        assert!(config(json!({"rebuildWhileRunning": "cancel"}))
            .rebuild_while_running()
            .is_err());
    }
}
