// src/config/loader.rs

use std::path::{Path, PathBuf};

use serde_json::{Map, Value};
use tracing::{debug, info};

use crate::config::model::{BuildInfo, Configuration};
use crate::errors::{AssetflowError, Result};
use crate::fs::FileSystem;

/// Environment variable consulted when no `--env` flag is given.
pub const ENV_VAR: &str = "NODE_ENV";

/// Environment used when neither the flag nor [`ENV_VAR`] is set.
pub const DEFAULT_ENV: &str = "dev";

/// Inputs that seed the configuration before any override layer is applied.
#[derive(Debug, Clone)]
pub struct ConfigSeed {
    /// `--env` from the command line.
    pub env_flag: Option<String>,
    /// `--uglify` from the command line.
    pub uglify_flag: Option<bool>,
    /// Value of [`ENV_VAR`] at startup.
    pub env_var: Option<String>,
    pub build: BuildInfo,
}

impl ConfigSeed {
    /// Seed from CLI flags plus the current process environment.
    pub fn from_process(env_flag: Option<String>, uglify_flag: Option<bool>) -> Self {
        Self {
            env_flag,
            uglify_flag,
            env_var: std::env::var(ENV_VAR).ok(),
            build: BuildInfo::current(),
        }
    }

    /// Flag, else environment variable, else [`DEFAULT_ENV`]. Blank values count as unset.
    pub fn resolved_env(&self) -> String {
        self.env_flag
            .iter()
            .chain(self.env_var.iter())
            .map(|s| s.trim())
            .find(|s| !s.is_empty())
            .unwrap_or(DEFAULT_ENV)
            .to_string()
    }

    fn defaults(&self) -> Map<String, Value> {
        let mut map = Map::new();
        map.insert("env".into(), Value::String(self.resolved_env()));
        map.insert("uglify".into(), Value::Bool(self.uglify_flag.unwrap_or(false)));
        map.insert("buildDate".into(), Value::String(self.build.date.clone()));
        map.insert("buildUser".into(), Value::String(self.build.user.clone()));
        map.insert(
            "buildHostname".into(),
            Value::String(self.build.hostname.clone()),
        );
        map
    }
}

/// The override layers for `env`, in merge order (later wins).
pub fn candidate_files(config_dir: &Path, env: &str) -> Vec<PathBuf> {
    vec![
        config_dir.join("config.json"),
        config_dir.join("config.hjson"),
        config_dir.join(format!("config-{env}.json")),
        config_dir.join(format!("config-{env}.hjson")),
    ]
}

/// Parse one override layer, choosing the parser by file extension.
///
/// `.hjson` layers accept comments, trailing commas and unquoted keys; every
/// other extension is parsed as strict JSON. A layer must hold a single
/// top-level object.
pub fn parse_layer(path: &Path, contents: &str) -> Result<Map<String, Value>> {
    let is_hjson = path
        .extension()
        .and_then(|e| e.to_str())
        .is_some_and(|e| e.eq_ignore_ascii_case("hjson"));

    let parsed: Value = if is_hjson {
        deser_hjson::from_str(contents).map_err(|e| parse_error(path, e))?
    } else {
        serde_json::from_str(contents).map_err(|e| parse_error(path, e))?
    };

    match parsed {
        Value::Object(map) => Ok(map),
        other => Err(AssetflowError::ConfigParse {
            path: path.to_path_buf(),
            message: format!("expected a top-level object, found {}", json_kind(&other)),
        }),
    }
}

fn parse_error(path: &Path, err: impl std::fmt::Display) -> AssetflowError {
    AssetflowError::ConfigParse {
        path: path.to_path_buf(),
        message: err.to_string(),
    }
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}

/// Builds the [`Configuration`] from a seed and the optional override layers.
#[derive(Debug)]
pub struct ConfigLoader<'a> {
    fs: &'a dyn FileSystem,
    config_dir: PathBuf,
}

impl<'a> ConfigLoader<'a> {
    pub fn new(fs: &'a dyn FileSystem, config_dir: impl Into<PathBuf>) -> Self {
        Self {
            fs,
            config_dir: config_dir.into(),
        }
    }

    /// Seed defaults, then shallow-merge every present layer in order.
    ///
    /// Missing layers are skipped; a present layer that fails to parse aborts
    /// loading with [`AssetflowError::ConfigParse`]. An env naming a path
    /// outside `config/` is a [`AssetflowError::ConfigError`].
    pub fn load(&self, seed: &ConfigSeed) -> Result<Configuration> {
        let env = seed.resolved_env();
        if env.contains(['/', '\\']) {
            return Err(AssetflowError::ConfigError(format!(
                "env must not contain path separators (got {env:?})"
            )));
        }
        let mut values = seed.defaults();

        for path in candidate_files(&self.config_dir, &env) {
            if !self.fs.is_file(&path) {
                debug!(path = ?path, "config layer not present; skipping");
                continue;
            }

            let contents = self
                .fs
                .read_to_string(&path)
                .map_err(|e| parse_error(&path, format!("{e:#}")))?;
            let layer = parse_layer(&path, &contents)?;

            debug!(path = ?path, keys = layer.len(), "merging config layer");
            // Shallow: a layer's value replaces the whole key, objects included.
            values.extend(layer);
        }

        let config = Configuration::from_map(values);
        info!(env = %config.env(), uglify = config.uglify(), "configuration loaded");
        Ok(config)
    }
}
