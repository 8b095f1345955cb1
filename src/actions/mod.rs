// src/actions/mod.rs

//! Built-in build tasks.
//!
//! Each submodule provides the actions for one concern; [`declare_builtin_tasks`]
//! wires them into a graph with their prerequisites.

pub mod assets;
pub mod clean;
pub mod config_tasks;
pub mod harness;
pub mod scripts;
pub mod styles;
pub mod templating;

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};

use crate::dag::{TaskAction, TaskGraphBuilder};

pub const SHOWCONF: &str = "showconf";
pub const PRETTIFY: &str = "prettify";
pub const SASS: &str = "sass";
pub const MAKE_CONF_JS: &str = "make_conf_js";
pub const BROWSERIFY: &str = "browserify";
pub const COPY_EXT_ASSETS: &str = "copy_ext_assets";
pub const TEMPLATING: &str = "templating";
pub const COPY_ASSETS: &str = "copy_assets";
pub const UGLIFY: &str = "uglify";
pub const CLEAN: &str = "clean";
pub const DIST: &str = "dist";
pub const SERVE: &str = "serve";
pub const E2E: &str = "e2e";
pub const UNITTEST: &str = "unittest";

/// Declare every built-in task on `builder`.
pub fn declare_builtin_tasks(builder: &mut TaskGraphBuilder) -> &mut TaskGraphBuilder {
    builder
        .declare(SHOWCONF, &[], config_tasks::showconf())
        .declare(PRETTIFY, &[], scripts::prettify())
        .declare(SASS, &[], styles::sass())
        .declare(MAKE_CONF_JS, &[], config_tasks::make_conf_js())
        .declare(BROWSERIFY, &[MAKE_CONF_JS], scripts::browserify())
        .declare(COPY_EXT_ASSETS, &[], assets::copy_ext_assets())
        .declare(TEMPLATING, &[], templating::templating())
        .declare(COPY_ASSETS, &[COPY_EXT_ASSETS, TEMPLATING], assets::copy_assets())
        .declare(UGLIFY, &[SASS, BROWSERIFY, COPY_ASSETS], scripts::uglify())
        .declare(CLEAN, &[], clean::clean())
        .declare(DIST, &[SASS, BROWSERIFY, COPY_ASSETS, UGLIFY], TaskAction::noop())
        .declare(SERVE, &[DIST], TaskAction::noop())
        .declare(E2E, &[], harness::e2e())
        .declare(UNITTEST, &[], harness::unittest())
}

/// Path of `path` relative to `from`, re-rooted under `to`.
pub(crate) fn mirror_path(from: &Path, to: &Path, path: &Path) -> Result<PathBuf> {
    let rel = path
        .strip_prefix(from)
        .with_context(|| format!("{} is not below {}", path.display(), from.display()))?;
    Ok(to.join(rel))
}

/// Forward-slash form of a path relative to `base`, for tool arguments and
/// template names.
pub(crate) fn slash_path(base: &Path, path: &Path) -> Result<String> {
    let rel = path
        .strip_prefix(base)
        .with_context(|| format!("{} is not below {}", path.display(), base.display()))?;
    Ok(rel
        .components()
        .map(|c| c.as_os_str().to_string_lossy())
        .collect::<Vec<_>>()
        .join("/"))
}
