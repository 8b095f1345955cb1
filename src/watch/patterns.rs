// src/watch/patterns.rs

use std::collections::{BTreeSet, HashMap};
use std::fmt;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use globset::{GlobBuilder, GlobMatcher};

use crate::actions::{BROWSERIFY, COPY_ASSETS, SASS};
use crate::engine::TaskName;
use crate::types::ReloadKind;

/// A glob over project-relative paths and the task to rebuild when a
/// matching file changes.
///
/// Patterns use `/` separators and `*` never crosses a directory boundary,
/// so `src/*` only covers direct children of `src/`.
#[derive(Clone)]
pub struct WatchBinding {
    pattern: String,
    task: TaskName,
    reload: ReloadKind,
    matcher: GlobMatcher,
}

impl fmt::Debug for WatchBinding {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("WatchBinding")
            .field("pattern", &self.pattern)
            .field("task", &self.task)
            .field("reload", &self.reload)
            .finish_non_exhaustive()
    }
}

impl WatchBinding {
    pub fn new(
        pattern: impl Into<String>,
        task: impl Into<TaskName>,
        reload: ReloadKind,
    ) -> Result<Self> {
        let pattern = pattern.into();
        let matcher = GlobBuilder::new(&pattern)
            .literal_separator(true)
            .build()
            .with_context(|| format!("invalid glob pattern: {pattern}"))?
            .compile_matcher();

        Ok(Self {
            pattern,
            task: task.into(),
            reload,
            matcher,
        })
    }

    pub fn pattern(&self) -> &str {
        &self.pattern
    }

    pub fn task(&self) -> &str {
        &self.task
    }

    /// What browsers should do after the bound task rebuilds successfully.
    pub fn reload(&self) -> ReloadKind {
        self.reload
    }

    /// `rel_path` is relative to the project root, e.g. `"assets/css/site.scss"`.
    pub fn matches(&self, rel_path: &str) -> bool {
        self.matcher.is_match(rel_path)
    }

    /// Leading path components without glob metacharacters.
    ///
    /// `assets/**/*.scss` -> `assets`, `src/*` -> `src`.
    pub fn static_prefix(&self) -> PathBuf {
        self.pattern
            .split('/')
            .take_while(|part| !part.contains(['*', '?', '[', '{']))
            .collect()
    }
}

/// Script sources rebuild the bundle, stylesheets recompile, and any other
/// asset change recopies assets.
pub fn default_bindings() -> Result<Vec<WatchBinding>> {
    Ok(vec![
        WatchBinding::new("src/*", BROWSERIFY, ReloadKind::Full)?,
        WatchBinding::new("assets/**/*.scss", SASS, ReloadKind::Css)?,
        WatchBinding::new("assets/**/*", COPY_ASSETS, ReloadKind::Full)?,
    ])
}

/// Tasks bound to `rel_path`, each at most once, in binding order.
pub fn tasks_for_path(bindings: &[WatchBinding], rel_path: &str) -> Vec<TaskName> {
    let mut seen = BTreeSet::new();
    bindings
        .iter()
        .filter(|b| b.matches(rel_path))
        .filter(|b| seen.insert(b.task.clone()))
        .map(|b| b.task.clone())
        .collect()
}

/// Reload behaviour per bound task.
pub fn reload_kinds(bindings: &[WatchBinding]) -> HashMap<TaskName, ReloadKind> {
    bindings
        .iter()
        .map(|b| (b.task.clone(), b.reload))
        .collect()
}

/// Directories to watch recursively so every binding is covered.
///
/// If we watch `/a` and `/a/b`, only `/a` is kept.
pub fn watch_roots(root: &Path, bindings: &[WatchBinding]) -> Vec<PathBuf> {
    let mut paths: Vec<PathBuf> = bindings
        .iter()
        .map(|b| root.join(b.static_prefix()))
        .collect();
    paths.sort();

    let mut filtered: Vec<PathBuf> = Vec::new();
    for path in paths {
        if let Some(last) = filtered.last()
            && path.starts_with(last)
        {
            continue;
        }
        filtered.push(path);
    }

    filtered
}
