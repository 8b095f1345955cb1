// src/actions/assets.rs

//! Copying project and vendor assets into the output tree.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::{Context, Result, anyhow};
use serde_json::Value;
use tokio::task::JoinSet;
use tracing::{debug, info, warn};

use crate::actions::mirror_path;
use crate::dag::{TaskAction, TaskContext};
use crate::fs::FileSystem;

/// Vendor subdirectories copied out of `node_modules/<pkg>/dist/`.
pub const VENDOR_SUBDIRS: [&str; 2] = ["css", "fonts"];

/// Copy every non-template asset file verbatim into `dist/`.
pub fn copy_assets() -> TaskAction {
    TaskAction::from_sync(|ctx| {
        let assets = ctx.layout.assets_dir();
        let dist = ctx.layout.dist_dir();

        let mut copied = 0usize;
        for source in ctx.fs.walk_files(&assets)? {
            if source.extension().is_some_and(|ext| ext == "html") {
                continue;
            }
            let target = mirror_path(&assets, &dist, &source)?;
            ctx.fs.copy(&source, &target)?;
            copied += 1;
        }

        info!(count = copied, "copied assets");
        Ok(())
    })
}

/// Copy `css` and `fonts` out of every dependency's `dist/` folder.
///
/// Every (dependency, subdirectory) pair is copied as its own job; the task
/// succeeds only if all of them do.
pub fn copy_ext_assets() -> TaskAction {
    TaskAction::from_future(|ctx: TaskContext| async move {
        let packages = declared_dependencies(&ctx)?;
        let node_modules = ctx.layout.node_modules_dir();
        let dist = ctx.layout.dist_dir();

        let mut jobs = JoinSet::new();
        for pkg in &packages {
            for subdir in VENDOR_SUBDIRS {
                let fs = Arc::clone(&ctx.fs);
                let from = node_modules.join(pkg).join("dist").join(subdir);
                let to = dist.join(subdir);
                jobs.spawn_blocking(move || copy_flat(fs.as_ref(), &from, &to));
            }
        }

        let mut copied = 0usize;
        while let Some(joined) = jobs.join_next().await {
            copied += joined.map_err(|err| anyhow!("vendor copy job failed: {err}"))??;
        }

        info!(packages = packages.len(), files = copied, "copied vendor assets");
        Ok(())
    })
}

/// Dependency names from `package.json`. A missing manifest means none.
fn declared_dependencies(ctx: &TaskContext) -> Result<Vec<String>> {
    let manifest = ctx.layout.package_json();
    if !ctx.fs.is_file(&manifest) {
        warn!(path = ?manifest, "no package.json; no vendor assets to copy");
        return Ok(Vec::new());
    }

    let text = ctx.fs.read_to_string(&manifest)?;
    let json: Value = serde_json::from_str(&text)
        .with_context(|| format!("parsing {}", manifest.display()))?;

    Ok(json
        .get("dependencies")
        .and_then(Value::as_object)
        .map(|deps| deps.keys().cloned().collect())
        .unwrap_or_default())
}

/// Copy the files directly inside `from` into `to`. Absent `from` copies nothing.
fn copy_flat(fs: &dyn FileSystem, from: &Path, to: &Path) -> Result<usize> {
    if !fs.is_dir(from) {
        debug!(dir = ?from, "vendor directory absent; skipping");
        return Ok(0);
    }

    let files: Vec<PathBuf> = fs
        .read_dir(from)?
        .into_iter()
        .filter(|p| fs.is_file(p))
        .collect();

    for file in &files {
        let target = mirror_path(from, to, file)?;
        fs.copy(file, &target)?;
    }
    Ok(files.len())
}
