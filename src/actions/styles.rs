// src/actions/styles.rs

//! Stylesheet compilation with `grass`.

use std::io;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::{Context, Result, anyhow};
use tracing::{debug, info};

use crate::actions::mirror_path;
use crate::dag::{TaskAction, TaskContext};
use crate::fs::FileSystem;

/// Compile every non-partial `assets/**/*.scss` to compressed CSS at the
/// mirrored path under `dist/`.
///
/// Files whose name starts with `_` are partials; they are only compiled as
/// part of the stylesheets importing them.
pub fn sass() -> TaskAction {
    TaskAction::from_sync(compile_stylesheets)
}

fn compile_stylesheets(ctx: &TaskContext) -> Result<()> {
    let assets = ctx.layout.assets_dir();
    let dist = ctx.layout.dist_dir();

    let sources: Vec<PathBuf> = ctx
        .fs
        .walk_files(&assets)?
        .into_iter()
        .filter(|p| is_stylesheet(p))
        .collect();

    let fs = GrassFs(Arc::clone(&ctx.fs));
    for source in &sources {
        let css = compile_one(&fs, &assets, source)?;
        let target = mirror_path(&assets, &dist, source)?.with_extension("css");
        ctx.fs
            .write(&target, css.as_bytes())
            .with_context(|| format!("writing {}", target.display()))?;
        debug!(source = ?source, target = ?target, "compiled stylesheet");
    }

    info!(count = sources.len(), "compiled stylesheets");
    Ok(())
}

fn is_stylesheet(path: &Path) -> bool {
    let is_scss = path.extension().is_some_and(|ext| ext == "scss");
    let is_partial = path
        .file_name()
        .and_then(|n| n.to_str())
        .is_some_and(|n| n.starts_with('_'));
    is_scss && !is_partial
}

fn compile_one(fs: &GrassFs, assets: &Path, source: &Path) -> Result<String> {
    let mut options = grass::Options::default()
        .fs(fs)
        .style(grass::OutputStyle::Compressed)
        .load_path(assets);
    if let Some(parent) = source.parent() {
        options = options.load_path(parent);
    }

    grass::from_path(source, &options)
        .map_err(|err| anyhow!("{}: {err}", source.display()))
}

/// Lets `grass` resolve sources and imports through a [`FileSystem`].
#[derive(Debug)]
struct GrassFs(Arc<dyn FileSystem>);

impl grass::Fs for GrassFs {
    fn is_dir(&self, path: &Path) -> bool {
        self.0.is_dir(path)
    }

    fn is_file(&self, path: &Path) -> bool {
        self.0.is_file(path)
    }

    fn read(&self, path: &Path) -> io::Result<Vec<u8>> {
        self.0
            .read(path)
            .map_err(|err| io::Error::new(io::ErrorKind::NotFound, format!("{err:#}")))
    }
}
