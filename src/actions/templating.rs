// src/actions/templating.rs

//! Rendering HTML templates with `minijinja`.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::{Context, Result};
use minijinja::{Environment, Error, ErrorKind, Value};
use tracing::{debug, info};

use crate::actions::{mirror_path, slash_path};
use crate::dag::{TaskAction, TaskContext};
use crate::fs::FileSystem;

/// Templates with this suffix belong to the script bundle and are skipped.
pub const EXCLUDED_SUFFIX: &str = ".vue.html";

/// Render every `assets/**/*.html` (except `*.vue.html`) against the
/// configuration and write it to the mirrored path under `dist/`.
///
/// Templates may include or extend each other by their path relative to
/// `assets/`. The first rendering failure fails the task.
pub fn templating() -> TaskAction {
    TaskAction::from_sync(render_all)
}

fn render_all(ctx: &TaskContext) -> Result<()> {
    let assets = ctx.layout.assets_dir();
    let dist = ctx.layout.dist_dir();

    let templates: Vec<PathBuf> = ctx
        .fs
        .walk_files(&assets)?
        .into_iter()
        .filter(|p| is_page_template(p))
        .collect();

    let env = environment(Arc::clone(&ctx.fs), assets.clone());
    let context = Value::from_serialize(ctx.config.as_map());

    for source in &templates {
        let name = slash_path(&assets, source)?;
        let rendered = env
            .get_template(&name)
            .and_then(|tpl| tpl.render(&context))
            .with_context(|| format!("rendering template {name}"))?;

        let target = mirror_path(&assets, &dist, source)?;
        ctx.fs
            .write(&target, rendered.as_bytes())
            .with_context(|| format!("writing {}", target.display()))?;
        debug!(template = %name, target = ?target, "rendered template");
    }

    info!(count = templates.len(), "rendered templates");
    Ok(())
}

fn is_page_template(path: &Path) -> bool {
    path.file_name()
        .and_then(|n| n.to_str())
        .is_some_and(|n| n.ends_with(".html") && !n.ends_with(EXCLUDED_SUFFIX))
}

/// Template environment loading sources from `assets` through `fs`.
fn environment(fs: Arc<dyn FileSystem>, assets: PathBuf) -> Environment<'static> {
    let mut env = Environment::new();
    env.set_loader(move |name: &str| {
        if name.split('/').any(|part| part == "..") {
            return Ok(None);
        }
        let path = assets.join(name);
        if !fs.is_file(&path) {
            return Ok(None);
        }
        fs.read_to_string(&path).map(Some).map_err(|err| {
            Error::new(
                ErrorKind::InvalidOperation,
                format!("could not read template {name}"),
            )
            .with_source(std::io::Error::other(format!("{err:#}")))
        })
    });
    env
}
