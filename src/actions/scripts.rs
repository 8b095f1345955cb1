// src/actions/scripts.rs

//! Script bundling, minification and formatting through external tools.

use anyhow::Result;
use tracing::{info, warn};

use crate::actions::slash_path;
use crate::dag::{TaskAction, TaskContext};
use crate::exec::ToolInvocation;

const ESBUILD: &str = "esbuild";
const JS_BEAUTIFY: &str = "js-beautify";

/// Bundle `src/app.js` into `dist/js/app.js`.
///
/// `process.env.NODE_ENV` is defined as the configured env; inline source
/// maps are emitted outside production.
pub fn browserify() -> TaskAction {
    TaskAction::from_future(|ctx: TaskContext| async move {
        let invocation = bundle_invocation(&ctx)?;
        ctx.tools.run(invocation).await?;
        info!(bundle = ?ctx.layout.script_bundle(), "bundled scripts");
        Ok(())
    })
}

pub(crate) fn bundle_invocation(ctx: &TaskContext) -> Result<ToolInvocation> {
    let root = ctx.layout.root();
    let entry = slash_path(root, &ctx.layout.script_entry())?;
    let bundle = slash_path(root, &ctx.layout.script_bundle())?;
    let env = serde_json::Value::String(ctx.config.env().to_string());

    let mut invocation = ToolInvocation::new(ESBUILD)
        .arg(entry)
        .arg("--bundle")
        .arg(format!("--outfile={bundle}"))
        .arg(format!("--define:process.env.NODE_ENV={env}"))
        .current_dir(root);
    if !ctx.config.is_production() {
        invocation = invocation.arg("--sourcemap=inline");
    }
    Ok(invocation)
}

/// Minify the bundle in place, unless minification is off for this env.
pub fn uglify() -> TaskAction {
    TaskAction::from_future(|ctx: TaskContext| async move {
        if !ctx.config.should_minify() {
            warn!("uglify is disabled for env == 'dev' unless --uglify=true flag is set");
            return Ok(());
        }

        let root = ctx.layout.root();
        let bundle = slash_path(root, &ctx.layout.script_bundle())?;
        let invocation = ToolInvocation::new(ESBUILD)
            .arg(bundle.clone())
            .arg("--minify")
            .arg("--allow-overwrite")
            .arg(format!("--outfile={bundle}"))
            .current_dir(root);

        ctx.tools.run(invocation).await?;
        info!(bundle = %bundle, "minified bundle");
        Ok(())
    })
}

/// Reformat the top-level `*.css`, `*.html` and `*.js` files of the project.
pub fn prettify() -> TaskAction {
    TaskAction::from_future(|ctx: TaskContext| async move {
        let root = ctx.layout.root();
        let mut files = Vec::new();
        for path in ctx.fs.read_dir(root)? {
            let formattable = path
                .extension()
                .and_then(|e| e.to_str())
                .is_some_and(|e| matches!(e, "css" | "html" | "js"));
            if formattable && ctx.fs.is_file(&path) {
                files.push(slash_path(root, &path)?);
            }
        }
        files.sort();

        if files.is_empty() {
            info!("no top-level files to prettify");
            return Ok(());
        }

        let invocation = ToolInvocation::new(JS_BEAUTIFY)
            .args(["--replace", "--indent-size", "4"])
            .args(files.iter().cloned())
            .current_dir(root);
        ctx.tools.run(invocation).await?;
        info!(count = files.len(), "prettified files");
        Ok(())
    })
}
