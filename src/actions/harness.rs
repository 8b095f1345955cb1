// src/actions/harness.rs

//! Browser and node test runners.

use std::path::Path;

use tracing::{info, warn};

use crate::actions::slash_path;
use crate::dag::{TaskAction, TaskContext};
use crate::exec::ToolInvocation;

/// Run karma once with `config/karma.conf.js`, unless `skipTests` is set.
///
/// karma reports through a completion callback, so this action is written
/// in callback style.
pub fn e2e() -> TaskAction {
    TaskAction::from_callback(|ctx: TaskContext, done| {
        if ctx.config.skip_tests() {
            warn!("unit tests are skipped");
            done.ok();
            return;
        }

        let root = ctx.layout.root().to_path_buf();
        let invocation = ToolInvocation::new("karma")
            .args(["start", "config/karma.conf.js", "--single-run"])
            .current_dir(root);

        tokio::spawn(async move {
            done.finish(ctx.tools.run(invocation).await);
        });
    })
}

/// Run nodeunit over `test/**/*.unittest.js`.
pub fn unittest() -> TaskAction {
    TaskAction::from_future(|ctx: TaskContext| async move {
        let root = ctx.layout.root();
        let mut tests = Vec::new();
        for path in ctx.fs.walk_files(&ctx.layout.test_dir())? {
            if is_unit_test(&path) {
                tests.push(slash_path(root, &path)?);
            }
        }

        if tests.is_empty() {
            info!("no unit tests found under test/");
            return Ok(());
        }

        let invocation = ToolInvocation::new("nodeunit")
            .args(tests.iter().cloned())
            .current_dir(root);
        ctx.tools.run(invocation).await?;
        info!(count = tests.len(), "unit tests passed");
        Ok(())
    })
}

fn is_unit_test(path: &Path) -> bool {
    path.file_name()
        .and_then(|n| n.to_str())
        .is_some_and(|n| n.ends_with(".unittest.js"))
}
