// src/actions/config_tasks.rs

//! Tasks that expose the resolved configuration.

use anyhow::Context;
use tracing::info;

use crate::dag::TaskAction;

/// Print the resolved configuration as pretty JSON on stdout.
pub fn showconf() -> TaskAction {
    TaskAction::from_sync(|ctx| {
        println!("{}", ctx.config.to_pretty_json());
        Ok(())
    })
}

/// Write `dist/js/config.js` so the browser bundle can read the configuration.
pub fn make_conf_js() -> TaskAction {
    TaskAction::from_sync(|ctx| {
        let path = ctx.layout.config_script();
        let script = format!("window.config = {};", ctx.config.to_json());
        ctx.fs
            .write(&path, script.as_bytes())
            .with_context(|| format!("writing {}", path.display()))?;
        info!(path = ?path, "created config script");
        Ok(())
    })
}
