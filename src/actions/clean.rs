// src/actions/clean.rs

use tracing::info;

use crate::dag::TaskAction;

/// Remove the output tree. Cleaning an absent tree succeeds.
pub fn clean() -> TaskAction {
    TaskAction::from_sync(|ctx| {
        let dist = ctx.layout.dist_dir();
        ctx.fs.remove_dir_all(&dist)?;
        info!(path = ?dist, "removed output tree");
        Ok(())
    })
}
