// src/watch/event_handler.rs

//! Turning a changed path into task triggers.

use std::path::Path;

use tokio::sync::mpsc;
use tracing::{debug, info, warn};

use crate::engine::{RuntimeEvent, TriggerReason};
use crate::watch::patterns::{WatchBinding, tasks_for_path};

/// Convert a path into a string relative to `root`, with forward slashes.
///
/// Falls back to comparing canonical paths, since watchers may report a
/// different absolute prefix for the same directory (symlinks, `/private/var`).
pub fn relative_str(root: &Path, path: &Path) -> Option<String> {
    let to_slash = |rel: &Path| rel.to_string_lossy().replace('\\', "/");

    if let Ok(rel) = path.strip_prefix(root) {
        return Some(to_slash(rel));
    }

    let root_canon = root.canonicalize().ok()?;
    let path_canon = path.canonicalize().ok()?;
    path_canon.strip_prefix(&root_canon).ok().map(to_slash)
}

/// Send one trigger per task bound to `path`.
///
/// Returns how many triggers were sent.
pub async fn process_file_change(
    root: &Path,
    path: &Path,
    bindings: &[WatchBinding],
    runtime_tx: &mpsc::Sender<RuntimeEvent>,
) -> usize {
    let Some(rel) = relative_str(root, path) else {
        warn!(?path, ?root, "could not relativize changed path");
        return 0;
    };

    let tasks = tasks_for_path(bindings, &rel);
    if tasks.is_empty() {
        debug!(rel = %rel, "change matches no binding");
        return 0;
    }

    let mut sent = 0;
    for task in tasks {
        info!(task = %task, rel = %rel, "file change triggers rebuild");
        let event = RuntimeEvent::TaskTriggered {
            task,
            reason: TriggerReason::FileWatch,
        };
        if runtime_tx.send(event).await.is_err() {
            debug!("runtime channel closed; dropping trigger");
            break;
        }
        sent += 1;
    }
    sent
}
