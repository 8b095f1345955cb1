// src/watch/mod.rs

//! File watching for the dev server.
//!
//! This module is responsible for:
//! - Compiling the watch bindings (glob pattern -> task to rebuild).
//! - Wiring up a cross-platform filesystem watcher (`notify`).
//! - Turning changed paths into `RuntimeEvent::TaskTriggered` events.
//!
//! It does **not** know about the DAG; the runtime decides what a trigger means.

pub mod event_handler;
pub mod patterns;
pub mod watcher;

pub use event_handler::{process_file_change, relative_str};
pub use patterns::{WatchBinding, default_bindings, reload_kinds, tasks_for_path, watch_roots};
pub use watcher::{WatcherHandle, spawn_watcher};
