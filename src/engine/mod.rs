// src/engine/mod.rs

//! Orchestration engine for assetflow.
//!
//! This module ties together:
//! - the per-run [`Pipeline`] that drives a [`crate::dag::Scheduler`] to completion
//! - the trigger queue (what happens when a rebuild is requested while the
//!   same task is still building)
//! - the long-running event loop used by the dev server, reacting to:
//!   - file-watch triggers
//!   - finished runs
//!   - shutdown signals
//!
//! The pure core state machine lives in [`core`]; the async/IO shell is
//! implemented in [`runtime`].

/// Canonical task name type used throughout the engine.
pub type TaskName = String;

/// Outcome of a task's action for the scheduler.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TaskOutcome {
    Success,
    /// The action failed; carries the rendered error.
    Failed(String),
}

/// Why a run was triggered.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TriggerReason {
    /// Triggered due to a filesystem event.
    FileWatch,
}

/// Events flowing from executing actions back into a pipeline run.
#[derive(Debug, Clone)]
pub enum RunEvent {
    TaskCompleted {
        task: TaskName,
        run_id: u64,
        outcome: TaskOutcome,
    },
}

/// Runtime options used by both the core and the async shell.
#[derive(Debug, Clone, Copy, Default)]
pub struct RuntimeOptions {
    /// Exit the runtime once nothing is building and nothing is queued.
    pub exit_when_idle: bool,
}

/// Events flowing into the runtime from watchers, finished runs, etc.
#[derive(Debug, Clone)]
pub enum RuntimeEvent {
    /// A task should be rebuilt.
    TaskTriggered {
        task: TaskName,
        reason: TriggerReason,
    },
    /// A pipeline run for `task` finished.
    RunFinished { task: TaskName, success: bool },
    /// Graceful shutdown requested (e.g. Ctrl-C).
    ShutdownRequested,
}

pub mod core;
pub mod event_handlers;
pub mod pipeline;
pub mod queue;
pub mod runtime;

pub use core::CoreRuntime;
pub use event_handlers::{CoreCommand, CoreStep};
pub use pipeline::{Pipeline, RunReport};
pub use queue::TriggerQueue;
pub use runtime::Runtime;
