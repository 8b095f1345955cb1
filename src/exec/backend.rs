// src/exec/backend.rs

//! Pluggable executor backend abstraction.
//!
//! The pipeline talks to an `ExecutorBackend` instead of spawning actions
//! itself. This makes it easy to swap in a fake executor in tests.
//!
//! - `ActionExecutor` is the implementation used by `assetflow`. It looks up
//!   each scheduled task's action in the graph and runs it concurrently.
//! - Tests can provide their own `ExecutorBackend` that, for example, records
//!   which tasks were scheduled and directly emits completions.

use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;

use tokio::sync::mpsc;

use crate::dag::{ScheduledTask, TaskContext, TaskGraph};
use crate::engine::RunEvent;
use crate::errors::{AssetflowError, Result};

use super::task_runner::run_task;

/// Trait abstracting how scheduled tasks are executed.
///
/// Implementations must eventually send exactly one
/// [`RunEvent::TaskCompleted`] per dispatched task on `events`.
pub trait ExecutorBackend: Send + Sync {
    fn spawn_ready_tasks(
        &self,
        tasks: Vec<ScheduledTask>,
        events: mpsc::Sender<RunEvent>,
    ) -> Pin<Box<dyn Future<Output = Result<()>> + Send + '_>>;
}

/// Production backend: every ready task's action runs in its own Tokio task.
#[derive(Debug, Clone)]
pub struct ActionExecutor {
    graph: Arc<TaskGraph>,
    ctx: TaskContext,
}

impl ActionExecutor {
    pub fn new(graph: Arc<TaskGraph>, ctx: TaskContext) -> Self {
        Self { graph, ctx }
    }
}

impl ExecutorBackend for ActionExecutor {
    fn spawn_ready_tasks(
        &self,
        tasks: Vec<ScheduledTask>,
        events: mpsc::Sender<RunEvent>,
    ) -> Pin<Box<dyn Future<Output = Result<()>> + Send + '_>> {
        Box::pin(async move {
            for task in tasks {
                let action = self
                    .graph
                    .action_of(&task.name)
                    .cloned()
                    .ok_or_else(|| AssetflowError::TaskNotFound(task.name.clone()))?;

                let ctx = self.ctx.clone();
                let events = events.clone();
                tokio::spawn(async move {
                    run_task(task, action, ctx, events).await;
                });
            }
            Ok(())
        })
    }
}
