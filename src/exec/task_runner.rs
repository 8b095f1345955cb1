// src/exec/task_runner.rs

//! Individual task action runner.

use std::any::Any;
use std::time::Instant;

use tokio::sync::mpsc;
use tracing::{debug, error, info};

use crate::dag::{ScheduledTask, TaskAction, TaskContext};
use crate::engine::{RunEvent, TaskOutcome};

/// Run one task's action and report a `TaskCompleted` event.
///
/// The action runs in its own Tokio task so that a panic inside it is turned
/// into a failed outcome instead of tearing down the run.
pub async fn run_task(
    task: ScheduledTask,
    action: TaskAction,
    ctx: TaskContext,
    events: mpsc::Sender<RunEvent>,
) {
    debug!(task = %task.name, run_id = task.run_id, "invoking action");
    let started = Instant::now();

    let joined = tokio::spawn(action.invoke(ctx)).await;

    let outcome = match joined {
        Ok(Ok(())) => {
            info!(
                task = %task.name,
                run_id = task.run_id,
                elapsed_ms = started.elapsed().as_millis() as u64,
                "finished task"
            );
            TaskOutcome::Success
        }
        Ok(Err(err)) => {
            let message = format!("{err:#}");
            error!(task = %task.name, run_id = task.run_id, error = %message, "task failed");
            TaskOutcome::Failed(message)
        }
        Err(join_err) => {
            let message = if join_err.is_panic() {
                format!("action panicked: {}", panic_message(join_err.into_panic()))
            } else {
                "action was cancelled".to_string()
            };
            error!(task = %task.name, run_id = task.run_id, error = %message, "task failed");
            TaskOutcome::Failed(message)
        }
    };

    if events
        .send(RunEvent::TaskCompleted {
            task: task.name.clone(),
            run_id: task.run_id,
            outcome,
        })
        .await
        .is_err()
    {
        debug!(task = %task.name, run_id = task.run_id, "run gone before task completed");
    }
}

fn panic_message(payload: Box<dyn Any + Send>) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        (*s).to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "unknown panic payload".to_string()
    }
}
