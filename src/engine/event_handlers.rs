// src/engine/event_handlers.rs

//! Event handling logic for the core runtime.

use std::collections::HashSet;

use tracing::{debug, info};

use crate::engine::queue::TriggerQueue;
use crate::engine::{RuntimeOptions, TaskName, TriggerReason};

/// Command produced by the pure core, to be executed by the outer IO shell.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CoreCommand {
    /// Start a pipeline run for this task.
    StartRun(TaskName),
    /// A run for this task succeeded; tell connected browsers.
    NotifyReload(TaskName),
    /// Request that the process exits (used when `exit_when_idle` is set).
    RequestExit,
}

/// Decision returned by the core after handling a single `RuntimeEvent`.
#[derive(Debug, Clone)]
pub struct CoreStep {
    /// Commands the IO shell should execute, in order.
    pub commands: Vec<CoreCommand>,
    /// Whether the outer runtime loop should keep running.
    pub keep_running: bool,
}

impl CoreStep {
    fn continue_with(commands: Vec<CoreCommand>) -> Self {
        Self {
            commands,
            keep_running: true,
        }
    }
}

/// Handle a trigger.
///
/// - If no run of `task` is in flight, start one right away. Runs of
///   different tasks may overlap.
/// - Otherwise hand the trigger to the queue, which either coalesces it into a
///   single follow-up run or drops it.
pub fn handle_task_trigger(
    in_flight: &mut HashSet<TaskName>,
    queue: &mut TriggerQueue,
    task: TaskName,
    reason: TriggerReason,
) -> CoreStep {
    if in_flight.contains(&task) {
        queue.record_trigger(&task);
        return CoreStep::continue_with(Vec::new());
    }

    debug!(task = %task, ?reason, "starting run");
    in_flight.insert(task.clone());
    CoreStep::continue_with(vec![CoreCommand::StartRun(task)])
}

/// Handle a finished run.
pub fn handle_run_finished(
    in_flight: &mut HashSet<TaskName>,
    queue: &mut TriggerQueue,
    options: &RuntimeOptions,
    task: TaskName,
    success: bool,
) -> CoreStep {
    let mut commands = Vec::new();

    if !in_flight.remove(&task) {
        debug!(task = %task, "run finished for task that was not in flight");
    }

    if success {
        commands.push(CoreCommand::NotifyReload(task.clone()));
    }

    // A failed run never blocks the follow-up; the next edit may fix it.
    if queue.take(&task) {
        info!(task = %task, "starting queued follow-up run");
        in_flight.insert(task.clone());
        commands.push(CoreCommand::StartRun(task));
    }

    let mut keep_running = true;
    if options.exit_when_idle && in_flight.is_empty() && queue.is_empty() {
        keep_running = false;
        commands.push(CoreCommand::RequestExit);
    }

    CoreStep {
        commands,
        keep_running,
    }
}
