// src/dag/state_manager.rs

//! Per-run state transitions for tasks in the scheduler.

use std::collections::HashMap;

use tracing::{debug, info, warn};

use crate::dag::task_info::{RunState, ScheduledTask, TaskInfo};
use crate::engine::TaskName;

/// Manages per-run state transitions for tasks.
pub struct StateManager<'a> {
    tasks: &'a mut HashMap<TaskName, TaskInfo>,
    run_id: u64,
}

impl<'a> StateManager<'a> {
    pub fn new(tasks: &'a mut HashMap<TaskName, TaskInfo>, run_id: u64) -> Self {
        Self { tasks, run_id }
    }

    /// Collect `Pending` tasks whose prerequisites all succeeded, mark them
    /// `Running` and return them in topological order.
    pub fn collect_new_ready_tasks(&mut self) -> Vec<ScheduledTask> {
        // Decide first, then mutate.
        let mut candidates: Vec<(usize, TaskName)> = {
            let ro = ReadOnlyStateManager::new(self.tasks);
            self.tasks
                .values()
                .filter(|info| info.run_state == RunState::Pending && ro.deps_satisfied_for_info(info))
                .map(|info| (info.position, info.name.clone()))
                .collect()
        };
        candidates.sort();

        let mut ready = Vec::with_capacity(candidates.len());
        for (_, name) in candidates {
            if let Some(info) = self.tasks.get_mut(&name) {
                info!(task = %info.name, run_id = self.run_id, "starting task");
                info.run_state = RunState::Running;
                ready.push(ScheduledTask::from_task_info(info, self.run_id));
            }
        }

        ready
    }

    /// Record the outcome of a running task.
    ///
    /// Returns `false` if the task was not running, in which case nothing changes.
    pub fn mark_completed(&mut self, task: &str, success: bool) -> bool {
        let Some(info) = self.tasks.get_mut(task) else {
            warn!(task = %task, run_id = self.run_id, "completion for task outside this run; ignoring");
            return false;
        };

        if info.run_state != RunState::Running {
            warn!(
                task = %task,
                run_id = self.run_id,
                state = ?info.run_state,
                "completion for task that is not running; ignoring"
            );
            return false;
        }

        info.run_state = if success {
            RunState::DoneSuccess
        } else {
            RunState::DoneFailed
        };
        true
    }

    /// Mark every still-pending task as skipped. Running tasks are left alone.
    pub fn mark_pending_skipped(&mut self) -> Vec<TaskName> {
        let mut skipped: Vec<(usize, TaskName)> = self
            .tasks
            .values_mut()
            .filter(|info| info.run_state == RunState::Pending)
            .map(|info| {
                info.run_state = RunState::Skipped;
                (info.position, info.name.clone())
            })
            .collect();
        skipped.sort();

        for (_, name) in &skipped {
            debug!(task = %name, run_id = self.run_id, "skipping task after failure");
        }

        skipped.into_iter().map(|(_, name)| name).collect()
    }

    pub fn all_tasks_terminal(&self) -> bool {
        self.tasks.values().all(|info| info.run_state.is_terminal())
    }
}

/// A read-only view for checking dependency satisfaction.
pub struct ReadOnlyStateManager<'a> {
    tasks: &'a HashMap<TaskName, TaskInfo>,
}

impl<'a> ReadOnlyStateManager<'a> {
    pub fn new(tasks: &'a HashMap<TaskName, TaskInfo>) -> Self {
        Self { tasks }
    }

    /// Every prerequisite has completed successfully in this run.
    pub fn deps_satisfied_for_info(&self, info: &TaskInfo) -> bool {
        info.deps.iter().all(|dep_name| match self.tasks.get(dep_name) {
            Some(dep) => dep.run_state == RunState::DoneSuccess,
            None => {
                warn!(
                    task = %info.name,
                    dep = %dep_name,
                    "prerequisite missing from run"
                );
                false
            }
        })
    }
}
