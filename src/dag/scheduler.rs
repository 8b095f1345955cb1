// src/dag/scheduler.rs

use std::collections::HashMap;
use std::sync::Arc;

use tracing::{debug, info, warn};

use crate::dag::graph::TaskGraph;
use crate::dag::scheduler_step::SchedulerStep;
use crate::dag::state_manager::{ReadOnlyStateManager, StateManager};
use crate::dag::task_info::{RunState, TaskInfo, TaskRunState};
use crate::engine::{TaskName, TaskOutcome};
use crate::errors::{AssetflowError, Result, TaskFailure};

/// Per-run scheduler for one requested target.
///
/// It is responsible for:
/// - including the target and its transitive prerequisites in the run
/// - deciding when a task is ready (all prerequisites succeeded)
/// - recording outcomes as completions arrive
/// - stopping new work once any task has failed
///
/// It never performs IO; the pipeline feeds it completions and dispatches
/// whatever it schedules.
#[derive(Debug)]
pub struct Scheduler {
    graph: Arc<TaskGraph>,
    target: TaskName,
    run_id: u64,
    tasks: HashMap<TaskName, TaskInfo>,
    failures: Vec<TaskFailure>,
    finished: bool,
}

impl Scheduler {
    /// Prepare a run of `target`. Fails if the task is unknown.
    pub fn for_target(graph: Arc<TaskGraph>, target: &str, run_id: u64) -> Result<Self> {
        let plan = graph.execution_plan(target)?;

        let tasks = plan
            .into_iter()
            .enumerate()
            .map(|(position, name)| {
                let info = TaskInfo {
                    deps: graph.dependencies_of(&name).to_vec(),
                    name: name.clone(),
                    position,
                    run_state: RunState::Pending,
                };
                (name, info)
            })
            .collect::<HashMap<_, _>>();

        debug!(task = %target, run_id, tasks = tasks.len(), "scheduler: prepared run");

        Ok(Self {
            graph,
            target: target.to_string(),
            run_id,
            tasks,
            failures: Vec::new(),
            finished: false,
        })
    }

    pub fn target(&self) -> &str {
        &self.target
    }

    pub fn run_id(&self) -> u64 {
        self.run_id
    }

    pub fn graph(&self) -> &TaskGraph {
        &self.graph
    }

    /// Every task of the run is terminal.
    pub fn is_finished(&self) -> bool {
        self.finished
    }

    /// At least one task failed; no further tasks will start.
    pub fn is_aborted(&self) -> bool {
        !self.failures.is_empty()
    }

    /// Failures recorded so far, in completion order.
    pub fn failures(&self) -> &[TaskFailure] {
        &self.failures
    }

    pub fn run_state_of(&self, task: &str) -> TaskRunState {
        self.tasks.get(task).map(|info| info.run_state).into()
    }

    /// Tasks participating in this run, prerequisites first.
    pub fn tasks_in_run(&self) -> Vec<TaskName> {
        let mut names: Vec<&TaskInfo> = self.tasks.values().collect();
        names.sort_by_key(|info| info.position);
        names.into_iter().map(|info| info.name.clone()).collect()
    }

    /// Tasks that completed successfully, prerequisites first.
    pub fn completed_tasks(&self) -> Vec<TaskName> {
        self.tasks_with_state(RunState::DoneSuccess)
    }

    pub fn skipped_tasks(&self) -> Vec<TaskName> {
        self.tasks_with_state(RunState::Skipped)
    }

    /// Whether every prerequisite of `task` has succeeded in this run.
    ///
    /// Returns `None` if the task is not part of the run.
    pub fn deps_satisfied(&self, task: &str) -> Option<bool> {
        let info = self.tasks.get(task)?;
        Some(ReadOnlyStateManager::new(&self.tasks).deps_satisfied_for_info(info))
    }

    /// Schedule every task with no outstanding prerequisites.
    pub fn start(&mut self) -> SchedulerStep {
        info!(task = %self.target, run_id = self.run_id, "starting run");
        let newly_scheduled = StateManager::new(&mut self.tasks, self.run_id).collect_new_ready_tasks();
        let run_just_finished = self.maybe_finish_run();

        SchedulerStep {
            newly_scheduled,
            newly_skipped: Vec::new(),
            run_just_finished,
        }
    }

    /// Production API: completion returning only the newly scheduled names.
    pub fn handle_completion(&mut self, task: &str, outcome: TaskOutcome) -> Vec<TaskName> {
        self.step_completion(task, outcome)
            .newly_scheduled
            .into_iter()
            .map(|t| t.name)
            .collect()
    }

    /// Record a task's outcome and return what changed.
    pub fn step_completion(&mut self, task: &str, outcome: TaskOutcome) -> SchedulerStep {
        if self.finished {
            warn!(task = %task, run_id = self.run_id, "completion after run finished; ignoring");
            return SchedulerStep::default();
        }

        let success = matches!(outcome, TaskOutcome::Success);
        let mut manager = StateManager::new(&mut self.tasks, self.run_id);
        if !manager.mark_completed(task, success) {
            return SchedulerStep::default();
        }

        let mut step = SchedulerStep::default();
        match outcome {
            TaskOutcome::Success => {
                debug!(task = %task, run_id = self.run_id, "task completed successfully");
                if self.failures.is_empty() {
                    step.newly_scheduled = manager.collect_new_ready_tasks();
                }
            }
            TaskOutcome::Failed(message) => {
                warn!(
                    task = %task,
                    run_id = self.run_id,
                    error = %message,
                    "task failed; no further tasks will start in this run"
                );
                step.newly_skipped = manager.mark_pending_skipped();
                self.failures.push(TaskFailure {
                    task: task.to_string(),
                    message,
                });
            }
        }

        step.run_just_finished = self.maybe_finish_run();
        step
    }

    /// Turn the terminal state of the run into its overall result.
    pub fn into_result(self) -> Result<Vec<TaskName>> {
        if self.failures.is_empty() {
            Ok(self.completed_tasks())
        } else {
            Err(AssetflowError::TaskFailed {
                task: self.target,
                failures: self.failures,
            })
        }
    }

    fn tasks_with_state(&self, state: RunState) -> Vec<TaskName> {
        let mut infos: Vec<&TaskInfo> = self
            .tasks
            .values()
            .filter(|info| info.run_state == state)
            .collect();
        infos.sort_by_key(|info| info.position);
        infos.into_iter().map(|info| info.name.clone()).collect()
    }

    fn maybe_finish_run(&mut self) -> bool {
        if self.finished {
            return false;
        }

        if StateManager::new(&mut self.tasks, self.run_id).all_tasks_terminal() {
            info!(
                task = %self.target,
                run_id = self.run_id,
                failed = self.failures.len(),
                "run finished"
            );
            self.finished = true;
            true
        } else {
            false
        }
    }
}
