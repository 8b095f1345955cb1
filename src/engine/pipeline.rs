// src/engine/pipeline.rs

//! One-shot task graph runs.
//!
//! A [`Pipeline`] owns the validated graph and an executor. Each call to
//! [`Pipeline::run`] builds a fresh [`Scheduler`] and its own completion
//! channel, so concurrent runs never share state.

use std::fmt;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::{Duration, Instant};

use anyhow::anyhow;
use tokio::sync::mpsc;
use tracing::{debug, info, warn};

use crate::dag::{ScheduledTask, Scheduler, TaskGraph};
use crate::engine::{RunEvent, TaskName};
use crate::errors::Result;
use crate::exec::ExecutorBackend;

/// Summary of a successful run.
#[derive(Debug, Clone)]
pub struct RunReport {
    pub target: TaskName,
    pub run_id: u64,
    /// Tasks that ran, in the order their completions were recorded.
    pub completed: Vec<TaskName>,
    pub elapsed: Duration,
}

pub struct Pipeline<E: ExecutorBackend> {
    graph: Arc<TaskGraph>,
    executor: E,
    run_counter: AtomicU64,
}

impl<E: ExecutorBackend> fmt::Debug for Pipeline<E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Pipeline")
            .field("tasks", &self.graph.len())
            .field("runs", &self.run_counter.load(Ordering::Relaxed))
            .finish_non_exhaustive()
    }
}

impl<E: ExecutorBackend> Pipeline<E> {
    pub fn new(graph: Arc<TaskGraph>, executor: E) -> Self {
        Self {
            graph,
            executor,
            run_counter: AtomicU64::new(0),
        }
    }

    pub fn graph(&self) -> &Arc<TaskGraph> {
        &self.graph
    }

    /// Run `target` after its transitive prerequisites.
    ///
    /// Each task runs at most once. Once a task fails nothing new starts;
    /// tasks that are already running are awaited, and every failure ends up
    /// in the returned error.
    pub async fn run(&self, target: &str) -> Result<RunReport> {
        let run_id = self.run_counter.fetch_add(1, Ordering::Relaxed) + 1;
        let mut scheduler = Scheduler::for_target(Arc::clone(&self.graph), target, run_id)?;
        let started = Instant::now();

        let (events_tx, mut events_rx) = mpsc::channel::<RunEvent>(256);
        let mut completed = Vec::new();

        let step = scheduler.start();
        self.dispatch(step.newly_scheduled, &events_tx).await?;

        while !scheduler.is_finished() {
            let Some(event) = events_rx.recv().await else {
                return Err(anyhow!("completion channel closed during run {run_id}").into());
            };

            match event {
                RunEvent::TaskCompleted {
                    task,
                    run_id: event_run,
                    outcome,
                } => {
                    if event_run != run_id {
                        warn!(task = %task, run_id, event_run, "completion from another run; ignoring");
                        continue;
                    }

                    debug!(task = %task, run_id, ?outcome, "pipeline received completion");
                    let succeeded = matches!(outcome, crate::engine::TaskOutcome::Success);
                    let step = scheduler.step_completion(&task, outcome);
                    if succeeded {
                        completed.push(task);
                    }
                    self.dispatch(step.newly_scheduled, &events_tx).await?;
                }
            }
        }

        let elapsed = started.elapsed();
        scheduler.into_result()?;

        info!(
            task = %target,
            run_id,
            tasks = completed.len(),
            elapsed_ms = elapsed.as_millis() as u64,
            "finished"
        );

        Ok(RunReport {
            target: target.to_string(),
            run_id,
            completed,
            elapsed,
        })
    }

    async fn dispatch(
        &self,
        tasks: Vec<ScheduledTask>,
        events: &mpsc::Sender<RunEvent>,
    ) -> Result<()> {
        if tasks.is_empty() {
            return Ok(());
        }

        let names: Vec<_> = tasks.iter().map(|t| t.name.as_str()).collect();
        debug!(?names, "dispatching ready tasks");

        self.executor.spawn_ready_tasks(tasks, events.clone()).await
    }
}
