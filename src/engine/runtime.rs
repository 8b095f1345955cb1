// src/engine/runtime.rs

use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use tokio::sync::mpsc;
use tokio::task::JoinSet;
use tracing::{debug, error, info, warn};

use crate::engine::pipeline::Pipeline;
use crate::engine::TaskName;
use crate::errors::Result;
use crate::exec::ExecutorBackend;
use crate::server::ReloadHub;
use crate::types::ReloadKind;

use super::core::CoreRuntime;
use super::{CoreCommand, RuntimeEvent};

/// Drives watch-triggered rebuilds in response to `RuntimeEvent`s.
///
/// This is the IO shell around `CoreRuntime`, which holds all the
/// coalescing semantics. This struct reads events, starts pipeline runs in the
/// background and reports their completion back into its own event channel.
pub struct Runtime<E: ExecutorBackend + 'static> {
    core: CoreRuntime,
    event_rx: mpsc::Receiver<RuntimeEvent>,
    event_tx: mpsc::Sender<RuntimeEvent>,
    pipeline: Arc<Pipeline<E>>,
    reload: Option<ReloadHub>,
    reload_kinds: HashMap<TaskName, ReloadKind>,
    runs: JoinSet<()>,
}

impl<E: ExecutorBackend + 'static> fmt::Debug for Runtime<E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Runtime")
            .field("core", &self.core)
            .field("runs", &self.runs.len())
            .finish_non_exhaustive()
    }
}

impl<E: ExecutorBackend + 'static> Runtime<E> {
    /// `event_tx` must feed `event_rx`; finished runs are reported through it.
    pub fn new(
        core: CoreRuntime,
        event_rx: mpsc::Receiver<RuntimeEvent>,
        event_tx: mpsc::Sender<RuntimeEvent>,
        pipeline: Arc<Pipeline<E>>,
    ) -> Self {
        Self {
            core,
            event_rx,
            event_tx,
            pipeline,
            reload: None,
            reload_kinds: HashMap::new(),
            runs: JoinSet::new(),
        }
    }

    /// Push reload notifications after successful rebuilds.
    ///
    /// Tasks missing from `kinds` trigger a full page reload.
    pub fn with_reload(mut self, hub: ReloadHub, kinds: HashMap<TaskName, ReloadKind>) -> Self {
        self.reload = Some(hub);
        self.reload_kinds = kinds;
        self
    }

    /// Main event loop.
    ///
    /// Runs still building when the loop exits are aborted.
    pub async fn run(mut self) -> Result<()> {
        info!("watch runtime started");

        loop {
            let event = tokio::select! {
                maybe = self.event_rx.recv() => match maybe {
                    Some(e) => e,
                    None => {
                        info!("runtime event channel closed; exiting");
                        break;
                    }
                },
                Some(joined) = self.runs.join_next(), if !self.runs.is_empty() => {
                    if let Err(err) = joined {
                        warn!(error = %err, "background run did not complete");
                    }
                    continue;
                }
            };

            debug!(?event, "runtime received event");

            let step = self.core.step(event);

            for command in step.commands {
                self.execute_command(command);
            }

            if !step.keep_running {
                info!("stopping watch runtime");
                break;
            }
        }

        self.runs.shutdown().await;
        info!("runtime exiting");
        Ok(())
    }

    fn execute_command(&mut self, command: CoreCommand) {
        match command {
            CoreCommand::StartRun(task) => self.start_run(task),
            CoreCommand::NotifyReload(task) => {
                let kind = self
                    .reload_kinds
                    .get(&task)
                    .copied()
                    .unwrap_or(ReloadKind::Full);
                if let Some(hub) = &self.reload {
                    hub.notify(kind);
                }
            }
            CoreCommand::RequestExit => {
                info!("core issued RequestExit command");
            }
        }
    }

    fn start_run(&mut self, task: TaskName) {
        let pipeline = Arc::clone(&self.pipeline);
        let tx = self.event_tx.clone();

        self.runs.spawn(async move {
            let success = match pipeline.run(&task).await {
                Ok(report) => {
                    debug!(task = %task, run_id = report.run_id, "rebuild finished");
                    true
                }
                Err(err) => {
                    error!(task = %task, error = %err, "rebuild failed");
                    false
                }
            };

            if tx
                .send(RuntimeEvent::RunFinished {
                    task: task.clone(),
                    success,
                })
                .await
                .is_err()
            {
                debug!(task = %task, "runtime gone before run finished");
            }
        });
    }
}
