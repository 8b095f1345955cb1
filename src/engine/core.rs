// src/engine/core.rs

//! Pure core runtime state machine.
//!
//! This module contains a synchronous, deterministic "core runtime" that
//! consumes [`RuntimeEvent`]s and produces:
//! - an updated core state
//! - a list of commands describing what the IO shell should do next
//!
//! The async shell (`engine::runtime::Runtime`) is responsible for:
//! - reading events from channels
//! - starting pipeline runs and reporting when they finish
//! - pushing reload notifications to browsers
//!
//! The core is unit tested without any Tokio, channels, filesystem or processes.

use std::collections::HashSet;

use crate::engine::event_handlers::{CoreStep, handle_run_finished, handle_task_trigger};
use crate::engine::queue::TriggerQueue;
use crate::engine::{RuntimeEvent, RuntimeOptions, TaskName};
use crate::types::RebuildWhileRunning;

/// Pure core runtime state.
///
/// It has **no** channels, no Tokio types, and does not perform any IO.
#[derive(Debug)]
pub struct CoreRuntime {
    in_flight: HashSet<TaskName>,
    queue: TriggerQueue,
    options: RuntimeOptions,
}

impl CoreRuntime {
    pub fn new(behaviour: RebuildWhileRunning, options: RuntimeOptions) -> Self {
        Self {
            in_flight: HashSet::new(),
            queue: TriggerQueue::new(behaviour),
            options,
        }
    }

    /// Nothing is building.
    pub fn is_idle(&self) -> bool {
        self.in_flight.is_empty()
    }

    pub fn queue_is_empty(&self) -> bool {
        self.queue.is_empty()
    }

    pub fn is_running(&self, task: &str) -> bool {
        self.in_flight.contains(task)
    }

    /// Handle a single runtime event, updating core state and returning the
    /// resulting commands for the IO shell.
    pub fn step(&mut self, event: RuntimeEvent) -> CoreStep {
        match event {
            RuntimeEvent::TaskTriggered { task, reason } => {
                handle_task_trigger(&mut self.in_flight, &mut self.queue, task, reason)
            }
            RuntimeEvent::RunFinished { task, success } => handle_run_finished(
                &mut self.in_flight,
                &mut self.queue,
                &self.options,
                task,
                success,
            ),
            RuntimeEvent::ShutdownRequested => CoreStep {
                commands: Vec::new(),
                keep_running: false,
            },
        }
    }
}
