// src/dag/mod.rs

//! Task declaration, the validated task DAG and per-run scheduling.
//!
//! - [`task`] holds the unified action type and the context every action gets.
//! - [`graph`] holds the builder (`declare`) and the validated, immutable DAG.
//! - [`scheduler`] contains the per-run state machine that decides which
//!   prerequisites are ready, and when the target itself can run.
//! - [`task_info`] provides per-run task state and scheduled task types.
//! - [`scheduler_step`] defines the result type for scheduler steps.
//! - [`state_manager`] manages per-run state transitions.

pub mod graph;
pub mod scheduler;
pub mod scheduler_step;
pub mod state_manager;
pub mod task;
pub mod task_info;

pub use graph::{TaskGraph, TaskGraphBuilder};
pub use scheduler::Scheduler;
pub use scheduler_step::SchedulerStep;
pub use task::{ActionFuture, Done, TaskAction, TaskContext};
pub use task_info::{ScheduledTask, TaskRunState};
