// src/exec/mod.rs

//! Execution layer.
//!
//! - [`backend`] provides the `ExecutorBackend` trait a pipeline dispatches
//!   through, and `ActionExecutor`, the production backend that runs real task
//!   actions. Tests swap in a fake backend.
//! - [`task_runner`] runs one action on the Tokio runtime and reports its
//!   outcome back to the pipeline.
//! - [`command`] wraps external tools (`esbuild`, `karma`, ...) behind the
//!   `ToolRunner` trait.

pub mod backend;
pub mod command;
pub mod task_runner;

pub use backend::{ActionExecutor, ExecutorBackend};
pub use command::{ProcessToolRunner, ToolInvocation, ToolRunner};
