// src/dag/task.rs

//! The single asynchronous action type every task runs.
//!
//! Actions can be written in whichever style suits the work:
//!
//! - [`TaskAction::from_sync`] for plain synchronous bodies,
//! - [`TaskAction::from_future`] for `async` bodies,
//! - [`TaskAction::from_callback`] for tools that report completion through a
//!   callback; the body receives a [`Done`] handle to signal with.
//!
//! All three end up as the same boxed future, which is what the executor awaits.

use std::fmt;
use std::future::Future;
use std::panic;
use std::pin::Pin;
use std::sync::Arc;

use anyhow::anyhow;
use tokio::sync::oneshot;
use tokio::task;

use crate::config::{Configuration, ProjectLayout};
use crate::exec::ToolRunner;
use crate::fs::FileSystem;

/// Completion of one action invocation.
pub type ActionFuture = Pin<Box<dyn Future<Output = anyhow::Result<()>> + Send + 'static>>;

type ActionFn = dyn Fn(TaskContext) -> ActionFuture + Send + Sync;

/// Everything an action may read or act upon.
///
/// Cloning is cheap; every field is shared.
#[derive(Debug, Clone)]
pub struct TaskContext {
    pub config: Arc<Configuration>,
    pub layout: Arc<ProjectLayout>,
    pub fs: Arc<dyn FileSystem>,
    pub tools: Arc<dyn ToolRunner>,
}

/// A task's unit of work.
#[derive(Clone)]
pub struct TaskAction {
    inner: Arc<ActionFn>,
}

impl fmt::Debug for TaskAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TaskAction").finish_non_exhaustive()
    }
}

impl TaskAction {
    /// An action that does nothing; used by aggregate tasks such as `dist`.
    pub fn noop() -> Self {
        Self::from_sync(|_| Ok(()))
    }

    /// Adapt a synchronous body. It runs on the blocking thread pool, so it
    /// may do filesystem work directly.
    pub fn from_sync<F>(f: F) -> Self
    where
        F: Fn(&TaskContext) -> anyhow::Result<()> + Send + Sync + 'static,
    {
        let f = Arc::new(f);
        Self {
            inner: Arc::new(move |ctx: TaskContext| {
                let f = Arc::clone(&f);
                Box::pin(async move {
                    match task::spawn_blocking(move || f(&ctx)).await {
                        Ok(result) => result,
                        // Re-raise so the executor reports the original panic message.
                        Err(err) if err.is_panic() => panic::resume_unwind(err.into_panic()),
                        Err(err) => Err(anyhow!("blocking action did not complete: {err}")),
                    }
                }) as ActionFuture
            }),
        }
    }

    pub fn from_future<F, Fut>(f: F) -> Self
    where
        F: Fn(TaskContext) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = anyhow::Result<()>> + Send + 'static,
    {
        Self {
            inner: Arc::new(move |ctx: TaskContext| Box::pin(f(ctx)) as ActionFuture),
        }
    }

    /// Adapt a callback-style body.
    ///
    /// The action completes when the [`Done`] handle is signalled. Dropping the
    /// handle without signalling fails the action.
    pub fn from_callback<F>(f: F) -> Self
    where
        F: Fn(TaskContext, Done) + Send + Sync + 'static,
    {
        let f = Arc::new(f);
        Self {
            inner: Arc::new(move |ctx: TaskContext| {
                let f = Arc::clone(&f);
                Box::pin(async move {
                    let (tx, rx) = oneshot::channel();
                    f(ctx, Done { tx });
                    match rx.await {
                        Ok(result) => result,
                        Err(_) => Err(anyhow!(
                            "completion callback was dropped without being signalled"
                        )),
                    }
                }) as ActionFuture
            }),
        }
    }

    /// Start one invocation of the action.
    pub fn invoke(&self, ctx: TaskContext) -> ActionFuture {
        (self.inner)(ctx)
    }
}

/// Completion handle passed to callback-style actions.
#[derive(Debug)]
pub struct Done {
    tx: oneshot::Sender<anyhow::Result<()>>,
}

impl Done {
    pub fn ok(self) {
        self.finish(Ok(()));
    }

    pub fn fail(self, err: impl Into<anyhow::Error>) {
        self.finish(Err(err.into()));
    }

    pub fn finish(self, result: anyhow::Result<()>) {
        // The receiver only disappears if the run itself was torn down.
        let _ = self.tx.send(result);
    }
}
