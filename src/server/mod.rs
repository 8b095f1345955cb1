// src/server/mod.rs

//! Development server: static files, file watching and live reload.
//!
//! [`DevServer::serve`] walks the `stopped -> serving -> stopped` state
//! machine: it builds once, starts the HTTP server on the output tree,
//! registers the watch bindings and then feeds watch-triggered rebuilds
//! through the engine [`Runtime`] until Ctrl-C.

pub mod http;
pub mod reload;

use std::net::SocketAddr;
use std::sync::Arc;

use tokio::net::TcpListener;
use tokio::sync::mpsc;
use tracing::{error, info};

use crate::config::{Configuration, ProjectLayout};
use crate::engine::{CoreRuntime, Pipeline, Runtime, RuntimeEvent, RuntimeOptions};
use crate::errors::Result;
use crate::exec::ExecutorBackend;
use crate::watch::{WatchBinding, default_bindings, reload_kinds, spawn_watcher};

pub use reload::ReloadHub;

/// Lifecycle of a dev server session.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ServerState {
    Stopped,
    Serving,
}

pub struct DevServer<E: ExecutorBackend + 'static> {
    pipeline: Arc<Pipeline<E>>,
    layout: Arc<ProjectLayout>,
    config: Arc<Configuration>,
    bindings: Vec<WatchBinding>,
    state: ServerState,
}

impl<E: ExecutorBackend + 'static> std::fmt::Debug for DevServer<E> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DevServer")
            .field("root", &self.layout.root())
            .field("bindings", &self.bindings)
            .field("state", &self.state)
            .finish_non_exhaustive()
    }
}

impl<E: ExecutorBackend + 'static> DevServer<E> {
    pub fn new(
        pipeline: Arc<Pipeline<E>>,
        layout: Arc<ProjectLayout>,
        config: Arc<Configuration>,
    ) -> Result<Self> {
        Ok(Self {
            pipeline,
            layout,
            config,
            bindings: default_bindings()?,
            state: ServerState::Stopped,
        })
    }

    pub fn state(&self) -> ServerState {
        self.state
    }

    /// Build `initial`, then serve and rebuild on change until Ctrl-C.
    ///
    /// A failing initial build aborts before anything is served. Failing
    /// rebuilds are logged and the session keeps going.
    pub async fn serve(&mut self, initial: &str) -> Result<()> {
        let port = self.config.server_port()?;
        let behaviour = self.config.rebuild_while_running()?;

        self.pipeline.run(initial).await?;

        let address = SocketAddr::from(([127, 0, 0, 1], port));
        let listener = TcpListener::bind(address).await?;

        let hub = ReloadHub::new();
        let app = http::router(self.layout.dist_dir(), hub.clone());
        let http_task = tokio::spawn(async move {
            if let Err(err) = axum::serve(listener, app).await {
                error!(error = %err, "http server stopped");
            }
        });

        self.state = ServerState::Serving;
        info!(url = %format!("http://localhost:{port}/"), "serving output tree");

        let (tx, rx) = mpsc::channel::<RuntimeEvent>(256);
        let watcher = spawn_watcher(self.layout.root(), self.bindings.clone(), tx.clone());
        let watcher = match watcher {
            Ok(w) => w,
            Err(err) => {
                http_task.abort();
                self.state = ServerState::Stopped;
                return Err(err.into());
            }
        };

        let signal_tx = tx.clone();
        let signal_task = tokio::spawn(async move {
            if tokio::signal::ctrl_c().await.is_ok() {
                info!("Ctrl-C received; stopping dev server");
                let _ = signal_tx.send(RuntimeEvent::ShutdownRequested).await;
            }
        });

        let core = CoreRuntime::new(behaviour, RuntimeOptions::default());
        let result = Runtime::new(core, rx, tx, Arc::clone(&self.pipeline))
            .with_reload(hub, reload_kinds(&self.bindings))
            .run()
            .await;

        drop(watcher);
        signal_task.abort();
        http_task.abort();
        self.state = ServerState::Stopped;
        info!("dev server stopped");

        result
    }
}
