// src/lib.rs

pub mod actions;
pub mod cli;
pub mod config;
pub mod dag;
pub mod engine;
pub mod errors;
pub mod exec;
pub mod fs;
pub mod logging;
pub mod server;
pub mod types;
pub mod watch;

use std::sync::Arc;

use anyhow::Result;
use tracing::{debug, info};

use crate::actions::{SERVE, declare_builtin_tasks};
use crate::cli::CliArgs;
use crate::config::{ConfigLoader, ConfigSeed, ProjectLayout};
use crate::dag::{TaskContext, TaskGraph, TaskGraphBuilder};
use crate::engine::Pipeline;
use crate::exec::{ActionExecutor, ProcessToolRunner};
use crate::fs::{FileSystem, RealFileSystem};
use crate::server::DevServer;

/// High-level entry point used by `main.rs`.
///
/// This wires together:
/// - configuration loading (fails before any task runs)
/// - the built-in task graph
/// - the action executor and pipeline
/// - the dev server, when the requested task is `serve`
pub async fn run(args: CliArgs) -> Result<()> {
    let graph = Arc::new(build_task_graph()?);

    if args.list {
        print_task_list(&graph);
        return Ok(());
    }

    let layout = Arc::new(ProjectLayout::new(args.root.clone()));
    let fs: Arc<dyn FileSystem> = Arc::new(RealFileSystem);

    let seed = ConfigSeed::from_process(args.env.clone(), args.uglify);
    let config = Arc::new(ConfigLoader::new(fs.as_ref(), layout.config_dir()).load(&seed)?);
    debug!(env = %config.env(), "configuration resolved");

    if !graph.contains(&args.task) {
        return Err(errors::AssetflowError::TaskNotFound(args.task.clone()).into());
    }

    let ctx = TaskContext {
        config: Arc::clone(&config),
        layout: Arc::clone(&layout),
        fs,
        tools: Arc::new(ProcessToolRunner),
    };
    let pipeline = Arc::new(Pipeline::new(
        Arc::clone(&graph),
        ActionExecutor::new(Arc::clone(&graph), ctx),
    ));

    if args.task == SERVE {
        let mut server = DevServer::new(pipeline, layout, config)?;
        server.serve(SERVE).await?;
        return Ok(());
    }

    let report = pipeline.run(&args.task).await?;
    info!(
        task = %report.target,
        tasks = report.completed.len(),
        elapsed_ms = report.elapsed.as_millis() as u64,
        "done"
    );
    Ok(())
}

/// The validated graph of built-in tasks.
pub fn build_task_graph() -> errors::Result<TaskGraph> {
    let mut builder = TaskGraphBuilder::new();
    declare_builtin_tasks(&mut builder);
    builder.build()
}

/// Print every task and its prerequisites, prerequisites first.
fn print_task_list(graph: &TaskGraph) {
    for name in graph.tasks() {
        let deps = graph.dependencies_of(name);
        if deps.is_empty() {
            println!("{name}");
        } else {
            println!("{name} <- {}", deps.join(", "));
        }
    }
}
