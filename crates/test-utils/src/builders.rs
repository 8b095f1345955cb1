//! Graph and context builders shared by the integration tests.

use std::sync::{Arc, Mutex};

use assetflow::config::{Configuration, ProjectLayout};
use assetflow::dag::{TaskAction, TaskContext, TaskGraph, TaskGraphBuilder};
use assetflow::fs::FileSystem;
use assetflow::fs::mock::MockFileSystem;
use serde_json::Value;

use crate::tools::RecordingToolRunner;

/// Shared log of action invocations.
///
/// Each recording action pushes `"<name>"` when it runs, so the log shows
/// the order in which actions were invoked.
#[derive(Debug, Clone, Default)]
pub struct Recorder {
    events: Arc<Mutex<Vec<String>>>,
}

impl Recorder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&self, event: impl Into<String>) {
        self.events.lock().unwrap().push(event.into());
    }

    pub fn events(&self) -> Vec<String> {
        self.events.lock().unwrap().clone()
    }

    /// How many times `name` was recorded.
    pub fn count(&self, name: &str) -> usize {
        self.events.lock().unwrap().iter().filter(|e| *e == name).count()
    }

    /// Position of the first record of `name`.
    pub fn index_of(&self, name: &str) -> Option<usize> {
        self.events.lock().unwrap().iter().position(|e| e == name)
    }

    /// A synchronous action that records `name`.
    pub fn action(&self, name: &str) -> TaskAction {
        let recorder = self.clone();
        let name = name.to_string();
        TaskAction::from_sync(move |_| {
            recorder.push(name.clone());
            Ok(())
        })
    }
}

/// Build a graph from `(name, prerequisites)` pairs, each task recording
/// itself on `recorder` when it runs.
pub fn recording_graph(spec: &[(&str, &[&str])], recorder: &Recorder) -> TaskGraph {
    let mut builder = TaskGraphBuilder::new();
    for (name, deps) in spec {
        builder.declare(*name, deps, recorder.action(name));
    }
    builder.build().expect("test graph must be valid")
}

/// A configuration from a JSON object literal.
pub fn test_config(value: Value) -> Configuration {
    match value {
        Value::Object(map) => Configuration::from_map(map),
        other => panic!("test config must be a JSON object, got {other}"),
    }
}

/// A task context rooted at `.` over `fs`, with recorded tool invocations.
pub fn context_with(fs: &MockFileSystem, config: Configuration, tools: &RecordingToolRunner) -> TaskContext {
    let fs: Arc<dyn FileSystem> = Arc::new(fs.clone());
    TaskContext {
        config: Arc::new(config),
        layout: Arc::new(ProjectLayout::default()),
        fs,
        tools: Arc::new(tools.clone()),
    }
}
