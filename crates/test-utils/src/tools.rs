use std::collections::HashSet;
use std::future::Future;
use std::pin::Pin;
use std::sync::{Arc, Mutex};

use assetflow::exec::{ToolInvocation, ToolRunner};

/// Records tool invocations instead of spawning processes.
#[derive(Debug, Clone, Default)]
pub struct RecordingToolRunner {
    invocations: Arc<Mutex<Vec<ToolInvocation>>>,
    failing: Arc<HashSet<String>>,
}

impl RecordingToolRunner {
    pub fn new() -> Self {
        Self::default()
    }

    /// Invocations of these programs fail.
    pub fn failing(programs: &[&str]) -> Self {
        Self {
            invocations: Arc::default(),
            failing: Arc::new(programs.iter().map(|p| p.to_string()).collect()),
        }
    }

    pub fn invocations(&self) -> Vec<ToolInvocation> {
        self.invocations.lock().unwrap().clone()
    }

    pub fn command_lines(&self) -> Vec<String> {
        self.invocations()
            .iter()
            .map(ToolInvocation::command_line)
            .collect()
    }
}

impl ToolRunner for RecordingToolRunner {
    fn run(
        &self,
        invocation: ToolInvocation,
    ) -> Pin<Box<dyn Future<Output = anyhow::Result<()>> + Send + '_>> {
        Box::pin(async move {
            let fail = self.failing.contains(&invocation.program);
            let line = invocation.command_line();
            self.invocations.lock().unwrap().push(invocation);
            if fail {
                anyhow::bail!("'{line}' exited with status 1");
            }
            Ok(())
        })
    }
}
