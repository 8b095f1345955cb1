// src/exec/command.rs

//! External tool invocation.
//!
//! Bundling, minification and the JS test runners are separate programs. Actions
//! describe what to run as a [`ToolInvocation`] and hand it to a [`ToolRunner`],
//! so tests can record invocations instead of spawning processes.

use std::collections::VecDeque;
use std::fmt;
use std::future::Future;
use std::path::PathBuf;
use std::pin::Pin;
use std::process::Stdio;
use std::sync::{Arc, Mutex};

use anyhow::{Context, Result, bail};
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::process::Command;
use tracing::{debug, info};

/// Lines of stderr kept for the error message of a failed tool.
const STDERR_TAIL_LINES: usize = 20;

/// One external program call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ToolInvocation {
    pub program: String,
    pub args: Vec<String>,
    pub cwd: Option<PathBuf>,
}

impl ToolInvocation {
    pub fn new(program: impl Into<String>) -> Self {
        Self {
            program: program.into(),
            args: Vec::new(),
            cwd: None,
        }
    }

    pub fn arg(mut self, arg: impl Into<String>) -> Self {
        self.args.push(arg.into());
        self
    }

    pub fn args<I, S>(mut self, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.args.extend(args.into_iter().map(Into::into));
        self
    }

    pub fn current_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.cwd = Some(dir.into());
        self
    }

    /// Program and arguments joined by spaces, for logs and errors.
    pub fn command_line(&self) -> String {
        std::iter::once(self.program.as_str())
            .chain(self.args.iter().map(String::as_str))
            .collect::<Vec<_>>()
            .join(" ")
    }
}

impl fmt::Display for ToolInvocation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.command_line())
    }
}

/// Runs external tools to completion.
pub trait ToolRunner: Send + Sync + fmt::Debug {
    /// Fails if the tool cannot be started or exits unsuccessfully.
    fn run(&self, invocation: ToolInvocation)
    -> Pin<Box<dyn Future<Output = Result<()>> + Send + '_>>;
}

/// Spawns real processes with `tokio::process::Command`.
#[derive(Debug, Clone, Default)]
pub struct ProcessToolRunner;

impl ToolRunner for ProcessToolRunner {
    fn run(
        &self,
        invocation: ToolInvocation,
    ) -> Pin<Box<dyn Future<Output = Result<()>> + Send + '_>> {
        Box::pin(run_process(invocation))
    }
}

async fn run_process(invocation: ToolInvocation) -> Result<()> {
    let line = invocation.command_line();
    info!(cmd = %line, "running external tool");

    let mut cmd = Command::new(&invocation.program);
    cmd.args(&invocation.args)
        .stdin(Stdio::null())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .kill_on_drop(true);
    if let Some(dir) = &invocation.cwd {
        cmd.current_dir(dir);
    }

    let mut child = cmd
        .spawn()
        .with_context(|| format!("spawning '{}'", invocation.program))?;

    if let Some(stdout) = child.stdout.take() {
        let program = invocation.program.clone();
        tokio::spawn(async move {
            let mut lines = BufReader::new(stdout).lines();
            while let Ok(Some(line)) = lines.next_line().await {
                info!(tool = %program, "{}", line);
            }
        });
    }

    // Keep the tail of stderr for the error message.
    let tail = Arc::new(Mutex::new(VecDeque::with_capacity(STDERR_TAIL_LINES)));
    let stderr_task = child.stderr.take().map(|stderr| {
        let program = invocation.program.clone();
        let tail = Arc::clone(&tail);
        tokio::spawn(async move {
            let mut lines = BufReader::new(stderr).lines();
            while let Ok(Some(line)) = lines.next_line().await {
                debug!(tool = %program, "stderr: {}", line);
                if let Ok(mut tail) = tail.lock() {
                    if tail.len() == STDERR_TAIL_LINES {
                        tail.pop_front();
                    }
                    tail.push_back(line);
                }
            }
        })
    });

    let status = child
        .wait()
        .await
        .with_context(|| format!("waiting for '{}'", invocation.program))?;

    if let Some(handle) = stderr_task {
        let _ = handle.await;
    }

    if !status.success() {
        let code = status.code().unwrap_or(-1);
        let stderr = tail
            .lock()
            .map(|t| t.iter().cloned().collect::<Vec<_>>().join("\n"))
            .unwrap_or_default();
        if stderr.is_empty() {
            bail!("'{line}' exited with status {code}");
        }
        bail!("'{line}' exited with status {code}:\n{stderr}");
    }

    debug!(cmd = %line, "external tool finished");
    Ok(())
}
