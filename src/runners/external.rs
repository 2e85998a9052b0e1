//! Subprocess plumbing for external-tool runners
//!
//! Runners that wrap an external tool (rustfmt, clippy) follow a common
//! pattern: probe availability, run the tool as a blocking subprocess,
//! parse its output into issues.

use anyhow::{Context, Result};
use std::path::Path;
use std::process::{Command, Stdio};
use tracing::debug;

/// Captured output from one external tool invocation
#[derive(Debug, Clone)]
pub struct ToolOutput {
    pub stdout: String,
    pub stderr: String,
    /// Exit code, when the process terminated normally
    pub status: Option<i32>,
}

impl ToolOutput {
    pub fn succeeded(&self) -> bool {
        self.status == Some(0)
    }
}

/// Run an external tool to completion, capturing its output
pub fn run_tool(program: &str, args: &[&str], cwd: &Path) -> Result<ToolOutput> {
    debug!("Running external tool: {} {}", program, args.join(" "));
    let output = Command::new(program)
        .args(args)
        .current_dir(cwd)
        .stdin(Stdio::null())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .output()
        .with_context(|| format!("failed to launch {}", program))?;

    Ok(ToolOutput {
        stdout: String::from_utf8_lossy(&output.stdout).into_owned(),
        stderr: String::from_utf8_lossy(&output.stderr).into_owned(),
        status: output.status.code(),
    })
}

/// Probe whether a tool is on PATH and answers the given argument
pub fn tool_available(program: &str, probe_arg: &str) -> bool {
    Command::new(program)
        .arg(probe_arg)
        .stdin(Stdio::null())
        .stdout(Stdio::null())
        .stderr(Stdio::null())
        .status()
        .map(|status| status.success())
        .unwrap_or(false)
}
