// src/core/runner.rs

use std::io::{self, ErrorKind};
use std::process::Stdio;
use std::time::{Duration, Instant};

use nix::sys::signal::{Signal, killpg};
use nix::unistd::Pid;
use tokio::io::{AsyncRead, AsyncReadExt, AsyncWriteExt};
use tokio::process::{Child, Command};
use tokio::time::timeout;
use tracing::{debug, info, warn};

use crate::core::errors::ScanError;
use crate::core::models::{ScanResult, Tool};

/// What a finished tool left behind on its standard streams.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProcessOutput {
    pub stdout: String,
    pub stderr: String,
    pub exit_code: Option<i32>,
}

/// Runs an external tool to completion under a wall-clock budget.
///
/// The child leads its own process group. When the budget expires the whole
/// group is killed and the child reaped before `ToolTimeout` is returned, so
/// helpers the tool forked do not outlive the request. `kill_on_drop` covers
/// the case where the request itself is abandoned mid-run.
///
/// A non-zero exit status is only reported as `ToolFailure` when the tool
/// wrote nothing to stdout; scanners such as ffuf exit non-zero while still
/// printing usable results.
///
/// # Arguments
/// * `tool` - Which tool is being run, used for logging and error messages.
/// * `program` - The executable name or path.
/// * `args` - The argument vector, passed verbatim.
/// * `stdin` - Optional input written to the child before its output is read.
/// * `budget` - The hard timeout for the whole run.
pub async fn run(
    tool: Tool,
    program: &str,
    args: &[String],
    stdin: Option<&str>,
    budget: Duration,
) -> ScanResult<ProcessOutput> {
    info!(%tool, program, args = args.len(), timeout_ms = budget.as_millis() as u64, "Starting external tool.");

    let mut command = Command::new(program);
    command
        .args(args)
        .stdin(if stdin.is_some() { Stdio::piped() } else { Stdio::null() })
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .process_group(0)
        .kill_on_drop(true);

    let mut child = command.spawn().map_err(|e| {
        warn!(%tool, program, error = %e, "Failed to start external tool.");
        ScanError::Unexpected(e.to_string())
    })?;

    // With `process_group(0)` the group id is the child's pid.
    let group = child.id().and_then(|id| i32::try_from(id).ok()).map(Pid::from_raw);
    let input = stdin.map(str::to_owned);
    let mut pipe = child.stdin.take();
    let stdout = child.stdout.take();
    let stderr = child.stderr.take();
    let started = Instant::now();

    let waiter = &mut child;
    let execution = async move {
        if let (Some(pipe), Some(input)) = (pipe.as_mut(), input) {
            // A tool may exit without reading its input; its exit status decides the outcome.
            if let Err(e) = pipe.write_all(input.as_bytes()).await {
                if e.kind() != ErrorKind::BrokenPipe {
                    return Err(e);
                }
            }
        }
        // Closing our end signals EOF to tools that read until the stream ends.
        drop(pipe);
        tokio::try_join!(waiter.wait(), read_stream(stdout), read_stream(stderr))
    };

    let outcome = timeout(budget, execution).await;
    let (status, stdout, stderr) = match outcome {
        Ok(Ok(finished)) => finished,
        Ok(Err(e)) => {
            warn!(%tool, error = %e, "I/O error while running external tool.");
            terminate(tool, &mut child, group).await;
            return Err(ScanError::Unexpected(e.to_string()));
        }
        Err(_) => {
            terminate(tool, &mut child, group).await;
            warn!(%tool, timeout_ms = budget.as_millis() as u64, "External tool timed out, process group killed.");
            return Err(ScanError::ToolTimeout { tool });
        }
    };

    let result = ProcessOutput {
        stdout: String::from_utf8_lossy(&stdout).into_owned(),
        stderr: String::from_utf8_lossy(&stderr).into_owned(),
        exit_code: status.code(),
    };

    info!(
        %tool,
        exit_code = ?result.exit_code,
        elapsed_ms = started.elapsed().as_millis() as u64,
        stdout_bytes = result.stdout.len(),
        "External tool finished."
    );

    classify(tool, status.success(), result)
}

async fn read_stream<R: AsyncRead + Unpin>(stream: Option<R>) -> io::Result<Vec<u8>> {
    let mut buffer = Vec::new();
    if let Some(mut stream) = stream {
        stream.read_to_end(&mut buffer).await?;
    }
    Ok(buffer)
}

/// Kills every process in the child's group, then reaps the child itself.
async fn terminate(tool: Tool, child: &mut Child, group: Option<Pid>) {
    if let Some(group) = group {
        // ESRCH only means the whole group is already gone.
        if let Err(e) = killpg(group, Signal::SIGKILL) {
            debug!(%tool, %group, error = %e, "Could not signal the process group.");
        }
    }
    if let Err(e) = child.start_kill() {
        debug!(%tool, error = %e, "Child had already exited.");
    }
    if let Err(e) = child.wait().await {
        warn!(%tool, error = %e, "Could not reap the killed child.");
    }
}

/// Applies the exit-status policy to a finished run.
fn classify(tool: Tool, succeeded: bool, output: ProcessOutput) -> ScanResult<ProcessOutput> {
    if succeeded {
        if !output.stderr.trim().is_empty() {
            debug!(%tool, stderr = %output.stderr.trim(), "Tool wrote to stderr.");
        }
        return Ok(output);
    }

    if !output.stdout.trim().is_empty() {
        warn!(%tool, exit_code = ?output.exit_code, "Tool exited non-zero but produced output, keeping it.");
        return Ok(output);
    }

    let stderr = output.stderr.trim();
    let message = if stderr.is_empty() {
        match output.exit_code {
            Some(code) => format!("{tool} exited with status {code}"),
            None => format!("{tool} was terminated by a signal"),
        }
    } else {
        stderr.to_string()
    };
    warn!(%tool, exit_code = ?output.exit_code, error = %message, "Tool failed without output.");
    Err(ScanError::ToolFailure { tool, message })
}
