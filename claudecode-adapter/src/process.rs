//! Subprocess execution with piped prompt delivery, streamed JSON capture,
//! and timeout-driven termination.

use crate::cmd::prepare_invocation;
use crate::discovery::resolve_claude;
use crate::error::ClaudeError;
use crate::execution_log::{save_execution_log, EXECUTION_LOG_FILE};
use crate::fifo::{feed_pipe, PromptPipe};
use crate::types::{
    Conclusion, PreparedInvocation, RunOptions, RunResult, RuntimeContext, Settlement,
};
use std::io::Write;
use std::path::Path;
use std::process::Stdio;
use std::sync::Arc;
use std::time::Duration;
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::process::{Child, ChildStdout, Command};
use tokio::sync::Mutex;
use tokio::task::JoinHandle;
use tokio::time::timeout;

const GRACE_PERIOD: Duration = Duration::from_secs(5);

/// Validates `options`, runs the CLI once with the prompt streamed from
/// `prompt_path`, and persists the execution log.
///
/// # Errors
///
/// Only configuration problems found before anything is spawned: invalid
/// numeric options or a prompt pipe that cannot be created. Spawn failures,
/// non-zero exits and timeouts are reported through [`RunResult`].
pub async fn run_claude(
    prompt_path: &Path,
    options: &RunOptions,
    runtime: &RuntimeContext,
) -> Result<RunResult, ClaudeError> {
    let prepared = prepare_invocation(prompt_path, options)?;

    let claude_path = runtime
        .claude_path
        .clone()
        .unwrap_or_else(|| resolve_claude(None));

    run_prepared(&claude_path, &prepared, runtime).await
}

/// Runs an already validated invocation.
///
/// # Errors
///
/// Returns `ClaudeError::PipeSetup` if the prompt FIFO cannot be created.
pub async fn run_prepared(
    claude_path: &Path,
    prepared: &PreparedInvocation,
    runtime: &RuntimeContext,
) -> Result<RunResult, ClaudeError> {
    let tmp_dir = runtime.tmp_dir();
    let execution_file = tmp_dir.join(EXECUTION_LOG_FILE);
    let pipe = PromptPipe::create(&tmp_dir).await?;

    match tokio::fs::metadata(&prepared.prompt_path).await {
        Ok(meta) => tracing::info!("Prompt file size: {} bytes", meta.len()),
        Err(_) => tracing::info!("Prompt file size: unknown bytes"),
    }
    if !prepared.env.is_empty() {
        let keys: Vec<&str> = prepared.env.keys().map(String::as_str).collect();
        tracing::info!("Custom environment variables: {}", keys.join(", "));
    }
    tracing::info!(
        "Running Claude with prompt from file: {}",
        prepared.prompt_path.display()
    );

    let mut prompt_reader = spawn_logged(
        "prompt reader",
        Command::new("cat")
            .arg(&prepared.prompt_path)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::inherit()),
    );
    let prompt_stdout = prompt_reader.as_mut().and_then(|c| c.stdout.take());
    let feeder = tokio::spawn(feed_pipe(prompt_stdout, pipe.path().to_path_buf()));

    let mut pipe_reader = spawn_logged(
        "pipe reader",
        Command::new("cat")
            .arg(pipe.path())
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::inherit()),
    );

    let captured = Arc::new(Mutex::new(String::new()));
    let mut stdout_task: Option<JoinHandle<()>> = None;

    let settlement = match pipe_reader.as_mut().and_then(|c| c.stdout.take()) {
        None => {
            tracing::error!("Prompt pipe reader unavailable; not starting Claude");
            Settlement::SpawnError
        }
        Some(pipe_stdout) => match spawn_claude(claude_path, prepared, runtime, pipe_stdout) {
            Err(e) => {
                tracing::error!("Error spawning Claude process: {e}");
                Settlement::SpawnError
            }
            Ok(mut child) => {
                if let Some(stdout) = child.stdout.take() {
                    stdout_task = Some(tokio::spawn(stream_stdout(stdout, captured.clone())));
                }
                wait_with_timeout(&mut child, prepared.timeout).await
            }
        },
    };

    for (name, child) in [
        ("prompt reader", prompt_reader.as_mut()),
        ("pipe reader", pipe_reader.as_mut()),
    ] {
        if let Some(child) = child {
            terminate_quietly(name, child);
        }
    }
    if !feeder.is_finished() {
        pipe.release_writer();
        feeder.abort();
    }
    pipe.remove().await;

    if let Some(mut task) = stdout_task {
        if timeout(GRACE_PERIOD, &mut task).await.is_err() {
            tracing::warn!("Claude stdout still open after exit; discarding the remainder");
            task.abort();
        }
    }

    let output = std::mem::take(&mut *captured.lock().await);
    let execution_file = save_execution_log(&output, &execution_file).await;

    let exit_code = settlement.exit_code();
    let conclusion = Conclusion::from_exit_code(exit_code);

    if conclusion == Conclusion::Success {
        tracing::info!("Claude execution completed successfully");
        if let Some(file) = &execution_file {
            tracing::info!("Execution file: {}", file.display());
        }
    } else {
        tracing::error!("Claude execution failed");
    }

    Ok(RunResult {
        conclusion,
        execution_file,
        exit_code,
    })
}

fn spawn_logged(name: &str, cmd: &mut Command) -> Option<Child> {
    match cmd.spawn() {
        Ok(child) => Some(child),
        Err(e) => {
            tracing::error!("Error spawning {name}: {e}");
            None
        }
    }
}

/// Spawns the CLI with ambient, then custom, then runtime variables, each
/// layer overriding the previous one.
fn spawn_claude(
    claude_path: &Path,
    prepared: &PreparedInvocation,
    runtime: &RuntimeContext,
    stdin: ChildStdout,
) -> std::io::Result<Child> {
    let stdin: Stdio = stdin.try_into()?;

    let mut cmd = Command::new(claude_path);
    cmd.args(&prepared.args)
        .stdin(stdin)
        .stdout(Stdio::piped())
        .stderr(Stdio::inherit())
        .envs(&prepared.env)
        .envs(&runtime.extra_env)
        .kill_on_drop(true);

    if let Some(cwd) = &runtime.cwd {
        cmd.current_dir(cwd);
    }

    cmd.spawn()
}

/// Waits for the CLI to exit, terminating it when `limit` elapses first.
async fn wait_with_timeout(child: &mut Child, limit: Duration) -> Settlement {
    match timeout(limit, child.wait()).await {
        Ok(Ok(status)) => Settlement::Exited(exit_code_of(status)),
        Ok(Err(e)) => {
            tracing::error!("Claude process error: {e}");
            Settlement::SpawnError
        }
        Err(_) => {
            tracing::error!("Claude process timed out after {} seconds", limit.as_secs());
            graceful_shutdown(child).await;
            Settlement::TimedOut
        }
    }
}

#[cfg(unix)]
fn exit_code_of(status: std::process::ExitStatus) -> i32 {
    use std::os::unix::process::ExitStatusExt;

    status
        .code()
        .or_else(|| status.signal().map(|sig| 128 + sig))
        .unwrap_or(-1)
}

#[cfg(not(unix))]
fn exit_code_of(status: std::process::ExitStatus) -> i32 {
    status.code().unwrap_or(-1)
}

/// Reads stdout line by line, echoing JSON lines pretty-printed and anything
/// else verbatim, and appends every raw line to `captured`.
async fn stream_stdout(stdout: ChildStdout, captured: Arc<Mutex<String>>) {
    let mut reader = BufReader::new(stdout);
    let mut buf = Vec::new();

    loop {
        buf.clear();
        match reader.read_until(b'\n', &mut buf).await {
            Ok(0) => break,
            Ok(_) => {
                let text = String::from_utf8_lossy(&buf);
                let line = text.trim_end_matches(['\n', '\r']);
                if line.trim().is_empty() {
                    continue;
                }

                {
                    let mut out = std::io::stdout().lock();
                    let _ = writeln!(out, "{}", render_line(line));
                }

                let mut captured = captured.lock().await;
                captured.push_str(line);
                captured.push('\n');
            }
            Err(e) => {
                tracing::error!("Error reading Claude stdout: {e}");
                break;
            }
        }
    }
}

/// Pretty-prints `line` if it is JSON, otherwise returns it unchanged.
#[must_use]
pub fn render_line(line: &str) -> String {
    serde_json::from_str::<serde_json::Value>(line)
        .ok()
        .and_then(|value| serde_json::to_string_pretty(&value).ok())
        .unwrap_or_else(|| line.to_string())
}

/// `SIGTERM`, wait the grace period, then `SIGKILL`.
#[cfg(unix)]
async fn graceful_shutdown(child: &mut Child) {
    send_sigterm(child);

    match timeout(GRACE_PERIOD, child.wait()).await {
        Ok(Ok(_)) => {}
        Ok(Err(e)) => tracing::warn!("Failed waiting for Claude after SIGTERM: {e}"),
        Err(_) => {
            tracing::warn!("Claude still running after {GRACE_PERIOD:?}; sending SIGKILL");
            if let Err(e) = child.kill().await {
                tracing::warn!("Failed to SIGKILL Claude: {e}");
            }
        }
    }
}

/// Windows: immediate termination, no graceful shutdown for console processes.
#[cfg(not(unix))]
async fn graceful_shutdown(child: &mut Child) {
    if let Err(e) = child.kill().await {
        tracing::warn!("Failed to terminate Claude: {e}");
    }
}

#[cfg(unix)]
fn send_sigterm(child: &Child) -> bool {
    use nix::sys::signal::{self, Signal};
    use nix::unistd::Pid;

    let Some(pid) = child.id().and_then(|id| i32::try_from(id).ok()) else {
        return false;
    };
    signal::kill(Pid::from_raw(pid), Signal::SIGTERM).is_ok()
}

/// Best-effort stop of an auxiliary reader; it may already have exited.
fn terminate_quietly(name: &str, child: &mut Child) {
    #[cfg(unix)]
    let sent = send_sigterm(child);
    #[cfg(not(unix))]
    let sent = child.start_kill().is_ok();

    if sent {
        tracing::debug!("Sent SIGTERM to {name}");
    }
}
