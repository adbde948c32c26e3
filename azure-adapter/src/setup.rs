//! Agent directory resolution and CLI installation.

use crate::inputs::TaskEnvironment;
use anyhow::Context;
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use tokio::process::Command;

/// npm package installed when `claude` is missing on the agent.
pub const CLAUDE_CODE_PACKAGE: &str = "@anthropic-ai/claude-code@2.1.62";

/// Directories the agent provides for this job.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AgentDirs {
    /// Scratch space cleaned after the job; holds the pipe and logs.
    pub temp_dir: PathBuf,
    /// Root of the job's working tree.
    pub build_dir: PathBuf,
}

impl AgentDirs {
    /// Resolves `Agent.TempDirectory` and `Agent.BuildDirectory`, falling back
    /// to the OS temp directory and the current directory.
    pub fn resolve(env: &dyn TaskEnvironment) -> Self {
        let temp_dir = env
            .variable("Agent.TempDirectory")
            .map_or_else(std::env::temp_dir, PathBuf::from);
        let build_dir = env
            .variable("Agent.BuildDirectory")
            .map(PathBuf::from)
            .or_else(|| std::env::current_dir().ok())
            .unwrap_or_else(|| PathBuf::from("."));

        tracing::info!("Azure Agent Temp Directory: {}", temp_dir.display());
        tracing::info!("Azure Agent Build Directory: {}", build_dir.display());

        Self {
            temp_dir,
            build_dir,
        }
    }

    /// `RUNNER_TEMP` and `CLAUDE_WORKING_DIR` for the CLI's environment.
    #[must_use]
    pub fn exported_env(&self) -> BTreeMap<String, String> {
        BTreeMap::from([
            (
                "RUNNER_TEMP".to_string(),
                self.temp_dir.to_string_lossy().into_owned(),
            ),
            (
                "CLAUDE_WORKING_DIR".to_string(),
                self.build_dir.to_string_lossy().into_owned(),
            ),
        ])
    }
}

/// Installs the Claude CLI with npm unless `claude --version` already works.
/// A failed install is not retried.
pub async fn ensure_claude_installed(claude: &Path) -> anyhow::Result<()> {
    let probe = Command::new(claude).arg("--version").output().await;
    if let Ok(output) = probe {
        if output.status.success() {
            tracing::info!(
                "Claude Code is already installed ({})",
                String::from_utf8_lossy(&output.stdout).trim()
            );
            return Ok(());
        }
    }

    tracing::info!("Installing Claude Code...");
    let status = Command::new("npm")
        .args(["install", "-g", CLAUDE_CODE_PACKAGE])
        .status()
        .await
        .context("failed to run npm")?;
    anyhow::ensure!(status.success(), "npm install {CLAUDE_CODE_PACKAGE} exited with {status}");
    tracing::info!("Claude Code installed successfully");
    Ok(())
}
