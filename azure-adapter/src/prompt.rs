//! Resolution of the prompt source into a file the runner can stream.

use anyhow::Context;
use std::path::{Path, PathBuf};

/// Subdirectory of the temp directory that holds inline prompts.
pub const PROMPT_DIR: &str = "claude-prompts";
/// File name used for inline prompts.
pub const PROMPT_FILE: &str = "claude-prompt.txt";

/// Returns a path to the prompt text.
///
/// An inline `prompt` is written under `tmp_dir`; a `prompt_file` is used in
/// place after checking that it exists. Validation guarantees exactly one is
/// set before this runs.
pub async fn prepare_prompt(
    prompt: Option<&str>,
    prompt_file: Option<&str>,
    tmp_dir: &Path,
) -> anyhow::Result<PathBuf> {
    if let Some(text) = prompt.filter(|p| !p.trim().is_empty()) {
        let dir = tmp_dir.join(PROMPT_DIR);
        tokio::fs::create_dir_all(&dir)
            .await
            .with_context(|| format!("failed to create {}", dir.display()))?;
        let path = dir.join(PROMPT_FILE);
        tokio::fs::write(&path, text)
            .await
            .with_context(|| format!("failed to write prompt to {}", path.display()))?;
        return Ok(path);
    }

    let file = prompt_file
        .filter(|f| !f.is_empty())
        .context("Either 'prompt' or 'prompt_file' input is required.")?;
    let path = PathBuf::from(file);
    let meta = tokio::fs::metadata(&path)
        .await
        .with_context(|| format!("Prompt file not found: {}", path.display()))?;
    anyhow::ensure!(meta.is_file(), "Prompt path is not a file: {}", path.display());
    Ok(path)
}
