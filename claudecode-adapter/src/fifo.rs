//! Named-pipe delivery of the prompt to the CLI's standard input.
//!
//! The prompt file is read by one `cat` process and written into a FIFO; a
//! second `cat` reads the FIFO and its stdout becomes the CLI's stdin. The
//! CLI therefore sees an open-ended byte stream regardless of prompt size.

use crate::error::ClaudeError;
use std::io;
use std::path::{Path, PathBuf};
use tokio::io::AsyncWriteExt;
use tokio::process::ChildStdout;

/// File name of the prompt FIFO inside the run's temp directory.
pub const PROMPT_PIPE_FILE: &str = "claude_prompt_pipe";

/// A single-use FIFO, removed by [`PromptPipe::remove`].
#[derive(Debug)]
pub struct PromptPipe {
    path: PathBuf,
}

impl PromptPipe {
    /// Creates a fresh FIFO in `dir`, replacing any stale one.
    ///
    /// # Errors
    ///
    /// Returns `ClaudeError::PipeSetup` if the FIFO cannot be created and
    /// `ClaudeError::Unsupported` on platforms without named pipes.
    pub async fn create(dir: &Path) -> Result<Self, ClaudeError> {
        let path = dir.join(PROMPT_PIPE_FILE);

        match tokio::fs::remove_file(&path).await {
            Ok(()) => tracing::debug!(path = %path.display(), "Removed stale prompt pipe"),
            Err(e) if e.kind() == io::ErrorKind::NotFound => {}
            Err(e) => {
                return Err(ClaudeError::PipeSetup {
                    stage: "remove stale".to_string(),
                    source: e,
                })
            }
        }

        make_fifo(&path)?;
        Ok(Self { path })
    }

    /// Filesystem path of the FIFO.
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Opens and immediately closes a read end so that a writer still blocked
    /// in `open` can proceed. No-op when a reader is already attached.
    pub fn release_writer(&self) {
        #[cfg(unix)]
        {
            use nix::fcntl::OFlag;
            use std::os::unix::fs::OpenOptionsExt;

            let _ = std::fs::OpenOptions::new()
                .read(true)
                .custom_flags(OFlag::O_NONBLOCK.bits())
                .open(&self.path);
        }
    }

    /// Deletes the FIFO, ignoring errors.
    pub async fn remove(self) {
        if let Err(e) = tokio::fs::remove_file(&self.path).await {
            tracing::debug!(path = %self.path.display(), "Failed to remove prompt pipe: {e}");
        }
    }
}

#[cfg(unix)]
fn make_fifo(path: &Path) -> Result<(), ClaudeError> {
    use nix::sys::stat::Mode;

    nix::unistd::mkfifo(path, Mode::S_IRUSR | Mode::S_IWUSR).map_err(|e| {
        ClaudeError::PipeSetup {
            stage: "mkfifo".to_string(),
            source: io::Error::from(e),
        }
    })
}

#[cfg(not(unix))]
fn make_fifo(_path: &Path) -> Result<(), ClaudeError> {
    Err(ClaudeError::Unsupported)
}

/// Copies the prompt reader's output into the FIFO.
///
/// Opening the write end blocks until a reader attaches, so it runs on the
/// blocking pool. With no source the FIFO is opened and closed, which hands
/// the reader an immediate EOF.
pub async fn feed_pipe(source: Option<ChildStdout>, fifo: PathBuf) -> io::Result<u64> {
    let file = tokio::task::spawn_blocking(move || {
        std::fs::OpenOptions::new().write(true).open(fifo)
    })
    .await
    .map_err(io::Error::other)??;

    let Some(mut source) = source else {
        return Ok(0);
    };

    let mut sink = tokio::fs::File::from_std(file);
    let copied = tokio::io::copy(&mut source, &mut sink).await?;
    sink.flush().await?;
    Ok(copied)
}
