//! Error kinds that end a replay run.

use std::io;
use std::path::PathBuf;
use thiserror::Error;

/// Errors surfaced by the replay core.
///
/// None of these are retried: each one is terminal for the run.
#[derive(Debug, Error)]
pub enum ReplayError {
    /// The script file does not exist. Raised before any session is created.
    #[error("script file not found: {}", .0.display())]
    ScriptNotFound(PathBuf),

    /// Three prompt probes produced three different values.
    #[error("failed to detect a stable prompt, probes returned {samples:?}")]
    PromptDetection { samples: [String; 3] },

    /// The shell answered the probes with nothing that could serve as a prompt.
    #[error("shell did not print a prompt")]
    EmptyPrompt,

    /// The pseudo-terminal was closed or the shell went away.
    #[error("shell session ended")]
    SessionEnded(#[source] Option<io::Error>),

    /// A script line could not be understood.
    #[error("line {line}: {message}")]
    Parse { line: usize, message: String },
}

impl ReplayError {
    pub(crate) fn ended(err: io::Error) -> Self {
        ReplayError::SessionEnded(Some(err))
    }

    /// True when the error means the shell session is gone.
    pub fn is_session_ended(&self) -> bool {
        matches!(self, ReplayError::SessionEnded(_))
    }
}
