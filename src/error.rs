//! Error taxonomy for branch-notes
//!
//! Every failure ends the invocation with exit code 1; nothing is retried.

use std::path::PathBuf;
use thiserror::Error;

/// Error type for note resolution and note operations
#[derive(Debug, Error)]
pub enum NotesError {
    /// A required setting could not be determined
    #[error("{0}")]
    ConfigurationMissing(String),

    /// A git query failed to run or exited unsuccessfully
    #[error("Failed to determine git {what} from current dir: {message}{hint}")]
    VcsQueryFailed {
        what: &'static str,
        message: String,
        /// Empty, or a newline followed by a suggestion for the user
        hint: String,
    },

    /// The branch search matched notes under more than one toplevel
    #[error("More than one note found for branch '{branch}'. Specify one of the following toplevel directories: {}", .candidates.join(", "))]
    AmbiguousToplevel {
        branch: String,
        candidates: Vec<String>,
    },

    /// The branch name is empty or leaves its toplevel directory
    #[error("Invalid branch name '{branch}'.")]
    InvalidBranch { branch: String },

    #[error("Note '{}' does not exist.", .path.display())]
    NoteNotFound { path: PathBuf },

    /// The editor could not be started or did not exit cleanly
    #[error("Failed to run editor '{command}': {message}")]
    EditorLaunchFailed { command: String, message: String },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl From<walkdir::Error> for NotesError {
    fn from(e: walkdir::Error) -> Self {
        let message = e.to_string();
        NotesError::Io(
            e.into_io_error()
                .unwrap_or_else(|| std::io::Error::new(std::io::ErrorKind::Other, message)),
        )
    }
}

pub type Result<T> = std::result::Result<T, NotesError>;
