//! Runtime configuration for branch-notes
//!
//! Built once in `main` from the environment and command-line flags, then
//! passed by reference. Nothing below `main` reads the environment.

use crate::error::{NotesError, Result};
use std::ffi::OsString;
use std::path::{Path, PathBuf};

/// Environment variable naming the notes directory
pub const NOTES_DIR_VARIABLE: &str = "NOTES_DIR";

/// Directory name under the home directory used when `NOTES_DIR` is unset
pub const DEFAULT_NOTES_DIR_NAME: &str = "branch-notes";

/// Environment variable naming the editor command
pub const EDITOR_VARIABLE: &str = "NOTES_EDITOR";

pub const FALLBACK_EDITOR: &str = "vi";

/// Resolved configuration
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    /// Base directory holding one subdirectory per toplevel
    pub notes_root: PathBuf,

    /// Editor command line, not yet split
    pub editor: String,
}

impl Config {
    /// Load config from the process environment plus the `--editor` flag
    pub fn from_env(editor_flag: Option<&str>) -> Result<Self> {
        let notes_dir = env_value(NOTES_DIR_VARIABLE, std::env::var_os(NOTES_DIR_VARIABLE))?;
        let editor = env_value(EDITOR_VARIABLE, std::env::var_os(EDITOR_VARIABLE))?;
        Self::from_sources(
            notes_dir.as_deref(),
            editor.as_deref(),
            editor_flag,
            dirs::home_dir().as_deref(),
        )
    }

    /// Build a config from explicit inputs
    ///
    /// Precedence for the editor is flag, then `NOTES_EDITOR`, then `vi`.
    /// The notes root is `NOTES_DIR` with `~` expanded, or
    /// `<home>/branch-notes`. Empty values count as unset.
    pub fn from_sources(
        notes_dir_var: Option<&str>,
        editor_var: Option<&str>,
        editor_flag: Option<&str>,
        home: Option<&Path>,
    ) -> Result<Self> {
        let notes_root = match notes_dir_var.filter(|v| !v.trim().is_empty()) {
            Some(dir) => expand_tilde(dir, home)?,
            None => home
                .map(|h| h.join(DEFAULT_NOTES_DIR_NAME))
                .ok_or_else(|| {
                    NotesError::ConfigurationMissing(format!(
                        "Cannot determine the notes directory: '{}' is not set and no home directory was found.",
                        NOTES_DIR_VARIABLE
                    ))
                })?,
        };

        let editor = editor_flag
            .filter(|e| !e.trim().is_empty())
            .or(editor_var.filter(|e| !e.trim().is_empty()))
            .unwrap_or(FALLBACK_EDITOR)
            .to_string();

        Ok(Self { notes_root, editor })
    }
}

/// A set environment variable must be valid UTF-8
fn env_value(name: &str, value: Option<OsString>) -> Result<Option<String>> {
    value
        .map(|v| {
            v.into_string().map_err(|_| {
                NotesError::ConfigurationMissing(format!("'{}' is not valid UTF-8.", name))
            })
        })
        .transpose()
}

/// Expand a leading `~` or `~/` to the home directory
///
/// `~user` forms are left untouched.
pub fn expand_tilde(path: &str, home: Option<&Path>) -> Result<PathBuf> {
    let rest = if path == "~" {
        ""
    } else if let Some(rest) = path.strip_prefix("~/") {
        rest
    } else {
        return Ok(PathBuf::from(path));
    };

    let home = home.ok_or_else(|| {
        NotesError::ConfigurationMissing(format!(
            "Cannot expand '~' in {}: no home directory was found.",
            NOTES_DIR_VARIABLE
        ))
    })?;
    Ok(if rest.is_empty() {
        home.to_path_buf()
    } else {
        home.join(rest)
    })
}
