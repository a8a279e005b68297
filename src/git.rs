//! Git queries
//!
//! The resolver only needs two answers from version control: the current
//! branch name and the repository root. Both go through the [`Vcs`] trait
//! so resolution can be tested without a repository.

use crate::error::{NotesError, Result};
use std::path::PathBuf;
use std::process::Command;

/// Version-control queries used during resolution
pub trait Vcs {
    /// Symbolic name of the checked-out branch
    ///
    /// Fails when not inside a repository or when HEAD is detached.
    fn current_branch(&self) -> Result<String>;

    /// Absolute path of the current repository's root
    fn toplevel(&self) -> Result<PathBuf>;
}

/// [`Vcs`] backed by the `git` command line
#[derive(Debug, Default, Clone)]
pub struct GitCli {
    /// Directory git runs in; the process working directory when `None`
    work_dir: Option<PathBuf>,
}

impl GitCli {
    pub fn new() -> Self {
        Self::default()
    }

    /// Run git queries from `dir` instead of the process working directory
    pub fn in_dir(dir: impl Into<PathBuf>) -> Self {
        Self {
            work_dir: Some(dir.into()),
        }
    }

    /// Run a git command and return its trimmed stdout
    fn output(&self, what: &'static str, args: &[&str]) -> Result<String> {
        let mut cmd = Command::new("git");
        cmd.args(args);
        if let Some(dir) = &self.work_dir {
            cmd.current_dir(dir);
        }

        log::debug!("running git {}", args.join(" "));
        let output = cmd.output().map_err(|e| NotesError::VcsQueryFailed {
            what,
            message: e.to_string(),
            hint: String::new(),
        })?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr).trim().to_string();
            let message = if stderr.is_empty() {
                format!("git {} exited with {}", args.join(" "), output.status)
            } else {
                stderr
            };
            return Err(NotesError::VcsQueryFailed {
                what,
                message,
                hint: String::new(),
            });
        }

        let stdout = String::from_utf8_lossy(&output.stdout).trim_end().to_string();
        if stdout.is_empty() {
            return Err(NotesError::VcsQueryFailed {
                what,
                message: format!("git {} printed nothing", args.join(" ")),
                hint: String::new(),
            });
        }
        Ok(stdout)
    }
}

impl Vcs for GitCli {
    fn current_branch(&self) -> Result<String> {
        self.output("branch", &["symbolic-ref", "--short", "HEAD"])
    }

    fn toplevel(&self) -> Result<PathBuf> {
        self.output("toplevel", &["rev-parse", "--show-toplevel"])
            .map(PathBuf::from)
    }
}
