//! Branch and toplevel resolution
//!
//! Works out which note file the user means from the command-line
//! arguments, git state and the notes already on disk.
//!
//! Toplevel rules, first match wins:
//!
//! 1. `--toplevel` given: use it verbatim.
//! 2. Current branch requested: basename of the git repository root.
//! 3. Branch named explicitly: search the notes tree for `<branch>.txt`.
//!    One hit is used, several hits are an error, no hit falls back to the
//!    git repository root.

use crate::error::{NotesError, Result};
use crate::git::Vcs;
use crate::store::NotesStore;
use lazy_static::lazy_static;
use regex::Regex;
use std::path::{Component, Path};

/// Branch argument meaning "the branch currently checked out"
pub const CURRENT_BRANCH: &str = "-";

/// Suggestion attached to git failures that `--toplevel` would avoid
const TOPLEVEL_HINT: &str = "\nTry specifying '--toplevel'.";

/// The branch the user asked for
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BranchArg {
    /// Ask git for the checked-out branch
    Current,
    /// Use this name as-is
    Named(String),
}

impl BranchArg {
    /// Interpret a positional argument; `None` and `-` mean the current branch
    pub fn parse(arg: Option<&str>) -> Self {
        match arg {
            None | Some(CURRENT_BRANCH) => BranchArg::Current,
            Some(name) => BranchArg::Named(name.to_string()),
        }
    }
}

/// Where a note lives, relative to the notes root
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NoteLocation {
    pub toplevel: String,
    pub branch: String,
}

lazy_static! {
    static ref BRANCH_PREFIX: Regex = Regex::new(r"^p4/(tasks|spfw)/").unwrap();
}

/// Strip the `p4/tasks/` or `p4/spfw/` namespace from a git branch name
pub fn normalize_branch(branch: &str) -> String {
    BRANCH_PREFIX.replace(branch, "").into_owned()
}

/// Reject branch names that would place the note outside its toplevel
fn check_branch(branch: &str) -> Result<()> {
    let escapes = Path::new(branch)
        .components()
        .any(|c| !matches!(c, Component::Normal(_) | Component::CurDir));
    if branch.is_empty() || escapes {
        return Err(NotesError::InvalidBranch {
            branch: branch.to_string(),
        });
    }
    Ok(())
}

/// Resolves branch and toplevel against a notes store and a git backend
pub struct Resolver<'a, V: Vcs> {
    store: &'a NotesStore,
    vcs: &'a V,
}

impl<'a, V: Vcs> Resolver<'a, V> {
    pub fn new(store: &'a NotesStore, vcs: &'a V) -> Self {
        Self { store, vcs }
    }

    /// Branch name the note is stored under
    pub fn resolve_branch(&self, arg: &BranchArg) -> Result<String> {
        let branch = match arg {
            BranchArg::Named(name) => name.clone(),
            BranchArg::Current => {
                let raw = self.vcs.current_branch()?;
                let branch = normalize_branch(&raw);
                if branch != raw {
                    log::debug!("normalized branch '{}' to '{}'", raw, branch);
                }
                branch
            }
        };
        check_branch(&branch)?;
        Ok(branch)
    }

    /// Toplevel directory for `branch`
    pub fn resolve_toplevel(
        &self,
        explicit: Option<&str>,
        arg: &BranchArg,
        branch: &str,
    ) -> Result<String> {
        if let Some(toplevel) = explicit.filter(|t| !t.is_empty()) {
            log::debug!("using explicit toplevel '{}'", toplevel);
            return Ok(toplevel.to_string());
        }

        if *arg == BranchArg::Current {
            return self.repository_name();
        }

        let mut candidates = self.store.find_toplevels(branch)?;
        match candidates.len() {
            0 => {
                log::debug!("no note found for '{}', using the git toplevel", branch);
                self.repository_name()
            }
            1 => Ok(candidates.remove(0)),
            _ => Err(NotesError::AmbiguousToplevel {
                branch: branch.to_string(),
                candidates,
            }),
        }
    }

    /// Resolve both parts of the note location
    pub fn resolve(&self, explicit_toplevel: Option<&str>, arg: &BranchArg) -> Result<NoteLocation> {
        let branch = self.resolve_branch(arg)?;
        let toplevel = self.resolve_toplevel(explicit_toplevel, arg, &branch)?;
        log::debug!("resolved note '{}/{}'", toplevel, branch);
        Ok(NoteLocation { toplevel, branch })
    }

    /// Final path segment of the git repository root
    fn repository_name(&self) -> Result<String> {
        let root = self.vcs.toplevel().map_err(|e| match e {
            NotesError::VcsQueryFailed { what, message, .. } => NotesError::VcsQueryFailed {
                what,
                message,
                hint: TOPLEVEL_HINT.to_string(),
            },
            other => other,
        })?;

        root.file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .ok_or_else(|| NotesError::VcsQueryFailed {
                what: "toplevel",
                message: format!("'{}' has no directory name", root.display()),
                hint: TOPLEVEL_HINT.to_string(),
            })
    }
}
