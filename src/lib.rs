//! branch-notes - a text note per git branch
//!
//! Notes are plain files stored as `<notes root>/<toplevel>/<branch>.txt`,
//! where the toplevel is the project (usually the git repository name).
//! Archived notes move to `<notes root>/ARCHIVE/<toplevel>/`.
//!
//! # Quick Start
//!
//! ```no_run
//! use branch_notes::{BranchArg, GitCli, NotesStore, Resolver};
//!
//! let store = NotesStore::new("/home/dev/branch-notes");
//! let git = GitCli::new();
//! let resolver = Resolver::new(&store, &git);
//!
//! // The note for the checked-out branch of the current repository
//! let location = resolver.resolve(None, &BranchArg::Current).unwrap();
//! println!("{}", store.note_path(&location).display());
//! ```

pub mod config;
pub mod editor;
pub mod error;
pub mod git;
pub mod resolve;
pub mod store;

pub use config::Config;
pub use editor::EditorCommand;
pub use error::{NotesError, Result};
pub use git::{GitCli, Vcs};
pub use resolve::{normalize_branch, BranchArg, NoteLocation, Resolver, CURRENT_BRANCH};
pub use store::{format_listing, NoteGroup, NotesStore, ARCHIVE_DIR, NOTES_EXT};
