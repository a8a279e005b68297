//! On-disk notes tree
//!
//! Layout:
//!
//! ```text
//! <root>/<toplevel>/<branch>.txt
//! <root>/ARCHIVE/<toplevel>/<branch>.txt
//! ```
//!
//! The `ARCHIVE` subtree is never visited by search or listing.

use crate::error::{NotesError, Result};
use crate::resolve::NoteLocation;
use std::collections::{BTreeMap, BTreeSet};
use std::path::{Component, Path, PathBuf};
use walkdir::{DirEntry, WalkDir};

/// Name of the archive directory directly under the notes root
pub const ARCHIVE_DIR: &str = "ARCHIVE";

/// File extension for note files, without the dot
pub const NOTES_EXT: &str = "txt";

/// One directory's worth of notes in a listing
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NoteGroup {
    /// Base name of the directory holding the notes
    pub name: String,
    /// Note names with the extension stripped, sorted
    pub notes: Vec<String>,
}

/// The notes tree rooted at the configured notes directory
#[derive(Debug, Clone)]
pub struct NotesStore {
    root: PathBuf,
}

impl NotesStore {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Path of the active note for a location
    pub fn note_path(&self, location: &NoteLocation) -> PathBuf {
        self.root
            .join(&location.toplevel)
            .join(note_file_name(&location.branch))
    }

    /// Path the note is moved to when archived
    ///
    /// Archived notes sit flat under `ARCHIVE/<toplevel>`, so a branch
    /// like `feature/x` is archived as `x.txt`.
    pub fn archive_path(&self, location: &NoteLocation) -> PathBuf {
        let dir = self.root.join(ARCHIVE_DIR).join(&location.toplevel);
        match self.note_path(location).file_name() {
            Some(name) => dir.join(name),
            None => dir.join(note_file_name(&location.branch)),
        }
    }

    /// Walk `dir` recursively, pruning the archive subtree
    ///
    /// Yields every directory (including `dir` itself) with the regular
    /// files directly inside it. A missing `dir` yields nothing; an
    /// unreadable subdirectory is skipped.
    fn walk(&self, dir: &Path) -> Result<BTreeMap<PathBuf, Vec<String>>> {
        let mut dirs: BTreeMap<PathBuf, Vec<String>> = BTreeMap::new();
        if !dir.is_dir() {
            log::debug!("{} is not a directory, nothing to walk", dir.display());
            return Ok(dirs);
        }

        let walker = WalkDir::new(dir)
            .sort_by_file_name()
            .into_iter()
            .filter_entry(|e| !is_archive_dir(e));

        for entry in walker {
            let entry = match entry {
                Ok(entry) => entry,
                Err(e) if e.depth() > 0 => {
                    log::debug!("skipping unreadable entry: {}", e);
                    continue;
                }
                Err(e) => return Err(e.into()),
            };
            if entry.file_type().is_dir() {
                dirs.entry(entry.path().to_path_buf()).or_default();
            } else if is_note_file(&entry) {
                if let Some(parent) = entry.path().parent() {
                    dirs.entry(parent.to_path_buf())
                        .or_default()
                        .push(entry.file_name().to_string_lossy().into_owned());
                }
            }
        }
        Ok(dirs)
    }

    /// Toplevel names that hold a note for `branch`, sorted and deduplicated
    ///
    /// A branch containing `/` is matched as a nested path, so
    /// `feature/x` finds `<toplevel>/feature/x.txt`. Notes directly under
    /// the root have no toplevel and are ignored.
    pub fn find_toplevels(&self, branch: &str) -> Result<Vec<String>> {
        let target: Vec<String> = Path::new(&note_file_name(branch))
            .components()
            .filter_map(|c| match c {
                Component::Normal(s) => Some(s.to_string_lossy().into_owned()),
                _ => None,
            })
            .collect();
        let Some(file_name) = target.last() else {
            return Ok(Vec::new());
        };

        let mut found = BTreeSet::new();
        for (dir, files) in self.walk(&self.root)? {
            if !files.iter().any(|f| f == file_name) {
                continue;
            }
            let rel = match dir.strip_prefix(&self.root) {
                Ok(rel) => rel,
                Err(_) => continue,
            };
            let mut parts: Vec<String> = rel
                .components()
                .map(|c| c.as_os_str().to_string_lossy().into_owned())
                .collect();
            parts.push(file_name.clone());

            // the toplevel is the directory right above the branch components
            if parts.len() > target.len() && parts.ends_with(&target) {
                let toplevel = &parts[parts.len() - target.len() - 1];
                log::debug!("found note for '{}' under '{}'", branch, toplevel);
                found.insert(toplevel.clone());
            }
        }
        Ok(found.into_iter().collect())
    }

    /// Group existing notes by directory
    ///
    /// Restricted to `<root>/<toplevel>` when a toplevel is given. Dotfiles
    /// and files without the notes extension are skipped, as are
    /// directories left with no notes.
    pub fn list(&self, toplevel: Option<&str>) -> Result<Vec<NoteGroup>> {
        let base = match toplevel.filter(|t| !t.is_empty()) {
            Some(t) => self.root.join(t),
            None => self.root.clone(),
        };

        let mut groups = Vec::new();
        for (dir, files) in self.walk(&base)? {
            let mut notes: Vec<String> = files
                .iter()
                .filter(|f| !f.starts_with('.'))
                .filter_map(|f| {
                    let path = Path::new(f);
                    match path.extension() {
                        Some(ext) if ext == NOTES_EXT => path
                            .file_stem()
                            .map(|s| s.to_string_lossy().into_owned()),
                        _ => None,
                    }
                })
                .collect();
            if notes.is_empty() {
                continue;
            }
            notes.sort();

            let name = dir
                .file_name()
                .map(|n| n.to_string_lossy().into_owned())
                .unwrap_or_else(|| dir.display().to_string());
            groups.push(NoteGroup { name, notes });
        }
        Ok(groups)
    }

    /// Create the directory the note lives in; existing content is untouched
    pub fn ensure_note_dir(&self, location: &NoteLocation) -> Result<PathBuf> {
        let path = self.note_path(location);
        if let Some(dir) = path.parent() {
            std::fs::create_dir_all(dir)?;
        }
        Ok(path)
    }

    /// Move a note into the archive subtree
    ///
    /// Returns the archived path. Fails with `NoteNotFound`, changing
    /// nothing, when the note does not exist.
    pub fn archive(&self, location: &NoteLocation) -> Result<PathBuf> {
        let source = self.note_path(location);
        if !source.is_file() {
            return Err(NotesError::NoteNotFound { path: source });
        }

        let dest = self.archive_path(location);
        if let Some(dir) = dest.parent() {
            std::fs::create_dir_all(dir)?;
        }
        log::debug!("archiving {} -> {}", source.display(), dest.display());
        std::fs::rename(&source, &dest)?;
        Ok(dest)
    }
}

fn is_archive_dir(entry: &DirEntry) -> bool {
    entry.depth() > 0 && entry.file_type().is_dir() && entry.file_name() == ARCHIVE_DIR
}

/// Regular files, and symlinks that point at one
fn is_note_file(entry: &DirEntry) -> bool {
    entry.file_type().is_file() || (entry.path_is_symlink() && entry.path().is_file())
}

/// `<branch>.txt`
pub fn note_file_name(branch: &str) -> String {
    format!("{}.{}", branch, NOTES_EXT)
}

/// Render a listing the way `branch-notes list` prints it
///
/// Each group is a `name:` header, one indented line per note, then a
/// blank line.
pub fn format_listing(groups: &[NoteGroup]) -> String {
    let mut out = String::new();
    for group in groups {
        out.push_str(&group.name);
        out.push_str(":\n");
        for note in &group.notes {
            out.push_str("    ");
            out.push_str(note);
            out.push('\n');
        }
        out.push('\n');
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    fn write(root: &Path, rel: &str, content: &str) {
        let path = root.join(rel);
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(path, content).unwrap();
    }

    fn loc(toplevel: &str, branch: &str) -> NoteLocation {
        NoteLocation {
            toplevel: toplevel.to_string(),
            branch: branch.to_string(),
        }
    }

    #[test]
    fn test_paths() {
        let store = NotesStore::new("/notes");
        let l = loc("proj", "fix-123");
        assert_eq!(store.note_path(&l), PathBuf::from("/notes/proj/fix-123.txt"));
        assert_eq!(
            store.archive_path(&l),
            PathBuf::from("/notes/ARCHIVE/proj/fix-123.txt")
        );
    }

    #[test]
    fn test_find_unique_and_ambiguous() {
        let tmp = TempDir::new().unwrap();
        write(tmp.path(), "projA/x.txt", "a");
        write(tmp.path(), "projB/x.txt", "b");
        write(tmp.path(), "projA/y.txt", "y");
        let store = NotesStore::new(tmp.path());

        assert_eq!(store.find_toplevels("x").unwrap(), vec!["projA", "projB"]);
        assert_eq!(store.find_toplevels("y").unwrap(), vec!["projA"]);
        assert!(store.find_toplevels("z").unwrap().is_empty());
    }

    #[test]
    fn test_find_skips_archive() {
        let tmp = TempDir::new().unwrap();
        write(tmp.path(), "ARCHIVE/projB/x.txt", "old");
        write(tmp.path(), "projA/x.txt", "a");
        let store = NotesStore::new(tmp.path());

        assert_eq!(store.find_toplevels("x").unwrap(), vec!["projA"]);
    }

    #[test]
    fn test_find_nested_branch_name() {
        let tmp = TempDir::new().unwrap();
        write(tmp.path(), "projA/feature/x.txt", "a");
        write(tmp.path(), "projB/x.txt", "b");
        let store = NotesStore::new(tmp.path());

        assert_eq!(store.find_toplevels("feature/x").unwrap(), vec!["projA"]);
    }

    #[test]
    fn test_find_in_missing_root() {
        let tmp = TempDir::new().unwrap();
        let store = NotesStore::new(tmp.path().join("nope"));
        assert!(store.find_toplevels("x").unwrap().is_empty());
    }

    #[test]
    fn test_list_groups_and_filters() {
        let tmp = TempDir::new().unwrap();
        write(tmp.path(), "projB/zeta.txt", "");
        write(tmp.path(), "projB/alpha.txt", "");
        write(tmp.path(), "projA/main.txt", "");
        write(tmp.path(), "projA/.hidden.txt", "");
        write(tmp.path(), "projA/scratch.md", "");
        write(tmp.path(), "empty/.keep", "");
        write(tmp.path(), "ARCHIVE/projA/old.txt", "");
        let store = NotesStore::new(tmp.path());

        let groups = store.list(None).unwrap();
        assert_eq!(
            groups,
            vec![
                NoteGroup {
                    name: "projA".to_string(),
                    notes: vec!["main".to_string()],
                },
                NoteGroup {
                    name: "projB".to_string(),
                    notes: vec!["alpha".to_string(), "zeta".to_string()],
                },
            ]
        );
    }

    #[test]
    fn test_list_scoped_to_toplevel() {
        let tmp = TempDir::new().unwrap();
        write(tmp.path(), "projA/main.txt", "");
        write(tmp.path(), "projB/other.txt", "");
        let store = NotesStore::new(tmp.path());

        let groups = store.list(Some("projB")).unwrap();
        assert_eq!(groups.len(), 1);
        assert_eq!(groups[0].name, "projB");

        assert!(store.list(Some("missing")).unwrap().is_empty());
    }

    #[test]
    fn test_format_listing() {
        let groups = vec![NoteGroup {
            name: "proj".to_string(),
            notes: vec!["a".to_string(), "b".to_string()],
        }];
        assert_eq!(format_listing(&groups), "proj:\n    a\n    b\n\n");
        assert_eq!(format_listing(&[]), "");
    }

    #[test]
    fn test_archive_moves_note() {
        let tmp = TempDir::new().unwrap();
        write(tmp.path(), "proj/topic.txt", "keep me\n");
        let store = NotesStore::new(tmp.path());
        let l = loc("proj", "topic");

        let dest = store.archive(&l).unwrap();
        assert_eq!(dest, tmp.path().join("ARCHIVE/proj/topic.txt"));
        assert!(!store.note_path(&l).exists());
        assert_eq!(fs::read_to_string(&dest).unwrap(), "keep me\n");
        assert!(store.list(None).unwrap().is_empty());
    }

    #[test]
    fn test_archive_nested_branch_is_flat() {
        let tmp = TempDir::new().unwrap();
        write(tmp.path(), "proj/feature/x.txt", "nested\n");
        let store = NotesStore::new(tmp.path());

        let dest = store.archive(&loc("proj", "feature/x")).unwrap();
        assert_eq!(dest, tmp.path().join("ARCHIVE/proj/x.txt"));
        assert_eq!(fs::read_to_string(&dest).unwrap(), "nested\n");
        assert!(!tmp.path().join("proj/feature/x.txt").exists());
    }

    #[cfg(unix)]
    #[test]
    fn test_walk_skips_unreadable_dir() {
        use std::os::unix::fs::PermissionsExt;

        let tmp = TempDir::new().unwrap();
        write(tmp.path(), "projA/x.txt", "a");
        write(tmp.path(), "locked/y.txt", "b");
        let locked = tmp.path().join("locked");
        fs::set_permissions(&locked, fs::Permissions::from_mode(0o000)).unwrap();

        // root ignores permissions, so there is nothing to check
        if fs::read_dir(&locked).is_ok() {
            fs::set_permissions(&locked, fs::Permissions::from_mode(0o755)).unwrap();
            return;
        }

        let store = NotesStore::new(tmp.path());
        let found = store.find_toplevels("x");
        let groups = store.list(None);
        fs::set_permissions(&locked, fs::Permissions::from_mode(0o755)).unwrap();

        assert_eq!(found.unwrap(), vec!["projA"]);
        let groups = groups.unwrap();
        assert_eq!(groups.len(), 1);
        assert_eq!(groups[0].name, "projA");
    }

    #[cfg(unix)]
    #[test]
    fn test_symlinked_note_is_listed() {
        let tmp = TempDir::new().unwrap();
        write(tmp.path(), "elsewhere.md", "real note");
        fs::create_dir_all(tmp.path().join("proj")).unwrap();
        std::os::unix::fs::symlink(
            tmp.path().join("elsewhere.md"),
            tmp.path().join("proj/linked.txt"),
        )
        .unwrap();
        let store = NotesStore::new(tmp.path());

        let groups = store.list(Some("proj")).unwrap();
        assert_eq!(groups[0].notes, vec!["linked"]);
        assert_eq!(store.find_toplevels("linked").unwrap(), vec!["proj"]);
    }

    #[test]
    fn test_list_empty_toplevel_lists_everything() {
        let tmp = TempDir::new().unwrap();
        write(tmp.path(), "projA/a.txt", "");
        let store = NotesStore::new(tmp.path());

        assert_eq!(store.list(Some("")).unwrap(), store.list(None).unwrap());
    }

    #[test]
    fn test_archive_missing_note() {
        let tmp = TempDir::new().unwrap();
        let store = NotesStore::new(tmp.path());

        let err = store.archive(&loc("proj", "nothing")).unwrap_err();
        assert!(matches!(err, NotesError::NoteNotFound { .. }));
        assert!(!tmp.path().join(ARCHIVE_DIR).exists());
    }

    #[test]
    fn test_ensure_note_dir_keeps_content() {
        let tmp = TempDir::new().unwrap();
        write(tmp.path(), "proj/topic.txt", "existing");
        let store = NotesStore::new(tmp.path());

        let path = store.ensure_note_dir(&loc("proj", "topic")).unwrap();
        assert_eq!(fs::read_to_string(path).unwrap(), "existing");

        let path = store.ensure_note_dir(&loc("fresh", "topic")).unwrap();
        assert!(path.parent().unwrap().is_dir());
        assert!(!path.exists());
    }
}
