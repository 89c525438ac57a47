//! Filesystem layout manager.
//!
//! Owns the physical directory/file shape of the root and of each
//! repository, repairing drift rather than failing on it:
//!
//! ```text
//! <root>/.zettelConfig            repo list + current repo
//! <root>/tags.txt                 global tag registry
//! <root>/<repo>/index.txt         one record per note
//! <root>/<repo>/notes/<file>      active note bodies
//! <root>/<repo>/archive/<file>    archived note bodies
//! ```

use std::collections::HashSet;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use tracing::warn;

pub const CONFIG_FILE: &str = ".zettelConfig";
pub const TAGS_FILE: &str = "tags.txt";
pub const INDEX_FILE: &str = "index.txt";
pub const NOTES_DIR: &str = "notes";
pub const ARCHIVE_DIR: &str = "archive";
pub const DEFAULT_REPO: &str = "main";

pub struct Layout {
    root: PathBuf,
}

impl Layout {
    pub fn new(root: PathBuf) -> Self {
        Self { root }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn config_path(&self) -> PathBuf {
        self.root.join(CONFIG_FILE)
    }

    pub fn tags_path(&self) -> PathBuf {
        self.root.join(TAGS_FILE)
    }

    pub fn repo_dir(&self, repo: &str) -> PathBuf {
        self.root.join(repo)
    }

    pub fn index_path(&self, repo: &str) -> PathBuf {
        self.repo_dir(repo).join(INDEX_FILE)
    }

    pub fn notes_dir(&self, repo: &str) -> PathBuf {
        self.repo_dir(repo).join(NOTES_DIR)
    }

    pub fn archive_dir(&self, repo: &str) -> PathBuf {
        self.repo_dir(repo).join(ARCHIVE_DIR)
    }

    pub fn note_path(&self, repo: &str, filename: &str, archived: bool) -> PathBuf {
        if archived {
            self.archive_dir(repo).join(filename)
        } else {
            self.notes_dir(repo).join(filename)
        }
    }

    /// Create the root directory and config if absent. A fresh config
    /// names the default repository as both the known list and the
    /// current repository. Failure here is fatal: nothing else can be
    /// trusted without a root.
    pub fn ensure_root(&self) -> io::Result<()> {
        fs::create_dir_all(&self.root)?;
        let config = self.config_path();
        if !config.exists() {
            fs::write(&config, format!("{}\n{}\n", DEFAULT_REPO, DEFAULT_REPO))?;
        }
        Ok(())
    }

    /// Create `notes/`, `archive/` and the index file when missing.
    /// Idempotent; returns whether anything had to be created.
    pub fn ensure_repository(&self, repo: &str) -> io::Result<bool> {
        let mut created = false;
        for dir in [self.notes_dir(repo), self.archive_dir(repo)] {
            if !dir.is_dir() {
                fs::create_dir_all(&dir)?;
                created = true;
            }
        }
        let index = self.index_path(repo);
        if !index.is_file() {
            fs::write(&index, "")?;
            created = true;
        }
        Ok(created)
    }

    /// Repair drift between the index and the body files.
    ///
    /// Every filename the index claims to own gets an empty placeholder
    /// if its file is missing, so subsequent loads do not crash. Then
    /// the notes directory is scanned for `.txt` files the index does
    /// not reference; those are reported as orphans but never deleted.
    pub fn validate(&self, repo: &str, expected: &[(String, bool)]) -> Vec<String> {
        for (filename, archived) in expected {
            let path = self.note_path(repo, filename, *archived);
            if !path.is_file() {
                warn!(repo, file = %filename, "index references a missing body file, creating placeholder");
                if let Err(e) = fs::write(&path, "") {
                    warn!(repo, file = %filename, error = %e, "could not create placeholder");
                }
            }
        }

        let known: HashSet<&str> = expected.iter().map(|(f, _)| f.as_str()).collect();
        let mut orphans = Vec::new();
        match fs::read_dir(self.notes_dir(repo)) {
            Ok(entries) => {
                for entry in entries.flatten() {
                    let path = entry.path();
                    if path.extension().map_or(false, |e| e == "txt") {
                        if let Some(name) = path.file_name().and_then(|n| n.to_str()) {
                            if !known.contains(name) {
                                orphans.push(name.to_string());
                            }
                        }
                    }
                }
            }
            Err(e) => warn!(repo, error = %e, "could not scan notes directory"),
        }
        orphans.sort();
        if !orphans.is_empty() {
            warn!(repo, count = orphans.len(), "found body files not referenced by the index");
        }
        orphans
    }

    /// Write (overwriting) a note's body file into the directory
    /// matching its archived state.
    pub fn write_note_file(
        &self,
        repo: &str,
        filename: &str,
        body: &str,
        archived: bool,
    ) -> io::Result<()> {
        fs::write(self.note_path(repo, filename, archived), body)
    }

    /// Read a note's body. A missing or unreadable file yields an empty
    /// body rather than a failure.
    pub fn read_note_file(&self, repo: &str, filename: &str, archived: bool) -> String {
        let path = self.note_path(repo, filename, archived);
        match fs::read_to_string(&path) {
            Ok(body) => body,
            Err(e) => {
                warn!(repo, file = %filename, error = %e, "could not read body file, using empty body");
                String::new()
            }
        }
    }

    /// Relocate a body file between `notes/` and `archive/`.
    pub fn move_note_file(&self, repo: &str, filename: &str, to_archive: bool) -> io::Result<()> {
        let from = self.note_path(repo, filename, !to_archive);
        let to = self.note_path(repo, filename, to_archive);
        fs::rename(from, to)
    }

    pub fn delete_note_file(&self, repo: &str, filename: &str, archived: bool) -> io::Result<()> {
        fs::remove_file(self.note_path(repo, filename, archived))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_ensure_root_writes_default_config() {
        let dir = tempdir().unwrap();
        let layout = Layout::new(dir.path().join("zettel"));
        layout.ensure_root().unwrap();
        let config = fs::read_to_string(layout.config_path()).unwrap();
        assert_eq!(config, format!("{}\n{}\n", DEFAULT_REPO, DEFAULT_REPO));
    }

    #[test]
    fn test_ensure_repository_is_idempotent() {
        let dir = tempdir().unwrap();
        let layout = Layout::new(dir.path().to_path_buf());
        layout.ensure_root().unwrap();
        assert!(layout.ensure_repository("work").unwrap());
        assert!(!layout.ensure_repository("work").unwrap());
        assert!(layout.notes_dir("work").is_dir());
        assert!(layout.archive_dir("work").is_dir());
        assert!(layout.index_path("work").is_file());
    }

    #[test]
    fn test_validate_creates_placeholders() {
        let dir = tempdir().unwrap();
        let layout = Layout::new(dir.path().to_path_buf());
        layout.ensure_root().unwrap();
        layout.ensure_repository("work").unwrap();

        let expected = vec![("ideas.txt".to_string(), false), ("old.txt".to_string(), true)];
        let orphans = layout.validate("work", &expected);
        assert!(orphans.is_empty());
        assert!(layout.note_path("work", "ideas.txt", false).is_file());
        assert!(layout.note_path("work", "old.txt", true).is_file());
    }

    #[test]
    fn test_validate_reports_orphans() {
        let dir = tempdir().unwrap();
        let layout = Layout::new(dir.path().to_path_buf());
        layout.ensure_root().unwrap();
        layout.ensure_repository("work").unwrap();
        fs::write(layout.note_path("work", "stray.txt", false), "lost").unwrap();
        fs::write(layout.notes_dir("work").join("notes.md"), "ignored").unwrap();

        let orphans = layout.validate("work", &[]);
        assert_eq!(orphans, vec!["stray.txt"]);
        // Orphans are reported, never deleted.
        assert!(layout.note_path("work", "stray.txt", false).is_file());
    }

    #[test]
    fn test_move_note_file() {
        let dir = tempdir().unwrap();
        let layout = Layout::new(dir.path().to_path_buf());
        layout.ensure_root().unwrap();
        layout.ensure_repository("work").unwrap();
        layout.write_note_file("work", "ideas.txt", "brainstorm", false).unwrap();

        layout.move_note_file("work", "ideas.txt", true).unwrap();
        assert!(!layout.note_path("work", "ideas.txt", false).exists());
        assert_eq!(layout.read_note_file("work", "ideas.txt", true), "brainstorm");

        layout.move_note_file("work", "ideas.txt", false).unwrap();
        assert_eq!(layout.read_note_file("work", "ideas.txt", false), "brainstorm");
    }
}
