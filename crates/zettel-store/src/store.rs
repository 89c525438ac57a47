//! Repository store: the single entry point hiding the codec and the
//! layout manager behind load/save/manage-repositories operations.

use crate::codec;
use crate::layout::{Layout, ARCHIVE_DIR, DEFAULT_REPO};
use crate::models::Note;
use std::fs;
use std::io;
use std::path::PathBuf;
use tracing::warn;

pub struct Store {
    layout: Layout,
    repos: Vec<String>,
    current: String,
}

impl Store {
    /// Establish the root, read the repo list and current pointer from
    /// the config, and validate every known repository best-effort (a
    /// broken repository is warned about, the rest still load).
    ///
    /// Only a root that cannot be established is fatal.
    pub fn init(root: PathBuf) -> io::Result<Self> {
        let layout = Layout::new(root);
        layout.ensure_root()?;

        let mut store = Self {
            layout,
            repos: vec![DEFAULT_REPO.to_string()],
            current: DEFAULT_REPO.to_string(),
        };

        let mut dirty = false;
        if let Some((repos, current)) = store.read_config() {
            store.repos = repos;
            store.current = current;
        } else {
            dirty = true;
        }
        if !store.repos.iter().any(|r| r == DEFAULT_REPO) {
            store.repos.insert(0, DEFAULT_REPO.to_string());
            dirty = true;
        }
        if !store.repos.contains(&store.current) {
            warn!(repo = %store.current, "current repository is unknown, falling back to the default");
            store.current = DEFAULT_REPO.to_string();
            dirty = true;
        }
        if dirty {
            store.write_config();
        }

        for repo in store.repos.clone() {
            if let Err(e) = store.layout.ensure_repository(&repo) {
                warn!(repo = %repo, error = %e, "could not ensure repository structure, skipping");
                continue;
            }
            let expected = store.expected_filenames(&repo);
            store.layout.validate(&repo, &expected);
        }
        Ok(store)
    }

    pub fn current_repository(&self) -> &str {
        &self.current
    }

    pub fn repo_list(&self) -> &[String] {
        &self.repos
    }

    /// Absolute path of a note's body file in the current repository.
    pub fn note_path(&self, note: &Note) -> PathBuf {
        self.layout.note_path(&self.current, &note.filename, note.archived)
    }

    /// Load the current repository: validate its structure, decode the
    /// index and attach each body. Never fails; anything unreadable
    /// degrades to an empty collection.
    pub fn load(&self) -> Vec<Note> {
        let repo = self.current.clone();
        let mut notes = self.read_index(&repo);
        let expected: Vec<(String, bool)> = notes
            .iter()
            .map(|n| (n.filename.clone(), n.archived))
            .collect();
        self.layout.validate(&repo, &expected);
        for note in &mut notes {
            note.body = self.layout.read_note_file(&repo, &note.filename, note.archived);
        }
        notes
    }

    /// Rewrite the whole index from the in-memory collection (full
    /// overwrite, never append: stale records for deleted notes must
    /// not linger), then re-validate so any newly referenced filename
    /// gets a placeholder.
    pub fn save(&self, notes: &[Note]) {
        let mut content = String::new();
        for note in notes {
            content.push_str(&codec::encode(note));
            content.push('\n');
        }
        if let Err(e) = fs::write(self.layout.index_path(&self.current), content) {
            warn!(repo = %self.current, error = %e, "could not write index file");
            return;
        }
        let expected: Vec<(String, bool)> = notes
            .iter()
            .map(|n| (n.filename.clone(), n.archived))
            .collect();
        self.layout.validate(&self.current, &expected);
    }

    /// Create a repository's structure and register its name.
    /// Idempotent both ways: re-creating structure is a no-op, and a
    /// name already in the list is not added twice.
    pub fn create_repository(&mut self, name: &str) -> bool {
        let created = match self.layout.ensure_repository(name) {
            Ok(created) => created,
            Err(e) => {
                warn!(repo = name, error = %e, "could not create repository structure");
                return false;
            }
        };
        if !self.repos.iter().any(|r| r == name) {
            self.repos.push(name.to_string());
            self.write_config();
        }
        created
    }

    /// Switch the current repository. An unknown name falls back to
    /// the default repository (warned, not an error).
    pub fn change_repository(&mut self, name: &str) {
        if self.repos.iter().any(|r| r == name) {
            self.current = name.to_string();
        } else {
            warn!(repo = name, "unknown repository, falling back to the default");
            self.current = DEFAULT_REPO.to_string();
        }
        self.write_config();
    }

    /// Current repository according to the config on disk. A missing
    /// or malformed config yields the default repository name; that is
    /// a deliberate fallback, not an error path.
    pub fn read_current_repository(&self) -> String {
        self.read_config()
            .map(|(_, current)| current)
            .unwrap_or_else(|| DEFAULT_REPO.to_string())
    }

    /// Global tag registry, one tag per line at the root. Shared across
    /// all repositories.
    pub fn load_tags(&self) -> Vec<String> {
        match fs::read_to_string(self.layout.tags_path()) {
            Ok(content) => content
                .lines()
                .map(str::trim)
                .filter(|l| !l.is_empty())
                .map(String::from)
                .collect(),
            Err(_) => Vec::new(),
        }
    }

    pub fn save_tags(&self, tags: &[String]) {
        let mut content = tags.join("\n");
        if !content.is_empty() {
            content.push('\n');
        }
        if let Err(e) = fs::write(self.layout.tags_path(), content) {
            warn!(error = %e, "could not write tag registry");
        }
    }

    /// Write a note's body file into the current repository.
    pub fn write_note_body(&self, note: &Note) {
        if let Err(e) =
            self.layout
                .write_note_file(&self.current, &note.filename, &note.body, note.archived)
        {
            warn!(file = %note.filename, error = %e, "could not write body file");
        }
    }

    /// Archive or unarchive: relocate the body file, then flip the
    /// note's flags (and its archive location identifier).
    pub fn set_archived(&self, note: &mut Note, archived: bool) {
        if note.archived == archived {
            return;
        }
        if let Err(e) = self
            .layout
            .move_note_file(&self.current, &note.filename, archived)
        {
            warn!(file = %note.filename, error = %e, "could not move body file");
        }
        note.set_archived(archived, archived.then(|| ARCHIVE_DIR.to_string()));
    }

    /// Remove a note's body file. Its index line disappears with the
    /// next `save` of the remaining collection.
    pub fn delete_note_body(&self, note: &Note) {
        if let Err(e) = self
            .layout
            .delete_note_file(&self.current, &note.filename, note.archived)
        {
            warn!(file = %note.filename, error = %e, "could not delete body file");
        }
    }

    fn read_index(&self, repo: &str) -> Vec<Note> {
        let content = match fs::read_to_string(self.layout.index_path(repo)) {
            Ok(content) => content,
            Err(e) => {
                warn!(repo, error = %e, "could not read index file, starting empty");
                return Vec::new();
            }
        };
        let mut notes = Vec::new();
        for (lineno, line) in content.lines().enumerate() {
            // Blank lines are not an error.
            if line.trim().is_empty() {
                continue;
            }
            match codec::decode(line) {
                Some(note) => notes.push(note),
                None => warn!(repo, line = lineno + 1, "skipping malformed index record"),
            }
        }
        notes
    }

    fn expected_filenames(&self, repo: &str) -> Vec<(String, bool)> {
        self.read_index(repo)
            .iter()
            .map(|n| (n.filename.clone(), n.archived))
            .collect()
    }

    fn read_config(&self) -> Option<(Vec<String>, String)> {
        let content = fs::read_to_string(self.layout.config_path()).ok()?;
        let mut lines = content.lines();
        let repos: Vec<String> = lines
            .next()?
            .split('|')
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(String::from)
            .collect();
        let current = lines.next()?.trim().to_string();
        if repos.is_empty() || current.is_empty() {
            return None;
        }
        Some((repos, current))
    }

    fn write_config(&self) {
        let content = format!("{}\n{}\n", self.repos.join("|"), self.current);
        if let Err(e) = fs::write(self.layout.config_path(), content) {
            warn!(error = %e, "could not write root config");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::generate_id;
    use tempfile::tempdir;

    fn fresh_store(dir: &std::path::Path) -> Store {
        Store::init(dir.join("zettel")).unwrap()
    }

    #[test]
    fn test_init_creates_default_repository() {
        let dir = tempdir().unwrap();
        let store = fresh_store(dir.path());
        assert_eq!(store.current_repository(), DEFAULT_REPO);
        assert_eq!(store.repo_list(), [DEFAULT_REPO.to_string()]);
        assert!(store.layout.index_path(DEFAULT_REPO).is_file());
    }

    #[test]
    fn test_create_note_survives_restart() {
        let dir = tempdir().unwrap();
        let mut store = fresh_store(dir.path());
        store.create_repository("work");
        store.change_repository("work");

        let note = Note::new("Ideas", "brainstorm", generate_id("Ideas"));
        store.write_note_body(&note);
        store.save(&[note]);

        // Restart: a new store over the same root.
        let mut store = fresh_store(dir.path());
        assert_eq!(store.read_current_repository(), "work");
        store.change_repository("work");
        let notes = store.load();
        assert_eq!(notes.len(), 1);
        assert_eq!(notes[0].title, "Ideas");
        assert_eq!(notes[0].body, "brainstorm");
        assert!(!notes[0].pinned);
        assert!(!notes[0].archived);
    }

    #[test]
    fn test_save_is_full_overwrite() {
        let dir = tempdir().unwrap();
        let store = fresh_store(dir.path());
        let note = Note::new("Ideas", "brainstorm", generate_id("Ideas"));
        store.write_note_body(&note);
        store.save(&[note]);
        assert_eq!(store.load().len(), 1);

        store.save(&[]);
        assert!(store.load().is_empty());
    }

    #[test]
    fn test_load_skips_malformed_lines() {
        let dir = tempdir().unwrap();
        let store = fresh_store(dir.path());
        let note = Note::new("Good", "kept", generate_id("Good"));
        store.write_note_body(&note);

        let mut content = codec::encode(&note);
        content.push('\n');
        content.push_str("missing|most|fields\n");
        content.push('\n'); // blank line, skipped silently
        fs::write(store.layout.index_path(DEFAULT_REPO), content).unwrap();

        let notes = store.load();
        assert_eq!(notes.len(), 1);
        assert_eq!(notes[0].title, "Good");
        assert_eq!(notes[0].body, "kept");
    }

    #[test]
    fn test_load_tolerates_missing_body_file() {
        let dir = tempdir().unwrap();
        let store = fresh_store(dir.path());
        let note = Note::new("Ideas", "brainstorm", generate_id("Ideas"));
        // Index written, body write skipped: load must placeholder it.
        store.save(&[note]);

        let notes = store.load();
        assert_eq!(notes.len(), 1);
        assert_eq!(notes[0].body, "");
        assert!(store.note_path(&notes[0]).is_file());
    }

    #[test]
    fn test_create_repository_is_idempotent() {
        let dir = tempdir().unwrap();
        let mut store = fresh_store(dir.path());
        assert!(store.create_repository("work"));
        assert!(!store.create_repository("work"));
        assert_eq!(
            store.repo_list(),
            [DEFAULT_REPO.to_string(), "work".to_string()]
        );
    }

    #[test]
    fn test_change_repository_falls_back_on_unknown_name() {
        let dir = tempdir().unwrap();
        let mut store = fresh_store(dir.path());
        store.create_repository("work");
        store.change_repository("work");
        assert_eq!(store.current_repository(), "work");

        store.change_repository("no-such-repo");
        assert_eq!(store.current_repository(), DEFAULT_REPO);
        assert_eq!(store.read_current_repository(), DEFAULT_REPO);
    }

    #[test]
    fn test_read_current_repository_defaults_when_config_is_broken() {
        let dir = tempdir().unwrap();
        let store = fresh_store(dir.path());
        fs::write(store.layout.config_path(), "only-one-line").unwrap();
        assert_eq!(store.read_current_repository(), DEFAULT_REPO);

        fs::remove_file(store.layout.config_path()).unwrap();
        assert_eq!(store.read_current_repository(), DEFAULT_REPO);
    }

    #[test]
    fn test_tag_registry_is_shared_across_repositories() {
        // tags.txt lives at the root, scoped to the whole installation,
        // while notes are per-repository. Pinned here as intended.
        let dir = tempdir().unwrap();
        let mut store = fresh_store(dir.path());
        store.save_tags(&["rust".to_string()]);

        store.create_repository("work");
        store.change_repository("work");
        assert_eq!(store.load_tags(), vec!["rust".to_string()]);

        store.change_repository(DEFAULT_REPO);
        assert_eq!(store.load_tags(), vec!["rust".to_string()]);
    }

    #[test]
    fn test_archive_moves_body_file() {
        let dir = tempdir().unwrap();
        let store = fresh_store(dir.path());
        let mut note = Note::new("Ideas", "brainstorm", generate_id("Ideas"));
        store.write_note_body(&note);

        store.set_archived(&mut note, true);
        assert!(note.archived);
        assert_eq!(note.archive_name.as_deref(), Some(ARCHIVE_DIR));
        assert_eq!(
            store.layout.read_note_file(DEFAULT_REPO, &note.filename, true),
            "brainstorm"
        );

        store.set_archived(&mut note, false);
        assert!(!note.archived);
        assert_eq!(note.archive_name, None);
        assert!(store.note_path(&note).is_file());
    }
}
