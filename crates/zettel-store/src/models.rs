//! Data model for notes.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

/// Unique note identifier (8 lowercase hex characters).
pub type NoteId = String;

/// A saved note, including its link and tag sets. No I/O here.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Note {
    pub id: NoteId,
    pub title: String,
    pub body: String,
    /// Name of the on-disk body file. Derived from the title at
    /// creation, stable thereafter even if the title changes.
    pub filename: String,
    pub created_at: DateTime<Utc>,
    pub modified_at: DateTime<Utc>,
    pub pinned: bool,
    pub archived: bool,
    /// Archive location identifier while archived, `None` otherwise.
    pub archive_name: Option<String>,
    /// Ordered, duplicate-free. Insertion order is meaningful for display.
    pub tags: Vec<String>,
    pub outgoing_links: BTreeSet<NoteId>,
    pub incoming_links: BTreeSet<NoteId>,
    /// Append-only audit trail. Never mutated, never deduplicated.
    pub logs: Vec<String>,
}

impl Note {
    pub fn new(title: &str, body: &str, id: NoteId) -> Self {
        let now = Utc::now();
        let filename = derive_filename(title, &id);
        Self {
            id,
            title: title.to_string(),
            body: body.to_string(),
            filename,
            created_at: now,
            modified_at: now,
            pinned: false,
            archived: false,
            archive_name: None,
            tags: Vec::new(),
            outgoing_links: BTreeSet::new(),
            incoming_links: BTreeSet::new(),
            logs: Vec::new(),
        }
    }

    pub fn set_title(&mut self, title: &str) {
        self.title = title.to_string();
        self.touch();
    }

    pub fn set_body(&mut self, body: &str) {
        self.body = body.to_string();
        self.touch();
    }

    pub fn set_pinned(&mut self, pinned: bool) {
        self.pinned = pinned;
        self.touch();
    }

    pub fn set_archived(&mut self, archived: bool, archive_name: Option<String>) {
        self.archived = archived;
        self.archive_name = archive_name;
        self.touch();
    }

    /// Rename only the backing file. Deliberately does NOT touch
    /// `modified_at`: the note content is unchanged.
    pub fn rename_file(&mut self, filename: &str) {
        self.filename = filename.to_string();
    }

    pub fn append_log(&mut self, entry: &str) {
        self.logs.push(entry.to_string());
    }

    pub fn has_tag(&self, tag: &str) -> bool {
        self.tags.iter().any(|t| t == tag)
    }

    pub fn preview(&self, max_chars: usize) -> String {
        if self.body.chars().count() <= max_chars {
            self.body.clone()
        } else {
            let cut: String = self.body.chars().take(max_chars).collect();
            format!("{}...", cut)
        }
    }

    /// Bump the modification timestamp. Called by every setter and by
    /// the link/tag operations when they change this note's sets.
    pub fn touch(&mut self) {
        self.modified_at = Utc::now();
    }
}

/// Derive a body filename from a title: lowercased, runs of
/// non-alphanumerics collapsed to `-`, `.txt` extension. Falls back to
/// the note ID when the title has no usable characters.
pub fn derive_filename(title: &str, id: &str) -> String {
    let mut slug = String::new();
    let mut last_dash = true;
    for c in title.chars() {
        if c.is_ascii_alphanumeric() {
            slug.push(c.to_ascii_lowercase());
            last_dash = false;
        } else if !last_dash {
            slug.push('-');
            last_dash = true;
        }
    }
    let slug = slug.trim_end_matches('-');
    if slug.is_empty() {
        format!("note-{}.txt", id)
    } else {
        format!("{}.txt", slug)
    }
}
