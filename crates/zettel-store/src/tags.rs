//! Global tag registry, kept in sync with per-note tag lists.
//!
//! The registry is ordered and case-sensitive: no implicit folding,
//! insertion order preserved for display.

use crate::error::{StoreError, StoreResult};
use crate::models::Note;

#[derive(Debug, Default, Clone)]
pub struct TagRegistry {
    tags: Vec<String>,
}

impl TagRegistry {
    pub fn new(tags: Vec<String>) -> Self {
        Self { tags }
    }

    pub fn tags(&self) -> &[String] {
        &self.tags
    }

    pub fn contains(&self, tag: &str) -> bool {
        self.tags.iter().any(|t| t == tag)
    }

    pub fn is_empty(&self) -> bool {
        self.tags.is_empty()
    }

    /// Register a new global tag.
    pub fn add_global(&mut self, tag: &str) -> StoreResult<()> {
        if self.contains(tag) {
            return Err(StoreError::TagExists(tag.to_string()));
        }
        self.tags.push(tag.to_string());
        Ok(())
    }

    /// Remove a tag from the registry and from every note holding it.
    ///
    /// Unless `forced`, the caller-supplied confirmation is consulted
    /// first; `Ok(false)` means the user declined and nothing changed.
    pub fn remove_global(
        &mut self,
        tag: &str,
        forced: bool,
        mut confirm: impl FnMut(&str) -> bool,
        notes: &mut [Note],
    ) -> StoreResult<bool> {
        if !self.contains(tag) {
            return Err(StoreError::TagNotFound(tag.to_string()));
        }
        if !forced {
            let prompt = format!("Remove tag '{}' from every note?", tag);
            if !confirm(&prompt) {
                return Ok(false);
            }
        }

        self.tags.retain(|t| t != tag);
        for note in notes.iter_mut() {
            if note.has_tag(tag) {
                note.tags.retain(|t| t != tag);
                note.touch();
            }
        }
        Ok(true)
    }

    /// Rename a tag everywhere. The registry keeps the old position;
    /// each holding note replaces old with new at the old tag's
    /// position in its own list.
    pub fn rename_global(&mut self, old: &str, new: &str, notes: &mut [Note]) -> StoreResult<()> {
        if !self.contains(old) {
            return Err(StoreError::TagNotFound(old.to_string()));
        }
        // Covers old == new as well: old being present means new is.
        if self.contains(new) {
            return Err(StoreError::TagAlreadyExists(new.to_string()));
        }

        if let Some(slot) = self.tags.iter_mut().find(|t| *t == old) {
            *slot = new.to_string();
        }
        for note in notes.iter_mut() {
            if let Some(slot) = note.tags.iter_mut().find(|t| *t == old) {
                *slot = new.to_string();
                note.touch();
            }
        }
        Ok(())
    }

    /// Tag one note, registering the tag globally when it is new.
    pub fn tag_note(&mut self, note: &mut Note, tag: &str) -> StoreResult<()> {
        if note.has_tag(tag) {
            return Err(StoreError::TagAlreadyOnNote(tag.to_string()));
        }
        note.tags.push(tag.to_string());
        note.touch();
        if !self.contains(tag) {
            self.tags.push(tag.to_string());
        }
        Ok(())
    }

    /// Remove a tag from one note only; the registry is untouched.
    pub fn untag_note(&self, note: &mut Note, tag: &str) -> StoreResult<()> {
        if !note.has_tag(tag) {
            return Err(StoreError::TagNotFound(tag.to_string()));
        }
        note.tags.retain(|t| t != tag);
        note.touch();
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tagged(title: &str, tags: &[&str]) -> Note {
        let mut note = Note::new(title, "", crate::generate_id(title));
        note.tags = tags.iter().map(|t| t.to_string()).collect();
        note
    }

    #[test]
    fn test_add_global_rejects_duplicates() {
        let mut registry = TagRegistry::default();
        registry.add_global("rust").unwrap();
        assert_eq!(
            registry.add_global("rust"),
            Err(StoreError::TagExists("rust".to_string()))
        );
        // Case-sensitive: no implicit folding.
        registry.add_global("Rust").unwrap();
        assert_eq!(registry.tags(), ["rust", "Rust"]);
    }

    #[test]
    fn test_rename_global_substitutes_everywhere() {
        let mut registry = TagRegistry::new(vec!["java".to_string(), "python".to_string()]);
        let mut notes = vec![tagged("A", &["java"]), tagged("B", &["java"])];

        registry.rename_global("java", "backend", &mut notes).unwrap();
        assert_eq!(registry.tags(), ["backend", "python"]);
        for note in &notes {
            assert_eq!(note.tags, vec!["backend"]);
            assert!(!note.has_tag("java"));
        }
    }

    #[test]
    fn test_rename_preserves_note_tag_position() {
        let mut registry = TagRegistry::new(vec!["java".to_string()]);
        let mut notes = vec![tagged("A", &["web", "java", "tools"])];

        registry.rename_global("java", "backend", &mut notes).unwrap();
        assert_eq!(notes[0].tags, vec!["web", "backend", "tools"]);
    }

    #[test]
    fn test_rename_global_failure_modes() {
        let mut registry = TagRegistry::new(vec!["java".to_string(), "web".to_string()]);
        let mut notes = Vec::new();
        assert_eq!(
            registry.rename_global("missing", "x", &mut notes),
            Err(StoreError::TagNotFound("missing".to_string()))
        );
        assert_eq!(
            registry.rename_global("java", "web", &mut notes),
            Err(StoreError::TagAlreadyExists("web".to_string()))
        );
        assert_eq!(
            registry.rename_global("java", "java", &mut notes),
            Err(StoreError::TagAlreadyExists("java".to_string()))
        );
    }

    #[test]
    fn test_remove_global_forced_strips_notes() {
        let mut registry = TagRegistry::new(vec!["java".to_string(), "web".to_string()]);
        let mut notes = vec![tagged("A", &["java", "web"]), tagged("B", &["java"])];

        let removed = registry
            .remove_global("java", true, |_| unreachable!("forced removal must not prompt"), &mut notes)
            .unwrap();
        assert!(removed);
        assert_eq!(registry.tags(), ["web"]);
        assert_eq!(notes[0].tags, vec!["web"]);
        assert!(notes[1].tags.is_empty());
    }

    #[test]
    fn test_remove_global_honors_declined_confirmation() {
        let mut registry = TagRegistry::new(vec!["java".to_string()]);
        let mut notes = vec![tagged("A", &["java"])];

        let removed = registry
            .remove_global("java", false, |_| false, &mut notes)
            .unwrap();
        assert!(!removed);
        assert_eq!(registry.tags(), ["java"]);
        assert_eq!(notes[0].tags, vec!["java"]);
    }

    #[test]
    fn test_remove_global_missing_tag() {
        let mut registry = TagRegistry::default();
        assert_eq!(
            registry.remove_global("ghost", true, |_| true, &mut []),
            Err(StoreError::TagNotFound("ghost".to_string()))
        );
    }

    #[test]
    fn test_tag_note_registers_new_tags() {
        let mut registry = TagRegistry::default();
        let mut note = tagged("A", &[]);

        registry.tag_note(&mut note, "rust").unwrap();
        assert_eq!(note.tags, vec!["rust"]);
        assert!(registry.contains("rust"));

        assert_eq!(
            registry.tag_note(&mut note, "rust"),
            Err(StoreError::TagAlreadyOnNote("rust".to_string()))
        );
    }

    #[test]
    fn test_untag_note_leaves_registry_alone() {
        let mut registry = TagRegistry::new(vec!["rust".to_string()]);
        let mut note = tagged("A", &["rust"]);

        registry.untag_note(&mut note, "rust").unwrap();
        assert!(note.tags.is_empty());
        assert!(registry.contains("rust"));

        assert_eq!(
            registry.untag_note(&mut note, "rust"),
            Err(StoreError::TagNotFound("rust".to_string()))
        );
    }
}
