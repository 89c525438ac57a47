//! Store error types.

use thiserror::Error;

/// Domain-rule violations raised to the caller.
///
/// Structural problems (missing body files, malformed index lines) are
/// never errors: the store recovers locally and emits a warning.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum StoreError {
    /// Note looked up by ID and missing.
    #[error("Note not found: {0}")]
    NoteNotFound(String),

    /// Repository looked up by name and missing.
    #[error("Repository not found: {0}")]
    RepoNotFound(String),

    /// The directed edge already exists.
    #[error("Notes are already linked: {0} -> {1}")]
    AlreadyLinked(String, String),

    /// The edge to remove does not exist.
    #[error("Notes are not linked: {0} and {1}")]
    NotLinked(String, String),

    /// A note may not link to itself.
    #[error("A note cannot be linked to itself")]
    SelfLink,

    /// The requested link set is empty.
    #[error("Note {0} has no {1} links")]
    NoLinks(String, String),

    /// Every entry in the link set points at a note no longer present.
    #[error("All {1} links of note {0} point at missing notes")]
    DanglingLinks(String, String),

    /// Tag already present in the global registry.
    #[error("Tag already exists: {0}")]
    TagExists(String),

    /// Tag absent from the global registry.
    #[error("Tag not found: {0}")]
    TagNotFound(String),

    /// Rename target already taken.
    #[error("Tag already exists: {0}")]
    TagAlreadyExists(String),

    /// The note already carries this tag.
    #[error("Note already has tag: {0}")]
    TagAlreadyOnNote(String),

    /// Operation requires at least one note/tag and none exist.
    #[error("Nothing here yet")]
    EmptyCollection,
}

/// Result type for store operations.
pub type StoreResult<T> = Result<T, StoreError>;
