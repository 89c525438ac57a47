//! Repository storage and link-graph subsystem for zettel notes.
//!
//! This crate keeps an in-memory collection of notes consistent with a
//! multi-file on-disk representation:
//! - one index file per repository (one pipe-delimited record per note)
//! - one body file per note, under `notes/` or `archive/`
//! - a root-level config naming all repositories and the current one
//! - a root-level tag registry shared across repositories
//!
//! It also maintains a directed link graph between notes (paired
//! incoming/outgoing ID sets) and a global tag index kept in sync with
//! per-note tag lists.
//!
//! # Example
//!
//! ```ignore
//! use zettel_store::{Store, Note, generate_id};
//!
//! let mut store = Store::init(root)?;
//! let mut notes = store.load();
//! notes.push(Note::new("Ideas", "brainstorm", generate_id("Ideas")));
//! store.save(&notes);
//! ```

pub mod codec;
pub mod error;
pub mod id;
pub mod layout;
pub mod links;
pub mod models;
pub mod store;
pub mod tags;

// Re-exports
pub use error::{StoreError, StoreResult};
pub use id::generate_id;
pub use layout::{Layout, ARCHIVE_DIR, DEFAULT_REPO, NOTES_DIR};
pub use links::LinkDirection;
pub use models::{Note, NoteId};
pub use store::Store;
pub use tags::TagRegistry;
