//! The mutable side of the engine: documents, the editor change feed, and
//! the edit batches handed back to the host.
//!
//! Edits produced here are descriptions, not mutations; the host editor (or
//! [`Document::apply_edits`] in tests and the CLI) applies them atomically.

pub mod change;
pub mod document;
pub mod edits;

pub use change::DocumentChange;
pub use document::Document;
pub use edits::{EditBatch, EditError, TextEdit, apply_edits};
