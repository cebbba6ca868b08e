pub mod editing;
pub mod io;
pub mod models;
pub mod numbering;
pub mod parsing;
pub mod rename;
pub mod workspace;

// Re-export key types for easier usage
pub use editing::{Document, DocumentChange, EditBatch, EditError, TextEdit, apply_edits};
pub use models::{AspectKind, Element, Reference, SpecModel};
pub use numbering::{EnforceError, IdEnforcer, locator::AspectSlice, locator::locate_aspect};
pub use parsing::rope::Span;
pub use parsing::{ParseDiagnostic, ParseErrorKind, ParsedSpec, parse_document};
pub use rename::{RenameEdits, RenameError, RenameProvider, ScanRenameProvider};
pub use workspace::{DocUri, DocumentHandle, Workspace, WorkspaceError};
