//! The document store.
//!
//! Resolves URIs to live documents and ingests change-feed batches. Every
//! document sits behind its own mutex: a numbering pass holds the lock for
//! its full duration, which serializes passes per document without blocking
//! unrelated documents.

use std::collections::HashMap;
use std::fmt;
use std::path::Path;
use std::sync::{Arc, Mutex};

use relative_path::RelativePath;
use thiserror::Error;

use crate::editing::{Document, DocumentChange};
use crate::io::{self, IoError};

/// Stable URI-like key of a document in the store.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct DocUri(String);

impl DocUri {
    pub fn new(uri: impl Into<String>) -> Self {
        Self(uri.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for DocUri {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for DocUri {
    fn from(uri: &str) -> Self {
        Self::new(uri)
    }
}

#[derive(Debug, Error)]
pub enum WorkspaceError {
    #[error("unknown document: {0}")]
    UnknownDocument(DocUri),
    #[error(transparent)]
    Io(#[from] IoError),
}

/// Shared handle to one live document.
pub type DocumentHandle = Arc<Mutex<Document>>;

/// URI-keyed collection of open documents.
#[derive(Default)]
pub struct Workspace {
    docs: Mutex<HashMap<DocUri, DocumentHandle>>,
}

impl Workspace {
    pub fn new() -> Self {
        Self::default()
    }

    /// Opens (or replaces) a document from in-memory text.
    pub fn open(&self, uri: DocUri, text: &str) -> DocumentHandle {
        let handle = Arc::new(Mutex::new(Document::new(uri.clone(), text)));
        self.docs.lock().unwrap().insert(uri, handle.clone());
        handle
    }

    /// Opens a document from a file under the specs root. The URI is the
    /// root-relative path.
    pub fn open_file(
        &self,
        specs_root: &Path,
        path: &RelativePath,
    ) -> Result<(DocUri, DocumentHandle), WorkspaceError> {
        let text = io::read_file(path, specs_root)?;
        let uri = DocUri::new(path.as_str());
        let handle = self.open(uri.clone(), &text);
        Ok((uri, handle))
    }

    pub fn get(&self, uri: &DocUri) -> Option<DocumentHandle> {
        self.docs.lock().unwrap().get(uri).cloned()
    }

    /// Ingests one change-feed batch: applies the changes in order, re-parses,
    /// and returns the new document version.
    pub fn apply_changes(
        &self,
        uri: &DocUri,
        changes: &[DocumentChange],
    ) -> Result<u64, WorkspaceError> {
        let handle = self
            .get(uri)
            .ok_or_else(|| WorkspaceError::UnknownDocument(uri.clone()))?;
        let mut doc = handle.lock().unwrap();
        doc.apply_changes(changes);
        Ok(doc.version())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn open_and_get_share_the_same_document() {
        let ws = Workspace::new();
        let uri = DocUri::new("mem:a.stpa");
        ws.open(uri.clone(), "Losses\nL1 \"x\"\n");

        let handle = ws.get(&uri).expect("document");
        assert_eq!(handle.lock().unwrap().text(), "Losses\nL1 \"x\"\n");
    }

    #[test]
    fn changes_bump_the_version() {
        let ws = Workspace::new();
        let uri = DocUri::new("mem:a.stpa");
        ws.open(uri.clone(), "Losses\n");

        let version = ws
            .apply_changes(&uri, &[DocumentChange::insert(7, "L1 \"x\"\n")])
            .unwrap();
        assert_eq!(version, 1);
    }

    #[test]
    fn open_file_keys_the_document_by_relative_path() {
        let dir = tempfile::TempDir::new().unwrap();
        std::fs::write(dir.path().join("brakes.stpa"), "Losses\nL1 \"x\"\n").unwrap();

        let ws = Workspace::new();
        let (uri, handle) = ws
            .open_file(dir.path(), RelativePath::new("brakes.stpa"))
            .unwrap();

        assert_eq!(uri.as_str(), "brakes.stpa");
        assert!(!handle.lock().unwrap().has_parse_errors());
        assert!(ws.get(&uri).is_some());
    }

    #[test]
    fn unknown_uri_is_a_typed_error() {
        let ws = Workspace::new();
        let err = ws
            .apply_changes(&DocUri::new("mem:missing"), &[])
            .unwrap_err();
        assert!(matches!(err, WorkspaceError::UnknownDocument(_)));
    }
}
