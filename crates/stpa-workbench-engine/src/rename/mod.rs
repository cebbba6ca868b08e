//! The rename seam.
//!
//! Renumbering never rewrites references itself; it asks a [`RenameProvider`]
//! for the edits that rename one element's declaration together with every
//! reference to it. The provider is a black box to the planner: an editor
//! integration would back it with its rename capability, and
//! [`ScanRenameProvider`] backs it with the parse model for standalone use.

use std::collections::HashMap;

use thiserror::Error;

use crate::editing::{Document, TextEdit};
use crate::parsing::rope::Span;
use crate::workspace::DocUri;

/// Edits produced by one rename, keyed by the document they apply to.
pub type RenameEdits = HashMap<DocUri, Vec<TextEdit>>;

#[derive(Debug, Error)]
pub enum RenameError {
    #[error("rename provider failure: {0}")]
    Provider(String),
}

/// Renames one element: the declaration whose name token starts at
/// `position`, plus every reference to it.
///
/// `skip` excludes one span from the result; callers pass the range they have
/// already edited themselves, so no conflicting edit can come back for it.
/// An empty result (or an error) is a valid degraded outcome; callers treat
/// it as zero contribution and continue.
pub trait RenameProvider {
    fn rename(
        &self,
        document: &Document,
        position: usize,
        new_name: &str,
        skip: Option<Span>,
    ) -> Result<RenameEdits, RenameError>;
}

/// Reference implementation over the parse model.
///
/// Resolves the declaration at `position` and rewrites it plus every
/// reference token carrying the same name. References resolve by name, so
/// with colliding declarations every same-named reference is rewritten,
/// which is exactly what the planner's collision handling relies on.
pub struct ScanRenameProvider;

impl RenameProvider for ScanRenameProvider {
    fn rename(
        &self,
        document: &Document,
        position: usize,
        new_name: &str,
        skip: Option<Span>,
    ) -> Result<RenameEdits, RenameError> {
        let model = document.model();
        let Some(element) = model.element_at(position) else {
            return Ok(HashMap::new());
        };

        let mut edits = vec![TextEdit::replace(element.name_span, new_name)];
        for reference in &model.references {
            if reference.name == element.name {
                edits.push(TextEdit::replace(reference.span, new_name));
            }
        }
        if let Some(skip) = skip {
            edits.retain(|edit| edit.span != skip);
        }

        Ok(HashMap::from([(document.uri().clone(), edits)]))
    }
}
