//! Identifier enforcement: the incremental renumbering core.
//!
//! On every change-feed batch the enforcer locates the aspect each change
//! falls into, plans the renames that restore `prefix + position` for the
//! affected region, collects the edit sets from the rename service, and
//! returns one conflict-free batch for the host to apply.
//!
//! The enforcer never edits anything itself and never guesses: a parse with
//! errors, or an indeterminate aspect boundary, yields no edits for the
//! affected change rather than possibly-wrong ones.

pub mod locator;
pub mod planner;

use std::sync::Arc;

use thiserror::Error;
use tracing::{debug, error, warn};

use crate::editing::{Document, DocumentChange, EditBatch, TextEdit};
use crate::models::{AspectKind, Element};
use crate::numbering::locator::{AspectSlice, locate_aspect};
use crate::numbering::planner::{PlanStep, plan_modified, plan_tail};
use crate::parsing::rope::Span;
use crate::rename::RenameProvider;
use crate::workspace::{DocUri, DocumentHandle, Workspace, WorkspaceError};

#[derive(Debug, Error)]
pub enum EnforceError {
    #[error(transparent)]
    Workspace(#[from] WorkspaceError),
}

/// Enforces correct identifiers on the aspect where each change happened.
///
/// Stateless between invocations except for the last-seen document handle,
/// which only short-circuits the store lookup. Passes for one document are
/// serialized by holding its lock for the full pass.
pub struct IdEnforcer<R: RenameProvider> {
    workspace: Arc<Workspace>,
    rename: R,
    last_seen: Option<(DocUri, DocumentHandle)>,
}

impl<R: RenameProvider> IdEnforcer<R> {
    pub fn new(workspace: Arc<Workspace>, rename: R) -> Self {
        Self {
            workspace,
            rename,
            last_seen: None,
        }
    }

    /// Checks and enforces identifiers for the aspects touched by `changes`.
    ///
    /// Returns the text edits needed to restore the numbering invariant.
    /// Empty when the document currently fails to parse; with errors present
    /// other syntax would be misread as identifiers.
    pub fn enforce_ids(
        &mut self,
        uri: &DocUri,
        changes: &[DocumentChange],
    ) -> Result<Vec<TextEdit>, EnforceError> {
        let handle = self.document(uri)?;
        let doc = handle.lock().unwrap();

        if doc.has_parse_errors() {
            debug!(uri = %uri, "document has parse errors; skipping id enforcement");
            return Ok(Vec::new());
        }

        let mut batch = EditBatch::default();
        for change in changes {
            let Some(aspect) = locate_aspect(doc.model(), change.offset) else {
                warn!(
                    uri = %uri,
                    offset = change.offset,
                    "aspect boundary indeterminate; skipping change"
                );
                continue;
            };

            let pivot = aspect
                .elements
                .iter()
                .position(|element| element.offset > change.offset)
                .unwrap_or(aspect.elements.len());

            debug!(
                aspect = ?aspect.kind,
                pivot,
                deletion = change.is_deletion(),
                "planning renumbering"
            );

            for step in plan_tail(aspect.elements, aspect.prefix, pivot, change.is_deletion()) {
                self.execute(&doc, &aspect, step, &mut batch);
            }
            if let Some(step) = plan_modified(aspect.elements, aspect.prefix, pivot) {
                self.execute(&doc, &aspect, step, &mut batch);
            }
        }

        if let Some((a, b)) = batch.overlapping_pair() {
            error!(
                uri = %uri,
                first = ?a.span,
                second = ?b.span,
                "computed edits overlap across changes; rejecting batch"
            );
            return Ok(Vec::new());
        }

        Ok(batch.into_edits())
    }

    /// Renumbers every aspect of the document from scratch: each element
    /// whose name does not match its position is renamed through the rename
    /// service, references included. The walk is descending per aspect so no
    /// two live elements hold the same name mid-plan.
    ///
    /// This is the batch-tool entry point; the incremental path driven by the
    /// change feed is [`enforce_ids`](Self::enforce_ids).
    pub fn normalize_document(&mut self, uri: &DocUri) -> Result<Vec<TextEdit>, EnforceError> {
        let handle = self.document(uri)?;
        let doc = handle.lock().unwrap();

        if doc.has_parse_errors() {
            debug!(uri = %uri, "document has parse errors; skipping normalization");
            return Ok(Vec::new());
        }

        let mut batch = EditBatch::default();
        for kind in AspectKind::ALL {
            let elements = doc.model().elements(kind);
            for i in (0..elements.len()).rev() {
                let want = format!("{}{}", kind.prefix(), i + 1);
                if elements[i].name != want {
                    batch.extend(self.service_edits(&doc, &elements[i], &want, None));
                }
            }
        }

        if let Some((a, b)) = batch.overlapping_pair() {
            error!(
                uri = %uri,
                first = ?a.span,
                second = ?b.span,
                "normalization edits overlap; rejecting batch"
            );
            return Ok(Vec::new());
        }

        Ok(batch.into_edits())
    }

    /// Resolves the document, reusing the last-seen handle when the URI
    /// matches.
    fn document(&mut self, uri: &DocUri) -> Result<DocumentHandle, EnforceError> {
        if let Some((seen, handle)) = &self.last_seen
            && seen == uri
        {
            return Ok(handle.clone());
        }
        let handle = self
            .workspace
            .get(uri)
            .ok_or_else(|| WorkspaceError::UnknownDocument(uri.clone()))?;
        self.last_seen = Some((uri.clone(), handle.clone()));
        Ok(handle)
    }

    fn execute(
        &self,
        doc: &Document,
        aspect: &AspectSlice<'_>,
        step: PlanStep,
        batch: &mut EditBatch,
    ) {
        match step {
            PlanStep::Span { index, new_name } => {
                batch.push(TextEdit::replace(
                    aspect.elements[index].name_span,
                    new_name,
                ));
            }
            PlanStep::Service { index, new_name } => {
                batch.extend(self.service_edits(doc, &aspect.elements[index], &new_name, None));
            }
            PlanStep::SpanWithCascade {
                index,
                cascade_via,
                new_name,
            } => {
                let element = &aspect.elements[index];
                batch.push(TextEdit::replace(element.name_span, new_name.clone()));

                // the cascade renames the modified element, which shares the
                // displaced element's name; its declaration range is excluded
                // from the result because the declaration was handled above
                let via = &aspect.elements[cascade_via];
                batch.extend(self.service_edits(doc, via, &new_name, Some(via.name_span)));
            }
        }
    }

    /// One rename-service call. Empty results and errors degrade to zero
    /// contribution; partial renumbering beats aborting the batch.
    fn service_edits(
        &self,
        doc: &Document,
        element: &Element,
        new_name: &str,
        skip: Option<Span>,
    ) -> Vec<TextEdit> {
        match self
            .rename
            .rename(doc, element.name_span.start, new_name, skip)
        {
            Ok(mut by_doc) => match by_doc.remove(doc.uri()) {
                Some(edits) if !edits.is_empty() => edits,
                _ => {
                    warn!(element = %element.name, "rename service produced no edits");
                    Vec::new()
                }
            },
            Err(err) => {
                warn!(element = %element.name, error = %err, "rename service failed");
                Vec::new()
            }
        }
    }
}
