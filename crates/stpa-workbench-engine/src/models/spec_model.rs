use serde::Serialize;

use crate::models::aspect::AspectKind;
use crate::parsing::rope::Span;

/// A named element of one aspect, as produced by one parse.
///
/// Elements carry no identity across parses; the engine addresses them by
/// `(aspect, position)` and every re-parse yields a fresh generation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Element {
    /// Current identifier text, e.g. `H2`.
    pub name: String,
    /// Byte span of the name token in the buffer.
    pub name_span: Span,
    /// Start offset of the whole element, used for ordering against edit
    /// offsets.
    pub offset: usize,
}

/// A by-name reference to an element somewhere else in the document.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Reference {
    /// The referenced identifier text.
    pub name: String,
    /// Byte span of the reference token.
    pub span: Span,
}

/// The aspect-structured view of one parsed document.
///
/// Element lists live in a fixed table indexed by [`AspectKind`]; dispatch
/// over aspects is a table walk in the fixed order, never a chain of
/// special cases.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct SpecModel {
    aspects: [Vec<Element>; 8],
    /// Every reference in the document, in document order.
    pub references: Vec<Reference>,
}

impl SpecModel {
    /// The elements of one aspect, in document order.
    pub fn elements(&self, kind: AspectKind) -> &[Element] {
        &self.aspects[kind.index()]
    }

    /// Offset of the aspect's first element, if it has any.
    pub fn first_offset(&self, kind: AspectKind) -> Option<usize> {
        self.elements(kind).first().map(|element| element.offset)
    }

    /// Looks up the element whose name token starts at `position`.
    pub fn element_at(&self, position: usize) -> Option<&Element> {
        AspectKind::ALL
            .into_iter()
            .flat_map(|kind| self.elements(kind))
            .find(|element| element.name_span.start == position)
    }

    /// Whether every aspect satisfies `name == prefix + position`.
    pub fn is_consistent(&self) -> bool {
        AspectKind::ALL.into_iter().all(|kind| {
            self.elements(kind)
                .iter()
                .enumerate()
                .all(|(i, element)| element.name == format!("{}{}", kind.prefix(), i + 1))
        })
    }

    pub(crate) fn push_element(&mut self, kind: AspectKind, element: Element) {
        self.aspects[kind.index()].push(element);
    }

    pub(crate) fn push_reference(&mut self, reference: Reference) {
        self.references.push(reference);
    }
}
