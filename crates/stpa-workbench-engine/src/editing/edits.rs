use thiserror::Error;
use xi_rope::{Rope, RopeInfo, delta::Builder};

use crate::parsing::rope::Span;

/// A single text replacement against the live buffer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TextEdit {
    pub span: Span,
    pub text: String,
}

impl TextEdit {
    pub fn replace(span: Span, text: impl Into<String>) -> Self {
        Self {
            span,
            text: text.into(),
        }
    }
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum EditError {
    #[error("overlapping edits at {0:?} and {1:?}")]
    Overlap(Span, Span),
    #[error("edit span {0:?} exceeds buffer length {1}")]
    OutOfBounds(Span, usize),
}

/// An ordered accumulation of edits for one engine pass.
///
/// The planner guarantees disjoint spans within one aspect for one change;
/// across changes the batch is checked before it leaves the engine.
#[derive(Debug, Default)]
pub struct EditBatch {
    edits: Vec<TextEdit>,
}

impl EditBatch {
    pub fn push(&mut self, edit: TextEdit) {
        self.edits.push(edit);
    }

    pub fn extend(&mut self, edits: impl IntoIterator<Item = TextEdit>) {
        self.edits.extend(edits);
    }

    pub fn len(&self) -> usize {
        self.edits.len()
    }

    pub fn is_empty(&self) -> bool {
        self.edits.is_empty()
    }

    /// Returns the first pair of edits whose spans overlap, if any.
    pub fn overlapping_pair(&self) -> Option<(&TextEdit, &TextEdit)> {
        let mut order: Vec<&TextEdit> = self.edits.iter().collect();
        order.sort_by_key(|edit| edit.span);
        order
            .windows(2)
            .find(|pair| pair[0].span.overlaps(pair[1].span))
            .map(|pair| (pair[0], pair[1]))
    }

    pub fn into_edits(self) -> Vec<TextEdit> {
        self.edits
    }
}

/// Applies a batch of edits to the rope atomically, through one delta.
///
/// Edits may arrive in any order; they are sorted by start offset before the
/// delta is built. Overlapping or out-of-bounds edits reject the whole batch.
pub fn apply_edits(rope: &Rope, edits: &[TextEdit]) -> Result<Rope, EditError> {
    let len = rope.len();
    let mut order: Vec<&TextEdit> = edits.iter().collect();
    order.sort_by_key(|edit| edit.span);

    for pair in order.windows(2) {
        if pair[0].span.overlaps(pair[1].span) {
            return Err(EditError::Overlap(pair[0].span, pair[1].span));
        }
    }
    if let Some(edit) = order.last()
        && edit.span.end > len
    {
        return Err(EditError::OutOfBounds(edit.span, len));
    }

    let mut builder = Builder::<RopeInfo>::new(len);
    for edit in order {
        builder.replace(edit.span.start..edit.span.end, Rope::from(edit.text.as_str()));
    }
    Ok(builder.build().apply(rope))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn batch_applies_atomically_in_any_order() {
        let rope = Rope::from("H1 H2 H3");
        // renames emitted in descending order, as the planner does
        let edits = vec![
            TextEdit::replace(Span::new(6, 8), "H4"),
            TextEdit::replace(Span::new(3, 5), "H3"),
        ];
        let out = apply_edits(&rope, &edits).unwrap();
        assert_eq!(out.to_string(), "H1 H3 H4");
    }

    #[test]
    fn overlap_rejects_the_whole_batch() {
        let rope = Rope::from("H1 H2 H3");
        let edits = vec![
            TextEdit::replace(Span::new(3, 5), "H3"),
            TextEdit::replace(Span::new(4, 6), "H4"),
        ];
        assert!(matches!(
            apply_edits(&rope, &edits),
            Err(EditError::Overlap(_, _))
        ));
    }

    #[test]
    fn out_of_bounds_is_rejected() {
        let rope = Rope::from("H1");
        let edits = vec![TextEdit::replace(Span::new(0, 7), "H2")];
        assert_eq!(
            apply_edits(&rope, &edits).unwrap_err(),
            EditError::OutOfBounds(Span::new(0, 7), 2)
        );
    }

    #[test]
    fn overlapping_pair_finds_non_adjacent_conflicts() {
        let mut batch = EditBatch::default();
        batch.push(TextEdit::replace(Span::new(10, 12), "H2"));
        batch.push(TextEdit::replace(Span::new(0, 2), "H1"));
        batch.push(TextEdit::replace(Span::new(11, 13), "H3"));
        let (a, b) = batch.overlapping_pair().expect("conflict");
        assert_eq!(a.span, Span::new(10, 12));
        assert_eq!(b.span, Span::new(11, 13));
    }

    #[test]
    fn replacement_growing_the_name_shifts_nothing_before_it() {
        let rope = Rope::from("Scenario9 Scenario10");
        let edits = vec![TextEdit::replace(Span::new(0, 9), "Scenario10")];
        let out = apply_edits(&rope, &edits).unwrap();
        assert_eq!(out.to_string(), "Scenario10 Scenario10");
    }
}
