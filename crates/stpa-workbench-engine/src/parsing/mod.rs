//! Line-oriented parser for the analysis DSL.
//!
//! Parsing runs in two phases over the rope buffer: a per-line classifier
//! extracting local facts ([`classify`]), and a builder folding those lines
//! into the aspect-structured model ([`builder`]). All parsed nodes carry
//! byte spans into the rope, never copied positions.

pub mod builder;
pub mod classify;
pub mod rope;

use serde::Serialize;
use thiserror::Error;
use xi_rope::Rope;

use crate::models::SpecModel;
use crate::parsing::builder::SpecBuilder;
use crate::parsing::classify::SpecLineClassifier;
use crate::parsing::rope::{Span, lines_with_spans};

/// What went wrong on a particular stretch of the document.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error, Serialize)]
pub enum ParseErrorKind {
    #[error("unterminated description string")]
    UnterminatedString,
    #[error("element is missing its description string")]
    MissingDescription,
    #[error("unclosed reference list")]
    UnclosedRefList,
    #[error("element appears before any section header")]
    ElementOutsideSection,
    #[error("line fits no production")]
    MalformedLine,
}

/// One parse diagnostic with the byte span it covers.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ParseDiagnostic {
    pub kind: ParseErrorKind,
    pub span: Span,
}

/// Best-effort parse result: the model plus every diagnostic encountered.
///
/// A model accompanied by diagnostics is fine for display purposes, but the
/// numbering engine refuses to work from it: with errors present, offsets of
/// later elements are not trustworthy.
#[derive(Debug, Clone, Serialize)]
pub struct ParsedSpec {
    pub model: SpecModel,
    pub errors: Vec<ParseDiagnostic>,
}

impl ParsedSpec {
    pub fn has_errors(&self) -> bool {
        !self.errors.is_empty()
    }
}

/// Parses a whole document from its rope buffer.
pub fn parse_document(rope: &Rope) -> ParsedSpec {
    let classifier = SpecLineClassifier;
    let mut builder = SpecBuilder::new();

    for lr in lines_with_spans(rope) {
        builder.push(classifier.classify(&lr));
    }

    builder.finish()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::AspectKind;
    use crate::parsing::rope::slice_to_string;
    use pretty_assertions::assert_eq;

    const SAMPLE: &str = "\
Losses
L1 \"Loss of human life\"
L2 \"Damage to the vehicle\"

Hazards
H1 \"Vehicle exceeds safe distance\" [L1]
H2 \"Doors open while moving\" [L1, L2]

SystemConstraints
SC1 \"Safe distance must be kept\" [H1]
";

    #[test]
    fn parses_aspects_in_document_order() {
        let rope = Rope::from(SAMPLE);
        let spec = parse_document(&rope);

        assert!(!spec.has_errors());
        let losses = spec.model.elements(AspectKind::Losses);
        let hazards = spec.model.elements(AspectKind::Hazards);
        assert_eq!(
            losses.iter().map(|e| e.name.as_str()).collect::<Vec<_>>(),
            vec!["L1", "L2"]
        );
        assert_eq!(
            hazards.iter().map(|e| e.name.as_str()).collect::<Vec<_>>(),
            vec!["H1", "H2"]
        );
        assert!(spec.model.elements(AspectKind::Responsibilities).is_empty());
    }

    #[test]
    fn name_spans_slice_back_to_names() {
        let rope = Rope::from(SAMPLE);
        let spec = parse_document(&rope);

        for kind in AspectKind::ALL {
            for element in spec.model.elements(kind) {
                assert_eq!(slice_to_string(&rope, element.name_span), element.name);
            }
        }
        for reference in &spec.model.references {
            assert_eq!(slice_to_string(&rope, reference.span), reference.name);
        }
    }

    #[test]
    fn references_are_collected_in_document_order() {
        let rope = Rope::from(SAMPLE);
        let spec = parse_document(&rope);

        let names: Vec<_> = spec
            .model
            .references
            .iter()
            .map(|r| r.name.as_str())
            .collect();
        assert_eq!(names, vec!["L1", "L1", "L2", "H1"]);
    }

    #[test]
    fn unterminated_string_flags_the_parse() {
        let rope = Rope::from("Hazards\nH1 \"no closing quote\n");
        let spec = parse_document(&rope);

        assert!(spec.has_errors());
        assert_eq!(spec.errors[0].kind, ParseErrorKind::UnterminatedString);
        // best-effort model still carries the element
        assert_eq!(spec.model.elements(AspectKind::Hazards).len(), 1);
    }

    #[test]
    fn element_before_any_section_is_an_error() {
        let rope = Rope::from("L1 \"orphan\"\nLosses\nL1 \"ok\"\n");
        let spec = parse_document(&rope);

        assert!(spec.has_errors());
        assert_eq!(spec.errors[0].kind, ParseErrorKind::ElementOutsideSection);
        assert_eq!(spec.model.elements(AspectKind::Losses).len(), 1);
    }

    #[test]
    fn model_consistency_matches_numbering() {
        let consistent = parse_document(&Rope::from(SAMPLE));
        assert!(consistent.model.is_consistent());

        let gap = parse_document(&Rope::from("Hazards\nH1 \"a\"\nH3 \"b\"\n"));
        assert!(!gap.model.is_consistent());
    }
}
