use crate::models::{AspectKind, Element, SpecModel};
use crate::parsing::classify::LineClass;
use crate::parsing::{ParseDiagnostic, ParseErrorKind, ParsedSpec};

/// Folds classified lines into the aspect-structured model.
///
/// Phase 2 of parsing: tracks which section the cursor is in and accumulates
/// elements, references, and diagnostics.
pub struct SpecBuilder {
    current: Option<AspectKind>,
    model: SpecModel,
    errors: Vec<ParseDiagnostic>,
}

impl SpecBuilder {
    pub fn new() -> Self {
        Self {
            current: None,
            model: SpecModel::default(),
            errors: Vec::new(),
        }
    }

    pub fn push(&mut self, class: LineClass) {
        match class {
            LineClass::Blank => {}
            LineClass::Section { kind } => self.current = Some(kind),
            LineClass::Element(line) => {
                self.errors.extend(line.diagnostics);
                match self.current {
                    Some(kind) => {
                        self.model.push_element(
                            kind,
                            Element {
                                name: line.name,
                                name_span: line.name_span,
                                offset: line.offset,
                            },
                        );
                        for reference in line.refs {
                            self.model.push_reference(reference);
                        }
                    }
                    None => self.errors.push(ParseDiagnostic {
                        kind: ParseErrorKind::ElementOutsideSection,
                        span: line.name_span,
                    }),
                }
            }
            LineClass::Invalid(diagnostic) => self.errors.push(diagnostic),
        }
    }

    pub fn finish(self) -> ParsedSpec {
        ParsedSpec {
            model: self.model,
            errors: self.errors,
        }
    }
}
