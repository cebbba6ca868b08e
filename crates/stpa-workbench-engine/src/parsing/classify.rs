use std::sync::OnceLock;

use regex::Regex;

use crate::models::{AspectKind, Reference};
use crate::parsing::rope::{LineRef, Span};
use crate::parsing::{ParseDiagnostic, ParseErrorKind};

/// Identifier tokens: a leading letter followed by letters or digits.
fn name_token() -> &'static Regex {
    static NAME_TOKEN: OnceLock<Regex> = OnceLock::new();
    NAME_TOKEN.get_or_init(|| Regex::new(r"^[A-Za-z][A-Za-z0-9]*").expect("Invalid name regex"))
}

/// Classification of a single line containing only local facts.
///
/// This is phase 1 of parsing: each line is classified independently, without
/// reference to surrounding context. The builder supplies the context.
#[derive(Debug, Clone)]
pub enum LineClass {
    Blank,
    /// A section keyword introducing an aspect.
    Section { kind: AspectKind },
    /// An element declaration, possibly with diagnostics attached.
    Element(ElementLine),
    /// A line that fits no production.
    Invalid(ParseDiagnostic),
}

/// Local facts about one element declaration line.
#[derive(Debug, Clone)]
pub struct ElementLine {
    /// The declared identifier.
    pub name: String,
    /// Byte span of the name token.
    pub name_span: Span,
    /// Start offset of the element (its name token starts the element).
    pub offset: usize,
    /// References listed in the trailing bracket list.
    pub refs: Vec<Reference>,
    /// Diagnostics local to this line (unterminated string etc.).
    pub diagnostics: Vec<ParseDiagnostic>,
}

/// Classifies individual lines of the analysis DSL.
pub struct SpecLineClassifier;

impl SpecLineClassifier {
    /// Classifies a line into a [`LineClass`].
    pub fn classify(&self, lr: &LineRef) -> LineClass {
        let trimmed = lr.text.trim_end_matches(['\r', '\n']);
        if trimmed.trim().is_empty() {
            return LineClass::Blank;
        }

        let indent = trimmed.len() - trimmed.trim_start().len();
        let rest = &trimmed[indent..];

        if let Some(kind) = AspectKind::from_keyword(rest.trim_end()) {
            return LineClass::Section { kind };
        }

        let Some(name) = name_token().find(rest) else {
            return LineClass::Invalid(ParseDiagnostic {
                kind: ParseErrorKind::MalformedLine,
                span: Span::new(lr.span.start + indent, lr.span.start + trimmed.len()),
            });
        };

        let name_start = lr.span.start + indent;
        let mut line = ElementLine {
            name: name.as_str().to_string(),
            name_span: Span::new(name_start, name_start + name.end()),
            offset: name_start,
            refs: Vec::new(),
            diagnostics: Vec::new(),
        };

        // cursor is a byte index into `rest`; spans add lr.span.start + indent
        let base = lr.span.start + indent;
        let mut cursor = name.end();
        cursor = skip_spaces(rest, cursor);

        match rest[cursor..].strip_prefix('"') {
            Some(tail) => match tail.find('"') {
                Some(close) => cursor = cursor + 1 + close + 1,
                None => {
                    line.diagnostics.push(ParseDiagnostic {
                        kind: ParseErrorKind::UnterminatedString,
                        span: Span::new(base + cursor, lr.span.start + trimmed.len()),
                    });
                    return LineClass::Element(line);
                }
            },
            None => {
                line.diagnostics.push(ParseDiagnostic {
                    kind: ParseErrorKind::MissingDescription,
                    span: line.name_span,
                });
                return LineClass::Element(line);
            }
        }

        cursor = skip_spaces(rest, cursor);
        if rest[cursor..].starts_with('[') {
            cursor = self.scan_refs(rest, cursor + 1, base, trimmed.len() - indent, &mut line);
        }

        cursor = skip_spaces(rest, cursor);
        if cursor < rest.len() {
            line.diagnostics.push(ParseDiagnostic {
                kind: ParseErrorKind::MalformedLine,
                span: Span::new(base + cursor, lr.span.start + trimmed.len()),
            });
        }

        LineClass::Element(line)
    }

    /// Scans the `[A, B, ...]` reference list starting just after the `[`.
    /// Returns the cursor position after the closing bracket (or line end).
    fn scan_refs(
        &self,
        rest: &str,
        mut cursor: usize,
        base: usize,
        line_len: usize,
        line: &mut ElementLine,
    ) -> usize {
        loop {
            cursor = skip_spaces(rest, cursor);
            match rest[cursor..].chars().next() {
                Some(']') => return cursor + 1,
                Some(',') => {
                    cursor += 1;
                }
                Some(_) => match name_token().find(&rest[cursor..]) {
                    Some(m) => {
                        line.refs.push(Reference {
                            name: m.as_str().to_string(),
                            span: Span::new(base + cursor, base + cursor + m.end()),
                        });
                        cursor += m.end();
                    }
                    None => {
                        line.diagnostics.push(ParseDiagnostic {
                            kind: ParseErrorKind::MalformedLine,
                            span: Span::new(base + cursor, base + line_len),
                        });
                        return line_len;
                    }
                },
                None => {
                    line.diagnostics.push(ParseDiagnostic {
                        kind: ParseErrorKind::UnclosedRefList,
                        span: Span::new(base + cursor, base + line_len),
                    });
                    return cursor;
                }
            }
        }
    }
}

fn skip_spaces(s: &str, mut cursor: usize) -> usize {
    while s[cursor..].starts_with([' ', '\t']) {
        cursor += 1;
    }
    cursor
}

#[cfg(test)]
mod tests {
    use super::*;

    fn classify(text: &str) -> LineClass {
        SpecLineClassifier.classify(&LineRef {
            span: Span::new(0, text.len()),
            text: text.to_string(),
        })
    }

    #[test]
    fn blank_and_section_lines() {
        assert!(matches!(classify("   \n"), LineClass::Blank));
        assert!(matches!(
            classify("Hazards\n"),
            LineClass::Section {
                kind: AspectKind::Hazards
            }
        ));
        assert!(matches!(
            classify("UCAs"),
            LineClass::Section {
                kind: AspectKind::UnsafeControlActions
            }
        ));
    }

    #[test]
    fn element_with_refs() {
        let LineClass::Element(line) = classify("H2 \"doors open\" [L1, L2]\n") else {
            panic!("expected element");
        };
        assert_eq!(line.name, "H2");
        assert_eq!(line.name_span, Span::new(0, 2));
        assert!(line.diagnostics.is_empty());
        assert_eq!(line.refs.len(), 2);
        assert_eq!(line.refs[0].name, "L1");
        assert_eq!(line.refs[0].span, Span::new(17, 19));
        assert_eq!(line.refs[1].name, "L2");
        assert_eq!(line.refs[1].span, Span::new(21, 23));
    }

    #[test]
    fn indented_element_keeps_absolute_spans() {
        let LineClass::Element(line) = classify("  H1 \"x\"\n") else {
            panic!("expected element");
        };
        assert_eq!(line.name_span, Span::new(2, 4));
        assert_eq!(line.offset, 2);
    }

    #[test]
    fn unterminated_string_is_reported() {
        let LineClass::Element(line) = classify("H1 \"no closing quote\n") else {
            panic!("expected element");
        };
        assert_eq!(line.diagnostics.len(), 1);
        assert_eq!(
            line.diagnostics[0].kind,
            ParseErrorKind::UnterminatedString
        );
    }

    #[test]
    fn unclosed_ref_list_is_reported() {
        let LineClass::Element(line) = classify("H1 \"x\" [L1\n") else {
            panic!("expected element");
        };
        assert_eq!(line.refs.len(), 1);
        assert_eq!(line.diagnostics[0].kind, ParseErrorKind::UnclosedRefList);
    }

    #[test]
    fn junk_line_is_invalid() {
        assert!(matches!(classify("### banner\n"), LineClass::Invalid(_)));
    }
}
