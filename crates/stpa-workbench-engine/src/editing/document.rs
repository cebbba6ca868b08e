use xi_rope::{Rope, RopeInfo, delta::Builder};

use crate::editing::change::DocumentChange;
use crate::editing::edits::{EditError, TextEdit, apply_edits};
use crate::models::SpecModel;
use crate::parsing::{ParsedSpec, parse_document};
use crate::workspace::DocUri;

/// One open analysis document.
///
/// The rope buffer is the single source of truth. The parse result hangs off
/// it and is replaced wholesale on every re-parse; nothing in the model
/// survives an edit, so all addressing into it is by aspect and position.
pub struct Document {
    uri: DocUri,
    buffer: Rope,
    version: u64,
    parse: ParsedSpec,
}

impl Document {
    pub fn new(uri: DocUri, text: &str) -> Self {
        let buffer = Rope::from(text);
        let parse = parse_document(&buffer);
        Self {
            uri,
            buffer,
            version: 0,
            parse,
        }
    }

    pub fn uri(&self) -> &DocUri {
        &self.uri
    }

    /// Version counter, incremented once per change batch or edit batch.
    pub fn version(&self) -> u64 {
        self.version
    }

    pub fn text(&self) -> String {
        self.buffer.to_string()
    }

    pub fn len(&self) -> usize {
        self.buffer.len()
    }

    pub fn is_empty(&self) -> bool {
        self.buffer.len() == 0
    }

    pub fn parse(&self) -> &ParsedSpec {
        &self.parse
    }

    pub fn model(&self) -> &SpecModel {
        &self.parse.model
    }

    pub fn has_parse_errors(&self) -> bool {
        self.parse.has_errors()
    }

    /// Applies a change-feed batch in arrival order, then re-parses once.
    ///
    /// Out-of-range offsets are clamped to the buffer rather than rejected;
    /// the change feed is trusted but never allowed to panic the engine.
    pub fn apply_changes(&mut self, changes: &[DocumentChange]) {
        for change in changes {
            let start = change.offset.min(self.buffer.len());
            let end = (change.offset + change.len).min(self.buffer.len());
            let mut builder = Builder::<RopeInfo>::new(self.buffer.len());
            builder.replace(start..end, Rope::from(change.text.as_str()));
            self.buffer = builder.build().apply(&self.buffer);
        }
        self.reparse();
    }

    /// Applies an engine edit batch atomically through one delta, then
    /// re-parses.
    pub fn apply_edits(&mut self, edits: &[TextEdit]) -> Result<(), EditError> {
        self.buffer = apply_edits(&self.buffer, edits)?;
        self.reparse();
        Ok(())
    }

    fn reparse(&mut self) {
        self.parse = parse_document(&self.buffer);
        self.version += 1;
    }
}
