/// One entry of the editor change feed.
///
/// Offsets refer to the buffer state each change was made against; a batch
/// applies its changes strictly in arrival order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DocumentChange {
    /// Byte offset where the change happened.
    pub offset: usize,
    /// Length of the replaced region in the pre-change buffer.
    pub len: usize,
    /// Replacement text. Empty exactly for a pure deletion.
    pub text: String,
}

impl DocumentChange {
    pub fn insert(offset: usize, text: impl Into<String>) -> Self {
        Self {
            offset,
            len: 0,
            text: text.into(),
        }
    }

    pub fn delete(offset: usize, len: usize) -> Self {
        Self {
            offset,
            len,
            text: String::new(),
        }
    }

    pub fn replace(offset: usize, len: usize, text: impl Into<String>) -> Self {
        Self {
            offset,
            len,
            text: text.into(),
        }
    }

    /// True when the change removed text and inserted nothing, which is the
    /// signal that element names below it must shift down.
    pub fn is_deletion(&self) -> bool {
        self.text.is_empty()
    }
}
