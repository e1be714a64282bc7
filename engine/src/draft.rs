//! In-progress text input state.

use unicode_segmentation::UnicodeSegmentation;

/// A single-line text draft with a grapheme-aware cursor.
///
/// The cursor is an index into the draft's grapheme clusters, not bytes, so
/// arrow keys and backspace behave correctly on multi-byte input.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct DraftField {
    text: String,
    cursor: usize,
}

impl DraftField {
    #[must_use]
    pub fn text(&self) -> &str {
        &self.text
    }

    /// Cursor position in grapheme clusters.
    #[must_use]
    pub fn cursor(&self) -> usize {
        self.cursor
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.text.is_empty()
    }

    /// Length in grapheme clusters (what the cursor indexes over).
    #[must_use]
    pub fn grapheme_len(&self) -> usize {
        self.text.graphemes(true).count()
    }

    fn byte_offset(&self, grapheme_index: usize) -> usize {
        self.text
            .grapheme_indices(true)
            .nth(grapheme_index)
            .map(|(offset, _)| offset)
            .unwrap_or(self.text.len())
    }

    pub fn insert_char(&mut self, c: char) {
        let offset = self.byte_offset(self.cursor);
        self.text.insert(offset, c);
        self.cursor += 1;
    }

    pub fn backspace(&mut self) {
        if self.cursor == 0 {
            return;
        }
        let start = self.byte_offset(self.cursor - 1);
        let end = self.byte_offset(self.cursor);
        self.text.replace_range(start..end, "");
        self.cursor -= 1;
    }

    pub fn move_cursor_left(&mut self) {
        self.cursor = self.cursor.saturating_sub(1);
    }

    pub fn move_cursor_right(&mut self) {
        self.cursor = (self.cursor + 1).min(self.grapheme_len());
    }

    pub fn move_cursor_home(&mut self) {
        self.cursor = 0;
    }

    pub fn move_cursor_end(&mut self) {
        self.cursor = self.grapheme_len();
    }

    pub fn clear(&mut self) {
        self.text.clear();
        self.cursor = 0;
    }
}
