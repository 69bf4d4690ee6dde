use serde::Serialize;

/// A zero-based line and column position within a text document.
///
/// Columns count bytes from the start of the line.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub struct LineCol {
    line: u32,
    column: u32,
}

impl LineCol {
    #[must_use]
    pub fn new(line: u32, column: u32) -> Self {
        Self { line, column }
    }

    #[must_use]
    pub fn line(&self) -> u32 {
        self.line
    }

    #[must_use]
    pub fn column(&self) -> u32 {
        self.column
    }
}

/// Byte offsets of every line start in a document.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct LineIndex {
    line_starts: Vec<u32>,
    length: u32,
}

impl LineIndex {
    #[must_use]
    pub fn from_text(text: &str) -> Self {
        let mut line_starts = vec![0];
        let mut pos: u32 = 0;

        for c in text.chars() {
            pos += u32::try_from(c.len_utf8()).unwrap_or(0);
            if c == '\n' {
                line_starts.push(pos);
            }
        }

        Self {
            line_starts,
            length: pos,
        }
    }

    /// Convert a byte offset to a line/column position. Offsets past the end
    /// of the document clamp to the last position.
    #[must_use]
    pub fn to_line_col(&self, offset: u32) -> LineCol {
        let offset = offset.min(self.length);
        let line = match self.line_starts.binary_search(&offset) {
            Ok(line) => line,
            Err(line) => line.saturating_sub(1),
        };

        let line_start = self.line_starts[line];
        LineCol::new(u32::try_from(line).unwrap_or(u32::MAX), offset - line_start)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn single_line() {
        let index = LineIndex::from_text("hello");
        assert_eq!(index.to_line_col(0), LineCol::new(0, 0));
        assert_eq!(index.to_line_col(3), LineCol::new(0, 3));
    }

    #[test]
    fn offsets_after_newlines() {
        let index = LineIndex::from_text("a: 1\nb:\n  c: 2\n");
        assert_eq!(index.to_line_col(4), LineCol::new(0, 4));
        assert_eq!(index.to_line_col(5), LineCol::new(1, 0));
        assert_eq!(index.to_line_col(10), LineCol::new(2, 2));
        assert_eq!(index.to_line_col(15), LineCol::new(3, 0));
    }

    #[test]
    fn clamps_past_end() {
        let index = LineIndex::from_text("ab\ncd");
        assert_eq!(index.to_line_col(99), LineCol::new(1, 2));
        assert_eq!(LineIndex::from_text("").to_line_col(3), LineCol::new(0, 0));
    }

    #[test]
    fn multibyte_characters_count_bytes() {
        let index = LineIndex::from_text("é\nx");
        assert_eq!(index.to_line_col(2), LineCol::new(0, 2));
        assert_eq!(index.to_line_col(3), LineCol::new(1, 0));
    }
}
