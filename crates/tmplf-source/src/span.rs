use serde::ser::SerializeStruct;
use serde::Serialize;
use serde::Serializer;

use crate::LineCol;
use crate::LineIndex;

/// A half-open byte range `[start, start + length)` within a text document.
///
/// Serializes as `{ start, end, length }`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Span {
    start: u32,
    length: u32,
}

impl Span {
    #[must_use]
    pub fn new(start: u32, length: u32) -> Self {
        Self { start, length }
    }

    #[must_use]
    pub fn from_parts(start: usize, length: usize) -> Self {
        let start_u32 = u32::try_from(start).unwrap_or(u32::MAX);
        let length_u32 = u32::try_from(length).unwrap_or(u32::MAX.saturating_sub(start_u32));
        Span::new(start_u32, length_u32)
    }

    /// Construct a span from integer bounds expressed as byte offsets.
    #[must_use]
    pub fn from_bounds(start: usize, end: usize) -> Self {
        Self::from_parts(start, end.saturating_sub(start))
    }

    #[must_use]
    pub fn start(self) -> u32 {
        self.start
    }

    #[must_use]
    pub fn start_usize(self) -> usize {
        self.start as usize
    }

    #[must_use]
    pub fn end(self) -> u32 {
        self.start.saturating_add(self.length)
    }

    #[must_use]
    pub fn end_usize(self) -> usize {
        self.end() as usize
    }

    #[must_use]
    pub fn length(self) -> u32 {
        self.length
    }

    #[must_use]
    pub fn is_empty(self) -> bool {
        self.length == 0
    }

    /// The text covered by this span, or `None` if it falls outside `source`
    /// or splits a UTF-8 character.
    #[must_use]
    pub fn slice(self, source: &str) -> Option<&str> {
        source.get(self.start_usize()..self.end_usize())
    }

    /// Convert this span to start and end line/column positions.
    #[must_use]
    pub fn to_line_col(self, line_index: &LineIndex) -> (LineCol, LineCol) {
        let start = line_index.to_line_col(self.start);
        let end = line_index.to_line_col(self.end());
        (start, end)
    }
}

impl Serialize for Span {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut state = serializer.serialize_struct("Span", 3)?;
        state.serialize_field("start", &self.start)?;
        state.serialize_field("end", &self.end())?;
        state.serialize_field("length", &self.length)?;
        state.end()
    }
}
