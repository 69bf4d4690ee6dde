mod line;
mod span;

pub use line::LineCol;
pub use line::LineIndex;
pub use span::Span;
