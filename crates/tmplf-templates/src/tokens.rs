use std::sync::LazyLock;

use regex::Captures;
use regex::Regex;
use tmplf_source::Span;

/// `{% for <ident> in <path> %}`, with optional `-` whitespace control.
static LOOP_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\{%-?\s*for\s+(\w+)\s+in\s+([^\s%]+?)\s*-?%\}").expect("loop pattern is valid")
});

/// `{{ <path> (| <filter>)* }}`. A filter runs to the next `|` or the first
/// `}}`, so single braces inside filter arguments are kept.
static VARIABLE_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\{\{\s*([^\s|}]+)\s*((?:\|[^|]*?)*?)\}\}").expect("variable pattern is valid")
});

/// A `{% for variable in iterable %}` tag.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct LoopToken<'a> {
    pub span: Span,
    pub variable: &'a str,
    pub iterable: &'a str,
}

/// A `{{ path | filter | ... }}` expression.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct VariableToken<'a> {
    pub span: Span,
    pub path: &'a str,
    /// Trimmed filter expressions in source order, empty ones removed.
    pub filters: Vec<&'a str>,
}

/// Find the first for-loop tag starting at or after `offset`.
///
/// Returns the token and the offset to continue scanning from.
#[must_use]
pub fn next_loop(text: &str, offset: usize) -> Option<(LoopToken<'_>, usize)> {
    let captures = captures_from(&LOOP_PATTERN, text, offset)?;
    let whole = captures.get(0)?;
    let token = LoopToken {
        span: Span::from_bounds(whole.start(), whole.end()),
        variable: captures.get(1)?.as_str(),
        iterable: captures.get(2)?.as_str().trim(),
    };
    Some((token, whole.end()))
}

/// Find the first variable expression starting at or after `offset`.
///
/// Returns the token and the offset to continue scanning from.
#[must_use]
pub fn next_variable(text: &str, offset: usize) -> Option<(VariableToken<'_>, usize)> {
    let captures = captures_from(&VARIABLE_PATTERN, text, offset)?;
    let whole = captures.get(0)?;
    let filters = captures
        .get(2)
        .map(|group| split_filters(group.as_str()))
        .unwrap_or_default();
    let token = VariableToken {
        span: Span::from_bounds(whole.start(), whole.end()),
        path: captures.get(1)?.as_str().trim(),
        filters,
    };
    Some((token, whole.end()))
}

fn captures_from<'t>(pattern: &Regex, text: &'t str, offset: usize) -> Option<Captures<'t>> {
    if offset > text.len() || !text.is_char_boundary(offset) {
        return None;
    }
    pattern.captures_at(text, offset)
}

fn split_filters(group: &str) -> Vec<&str> {
    group
        .split('|')
        .map(str::trim)
        .filter(|filter| !filter.is_empty())
        .collect()
}

/// All for-loop tags in `text`, in order.
#[must_use]
pub fn loop_tokens(text: &str) -> LoopTokens<'_> {
    LoopTokens { text, offset: 0 }
}

/// All variable expressions in `text`, in order.
#[must_use]
pub fn variable_tokens(text: &str) -> VariableTokens<'_> {
    VariableTokens { text, offset: 0 }
}

pub struct LoopTokens<'a> {
    text: &'a str,
    offset: usize,
}

impl<'a> Iterator for LoopTokens<'a> {
    type Item = LoopToken<'a>;

    fn next(&mut self) -> Option<Self::Item> {
        let (token, next) = next_loop(self.text, self.offset)?;
        self.offset = next;
        Some(token)
    }
}

pub struct VariableTokens<'a> {
    text: &'a str,
    offset: usize,
}

impl<'a> Iterator for VariableTokens<'a> {
    type Item = VariableToken<'a>;

    fn next(&mut self) -> Option<Self::Item> {
        let (token, next) = next_variable(self.text, self.offset)?;
        self.offset = next;
        Some(token)
    }
}
