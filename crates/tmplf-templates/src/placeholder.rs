use indexmap::IndexMap;
use serde::Serialize;
use tmplf_source::Span;
use tmplf_vars::SourceId;
use tmplf_vars::Value;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum PlaceholderKind {
    /// A `{{ ... }}` expression.
    Variable,
    /// The iterable of a `{% for ... %}` tag.
    ForLoop,
}

/// One recognized template token and everything resolved for it.
#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Placeholder {
    /// Dotted variable path. For loops this is the iterable, not the loop
    /// variable.
    pub name: String,
    pub kind: PlaceholderKind,
    /// Covers the whole token including its delimiters.
    pub span: Span,
    /// Value found in each source that defines `name`. Sources without a
    /// value are absent.
    pub variable_matches: IndexMap<SourceId, Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub default_value: Option<String>,
    /// Value found in the scanned document itself.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub object_match: Option<Value>,
    pub unhandled_jinja_options: Vec<String>,
    /// Set by classification when `name` is supplied from outside the
    /// corpus and is not expected to resolve.
    pub is_external: bool,
}

impl Placeholder {
    #[must_use]
    pub fn new(name: impl Into<String>, kind: PlaceholderKind, span: Span) -> Self {
        Self {
            name: name.into(),
            kind,
            span,
            variable_matches: IndexMap::new(),
            default_value: None,
            object_match: None,
            unhandled_jinja_options: Vec::new(),
            is_external: false,
        }
    }

    #[must_use]
    pub fn match_count(&self) -> usize {
        self.variable_matches.len()
    }

    /// The text this placeholder was scanned from.
    #[must_use]
    pub fn source_text<'a>(&self, text: &'a str) -> Option<&'a str> {
        self.span.slice(text)
    }

    /// `(source, variable)` pairs for jumping to each definition.
    pub fn definitions(&self) -> impl Iterator<Item = (&SourceId, &str)> {
        self.variable_matches
            .keys()
            .map(move |source| (source, self.name.as_str()))
    }
}
