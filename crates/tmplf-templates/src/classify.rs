use regex::RegexSet;
use serde::Serialize;

use crate::Placeholder;
use crate::TemplateError;

/// Name patterns for variables supplied from outside the corpus, such as
/// values injected at render time.
///
/// Patterns are regular expressions matched anywhere in the placeholder
/// name; anchor them with `^...$` for exact names.
#[derive(Clone, Debug)]
pub struct ExternalVariables {
    patterns: RegexSet,
}

impl ExternalVariables {
    pub fn new<I, S>(patterns: I) -> Result<Self, TemplateError>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        Ok(Self {
            patterns: RegexSet::new(patterns)?,
        })
    }

    #[must_use]
    pub fn is_external(&self, name: &str) -> bool {
        self.patterns.is_match(name)
    }
}

impl Default for ExternalVariables {
    fn default() -> Self {
        Self {
            patterns: RegexSet::empty(),
        }
    }
}

/// How completely a placeholder was resolved, relative to the best-resolved
/// placeholder in the same text.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum MatchStatus {
    /// Defined in as many sources as the best-resolved placeholder.
    AllMatching,
    /// Defined somewhere, or has a value to fall back on, but in fewer
    /// sources than the best-resolved placeholder.
    SomeMatching,
    /// Nothing to show.
    NoMatch,
    /// Unresolved, but its name is listed as externally supplied.
    External,
}

impl MatchStatus {
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::AllMatching => "all-matching",
            Self::SomeMatching => "some-matching",
            Self::NoMatch => "no-match",
            Self::External => "external",
        }
    }
}

impl std::fmt::Display for MatchStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct Annotation {
    #[serde(flatten)]
    pub placeholder: Placeholder,
    pub status: MatchStatus,
}

/// Flag external placeholders and rank each one against the placeholder
/// with the most matching sources.
///
/// A placeholder with no source matches still counts as matched when it
/// has a non-empty `default(...)` value or was found in the scanned
/// document. When nothing in the text matches any source, every
/// placeholder is [`MatchStatus::NoMatch`] (or [`MatchStatus::External`]).
#[must_use]
pub fn classify(placeholders: Vec<Placeholder>, externals: &ExternalVariables) -> Vec<Annotation> {
    let max_match = placeholders
        .iter()
        .map(Placeholder::match_count)
        .max()
        .unwrap_or(0);

    placeholders
        .into_iter()
        .map(|mut placeholder| {
            placeholder.is_external = externals.is_external(&placeholder.name);
            let status = status_for(&placeholder, max_match);
            Annotation {
                placeholder,
                status,
            }
        })
        .collect()
}

fn status_for(placeholder: &Placeholder, max_match: usize) -> MatchStatus {
    let has_fallback = placeholder
        .default_value
        .as_deref()
        .is_some_and(|default| !default.is_empty())
        || placeholder.object_match.is_some();
    let matched = placeholder.match_count() > 0 || has_fallback;

    if max_match > 0 && matched {
        if placeholder.match_count() == max_match {
            MatchStatus::AllMatching
        } else {
            MatchStatus::SomeMatching
        }
    } else if placeholder.is_external {
        MatchStatus::External
    } else {
        MatchStatus::NoMatch
    }
}
