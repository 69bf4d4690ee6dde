use std::sync::LazyLock;

use regex::Regex;

static DEFAULT_FILTER: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?s)^default\s*\((.*)\)$").expect("default pattern is valid"));

/// Filter expressions of one placeholder, split into the `default(...)`
/// value and everything else.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Filters {
    /// Inner text of the first `default(...)` filter, verbatim.
    pub default_value: Option<String>,
    /// Every other filter expression, in source order.
    pub unhandled: Vec<String>,
}

impl Filters {
    /// Route each filter expression to exactly one side. Only the first
    /// `default(...)` is extracted; later ones stay unhandled.
    #[must_use]
    pub fn partition<'a>(filters: impl IntoIterator<Item = &'a str>) -> Self {
        let mut partitioned = Self::default();

        for filter in filters {
            if partitioned.default_value.is_none() {
                if let Some(inner) = default_argument(filter) {
                    partitioned.default_value = Some(inner.to_string());
                    continue;
                }
            }
            partitioned.unhandled.push(filter.to_string());
        }

        partitioned
    }
}

fn default_argument(filter: &str) -> Option<&str> {
    DEFAULT_FILTER
        .captures(filter.trim())
        .and_then(|captures| captures.get(1))
        .map(|inner| inner.as_str())
}
