use std::borrow::Borrow;
use std::fmt;

use indexmap::IndexMap;
use serde::Serialize;

use crate::Value;

/// Identifies one variable source, normally a workspace-relative path with
/// `/` separators.
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(transparent)]
pub struct SourceId(String);

impl SourceId {
    #[must_use]
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for SourceId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for SourceId {
    fn from(id: &str) -> Self {
        Self::new(id)
    }
}

impl From<String> for SourceId {
    fn from(id: String) -> Self {
        Self(id)
    }
}

impl Borrow<str> for SourceId {
    fn borrow(&self) -> &str {
        &self.0
    }
}

/// Parsed variable documents keyed by source, in load order.
pub type Corpus = IndexMap<SourceId, Value>;

/// Owns the persistent variable corpus.
///
/// Sources are added or replaced as files are (re)loaded and removed when
/// they disappear. Scans take a [`snapshot`](Self::snapshot) and never
/// mutate the store.
#[derive(Clone, Debug, Default)]
pub struct VariableStore {
    corpus: Corpus,
}

impl VariableStore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Add or replace the document for `source`, returning the previous one.
    pub fn insert(&mut self, source: SourceId, document: Value) -> Option<Value> {
        tracing::debug!(source = %source, "storing variable source");
        self.corpus.insert(source, document)
    }

    pub fn remove(&mut self, source: &str) -> Option<Value> {
        tracing::debug!(source, "removing variable source");
        self.corpus.shift_remove(source)
    }

    #[must_use]
    pub fn get(&self, source: &str) -> Option<&Value> {
        self.corpus.get(source)
    }

    #[must_use]
    pub fn contains(&self, source: &str) -> bool {
        self.corpus.contains_key(source)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.corpus.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.corpus.is_empty()
    }

    pub fn sources(&self) -> impl Iterator<Item = &SourceId> {
        self.corpus.keys()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&SourceId, &Value)> {
        self.corpus.iter()
    }

    /// A deep, independent copy of the corpus for a single scan.
    #[must_use]
    pub fn snapshot(&self) -> Corpus {
        self.corpus.clone()
    }
}

impl FromIterator<(SourceId, Value)> for VariableStore {
    fn from_iter<I: IntoIterator<Item = (SourceId, Value)>>(iter: I) -> Self {
        Self {
            corpus: iter.into_iter().collect(),
        }
    }
}

impl Extend<(SourceId, Value)> for VariableStore {
    fn extend<I: IntoIterator<Item = (SourceId, Value)>>(&mut self, iter: I) {
        for (source, document) in iter {
            self.insert(source, document);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parse_document;

    fn doc(source: &str) -> Value {
        parse_document(source).unwrap()
    }

    #[test]
    fn insert_replaces_existing_source() {
        let mut store = VariableStore::new();
        assert!(store.insert("a.yml".into(), doc("x: 1")).is_none());
        let previous = store.insert("a.yml".into(), doc("x: 2"));
        assert_eq!(previous, Some(doc("x: 1")));
        assert_eq!(store.len(), 1);
        assert_eq!(store.get("a.yml"), Some(&doc("x: 2")));
    }

    #[test]
    fn remove_keeps_order_of_remaining_sources() {
        let mut store: VariableStore = [
            (SourceId::from("a.yml"), doc("x: 1")),
            (SourceId::from("b.yml"), doc("x: 2")),
            (SourceId::from("c.yml"), doc("x: 3")),
        ]
        .into_iter()
        .collect();

        assert!(store.remove("b.yml").is_some());
        assert!(store.remove("missing.yml").is_none());
        let sources: Vec<&str> = store.sources().map(SourceId::as_str).collect();
        assert_eq!(sources, ["a.yml", "c.yml"]);
    }

    #[test]
    fn snapshot_is_independent() {
        let mut store = VariableStore::new();
        store.insert("a.yml".into(), doc("x: 1"));

        let mut snapshot = store.snapshot();
        if let Some(Value::Mapping(map)) = snapshot.get_mut("a.yml") {
            map.insert("alias".to_string(), Value::from("injected"));
        }

        assert_eq!(store.get("a.yml"), Some(&doc("x: 1")));
    }
}
