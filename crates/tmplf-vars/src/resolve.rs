use indexmap::IndexMap;

use crate::Corpus;
use crate::SourceId;
use crate::Value;

/// Resolve a dotted variable `path` against `document`.
///
/// A path without dots is a single key lookup. Dotted paths are walked one
/// segment at a time; whenever the value reached so far is a sequence and
/// segments remain, the rest of the path is applied to every element and the
/// non-empty results are collected into a new sequence. If no element yields
/// anything, the segment is looked up on the sequence itself, which finds
/// nothing since sequences have no keys.
///
/// Numeric segments are ordinary keys: `users.0` never indexes a list.
///
/// Returns `None` when nothing is found or the value found is empty (see
/// [`Value::is_empty_match`]).
#[must_use]
pub fn resolve(path: &str, document: &Value) -> Option<Value> {
    let resolved = if path.contains('.') {
        let segments: Vec<&str> = path.split('.').collect();
        resolve_segments(document, &segments)
    } else {
        document.get(path).cloned()
    };

    resolved.filter(|value| !value.is_empty_match())
}

fn resolve_segments(value: &Value, segments: &[&str]) -> Option<Value> {
    let Some((segment, rest)) = segments.split_first() else {
        return Some(value.clone());
    };

    if let Value::Sequence(items) = value {
        let projected: Vec<Value> = items
            .iter()
            .filter_map(|item| resolve_segments(item, segments))
            .filter(|item| !item.is_empty_match())
            .collect();
        if !projected.is_empty() {
            return Some(Value::Sequence(projected));
        }
    }

    resolve_segments(value.get(segment)?, rest)
}

/// Resolve `name` in every source of the corpus, keeping only the sources
/// that hold a non-empty value. Corpus order is preserved.
#[must_use]
pub fn find_in_corpus(name: &str, corpus: &Corpus) -> IndexMap<SourceId, Value> {
    corpus
        .iter()
        .filter_map(|(source, document)| Some((source.clone(), resolve(name, document)?)))
        .collect()
}

/// Resolve `name` against the document being scanned.
///
/// When the path does not resolve from the top, every nested mapping is
/// searched depth-first for a key spelled exactly `name`, so a variable
/// defined anywhere in the current file is still found.
#[must_use]
pub fn find_in_document(name: &str, document: &Value) -> Option<Value> {
    resolve(name, document).or_else(|| find_nested_key(name, document))
}

fn find_nested_key(name: &str, value: &Value) -> Option<Value> {
    let map = value.as_mapping()?;

    map.values().find_map(|child| {
        let child_map = child.as_mapping()?;
        child_map
            .get(name)
            .filter(|found| !found.is_empty_match())
            .cloned()
            .or_else(|| find_nested_key(name, child))
    })
}
