use crate::Value;
use crate::VariablesError;

/// Parse a YAML variable document.
///
/// Merge keys (`<<: *anchor`) are expanded before conversion. An empty
/// document parses to [`Value::Null`].
pub fn parse_document(source: &str) -> Result<Value, VariablesError> {
    if is_blank(source) {
        return Ok(Value::Null);
    }
    let mut yaml: serde_yaml::Value = serde_yaml::from_str(source)?;
    yaml.apply_merge()?;
    Ok(Value::from(yaml))
}

/// Nothing but whitespace, comments and document markers.
fn is_blank(source: &str) -> bool {
    source.lines().map(str::trim).all(|line| {
        line.is_empty() || line.starts_with('#') || line == "---" || line == "..."
    })
}

/// Parse a YAML variable document, treating any failure as an empty
/// document so a single broken source never blocks the others.
///
/// `origin` only labels the warning.
pub fn load_document(source: &str, origin: &str) -> Value {
    match parse_document(source) {
        Ok(value) => value,
        Err(err) => {
            tracing::warn!(origin, error = %err, "failed to parse variable file");
            Value::Null
        }
    }
}
