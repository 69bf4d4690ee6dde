use tmplf_source::LineCol;

/// Locate where `name` is defined in a YAML source.
///
/// Each dotted segment must appear as a key inside the block of the
/// previous one; sequence items (`- key:`) count as keys. The first segment
/// is looked up at the document's root indentation before any deeper
/// definition is considered. Names that are not plain key paths, or key
/// paths the structural walk cannot follow, fall back to the first textual
/// occurrence.
#[must_use]
pub fn find_definition(source: &str, name: &str) -> Option<LineCol> {
    let name = name.trim();
    if name.is_empty() {
        return None;
    }

    let lines: Vec<&str> = source.lines().collect();
    let segments: Vec<&str> = name.split('.').collect();

    if segments.iter().all(|segment| is_plain_key(segment)) {
        let found = root_indent(&lines)
            .and_then(|indent| find_key_path(&lines, &segments, Some(indent)))
            .or_else(|| find_key_path(&lines, &segments, None));
        if found.is_some() {
            return found;
        }
    }

    lines.iter().enumerate().find_map(|(line, text)| {
        text.find(name)
            .map(|column| line_col(line, column))
    })
}

/// Indentation of the first line that carries content.
fn root_indent(lines: &[&str]) -> Option<usize> {
    lines.iter().find_map(|text| {
        let trimmed = text.trim_start();
        (!trimmed.is_empty() && !trimmed.starts_with('#')).then(|| text.len() - trimmed.len())
    })
}

/// Walk `segments` block by block. With `first_indent`, the first segment
/// only matches lines indented exactly that far.
fn find_key_path(
    lines: &[&str],
    segments: &[&str],
    first_indent: Option<usize>,
) -> Option<LineCol> {
    let mut start = 0;
    let mut scope = first_indent.map_or(Scope::Anywhere, Scope::At);
    let mut found = None;

    for segment in segments {
        let (line, column) = find_key(lines, start, scope, segment)?;
        found = Some(line_col(line, column));
        scope = Scope::Below(column);
        start = line + 1;
    }

    found
}

#[derive(Clone, Copy)]
enum Scope {
    Anywhere,
    /// Lines indented exactly this far.
    At(usize),
    /// The block of a parent key at this column.
    Below(usize),
}

/// First line at or after `start` that defines `segment` within `scope`.
fn find_key(lines: &[&str], start: usize, scope: Scope, segment: &str) -> Option<(usize, usize)> {
    for (offset, text) in lines.iter().enumerate().skip(start) {
        let trimmed = text.trim_start();
        if trimmed.is_empty() || trimmed.starts_with('#') {
            continue;
        }
        let indent = text.len() - trimmed.len();

        match scope {
            Scope::Below(parent) if indent <= parent => return None,
            Scope::At(expected) if indent != expected => continue,
            _ => {}
        }

        let (key_column, rest) = strip_sequence_markers(indent, trimmed);
        if key_matches(rest, segment) {
            return Some((offset, key_column));
        }
    }
    None
}

/// Skip `- ` prefixes so `- name: x` reports the column of `name`.
fn strip_sequence_markers(mut column: usize, mut rest: &str) -> (usize, &str) {
    while let Some(after) = rest.strip_prefix('-') {
        let item = after.trim_start();
        if item.len() == after.len() {
            break;
        }
        column += rest.len() - item.len();
        rest = item;
    }
    (column, rest)
}

fn key_matches(line: &str, segment: &str) -> bool {
    let after_key = ['"', '\'']
        .iter()
        .find_map(|quote| {
            line.strip_prefix(*quote)
                .and_then(|rest| rest.strip_prefix(segment))
                .and_then(|rest| rest.strip_prefix(*quote))
        })
        .or_else(|| line.strip_prefix(segment));

    let Some(after_key) = after_key else {
        return false;
    };
    let Some(value) = after_key.trim_start_matches([' ', '\t']).strip_prefix(':') else {
        return false;
    };
    value.is_empty() || value.starts_with([' ', '\t'])
}

fn is_plain_key(segment: &str) -> bool {
    !segment.is_empty()
        && segment
            .chars()
            .all(|c| c.is_alphanumeric() || matches!(c, '_' | '-'))
}

fn line_col(line: usize, column: usize) -> LineCol {
    LineCol::new(
        u32::try_from(line).unwrap_or(u32::MAX),
        u32::try_from(column).unwrap_or(u32::MAX),
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    const SOURCE: &str = "\
# shared settings
name: top
db:
  host: localhost
  replica:
    host: replica.local
users:
  - name: Al
    roles: [admin]
  - name: Bo
\"quoted\": 1
other:
  host: elsewhere
";

    fn at(line: u32, column: u32) -> Option<LineCol> {
        Some(LineCol::new(line, column))
    }

    #[test]
    fn top_level_key() {
        assert_eq!(find_definition(SOURCE, "name"), at(1, 0));
        assert_eq!(find_definition(SOURCE, "db"), at(2, 0));
    }

    #[test]
    fn nested_keys_stay_in_their_block() {
        assert_eq!(find_definition(SOURCE, "db.host"), at(3, 2));
        assert_eq!(find_definition(SOURCE, "db.replica.host"), at(5, 4));
        assert_eq!(find_definition(SOURCE, "other.host"), at(12, 2));
    }

    #[test]
    fn sequence_items_are_searched() {
        assert_eq!(find_definition(SOURCE, "users.name"), at(7, 4));
        assert_eq!(find_definition(SOURCE, "users.roles"), at(8, 4));
    }

    #[test]
    fn quoted_keys() {
        assert_eq!(find_definition(SOURCE, "quoted"), at(10, 0));
    }

    #[test]
    fn falls_back_to_text_search() {
        assert_eq!(find_definition(SOURCE, "replica.local"), at(5, 10));
        assert_eq!(find_definition(SOURCE, "db.port"), None);
        assert_eq!(find_definition(SOURCE, "settings"), at(0, 9));
    }

    #[test]
    fn missing_names() {
        assert_eq!(find_definition(SOURCE, ""), None);
        assert_eq!(find_definition(SOURCE, "absent"), None);
        assert_eq!(find_definition("", "name"), None);
    }

    #[test]
    fn root_level_keys_win_over_nested_ones() {
        let source = "db:\n  host: nested\nhost: top\n";
        assert_eq!(find_definition(source, "host"), at(2, 0));

        let indented = "  # note\n  db:\n    host: nested\n  host: top\n";
        assert_eq!(find_definition(indented, "host"), at(3, 2));
        assert_eq!(find_definition(indented, "db.host"), at(2, 4));
    }

    #[test]
    fn nested_only_keys_are_still_found() {
        assert_eq!(find_definition(SOURCE, "replica"), at(4, 2));
        assert_eq!(find_definition(SOURCE, "replica.host"), at(5, 4));
        assert_eq!(find_definition(SOURCE, "roles"), at(8, 4));
    }

    #[test]
    fn key_prefixes_do_not_match() {
        let source = "hostname: a\nhost: b\n";
        assert_eq!(find_definition(source, "host"), at(1, 0));
    }
}
