use tmplf_vars::find_in_corpus;
use tmplf_vars::find_in_document;
use tmplf_vars::Corpus;
use tmplf_vars::Value;
use tmplf_vars::VariableStore;

use crate::filters::Filters;
use crate::tokens::loop_tokens;
use crate::tokens::variable_tokens;
use crate::tokens::LoopToken;
use crate::tokens::VariableToken;
use crate::Placeholder;
use crate::PlaceholderKind;

/// Find every placeholder in `text` and resolve it against `variables` and,
/// when given, the structured content of `current_document`.
///
/// Loop tags are scanned first, then variable expressions; the result lists
/// loop placeholders followed by variable placeholders, each group in text
/// order.
///
/// Each loop binds its variable in a private copy of the corpus: every
/// source that defines the iterable gets `<loop variable>: <iterable value>`
/// added at its top level, so `{{ item.field }}` later in the text resolves
/// by fanning out over the whole list. This approximates loop scoping
/// without iterating, and the store is never modified.
#[must_use]
pub fn parse_text_for_templates(
    text: &str,
    variables: &VariableStore,
    current_document: Option<&Value>,
) -> Vec<Placeholder> {
    let mut corpus = variables.snapshot();
    let mut placeholders = Vec::new();

    for token in loop_tokens(text) {
        placeholders.push(scan_loop(&token, &mut corpus));
    }

    for token in variable_tokens(text) {
        placeholders.push(scan_variable(&token, &corpus, current_document));
    }

    tracing::debug!(
        placeholders = placeholders.len(),
        sources = corpus.len(),
        "scanned text for templates"
    );

    placeholders
}

/// Binds the loop variable to the *resolved* iterable in each source. For a
/// top-level name that is the literal `source[name]`; a dotted iterable, or
/// one that goes through an earlier loop variable, is bound to the list it
/// resolves to, so `{% for h in cfg.hosts %}` makes `h` the `cfg.hosts`
/// list of that source.
fn scan_loop(token: &LoopToken<'_>, corpus: &mut Corpus) -> Placeholder {
    let list_matches = find_in_corpus(token.iterable, corpus);

    for (source, list) in &list_matches {
        let Some(document) = corpus.get_mut(source).and_then(Value::as_mapping_mut) else {
            continue;
        };
        document.insert(token.variable.to_string(), list.clone());
    }

    let mut placeholder = Placeholder::new(token.iterable, PlaceholderKind::ForLoop, token.span);
    placeholder.variable_matches = list_matches;
    placeholder
}

fn scan_variable(
    token: &VariableToken<'_>,
    corpus: &Corpus,
    current_document: Option<&Value>,
) -> Placeholder {
    let name = token.path.trim();
    let filters = Filters::partition(token.filters.iter().copied());

    let mut placeholder = Placeholder::new(name, PlaceholderKind::Variable, token.span);
    placeholder.variable_matches = find_in_corpus(name, corpus);
    placeholder.object_match =
        current_document.and_then(|document| find_in_document(name, document));
    placeholder.default_value = filters.default_value;
    placeholder.unhandled_jinja_options = filters.unhandled;
    placeholder
}

#[cfg(test)]
mod tests {
    use tmplf_vars::parse_document;
    use tmplf_vars::SourceId;

    use super::*;

    fn store(entries: &[(&str, &str)]) -> VariableStore {
        entries
            .iter()
            .map(|(source, text)| (SourceId::from(*source), parse_document(text).unwrap()))
            .collect()
    }

    fn doc(text: &str) -> Value {
        parse_document(text).unwrap()
    }

    #[test]
    fn plain_text_has_no_placeholders() {
        let variables = store(&[("f1.yml", "a: 1")]);
        let text = "no templates { here } {% if x %}";
        assert!(parse_text_for_templates(text, &variables, None).is_empty());
        assert!(parse_text_for_templates("", &variables, None).is_empty());
    }

    #[test]
    fn variable_without_filters() {
        let variables = store(&[("f1.yml", "name: Al")]);
        let placeholders = parse_text_for_templates("{{ name }}", &variables, None);
        assert_eq!(placeholders.len(), 1);

        let placeholder = &placeholders[0];
        assert_eq!(placeholder.name, "name");
        assert_eq!(placeholder.kind, PlaceholderKind::Variable);
        assert_eq!(placeholder.default_value, None);
        assert!(placeholder.unhandled_jinja_options.is_empty());
        assert_eq!(placeholder.variable_matches.get("f1.yml"), Some(&Value::from("Al")));
        assert_eq!(placeholder.object_match, None);
    }

    #[test]
    fn default_filter() {
        let variables = VariableStore::new();
        let text = "{{ name | default(42) }} {{ name | upper | default(42) }}";
        let placeholders = parse_text_for_templates(text, &variables, None);

        assert_eq!(placeholders[0].default_value.as_deref(), Some("42"));
        assert!(placeholders[0].unhandled_jinja_options.is_empty());
        assert_eq!(placeholders[1].default_value.as_deref(), Some("42"));
        assert_eq!(placeholders[1].unhandled_jinja_options, ["upper"]);
    }

    #[test]
    fn default_with_braces() {
        let variables = store(&[("f1.yml", "x: 1")]);
        let text = "{{ x | default({}) }} {{ x | default('{}') }} {{ x | replace('}', '') }}";
        let placeholders = parse_text_for_templates(text, &variables, None);

        assert_eq!(placeholders.len(), 3);
        assert_eq!(placeholders[0].default_value.as_deref(), Some("{}"));
        assert_eq!(placeholders[1].default_value.as_deref(), Some("'{}'"));
        assert_eq!(placeholders[2].unhandled_jinja_options, ["replace('}', '')"]);
        for placeholder in &placeholders {
            assert_eq!(placeholder.variable_matches.get("f1.yml"), Some(&Value::from(1)));
        }
    }

    #[test]
    fn unresolved_path_has_empty_matches() {
        let variables = store(&[("f1.yml", "a: 1"), ("f2.yml", "b: 2")]);
        let placeholders = parse_text_for_templates("{{ missing.path }}", &variables, None);
        assert!(placeholders[0].variable_matches.is_empty());
    }

    #[test]
    fn spans_reproduce_token_text() {
        let text = "x {% for u in users %} y {{ u.name|title }} z {{a}}";
        let variables = VariableStore::new();
        let slices: Vec<&str> = parse_text_for_templates(text, &variables, None)
            .iter()
            .map(|placeholder| placeholder.source_text(text).unwrap())
            .collect();
        assert_eq!(slices, ["{% for u in users %}", "{{ u.name|title }}", "{{a}}"]);
    }

    #[test]
    fn loops_come_before_variables() {
        let text = "{{ first }}{% for x in xs %}{{ x }}{% endfor %}";
        let variables = VariableStore::new();
        let names: Vec<(String, PlaceholderKind)> =
            parse_text_for_templates(text, &variables, None)
                .into_iter()
                .map(|placeholder| (placeholder.name, placeholder.kind))
                .collect();
        assert_eq!(
            names,
            [
                ("xs".to_string(), PlaceholderKind::ForLoop),
                ("first".to_string(), PlaceholderKind::Variable),
                ("x".to_string(), PlaceholderKind::Variable),
            ]
        );
    }

    #[test]
    fn loop_variable_aliases_iterable() {
        let variables = store(&[("f1", "users: [{name: Al}, {name: Bo}]")]);
        let text = "{% for item in users %}{{ item.name }}{% endfor %}";
        let placeholders = parse_text_for_templates(text, &variables, None);

        let loop_placeholder = &placeholders[0];
        assert_eq!(loop_placeholder.name, "users");
        assert_eq!(loop_placeholder.kind, PlaceholderKind::ForLoop);
        assert_eq!(
            loop_placeholder.variable_matches.get("f1"),
            Some(&doc("[{name: Al}, {name: Bo}]"))
        );
        assert_eq!(loop_placeholder.default_value, None);
        assert!(loop_placeholder.unhandled_jinja_options.is_empty());

        let item = &placeholders[1];
        assert_eq!(item.name, "item.name");
        assert_eq!(item.variable_matches.get("f1"), Some(&doc("[Al, Bo]")));
    }

    #[test]
    fn loop_alias_only_applies_to_defining_sources() {
        let variables = store(&[
            ("f1", "users: [{name: Al}]"),
            ("f2", "item: {name: Standalone}"),
            ("f3", "other: 1"),
        ]);
        let text = "{% for item in users %}{{ item.name }}";
        let placeholders = parse_text_for_templates(text, &variables, None);

        let item = &placeholders[1];
        assert_eq!(item.variable_matches.len(), 2);
        assert_eq!(item.variable_matches.get("f1"), Some(&doc("[Al]")));
        assert_eq!(item.variable_matches.get("f2"), Some(&Value::from("Standalone")));
    }

    #[test]
    fn dotted_iterable_binds_resolved_list() {
        let variables = store(&[("f1", "cfg:\n  hosts: [a, b]\n"), ("f2", "cfg: {}")]);
        let text = "{% for h in cfg.hosts %}{{ h }}{% endfor %}";
        let placeholders = parse_text_for_templates(text, &variables, None);

        assert_eq!(placeholders[0].name, "cfg.hosts");
        let h = &placeholders[1];
        assert_eq!(h.variable_matches.len(), 1);
        assert_eq!(h.variable_matches.get("f1"), Some(&doc("[a, b]")));
    }

    #[test]
    fn nested_loops_chain_aliases() {
        let variables = store(&[(
            "f1",
            "groups:\n  - members: [{name: Al}]\n  - members: [{name: Bo}]\n",
        )]);
        let text = "{% for g in groups %}{% for m in g.members %}{{ m.name }}{% endfor %}{% endfor %}";
        let placeholders = parse_text_for_templates(text, &variables, None);

        assert_eq!(placeholders[1].name, "g.members");
        assert_eq!(
            placeholders[1].variable_matches.get("f1"),
            Some(&doc("[[{name: Al}], [{name: Bo}]]"))
        );
        assert_eq!(
            placeholders[2].variable_matches.get("f1"),
            Some(&doc("[[Al], [Bo]]"))
        );
    }

    #[test]
    fn store_is_untouched_and_scans_are_idempotent() {
        let variables = store(&[("f1", "users: [{name: Al}, {name: Bo}]")]);
        let before = variables.snapshot();
        let text = "{% for item in users %}{{ item.name }}{% endfor %}";

        let first = parse_text_for_templates(text, &variables, None);
        let second = parse_text_for_templates(text, &variables, None);

        assert_eq!(first, second);
        assert_eq!(variables.snapshot(), before);
        assert!(variables.get("f1").unwrap().get("item").is_none());
    }

    #[test]
    fn null_sources_never_match() {
        let mut variables = store(&[("ok.yml", "users: [{name: Al}]\nname: x")]);
        variables.insert(SourceId::from("broken.yml"), Value::Null);
        let text = "{% for item in users %}{{ item.name }}{{ name }}{{ broken }}";

        for placeholder in parse_text_for_templates(text, &variables, None) {
            assert!(!placeholder.variable_matches.contains_key("broken.yml"));
        }
    }

    #[test]
    fn current_document_context() {
        let variables = store(&[("vars.yml", "image: from-vars")]);
        let current = doc("image: top-level\nspec:\n  replicas: 3\n");
        let text = "{{ image }} {{ replicas }} {{ missing }}";
        let placeholders = parse_text_for_templates(text, &variables, Some(&current));

        assert_eq!(placeholders[0].object_match, Some(Value::from("top-level")));
        assert_eq!(
            placeholders[0].variable_matches.get("vars.yml"),
            Some(&Value::from("from-vars"))
        );
        assert_eq!(placeholders[1].object_match, Some(Value::from(3)));
        assert_eq!(placeholders[2].object_match, None);
    }

    #[test]
    fn definitions_pair_sources_with_name() {
        let variables = store(&[("a.yml", "k: 1"), ("b.yml", "k: 2")]);
        let placeholders = parse_text_for_templates("{{ k }}", &variables, None);
        let definitions: Vec<(&str, &str)> = placeholders[0]
            .definitions()
            .map(|(source, name)| (source.as_str(), name))
            .collect();
        assert_eq!(definitions, [("a.yml", "k"), ("b.yml", "k")]);
    }

    #[test]
    fn serialized_placeholders() {
        let variables = store(&[
            ("vars/dev.yml", "db: {host: dev-db}\nusers: [{name: Al}, {name: Bo}]\n"),
            ("vars/prod.yml", "db: {host: prod-db}\n"),
        ]);
        let text = "{% for u in users %}\nhost={{ db.host | upper | default('localhost') }}\nuser={{ u.name }}\n";
        let placeholders = parse_text_for_templates(text, &variables, None);
        let json = serde_json::to_value(&placeholders).unwrap();
        assert_eq!(
            json,
            serde_json::json!([
                {
                    "name": "users",
                    "kind": "for-loop",
                    "span": { "start": 0, "end": 20, "length": 20 },
                    "variableMatches": {
                        "vars/dev.yml": [{ "name": "Al" }, { "name": "Bo" }]
                    },
                    "unhandledJinjaOptions": [],
                    "isExternal": false
                },
                {
                    "name": "db.host",
                    "kind": "variable",
                    "span": { "start": 26, "end": 70, "length": 44 },
                    "variableMatches": {
                        "vars/dev.yml": "dev-db",
                        "vars/prod.yml": "prod-db"
                    },
                    "defaultValue": "'localhost'",
                    "unhandledJinjaOptions": ["upper"],
                    "isExternal": false
                },
                {
                    "name": "u.name",
                    "kind": "variable",
                    "span": { "start": 76, "end": 88, "length": 12 },
                    "variableMatches": { "vars/dev.yml": ["Al", "Bo"] },
                    "unhandledJinjaOptions": [],
                    "isExternal": false
                }
            ])
        );
    }
}
