use std::fmt::Write as _;

use anyhow::Context;
use anyhow::Result;
use camino::Utf8Path;
use camino::Utf8PathBuf;
use clap::Parser;
use clap::ValueEnum;
use tmplf_source::LineIndex;
use tmplf_templates::classify;
use tmplf_templates::parse_text_for_templates;
use tmplf_templates::Annotation;
use tmplf_templates::ExternalVariables;
use tmplf_templates::MatchStatus;
use tmplf_templates::PlaceholderKind;
use tmplf_vars::parse_document;
use tmplf_vars::Value;

use crate::args::Args;
use crate::commands::absolute;
use crate::commands::Command;
use crate::commands::Project;
use crate::exit::Exit;

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    #[default]
    Text,
    Json,
}

#[derive(Debug, Parser)]
pub struct Scan {
    /// File to scan for placeholders.
    file: Utf8PathBuf,

    /// How to print the results.
    #[arg(long, value_enum, default_value_t)]
    format: OutputFormat,

    /// Also look placeholders up in FILE itself, parsed as YAML. Always on
    /// for `.yml` and `.yaml` files.
    #[arg(long)]
    self_context: bool,

    /// Project root holding the variable files. Defaults to the current
    /// directory.
    #[arg(long)]
    root: Option<Utf8PathBuf>,
}

impl Command for Scan {
    fn execute(&self, args: &Args) -> Result<Exit> {
        let project = Project::open(self.root.as_deref(), args)?;
        let path = absolute(&self.file)?;
        let text = std::fs::read_to_string(&path)
            .with_context(|| format!("Failed to read {}", self.file))?;

        let current = if self.self_context || is_yaml(&path) {
            document_context(&text, &self.file)
        } else {
            None
        };

        let externals = ExternalVariables::new(&project.settings.external_variables)
            .context("Invalid external variable pattern")?;
        let placeholders =
            parse_text_for_templates(&text, project.workspace.store(), current.as_ref());
        let annotations = classify(placeholders, &externals);

        if !args.global.quiet {
            match self.format {
                OutputFormat::Text => print!("{}", render_text(&text, &annotations)),
                OutputFormat::Json => println!(
                    "{}",
                    serde_json::to_string_pretty(&annotations)
                        .context("Failed to serialize placeholders")?
                ),
            }
        }

        let unresolved = annotations
            .iter()
            .filter(|annotation| annotation.status == MatchStatus::NoMatch)
            .count();

        if unresolved > 0 {
            let word = if unresolved == 1 {
                "placeholder"
            } else {
                "placeholders"
            };
            Ok(Exit::error().with_message(format!(
                "Found {unresolved} unresolved {word} in {}.",
                self.file
            )))
        } else {
            Ok(Exit::success())
        }
    }
}

fn is_yaml(path: &Utf8Path) -> bool {
    matches!(path.extension(), Some("yml" | "yaml"))
}

/// The scanned file as a YAML document. A file that does not parse (such
/// as a template with tags in key positions) just has no context.
fn document_context(text: &str, file: &Utf8Path) -> Option<Value> {
    match parse_document(text) {
        Ok(Value::Null) => None,
        Ok(document) => Some(document),
        Err(err) => {
            tracing::info!(file = %file, error = %err, "scanned file is not usable as YAML context");
            None
        }
    }
}

/// One block per placeholder: `line:col status name`, then its values.
/// Positions are 1-based.
fn render_text(text: &str, annotations: &[Annotation]) -> String {
    let index = LineIndex::from_text(text);
    let mut out = String::new();

    for annotation in annotations {
        let placeholder = &annotation.placeholder;
        let (position, _) = placeholder.span.to_line_col(&index);
        let label = match placeholder.kind {
            PlaceholderKind::Variable => "",
            PlaceholderKind::ForLoop => "for ",
        };
        let _ = writeln!(
            out,
            "{}:{} {} {label}{}",
            position.line() + 1,
            position.column() + 1,
            annotation.status,
            placeholder.name
        );

        for (source, value) in &placeholder.variable_matches {
            let _ = writeln!(out, "    {source}: {value}");
        }
        if let Some(value) = &placeholder.object_match {
            let _ = writeln!(out, "    (this file): {value}");
        }
        if let Some(default) = &placeholder.default_value {
            let _ = writeln!(out, "    default: {default}");
        }
        if !placeholder.unhandled_jinja_options.is_empty() {
            let _ = writeln!(
                out,
                "    filters: {}",
                placeholder.unhandled_jinja_options.join(" | ")
            );
        }
    }

    out
}
