use anyhow::Result;
use camino::Utf8PathBuf;
use clap::Parser;
use tmplf_vars::find_in_corpus;
use tmplf_workspace::find_definition;

use crate::args::Args;
use crate::commands::Command;
use crate::commands::Project;
use crate::exit::Exit;

#[derive(Debug, Parser)]
pub struct Definition {
    /// Dotted variable name, as written in a placeholder.
    name: String,

    /// Project root holding the variable files. Defaults to the current
    /// directory.
    #[arg(long)]
    root: Option<Utf8PathBuf>,
}

impl Command for Definition {
    fn execute(&self, args: &Args) -> Result<Exit> {
        let project = Project::open(self.root.as_deref(), args)?;
        let workspace = &project.workspace;
        let name = self.name.trim();

        let matches = find_in_corpus(name, &workspace.store().snapshot());
        if matches.is_empty() {
            return Ok(Exit::error().with_message(format!("No definition found for `{name}`.")));
        }

        for source in matches.keys() {
            let position = workspace.path_of(source).and_then(|path| {
                match std::fs::read_to_string(path) {
                    Ok(text) => find_definition(&text, name),
                    Err(err) => {
                        tracing::warn!(path = %path, error = %err, "failed to reread variable file");
                        None
                    }
                }
            });

            if args.global.quiet {
                continue;
            }
            match position {
                Some(position) => println!(
                    "{source}:{}:{}",
                    position.line() + 1,
                    position.column() + 1
                ),
                None => println!("{source}"),
            }
        }

        Ok(Exit::success())
    }
}
