use anyhow::Result;
use camino::Utf8PathBuf;
use clap::Parser;

use crate::args::Args;
use crate::commands::Command;
use crate::commands::Project;
use crate::exit::Exit;

#[derive(Debug, Parser)]
pub struct Files {
    /// Project root holding the variable files. Defaults to the current
    /// directory.
    #[arg(long)]
    root: Option<Utf8PathBuf>,
}

impl Command for Files {
    fn execute(&self, args: &Args) -> Result<Exit> {
        let project = Project::open(self.root.as_deref(), args)?;
        let store = project.workspace.store();

        if !args.global.quiet {
            for (source, document) in store.iter() {
                if document.is_null() {
                    println!("{source} (empty or unparsable)");
                } else {
                    println!("{source}");
                }
            }
        }

        let count = store.len();
        let word = if count == 1 { "file" } else { "files" };
        Ok(Exit::success().with_message(format!("Found {count} variable {word}.")))
    }
}
