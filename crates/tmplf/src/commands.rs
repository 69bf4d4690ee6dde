mod definition;
mod files;
mod scan;

use anyhow::Context;
use anyhow::Result;
use camino::Utf8Path;
use camino::Utf8PathBuf;
use clap::Subcommand;
use tmplf_conf::Settings;
use tmplf_workspace::Workspace;

use crate::args::Args;
use crate::exit::Exit;
use crate::logging::init_tracing;

pub trait Command {
    fn execute(&self, args: &Args) -> Result<Exit>;
}

#[derive(Debug, Subcommand)]
pub enum TmplfCommand {
    /// Find placeholders in a file and resolve them against the variable files
    Scan(self::scan::Scan),
    /// Show where a variable is defined
    Definition(self::definition::Definition),
    /// List the variable files of the project
    Files(self::files::Files),
}

/// A project root with its settings and loaded variable files.
pub struct Project {
    pub settings: Settings,
    pub workspace: Workspace,
}

impl Project {
    /// Load settings from `root` (the current directory when omitted),
    /// start logging, then discover and load the variable files.
    pub fn open(root: Option<&Utf8Path>, args: &Args) -> Result<Self> {
        let root = resolve_project_root(root)?;
        let settings = Settings::new(&root).context("Failed to load settings")?;
        init_tracing(&args.global, settings.debug);

        let workspace = Workspace::load(&root, &settings.variables)
            .with_context(|| format!("Failed to load variable files under {root}"))?;

        tracing::info!(
            root = %workspace.root(),
            sources = workspace.store().len(),
            "opened project"
        );

        Ok(Self {
            settings,
            workspace,
        })
    }
}

fn resolve_project_root(root: Option<&Utf8Path>) -> Result<Utf8PathBuf> {
    let cwd = current_dir()?;
    let root = match root {
        Some(root) if root.is_relative() => cwd.join(root),
        Some(root) => root.to_owned(),
        None => cwd,
    };
    let canonical = root
        .canonicalize_utf8()
        .with_context(|| format!("Project root {root} does not exist"))?;
    Ok(canonical)
}

fn current_dir() -> Result<Utf8PathBuf> {
    let cwd = std::env::current_dir().context("Failed to get current directory")?;
    Utf8PathBuf::from_path_buf(cwd)
        .map_err(|_| anyhow::anyhow!("Current directory is not valid UTF-8"))
}

/// Resolve a user-supplied path against the current directory.
fn absolute(path: &Utf8Path) -> Result<Utf8PathBuf> {
    if path.is_relative() {
        Ok(current_dir()?.join(path))
    } else {
        Ok(path.to_owned())
    }
}
