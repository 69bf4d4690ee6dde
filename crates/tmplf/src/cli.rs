use std::process::ExitCode;

use anyhow::Result;
use clap::Parser;

use crate::args::Args;
use crate::commands::Command;
use crate::commands::TmplfCommand;

/// The main CLI structure that defines the command-line interface
#[derive(Parser)]
#[command(name = "tmplf")]
#[command(version, about = "Resolve template placeholders against YAML variable files")]
pub struct Cli {
    #[command(subcommand)]
    pub command: TmplfCommand,

    #[command(flatten)]
    pub args: Args,
}

/// Parse CLI arguments and execute the chosen command
pub fn run(args: Vec<String>) -> Result<ExitCode> {
    let cli = Cli::try_parse_from(args).unwrap_or_else(|e| {
        e.exit();
    });

    let exit = match &cli.command {
        TmplfCommand::Scan(command) => command.execute(&cli.args)?,
        TmplfCommand::Definition(command) => command.execute(&cli.args)?,
        TmplfCommand::Files(command) => command.execute(&cli.args)?,
    };

    Ok(exit.report(cli.args.global.quiet))
}
