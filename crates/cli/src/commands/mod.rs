// CLI subcommand dispatch.

use clap::Subcommand;

use crate::passthrough::Passthrough;
use crate::Cli;

pub mod build;
pub mod run;

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Run a script in a desktop window (the default)
    Run(run::RunArgs),
    /// Package a script into a standalone executable with PyInstaller
    Build(build::BuildArgs),
}

pub fn run(cli: Cli, passthrough: Passthrough) -> anyhow::Result<()> {
    match cli.command {
        Some(Command::Run(args)) => run::run(args, &passthrough),
        Some(Command::Build(args)) => build::run(args, passthrough),
        None => run::run(cli.run, &passthrough),
    }
}
