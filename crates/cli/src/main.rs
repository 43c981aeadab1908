// streamlit-desktop CLI entry point.

use std::process;

use clap::Parser;
use streamlit_desktop_cli::exit_code::ExitCode;
use streamlit_desktop_cli::{commands, logging, passthrough, Cli};

fn main() -> process::ExitCode {
    let (args, passthrough) = passthrough::split_args(std::env::args_os());
    let cli = Cli::parse_from(args);
    logging::init(cli.verbose);

    match commands::run(cli, passthrough) {
        Ok(()) => ExitCode::Success.into(),
        Err(err) => {
            eprintln!("error: {err:#}");
            ExitCode::from_error(&err).into()
        }
    }
}
