// streamlit-desktop CLI: argument parsing, dispatch, and the programmatic entry point.

use std::path::PathBuf;

use clap::{ArgAction, Parser};
use streamlit_desktop_common::{Result, ServerOptions};
use streamlit_desktop_runtime::{launch, LaunchConfig, LaunchOutcome};
use streamlit_desktop_window::TauriWindow;

pub mod commands;
pub mod exit_code;
pub mod logging;
pub mod passthrough;

/// Top-level arguments. Without a subcommand the arguments are those of `run`.
///
/// `--streamlit-options` and `--pyinstaller-options` are split off beforehand
/// by [`passthrough::split_args`].
#[derive(Debug, Parser)]
#[command(
    name = "streamlit-desktop",
    version,
    about = "Run Streamlit apps in a native desktop window, or package them as executables",
    args_conflicts_with_subcommands = true,
    after_help = "Pass-through flags:\n  \
        --streamlit-options ...    forwarded verbatim to `streamlit run`\n  \
        --pyinstaller-options ...  forwarded verbatim to PyInstaller (build only)"
)]
pub struct Cli {
    /// Increase log verbosity (-v, -vv, -vvv)
    #[arg(short, long, action = ArgAction::Count, global = true)]
    pub verbose: u8,

    #[command(subcommand)]
    pub command: Option<commands::Command>,

    #[command(flatten)]
    pub run: commands::run::RunArgs,
}

/// Show `script` in a desktop window and block until the window is closed.
///
/// The server is always stopped before this returns.
pub fn start_desktop_app(
    script: impl Into<PathBuf>,
    title: &str,
    width: u32,
    height: u32,
    options: ServerOptions,
    allow_downloads: bool,
) -> Result<LaunchOutcome> {
    let mut config = LaunchConfig::new(script);
    config.title = title.to_string();
    config.width = width;
    config.height = height;
    config.options = options;
    config.allow_downloads = allow_downloads;
    launch(&config, &TauriWindow::new())
}
