// `streamlit-desktop [run] <script>`: show a script in a native window.

use std::ffi::OsString;
use std::path::PathBuf;

use anyhow::Context;
use clap::Args;
use streamlit_desktop_common::config::Settings;
use streamlit_desktop_common::error::{ConfigurationError, Result};
use streamlit_desktop_common::options::{parse_streamlit_options, SERVER_PORT};
use streamlit_desktop_runtime::{launch, LaunchConfig, ServerCommand};
use streamlit_desktop_window::TauriWindow;
use tracing::{info, warn};

use crate::passthrough::{Passthrough, PYINSTALLER_OPTIONS};

#[derive(Debug, Clone, Default, Args)]
pub struct RunArgs {
    /// Streamlit script to run
    pub script: Option<PathBuf>,

    /// Window title
    #[arg(long)]
    pub title: Option<String>,

    /// Window width in pixels
    #[arg(long, value_parser = clap::value_parser!(u32).range(1..))]
    pub width: Option<u32>,

    /// Window height in pixels
    #[arg(long, value_parser = clap::value_parser!(u32).range(1..))]
    pub height: Option<u32>,

    /// Preferred server port; a random free port is used if it is taken
    #[arg(long)]
    pub port: Option<u16>,

    /// Let the window save files the app offers for download
    #[arg(long = "allow-download")]
    pub allow_download: bool,

    /// Program that serves the script (replaces the configured `streamlit`)
    #[arg(long, value_name = "PROGRAM")]
    pub server_program: Option<OsString>,

    /// Argument placed before the script path; repeatable
    #[arg(long = "server-arg", value_name = "ARG", allow_hyphen_values = true)]
    pub server_args: Vec<OsString>,
}

pub fn run(args: RunArgs, passthrough: &Passthrough) -> anyhow::Result<()> {
    if !passthrough.pyinstaller_options.is_empty() {
        warn!("{PYINSTALLER_OPTIONS} only applies to `build`; ignoring");
    }

    let settings = Settings::load()?.with_env_overrides();
    let config = launch_config(args, &passthrough.streamlit_options, &settings)?;

    let outcome = launch(&config, &TauriWindow::new())
        .with_context(|| format!("failed to run {}", config.script.display()))?;
    info!(
        pid = outcome.server_pid,
        port = outcome.port,
        status = %outcome.server_status,
        "server stopped"
    );
    Ok(())
}

/// Resolve CLI arguments against the user's settings.
pub fn launch_config(
    args: RunArgs,
    streamlit_options: &[String],
    settings: &Settings,
) -> Result<LaunchConfig> {
    let script = args.script.ok_or_else(|| {
        ConfigurationError::InvalidArgument("a script to run is required".into())
    })?;

    let mut config = LaunchConfig::new(script).with_settings(&settings.window, &settings.server);
    if let Some(title) = args.title {
        config.title = title;
    }
    if let Some(width) = args.width {
        config.width = width;
    }
    if let Some(height) = args.height {
        config.height = height;
    }
    config.allow_downloads = args.allow_download;

    config.options = parse_streamlit_options(streamlit_options);
    if let Some(port) = args.port {
        config.options.insert(SERVER_PORT, port);
    }

    match args.server_program {
        Some(program) => {
            config.server = ServerCommand {
                program,
                args: args.server_args,
            };
        }
        None if !args.server_args.is_empty() => config.server.args = args.server_args,
        None => {}
    }

    Ok(config)
}
