// Desktop launcher: server subprocess + native window, torn down together.
//
// launch()
//   validate config        -> Configuration error, nothing spawned
//   select port, merge options
//   spawn server           -> ServerHandle (dropped = terminated)
//   wait until reachable   -> ServerStart error on timeout / early exit
//   renderer.open()        -> blocks until the window closes
//   shutdown server        -> always, including renderer failure

use std::io;
use std::path::PathBuf;
use std::process::ExitStatus;
use std::time::Duration;

use streamlit_desktop_common::config::{ServerSettings, WindowSettings};
use streamlit_desktop_common::error::{ConfigurationError, Error, Result};
use streamlit_desktop_common::options::{self, SERVER_PORT};
use streamlit_desktop_common::ServerOptions;
use tracing::{info, warn};

use crate::port::select_port;
use crate::readiness::{wait_until_ready, DEFAULT_STARTUP_TIMEOUT};
use crate::server::{ServerCommand, ServerHandle};

/// Everything needed to show one script in a desktop window.
#[derive(Debug, Clone)]
pub struct LaunchConfig {
    pub script: PathBuf,
    pub title: String,
    pub width: u32,
    pub height: u32,
    /// Extra server options; these win over the embedding defaults.
    pub options: ServerOptions,
    pub allow_downloads: bool,
    pub server: ServerCommand,
    /// Port already reserved by the caller. Skips port selection.
    pub port: Option<u16>,
    pub startup_timeout: Duration,
}

impl LaunchConfig {
    pub fn new(script: impl Into<PathBuf>) -> Self {
        let window = WindowSettings::default();
        Self {
            script: script.into(),
            title: window.title,
            width: window.width,
            height: window.height,
            options: ServerOptions::new(),
            allow_downloads: false,
            server: ServerCommand::default(),
            port: None,
            startup_timeout: DEFAULT_STARTUP_TIMEOUT,
        }
    }

    /// Apply window and server settings from the user config file.
    pub fn with_settings(mut self, window: &WindowSettings, server: &ServerSettings) -> Self {
        self.title = window.title.clone();
        self.width = window.width;
        self.height = window.height;
        self.server = ServerCommand::from(server);
        self.startup_timeout = Duration::from_millis(server.startup_timeout_ms);
        self
    }

    pub fn validate(&self) -> Result<()> {
        if !self.script.exists() {
            return Err(ConfigurationError::ScriptNotFound(self.script.clone()).into());
        }
        if self.width == 0 || self.height == 0 {
            return Err(ConfigurationError::InvalidArgument(format!(
                "window size must be positive, got {}x{}",
                self.width, self.height
            ))
            .into());
        }
        Ok(())
    }

    /// Options passed to the server once `port` is known.
    ///
    /// `server.port` from the caller is consumed by port selection, so the
    /// chosen port always reaches the server.
    pub fn server_options(&self, port: u16) -> ServerOptions {
        let defaults = ServerOptions::embedding_defaults(port, self.allow_downloads);
        let mut overrides = self.options.clone();
        overrides.remove(SERVER_PORT);

        for key in options::overridden_embedding_keys(&defaults, &overrides) {
            warn!(option = key, "overriding a setting the desktop window relies on");
        }
        options::merge(&defaults, &overrides)
    }
}

/// What the native window is asked to show.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WindowSpec {
    pub url: String,
    pub title: String,
    pub width: u32,
    pub height: u32,
    pub allow_downloads: bool,
}

/// A native window host. `open` blocks until the user closes the window.
pub trait WindowRenderer {
    fn open(&self, spec: &WindowSpec) -> Result<()>;
}

/// Result of a completed launch.
#[derive(Debug, Clone, Copy)]
pub struct LaunchOutcome {
    pub server_pid: u32,
    pub port: u16,
    pub server_status: ExitStatus,
}

/// Run `config.script` in a desktop window and return once the window closes.
pub fn launch(config: &LaunchConfig, renderer: &dyn WindowRenderer) -> Result<LaunchOutcome> {
    config.validate()?;

    let port = select_port(config.port, config.options.get(SERVER_PORT))?;
    let options = config.server_options(port);

    let mut server = ServerHandle::spawn(&config.server, &config.script, &options, port)?;
    wait_until_ready(&mut server, config.startup_timeout)?;

    let spec = WindowSpec {
        url: server.url(),
        title: config.title.clone(),
        width: config.width,
        height: config.height,
        allow_downloads: config.allow_downloads,
    };
    info!(url = %spec.url, title = %spec.title, "opening window");
    let window_result = renderer.open(&spec);
    info!("window closed");

    let server_pid = server.pid();
    let server_status = settle(window_result, server.shutdown())?;

    Ok(LaunchOutcome {
        server_pid,
        port,
        server_status,
    })
}

/// Combine the window result with the server teardown result. A window error
/// wins; a teardown failure alongside it is logged.
fn settle(window: Result<()>, shutdown: io::Result<ExitStatus>) -> Result<ExitStatus> {
    match (window, shutdown) {
        (Ok(()), shutdown) => shutdown.map_err(Error::ServerStop),
        (Err(window_error), Ok(_)) => Err(window_error),
        (Err(window_error), Err(error)) => {
            warn!(%error, "failed to stop server after the window failed");
            Err(window_error)
        }
    }
}
