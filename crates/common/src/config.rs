// User configuration file for streamlit-desktop.
//
// Location: `<config dir>/streamlit-desktop/config.toml`
// Every section is optional; missing keys fall back to defaults.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::{ConfigurationError, Result};

/// Replaces `server.program` when set.
pub const SERVER_BIN_ENV: &str = "STREAMLIT_DESKTOP_SERVER_BIN";
/// Replaces `packager.program` when set.
pub const PYINSTALLER_BIN_ENV: &str = "STREAMLIT_DESKTOP_PYINSTALLER_BIN";

/// Directory holding streamlit-desktop configuration.
pub fn config_dir() -> Option<PathBuf> {
    dirs::config_dir().map(|d| d.join("streamlit-desktop"))
}

/// Path to the user config file.
pub fn config_path() -> Option<PathBuf> {
    config_dir().map(|d| d.join("config.toml"))
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct Settings {
    pub window: WindowSettings,
    pub server: ServerSettings,
    pub packager: PackagerSettings,
}

impl Settings {
    /// Load the user config file. A missing file yields defaults; a file that
    /// exists but does not parse is an error.
    pub fn load() -> Result<Self> {
        match config_path() {
            Some(path) if path.exists() => Self::load_from(&path),
            _ => Ok(Self::default()),
        }
    }

    /// Load from a specific path.
    pub fn load_from(path: &Path) -> Result<Self> {
        let contents =
            std::fs::read_to_string(path).map_err(|source| ConfigurationError::ConfigRead {
                path: path.to_path_buf(),
                source,
            })?;
        let settings = toml::from_str(&contents).map_err(|source| {
            ConfigurationError::ConfigParse {
                path: path.to_path_buf(),
                source,
            }
        })?;
        Ok(settings)
    }

    /// Apply environment overrides from the process environment.
    pub fn with_env_overrides(self) -> Self {
        self.with_overrides_from(|key| std::env::var(key).ok())
    }

    /// Apply environment overrides from `lookup` (testable variant).
    pub fn with_overrides_from<F>(mut self, lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(program) = lookup(SERVER_BIN_ENV).filter(|v| !v.is_empty()) {
            tracing::debug!(%program, "server program overridden from environment");
            self.server.program = program;
        }
        if let Some(program) = lookup(PYINSTALLER_BIN_ENV).filter(|v| !v.is_empty()) {
            tracing::debug!(%program, "packager program overridden from environment");
            self.packager.program = program;
        }
        self
    }
}

/// Defaults for the desktop window in run mode.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct WindowSettings {
    pub title: String,
    pub width: u32,
    pub height: u32,
}

impl Default for WindowSettings {
    fn default() -> Self {
        Self {
            title: "Streamlit Desktop App".into(),
            width: 1024,
            height: 768,
        }
    }
}

/// How the Streamlit server is started.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct ServerSettings {
    /// Executable to spawn (defaults to `"streamlit"`).
    pub program: String,
    /// Arguments placed before the script path (defaults to `["run"]`).
    pub args: Vec<String>,
    /// How long to wait for the server to accept connections.
    pub startup_timeout_ms: u64,
}

impl Default for ServerSettings {
    fn default() -> Self {
        Self {
            program: "streamlit".into(),
            args: vec!["run".into()],
            startup_timeout_ms: 10_000,
        }
    }
}

/// How PyInstaller is invoked.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct PackagerSettings {
    /// Executable to spawn (defaults to `"pyinstaller"`).
    pub program: String,
    /// Arguments placed before the generated flags, e.g. `["-m", "PyInstaller"]`
    /// when `program` is a Python interpreter.
    pub args: Vec<String>,
}

impl Default for PackagerSettings {
    fn default() -> Self {
        Self {
            program: "pyinstaller".into(),
            args: Vec::new(),
        }
    }
}
