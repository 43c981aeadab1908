// Error categories shared by the launcher, the builder, and the CLI.
//
//   Configuration  bad input, fix and re-run
//   ServerStart    the server never became reachable
//   Build          the packaging tool failed
//   Window         the native window could not be opened or run

use std::io;
use std::path::PathBuf;
use std::process::ExitStatus;
use std::time::Duration;

use thiserror::Error;

pub type Result<T, E = Error> = std::result::Result<T, E>;

#[derive(Debug, Error)]
pub enum Error {
    #[error(transparent)]
    Configuration(#[from] ConfigurationError),

    #[error(transparent)]
    ServerStart(#[from] ServerStartError),

    #[error(transparent)]
    Build(#[from] BuildError),

    #[error("native window failed: {0}")]
    Window(String),

    #[error("native window failed")]
    WindowBackend(#[source] Box<dyn std::error::Error + Send + Sync + 'static>),

    #[error("failed to stop server process")]
    ServerStop(#[source] io::Error),
}

impl Error {
    /// Exit code reported by the packaging tool, if this error carries one.
    pub fn tool_exit_code(&self) -> Option<i32> {
        match self {
            Self::Build(BuildError::ToolFailed { code, .. }) => Some(*code),
            _ => None,
        }
    }
}

#[derive(Debug, Error)]
pub enum ConfigurationError {
    #[error("the script `{}` does not exist", .0.display())]
    ScriptNotFound(PathBuf),

    #[error("failed to read script `{}`", path.display())]
    ScriptUnreadable {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("the icon `{}` does not exist", .0.display())]
    IconNotFound(PathBuf),

    #[error("invalid argument: {0}")]
    InvalidArgument(String),

    #[error("failed to read config file `{}`", path.display())]
    ConfigRead {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("failed to parse config file `{}`", path.display())]
    ConfigParse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },
}

#[derive(Debug, Error)]
pub enum ServerStartError {
    #[error("failed to reserve a local port")]
    Port(#[source] io::Error),

    #[error("failed to spawn server `{program}`")]
    Spawn {
        program: String,
        #[source]
        source: io::Error,
    },

    #[error("server exited before accepting connections ({status})")]
    Exited { status: ExitStatus },

    #[error("server did not accept connections on port {port} within {timeout:?}")]
    Timeout { port: u16, timeout: Duration },

    #[error("failed to build readiness probe runtime")]
    Runtime(#[source] io::Error),
}

#[derive(Debug, Error)]
pub enum BuildError {
    #[error("failed to write entry script")]
    EntryScript(#[source] io::Error),

    #[error("failed to spawn packaging tool `{program}`")]
    Spawn {
        program: String,
        #[source]
        source: io::Error,
    },

    #[error("packaging tool `{program}` exited with code {code}")]
    ToolFailed { program: String, code: i32 },

    #[error("packaging tool `{program}` was terminated ({status})")]
    ToolTerminated { program: String, status: ExitStatus },

    #[error("could not locate the launcher binary to bundle")]
    LauncherBinary(#[source] io::Error),
}
