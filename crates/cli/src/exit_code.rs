// Consistent exit codes for the streamlit-desktop CLI.
//
//   0  = success
//   1  = general error
//   2  = usage/configuration error
//   10 = server did not start
//   11 = native window failed
//   N  = packaging tool exited with N

use std::process;

use streamlit_desktop_common::Error;

/// Named exit codes for the CLI.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExitCode {
    Success,
    Error,
    Usage,
    ServerStart,
    Window,
    /// Propagated from the packaging tool.
    Tool(i32),
}

impl ExitCode {
    pub fn code(self) -> i32 {
        match self {
            Self::Success => 0,
            Self::Error => 1,
            Self::Usage => 2,
            Self::ServerStart => 10,
            Self::Window => 11,
            Self::Tool(code) => code,
        }
    }

    /// Map an anyhow error to an exit code by inspecting the error chain.
    pub fn from_error(err: &anyhow::Error) -> Self {
        err.chain()
            .find_map(|cause| cause.downcast_ref::<Error>())
            .map_or(Self::Error, Self::from_app_error)
    }

    pub fn from_app_error(err: &Error) -> Self {
        if let Some(code) = err.tool_exit_code() {
            return Self::Tool(code);
        }
        match err {
            Error::Configuration(_) => Self::Usage,
            Error::ServerStart(_) => Self::ServerStart,
            Error::Window(_) | Error::WindowBackend(_) => Self::Window,
            Error::Build(_) | Error::ServerStop(_) => Self::Error,
        }
    }
}

impl From<ExitCode> for process::ExitCode {
    fn from(code: ExitCode) -> Self {
        // Codes outside 1..=255 cannot be reported faithfully on every platform.
        match u8::try_from(code.code()) {
            Ok(0) if code != ExitCode::Success => process::ExitCode::FAILURE,
            Ok(value) => process::ExitCode::from(value),
            Err(_) => process::ExitCode::FAILURE,
        }
    }
}
