// Server subprocess ownership: spawn, liveness, and guaranteed teardown.

use std::ffi::OsString;
use std::io;
use std::path::Path;
use std::process::{Child, Command, ExitStatus, Stdio};
use std::time::{Duration, Instant};

use streamlit_desktop_common::config::ServerSettings;
use streamlit_desktop_common::error::ServerStartError;
use streamlit_desktop_common::options::LOOPBACK_HOST;
use streamlit_desktop_common::ServerOptions;
use tracing::{debug, info, warn};

/// How long a terminated server gets to exit before it is killed.
const SHUTDOWN_GRACE: Duration = Duration::from_secs(3);
const SHUTDOWN_POLL_INTERVAL: Duration = Duration::from_millis(50);

/// Program and leading arguments used to start the server.
///
/// The spawned command line is `program args... <script> --key=value...`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServerCommand {
    pub program: OsString,
    pub args: Vec<OsString>,
}

impl Default for ServerCommand {
    fn default() -> Self {
        Self::from(&ServerSettings::default())
    }
}

impl From<&ServerSettings> for ServerCommand {
    fn from(settings: &ServerSettings) -> Self {
        Self {
            program: OsString::from(&settings.program),
            args: settings.args.iter().map(OsString::from).collect(),
        }
    }
}

impl ServerCommand {
    pub fn new(program: impl Into<OsString>) -> Self {
        Self {
            program: program.into(),
            args: Vec::new(),
        }
    }

    pub fn arg(mut self, arg: impl Into<OsString>) -> Self {
        self.args.push(arg.into());
        self
    }

    /// Full argument vector (after the program) for `script` and `options`.
    pub fn command_args(&self, script: &Path, options: &ServerOptions) -> Vec<OsString> {
        let mut args = self.args.clone();
        args.push(script.as_os_str().to_os_string());
        args.extend(options.to_args().into_iter().map(OsString::from));
        args
    }
}

/// Exclusive owner of one running server subprocess.
///
/// Dropping the handle terminates the subprocess if it is still running.
pub struct ServerHandle {
    child: Child,
    pid: u32,
    host: &'static str,
    port: u16,
    alive: bool,
}

impl ServerHandle {
    /// Spawn the server without waiting for it to become reachable.
    pub fn spawn(
        command: &ServerCommand,
        script: &Path,
        options: &ServerOptions,
        port: u16,
    ) -> Result<Self, ServerStartError> {
        let args = command.command_args(script, options);
        debug!(program = ?command.program, ?args, "spawning server");

        let child = Command::new(&command.program)
            .args(&args)
            .stdin(Stdio::null())
            .stdout(Stdio::inherit())
            .stderr(Stdio::inherit())
            .spawn()
            .map_err(|source| ServerStartError::Spawn {
                program: command.program.to_string_lossy().into_owned(),
                source,
            })?;

        let pid = child.id();
        info!(pid, port, "server process started");
        Ok(Self {
            child,
            pid,
            host: LOOPBACK_HOST,
            port,
            alive: true,
        })
    }

    pub fn pid(&self) -> u32 {
        self.pid
    }

    pub fn host(&self) -> &str {
        self.host
    }

    pub fn port(&self) -> u16 {
        self.port
    }

    pub fn url(&self) -> String {
        format!("http://{}:{}", self.host, self.port)
    }

    /// False once the process has been reaped.
    pub fn is_alive(&self) -> bool {
        self.alive
    }

    /// Exit status if the process has already exited, without blocking.
    pub fn try_exit_status(&mut self) -> io::Result<Option<ExitStatus>> {
        let status = self.child.try_wait()?;
        if status.is_some() {
            self.alive = false;
        }
        Ok(status)
    }

    /// Terminate the server and wait for it to exit.
    pub fn shutdown(mut self) -> io::Result<ExitStatus> {
        self.terminate()
    }

    /// Ask the process to exit, then kill it if it is still running after
    /// [`SHUTDOWN_GRACE`]. Always reaps the process.
    fn terminate(&mut self) -> io::Result<ExitStatus> {
        if let Some(status) = self.try_exit_status()? {
            debug!(pid = self.pid, %status, "server already exited");
            return Ok(status);
        }

        info!(pid = self.pid, "stopping server");
        if let Err(error) = request_shutdown(&mut self.child) {
            warn!(pid = self.pid, %error, "graceful shutdown request failed");
        }

        let deadline = Instant::now() + SHUTDOWN_GRACE;
        while Instant::now() < deadline {
            match self.try_exit_status() {
                Ok(Some(status)) => {
                    info!(pid = self.pid, %status, "server stopped");
                    return Ok(status);
                }
                Ok(None) => std::thread::sleep(SHUTDOWN_POLL_INTERVAL),
                Err(error) => {
                    warn!(pid = self.pid, %error, "failed to poll server status");
                    break;
                }
            }
        }

        warn!(pid = self.pid, "server did not exit in time; killing");
        match self.child.kill() {
            Ok(()) => {}
            // Already exited between the last poll and the kill.
            Err(error) if error.kind() == io::ErrorKind::InvalidInput => {}
            Err(error) => return Err(error),
        }
        let status = self.child.wait()?;
        self.alive = false;
        Ok(status)
    }
}

impl Drop for ServerHandle {
    fn drop(&mut self) {
        if self.alive {
            if let Err(error) = self.terminate() {
                warn!(pid = self.pid, %error, "failed to stop server during cleanup");
            }
        }
    }
}

#[cfg(unix)]
fn request_shutdown(child: &mut Child) -> io::Result<()> {
    let status = Command::new("kill")
        .arg("-TERM")
        .arg(child.id().to_string())
        .stdout(Stdio::null())
        .stderr(Stdio::null())
        .status()?;
    if !status.success() {
        return Err(io::Error::other(format!(
            "kill command returned non-zero status: {status}"
        )));
    }
    Ok(())
}

// There is no catchable termination signal for console processes here.
#[cfg(not(unix))]
fn request_shutdown(child: &mut Child) -> io::Result<()> {
    child.kill()
}
