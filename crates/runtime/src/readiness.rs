// Wait for the server subprocess to accept TCP connections on loopback.

use std::time::Duration;

use streamlit_desktop_common::error::ServerStartError;
use tokio::net::TcpStream;
use tokio::time::{sleep, timeout, Instant};
use tracing::{debug, info, warn};

use crate::server::ServerHandle;

pub const POLL_INTERVAL: Duration = Duration::from_millis(100);
pub const DEFAULT_STARTUP_TIMEOUT: Duration = Duration::from_secs(10);
const CONNECT_TIMEOUT: Duration = Duration::from_millis(500);

/// Block the calling thread until the server is reachable.
pub fn wait_until_ready(
    server: &mut ServerHandle,
    startup_timeout: Duration,
) -> Result<(), ServerStartError> {
    let runtime = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
        .map_err(ServerStartError::Runtime)?;
    runtime.block_on(wait_for_server(server, startup_timeout))
}

/// Poll the server's port every [`POLL_INTERVAL`] until it accepts a
/// connection, the process exits, or `startup_timeout` elapses.
pub async fn wait_for_server(
    server: &mut ServerHandle,
    startup_timeout: Duration,
) -> Result<(), ServerStartError> {
    let address = format!("{}:{}", server.host(), server.port());
    let deadline = Instant::now() + startup_timeout;
    let mut attempts = 0usize;

    loop {
        attempts += 1;
        match server.try_exit_status() {
            Ok(Some(status)) => return Err(ServerStartError::Exited { status }),
            Ok(None) => {}
            Err(error) => warn!(pid = server.pid(), %error, "failed to poll server status"),
        }

        match timeout(CONNECT_TIMEOUT, TcpStream::connect(address.as_str())).await {
            Ok(Ok(_stream)) => {
                info!(%address, attempts, "server is accepting connections");
                return Ok(());
            }
            Ok(Err(error)) => debug!(%address, %error, "server not reachable yet"),
            Err(_) => debug!(%address, "connect attempt timed out"),
        }

        if Instant::now() >= deadline {
            return Err(ServerStartError::Timeout {
                port: server.port(),
                timeout: startup_timeout,
            });
        }
        sleep(POLL_INTERVAL).await;
    }
}
