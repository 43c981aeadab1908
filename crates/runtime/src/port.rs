// Local port selection for the server subprocess.

use std::io;
use std::net::{Ipv4Addr, TcpListener};

use streamlit_desktop_common::error::ServerStartError;
use streamlit_desktop_common::OptionValue;
use tracing::{debug, warn};

/// True if nothing is bound to `port` on the loopback interface.
pub fn is_port_free(port: u16) -> bool {
    TcpListener::bind((Ipv4Addr::LOCALHOST, port)).is_ok()
}

/// Ask the OS for an unused loopback port.
pub fn find_free_port() -> io::Result<u16> {
    let listener = TcpListener::bind((Ipv4Addr::LOCALHOST, 0))?;
    Ok(listener.local_addr()?.port())
}

/// Pick the port the server will listen on.
///
/// A pre-bound port is used as-is. A requested `server.port` is honored when it
/// parses and is free; otherwise a random free port is chosen.
pub fn select_port(
    prebound: Option<u16>,
    requested: Option<&OptionValue>,
) -> Result<u16, ServerStartError> {
    if let Some(port) = prebound {
        debug!(port, "using pre-bound port");
        return Ok(port);
    }

    if let Some(requested) = requested {
        let raw = requested.to_string();
        match raw.trim().parse::<u16>() {
            Ok(port) if port != 0 && is_port_free(port) => {
                debug!(port, "using requested port");
                return Ok(port);
            }
            Ok(0) => {}
            Ok(port) => warn!(port, "requested port is already in use; picking a free one"),
            Err(_) => warn!(requested = %raw, "invalid port; picking a free one"),
        }
    }

    find_free_port().map_err(ServerStartError::Port)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn free_port_is_nonzero_and_free() {
        let port = find_free_port().unwrap();
        assert_ne!(port, 0);
        assert!(is_port_free(port));
    }

    #[test]
    fn bound_port_is_not_free() {
        let listener = TcpListener::bind((Ipv4Addr::LOCALHOST, 0)).unwrap();
        let port = listener.local_addr().unwrap().port();
        assert!(!is_port_free(port));
    }

    #[test]
    fn prebound_port_wins_even_if_busy() {
        let listener = TcpListener::bind((Ipv4Addr::LOCALHOST, 0)).unwrap();
        let port = listener.local_addr().unwrap().port();
        assert_eq!(select_port(Some(port), None).unwrap(), port);
    }

    #[test]
    fn free_requested_port_is_honored() {
        let port = find_free_port().unwrap();
        let requested = OptionValue::from(port.to_string());
        assert_eq!(select_port(None, Some(&requested)).unwrap(), port);
    }

    #[test]
    fn busy_requested_port_falls_back() {
        let listener = TcpListener::bind((Ipv4Addr::LOCALHOST, 0)).unwrap();
        let busy = listener.local_addr().unwrap().port();
        let requested = OptionValue::Integer(i64::from(busy));

        let chosen = select_port(None, Some(&requested)).unwrap();
        assert_ne!(chosen, busy);
    }

    #[test]
    fn invalid_requested_port_falls_back() {
        let requested = OptionValue::from("not-a-port");
        assert_ne!(select_port(None, Some(&requested)).unwrap(), 0);
    }
}
