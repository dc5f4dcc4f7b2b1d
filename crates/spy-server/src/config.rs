use std::net::{IpAddr, Ipv4Addr, SocketAddr};

/// Listener options applied to every server a factory produces.
///
/// The default binds `127.0.0.1:0` — an ephemeral port, reported on the
/// running server once bound. Tests that need a fixed port can set one
/// explicitly or through the environment.
#[derive(Debug, Clone)]
pub struct ServerOptions {
    pub host: IpAddr,
    pub port: u16,
}

impl Default for ServerOptions {
    fn default() -> Self {
        Self {
            host: IpAddr::V4(Ipv4Addr::LOCALHOST),
            port: 0,
        }
    }
}

impl ServerOptions {
    pub fn with_port(port: u16) -> Self {
        Self {
            port,
            ..Self::default()
        }
    }

    /// Read options from `SPY_SERVER_HOST` / `SPY_SERVER_PORT`, falling back
    /// to the defaults for anything unset or unparsable.
    pub fn from_env() -> Self {
        let defaults = Self::default();
        Self {
            host: std::env::var("SPY_SERVER_HOST")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(defaults.host),
            port: std::env::var("SPY_SERVER_PORT")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(defaults.port),
        }
    }

    pub(crate) fn bind_addr(&self) -> SocketAddr {
        SocketAddr::new(self.host, self.port)
    }
}
