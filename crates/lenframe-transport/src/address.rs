use std::fmt;
use std::path::{Path, PathBuf};
use std::str::FromStr;

use crate::error::TransportError;

/// Where a stream endpoint lives.
///
/// Parsed from `unix:<path>`, `tcp:<host>:<port>`, a bare filesystem path
/// (anything containing `/`) or a bare `<host>:<port>`.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Address {
    /// Filesystem-path Unix domain socket.
    Unix(PathBuf),
    /// TCP `host:port`, resolved at bind/connect time.
    Tcp(String),
}

impl Address {
    /// Build a Unix socket address.
    pub fn unix(path: impl AsRef<Path>) -> Self {
        Address::Unix(path.as_ref().to_path_buf())
    }

    /// Build a TCP address.
    pub fn tcp(host_port: impl Into<String>) -> Self {
        Address::Tcp(host_port.into())
    }

    /// Transport name for diagnostics.
    pub fn transport_name(&self) -> &'static str {
        match self {
            Address::Unix(_) => "unix-domain-socket",
            Address::Tcp(_) => "tcp",
        }
    }
}

impl fmt::Display for Address {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Address::Unix(path) => write!(f, "unix:{}", path.display()),
            Address::Tcp(host_port) => write!(f, "tcp:{host_port}"),
        }
    }
}

impl FromStr for Address {
    type Err = TransportError;

    fn from_str(input: &str) -> Result<Self, Self::Err> {
        let invalid = |reason: &str| TransportError::InvalidAddress {
            input: input.to_string(),
            reason: reason.to_string(),
        };

        let trimmed = input.trim();
        if trimmed.is_empty() {
            return Err(invalid("address must not be empty"));
        }

        if let Some(path) = trimmed.strip_prefix("unix:") {
            if path.is_empty() {
                return Err(invalid("unix socket path must not be empty"));
            }
            return Ok(Address::unix(path));
        }

        if let Some(host_port) = trimmed.strip_prefix("tcp:") {
            validate_host_port(host_port).map_err(invalid)?;
            return Ok(Address::tcp(host_port));
        }

        if trimmed.contains('/') {
            return Ok(Address::unix(trimmed));
        }

        validate_host_port(trimmed).map_err(invalid)?;
        Ok(Address::tcp(trimmed))
    }
}

fn validate_host_port(host_port: &str) -> Result<(), &'static str> {
    let (host, port) = host_port
        .rsplit_once(':')
        .ok_or("expected <host>:<port> or a socket path")?;
    if host.is_empty() {
        return Err("host must not be empty");
    }
    port.parse::<u16>().map_err(|_| "port must be 0-65535")?;
    Ok(())
}
