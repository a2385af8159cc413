use std::net::{TcpListener, TcpStream};

use tracing::{debug, info};

use crate::address::Address;
use crate::error::{Result, TransportError};
use crate::stream::ByteStream;
#[cfg(unix)]
use crate::uds::UnixDomainSocket;

/// A bound listener for either transport kind.
pub enum Listener {
    #[cfg(unix)]
    Unix(UnixDomainSocket),
    Tcp(TcpListener),
}

impl Listener {
    /// Bind to `addr`.
    pub fn bind(addr: &Address) -> Result<Self> {
        match addr {
            #[cfg(unix)]
            Address::Unix(path) => Ok(Listener::Unix(UnixDomainSocket::bind(path)?)),
            #[cfg(not(unix))]
            Address::Unix(_) => Err(TransportError::Unsupported(addr.to_string())),
            Address::Tcp(host_port) => {
                let listener =
                    TcpListener::bind(host_port.as_str()).map_err(|source| TransportError::Bind {
                        addr: host_port.clone(),
                        source,
                    })?;
                info!(addr = %host_port, "listening on tcp");
                Ok(Listener::Tcp(listener))
            }
        }
    }

    /// Accept one connection (blocking).
    pub fn accept(&self) -> Result<ByteStream> {
        match self {
            #[cfg(unix)]
            Listener::Unix(uds) => uds.accept(),
            Listener::Tcp(listener) => {
                let (stream, peer) = listener.accept().map_err(TransportError::Accept)?;
                stream.set_nodelay(true)?;
                debug!(%peer, "accepted tcp connection");
                Ok(ByteStream::from_tcp(stream))
            }
        }
    }

    /// The address actually bound. For TCP this carries the resolved port.
    pub fn local_addr(&self) -> Result<Address> {
        match self {
            #[cfg(unix)]
            Listener::Unix(uds) => Ok(Address::unix(uds.path())),
            Listener::Tcp(listener) => Ok(Address::tcp(listener.local_addr()?.to_string())),
        }
    }
}

/// Connect to `addr` (blocking).
pub fn connect(addr: &Address) -> Result<ByteStream> {
    match addr {
        #[cfg(unix)]
        Address::Unix(path) => UnixDomainSocket::connect(path),
        #[cfg(not(unix))]
        Address::Unix(_) => Err(TransportError::Unsupported(addr.to_string())),
        Address::Tcp(host_port) => {
            let stream =
                TcpStream::connect(host_port.as_str()).map_err(|source| TransportError::Connect {
                    addr: host_port.clone(),
                    source,
                })?;
            stream.set_nodelay(true)?;
            debug!(addr = %host_port, "connected over tcp");
            Ok(ByteStream::from_tcp(stream))
        }
    }
}
