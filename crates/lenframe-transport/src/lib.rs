//! Blocking byte-stream transports for lenframe.
//!
//! Frames travel over a plain ordered byte stream with no message boundaries:
//! - Unix domain sockets (Linux/macOS)
//! - TCP
//!
//! This is the lowest layer of lenframe. The framing crates only need
//! `Read + Write`; [`ByteStream`] adds socket timeouts and cloning on top.

pub mod address;
pub mod error;
pub mod listener;
pub mod stream;

#[cfg(unix)]
pub mod uds;

pub use address::Address;
pub use error::{Result, TransportError};
pub use listener::{connect, Listener};
pub use stream::ByteStream;

#[cfg(unix)]
pub use uds::UnixDomainSocket;
