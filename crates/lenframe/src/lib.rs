//! Length-prefixed JSON message framing for stream sockets.
//!
//! Each message travels as a big-endian length prefix (4 bytes by default)
//! followed by that many bytes of JSON.
//!
//! # Crate Structure
//!
//! - [`transport`]: Blocking byte streams (Unix domain sockets, TCP)
//! - [`frame`]: Frame decoder state machine, encoder, blocking reader/writer
//! - [`json`]: JSON payloads on top of frames (behind `json` feature)

/// Re-export transport types.
pub mod transport {
    pub use lenframe_transport::*;
}

/// Re-export frame types.
pub mod frame {
    pub use lenframe_frame::*;
}

/// Re-export JSON message types (requires `json` feature).
#[cfg(feature = "json")]
pub mod json {
    pub use lenframe_json::*;
}
