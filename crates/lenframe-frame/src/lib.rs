//! Big-endian length-prefixed framing over unbounded byte streams.
//!
//! This is the core of lenframe. Every message on the wire is:
//! - A length prefix of `prefix_width` bytes (default 4), big-endian unsigned
//! - Exactly that many payload bytes
//!
//! [`FrameDecoder`] reassembles frames from arbitrarily chunked input and
//! [`encode_frame`] produces the matching bytes. [`FrameReader`] and
//! [`FrameWriter`] wrap blocking streams; with the `async` feature,
//! [`LengthPrefixedCodec`] plugs into `tokio_util::codec`.

pub mod config;
pub mod decoder;
pub mod encoder;
pub mod error;
pub mod reader;
pub mod writer;

#[cfg(feature = "async")]
pub mod codec;

#[cfg(feature = "async")]
pub use codec::LengthPrefixedCodec;
pub use config::{
    FrameConfig, PrefixWidth, DEFAULT_MAX_PAYLOAD, DEFAULT_PREFIX_WIDTH, MAX_PREFIX_WIDTH,
};
pub use decoder::FrameDecoder;
pub use encoder::{encode_frame, encode_frame_to_bytes, encoded_len};
pub use error::{FrameError, Result};
pub use reader::{FrameReader, Frames};
pub use writer::FrameWriter;
