/// Errors that can occur during frame encoding/decoding.
#[derive(Debug, thiserror::Error)]
pub enum FrameError {
    /// The framing configuration is unusable (prefix width, limits).
    #[error("invalid frame configuration: {0}")]
    InvalidConfiguration(String),

    /// The payload length cannot be represented in the configured prefix width.
    #[error("frame too large ({size} bytes, prefix allows at most {max})")]
    FrameTooLarge { size: u64, max: u64 },

    /// The payload exceeds the configured maximum size.
    #[error("payload too large ({size} bytes, max {max})")]
    PayloadTooLarge { size: u64, max: u64 },

    /// An I/O error occurred while reading or writing frames.
    #[error("frame I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// The stream stopped accepting bytes in the middle of a frame.
    #[error("connection closed (write returned zero bytes)")]
    ConnectionClosed,

    /// An earlier frame was only partly written; the peer can no longer find
    /// frame boundaries on this stream.
    #[error("stream out of frame sync ({written} of {frame_len} bytes of a frame were written)")]
    Desynchronized { written: usize, frame_len: usize },
}

pub type Result<T> = std::result::Result<T, FrameError>;
