use std::io::{ErrorKind, Write};

use bytes::BytesMut;
use lenframe_transport::ByteStream;
use tracing::warn;

use crate::config::FrameConfig;
use crate::encoder::encode_frame;
use crate::error::{FrameError, Result};
use crate::reader::transport_to_frame_error;

const INITIAL_BUFFER_CAPACITY: usize = 8 * 1024;

/// Writes complete frames to any `Write` stream.
///
/// Each frame is encoded into one buffer and written as a single request, in
/// the order `send` is called.
pub struct FrameWriter<T> {
    inner: T,
    buf: BytesMut,
    config: FrameConfig,
    /// Set when a write failed partway through a frame: `(written, frame_len)`.
    torn: Option<(usize, usize)>,
}

impl<T: Write> FrameWriter<T> {
    /// Create a new frame writer with default configuration.
    pub fn new(inner: T) -> Self {
        Self::with_config(inner, FrameConfig::default())
    }

    /// Create a new frame writer with explicit configuration.
    pub fn with_config(inner: T, config: FrameConfig) -> Self {
        Self {
            inner,
            buf: BytesMut::with_capacity(INITIAL_BUFFER_CAPACITY),
            config,
            torn: None,
        }
    }

    /// Encode and send one payload (blocking).
    ///
    /// Nothing reaches the stream if the payload is over the configured limit
    /// (`PayloadTooLarge`) or cannot be expressed in the prefix
    /// (`FrameTooLarge`). A write timeout surfaces as `FrameError::Io`. If it
    /// strikes after part of the frame went out, every later `send` fails
    /// with `Desynchronized`.
    pub fn send(&mut self, payload: &[u8]) -> Result<()> {
        if let Some((written, frame_len)) = self.torn {
            return Err(FrameError::Desynchronized { written, frame_len });
        }

        let size = payload.len() as u64;
        if size > self.config.max_payload_size {
            return Err(FrameError::PayloadTooLarge {
                size,
                max: self.config.max_payload_size,
            });
        }

        self.buf.clear();
        encode_frame(payload, self.config.prefix_width, &mut self.buf)?;

        let frame_len = self.buf.len();
        let mut offset = 0usize;
        while offset < frame_len {
            let err = match self.inner.write(&self.buf[offset..]) {
                Ok(0) => FrameError::ConnectionClosed,
                Ok(n) => {
                    offset += n;
                    continue;
                }
                Err(err) if err.kind() == ErrorKind::Interrupted => continue,
                Err(err) => FrameError::Io(err),
            };
            if offset > 0 {
                warn!(written = offset, frame_len, error = %err, "frame partly written");
                self.torn = Some((offset, frame_len));
            }
            return Err(err);
        }

        self.flush()
    }

    /// Whether an earlier failed `send` left a partial frame on the stream.
    pub fn is_desynchronized(&self) -> bool {
        self.torn.is_some()
    }

    /// Flush the underlying stream.
    pub fn flush(&mut self) -> Result<()> {
        loop {
            match self.inner.flush() {
                Ok(()) => return Ok(()),
                Err(err) if err.kind() == ErrorKind::Interrupted => continue,
                Err(err) => return Err(FrameError::Io(err)),
            }
        }
    }

    /// Borrow the underlying stream.
    pub fn get_ref(&self) -> &T {
        &self.inner
    }

    /// Mutably borrow the underlying stream.
    pub fn get_mut(&mut self) -> &mut T {
        &mut self.inner
    }

    /// Consume the writer and return the inner stream.
    pub fn into_inner(self) -> T {
        self.inner
    }

    /// Update maximum payload size for subsequent sends.
    pub fn set_max_payload_size(&mut self, max_payload_size: u64) {
        self.config.max_payload_size = max_payload_size;
    }

    /// Current frame writer configuration.
    pub fn config(&self) -> &FrameConfig {
        &self.config
    }
}

impl FrameWriter<ByteStream> {
    /// Create a frame writer for a `ByteStream` and apply the write timeout.
    pub fn with_config_stream(inner: ByteStream, config: FrameConfig) -> Result<Self> {
        inner
            .set_write_timeout(config.write_timeout)
            .map_err(transport_to_frame_error)?;
        Ok(Self::with_config(inner, config))
    }
}
