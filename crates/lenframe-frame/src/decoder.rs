//! Incremental frame assembly.
//!
//! [`FrameDecoder`] consumes bytes in whatever chunks the transport delivers
//! and emits each payload once its last byte arrives. Chunk boundaries may fall
//! anywhere: between prefix bytes, on the prefix/payload edge, inside a payload,
//! or several frames deep into one chunk.

use bytes::{Bytes, BytesMut};
use tracing::{debug, trace};

use crate::config::{FrameConfig, MAX_PREFIX_WIDTH};
use crate::error::{FrameError, Result};

/// Upper bound on what a declared length may pre-allocate. The rest grows as
/// bytes actually arrive.
const MAX_PAYLOAD_RESERVE: u64 = 64 * 1024;

#[derive(Debug, Clone)]
enum State {
    /// Between frames, collecting the length prefix.
    Prefix {
        bytes: [u8; MAX_PREFIX_WIDTH],
        filled: usize,
    },
    /// Collecting payload bytes.
    Payload { remaining: u64 },
    /// Skipping the payload of a frame over the size limit.
    Discard { remaining: u64 },
}

impl State {
    fn prefix() -> Self {
        State::Prefix {
            bytes: [0; MAX_PREFIX_WIDTH],
            filled: 0,
        }
    }
}

/// Stateful length-prefixed frame decoder.
///
/// One decoder belongs to one connection. Feed it chunks in delivery order;
/// it never blocks and keeps partial prefix or payload bytes across calls.
#[derive(Debug)]
pub struct FrameDecoder {
    config: FrameConfig,
    state: State,
    payload: BytesMut,
    closed: bool,
    frames_decoded: u64,
}

impl FrameDecoder {
    /// Create a decoder with explicit configuration.
    ///
    /// Fails with `InvalidConfiguration` for a configuration no frame could
    /// satisfy, such as a zero payload limit.
    pub fn new(config: FrameConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self::unchecked(config))
    }

    fn unchecked(config: FrameConfig) -> Self {
        Self {
            config,
            state: State::prefix(),
            payload: BytesMut::new(),
            closed: false,
            frames_decoded: 0,
        }
    }

    /// Consume one chunk and collect everything it completes.
    ///
    /// Items are in wire order. An `Err` item stands in for a frame that was
    /// skipped (see [`FrameDecoder::feed_into`]).
    pub fn feed(&mut self, chunk: &[u8]) -> Vec<Result<Bytes>> {
        let mut out = Vec::new();
        self.feed_into(chunk, |item| out.push(item));
        out
    }

    /// Consume one chunk, handing each completed payload to `sink`.
    ///
    /// A frame whose declared length exceeds the configured maximum is
    /// delivered as [`FrameError::PayloadTooLarge`] as soon as its prefix
    /// completes; its payload bytes are then skipped without buffering and the
    /// following frame decodes normally.
    ///
    /// Returns the number of items delivered. After [`FrameDecoder::close`]
    /// nothing is delivered.
    pub fn feed_into<F>(&mut self, chunk: &[u8], mut sink: F) -> usize
    where
        F: FnMut(Result<Bytes>),
    {
        if self.closed {
            trace!(len = chunk.len(), "ignoring chunk after close");
            return 0;
        }

        let mut delivered = 0usize;
        let mut index = 0usize;
        while index < chunk.len() {
            let available = chunk.len() - index;
            match &mut self.state {
                State::Payload { remaining } => {
                    if *remaining > available as u64 {
                        self.payload.extend_from_slice(&chunk[index..]);
                        *remaining -= available as u64;
                        index = chunk.len();
                    } else {
                        let take = *remaining as usize;
                        self.payload.extend_from_slice(&chunk[index..index + take]);
                        index += take;
                        self.state = State::prefix();
                        self.frames_decoded += 1;
                        delivered += 1;
                        sink(Ok(self.payload.split().freeze()));
                    }
                }
                State::Discard { remaining } => {
                    if *remaining > available as u64 {
                        *remaining -= available as u64;
                        index = chunk.len();
                    } else {
                        index += *remaining as usize;
                        self.state = State::prefix();
                        trace!("finished skipping oversized frame");
                    }
                }
                State::Prefix { bytes, filled } => {
                    let width = self.config.prefix_width.get();
                    let take = (width - *filled).min(available);
                    bytes[*filled..*filled + take].copy_from_slice(&chunk[index..index + take]);
                    *filled += take;
                    index += take;

                    if *filled == width {
                        let len = self.config.prefix_width.decode(&bytes[..width]);
                        if let Some(item) = self.start_frame(len) {
                            delivered += 1;
                            sink(item);
                        }
                    }
                }
            }
        }

        delivered
    }

    /// Leave prefix mode for a frame of `len` bytes.
    ///
    /// Returns an item to deliver immediately (empty payload or oversize error).
    fn start_frame(&mut self, len: u64) -> Option<Result<Bytes>> {
        let max = self.config.effective_max_payload();
        if len == 0 {
            self.state = State::prefix();
            self.frames_decoded += 1;
            return Some(Ok(Bytes::new()));
        }
        if len > max {
            debug!(declared = len, max, "skipping oversized frame");
            self.state = State::Discard { remaining: len };
            return Some(Err(FrameError::PayloadTooLarge { size: len, max }));
        }

        self.payload.reserve(len.min(MAX_PAYLOAD_RESERVE) as usize);
        self.state = State::Payload { remaining: len };
        None
    }

    /// Signal end-of-stream.
    ///
    /// Any partial prefix or payload is dropped; that is normal closure, not an
    /// error. Later calls to `feed` deliver nothing.
    pub fn close(&mut self) {
        if self.closed {
            return;
        }
        if self.is_mid_frame() {
            debug!(
                pending_prefix = self.pending_prefix_len(),
                buffered = self.payload.len(),
                remaining = self.bytes_remaining_in_payload(),
                "discarding partial frame at end of stream"
            );
        }
        self.state = State::prefix();
        self.payload = BytesMut::new();
        self.closed = true;
    }

    /// Whether [`FrameDecoder::close`] has been called.
    pub fn is_closed(&self) -> bool {
        self.closed
    }

    /// Whether any bytes of an unfinished frame are being held.
    pub fn is_mid_frame(&self) -> bool {
        match self.state {
            State::Prefix { filled, .. } => filled > 0,
            State::Payload { .. } | State::Discard { .. } => true,
        }
    }

    /// Prefix bytes collected so far for the current frame.
    pub fn pending_prefix_len(&self) -> usize {
        match self.state {
            State::Prefix { filled, .. } => filled,
            _ => 0,
        }
    }

    /// Payload bytes still needed to finish the current frame.
    ///
    /// Zero exactly when the decoder is between frames.
    pub fn bytes_remaining_in_payload(&self) -> u64 {
        match self.state {
            State::Payload { remaining } | State::Discard { remaining } => remaining,
            State::Prefix { .. } => 0,
        }
    }

    /// Payload bytes buffered for the current frame.
    pub fn buffered_len(&self) -> usize {
        self.payload.len()
    }

    /// Frames emitted so far, including empty ones.
    pub fn frames_decoded(&self) -> u64 {
        self.frames_decoded
    }

    /// Current configuration.
    pub fn config(&self) -> &FrameConfig {
        &self.config
    }
}

impl Default for FrameDecoder {
    fn default() -> Self {
        Self::unchecked(FrameConfig::default())
    }
}
