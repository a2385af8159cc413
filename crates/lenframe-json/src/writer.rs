use std::io::Write;

use lenframe_frame::{FrameConfig, FrameWriter};
use serde::Serialize;
use tracing::trace;

use crate::error::Result;
use crate::message::{serialize_message, MessagePolicy};

/// Writes JSON values as length-prefixed frames.
///
/// A value that cannot be serialized, breaks the [`MessagePolicy`], or does
/// not fit the frame limits is refused before any byte is written.
pub struct JsonWriter<W> {
    frames: FrameWriter<W>,
    policy: MessagePolicy,
}

impl<W: Write> JsonWriter<W> {
    /// Create a writer with default framing and policy.
    pub fn new(inner: W) -> Self {
        Self::with_config(inner, FrameConfig::default())
    }

    /// Create a writer with explicit framing configuration.
    pub fn with_config(inner: W, config: FrameConfig) -> Self {
        Self::from_frame_writer(FrameWriter::with_config(inner, config))
    }

    /// Wrap an existing frame writer.
    pub fn from_frame_writer(frames: FrameWriter<W>) -> Self {
        Self {
            frames,
            policy: MessagePolicy::default(),
        }
    }

    /// Replace the message policy.
    pub fn with_policy(mut self, policy: MessagePolicy) -> Self {
        self.policy = policy;
        self
    }

    /// Serialize and send one value (blocking).
    pub fn send<T>(&mut self, value: &T) -> Result<()>
    where
        T: Serialize + ?Sized,
    {
        let payload = serialize_message(value, self.policy)?;
        self.frames.send(&payload)?;
        trace!(len = payload.len(), "sent json frame");
        Ok(())
    }

    /// The active message policy.
    pub fn policy(&self) -> MessagePolicy {
        self.policy
    }

    /// The underlying frame writer.
    pub fn frame_writer(&self) -> &FrameWriter<W> {
        &self.frames
    }

    /// Borrow the underlying stream.
    pub fn get_ref(&self) -> &W {
        self.frames.get_ref()
    }

    /// Consume the writer and return the inner stream.
    pub fn into_inner(self) -> W {
        self.frames.into_inner()
    }
}
