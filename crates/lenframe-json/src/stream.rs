use lenframe_frame::{FrameConfig, FrameReader, FrameWriter};
use lenframe_transport::{connect, Address, ByteStream};
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value;
use tracing::debug;

use crate::error::Result;
use crate::message::MessagePolicy;
use crate::reader::JsonReader;
use crate::writer::JsonWriter;

/// Duplex JSON message stream over one connection.
///
/// The read half owns the frame decoder for this connection; the write half
/// issues frames in the order `send` is called.
pub struct JsonStream<T = Value> {
    reader: JsonReader<ByteStream, T>,
    writer: JsonWriter<ByteStream>,
    peer: String,
}

impl<T: DeserializeOwned> JsonStream<T> {
    /// Connect to `addr` and wrap the connection.
    pub fn connect(addr: &Address, config: FrameConfig) -> Result<Self> {
        let stream = connect(addr)?;
        debug!(%addr, prefix_width = %config.prefix_width, "json stream connected");
        Self::from_stream(stream, config)
    }

    /// Wrap an already connected stream.
    pub fn from_stream(stream: ByteStream, config: FrameConfig) -> Result<Self> {
        config.validate()?;
        let peer = stream.peer_label();
        let read_half = stream.try_clone()?;

        let reader = FrameReader::with_config_stream(read_half, config.clone())?;
        let writer = FrameWriter::with_config_stream(stream, config)?;

        Ok(Self {
            reader: JsonReader::from_frame_reader(reader),
            writer: JsonWriter::from_frame_writer(writer),
            peer,
        })
    }

    /// Replace the outbound message policy.
    pub fn with_policy(mut self, policy: MessagePolicy) -> Self {
        self.writer = self.writer.with_policy(policy);
        self
    }

    /// Send one value.
    pub fn send<M>(&mut self, value: &M) -> Result<()>
    where
        M: Serialize + ?Sized,
    {
        self.writer.send(value)
    }

    /// Receive the next value. `Ok(None)` once the peer has closed.
    pub fn recv(&mut self) -> Result<Option<T>> {
        self.reader.next_value()
    }

    /// Close the write half; the peer sees end of stream after pending frames.
    pub fn close_write(&self) -> Result<()> {
        self.writer.get_ref().shutdown_write()?;
        Ok(())
    }

    /// Diagnostic label for the remote end.
    pub fn peer(&self) -> &str {
        &self.peer
    }

    /// Split into independently owned halves.
    pub fn split(self) -> (JsonReader<ByteStream, T>, JsonWriter<ByteStream>) {
        (self.reader, self.writer)
    }
}
