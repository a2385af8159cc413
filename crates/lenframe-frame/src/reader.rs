use std::collections::VecDeque;
use std::io::{ErrorKind, Read};

use bytes::Bytes;
use lenframe_transport::ByteStream;
use tracing::debug;

use crate::config::FrameConfig;
use crate::decoder::FrameDecoder;
use crate::error::{FrameError, Result};

const READ_CHUNK_SIZE: usize = 8 * 1024;

/// Reads complete frame payloads from any `Read` stream.
///
/// Each `read` result is fed to a [`FrameDecoder`] as one chunk, so callers
/// always get whole payloads no matter how the stream splits them.
pub struct FrameReader<T> {
    inner: T,
    decoder: FrameDecoder,
    ready: VecDeque<Result<Bytes>>,
    chunk: Box<[u8]>,
}

impl<T: Read> FrameReader<T> {
    /// Create a new frame reader with default configuration.
    pub fn new(inner: T) -> Self {
        Self::from_decoder(inner, FrameDecoder::default())
    }

    /// Create a new frame reader with explicit configuration.
    pub fn with_config(inner: T, config: FrameConfig) -> Result<Self> {
        Ok(Self::from_decoder(inner, FrameDecoder::new(config)?))
    }

    fn from_decoder(inner: T, decoder: FrameDecoder) -> Self {
        Self {
            inner,
            decoder,
            ready: VecDeque::new(),
            chunk: vec![0u8; READ_CHUNK_SIZE].into_boxed_slice(),
        }
    }

    /// Read the next complete payload (blocking).
    ///
    /// Returns `Ok(None)` at end of stream. A frame cut short by end of stream
    /// is dropped without error. A frame over the size limit yields
    /// `Err(FrameError::PayloadTooLarge)` and the reader stays usable.
    pub fn read_frame(&mut self) -> Result<Option<Bytes>> {
        loop {
            if let Some(item) = self.ready.pop_front() {
                return item.map(Some);
            }
            if self.decoder.is_closed() {
                return Ok(None);
            }

            let read = match self.inner.read(&mut self.chunk) {
                Ok(n) => n,
                Err(err) if err.kind() == ErrorKind::Interrupted => continue,
                Err(err) => return Err(FrameError::Io(err)),
            };

            if read == 0 {
                debug!(
                    frames = self.decoder.frames_decoded(),
                    partial = self.decoder.is_mid_frame(),
                    "end of stream"
                );
                self.decoder.close();
                return Ok(None);
            }

            let ready = &mut self.ready;
            self.decoder
                .feed_into(&self.chunk[..read], |item| ready.push_back(item));
        }
    }

    /// Iterate over payloads until end of stream.
    pub fn frames(&mut self) -> Frames<'_, T> {
        Frames { reader: self }
    }

    /// Borrow the underlying stream.
    pub fn get_ref(&self) -> &T {
        &self.inner
    }

    /// Mutably borrow the underlying stream.
    pub fn get_mut(&mut self) -> &mut T {
        &mut self.inner
    }

    /// Consume the reader and return the inner stream.
    pub fn into_inner(self) -> T {
        self.inner
    }

    /// The decoder driving this reader.
    pub fn decoder(&self) -> &FrameDecoder {
        &self.decoder
    }

    /// Current frame reader configuration.
    pub fn config(&self) -> &FrameConfig {
        self.decoder.config()
    }
}

impl FrameReader<ByteStream> {
    /// Create a frame reader for a `ByteStream` and apply the read timeout.
    pub fn with_config_stream(inner: ByteStream, config: FrameConfig) -> Result<Self> {
        inner
            .set_read_timeout(config.read_timeout)
            .map_err(transport_to_frame_error)?;
        Self::with_config(inner, config)
    }
}

/// Iterator returned by [`FrameReader::frames`].
pub struct Frames<'a, T> {
    reader: &'a mut FrameReader<T>,
}

impl<T: Read> Iterator for Frames<'_, T> {
    type Item = Result<Bytes>;

    fn next(&mut self) -> Option<Self::Item> {
        self.reader.read_frame().transpose()
    }
}

pub(crate) fn transport_to_frame_error(err: lenframe_transport::TransportError) -> FrameError {
    match err {
        lenframe_transport::TransportError::Io(io)
        | lenframe_transport::TransportError::Accept(io) => FrameError::Io(io),
        lenframe_transport::TransportError::Bind { source, .. }
        | lenframe_transport::TransportError::Connect { source, .. } => FrameError::Io(source),
        other => FrameError::Io(std::io::Error::other(other.to_string())),
    }
}

#[cfg(test)]
mod tests {
    use std::io::Cursor;

    use bytes::BytesMut;

    use super::*;
    use crate::config::PrefixWidth;
    use crate::encoder::encode_frame;

    fn wire(frames: &[&[u8]]) -> Vec<u8> {
        let mut dst = BytesMut::new();
        for payload in frames {
            encode_frame(payload, PrefixWidth::DEFAULT, &mut dst).unwrap();
        }
        dst.to_vec()
    }

    #[test]
    fn read_single_frame() {
        let mut reader = FrameReader::new(Cursor::new(wire(&[b"hello"])));
        let frame = reader.read_frame().unwrap().unwrap();
        assert_eq!(frame.as_ref(), b"hello");
        assert!(reader.read_frame().unwrap().is_none());
    }

    #[test]
    fn read_multiple_frames() {
        let mut reader = FrameReader::new(Cursor::new(wire(&[b"one", b"two", b"three"])));
        let frames: Vec<Bytes> = reader.frames().map(|f| f.unwrap()).collect();
        assert_eq!(
            frames,
            vec![
                Bytes::from_static(b"one"),
                Bytes::from_static(b"two"),
                Bytes::from_static(b"three")
            ]
        );
    }

    #[test]
    fn read_frame_spanning_many_chunks() {
        let payload = vec![0xAB; 64 * 1024];
        let mut reader = FrameReader::new(Cursor::new(wire(&[&payload])));
        let frame = reader.read_frame().unwrap().unwrap();
        assert_eq!(frame.as_ref(), payload.as_slice());
    }

    #[test]
    fn byte_by_byte_stream() {
        let byte_reader = ByteByByteReader {
            bytes: wire(&[b"slow", b"", b"steady"]),
            pos: 0,
        };
        let mut reader = FrameReader::new(byte_reader);

        assert_eq!(reader.read_frame().unwrap().unwrap().as_ref(), b"slow");
        assert!(reader.read_frame().unwrap().unwrap().is_empty());
        assert_eq!(reader.read_frame().unwrap().unwrap().as_ref(), b"steady");
        assert!(reader.read_frame().unwrap().is_none());
    }

    #[test]
    fn end_of_stream_on_empty_input() {
        let mut reader = FrameReader::new(Cursor::new(Vec::<u8>::new()));
        assert!(reader.read_frame().unwrap().is_none());
        assert!(reader.read_frame().unwrap().is_none());
    }

    #[test]
    fn end_of_stream_mid_frame_is_not_an_error() {
        let mut partial = wire(&[b"complete"]);
        partial.extend_from_slice(&[0x00, 0x00, 0x00, 0x10]);
        partial.extend_from_slice(b"only-part");

        let mut reader = FrameReader::new(Cursor::new(partial));
        assert_eq!(reader.read_frame().unwrap().unwrap().as_ref(), b"complete");
        assert!(reader.read_frame().unwrap().is_none());
        assert!(reader.decoder().is_closed());
    }

    #[test]
    fn end_of_stream_mid_prefix_is_not_an_error() {
        let mut reader = FrameReader::new(Cursor::new(vec![0x00, 0x00]));
        assert!(reader.read_frame().unwrap().is_none());
    }

    #[test]
    fn oversized_frame_reported_then_reader_continues() {
        let cfg = FrameConfig {
            max_payload_size: 16,
            ..FrameConfig::default()
        };
        let big = vec![0u8; 1024];
        let mut reader =
            FrameReader::with_config(Cursor::new(wire(&[&big, b"small"])), cfg).unwrap();

        let err = reader.read_frame().unwrap_err();
        assert!(matches!(err, FrameError::PayloadTooLarge { size: 1024, max: 16 }));
        assert_eq!(reader.read_frame().unwrap().unwrap().as_ref(), b"small");
    }

    #[test]
    fn zero_payload_limit_is_invalid_configuration() {
        let cfg = FrameConfig {
            max_payload_size: 0,
            ..FrameConfig::default()
        };
        let err = FrameReader::with_config(Cursor::new(Vec::new()), cfg).err().unwrap();
        assert!(matches!(err, FrameError::InvalidConfiguration(_)));
    }

    #[test]
    fn custom_prefix_width() {
        let cfg = FrameConfig::with_prefix_width(1).unwrap();
        let mut reader =
            FrameReader::with_config(Cursor::new(b"\x02hi\x00".to_vec()), cfg).unwrap();
        assert_eq!(reader.read_frame().unwrap().unwrap().as_ref(), b"hi");
        assert!(reader.read_frame().unwrap().unwrap().is_empty());
        assert_eq!(reader.config().prefix_width.get(), 1);
    }

    #[test]
    fn accessors_and_into_inner() {
        let cursor = Cursor::new(Vec::<u8>::new());
        let mut reader = FrameReader::new(cursor);

        let _ = reader.get_ref();
        let _ = reader.get_mut();
        let _inner = reader.into_inner();
    }

    #[test]
    fn would_block_propagates_io_error() {
        let reader = ErrorThenData {
            error: Some(ErrorKind::WouldBlock),
            bytes: wire(&[b"ok"]),
            pos: 0,
        };
        let mut framed = FrameReader::new(reader);
        let err = framed.read_frame().unwrap_err();
        assert!(matches!(err, FrameError::Io(e) if e.kind() == ErrorKind::WouldBlock));
        assert_eq!(framed.read_frame().unwrap().unwrap().as_ref(), b"ok");
    }

    #[test]
    fn interrupted_read_retries() {
        let reader = ErrorThenData {
            error: Some(ErrorKind::Interrupted),
            bytes: wire(&[b"ok"]),
            pos: 0,
        };
        let mut framed = FrameReader::new(reader);
        assert_eq!(framed.read_frame().unwrap().unwrap().as_ref(), b"ok");
    }

    #[test]
    #[cfg(unix)]
    fn applies_read_timeout_for_byte_stream() {
        let (left, _right) = ByteStream::pair().unwrap();
        let cfg = FrameConfig {
            read_timeout: Some(std::time::Duration::from_millis(10)),
            ..FrameConfig::default()
        };
        let mut reader = FrameReader::with_config_stream(left, cfg).unwrap();

        let err = reader.read_frame().unwrap_err();
        assert!(matches!(
            err,
            FrameError::Io(ref e) if matches!(e.kind(), ErrorKind::WouldBlock | ErrorKind::TimedOut)
        ));
    }

    #[derive(Debug)]
    struct ByteByByteReader {
        bytes: Vec<u8>,
        pos: usize,
    }

    impl Read for ByteByByteReader {
        fn read(&mut self, buf: &mut [u8]) -> std::io::Result<usize> {
            if self.pos >= self.bytes.len() || buf.is_empty() {
                return Ok(0);
            }
            buf[0] = self.bytes[self.pos];
            self.pos += 1;
            Ok(1)
        }
    }

    struct ErrorThenData {
        error: Option<ErrorKind>,
        bytes: Vec<u8>,
        pos: usize,
    }

    impl Read for ErrorThenData {
        fn read(&mut self, buf: &mut [u8]) -> std::io::Result<usize> {
            if let Some(kind) = self.error.take() {
                return Err(std::io::Error::from(kind));
            }
            let n = (self.bytes.len() - self.pos).min(buf.len());
            buf[..n].copy_from_slice(&self.bytes[self.pos..self.pos + n]);
            self.pos += n;
            Ok(n)
        }
    }
}
