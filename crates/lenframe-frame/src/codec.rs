//! `tokio_util::codec` adapter for async transports.

use std::collections::VecDeque;
use std::io;

use bytes::{Bytes, BytesMut};
use tokio_util::codec::{Decoder, Encoder};

use crate::config::FrameConfig;
use crate::decoder::FrameDecoder;
use crate::encoder::encode_frame;
use crate::error::{FrameError, Result};

/// Length-prefixed codec for `FramedRead`/`FramedWrite`.
///
/// Decoding drains the read buffer into a [`FrameDecoder`], so partial frames
/// live in the decoder rather than the buffer. Each decoded item is itself a
/// `Result`: an oversized frame arrives as an `Err(PayloadTooLarge)` item and
/// the stream carries on with the next frame. The codec's own error type is
/// reserved for I/O failures, which end a `FramedRead`.
#[derive(Debug)]
pub struct LengthPrefixedCodec {
    decoder: FrameDecoder,
    ready: VecDeque<Result<Bytes>>,
}

impl LengthPrefixedCodec {
    /// Create a codec with default configuration.
    pub fn new() -> Self {
        Self::from_decoder(FrameDecoder::default())
    }

    /// Create a codec with explicit configuration.
    pub fn with_config(config: FrameConfig) -> Result<Self> {
        Ok(Self::from_decoder(FrameDecoder::new(config)?))
    }

    fn from_decoder(decoder: FrameDecoder) -> Self {
        Self {
            decoder,
            ready: VecDeque::new(),
        }
    }

    /// Current configuration.
    pub fn config(&self) -> &FrameConfig {
        self.decoder.config()
    }
}

impl Default for LengthPrefixedCodec {
    fn default() -> Self {
        Self::new()
    }
}

impl Decoder for LengthPrefixedCodec {
    type Item = Result<Bytes>;
    type Error = io::Error;

    fn decode(&mut self, src: &mut BytesMut) -> io::Result<Option<Result<Bytes>>> {
        if !src.is_empty() {
            let chunk = src.split();
            let ready = &mut self.ready;
            self.decoder.feed_into(&chunk, |item| ready.push_back(item));
        }
        Ok(self.ready.pop_front())
    }

    fn decode_eof(&mut self, src: &mut BytesMut) -> io::Result<Option<Result<Bytes>>> {
        let item = self.decode(src)?;
        if item.is_none() {
            self.decoder.close();
        }
        Ok(item)
    }
}

impl Encoder<Bytes> for LengthPrefixedCodec {
    type Error = FrameError;

    fn encode(&mut self, item: Bytes, dst: &mut BytesMut) -> Result<()> {
        Encoder::<&[u8]>::encode(self, item.as_ref(), dst)
    }
}

impl Encoder<&[u8]> for LengthPrefixedCodec {
    type Error = FrameError;

    fn encode(&mut self, item: &[u8], dst: &mut BytesMut) -> Result<()> {
        let max = self.decoder.config().max_payload_size;
        let size = item.len() as u64;
        if size > max {
            return Err(FrameError::PayloadTooLarge { size, max });
        }
        encode_frame(item, self.decoder.config().prefix_width, dst)
    }
}

#[cfg(test)]
mod tests {
    use futures_util::{SinkExt, StreamExt};
    use tokio::io::AsyncWriteExt;
    use tokio_util::codec::{FramedRead, FramedWrite};

    use super::*;

    fn one_byte_codec(max_payload_size: u64) -> LengthPrefixedCodec {
        LengthPrefixedCodec::with_config(FrameConfig {
            max_payload_size,
            ..FrameConfig::with_prefix_width(1).unwrap()
        })
        .unwrap()
    }

    #[test]
    fn decode_across_buffer_refills() {
        let mut codec = LengthPrefixedCodec::new();
        let mut buf = BytesMut::from(&[0x00, 0x00][..]);
        assert!(codec.decode(&mut buf).unwrap().is_none());
        assert!(buf.is_empty());

        buf.extend_from_slice(&[0x00, 0x03, b'a', b'b', b'c', 0x00]);
        let frame = codec.decode(&mut buf).unwrap().unwrap().unwrap();
        assert_eq!(frame.as_ref(), b"abc");
        assert!(codec.decode(&mut buf).unwrap().is_none());
    }

    #[test]
    fn queued_frames_drain_one_at_a_time() {
        let mut codec = one_byte_codec(FrameConfig::default().max_payload_size);
        let mut buf = BytesMut::from(&b"\x01a\x01b\x00"[..]);
        let mut next = || codec.decode(&mut buf).unwrap().map(|item| item.unwrap());
        assert_eq!(next().unwrap().as_ref(), b"a");
        assert_eq!(next().unwrap().as_ref(), b"b");
        assert!(next().unwrap().is_empty());
        assert!(next().is_none());
    }

    #[test]
    fn decode_eof_with_partial_frame_ends_quietly() {
        let mut codec = LengthPrefixedCodec::new();
        let mut buf = BytesMut::from(&[0x00, 0x00, 0x00, 0x09, b'x'][..]);
        assert!(codec.decode_eof(&mut buf).unwrap().is_none());
    }

    #[test]
    fn encode_rejects_oversize_without_writing() {
        let mut codec = one_byte_codec(FrameConfig::default().max_payload_size);
        let mut dst = BytesMut::new();
        let err = Encoder::<&[u8]>::encode(&mut codec, &[0u8; 300], &mut dst).unwrap_err();
        assert!(matches!(err, FrameError::FrameTooLarge { size: 300, max: 255 }));
        assert!(dst.is_empty());
    }

    #[tokio::test]
    async fn framed_roundtrip_over_duplex() {
        let (client, server) = tokio::io::duplex(64);

        let writer = tokio::spawn(async move {
            let mut sink = FramedWrite::new(client, LengthPrefixedCodec::new());
            for payload in ["alpha", "", "gamma"] {
                sink.send(Bytes::from(payload)).await.unwrap();
            }
        });

        let mut stream = FramedRead::new(server, LengthPrefixedCodec::new());
        let mut got = Vec::new();
        while let Some(frame) = stream.next().await {
            got.push(frame.unwrap().unwrap());
        }
        writer.await.unwrap();

        assert_eq!(got, vec!["alpha", "", "gamma"]);
    }

    #[tokio::test]
    async fn framed_read_survives_tiny_writes() {
        let (mut client, server) = tokio::io::duplex(4);
        let wire = b"\x00\x00\x00\x05hello\x00\x00\x00\x02hi".to_vec();

        let writer = tokio::spawn(async move {
            for byte in wire {
                client.write_all(&[byte]).await.unwrap();
            }
        });

        let frames: Vec<Bytes> = FramedRead::new(server, LengthPrefixedCodec::new())
            .map(|f| f.unwrap().unwrap())
            .collect()
            .await;
        writer.await.unwrap();

        assert_eq!(frames, vec!["hello", "hi"]);
    }

    #[tokio::test]
    async fn framed_read_continues_past_oversized_frame() {
        let wire: &[u8] = b"\x0cway too long\x02ok";
        let items: Vec<Result<Bytes>> = FramedRead::new(wire, one_byte_codec(4))
            .map(|item| item.unwrap())
            .collect()
            .await;

        assert_eq!(items.len(), 2);
        assert!(matches!(
            items[0],
            Err(FrameError::PayloadTooLarge { size: 12, max: 4 })
        ));
        assert_eq!(items[1].as_ref().unwrap().as_ref(), b"ok");
    }

    #[test]
    fn zero_payload_limit_is_rejected() {
        let cfg = FrameConfig {
            max_payload_size: 0,
            ..FrameConfig::default()
        };
        let err = LengthPrefixedCodec::with_config(cfg).unwrap_err();
        assert!(matches!(err, FrameError::InvalidConfiguration(_)));
    }
}
