use std::collections::VecDeque;
use std::io::Read;

use lenframe_frame::{FrameConfig, FrameReader};
use serde::de::DeserializeOwned;
use serde_json::Value;
use tracing::{debug, warn};

use crate::error::Result;
use crate::payload::PayloadDecoder;

/// Reads JSON values from a length-prefixed byte stream.
///
/// Errors from one frame (bad JSON, oversized frame) are returned once and
/// reading continues with the next frame.
pub struct JsonReader<R, T = Value> {
    frames: FrameReader<R>,
    payloads: PayloadDecoder<T>,
    ready: VecDeque<Result<T>>,
}

impl<R: Read, T: DeserializeOwned> JsonReader<R, T> {
    /// Create a reader with default framing.
    pub fn new(inner: R) -> Self {
        Self::from_frame_reader(FrameReader::new(inner))
    }

    /// Create a reader with explicit framing configuration.
    pub fn with_config(inner: R, config: FrameConfig) -> Result<Self> {
        Ok(Self::from_frame_reader(FrameReader::with_config(inner, config)?))
    }

    /// Wrap an existing frame reader.
    pub fn from_frame_reader(frames: FrameReader<R>) -> Self {
        Self {
            frames,
            payloads: PayloadDecoder::new(),
            ready: VecDeque::new(),
        }
    }

    /// Read the next value (blocking). `Ok(None)` at end of stream.
    pub fn next_value(&mut self) -> Result<Option<T>> {
        loop {
            if let Some(item) = self.ready.pop_front() {
                return item.map(Some);
            }
            if self.payloads.is_finished() {
                return Ok(None);
            }

            match self.frames.read_frame()? {
                Some(payload) => {
                    for item in self.payloads.push(&payload) {
                        if let Err(err) = &item {
                            warn!(len = payload.len(), error = %err, "undecodable payload");
                        }
                        self.ready.push_back(item);
                    }
                }
                None => {
                    debug!(values = self.payloads.values_decoded(), "json stream ended");
                    self.payloads.finish();
                    return Ok(None);
                }
            }
        }
    }

    /// The underlying frame reader.
    pub fn frame_reader(&self) -> &FrameReader<R> {
        &self.frames
    }

    /// Borrow the underlying stream.
    pub fn get_ref(&self) -> &R {
        self.frames.get_ref()
    }

    /// Consume the reader and return the inner stream.
    pub fn into_inner(self) -> R {
        self.frames.into_inner()
    }
}

impl<R: Read, T: DeserializeOwned> Iterator for JsonReader<R, T> {
    type Item = Result<T>;

    fn next(&mut self) -> Option<Self::Item> {
        self.next_value().transpose()
    }
}

#[cfg(test)]
mod tests {
    use std::io::Cursor;

    use lenframe_frame::FrameError;
    use proptest::prelude::*;
    use serde_json::json;

    use super::*;
    use crate::error::JsonFrameError;

    const EIGHT_BIT: &[u8] = br#"{"eight":"bit"}"#;

    fn one_byte_prefix() -> FrameConfig {
        FrameConfig::with_prefix_width(1).unwrap()
    }

    /// Delivers a fixed script of chunks, one per `read`.
    struct Chunked {
        chunks: VecDeque<Vec<u8>>,
    }

    impl Chunked {
        fn new(chunks: Vec<Vec<u8>>) -> Self {
            Self {
                chunks: chunks.into(),
            }
        }
    }

    impl Read for Chunked {
        fn read(&mut self, buf: &mut [u8]) -> std::io::Result<usize> {
            let Some(mut chunk) = self.chunks.pop_front() else {
                return Ok(0);
            };
            let n = chunk.len().min(buf.len());
            buf[..n].copy_from_slice(&chunk[..n]);
            if n < chunk.len() {
                self.chunks.push_front(chunk.split_off(n));
            }
            Ok(n)
        }
    }

    fn values(reader: JsonReader<Chunked>) -> Vec<Value> {
        reader.map(|v| v.unwrap()).collect()
    }

    fn framed(payload: &[u8]) -> Vec<u8> {
        let mut out = vec![payload.len() as u8];
        out.extend_from_slice(payload);
        out
    }

    #[test]
    fn single_object_single_chunk() {
        let chunks = Chunked::new(vec![framed(EIGHT_BIT)]);
        let reader = JsonReader::with_config(chunks, one_byte_prefix()).unwrap();
        assert_eq!(values(reader), vec![json!({"eight": "bit"})]);
    }

    #[test]
    fn two_objects_single_chunk() {
        let mut chunk = framed(EIGHT_BIT);
        chunk.extend(framed(EIGHT_BIT));
        let reader = JsonReader::with_config(Chunked::new(vec![chunk]), one_byte_prefix()).unwrap();
        assert_eq!(values(reader), vec![json!({"eight": "bit"}); 2]);
    }

    #[test]
    fn one_object_split_across_two_chunks() {
        let mut first = vec![0x0F];
        first.extend_from_slice(&EIGHT_BIT[..8]);
        let second = EIGHT_BIT[8..].to_vec();

        let reader =
            JsonReader::with_config(Chunked::new(vec![first, second]), one_byte_prefix()).unwrap();
        assert_eq!(values(reader), vec![json!({"eight": "bit"})]);
    }

    #[test]
    fn object_split_from_its_prefix() {
        let reader = JsonReader::with_config(
            Chunked::new(vec![vec![0x0F], EIGHT_BIT.to_vec()]),
            one_byte_prefix(),
        ).unwrap();
        assert_eq!(values(reader), vec![json!({"eight": "bit"})]);
    }

    #[test]
    fn two_objects_two_chunks() {
        let reader = JsonReader::with_config(
            Chunked::new(vec![framed(EIGHT_BIT), framed(EIGHT_BIT)]),
            one_byte_prefix(),
        ).unwrap();
        assert_eq!(values(reader), vec![json!({"eight": "bit"}); 2]);
    }

    #[test]
    fn prefix_split_between_two_chunks() {
        let mut second = vec![0x00, 0x0F];
        second.extend_from_slice(EIGHT_BIT);
        let reader = JsonReader::new(Chunked::new(vec![vec![0x00, 0x00], second]));
        assert_eq!(values(reader), vec![json!({"eight": "bit"})]);
    }

    #[test]
    fn bad_payload_is_reported_and_stream_continues() {
        let mut chunk = framed(b"{oops");
        chunk.extend(framed(EIGHT_BIT));
        let mut reader: JsonReader<_> =
            JsonReader::with_config(Chunked::new(vec![chunk]), one_byte_prefix()).unwrap();

        assert!(matches!(reader.next_value(), Err(JsonFrameError::Json(_))));
        assert_eq!(reader.next_value().unwrap(), Some(json!({"eight": "bit"})));
        assert_eq!(reader.next_value().unwrap(), None);
    }

    #[test]
    fn oversized_frame_is_reported_and_stream_continues() {
        let cfg = FrameConfig {
            max_payload_size: 8,
            ..one_byte_prefix()
        };
        let mut chunk = framed(EIGHT_BIT);
        chunk.extend(framed(b"[1]"));
        let mut reader: JsonReader<_> =
            JsonReader::with_config(Chunked::new(vec![chunk]), cfg).unwrap();

        assert!(matches!(
            reader.next_value(),
            Err(JsonFrameError::Frame(FrameError::PayloadTooLarge { size: 15, max: 8 }))
        ));
        assert_eq!(reader.next_value().unwrap(), Some(json!([1])));
    }

    #[test]
    fn partial_frame_at_end_yields_nothing() {
        let mut chunk = framed(EIGHT_BIT);
        chunk.extend_from_slice(&[0x0F, b'{']);
        let mut reader: JsonReader<_> =
            JsonReader::with_config(Chunked::new(vec![chunk]), one_byte_prefix()).unwrap();

        assert_eq!(reader.next_value().unwrap(), Some(json!({"eight": "bit"})));
        assert_eq!(reader.next_value().unwrap(), None);
        assert_eq!(reader.next_value().unwrap(), None);
    }

    #[test]
    fn empty_payload_produces_no_value() {
        let mut chunk = vec![0x00];
        chunk.extend(framed(b"{}"));
        let reader = JsonReader::with_config(Chunked::new(vec![chunk]), one_byte_prefix()).unwrap();
        assert_eq!(values(reader), vec![json!({})]);
    }

    #[test]
    fn reads_from_cursor() {
        let mut reader: JsonReader<_> =
            JsonReader::with_config(Cursor::new(framed(b"[true]")), one_byte_prefix()).unwrap();
        assert_eq!(reader.next_value().unwrap(), Some(json!([true])));
        assert!(reader.frame_reader().decoder().frames_decoded() >= 1);
        let _ = reader.get_ref();
    }

    proptest! {
        #[test]
        fn any_chunking_yields_same_values(
            seqs in prop::collection::vec(0u32..10_000, 1..8),
            sizes in prop::collection::vec(1usize..7, 1..64),
        ) {
            let mut stream = Vec::new();
            for seq in &seqs {
                let payload = serde_json::to_vec(&json!({ "seq": seq })).unwrap();
                stream.extend_from_slice(&(payload.len() as u32).to_be_bytes());
                stream.extend_from_slice(&payload);
            }

            let mut chunks = Vec::new();
            let mut rest = stream.as_slice();
            let mut sizes = sizes.iter().cycle();
            while !rest.is_empty() {
                let n = (*sizes.next().unwrap()).min(rest.len());
                chunks.push(rest[..n].to_vec());
                rest = &rest[n..];
            }

            let got = values(JsonReader::new(Chunked::new(chunks)));
            let expected: Vec<Value> = seqs.iter().map(|seq| json!({ "seq": seq })).collect();
            prop_assert_eq!(got, expected);
        }
    }
}
