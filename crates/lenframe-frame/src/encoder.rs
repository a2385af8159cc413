use bytes::{BufMut, Bytes, BytesMut};

use crate::config::PrefixWidth;
use crate::error::{FrameError, Result};

/// Encode a payload into the wire format, appending to `dst`.
///
/// Wire format:
/// ```text
/// ┌──────────────────────────┬─────────────────┐
/// │ Length                   │ Payload         │
/// │ (prefix_width bytes, BE) │ (Length bytes)  │
/// └──────────────────────────┴─────────────────┘
/// ```
///
/// Fails with [`FrameError::FrameTooLarge`] when the payload length does not
/// fit in `prefix_width` bytes; `dst` is left untouched in that case.
pub fn encode_frame(payload: &[u8], prefix_width: PrefixWidth, dst: &mut BytesMut) -> Result<()> {
    let size = payload.len() as u64;
    let max = prefix_width.max_len();
    if size > max {
        return Err(FrameError::FrameTooLarge { size, max });
    }

    dst.reserve(encoded_len(payload.len(), prefix_width));
    dst.put_uint(size, prefix_width.get());
    dst.put_slice(payload);
    Ok(())
}

/// Encode a payload into a fresh buffer.
pub fn encode_frame_to_bytes(payload: &[u8], prefix_width: PrefixWidth) -> Result<Bytes> {
    let mut dst = BytesMut::new();
    encode_frame(payload, prefix_width, &mut dst)?;
    Ok(dst.freeze())
}

/// Total wire size of a frame carrying `payload_len` bytes.
pub fn encoded_len(payload_len: usize, prefix_width: PrefixWidth) -> usize {
    prefix_width.get() + payload_len
}
