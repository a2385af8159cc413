//! Feed a framed byte stream to the decoder in arbitrary chunks.
//!
//! Run with:
//!   cargo run --example chunked-decode

use lenframe::frame::{encode_frame_to_bytes, FrameConfig, FrameDecoder};

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let config = FrameConfig::default();

    let mut wire = Vec::new();
    for payload in [&br#"{"eight":"bit"}"#[..], br#"{"seq":2}"#, b"[]"] {
        wire.extend_from_slice(&encode_frame_to_bytes(payload, config.prefix_width)?);
    }

    let mut decoder = FrameDecoder::new(config)?;
    for chunk in wire.chunks(3) {
        for frame in decoder.feed(chunk) {
            let frame = frame?;
            println!("frame: {}", String::from_utf8_lossy(&frame));
        }
        if decoder.is_mid_frame() {
            println!(
                "  waiting: prefix {} bytes, payload {} bytes left",
                decoder.pending_prefix_len(),
                decoder.bytes_remaining_in_payload()
            );
        }
    }
    decoder.close();

    println!("decoded {} frames", decoder.frames_decoded());
    Ok(())
}
