use std::fs::File;
use std::io::{self, Read};

use lenframe_frame::{FrameConfig, FrameError, FrameReader};
use lenframe_json::PayloadDecoder;
use serde_json::Value;
use tracing::{info, warn};

use crate::cmd::DecodeArgs;
use crate::exit::{frame_error, io_error, CliResult, DATA_INVALID, SUCCESS};
use crate::output::{print_value, OutputFormat, ValueMeta};

pub fn run(args: DecodeArgs, format: OutputFormat, config: FrameConfig) -> CliResult<i32> {
    config
        .validate()
        .map_err(|err| frame_error("invalid framing", err))?;

    match &args.file {
        Some(path) => {
            let file = File::open(path)
                .map_err(|err| io_error(&format!("failed reading {}", path.display()), err))?;
            decode_stream(file, &path.display().to_string(), format, config)
        }
        None => decode_stream(io::stdin().lock(), "stdin", format, config),
    }
}

/// Print every value carried by the frames of `input`.
///
/// Bad payloads and oversized frames are reported and skipped; the exit code
/// records that something was dropped.
fn decode_stream<R: Read>(
    input: R,
    source: &str,
    format: OutputFormat,
    config: FrameConfig,
) -> CliResult<i32> {
    let mut frames =
        FrameReader::with_config(input, config).map_err(|err| frame_error("invalid framing", err))?;
    let mut payloads = PayloadDecoder::<Value>::new();
    let mut skipped_frames = 0u64;
    let mut seq = 0u64;

    loop {
        let payload = match frames.read_frame() {
            Ok(Some(payload)) => payload,
            Ok(None) => break,
            Err(err @ FrameError::PayloadTooLarge { .. }) => {
                warn!(error = %err, "oversized frame skipped");
                skipped_frames += 1;
                continue;
            }
            Err(err) => return Err(frame_error("read failed", err)),
        };

        for item in payloads.push(&payload) {
            match item {
                Ok(value) => {
                    seq += 1;
                    print_value(&value, &ValueMeta { seq, source }, format);
                }
                Err(err) => warn!(len = payload.len(), error = %err, "malformed payload skipped"),
            }
        }
    }
    payloads.finish();

    let decoder = frames.decoder();
    if decoder.is_mid_frame() {
        warn!(
            missing = decoder.bytes_remaining_in_payload(),
            "input ended inside a frame"
        );
    }
    info!(
        frames = decoder.frames_decoded(),
        values = payloads.values_decoded(),
        failures = payloads.failures(),
        skipped = skipped_frames,
        "decode finished"
    );

    if payloads.failures() > 0 || skipped_frames > 0 {
        return Ok(DATA_INVALID);
    }
    Ok(SUCCESS)
}
