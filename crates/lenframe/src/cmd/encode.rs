use std::io::{self, Write};

use lenframe_frame::FrameConfig;
use lenframe_json::{JsonWriter, MessagePolicy};
use tracing::debug;

use crate::cmd::send::read_values;
use crate::cmd::EncodeArgs;
use crate::exit::{frame_error, io_error, json_error, CliError, CliResult, SUCCESS, USAGE};

pub fn run(args: EncodeArgs, config: FrameConfig) -> CliResult<i32> {
    config
        .validate()
        .map_err(|err| frame_error("invalid framing", err))?;

    let values = match &args.json {
        Some(json) => vec![serde_json::from_str(json)
            .map_err(|err| CliError::new(USAGE, format!("--json is not valid JSON: {err}")))?],
        None => read_values(io::stdin().lock())?,
    };

    let policy = if args.any_value {
        MessagePolicy::any_value()
    } else {
        MessagePolicy::default()
    };

    let stdout = io::stdout();
    let mut writer = JsonWriter::with_config(stdout.lock(), config).with_policy(policy);
    for value in &values {
        writer
            .send(value)
            .map_err(|err| json_error("encode failed", err))?;
    }
    writer
        .into_inner()
        .flush()
        .map_err(|err| io_error("write failed", err))?;

    debug!(frames = values.len(), "encoded");
    Ok(SUCCESS)
}
