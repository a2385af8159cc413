use std::fs::File;
use std::io::{self, BufReader, Read};

use lenframe_frame::FrameConfig;
use lenframe_json::{JsonStream, MessagePolicy};
use serde_json::Value;
use tracing::{debug, info};

use crate::cmd::{parse_address, parse_duration, SendArgs};
use crate::exit::{io_error, json_error, CliError, CliResult, DATA_INVALID, FAILURE, SUCCESS, USAGE};
use crate::output::{print_value, OutputFormat, ValueMeta};

pub fn run(args: SendArgs, format: OutputFormat, mut config: FrameConfig) -> CliResult<i32> {
    let addr = parse_address(&args.addr)?;
    if args.wait {
        config.read_timeout = Some(parse_duration(&args.wait_timeout)?);
    }

    let values = resolve_values(&args)?;
    let policy = if args.any_value {
        MessagePolicy::any_value()
    } else {
        MessagePolicy::default()
    };

    let mut stream: JsonStream = JsonStream::connect(&addr, config)
        .map_err(|err| json_error("connect failed", err))?
        .with_policy(policy);

    for value in &values {
        stream
            .send(value)
            .map_err(|err| json_error("send failed", err))?;
    }
    info!(%addr, count = values.len(), "values sent");

    if args.wait {
        let reply = stream
            .recv()
            .map_err(|err| json_error("receive failed", err))?
            .ok_or_else(|| CliError::new(FAILURE, "connection closed before a reply arrived"))?;
        let peer = stream.peer().to_string();
        print_value(
            &reply,
            &ValueMeta {
                seq: 1,
                source: &peer,
            },
            format,
        );
    }

    stream
        .close_write()
        .map_err(|err| json_error("close failed", err))?;
    debug!(%addr, "write half closed");

    Ok(SUCCESS)
}

fn resolve_values(args: &SendArgs) -> CliResult<Vec<Value>> {
    if let Some(json) = &args.json {
        let value = serde_json::from_str(json)
            .map_err(|err| CliError::new(USAGE, format!("--json is not valid JSON: {err}")))?;
        return Ok(vec![value]);
    }
    if let Some(path) = &args.file {
        let file = File::open(path)
            .map_err(|err| io_error(&format!("failed reading {}", path.display()), err))?;
        return read_values(BufReader::new(file));
    }
    read_values(io::stdin().lock())
}

/// Parse every whitespace-separated JSON value in `input`.
pub(crate) fn read_values<R: Read>(input: R) -> CliResult<Vec<Value>> {
    serde_json::Deserializer::from_reader(input)
        .into_iter::<Value>()
        .map(|item| {
            item.map_err(|err| {
                if err.is_io() {
                    CliError::new(FAILURE, format!("failed reading input: {err}"))
                } else {
                    CliError::new(DATA_INVALID, format!("input is not valid JSON: {err}"))
                }
            })
        })
        .collect()
}
