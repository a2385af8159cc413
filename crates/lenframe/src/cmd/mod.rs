use clap::{Args, Subcommand};
use std::path::PathBuf;
use std::time::Duration;

use lenframe_frame::FrameConfig;

use crate::exit::{CliError, CliResult, USAGE};
use crate::output::OutputFormat;

pub mod decode;
pub mod encode;
pub mod listen;
pub mod send;
pub mod version;

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Frame JSON values from stdin (or --json) onto stdout.
    Encode(EncodeArgs),
    /// Decode framed bytes from stdin (or --file) and print the values.
    Decode(DecodeArgs),
    /// Connect and send JSON values.
    Send(SendArgs),
    /// Accept connections and print received values.
    Listen(ListenArgs),
    /// Show version information.
    Version(VersionArgs),
}

pub fn run(command: Command, format: OutputFormat, config: FrameConfig) -> CliResult<i32> {
    match command {
        Command::Encode(args) => encode::run(args, config),
        Command::Decode(args) => decode::run(args, format, config),
        Command::Send(args) => send::run(args, format, config),
        Command::Listen(args) => listen::run(args, format, config),
        Command::Version(args) => version::run(args),
    }
}

#[derive(Args, Debug)]
pub struct EncodeArgs {
    /// Single JSON value to encode instead of reading stdin.
    #[arg(long)]
    pub json: Option<String>,
    /// Allow scalar top-level values (strings, numbers, booleans).
    #[arg(long)]
    pub any_value: bool,
}

#[derive(Args, Debug)]
pub struct DecodeArgs {
    /// Read framed bytes from a file instead of stdin.
    #[arg(long)]
    pub file: Option<PathBuf>,
}

#[derive(Args, Debug)]
pub struct SendArgs {
    /// Address to connect to (unix:<path>, tcp:<host>:<port>, a path, or host:port).
    pub addr: String,
    /// JSON value to send.
    #[arg(long, conflicts_with = "file")]
    pub json: Option<String>,
    /// Send every JSON value in a file.
    #[arg(long, conflicts_with = "json")]
    pub file: Option<PathBuf>,
    /// Wait for one reply value and print it.
    #[arg(long)]
    pub wait: bool,
    /// Maximum time to wait for the reply when --wait is set (e.g. 5s, 500ms).
    #[arg(long, default_value = "5s")]
    pub wait_timeout: String,
    /// Allow scalar top-level values.
    #[arg(long)]
    pub any_value: bool,
}

#[derive(Args, Debug)]
pub struct ListenArgs {
    /// Address to bind (unix:<path>, tcp:<host>:<port>, a path, or host:port).
    pub addr: String,
    /// Exit after receiving N values.
    #[arg(long)]
    pub count: Option<u64>,
    /// Send each received value back to its sender.
    #[arg(long)]
    pub echo: bool,
}

#[derive(Args, Debug)]
pub struct VersionArgs {
    /// Show extended build provenance.
    #[arg(long)]
    pub extended: bool,
}

pub(crate) fn parse_duration(input: &str) -> CliResult<Duration> {
    let input = input.trim();
    if input.is_empty() {
        return Err(CliError::new(USAGE, "duration must not be empty"));
    }

    let (number, unit) = if let Some(num) = input.strip_suffix("ms") {
        (num, "ms")
    } else if let Some(num) = input.strip_suffix('s') {
        (num, "s")
    } else {
        (input, "s")
    };

    let value: u64 = number
        .parse()
        .map_err(|_| CliError::new(USAGE, format!("invalid duration value: {input}")))?;

    if value == 0 {
        return Err(CliError::new(USAGE, "duration must be greater than zero"));
    }

    match unit {
        "ms" => Ok(Duration::from_millis(value)),
        _ => Ok(Duration::from_secs(value)),
    }
}

pub(crate) fn parse_address(input: &str) -> CliResult<lenframe_transport::Address> {
    input
        .parse()
        .map_err(|err| crate::exit::transport_error("invalid address", err))
}
