mod cmd;
mod exit;
mod logging;
mod output;

use clap::Parser;
use lenframe_frame::{FrameConfig, DEFAULT_PREFIX_WIDTH};

use crate::cmd::Command;
use crate::exit::{frame_error, CliResult};
use crate::logging::{init_logging, LogFormat, LogLevel};
use crate::output::OutputFormat;

#[derive(Parser, Debug)]
#[command(
    name = "lenframe",
    version,
    about = "Length-prefixed JSON framing CLI"
)]
struct Cli {
    /// Output format.
    #[arg(long, value_name = "FORMAT", global = true)]
    format: Option<OutputFormat>,

    /// Log output format (stderr).
    #[arg(long, value_name = "FORMAT", default_value = "text", global = true)]
    log_format: LogFormat,

    /// Minimum log level (stderr).
    #[arg(long, value_name = "LEVEL", default_value = "info", global = true)]
    log_level: LogLevel,

    /// Length prefix width in bytes (1-8).
    #[arg(long, value_name = "N", default_value_t = DEFAULT_PREFIX_WIDTH, global = true)]
    prefix_width: usize,

    /// Maximum payload size in bytes.
    #[arg(long, value_name = "BYTES", env = "LENFRAME_MAX_PAYLOAD", global = true)]
    max_payload: Option<u64>,

    #[command(subcommand)]
    command: Command,
}

impl Cli {
    fn frame_config(&self) -> CliResult<FrameConfig> {
        let mut config = FrameConfig::with_prefix_width(self.prefix_width)
            .map_err(|err| frame_error("invalid --prefix-width", err))?;
        if let Some(max) = self.max_payload {
            config.max_payload_size = max;
        }
        config
            .validate()
            .map_err(|err| frame_error("invalid --max-payload", err))?;
        Ok(config)
    }
}

fn main() {
    let cli = Cli::parse();
    init_logging(cli.log_format, cli.log_level);

    let format = cli.format.unwrap_or_else(OutputFormat::default_for_stdout);
    let result = cli
        .frame_config()
        .and_then(|config| cmd::run(cli.command, format, config));

    match result {
        Ok(code) => std::process::exit(code),
        Err(err) => {
            eprintln!("error: {err}");
            std::process::exit(err.code);
        }
    }
}
