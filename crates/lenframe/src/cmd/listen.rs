use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use lenframe_frame::FrameConfig;
use lenframe_json::{JsonStream, MessagePolicy};
use lenframe_transport::Listener;
use tracing::{debug, info, warn};

use crate::cmd::{parse_address, ListenArgs};
use crate::exit::{json_error, transport_error, CliError, CliResult, SUCCESS};
use crate::output::{print_value, OutputFormat, ValueMeta};

pub fn run(args: ListenArgs, format: OutputFormat, config: FrameConfig) -> CliResult<i32> {
    let addr = parse_address(&args.addr)?;
    config
        .validate()
        .map_err(|err| crate::exit::frame_error("invalid framing", err))?;
    let listener = Listener::bind(&addr).map_err(|err| transport_error("bind failed", err))?;
    if let Ok(local) = listener.local_addr() {
        info!(addr = %local, "listening");
    }

    let running = Arc::new(AtomicBool::new(true));
    install_ctrlc_handler(running.clone())?;

    let mut printed = 0u64;

    while running.load(Ordering::SeqCst) {
        let stream = listener
            .accept()
            .map_err(|err| transport_error("accept failed", err))?;

        // Echoed values are whatever the peer sent, scalars included.
        let mut conn: JsonStream = JsonStream::from_stream(stream, config.clone())
            .map_err(|err| json_error("connection setup failed", err))?
            .with_policy(MessagePolicy::any_value());
        let peer = conn.peer().to_string();
        debug!(%peer, "connection accepted");

        while running.load(Ordering::SeqCst) {
            let value = match conn.recv() {
                Ok(Some(value)) => value,
                Ok(None) => break,
                Err(err) if err.is_recoverable() => {
                    warn!(%peer, error = %err, "skipping bad message");
                    continue;
                }
                Err(err) => {
                    warn!(%peer, error = %err, "connection dropped");
                    break;
                }
            };

            printed = printed.saturating_add(1);
            print_value(
                &value,
                &ValueMeta {
                    seq: printed,
                    source: &peer,
                },
                format,
            );

            if args.echo {
                if let Err(err) = conn.send(&value) {
                    warn!(%peer, error = %err, "echo failed");
                    break;
                }
            }

            if let Some(count) = args.count {
                if printed >= count {
                    return Ok(SUCCESS);
                }
            }
        }
        debug!(%peer, "connection closed");
    }

    Ok(SUCCESS)
}

fn install_ctrlc_handler(running: Arc<AtomicBool>) -> CliResult<()> {
    ctrlc::set_handler(move || {
        running.store(false, Ordering::SeqCst);
    })
    .map_err(|err| {
        CliError::new(
            crate::exit::INTERNAL,
            format!("signal handler setup failed: {err}"),
        )
    })
}
