//! Minimal echo server: accepts one connection and echoes JSON values back.
//!
//! Run with:
//!   cargo run --example echo-server
//!
//! In another terminal:
//!   cargo run --features cli -- send unix:/tmp/lenframe-echo-<pid>/echo.sock \
//!     --json '{"hello":"world"}' --wait --wait-timeout 3s

use std::fs;

use lenframe::frame::FrameConfig;
use lenframe::json::{JsonStream, MessagePolicy};
use lenframe::transport::{Address, Listener};

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let sock_dir = std::env::temp_dir().join(format!("lenframe-echo-{}", std::process::id()));
    fs::create_dir_all(&sock_dir)?;
    let addr = Address::unix(sock_dir.join("echo.sock"));

    let listener = Listener::bind(&addr)?;
    eprintln!("Listening on {addr}");

    let mut conn: JsonStream =
        JsonStream::from_stream(listener.accept()?, FrameConfig::default())?
            .with_policy(MessagePolicy::any_value());
    eprintln!("Peer connected: {}", conn.peer());

    loop {
        match conn.recv() {
            Ok(Some(value)) => {
                eprintln!("Received {value}");
                conn.send(&value)?;
            }
            Ok(None) => {
                eprintln!("Peer closed the connection");
                break;
            }
            Err(e) if e.is_recoverable() => eprintln!("Skipping bad message: {e}"),
            Err(e) => {
                eprintln!("Connection failed: {e}");
                break;
            }
        }
    }

    drop(listener);
    let _ = fs::remove_dir_all(&sock_dir);
    Ok(())
}
