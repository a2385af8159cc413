use std::io::{IsTerminal, Write};
use std::time::{SystemTime, UNIX_EPOCH};

use clap::ValueEnum;
use comfy_table::{presets::UTF8_FULL, ContentArrangement, Table};
use serde::Serialize;
use serde_json::Value;

#[derive(Clone, Debug, Copy, ValueEnum)]
pub enum OutputFormat {
    Json,
    Table,
    Pretty,
    Raw,
}

impl OutputFormat {
    pub fn default_for_stdout() -> Self {
        if std::io::stdout().is_terminal() {
            Self::Table
        } else {
            Self::Json
        }
    }
}

/// Where a printed value came from.
pub struct ValueMeta<'a> {
    pub seq: u64,
    pub source: &'a str,
}

#[derive(Serialize)]
struct ValueOutput<'a> {
    seq: u64,
    source: &'a str,
    payload_size: usize,
    value: &'a Value,
    timestamp: String,
}

pub fn print_value(value: &Value, meta: &ValueMeta<'_>, format: OutputFormat) {
    let compact = serde_json::to_string(value).unwrap_or_else(|_| "null".to_string());
    match format {
        OutputFormat::Json => {
            let out = ValueOutput {
                seq: meta.seq,
                source: meta.source,
                payload_size: compact.len(),
                value,
                timestamp: now_unix_seconds(),
            };
            println!(
                "{}",
                serde_json::to_string(&out).unwrap_or_else(|_| "{}".to_string())
            );
        }
        OutputFormat::Table => {
            let mut table = Table::new();
            table
                .load_preset(UTF8_FULL)
                .set_content_arrangement(ContentArrangement::Dynamic)
                .set_header(vec!["SEQ", "SOURCE", "SIZE", "VALUE"])
                .add_row(vec![
                    meta.seq.to_string(),
                    meta.source.to_string(),
                    compact.len().to_string(),
                    compact,
                ]);
            println!("{table}");
        }
        OutputFormat::Pretty => {
            let pretty = serde_json::to_string_pretty(value).unwrap_or(compact);
            println!("#{} from {}:\n{pretty}", meta.seq, meta.source);
        }
        OutputFormat::Raw => {
            print_raw(format!("{compact}\n").as_bytes());
        }
    }
}

pub fn print_raw(data: &[u8]) {
    let mut out = std::io::stdout();
    let _ = out.write_all(data);
    let _ = out.flush();
}

fn now_unix_seconds() -> String {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_secs().to_string())
        .unwrap_or_else(|_| "0".to_string())
}
