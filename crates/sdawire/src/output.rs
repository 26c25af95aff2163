use std::io::{IsTerminal, Write};

use clap::ValueEnum;
use comfy_table::{presets::UTF8_FULL, ContentArrangement, Table};
use sdawire_frame::{Frame, FRAME_OVERHEAD};
use serde::Serialize;

use crate::exit::{io_error, CliResult};

#[derive(Clone, Debug, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    Json,
    Table,
    Pretty,
    Hex,
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

#[derive(Serialize)]
struct FrameOutput<'a> {
    schema_id: &'a str,
    index: usize,
    payload_size: usize,
    frame_size: usize,
    digest: String,
    payload: String,
    payload_hex: String,
}

impl<'a> FrameOutput<'a> {
    fn new(schema_id: &'a str, index: usize, frame: &Frame) -> Self {
        Self {
            schema_id,
            index,
            payload_size: frame.payload.len(),
            frame_size: frame.wire_size(),
            digest: hex::encode(frame.digest),
            payload: payload_preview(frame.payload.as_ref()),
            payload_hex: hex::encode(&frame.payload),
        }
    }
}

/// Print a frame received from a stream.
pub fn print_frame(index: usize, frame: &Frame, format: OutputFormat) -> CliResult<()> {
    match format {
        OutputFormat::Json => {
            let out = FrameOutput::new("sdawire/cli/v1/frame-decoded", index, frame);
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
                .set_header(vec!["#", "SIZE", "DIGEST", "PAYLOAD"])
                .add_row(vec![
                    index.to_string(),
                    frame.payload.len().to_string(),
                    short_digest(&frame.digest),
                    payload_preview(frame.payload.as_ref()),
                ]);
            println!("{table}");
        }
        OutputFormat::Pretty => {
            println!(
                "frame={} size={} digest={} payload={}",
                index,
                frame.payload.len(),
                hex::encode(frame.digest),
                payload_preview(frame.payload.as_ref())
            );
        }
        OutputFormat::Hex => println!("{}", hex::encode(&frame.payload)),
        OutputFormat::Raw => return print_raw(frame.payload.as_ref()),
    }
    Ok(())
}

/// Print a frame produced by `encode`; `wire` holds the full frame bytes.
pub fn print_encoded(frame: &Frame, wire: &[u8], format: OutputFormat) -> CliResult<()> {
    match format {
        OutputFormat::Json => {
            let out = FrameOutput::new("sdawire/cli/v1/frame-encoded", 0, frame);
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
                .set_header(vec!["PAYLOAD SIZE", "FRAME SIZE", "DIGEST"])
                .add_row(vec![
                    frame.payload.len().to_string(),
                    wire.len().to_string(),
                    hex::encode(frame.digest),
                ]);
            println!("{table}");
        }
        OutputFormat::Pretty => {
            println!(
                "payload_size={} frame_size={} overhead={} digest={}",
                frame.payload.len(),
                wire.len(),
                FRAME_OVERHEAD,
                hex::encode(frame.digest)
            );
        }
        OutputFormat::Hex => println!("{}", hex::encode(wire)),
        OutputFormat::Raw => return print_raw(wire),
    }
    Ok(())
}

/// Write bytes to stdout unmodified. A short or failed write is an error.
pub fn print_raw(data: &[u8]) -> CliResult<()> {
    write_raw(&mut std::io::stdout().lock(), data)
}

fn write_raw(out: &mut impl Write, data: &[u8]) -> CliResult<()> {
    out.write_all(data)
        .and_then(|()| out.flush())
        .map_err(|err| io_error("failed writing stdout", err))
}

fn short_digest(digest: &[u8]) -> String {
    let full = hex::encode(digest);
    format!("{}…", &full[..16])
}

fn payload_preview(payload: &[u8]) -> String {
    match std::str::from_utf8(payload) {
        Ok(text) => text.to_string(),
        Err(_) => format!("<binary {} bytes>", payload.len()),
    }
}
