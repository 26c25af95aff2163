use std::fs;
use std::io::Read;
use std::path::PathBuf;

use clap::{Args, Subcommand};
use sdawire_frame::DEFAULT_MAX_PAYLOAD;

use crate::exit::{io_error, CliError, CliResult, USAGE};
use crate::output::OutputFormat;

pub mod decode;
pub mod digest;
pub mod encode;
pub mod version;

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Wrap a payload in a serial frame.
    Encode(EncodeArgs),
    /// Read frames, verify their digests and print the payloads.
    Decode(DecodeArgs),
    /// Print the SHA-256 digest of a payload.
    Digest(DigestArgs),
    /// Show version information.
    Version(VersionArgs),
}

pub fn run(command: Command, format: OutputFormat) -> CliResult<i32> {
    match command {
        Command::Encode(args) => encode::run(args, format),
        Command::Decode(args) => decode::run(args, format),
        Command::Digest(args) => digest::run(args, format),
        Command::Version(args) => version::run(args),
    }
}

/// Where a payload comes from. Stdin when no flag is given.
#[derive(Args, Debug, Default)]
pub struct PayloadArgs {
    /// Raw string payload.
    #[arg(long, conflicts_with_all = ["file", "hex"])]
    pub data: Option<String>,
    /// Read payload from file.
    #[arg(long, conflicts_with_all = ["data", "hex"])]
    pub file: Option<PathBuf>,
    /// Hex-encoded payload.
    #[arg(long, conflicts_with_all = ["data", "file"])]
    pub hex: Option<String>,
}

impl PayloadArgs {
    pub fn resolve(&self) -> CliResult<Vec<u8>> {
        if let Some(data) = &self.data {
            return Ok(data.as_bytes().to_vec());
        }
        if let Some(text) = &self.hex {
            return hex::decode(text.trim())
                .map_err(|err| CliError::new(USAGE, format!("--hex is not valid hex: {err}")));
        }
        if let Some(path) = &self.file {
            return fs::read(path)
                .map_err(|err| io_error(&format!("failed reading {}", path.display()), err));
        }

        let mut buf = Vec::new();
        std::io::stdin()
            .read_to_end(&mut buf)
            .map_err(|err| io_error("failed reading stdin", err))?;
        Ok(buf)
    }
}

#[derive(Args, Debug)]
pub struct EncodeArgs {
    #[command(flatten)]
    pub payload: PayloadArgs,
    /// Write the raw frame to this file instead of stdout.
    #[arg(long, short = 'o', value_name = "PATH")]
    pub out: Option<PathBuf>,
}

#[derive(Args, Debug)]
pub struct DecodeArgs {
    /// File holding one or more frames. Default: stdin.
    pub path: Option<PathBuf>,
    /// Reject frames whose declared payload exceeds this many bytes.
    #[arg(long, env = "SDAWIRE_MAX_PAYLOAD", default_value_t = DEFAULT_MAX_PAYLOAD)]
    pub max_payload: usize,
    /// Skip bytes that don't start a frame instead of failing.
    #[arg(long)]
    pub resync: bool,
    /// Exit after N frames.
    #[arg(long)]
    pub count: Option<usize>,
}

#[derive(Args, Debug)]
pub struct DigestArgs {
    #[command(flatten)]
    pub payload: PayloadArgs,
}

#[derive(Args, Debug)]
pub struct VersionArgs {
    /// Show extended build provenance.
    #[arg(long)]
    pub extended: bool,
}
