use sdawire_frame::FrameEncoder;
use serde::Serialize;

use crate::cmd::DigestArgs;
use crate::exit::{frame_error, CliResult, SUCCESS};
use crate::output::{print_raw, OutputFormat};

#[derive(Serialize)]
struct DigestOutput {
    algorithm: &'static str,
    payload_size: usize,
    digest: String,
}

pub fn run(args: DigestArgs, format: OutputFormat) -> CliResult<i32> {
    let payload = args.payload.resolve()?;
    let digest = FrameEncoder::new()
        .digest(&payload)
        .map_err(|err| frame_error("digest failed", err))?;

    match format {
        OutputFormat::Json => {
            let out = DigestOutput {
                algorithm: "sha-256",
                payload_size: payload.len(),
                digest: hex::encode(digest),
            };
            println!(
                "{}",
                serde_json::to_string(&out).unwrap_or_else(|_| "{}".to_string())
            );
        }
        OutputFormat::Raw => print_raw(&digest)?,
        OutputFormat::Table | OutputFormat::Pretty | OutputFormat::Hex => {
            println!("{}", hex::encode(digest));
        }
    }

    Ok(SUCCESS)
}
