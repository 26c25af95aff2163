use std::fs;

use sdawire_frame::FrameEncoder;
use tracing::info;

use crate::cmd::EncodeArgs;
use crate::exit::{frame_error, io_error, CliResult, SUCCESS};
use crate::output::{print_encoded, print_raw, OutputFormat};

pub fn run(args: EncodeArgs, format: OutputFormat) -> CliResult<i32> {
    let payload = args.payload.resolve()?;
    let frame = FrameEncoder::new()
        .frame(payload)
        .map_err(|err| frame_error("encode failed", err))?;
    let wire = frame
        .to_bytes()
        .map_err(|err| frame_error("encode failed", err))?;

    info!(
        payload_size = frame.payload.len(),
        frame_size = wire.len(),
        "payload framed"
    );

    match &args.out {
        Some(path) => {
            fs::write(path, &wire)
                .map_err(|err| io_error(&format!("failed writing {}", path.display()), err))?;
            if format != OutputFormat::Raw {
                print_encoded(&frame, &wire, format)?;
            }
        }
        None if format == OutputFormat::Raw => print_raw(&wire)?,
        None => print_encoded(&frame, &wire, format)?,
    }

    Ok(SUCCESS)
}
