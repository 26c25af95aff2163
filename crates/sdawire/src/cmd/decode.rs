use std::fs::File;
use std::io::{self, Read};

use sdawire_frame::{Frame, FrameConfig, FrameError, FrameReader};
use tracing::{debug, info};

use crate::cmd::DecodeArgs;
use crate::exit::{frame_error, io_error, CliResult, SUCCESS};
use crate::output::{print_frame, OutputFormat};

pub fn run(args: DecodeArgs, format: OutputFormat) -> CliResult<i32> {
    let input: Box<dyn Read> = match &args.path {
        Some(path) => Box::new(
            File::open(path)
                .map_err(|err| io_error(&format!("failed opening {}", path.display()), err))?,
        ),
        None => Box::new(io::stdin().lock()),
    };

    let config = FrameConfig {
        max_payload_size: args.max_payload,
        resync: args.resync,
    };
    let decoded = decode_stream(input, config, args.count, |index, frame| {
        print_frame(index, frame, format)
    })?;

    info!(frames = decoded, "decode finished");
    Ok(SUCCESS)
}

/// Decode frames from `input` until clean EOF or `limit` frames, handing each
/// to `on_frame`. A failing `on_frame` stops decoding. Returns the number of frames decoded.
fn decode_stream<R: Read>(
    input: R,
    config: FrameConfig,
    limit: Option<usize>,
    mut on_frame: impl FnMut(usize, &Frame) -> CliResult<()>,
) -> CliResult<usize> {
    let mut reader = FrameReader::with_config(input, config);
    let mut count = 0usize;

    while limit.is_none_or(|limit| count < limit) {
        match reader.next() {
            Some(Ok(frame)) => {
                debug!(index = count, payload_size = frame.payload.len(), "frame verified");
                on_frame(count, &frame)?;
                count += 1;
            }
            Some(Err(FrameError::ConnectionClosed)) => {
                return Err(frame_error(
                    &format!("truncated frame after {count} complete frames"),
                    FrameError::ConnectionClosed,
                ));
            }
            Some(Err(err)) => {
                return Err(frame_error(&format!("frame {count} rejected"), err));
            }
            None => break,
        }
    }

    Ok(count)
}
