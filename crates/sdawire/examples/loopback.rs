//! Frames a few operation messages into an in-memory "port" and reads them
//! back, verifying each digest.
//!
//! Run with:
//!   cargo run --example loopback

use std::io::Cursor;

use sdawire::frame::{FrameReader, FrameWriter, FRAME_OVERHEAD};

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let messages: [&[u8]; 3] = [b"", b"\x01\x02\x03", b"get-device-info"];

    let mut writer = FrameWriter::new(Vec::new());
    for message in messages {
        writer.send(message)?;
    }
    let port = writer.into_inner();
    eprintln!(
        "wrote {} bytes ({} frames, {} bytes overhead each)",
        port.len(),
        messages.len(),
        FRAME_OVERHEAD
    );

    for frame in FrameReader::new(Cursor::new(port)) {
        let frame = frame?;
        eprintln!(
            "payload {:?} ({} bytes) verified",
            String::from_utf8_lossy(&frame.payload),
            frame.payload.len()
        );
    }

    Ok(())
}
