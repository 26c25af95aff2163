use std::io::{self, ErrorKind, Write};

use bytes::BytesMut;
use tracing::trace;

use crate::codec::{Frame, FrameConfig};
use crate::digest::{DigestProvider, Sha256Digest};
use crate::encoder::{assemble, encode_length, FrameEncoder};
use crate::error::{FrameError, Result};

/// Writes complete frames to any `Write` stream, such as an open serial port.
///
/// Each frame is assembled in an internal buffer and handed to the stream
/// with `write_all`, then flushed. Nothing is written for a payload that
/// fails to encode. A stream that reports `WouldBlock` surfaces as
/// [`FrameError::Io`]; the frame may then be partly on the wire.
pub struct FrameWriter<T, D = Sha256Digest> {
    inner: T,
    buf: BytesMut,
    max_payload_size: usize,
    encoder: FrameEncoder<D>,
}

impl<T: Write> FrameWriter<T> {
    /// Create a writer with the default payload limit and SHA-256.
    pub fn new(inner: T) -> Self {
        Self::with_config(inner, FrameConfig::default())
    }

    /// Create a writer that enforces `config.max_payload_size` on send.
    pub fn with_config(inner: T, config: FrameConfig) -> Self {
        Self::with_encoder(inner, config, FrameEncoder::new())
    }
}

impl<T: Write, D: DigestProvider> FrameWriter<T, D> {
    /// Create a writer around an explicit encoder.
    pub fn with_encoder(inner: T, config: FrameConfig, encoder: FrameEncoder<D>) -> Self {
        Self {
            inner,
            buf: BytesMut::new(),
            max_payload_size: config.max_payload_size,
            encoder,
        }
    }

    /// Frame `payload` and send it.
    pub fn send(&mut self, payload: &[u8]) -> Result<()> {
        self.check_size(payload.len())?;
        self.buf.clear();
        self.encoder.encode_into(payload, &mut self.buf)?;
        self.transmit()
    }

    /// Send an already-digested frame as is.
    ///
    /// The stored `frame.digest` goes on the wire unchanged, matching
    /// [`Frame::to_bytes`]. A frame whose digest does not match its payload
    /// is rejected by the receiver with [`FrameError::DigestMismatch`].
    pub fn write_frame(&mut self, frame: &Frame) -> Result<()> {
        self.check_size(frame.payload.len())?;
        let length = encode_length(frame.payload.len())?;
        self.buf.clear();
        assemble(length, &frame.payload, &frame.digest, &mut self.buf);
        self.transmit()
    }

    /// Flush the underlying stream.
    pub fn flush(&mut self) -> Result<()> {
        self.inner.flush().map_err(write_error)
    }

    pub fn get_ref(&self) -> &T {
        &self.inner
    }

    pub fn get_mut(&mut self) -> &mut T {
        &mut self.inner
    }

    pub fn into_inner(self) -> T {
        self.inner
    }

    /// Largest payload this writer will send.
    pub fn max_payload_size(&self) -> usize {
        self.max_payload_size
    }

    pub fn set_max_payload_size(&mut self, max_payload_size: usize) {
        self.max_payload_size = max_payload_size;
    }

    fn check_size(&self, size: usize) -> Result<()> {
        if size > self.max_payload_size {
            return Err(FrameError::PayloadTooLarge {
                size,
                max: self.max_payload_size,
            });
        }
        Ok(())
    }

    fn transmit(&mut self) -> Result<()> {
        self.inner.write_all(&self.buf).map_err(write_error)?;
        trace!(frame_size = self.buf.len(), "frame written");
        self.flush()
    }
}

// A stream that accepts zero bytes has gone away.
fn write_error(err: io::Error) -> FrameError {
    match err.kind() {
        ErrorKind::WriteZero => FrameError::ConnectionClosed,
        _ => FrameError::Io(err),
    }
}
