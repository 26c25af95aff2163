use std::io::{ErrorKind, Read};

use bytes::BytesMut;
use tracing::warn;

use crate::codec::{decode_frame, resync_to_preamble, Frame, FrameConfig};
use crate::error::{FrameError, Result};

const INITIAL_BUFFER_CAPACITY: usize = 8 * 1024;
const READ_CHUNK_SIZE: usize = 8 * 1024;

/// Reads complete, digest-verified frames from any `Read` stream.
///
/// Handles partial reads internally; callers always get complete frames.
pub struct FrameReader<T> {
    inner: T,
    buf: BytesMut,
    config: FrameConfig,
    // Set once the iterator has reported an error it cannot move past.
    exhausted: bool,
}

impl<T: Read> FrameReader<T> {
    /// Create a new frame reader with default configuration.
    pub fn new(inner: T) -> Self {
        Self::with_config(inner, FrameConfig::default())
    }

    /// Create a new frame reader with explicit configuration.
    pub fn with_config(inner: T, config: FrameConfig) -> Self {
        Self {
            inner,
            buf: BytesMut::with_capacity(INITIAL_BUFFER_CAPACITY),
            config,
            exhausted: false,
        }
    }

    /// Read the next complete frame (blocking).
    ///
    /// Returns `Err(FrameError::ConnectionClosed)` when EOF is reached.
    /// With `resync` enabled, bytes that don't start a frame are skipped.
    pub fn read_frame(&mut self) -> Result<Frame> {
        loop {
            match decode_frame(&mut self.buf, self.config.max_payload_size) {
                Ok(Some(frame)) => return Ok(frame),
                Ok(None) => {}
                Err(FrameError::InvalidPreamble) if self.config.resync => {
                    let skipped = resync_to_preamble(&mut self.buf);
                    warn!(skipped, "discarded bytes before frame preamble");
                    continue;
                }
                Err(err) => return Err(err),
            }

            let mut chunk = [0u8; READ_CHUNK_SIZE];
            let read = match self.inner.read(&mut chunk) {
                Ok(n) => n,
                Err(err) if err.kind() == ErrorKind::Interrupted => continue,
                Err(err) => return Err(FrameError::Io(err)),
            };

            if read == 0 {
                return Err(FrameError::ConnectionClosed);
            }

            self.buf.extend_from_slice(&chunk[..read]);
        }
    }

    /// Bytes received but not yet returned as a frame.
    pub fn buffered(&self) -> &[u8] {
        &self.buf
    }

    /// Borrow the underlying stream.
    pub fn get_ref(&self) -> &T {
        &self.inner
    }

    /// Mutably borrow the underlying stream.
    pub fn get_mut(&mut self) -> &mut T {
        &mut self.inner
    }

    /// Consume the reader and return the inner stream.
    pub fn into_inner(self) -> T {
        self.inner
    }

    /// Update maximum payload size for subsequent frame decoding.
    pub fn set_max_payload_size(&mut self, max_payload_size: usize) {
        self.config.max_payload_size = max_payload_size;
    }

    /// Current frame reader configuration.
    pub fn config(&self) -> &FrameConfig {
        &self.config
    }
}

impl<T: Read> Iterator for FrameReader<T> {
    type Item = Result<Frame>;

    /// Yields frames until the stream closes cleanly between frames.
    ///
    /// A [`FrameError::DigestMismatch`] is yielded and iteration continues
    /// with the next frame. Any other error is yielded once, after which the
    /// iterator returns `None`.
    fn next(&mut self) -> Option<Self::Item> {
        if self.exhausted {
            return None;
        }
        match self.read_frame() {
            Ok(frame) => Some(Ok(frame)),
            Err(FrameError::DigestMismatch) => Some(Err(FrameError::DigestMismatch)),
            Err(FrameError::ConnectionClosed) if self.buf.is_empty() => {
                self.exhausted = true;
                None
            }
            Err(err) => {
                self.exhausted = true;
                Some(Err(err))
            }
        }
    }
}
