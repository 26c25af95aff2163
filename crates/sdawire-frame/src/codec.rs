use bytes::{Buf, Bytes, BytesMut};
use tracing::{debug, error};

use crate::digest::digest;
pub use crate::digest::DIGEST_SIZE;
use crate::encoder::{assemble, encode_length};
use crate::error::{FrameError, Result};

/// Preamble bytes: "mbeddbap".
pub const PREAMBLE: [u8; 8] = [0x6d, 0x62, 0x65, 0x64, 0x64, 0x62, 0x61, 0x70];

/// Length field size in bytes.
pub const LENGTH_SIZE: usize = 4;

/// Frame header: preamble (8) + length (4) = 12 bytes.
pub const HEADER_SIZE: usize = PREAMBLE.len() + LENGTH_SIZE;

/// Bytes a frame adds around its payload: header + digest = 44.
pub const FRAME_OVERHEAD: usize = HEADER_SIZE + DIGEST_SIZE;

/// Default maximum payload size accepted by receivers: 16 MiB.
pub const DEFAULT_MAX_PAYLOAD: usize = 16 * 1024 * 1024;

/// A payload together with its SHA-256 digest.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Frame {
    /// The opaque operation message.
    pub payload: Bytes,
    /// SHA-256 of `payload`.
    pub digest: [u8; DIGEST_SIZE],
}

impl Frame {
    /// Create a frame, computing the payload digest.
    pub fn new(payload: impl Into<Bytes>) -> Self {
        let payload = payload.into();
        let digest = digest(&payload);
        Self { payload, digest }
    }

    /// The total wire size of this frame (header + payload + digest).
    pub fn wire_size(&self) -> usize {
        FRAME_OVERHEAD + self.payload.len()
    }

    /// Encode this frame into its wire bytes, using the stored digest.
    pub fn to_bytes(&self) -> Result<Bytes> {
        let length = encode_length(self.payload.len())?;
        let mut dst = BytesMut::with_capacity(self.wire_size());
        assemble(length, &self.payload, &self.digest, &mut dst);
        Ok(dst.freeze())
    }

    /// True if the stored digest matches the payload.
    pub fn is_valid(&self) -> bool {
        digest(&self.payload) == self.digest
    }
}

/// Decode a frame from a buffer.
///
/// Returns `Ok(None)` if the buffer doesn't contain a complete frame yet.
/// On success, consumes the frame bytes from the buffer. A frame whose digest
/// does not verify is consumed as well and reported as
/// [`FrameError::DigestMismatch`].
pub fn decode_frame(src: &mut BytesMut, max_payload: usize) -> Result<Option<Frame>> {
    if src.len() < HEADER_SIZE {
        return Ok(None); // Need more data
    }

    if src[..PREAMBLE.len()] != PREAMBLE {
        return Err(FrameError::InvalidPreamble);
    }

    let mut length = [0u8; LENGTH_SIZE];
    length.copy_from_slice(&src[PREAMBLE.len()..HEADER_SIZE]);
    let payload_len = u32::from_be_bytes(length) as usize;

    if payload_len > max_payload {
        return Err(FrameError::PayloadTooLarge {
            size: payload_len,
            max: max_payload,
        });
    }

    // Only reachable on 32-bit targets with a limit near `usize::MAX`.
    let total = FRAME_OVERHEAD
        .checked_add(payload_len)
        .ok_or(FrameError::PayloadTooLarge {
            size: payload_len,
            max: usize::MAX - FRAME_OVERHEAD,
        })?;
    if src.len() < total {
        return Ok(None); // Need more data
    }

    src.advance(HEADER_SIZE);
    let payload = src.split_to(payload_len).freeze();
    let mut trailer = [0u8; DIGEST_SIZE];
    trailer.copy_from_slice(&src[..DIGEST_SIZE]);
    src.advance(DIGEST_SIZE);

    if digest(&payload) != trailer {
        error!(payload_len, "frame digest mismatch");
        return Err(FrameError::DigestMismatch);
    }

    debug!(payload_len, "decoded frame");
    Ok(Some(Frame {
        payload,
        digest: trailer,
    }))
}

/// Validate one complete in-memory frame and return its payload.
pub fn verify_frame(frame: &[u8]) -> Result<Bytes> {
    let mut buf = BytesMut::from(frame);
    match decode_frame(&mut buf, u32::MAX as usize)? {
        Some(decoded) if buf.is_empty() => Ok(decoded.payload),
        Some(_) => Err(FrameError::TrailingBytes(buf.len())),
        None => Err(FrameError::ConnectionClosed),
    }
}

/// Drop bytes from the front of `src` until it starts at a possible preamble.
///
/// A trailing partial match (e.g. `"mbe"` at the end of the buffer) is kept
/// so the rest of the preamble can arrive. Returns the number of bytes
/// discarded.
pub fn resync_to_preamble(src: &mut BytesMut) -> usize {
    // Skip offset 0: callers resync after the current position failed.
    let start = (1..src.len())
        .find(|&i| {
            let tail = &src[i..];
            let n = tail.len().min(PREAMBLE.len());
            tail[..n] == PREAMBLE[..n]
        })
        .unwrap_or(src.len());

    src.advance(start);
    start
}

/// Configuration for frame readers and writers.
///
/// Port timeouts belong to the stream handed to the reader or writer.
#[derive(Debug, Clone)]
pub struct FrameConfig {
    /// Maximum payload size in bytes. Default: 16 MiB.
    pub max_payload_size: usize,
    /// Skip bytes that don't start with the preamble instead of failing.
    pub resync: bool,
}

impl Default for FrameConfig {
    fn default() -> Self {
        Self {
            max_payload_size: DEFAULT_MAX_PAYLOAD,
            resync: false,
        }
    }
}
