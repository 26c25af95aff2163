use bytes::{BufMut, Bytes, BytesMut};
use tracing::{debug, error};

use crate::codec::{Frame, FRAME_OVERHEAD, LENGTH_SIZE, PREAMBLE};
use crate::digest::{DigestProvider, Sha256Digest, DIGEST_SIZE};
use crate::error::{FrameError, Result};

/// Largest payload the 4-byte length field can describe.
pub const MAX_ENCODABLE_PAYLOAD: usize = u32::MAX as usize;

/// Builds wire frames from opaque payloads.
///
/// Stateless: one encoder can be shared across threads and every call
/// allocates its own output.
#[derive(Debug, Default, Clone, Copy)]
pub struct FrameEncoder<D = Sha256Digest> {
    digest: D,
}

impl FrameEncoder<Sha256Digest> {
    /// Create an encoder using SHA-256 from `sha2`.
    pub fn new() -> Self {
        Self {
            digest: Sha256Digest,
        }
    }
}

impl<D: DigestProvider> FrameEncoder<D> {
    /// Create an encoder with an explicit digest provider.
    pub fn with_digest(digest: D) -> Self {
        Self { digest }
    }

    /// Digest a payload without framing it.
    pub fn digest(&self, payload: &[u8]) -> Result<[u8; DIGEST_SIZE]> {
        self.digest.digest(payload).inspect_err(|err| {
            if matches!(err, FrameError::DigestUnavailable(_)) {
                error!(algorithm = self.digest.name(), error = %err, "payload digest unavailable");
            }
        })
    }

    /// Encode `payload` into a freshly allocated frame of exactly
    /// `44 + payload.len()` bytes.
    pub fn encode(&self, payload: &[u8]) -> Result<Bytes> {
        let mut dst = BytesMut::new();
        self.encode_into(payload, &mut dst)?;
        Ok(dst.freeze())
    }

    /// Append one frame for `payload` to `dst`.
    ///
    /// Wire format:
    /// ```text
    /// ┌────────────────┬────────────┬────────────────┬─────────────┐
    /// │ Preamble (8B)  │ Length     │ Payload        │ Digest      │
    /// │ "mbeddbap"     │ (4B BE)    │ (Length bytes) │ (32B SHA256)│
    /// └────────────────┴────────────┴────────────────┴─────────────┘
    /// ```
    ///
    /// On error `dst` is left untouched.
    pub fn encode_into(&self, payload: &[u8], dst: &mut BytesMut) -> Result<()> {
        let length = encode_length(payload.len())?;
        let digest = self.digest(payload)?;

        assemble(length, payload, &digest, dst);
        debug!(payload_len = payload.len(), "encoded frame");
        Ok(())
    }

    /// Digest `payload` into a [`Frame`] without serializing it.
    pub fn frame(&self, payload: impl Into<Bytes>) -> Result<Frame> {
        let payload = payload.into();
        encode_length(payload.len())?;
        let digest = self.digest(&payload)?;
        Ok(Frame { payload, digest })
    }
}

/// Write preamble, length, payload and digest to `dst` in wire order.
pub(crate) fn assemble(
    length: [u8; LENGTH_SIZE],
    payload: &[u8],
    digest: &[u8; DIGEST_SIZE],
    dst: &mut BytesMut,
) {
    dst.reserve(FRAME_OVERHEAD + payload.len());
    dst.put_slice(&PREAMBLE);
    dst.put_slice(&length);
    dst.put_slice(payload);
    dst.put_slice(digest);
}

/// Encode a payload length as the 4-byte big-endian length field.
///
/// Lengths above `u32::MAX` fail with [`FrameError::InvalidInput`].
pub fn encode_length(len: usize) -> Result<[u8; LENGTH_SIZE]> {
    let len = u32::try_from(len).map_err(|_| FrameError::InvalidInput {
        size: len,
        max: MAX_ENCODABLE_PAYLOAD,
    })?;
    Ok(len.to_be_bytes())
}

/// Encode `payload` into a new frame with the default SHA-256 encoder.
pub fn encode(payload: &[u8]) -> Result<Bytes> {
    FrameEncoder::new().encode(payload)
}

/// Append one frame for `payload` to `dst` with the default encoder.
pub fn encode_frame(payload: &[u8], dst: &mut BytesMut) -> Result<()> {
    FrameEncoder::new().encode_into(payload, dst)
}
