//! Serial framing for opaque operation messages.
//!
//! Every message is framed with:
//! - An 8-byte preamble ("mbeddbap") marking the start of a frame
//! - A 4-byte big-endian payload length
//! - The payload itself
//! - A 32-byte SHA-256 digest of the payload
//!
//! A frame is always `44 + payload.len()` bytes. Decoding verifies the digest,
//! so callers only ever see payloads that arrived intact.

#[cfg(feature = "async")]
pub mod async_codec;
pub mod codec;
pub mod digest;
pub mod encoder;
pub mod error;
pub mod reader;
pub mod writer;

#[cfg(feature = "async")]
pub use async_codec::SerialCodec;
pub use codec::{
    decode_frame, resync_to_preamble, verify_frame, Frame, FrameConfig, DEFAULT_MAX_PAYLOAD,
    DIGEST_SIZE, FRAME_OVERHEAD, HEADER_SIZE, LENGTH_SIZE, PREAMBLE,
};
pub use digest::{digest, DigestProvider, Sha256Digest, UnavailableDigest};
pub use encoder::{encode, encode_frame, encode_length, FrameEncoder, MAX_ENCODABLE_PAYLOAD};
pub use error::{FrameError, Result};
pub use reader::FrameReader;
pub use writer::FrameWriter;
