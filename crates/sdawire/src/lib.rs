//! Serial operation-message framing with SHA-256 integrity.
//!
//! sdawire wraps opaque operation payloads in self-describing frames for
//! byte-oriented links such as USB serial: preamble, big-endian length,
//! payload, SHA-256 digest.
//!
//! # Crate Structure
//!
//! - [`frame`]: frame encoding, digest-verified decoding, blocking reader/writer
//!   and (behind `async`) a `tokio_util` codec

/// Re-export frame types.
pub mod frame {
    pub use sdawire_frame::*;
}

pub use sdawire_frame::{digest, encode, FrameError};
