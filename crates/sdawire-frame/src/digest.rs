//! Payload digesting.
//!
//! Frames carry the SHA-256 of their payload. The encoder reaches the hash
//! through [`DigestProvider`] so that a missing primitive surfaces as
//! [`FrameError::DigestUnavailable`] instead of a malformed frame.

use sha2::{Digest as _, Sha256};

use crate::error::{FrameError, Result};

/// Digest length in bytes (SHA-256).
pub const DIGEST_SIZE: usize = 32;

/// Source of the payload digest used by [`crate::FrameEncoder`].
pub trait DigestProvider: Send + Sync {
    /// Digest `payload`. Must return the SHA-256 of exactly these bytes.
    fn digest(&self, payload: &[u8]) -> Result<[u8; DIGEST_SIZE]>;

    /// Algorithm name for logs.
    fn name(&self) -> &'static str {
        "sha-256"
    }
}

/// SHA-256 backed by the `sha2` crate. Always available.
#[derive(Debug, Default, Clone, Copy)]
pub struct Sha256Digest;

impl DigestProvider for Sha256Digest {
    fn digest(&self, payload: &[u8]) -> Result<[u8; DIGEST_SIZE]> {
        Ok(digest(payload))
    }
}

impl<D: DigestProvider + ?Sized> DigestProvider for &D {
    fn digest(&self, payload: &[u8]) -> Result<[u8; DIGEST_SIZE]> {
        (**self).digest(payload)
    }

    fn name(&self) -> &'static str {
        (**self).name()
    }
}

/// A provider that never yields a digest.
///
/// Stands in for a build or runtime where the hash primitive was not
/// linked; every call fails with [`FrameError::DigestUnavailable`].
#[derive(Debug, Clone)]
pub struct UnavailableDigest {
    reason: &'static str,
}

impl UnavailableDigest {
    /// `reason` is carried in the returned error.
    pub fn new(reason: &'static str) -> Self {
        Self { reason }
    }
}

impl DigestProvider for UnavailableDigest {
    fn digest(&self, _payload: &[u8]) -> Result<[u8; DIGEST_SIZE]> {
        Err(FrameError::DigestUnavailable(self.reason.to_string()))
    }
}

/// SHA-256 of `payload`.
pub fn digest(payload: &[u8]) -> [u8; DIGEST_SIZE] {
    Sha256::digest(payload).into()
}
