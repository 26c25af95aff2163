/// Errors that can occur during frame encoding/decoding.
#[derive(Debug, thiserror::Error)]
pub enum FrameError {
    /// The payload length cannot be represented in the 4-byte length field.
    #[error("invalid input: payload of {size} bytes exceeds length field maximum {max}")]
    InvalidInput { size: usize, max: usize },

    /// The SHA-256 primitive could not be obtained. No frame can be produced.
    #[error("digest unavailable: {0}")]
    DigestUnavailable(String),

    /// The frame does not start with the "mbeddbap" preamble.
    #[error("invalid frame preamble (expected \"mbeddbap\")")]
    InvalidPreamble,

    /// The payload exceeds the configured maximum size.
    #[error("payload too large ({size} bytes, max {max})")]
    PayloadTooLarge { size: usize, max: usize },

    /// The trailing digest does not match the SHA-256 of the payload.
    #[error("frame digest mismatch")]
    DigestMismatch,

    /// A single-frame buffer carried bytes after the digest.
    #[error("{0} trailing bytes after frame digest")]
    TrailingBytes(usize),

    /// An I/O error occurred while reading or writing frames.
    #[error("frame I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// The stream was closed before a complete frame was received.
    #[error("connection closed (incomplete frame)")]
    ConnectionClosed,
}

pub type Result<T> = std::result::Result<T, FrameError>;
