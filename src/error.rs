//! Decode error types.

use thiserror::Error;

/// Errors raised while assembling or decoding a frame.
///
/// All of them are local to one frame: after any of them the session is ready
/// for the next chunk.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DecodeError {
    /// The transport delivered a zero-length chunk.
    #[error("empty chunk")]
    EmptyChunk,

    /// The assembly buffer grew past the configured limit and was discarded.
    #[error("frame too large: maximum {max} bytes, got {actual}")]
    FrameTooLarge {
        /// Configured maximum frame length.
        max: usize,
        /// Buffer length that was reached.
        actual: usize,
    },

    /// Complete frame bytes are shorter than the envelope.
    #[error("frame truncated: expected at least {expected} bytes, got {actual}")]
    TruncatedFrame {
        /// Minimum envelope length.
        expected: usize,
        /// Actual length received.
        actual: usize,
    },

    /// Payload length does not fit the frame type.
    #[error("payload length {actual} is invalid for frame type 0x{frame_type:02X}")]
    PayloadLengthMismatch {
        /// Frame type byte.
        frame_type: u8,
        /// Payload length received.
        actual: usize,
    },

    /// Start marker is not `0x0D` (strict mode only).
    #[error("bad start marker: 0x{0:02X}")]
    BadMagic(u8),

    /// End marker is not `0x77` (strict mode only).
    #[error("bad end marker: 0x{0:02X}")]
    BadTerminator(u8),

    /// Length field disagrees with the received payload (strict mode only).
    #[error("declared size {declared} does not match payload length {actual}")]
    DeclaredSizeMismatch {
        /// Value of the length field.
        declared: i16,
        /// Payload length received.
        actual: usize,
    },

    /// Checksum field disagrees with the computed one (strict mode only).
    #[error("checksum mismatch: calculated 0x{expected:04X}, received 0x{actual:04X}")]
    ChecksumMismatch {
        /// Computed checksum.
        expected: u16,
        /// Checksum field of the frame.
        actual: u16,
    },
}

/// Result type alias for decoding.
pub type DecodeResult<T> = Result<T, DecodeError>;
