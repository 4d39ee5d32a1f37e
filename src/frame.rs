//! The frame envelope.
//!
//! ```text
//! offset   | length  | field
//! 0        | 1       | start marker (0x0D)
//! 1        | 1       | frame type
//! 2        | 2       | declared size, big-endian i16
//! 4        | n       | payload
//! len - 3  | 2       | checksum, big-endian
//! len - 1  | 1       | end marker (0x77)
//! ```

use crate::error::{DecodeError, DecodeResult};

/// Byte which starts every reply frame.
pub const FRAME_START: u8 = 0x0d;
/// Byte which ends every frame.
pub const FRAME_END: u8 = 0x77;
/// Length of a frame with an empty payload.
pub const MIN_FRAME_LEN: usize = 7;

const HEADER_LEN: usize = 4;
const TRAILER_LEN: usize = 3;

/// One frame split into its envelope fields.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Frame {
    /// First byte, normally [`FRAME_START`].
    pub magic: u8,
    /// Selects how the payload is decoded.
    pub frame_type: u8,
    /// Length field as sent by the device. Not used to slice the payload.
    pub declared_size: i16,
    /// Bytes between the length field and the checksum.
    pub payload: Vec<u8>,
    /// Check value as sent by the device, see [`checksum`].
    pub checksum: u16,
    /// Last byte, normally [`FRAME_END`].
    pub terminator: u8,
}

impl Frame {
    /// Split complete frame bytes into envelope fields.
    ///
    /// The payload is taken from the actual length of `bytes`; no field is validated
    /// here, see [`Frame::verify`].
    pub fn parse(bytes: &[u8]) -> DecodeResult<Self> {
        let len = bytes.len();
        if len < MIN_FRAME_LEN {
            return Err(DecodeError::TruncatedFrame {
                expected: MIN_FRAME_LEN,
                actual: len,
            });
        }

        Ok(Self {
            magic: bytes[0],
            frame_type: bytes[1],
            declared_size: i16::from_be_bytes([bytes[2], bytes[3]]),
            payload: bytes[HEADER_LEN..len - TRAILER_LEN].to_vec(),
            checksum: u16::from_be_bytes([bytes[len - 3], bytes[len - 2]]),
            terminator: bytes[len - 1],
        })
    }

    /// Check the markers, the length field and the checksum.
    pub fn verify(&self) -> DecodeResult<()> {
        if self.magic != FRAME_START {
            return Err(DecodeError::BadMagic(self.magic));
        }
        if self.terminator != FRAME_END {
            return Err(DecodeError::BadTerminator(self.terminator));
        }
        if usize::try_from(self.declared_size).ok() != Some(self.payload.len()) {
            return Err(DecodeError::DeclaredSizeMismatch {
                declared: self.declared_size,
                actual: self.payload.len(),
            });
        }

        let size = self.declared_size.to_be_bytes();
        let expected = checksum(size.iter().chain(self.payload.iter()));
        if expected != self.checksum {
            return Err(DecodeError::ChecksumMismatch {
                expected,
                actual: self.checksum,
            });
        }

        Ok(())
    }
}

/// Compute the check value over the bytes between the type byte and the checksum field.
///
/// The BMS uses the two's complement of the byte sum, truncated to 16 bits.
pub fn checksum<'a>(bytes: impl IntoIterator<Item = &'a u8>) -> u16 {
    let sum = bytes
        .into_iter()
        .fold(0u16, |acc, &b| acc.wrapping_add(b as u16));
    0u16.wrapping_sub(sum)
}

#[test]
fn test_parse_happy() {
    let bytes = hex::decode("0d0400060064fff6012cfd7477").unwrap();
    let frame = Frame::parse(&bytes).unwrap();
    assert_eq!(
        frame,
        Frame {
            magic: 0x0d,
            frame_type: 0x04,
            declared_size: 6,
            payload: hex::decode("0064fff6012c").unwrap(),
            checksum: 0xfd74,
            terminator: 0x77,
        }
    );
    assert_eq!(frame.verify(), Ok(()));
}

#[test]
fn test_parse_empty_payload() {
    let bytes = hex::decode("0d040000000077").unwrap();
    let frame = Frame::parse(&bytes).unwrap();
    assert!(frame.payload.is_empty());
    assert_eq!(frame.checksum, 0);
}

#[test]
fn test_parse_truncated() {
    let bytes = hex::decode("0d0300ff77").unwrap();
    assert_eq!(
        Frame::parse(&bytes),
        Err(DecodeError::TruncatedFrame {
            expected: 7,
            actual: 5
        })
    );
}

#[test]
fn test_parse_ignores_declared_size() {
    let bytes = hex::decode("0d0400100064fd9a77").unwrap();
    let frame = Frame::parse(&bytes).unwrap();
    assert_eq!(frame.declared_size, 16);
    assert_eq!(frame.payload, vec![0x00, 0x64]);
    assert_eq!(
        frame.verify(),
        Err(DecodeError::DeclaredSizeMismatch {
            declared: 16,
            actual: 2
        })
    );
}

#[test]
fn test_verify_bad_checksum() {
    let bytes = hex::decode("0d0400060064fff6012cfd7577").unwrap();
    let frame = Frame::parse(&bytes).unwrap();
    assert_eq!(
        frame.verify(),
        Err(DecodeError::ChecksumMismatch {
            expected: 0xfd74,
            actual: 0xfd75
        })
    );
}

#[test]
fn test_verify_bad_magic() {
    let bytes = hex::decode("dd0400060064fff6012cfd7477").unwrap();
    let frame = Frame::parse(&bytes).unwrap();
    assert_eq!(frame.verify(), Err(DecodeError::BadMagic(0xdd)));
}

#[test]
fn test_verify_bad_terminator() {
    let bytes = hex::decode("0d040000000078").unwrap();
    let frame = Frame::parse(&bytes).unwrap();
    assert_eq!(frame.terminator, 0x78);
    assert_eq!(frame.verify(), Err(DecodeError::BadTerminator(0x78)));
}

#[test]
fn test_checksum() {
    assert_eq!(checksum(&[0x03u8, 0x00]), 0xfffd);
    assert_eq!(checksum(&[0x04u8, 0x00]), 0xfffc);
    assert_eq!(checksum(&Vec::<u8>::new()), 0);
}
