use crate::error::{DecodeError, DecodeResult};

/// A verbatim message to send which requests the pack summary
pub const REQUEST: [u8; 7] = [0xdd, 0xa5, 0x03, 0x00, 0xff, 0xfd, 0x77];

pub const FRAME_TYPE: u8 = 0x03;

const PAYLOAD_LEN: usize = 8;

/// A message type which contains pack voltage, current and capacity.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PackSummaryMessage {
    pub voltage_cv: u16,
    pub current_ca: i16,
    pub residual_capacity_cah: u16,
    pub nominal_capacity_cah: u16,
}

impl PackSummaryMessage {
    pub fn decode(payload: &[u8]) -> DecodeResult<Self> {
        if payload.len() != PAYLOAD_LEN {
            return Err(DecodeError::PayloadLengthMismatch {
                frame_type: FRAME_TYPE,
                actual: payload.len(),
            });
        }

        let field = |i: usize| [payload[i * 2], payload[i * 2 + 1]];
        Ok(Self {
            voltage_cv: u16::from_be_bytes(field(0)),
            current_ca: i16::from_be_bytes(field(1)),
            residual_capacity_cah: u16::from_be_bytes(field(2)),
            nominal_capacity_cah: u16::from_be_bytes(field(3)),
        })
    }
}

#[test]
fn test_decode() {
    let payload = hex::decode("0e74ff6a13881770").unwrap();
    assert_eq!(
        PackSummaryMessage::decode(&payload),
        Ok(PackSummaryMessage {
            voltage_cv: 3700,
            current_ca: -150,
            residual_capacity_cah: 5000,
            nominal_capacity_cah: 6000,
        })
    );
}

#[test]
fn test_decode_wrong_length() {
    for payload in ["", "0e74ff6a1388", "0e74ff6a1388177000"] {
        let payload = hex::decode(payload).unwrap();
        assert_eq!(
            PackSummaryMessage::decode(&payload),
            Err(DecodeError::PayloadLengthMismatch {
                frame_type: FRAME_TYPE,
                actual: payload.len()
            })
        );
    }
}
