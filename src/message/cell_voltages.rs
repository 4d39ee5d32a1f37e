use crate::error::{DecodeError, DecodeResult};

/// A verbatim message to send which requests the cell voltages
pub const REQUEST: [u8; 7] = [0xdd, 0xa5, 0x04, 0x00, 0xff, 0xfc, 0x77];

pub const FRAME_TYPE: u8 = 0x04;

/// A message type which contains the voltage of every cell in mV, in cell order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CellVoltagesMessage(Vec<i16>);

impl CellVoltagesMessage {
    pub fn decode(payload: &[u8]) -> DecodeResult<Self> {
        if payload.len() % 2 != 0 {
            return Err(DecodeError::PayloadLengthMismatch {
                frame_type: FRAME_TYPE,
                actual: payload.len(),
            });
        }

        let nums = payload
            .chunks_exact(2)
            .map(|bytes| i16::from_be_bytes([bytes[0], bytes[1]]))
            .collect();
        Ok(Self(nums))
    }

    pub fn cell_voltage_mv(&self) -> &[i16] {
        &self.0
    }

    pub fn into_cell_voltage_mv(self) -> Vec<i16> {
        self.0
    }
}

#[test]
fn test_decode() {
    let payload = hex::decode("0064fff6012c").unwrap();
    let message = CellVoltagesMessage::decode(&payload).unwrap();
    assert_eq!(message.cell_voltage_mv(), &[100, -10, 300]);
}

#[test]
fn test_decode_empty() {
    let message = CellVoltagesMessage::decode(&[]).unwrap();
    assert!(message.cell_voltage_mv().is_empty());
}

#[test]
fn test_decode_odd_length() {
    let payload = hex::decode("0064fff601").unwrap();
    assert_eq!(
        CellVoltagesMessage::decode(&payload),
        Err(DecodeError::PayloadLengthMismatch {
            frame_type: FRAME_TYPE,
            actual: 5
        })
    );
}
