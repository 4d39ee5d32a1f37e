//! Payloads of the frame types this crate understands, and the poll commands which elicit them.

pub mod cell_voltages;
pub mod pack_summary;

use crate::battery_state::BatteryState;
use crate::error::DecodeResult;
use crate::frame::Frame;

pub use cell_voltages::CellVoltagesMessage;
pub use pack_summary::PackSummaryMessage;

/// A decoded payload of a recognized frame type.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Message {
    PackSummary(PackSummaryMessage),
    CellVoltages(CellVoltagesMessage),
}

impl Message {
    /// Decode the payload of `frame`. Unknown frame types give `Ok(None)`.
    pub fn decode(frame: &Frame) -> DecodeResult<Option<Self>> {
        let message = match frame.frame_type {
            pack_summary::FRAME_TYPE => {
                Message::PackSummary(PackSummaryMessage::decode(&frame.payload)?)
            }
            cell_voltages::FRAME_TYPE => {
                Message::CellVoltages(CellVoltagesMessage::decode(&frame.payload)?)
            }
            _ => return Ok(None),
        };
        Ok(Some(message))
    }

    /// Write the fields carried by this message into `state`, leaving the others alone.
    pub fn apply(self, state: &mut BatteryState) {
        match self {
            Message::PackSummary(m) => {
                state.pack_voltage_cv = Some(m.voltage_cv);
                state.pack_current_ca = Some(m.current_ca);
                state.residual_capacity_cah = Some(m.residual_capacity_cah);
                state.nominal_capacity_cah = Some(m.nominal_capacity_cah);
            }
            Message::CellVoltages(m) => {
                state.cell_voltage_mv = m.into_cell_voltage_mv();
            }
        }
    }
}

#[test]
fn test_poll_commands_carry_valid_checksums() {
    for request in [pack_summary::REQUEST, cell_voltages::REQUEST] {
        let len = request.len();
        let expected = crate::frame::checksum(&request[2..len - 3]);
        assert_eq!(u16::from_be_bytes([request[len - 3], request[len - 2]]), expected);
        assert_eq!(request[len - 1], crate::frame::FRAME_END);
    }
}
