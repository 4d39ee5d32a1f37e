use log::debug;

use crate::battery_state::BatteryState;
use crate::config::DecoderConfig;
use crate::error::DecodeResult;
use crate::frame::Frame;
use crate::message::Message;

/// Decodes complete frames into [`BatteryState`] updates.
#[derive(Debug, Clone, Default)]
pub struct FrameDecoder {
    verify_envelope: bool,
}

impl FrameDecoder {
    pub fn new(config: &DecoderConfig) -> Self {
        Self {
            verify_envelope: config.verify_envelope,
        }
    }

    /// Decode `bytes` and apply the result to `state`.
    ///
    /// Returns whether `state` changed. On error `state` is left untouched.
    pub fn decode(&self, bytes: &[u8], state: &mut BatteryState) -> DecodeResult<bool> {
        let frame = Frame::parse(bytes)?;
        if self.verify_envelope {
            frame.verify()?;
        }

        match Message::decode(&frame)? {
            Some(message) => {
                message.apply(state);
                Ok(true)
            }
            None => {
                debug!("BATTERY: ignoring frame type 0x{:02x}", frame.frame_type);
                Ok(false)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::DecodeError;

    fn decode(hex_frame: &str, state: &mut BatteryState) -> DecodeResult<bool> {
        FrameDecoder::default().decode(&hex::decode(hex_frame).unwrap(), state)
    }

    #[test]
    fn test_pack_summary() {
        let mut state = BatteryState::default();
        assert_eq!(decode("0d0300080e74ff6a13881770fceb77", &mut state), Ok(true));
        assert_eq!(state.pack_voltage_cv, Some(3700));
        assert_eq!(state.pack_current_ca, Some(-150));
        assert_eq!(state.residual_capacity_cah, Some(5000));
        assert_eq!(state.nominal_capacity_cah, Some(6000));
        assert!(state.cell_voltage_mv.is_empty());

        let before = state.clone();
        assert_eq!(decode("0d0300080e74ff6a13881770fceb77", &mut state), Ok(true));
        assert_eq!(state, before);
    }

    #[test]
    fn test_cell_voltages_replace() {
        let mut state = BatteryState::default();
        assert_eq!(decode("0d0400060064fff6012cfd7477", &mut state), Ok(true));
        assert_eq!(state.cell_voltage_mv, vec![100, -10, 300]);
        assert_eq!(state.pack_voltage_cv, None);

        assert_eq!(decode("0d040000000077", &mut state), Ok(true));
        assert!(state.cell_voltage_mv.is_empty());
    }

    #[test]
    fn test_unknown_type() {
        let mut state = BatteryState {
            cell_voltage_mv: vec![3300],
            ..Default::default()
        };
        assert_eq!(decode("0d0900020102fffb77", &mut state), Ok(false));
        assert_eq!(state.cell_voltage_mv, vec![3300]);
    }

    #[test]
    fn test_errors_leave_state_untouched() {
        let mut state = BatteryState {
            pack_voltage_cv: Some(2650),
            ..Default::default()
        };
        let before = state.clone();

        assert_eq!(
            decode("0d03ff77", &mut state),
            Err(DecodeError::TruncatedFrame {
                expected: 7,
                actual: 4
            })
        );
        assert_eq!(
            decode("0d0300060e74ff6a1388fd7477", &mut state),
            Err(DecodeError::PayloadLengthMismatch {
                frame_type: 3,
                actual: 6
            })
        );
        assert_eq!(state, before);
    }

    #[test]
    fn test_permissive_envelope() {
        let mut state = BatteryState::default();
        // Wrong start marker and checksum.
        assert_eq!(decode("dd0300080e74ff6a13880000000077", &mut state), Ok(true));
        assert_eq!(state.nominal_capacity_cah, Some(0));
    }

    #[test]
    fn test_strict_envelope() {
        let decoder = FrameDecoder::new(&DecoderConfig::default().with_verify_envelope(true));
        let mut state = BatteryState::default();

        let bad = hex::decode("0d0300080e74ff6a13881770fcec77").unwrap();
        assert_eq!(
            decoder.decode(&bad, &mut state),
            Err(DecodeError::ChecksumMismatch {
                expected: 0xfceb,
                actual: 0xfcec
            })
        );
        assert_eq!(state, BatteryState::default());

        let good = hex::decode("0d0300080e74ff6a13881770fceb77").unwrap();
        assert_eq!(decoder.decode(&good, &mut state), Ok(true));
        assert_eq!(state.pack_voltage_cv, Some(3700));
    }

    #[test]
    fn test_strict_envelope_bad_terminator() {
        let decoder = FrameDecoder::new(&DecoderConfig::default().with_verify_envelope(true));
        let mut state = BatteryState::default();

        let bytes = hex::decode("0d040000000078").unwrap();
        assert_eq!(
            decoder.decode(&bytes, &mut state),
            Err(DecodeError::BadTerminator(0x78))
        );
        assert_eq!(state, BatteryState::default());
        assert_eq!(FrameDecoder::default().decode(&bytes, &mut state), Ok(true));
    }
}
