use crate::battery_state::BatteryState;
use crate::config::DecoderConfig;
use crate::error::DecodeResult;
use crate::frame_assembler::FrameAssembler;
use crate::frame_decoder::FrameDecoder;

/// Decoding state for one connection to one BMS.
///
/// Chunks must be fed in arrival order. Use one session per peripheral.
#[derive(Debug)]
pub struct BmsSession {
    assembler: FrameAssembler,
    decoder: FrameDecoder,
    state: BatteryState,
}

impl BmsSession {
    pub fn new(config: DecoderConfig) -> Self {
        Self {
            assembler: FrameAssembler::new(config.max_frame_len),
            decoder: FrameDecoder::new(&config),
            state: BatteryState::default(),
        }
    }

    /// Feed one notification chunk.
    ///
    /// Returns the updated state if this chunk completed a frame which changed it.
    /// An error only concerns the frame it was raised for; the session keeps working.
    pub fn feed(&mut self, chunk: &[u8]) -> DecodeResult<Option<&BatteryState>> {
        let Some(frame) = self.assembler.feed(chunk)? else {
            return Ok(None);
        };

        if self.decoder.decode(&frame, &mut self.state)? {
            Ok(Some(&self.state))
        } else {
            Ok(None)
        }
    }

    pub fn state(&self) -> &BatteryState {
        &self.state
    }

    /// Forget the partial frame and all known values.
    pub fn reset(&mut self) {
        self.assembler.clear();
        self.state = BatteryState::default();
    }
}

impl Default for BmsSession {
    fn default() -> Self {
        Self::new(DecoderConfig::default())
    }
}

#[test]
fn test_feed_fragments() {
    let mut session = BmsSession::default();
    assert_eq!(session.feed(&hex::decode("0d0300080e74").unwrap()), Ok(None));
    assert_eq!(session.feed(&hex::decode("ff6a1388").unwrap()), Ok(None));
    let state = session
        .feed(&hex::decode("1770fceb77").unwrap())
        .unwrap()
        .unwrap();
    assert_eq!(state.pack_voltage_cv, Some(3700));
}

#[test]
fn test_error_does_not_stall_session() {
    let mut session = BmsSession::default();
    assert!(session.feed(&hex::decode("0d0300020e74ff8b77").unwrap()).is_err());
    assert!(session.feed(&[]).is_err());
    let state = session
        .feed(&hex::decode("0d0400060064fff6012cfd7477").unwrap())
        .unwrap()
        .unwrap();
    assert_eq!(state.cell_voltage_mv, vec![100, -10, 300]);
}

#[test]
fn test_reset() {
    let mut session = BmsSession::default();
    session
        .feed(&hex::decode("0d0400060064fff6012cfd7477").unwrap())
        .unwrap();
    session.feed(&[0x0d, 0x03]).unwrap();
    session.reset();
    assert_eq!(session.state(), &BatteryState::default());
    assert_eq!(
        session.feed(&hex::decode("1770fceb77").unwrap()),
        Err(crate::DecodeError::TruncatedFrame {
            expected: 7,
            actual: 5
        })
    );
}
