//! End-to-end decoding of notification streams.

use bmsread::{checksum, BatteryState, BmsSession, DecodeError, DecoderConfig};

/// Wrap a payload in a frame envelope with a matching length field and checksum.
fn frame(frame_type: u8, payload: &[u8]) -> Vec<u8> {
    let size = (payload.len() as i16).to_be_bytes();
    let check = checksum(size.iter().chain(payload));

    let mut bytes = vec![0x0d, frame_type];
    bytes.extend_from_slice(&size);
    bytes.extend_from_slice(payload);
    bytes.extend_from_slice(&check.to_be_bytes());
    bytes.push(0x77);
    bytes
}

fn pack_summary_payload(voltage: u16, current: i16, residual: u16, nominal: u16) -> Vec<u8> {
    let mut payload = Vec::new();
    payload.extend_from_slice(&voltage.to_be_bytes());
    payload.extend_from_slice(&current.to_be_bytes());
    payload.extend_from_slice(&residual.to_be_bytes());
    payload.extend_from_slice(&nominal.to_be_bytes());
    payload
}

fn feed_all(session: &mut BmsSession, chunks: &[&[u8]]) -> Vec<Result<bool, DecodeError>> {
    chunks
        .iter()
        .map(|chunk| session.feed(chunk).map(|changed| changed.is_some()))
        .collect()
}

#[test]
fn test_pack_summary_through_session() {
    let bytes = frame(3, &pack_summary_payload(3700, -150, 5000, 6000));
    let mut session = BmsSession::new(DecoderConfig::default().with_verify_envelope(true));

    let state = session.feed(&bytes).unwrap().unwrap();
    assert_eq!(state.pack_voltage_cv, Some(3700));
    assert_eq!(state.pack_current_ca, Some(-150));
    assert_eq!(state.residual_capacity_cah, Some(5000));
    assert_eq!(state.nominal_capacity_cah, Some(6000));
    assert!(state.cell_voltage_mv.is_empty());
}

#[test]
fn test_split_frames_match_whole_frames() {
    let bytes = frame(4, &hex::decode("0cf20cf80cfe0ce4").unwrap());

    let mut whole = BmsSession::default();
    whole.feed(&bytes).unwrap();

    for chunk_len in 1..bytes.len() {
        let chunks: Vec<&[u8]> = bytes.chunks(chunk_len).collect();
        let mut session = BmsSession::default();
        let results = feed_all(&mut session, &chunks);

        let (last, rest) = results.split_last().unwrap();
        assert_eq!(last, &Ok(true));
        assert!(rest.iter().all(|r| r == &Ok(false)));
        assert_eq!(session.state(), whole.state());
    }
    assert_eq!(whole.state().cell_voltage_mv, vec![3314, 3320, 3326, 3300]);
}

#[test]
fn test_start_marker_resets_mid_frame() {
    let mut session = BmsSession::default();
    let second = frame(4, &hex::decode("0064fff6012c").unwrap());

    let first: &[u8] = &[0x0d, 0x03, 0x00, 0x08, 0x0e, 0xaa];

    let results = feed_all(&mut session, &[first, second.as_slice()]);
    assert_eq!(results, vec![Ok(false), Ok(true)]);
    assert_eq!(session.state().cell_voltage_mv, vec![100, -10, 300]);
    assert_eq!(session.state().pack_voltage_cv, None);
}

#[test]
fn test_fields_are_sticky() {
    let mut session = BmsSession::default();
    session
        .feed(&frame(3, &pack_summary_payload(2650, 320, 10000, 20000)))
        .unwrap();
    session.feed(&frame(4, &[0x0c, 0xe4])).unwrap();
    session.feed(&frame(9, &[0x01, 0x02])).unwrap();

    assert_eq!(
        session.state(),
        &BatteryState {
            cell_voltage_mv: vec![3300],
            pack_voltage_cv: Some(2650),
            pack_current_ca: Some(320),
            residual_capacity_cah: Some(10000),
            nominal_capacity_cah: Some(20000),
        }
    );
}

#[test]
fn test_unknown_frame_type_is_ignored() {
    let mut session = BmsSession::default();
    assert_eq!(session.feed(&frame(9, &[0x01, 0x02, 0x03])), Ok(None));
    assert_eq!(session.state(), &BatteryState::default());
}

#[test]
fn test_malformed_frames_are_dropped() {
    let mut session = BmsSession::default();
    session.feed(&frame(4, &[0x0c, 0xe4])).unwrap();

    assert_eq!(
        session.feed(&[0x0d, 0x04, 0x77]),
        Err(DecodeError::TruncatedFrame {
            expected: 7,
            actual: 3
        })
    );
    assert_eq!(
        session.feed(&frame(4, &[0x0c, 0xe4, 0x0c])),
        Err(DecodeError::PayloadLengthMismatch {
            frame_type: 4,
            actual: 3
        })
    );
    assert_eq!(session.state().cell_voltage_mv, vec![3300]);

    assert!(session.feed(&frame(4, &[])).unwrap().is_some());
    assert!(session.state().cell_voltage_mv.is_empty());
}

#[test]
fn test_oversized_frame_is_discarded() {
    let mut session = BmsSession::new(DecoderConfig::default().with_max_frame_len(16));
    assert_eq!(session.feed(&[0x0d, 0x03, 0x00, 0x20]), Ok(None));
    assert_eq!(
        session.feed(&[0u8; 16]),
        Err(DecodeError::FrameTooLarge {
            max: 16,
            actual: 20
        })
    );

    let state = session
        .feed(&frame(3, &pack_summary_payload(2650, 0, 1, 2)))
        .unwrap()
        .unwrap();
    assert_eq!(state.pack_voltage_cv, Some(2650));
}

#[test]
fn test_oversized_frame_tail_does_not_update_state() {
    let mut session = BmsSession::new(DecoderConfig::default().with_max_frame_len(16));
    session
        .feed(&frame(3, &pack_summary_payload(2650, -40, 900, 1000)))
        .unwrap();
    let before = session.state().clone();

    let mut head = vec![0x0d, 0x03, 0x00, 0x0c];
    head.extend_from_slice(&[0u8; 13]);
    assert_eq!(
        session.feed(&head),
        Err(DecodeError::FrameTooLarge {
            max: 16,
            actual: 17
        })
    );

    // The tail is itself shaped like a complete pack summary frame.
    let tail = hex::decode("0c0300082710271027102710ffff77").unwrap();
    assert_eq!(session.feed(&tail), Ok(None));
    assert_eq!(session.state(), &before);

    let state = session
        .feed(&frame(3, &pack_summary_payload(2700, 0, 950, 1000)))
        .unwrap()
        .unwrap();
    assert_eq!(state.pack_voltage_cv, Some(2700));
}
