use log::debug;

use crate::error::{DecodeError, DecodeResult};
use crate::frame::{FRAME_END, FRAME_START};

/// Reassembles frames from notification chunks.
///
/// The BMS splits each reply over several BLE notifications whose boundaries have
/// nothing to do with the frame layout. A chunk starting with the start marker always
/// begins a new frame, even if the previous one never completed. Any other chunk is
/// appended. The frame is complete once the buffer ends with the end marker.
///
/// After a frame overflows the size limit, every chunk up to the next start marker
/// belongs to that frame and is dropped.
#[derive(Debug)]
pub struct FrameAssembler {
    buffer: Vec<u8>,
    max_frame_len: usize,
    discarding: bool,
}

impl FrameAssembler {
    pub fn new(max_frame_len: usize) -> Self {
        Self {
            buffer: Vec::new(),
            max_frame_len,
            discarding: false,
        }
    }

    /// Add a chunk, returning the complete frame bytes if this chunk finished one.
    pub fn feed(&mut self, chunk: &[u8]) -> DecodeResult<Option<Vec<u8>>> {
        let first = *chunk.first().ok_or(DecodeError::EmptyChunk)?;

        if first == FRAME_START {
            if !self.buffer.is_empty() {
                debug!(
                    "BATTERY: discarding incomplete frame: 0x{}",
                    hex::encode(&self.buffer)
                );
            }
            self.buffer.clear();
            self.discarding = false;
        } else if self.discarding {
            debug!("BATTERY: dropping tail of oversized frame: 0x{}", hex::encode(chunk));
            return Ok(None);
        }
        self.buffer.extend_from_slice(chunk);

        if self.buffer.len() > self.max_frame_len {
            let actual = self.buffer.len();
            self.buffer.clear();
            self.discarding = true;
            return Err(DecodeError::FrameTooLarge {
                max: self.max_frame_len,
                actual,
            });
        }

        if self.buffer.last() == Some(&FRAME_END) {
            return Ok(Some(std::mem::take(&mut self.buffer)));
        }

        Ok(None)
    }

    /// Number of bytes waiting for the rest of their frame.
    pub fn len(&self) -> usize {
        self.buffer.len()
    }

    pub fn is_empty(&self) -> bool {
        self.buffer.is_empty()
    }

    pub fn clear(&mut self) {
        self.buffer.clear();
        self.discarding = false;
    }
}

impl Default for FrameAssembler {
    fn default() -> Self {
        Self::new(crate::config::DEFAULT_MAX_FRAME_LEN)
    }
}

#[test]
fn test_feed_whole_frame() {
    let frame = hex::decode("0d0400060064fff6012cfd7477").unwrap();
    let mut assembler = FrameAssembler::default();
    assert_eq!(assembler.feed(&frame), Ok(Some(frame.clone())));
    assert!(assembler.is_empty());
}

#[test]
fn test_feed_split_frame() {
    let frame = hex::decode("0d0400060064fff6012cfd7477").unwrap();
    for split in 1..frame.len() {
        let mut assembler = FrameAssembler::default();
        assert_eq!(assembler.feed(&frame[..split]), Ok(None));
        assert_eq!(assembler.len(), split);
        assert_eq!(assembler.feed(&frame[split..]), Ok(Some(frame.clone())));
        assert!(assembler.is_empty());
    }
}

#[test]
fn test_start_marker_discards_partial_frame() {
    let mut assembler = FrameAssembler::default();
    assert_eq!(assembler.feed(&[0x0d, 0x03, 0x00, 0xaa]), Ok(None));

    let frame = hex::decode("0d0900000000ff77").unwrap();
    assert_eq!(assembler.feed(&frame), Ok(Some(frame.clone())));
}

#[test]
fn test_empty_chunk() {
    let mut assembler = FrameAssembler::default();
    assembler.feed(&[0x0d, 0x03]).unwrap();
    assert_eq!(assembler.feed(&[]), Err(DecodeError::EmptyChunk));
    assert_eq!(assembler.len(), 2);
}

#[test]
fn test_frame_too_large() {
    let mut assembler = FrameAssembler::new(8);
    assert_eq!(assembler.feed(&[0x0d, 0x03, 0x00, 0x00]), Ok(None));
    assert_eq!(
        assembler.feed(&[0x01, 0x02, 0x03, 0x04, 0x05]),
        Err(DecodeError::FrameTooLarge { max: 8, actual: 9 })
    );
    assert!(assembler.is_empty());

    let frame = hex::decode("0d0900000000ff77").unwrap();
    assert_eq!(assembler.feed(&frame), Ok(Some(frame.clone())));
}

#[test]
fn test_oversized_frame_tail_is_dropped() {
    let mut assembler = FrameAssembler::new(16);
    let mut head = vec![0x0d, 0x03, 0x00, 0x0c];
    head.extend_from_slice(&[0x27; 13]);
    assert_eq!(
        assembler.feed(&head),
        Err(DecodeError::FrameTooLarge { max: 16, actual: 17 })
    );

    let tail = hex::decode("0c03000827102710271027100000ffff77").unwrap();
    assert_eq!(assembler.feed(&tail), Ok(None));
    assert!(assembler.is_empty());

    let frame = hex::decode("0d0900000000ff77").unwrap();
    assert_eq!(assembler.feed(&frame), Ok(Some(frame.clone())));
}
