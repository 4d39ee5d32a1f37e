use std::time::Duration;

/// Largest frame the assembler will buffer by default.
///
/// Replies from the BMS are well under 100 bytes; anything near this size means
/// the start or end marker was lost.
pub const DEFAULT_MAX_FRAME_LEN: usize = 1024;

/// Settings for the frame assembler and decoder.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DecoderConfig {
    /// Upper bound for the assembly buffer. Exceeding it discards the buffer.
    pub max_frame_len: usize,
    /// Check start/end markers, length field and checksum before decoding.
    ///
    /// Off by default: some devices send envelopes that do not pass these checks
    /// but carry valid payloads.
    pub verify_envelope: bool,
}

impl Default for DecoderConfig {
    fn default() -> Self {
        Self {
            max_frame_len: DEFAULT_MAX_FRAME_LEN,
            verify_envelope: false,
        }
    }
}

impl DecoderConfig {
    pub fn with_max_frame_len(mut self, max_frame_len: usize) -> Self {
        self.max_frame_len = max_frame_len;
        self
    }

    pub fn with_verify_envelope(mut self, verify_envelope: bool) -> Self {
        self.verify_envelope = verify_envelope;
        self
    }
}

/// Settings for [`BatteryClient`](crate::BatteryClient).
#[derive(Debug, Clone)]
pub struct ClientConfig {
    /// Advertised name to connect to. `None` takes the first device offering the BMS service.
    pub device_name: Option<String>,
    /// How long to scan before giving up.
    pub scan_timeout: Duration,
    /// Delay between two poll commands.
    pub poll_interval: Duration,
    /// Also poll for cell voltages, not only the pack summary.
    pub request_cell_voltages: bool,
    /// Extra connection attempts before `run` fails.
    pub connect_retries: u32,
    pub decoder: DecoderConfig,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            device_name: None,
            scan_timeout: Duration::from_secs(30),
            poll_interval: Duration::from_millis(200),
            request_cell_voltages: true,
            connect_retries: 2,
            decoder: DecoderConfig::default(),
        }
    }
}

impl ClientConfig {
    pub fn with_device_name(mut self, name: impl Into<String>) -> Self {
        self.device_name = Some(name.into());
        self
    }

    pub fn with_poll_interval(mut self, poll_interval: Duration) -> Self {
        self.poll_interval = poll_interval;
        self
    }

    pub fn with_cell_voltages(mut self, request_cell_voltages: bool) -> Self {
        self.request_cell_voltages = request_cell_voltages;
        self
    }

    pub fn with_decoder(mut self, decoder: DecoderConfig) -> Self {
        self.decoder = decoder;
        self
    }
}

#[test]
fn test_decoder_config_builder() {
    let config = DecoderConfig::default()
        .with_max_frame_len(64)
        .with_verify_envelope(true);
    assert_eq!(config.max_frame_len, 64);
    assert!(config.verify_envelope);
    assert!(!DecoderConfig::default().verify_envelope);
}
