//! Decode the telemetry stream of JBD-style LiFePO4 Battery Management Systems received over Bluetooth Low Energy
//!
//! The BMS answers two poll commands with binary frames. Each frame arrives split over several BLE
//! notifications, and the split points have nothing to do with the frame layout. A [`BmsSession`]
//! reassembles the notifications into frames and decodes them into a [`BatteryState`].
//!
//! Currently the following data can be accessed:
//!
//! - Pack voltage (V)
//! - Pack current (A)
//! - Residual and nominal capacity (Ah)
//! - Cell voltages (V)
//!
//! # Example
//!
//! ```rust
//! let mut session = bmsread::BmsSession::default();
//!
//! // Chunks as delivered by the transport
//! let chunks: [&[u8]; 2] = [
//!     &[0x0d, 0x04, 0x00, 0x06, 0x00, 0x64],
//!     &[0xff, 0xf6, 0x01, 0x2c, 0xfd, 0x74, 0x77],
//! ];
//! for chunk in chunks {
//!     if let Some(state) = session.feed(chunk).unwrap() {
//!         println!("{state}");
//!     }
//! }
//! assert_eq!(session.state().cell_voltage_mv, vec![100, -10, 300]);
//! ```
//!
//! Connecting to a real battery:
//!
//! ```rust,no_run
//! # #[tokio::main]
//! # pub async fn main(){
//!     let battery_client = bmsread::BatteryClient::new(Default::default()).await.unwrap();
//!     let mut states = battery_client.subscribe();
//!     tokio::spawn(async move {
//!         while states.changed().await.is_ok() {
//!             println!("{}", *states.borrow_and_update());
//!         }
//!     });
//!     loop {
//!         if let Err(err) = battery_client.run().await {
//!             eprintln!("{err}");
//!         }
//!     }
//! # }
//! ```

mod battery_client;
mod battery_state;
mod config;
mod error;
mod frame;
mod frame_assembler;
mod frame_decoder;
pub mod message;
mod session;

pub use battery_client::{poll_commands, pump_notifications, BatteryClient};
pub use battery_state::BatteryState;
pub use config::{ClientConfig, DecoderConfig, DEFAULT_MAX_FRAME_LEN};
pub use error::{DecodeError, DecodeResult};
pub use frame::{checksum, Frame, FRAME_END, FRAME_START, MIN_FRAME_LEN};
pub use frame_assembler::FrameAssembler;
pub use frame_decoder::FrameDecoder;
pub use session::BmsSession;
