//! BLE transport for the BMS.
//!
//! The BMS exposes a GATT service with one characteristic to write poll commands to
//! and one which notifies the replies. Replies arrive split over several notifications
//! and are reassembled by a [`BmsSession`].

use anyhow::anyhow;
use bluest::Adapter;
use bluest::AdvertisingDevice;
use bluest::Characteristic;
use bluest::Device;
use bluest::Uuid;
use futures_util::Stream;
use futures_util::StreamExt;
use log::{debug, info, warn};
use tokio::sync::watch;
use tokio::time::{sleep, timeout};

use crate::battery_state::BatteryState;
use crate::config::ClientConfig;
use crate::message::{cell_voltages, pack_summary};
use crate::session::BmsSession;

const BMS_SERVICE_ID: Uuid = Uuid::from_u128(0x0000ff00_0000_1000_8000_00805f9b34fb);
const BMS_NOTIFY_CHARACTERISTIC_ID: Uuid = Uuid::from_u128(0x0000ff01_0000_1000_8000_00805f9b34fb);
const BMS_WRITE_CHARACTERISTIC_ID: Uuid = Uuid::from_u128(0x0000ff02_0000_1000_8000_00805f9b34fb);

pub struct BatteryClient {
    adapter: Adapter,
    device: Device,
    write: Characteristic,
    notify: Characteristic,
    config: ClientConfig,
    state_tx: watch::Sender<BatteryState>,
}

impl BatteryClient {
    /// Disconnect from the battery
    pub async fn stop(self) -> anyhow::Result<()> {
        self.adapter.disconnect_device(&self.device).await?;
        Ok(())
    }

    /// Create a new `BatteryClient`, which includes attempting to discover the device.
    pub async fn new(config: ClientConfig) -> anyhow::Result<Self> {
        let adapter = Adapter::default()
            .await
            .ok_or(anyhow!("Default adapter not found"))?;
        adapter.wait_available().await?;

        let device = timeout(
            config.scan_timeout,
            Self::discover_device(config.device_name.as_deref(), &adapter),
        )
        .await
        .map_err(|_| anyhow!("Device not found"))??;

        adapter.connect_device(&device.device).await?;

        let service = device
            .device
            .discover_services_with_uuid(BMS_SERVICE_ID)
            .await?
            .first()
            .ok_or(anyhow!("The specified device does not support the BMS service."))?
            .clone();
        let write = service
            .discover_characteristics_with_uuid(BMS_WRITE_CHARACTERISTIC_ID)
            .await?
            .first()
            .ok_or(anyhow!("The specified device does not support the BMS write characteristic."))?
            .clone();
        let notify = service
            .discover_characteristics_with_uuid(BMS_NOTIFY_CHARACTERISTIC_ID)
            .await?
            .first()
            .ok_or(anyhow!("The specified device does not support the BMS notify characteristic."))?
            .clone();

        let (state_tx, _) = watch::channel(BatteryState::default());

        Ok(Self {
            adapter,
            device: device.device,
            write,
            notify,
            config,
            state_tx,
        })
    }

    /// Receive every state change published by [`BatteryClient::run`].
    pub fn subscribe(&self) -> watch::Receiver<BatteryState> {
        self.state_tx.subscribe()
    }

    /// The most recently published state.
    pub fn state(&self) -> BatteryState {
        self.state_tx.borrow().clone()
    }

    /// Poll the battery and decode its replies until the connection fails.
    ///
    /// Each call starts a fresh session. Call again to reconnect.
    pub async fn run(&self) -> anyhow::Result<()> {
        self.try_connect().await?;

        let reader = self.notify.notify().await?;
        let mut session = BmsSession::new(self.config.decoder.clone());

        futures_util::future::try_join(
            pump_notifications(reader, &mut session, &self.state_tx),
            self.poll(),
        )
        .await?;

        Ok(())
    }

    async fn poll(&self) -> anyhow::Result<()> {
        let commands = poll_commands(&self.config);
        loop {
            for rq in &commands {
                debug!("BATTERY: TX: {}", hex::encode(rq));
                self.write.write(rq).await?;
                sleep(self.config.poll_interval).await;
            }
        }
    }

    async fn discover_device(name: Option<&str>, adapter: &Adapter) -> anyhow::Result<AdvertisingDevice> {
        let required_services = [BMS_SERVICE_ID];
        let mut adapter_events = adapter.scan(&required_services).await?;
        while let Some(device) = adapter_events.next().await {
            let device_name = device.device.name_async().await.unwrap_or_default();
            match name {
                Some(name) if device_name != name => {
                    debug!("BATTERY: skipping {device_name:?}");
                }
                _ => {
                    info!("BATTERY: found {device_name:?}");
                    return Ok(device);
                }
            }
        }

        Err(anyhow!("Device not found"))
    }

    async fn try_connect(&self) -> anyhow::Result<()> {
        if !self.device.is_connected().await {
            let mut retries = self.config.connect_retries;
            loop {
                match self.adapter.connect_device(&self.device).await {
                    Ok(()) => return Ok(()),
                    Err(err) if retries > 0 => {
                        warn!("BATTERY: Failed to connect: {err}");
                        retries -= 1;
                    }
                    Err(err) => return Err(err.into()),
                }
            }
        }

        Ok(())
    }
}

/// The commands to write during one poll cycle, in order.
pub fn poll_commands(config: &ClientConfig) -> Vec<&'static [u8]> {
    let mut commands: Vec<&'static [u8]> = Vec::with_capacity(2);
    if config.request_cell_voltages {
        commands.push(&cell_voltages::REQUEST);
    }
    commands.push(&pack_summary::REQUEST);
    commands
}

/// Feed every notification into `session`, publishing the state each time it changes.
///
/// Malformed frames are logged and skipped. Returns when the stream fails or ends.
pub async fn pump_notifications<T, E>(
    mut reader: T,
    session: &mut BmsSession,
    state_tx: &watch::Sender<BatteryState>,
) -> anyhow::Result<()>
where
    T: Stream<Item = Result<Vec<u8>, E>> + Unpin,
    E: Into<anyhow::Error>,
{
    while let Some(notification) = reader.next().await {
        let data = match notification {
            Ok(data) => data,
            Err(err) => {
                let err: anyhow::Error = err.into();
                warn!("BATTERY: Notification error: {err}");
                return Err(err);
            }
        };
        debug!("BATTERY: RX notification: 0x{}", hex::encode(&data));

        match session.feed(&data) {
            Ok(Some(state)) => {
                state_tx.send_replace(state.clone());
            }
            Ok(None) => {}
            Err(err) => warn!("BATTERY: Dropping frame: {err}"),
        }
    }

    debug!("BATTERY: End of notification stream");
    Err(anyhow!("end of notification stream"))
}

#[test]
fn test_poll_commands() {
    let config = ClientConfig::default();
    assert_eq!(
        poll_commands(&config),
        vec![&cell_voltages::REQUEST[..], &pack_summary::REQUEST[..]]
    );

    let config = config.with_cell_voltages(false);
    assert_eq!(poll_commands(&config), vec![&pack_summary::REQUEST[..]]);
    assert_eq!(hex::encode(pack_summary::REQUEST), "dda50300fffd77");
    assert_eq!(hex::encode(cell_voltages::REQUEST), "dda50400fffc77");
}
