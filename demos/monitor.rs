use std::time::Duration;

use bmsread::{BatteryClient, ClientConfig};

#[tokio::main]
pub async fn main(){
    let mut config = ClientConfig::default();
    if let Some(name) = std::env::args().nth(1) {
        config = config.with_device_name(name);
    }

    let battery_client = BatteryClient::new(config).await.unwrap();
    let mut states = battery_client.subscribe();
    tokio::spawn(async move {
        while states.changed().await.is_ok() {
            let battery_state = states.borrow_and_update().clone();
            println!("{battery_state}");
        }
    });

    loop {
        if let Err(err) = battery_client.run().await {
            println!("Connection lost: {err}");
        }
        tokio::time::sleep(Duration::from_secs(5)).await;
    }
}
