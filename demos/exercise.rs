//! Scripted exercise against a live receiver.
//!
//! Usage: `cargo run --example exercise -- <host> [port]`
//!
//! Connects, waits for the initial status burst, then runs a short command
//! sequence while printing every event as a JSON line (the same payload
//! shape a message-bus bridge would republish).

use pioneer_vsx::{codes, VsxClient, VsxEvent, VsxOptions};
use std::time::Duration;
use tokio::time::sleep;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt::init();

    let mut args = std::env::args().skip(1);
    let host = args.next().unwrap_or_else(|| "192.168.1.123".to_string());
    let port: u16 = args.next().and_then(|p| p.parse().ok()).unwrap_or(23);

    let client = VsxClient::connect_with(VsxOptions::new(host, port).log_level(2)).await?;

    let mut ready = client.subscribe();
    let mut events = client.subscribe();
    let printer = tokio::spawn(async move {
        while let Ok(event) = events.recv().await {
            println!("{}", serde_json::to_string(&event).unwrap());
            if matches!(event, VsxEvent::End | VsxEvent::Error { .. }) {
                break;
            }
        }
    });

    // Wait for the wake sequence to finish before driving the device
    loop {
        match ready.recv().await? {
            VsxEvent::Connect => break,
            VsxEvent::End | VsxEvent::Error { .. } => return Ok(()),
            _ => {}
        }
    }
    println!("receiver connected");

    client.power(true, pioneer_vsx::Zone::Main)?;
    sleep(Duration::from_secs(5)).await;

    let burst = client.query();
    sleep(burst + Duration::from_secs(1)).await;

    client.change_input(codes::HDMI_2)?;
    client.volume(-45.0)?;
    sleep(Duration::from_secs(2)).await;

    drop(client);
    let _ = printer.await;
    Ok(())
}
