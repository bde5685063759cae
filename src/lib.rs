//! Rust library for controlling Pioneer VSX A/V receivers over IP
//!
//! This library speaks the receiver's ASCII line protocol over a persistent
//! TCP connection. Tested against the VSX-2021 generation. It supports:
//!
//! - Power, volume, and mute control for up to four zones
//! - Input selection with runtime-learned input names
//! - Listening-mode selection and playing-mode reports
//! - Raw network remote-control key passthrough
//! - Typed, per-zone status events via subscriptions
//!
//! # Quick Start
//!
//! ```no_run
//! use pioneer_vsx::{codes, VsxClient, VsxEvent, Zone};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let client = VsxClient::connect("192.168.1.123", 23).await?;
//!     let mut events = client.subscribe();
//!
//!     // Drive the receiver
//!     client.power(true, Zone::Main)?;
//!     client.volume(-40.5)?;
//!     client.change_input(codes::HDMI_2)?;
//!
//!     // Watch state reports come back
//!     while let Ok(event) = events.recv().await {
//!         match event {
//!             VsxEvent::Volume { db, zone } => println!("{} volume: {} dB", zone, db),
//!             VsxEvent::Input { id, name, zone } => {
//!                 println!("{} input: {} ({})", zone, id, name.as_deref().unwrap_or("?"))
//!             }
//!             VsxEvent::End => break,
//!             _ => {}
//!         }
//!     }
//!     Ok(())
//! }
//! ```
//!
//! # Connection lifecycle
//!
//! After the TCP connect succeeds the client writes a wake byte, waits
//! briefly, then issues a staggered burst of status queries; the
//! [`VsxEvent::Connect`] event marks the burst being issued. A lost
//! connection (peer close or transport error) is terminal: the client
//! reports [`VsxEvent::End`] or [`VsxEvent::Error`] and never reconnects on
//! its own. Construct a new client to retry; retry policy belongs to the
//! caller.
//!
//! # Architecture
//!
//! - **Client**: the command surface; encodes intents into protocol strings
//! - **Connection**: socket ownership, the wake sequence, and the schedule
//!   queue for staggered writes
//! - **Protocol**: pure command encoding and inbound line classification
//! - **Inputs/Modes**: the input-name table and the listening-mode
//!   vocabularies
//! - **Subscription**: the typed event stream

mod client;
mod connection;
mod error;
mod inputs;
mod modes;
mod protocol;
mod subscription;
mod types;

// Public exports
pub use client::{VsxClient, VsxOptions};
pub use error::{Result, VsxError};
pub use inputs::{codes, DEFAULT_INPUT_NAMES};
pub use modes::{display_mode_name, set_mode_name, DISPLAY_MODE_NAMES, SET_MODE_NAMES};
pub use protocol::InputId;
pub use subscription::{EventReceiver, VsxEvent};
pub use types::{ConnectionStatus, Zone};
