use crate::error::{Result, VsxError};
use crate::types::Zone;
use serde::Serialize;
use tokio::sync::broadcast;

/// Event emitted by a [`VsxClient`](crate::VsxClient).
///
/// Serializes to a tagged JSON object (`{"event": "volume", "db": 0.0,
/// "zone": "main"}`) so a message-bus bridge can republish last-known
/// values without hand-rolling encoders.
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum VsxEvent {
    /// The wake sequence completed and the initial status-query burst has
    /// been issued; the client is ready to receive commands
    Connect,
    /// Power status for a zone
    Power {
        /// Whether the zone is powered on
        on: bool,
        /// Reporting zone
        zone: Zone,
    },
    /// Volume status for a zone, in decibels
    Volume {
        /// Volume in dB (main zone -80.0..=+12.0, secondary zones
        /// -80.0..=0.0; raw 0 reports as the scale floor)
        db: f64,
        /// Reporting zone
        zone: Zone,
    },
    /// Mute status for a zone
    Mute {
        /// Whether the zone is muted
        on: bool,
        /// Reporting zone
        zone: Zone,
    },
    /// Selected input for a zone
    Input {
        /// Two-digit input id
        id: String,
        /// Resolved input name, if the name table knows the id
        name: Option<String>,
        /// Reporting zone
        zone: Zone,
    },
    /// The device reported its name for an input id
    InputName {
        /// Two-digit input id
        id: String,
        /// Reported name
        name: String,
    },
    /// A listening mode was selected (remote-control cyclic-shift report).
    /// Not authoritative current state; wait for
    /// [`ListeningModeDisplay`](VsxEvent::ListeningModeDisplay)
    ListeningModeSet {
        /// `SR` mode key
        mode: String,
    },
    /// The authoritative playing listening mode, for display
    ListeningModeDisplay {
        /// `LM` mode key
        mode: String,
    },
    /// The device closed the connection; the session is terminal
    End,
    /// A transport error ended the session
    Error {
        /// Description of the underlying failure
        message: String,
    },
}

/// Receiver for client events
pub struct EventReceiver {
    rx: broadcast::Receiver<VsxEvent>,
}

impl EventReceiver {
    /// Create a new event receiver
    pub(crate) fn new(rx: broadcast::Receiver<VsxEvent>) -> Self {
        Self { rx }
    }

    /// Receive the next event
    ///
    /// Fails with [`VsxError::ConnectionClosed`] once the client has been
    /// dropped and all buffered events were consumed.
    pub async fn recv(&mut self) -> Result<VsxEvent> {
        self.rx.recv().await.map_err(|e| match e {
            broadcast::error::RecvError::Closed => VsxError::ConnectionClosed,
            broadcast::error::RecvError::Lagged(n) => {
                VsxError::ChannelError(format!("Lagged by {} events", n))
            }
        })
    }

    /// Try to receive an event without blocking
    ///
    /// Returns `None` if no event is available.
    pub fn try_recv(&mut self) -> Result<Option<VsxEvent>> {
        match self.rx.try_recv() {
            Ok(event) => Ok(Some(event)),
            Err(broadcast::error::TryRecvError::Empty) => Ok(None),
            Err(broadcast::error::TryRecvError::Closed) => Err(VsxError::ConnectionClosed),
            Err(broadcast::error::TryRecvError::Lagged(n)) => {
                Err(VsxError::ChannelError(format!("Lagged by {} events", n)))
            }
        }
    }
}
