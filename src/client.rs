use crate::connection::Connection;
use crate::error::Result;
use crate::protocol::{self, InputId};
use crate::subscription::EventReceiver;
use crate::types::{ConnectionStatus, Zone};
use std::collections::BTreeMap;
use std::time::Duration;

/// Construction-time configuration for a [`VsxClient`].
#[derive(Debug, Clone)]
pub struct VsxOptions {
    /// Receiver host name or IP address
    pub host: String,
    /// Control port (23 on most models, 8102 on some)
    pub port: u16,
    /// Diagnostic verbosity, 0 (silent) to 3 (verbose). Gates the
    /// protocol-chatter diagnostics emitted through `tracing`; the log sink
    /// is whatever subscriber the application installs.
    pub log_level: u8,
}

impl VsxOptions {
    /// Options for the given endpoint with diagnostics off.
    pub fn new(host: impl Into<String>, port: u16) -> Self {
        Self {
            host: host.into(),
            port,
            log_level: 0,
        }
    }

    /// Set the diagnostic verbosity.
    pub fn log_level(mut self, level: u8) -> Self {
        self.log_level = level;
        self
    }
}

/// Client for controlling a Pioneer VSX receiver over IP.
///
/// The client owns the TCP control session and translates high-level
/// intents into protocol command strings. Commands return as soon as the
/// write is enqueued; device state comes back asynchronously through the
/// event stream from [`subscribe`](VsxClient::subscribe). A lost connection
/// is terminal for the client; construct a new one to retry.
pub struct VsxClient {
    connection: Connection,
    log_level: u8,
}

impl VsxClient {
    /// Connect to a receiver at the given host and port.
    ///
    /// # Example
    ///
    /// ```no_run
    /// use pioneer_vsx::{VsxClient, Zone};
    ///
    /// #[tokio::main]
    /// async fn main() -> Result<(), Box<dyn std::error::Error>> {
    ///     let client = VsxClient::connect("192.168.1.123", 23).await?;
    ///     client.power(true, Zone::Main)?;
    ///     client.volume(-40.5)?;
    ///     Ok(())
    /// }
    /// ```
    pub async fn connect(host: impl Into<String>, port: u16) -> Result<Self> {
        Self::connect_with(VsxOptions::new(host, port)).await
    }

    /// Connect with explicit options.
    pub async fn connect_with(options: VsxOptions) -> Result<Self> {
        let connection = Connection::open(&options.host, options.port, options.log_level).await?;
        Ok(Self {
            connection,
            log_level: options.log_level,
        })
    }

    /// Subscribe to device events.
    ///
    /// Multiple subscriptions can be active simultaneously; each receives
    /// every event from the moment it subscribes.
    pub fn subscribe(&self) -> EventReceiver {
        EventReceiver::new(self.connection.subscribe())
    }

    /// Current lifecycle state of the control connection.
    pub fn status(&self) -> ConnectionStatus {
        self.connection.status()
    }

    // ========== Power / Mute ==========

    /// Turn a zone's power on or off.
    pub fn power(&self, on: bool, zone: Zone) -> Result<()> {
        if self.log_level >= 1 {
            tracing::debug!("turning {} power {}", zone, if on { "ON" } else { "OFF" });
        }
        self.connection.send(protocol::power_command(zone, on))
    }

    /// Turn a zone's mute on or off. Zone 4 has no mute command and is
    /// rejected with [`VsxError::UnsupportedZone`](crate::VsxError::UnsupportedZone).
    pub fn mute(&self, on: bool, zone: Zone) -> Result<()> {
        let command = protocol::mute_command(zone, on)?;
        if self.log_level >= 1 {
            tracing::debug!("turning {} mute {}", zone, if on { "ON" } else { "OFF" });
        }
        self.connection.send(command)
    }

    // ========== Volume ==========

    /// Set the main-zone volume in dB, -80.0..=+12.0.
    ///
    /// Out-of-range values clamp to the device's raw scale; `None` selects
    /// the scale floor.
    pub fn volume(&self, db: impl Into<Option<f64>>) -> Result<()> {
        let db = db.into();
        if self.log_level >= 1 {
            tracing::debug!("setting volume: {:?} dB", db);
        }
        self.connection.send(protocol::volume_command(db))
    }

    /// Set the zone 2 volume in dB, -80.0..=0.0. Same clamping rules as
    /// [`volume`](VsxClient::volume) on the two-digit secondary scale.
    pub fn zone_volume(&self, db: impl Into<Option<f64>>) -> Result<()> {
        let db = db.into();
        if self.log_level >= 1 {
            tracing::debug!("setting zone volume: {:?} dB", db);
        }
        self.connection.send(protocol::zone_volume_command(db))
    }

    /// Step the main-zone volume up.
    pub fn volume_up(&self) -> Result<()> {
        self.connection.send(protocol::VOLUME_UP)
    }

    /// Step the main-zone volume down.
    pub fn volume_down(&self) -> Result<()> {
        self.connection.send(protocol::VOLUME_DOWN)
    }

    /// Step the zone 2 volume up.
    pub fn zone_volume_up(&self) -> Result<()> {
        self.connection.send(protocol::ZONE_VOLUME_UP)
    }

    /// Step the zone 2 volume down.
    pub fn zone_volume_down(&self) -> Result<()> {
        self.connection.send(protocol::ZONE_VOLUME_DOWN)
    }

    // ========== Input selection ==========

    /// Change the main-zone input.
    ///
    /// Accepts a numeric id or its wire string (`4`, `"4"` and `"04"` are
    /// equivalent; see [`codes`](crate::codes)). The select command is
    /// followed immediately by a status query so the caller receives a
    /// confirmed `input` event even if the device's own confirmation is
    /// delayed or dropped.
    pub fn change_input(&self, input: impl Into<InputId>) -> Result<()> {
        let id = input.into().normalize()?;
        if self.log_level >= 1 {
            tracing::debug!(
                "selecting input {} ({})",
                id,
                self.connection.input_name(&id).as_deref().unwrap_or("???")
            );
        }
        self.connection.send(protocol::select_input_command(&id))?;
        self.connection.send(protocol::INPUT_QUERY)
    }

    /// Change the zone 2 input.
    pub fn change_zone_input(&self, input: impl Into<InputId>) -> Result<()> {
        let id = input.into().normalize()?;
        self.connection
            .send(protocol::select_zone_input_command(&id))
    }

    /// Ask the device for its name for an input id. The answer arrives as
    /// an [`InputName`](crate::VsxEvent::InputName) event.
    pub fn query_input_name(&self, input: impl Into<InputId>) -> Result<()> {
        let id = input.into().normalize()?;
        self.connection.send(protocol::input_name_query(&id))
    }

    // ========== Listening mode / keys ==========

    /// Select a listening mode by its `SR` key (see
    /// [`SET_MODE_NAMES`](crate::SET_MODE_NAMES)).
    pub fn listening_mode(&self, mode: &str) -> Result<()> {
        if self.log_level >= 1 {
            tracing::debug!("setting listening mode: {}", mode);
        }
        self.connection.send(protocol::listening_mode_command(mode)?)
    }

    /// Send a raw network remote-control key code.
    pub fn send_key(&self, key: &str) -> Result<()> {
        self.connection.send(protocol::send_key_command(key))
    }

    // ========== Status ==========

    /// Issue the full status-query burst: power and selected input for all
    /// four zones, volume and mute for the three that report them, both
    /// listening-mode vocabularies, and one name query per known input id.
    ///
    /// Commands are staggered 100 ms apart to avoid saturating the device's
    /// command buffer. Returns the total span of the burst so callers can
    /// schedule follow-up actions after it completes. Calling again while a
    /// burst is in flight interleaves both by deadline.
    pub fn query(&self) -> Duration {
        self.connection.query()
    }

    /// Current name for a two-digit input id, if known.
    pub fn input_name(&self, id: &str) -> Option<String> {
        self.connection.input_name(id)
    }

    /// Snapshot of the whole input-name table.
    pub fn input_names(&self) -> BTreeMap<String, String> {
        self.connection.input_names()
    }

    /// Last reported input id for a zone, if any report arrived yet.
    pub fn selected_input(&self, zone: Zone) -> Option<String> {
        self.connection.selected_input(zone)
    }
}
