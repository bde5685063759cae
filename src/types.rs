use serde::Serialize;
use std::fmt;

/// One of the receiver's independently controllable output zones.
///
/// Each zone has its own power, volume, input, and (except zone 4) mute
/// state, and a partially distinct command vocabulary. The per-zone command
/// prefixes live here so the encoder and the response dispatcher share one
/// table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum Zone {
    /// The main zone
    #[serde(rename = "main")]
    Main,
    /// Zone 2
    #[serde(rename = "zone 2")]
    Zone2,
    /// Zone 3
    #[serde(rename = "zone 3")]
    Zone3,
    /// Zone 4 (HDZONE); no mute command
    #[serde(rename = "zone 4")]
    Zone4,
}

impl Zone {
    /// All zones, in protocol order.
    pub const ALL: [Zone; 4] = [Zone::Main, Zone::Zone2, Zone::Zone3, Zone::Zone4];

    /// Look up a zone by its 1-based number.
    pub fn from_number(n: u8) -> Option<Zone> {
        match n {
            1 => Some(Zone::Main),
            2 => Some(Zone::Zone2),
            3 => Some(Zone::Zone3),
            4 => Some(Zone::Zone4),
            _ => None,
        }
    }

    /// The zone's 1-based number.
    pub fn number(self) -> u8 {
        match self {
            Zone::Main => 1,
            Zone::Zone2 => 2,
            Zone::Zone3 => 3,
            Zone::Zone4 => 4,
        }
    }

    /// Display name used in event payloads ("main", "zone 2", ...).
    pub fn name(self) -> &'static str {
        match self {
            Zone::Main => "main",
            Zone::Zone2 => "zone 2",
            Zone::Zone3 => "zone 3",
            Zone::Zone4 => "zone 4",
        }
    }

    /// Prefix of the outbound power command (`<prefix>P<O|F>`).
    pub(crate) fn power_prefix(self) -> &'static str {
        match self {
            Zone::Main => "P",
            Zone::Zone2 => "AP",
            Zone::Zone3 => "BP",
            Zone::Zone4 => "ZEP",
        }
    }

    /// Prefix of the outbound mute command, if the zone supports mute.
    pub(crate) fn mute_prefix(self) -> Option<&'static str> {
        match self {
            Zone::Main => Some("M"),
            Zone::Zone2 => Some("Z2M"),
            Zone::Zone3 => Some("Z3M"),
            Zone::Zone4 => None,
        }
    }
}

impl fmt::Display for Zone {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Lifecycle state of the control connection.
///
/// `Ended` and `Errored` are terminal; the client never transitions back to
/// `Connecting`. Construct a new client to retry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ConnectionStatus {
    /// TCP connect in progress
    Connecting,
    /// Session established, commands accepted
    Connected,
    /// Peer closed the connection
    Ended,
    /// The connection failed with a transport error
    Errored,
}

impl ConnectionStatus {
    /// Whether the session has reached a terminal state.
    pub fn is_terminal(self) -> bool {
        matches!(self, ConnectionStatus::Ended | ConnectionStatus::Errored)
    }
}
