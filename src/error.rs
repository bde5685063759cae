use crate::types::Zone;
use thiserror::Error;

/// Result type for receiver operations
pub type Result<T> = std::result::Result<T, VsxError>;

/// Errors that can occur when interacting with a VSX receiver
#[derive(Error, Debug)]
pub enum VsxError {
    /// I/O error on the control connection
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Connection was closed; the session is terminal and a new client
    /// must be constructed to retry
    #[error("Connection closed")]
    ConnectionClosed,

    /// The zone does not support the requested operation (zone 4 has no
    /// mute command)
    #[error("{zone} does not support {operation}")]
    UnsupportedZone {
        /// Zone the command was addressed to
        zone: Zone,
        /// The unsupported operation
        operation: &'static str,
    },

    /// Input id could not be normalized to the two-digit wire form
    #[error("Invalid input id: {0:?}")]
    InvalidInputId(String),

    /// Listening mode key is not a 1-4 digit code
    #[error("Invalid listening mode: {0:?}")]
    InvalidListeningMode(String),

    /// Channel receive error
    #[error("Channel error: {0}")]
    ChannelError(String),
}
