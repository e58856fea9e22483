//! Error type for transport setup and teardown
//!
//! Exchange outcomes are reported through
//! [`crate::exchange::ExchangeResult`]; `LinkError` only covers the
//! connect/disconnect lifecycle where no exchange exists yet.

use thiserror::Error;

#[derive(Debug, Clone, Error)]
pub enum LinkError {
    /// Transport-level failures: broken broker/serial connections,
    /// unsupported gateway hardware or firmware.
    #[error("Transport error: {0}")]
    Transport(String),

    /// Connect attempts that ran out of time.
    #[error("Timeout error: {0}")]
    Timeout(String),

    /// Operations on a transport that was never connected.
    #[error("Not connected")]
    NotConnected,

    /// Invalid transport configuration.
    #[error("Configuration error: {0}")]
    Config(String),
}

impl From<std::io::Error> for LinkError {
    fn from(err: std::io::Error) -> Self {
        LinkError::Transport(err.to_string())
    }
}

impl From<rumqttc::ClientError> for LinkError {
    fn from(err: rumqttc::ClientError) -> Self {
        LinkError::Transport(format!("MQTT: {err}"))
    }
}

impl From<tokio_serial::Error> for LinkError {
    fn from(err: tokio_serial::Error) -> Self {
        LinkError::Transport(format!("Serial: {err}"))
    }
}
