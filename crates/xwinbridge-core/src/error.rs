//! Error type shared by the core and its display adapters.

/// Errors raised while talking to the display server or loading settings.
///
/// None of these escape the public event-processing operations: the
/// dispatcher folds them into "no event", "no capture" or a `None`
/// selection reply and logs them.
#[derive(Debug, thiserror::Error)]
pub enum BridgeError {
    #[error("Connection failed: {0}")]
    Connection(String),
    #[error("Protocol error: {0}")]
    Protocol(String),
    #[error("Keymap error: {0}")]
    Keymap(String),
    #[error("Configuration error: {0}")]
    Config(String),
}

impl BridgeError {
    pub fn connection(err: impl std::fmt::Display) -> Self {
        Self::Connection(err.to_string())
    }

    pub fn protocol(err: impl std::fmt::Display) -> Self {
        Self::Protocol(err.to_string())
    }
}

pub type Result<T> = std::result::Result<T, BridgeError>;
