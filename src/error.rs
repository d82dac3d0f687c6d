//! Error types for tello-io

/// Result type alias
pub type Result<T> = std::result::Result<T, Error>;

/// tello-io error types
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// I/O error (socket bind, send or receive failure)
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Control command rejected by the device
    ///
    /// Carries the literal reply text the device sent instead of `"ok"`.
    #[error("Command rejected by device: {0:?}")]
    Rejected(String),

    /// No reply arrived within the configured response timeout
    #[error("Response timeout")]
    Timeout,

    /// Invalid parameter
    #[error("Invalid parameter: {0}")]
    InvalidParameter(String),

    /// The link was shut down while a call was pending
    #[error("Command link closed")]
    LinkClosed,

    /// Configuration parse error
    #[error("Config parse error: {0}")]
    ConfigParse(#[from] toml::de::Error),

    /// Configuration serialize error
    #[error("Config serialize error: {0}")]
    ConfigSerialize(#[from] toml::ser::Error),

    /// Generic error with message
    #[error("{0}")]
    Other(String),
}
