//! Error types for bridge operations

use thiserror::Error;

/// Bridge-specific errors
#[derive(Debug, Error)]
pub enum BridgeError {
    /// The prompt did not arrive before the read deadline
    #[error("Timed out waiting for bridge prompt")]
    Timeout,

    /// The response did not contain the echoed command
    #[error("Response is missing the command echo")]
    MissingEcho,

    /// The response ended before an expected line
    #[error("Response to `{command}` has no line {index}")]
    MissingResponseLine { command: String, index: usize },

    /// A line that should hold a hex byte did not
    #[error("Expected a hex byte, got {0:?}")]
    InvalidHexByte(String),

    /// More bytes arrived than fit in the response buffer
    #[error("Response exceeded {0} bytes without a prompt")]
    ResponseTooLong(usize),

    /// Response bytes were not ASCII
    #[error("Response contains non-ASCII bytes")]
    InvalidEncoding,

    /// Invalid parameter
    #[error("Invalid parameter: {0}")]
    InvalidParameter(String),

    /// I/O error during communication
    #[error("I/O error: {0}")]
    IoError(String),

    /// Serial port error
    #[error("Serial port error: {0}")]
    SerialError(#[from] serialport::Error),
}

impl BridgeError {
    /// The core error kind this error reports as
    pub fn kind(&self) -> cdcectl_core::Error {
        use cdcectl_core::Error;

        match self {
            Self::Timeout => Error::Timeout,
            Self::MissingEcho
            | Self::MissingResponseLine { .. }
            | Self::InvalidHexByte(_)
            | Self::ResponseTooLong(_)
            | Self::InvalidEncoding => Error::ProtocolViolation,
            Self::InvalidParameter(_) => Error::InvalidArgument,
            Self::IoError(_) | Self::SerialError(_) => Error::Io,
        }
    }
}

/// Result type for bridge operations
pub type Result<T> = core::result::Result<T, BridgeError>;

impl From<std::io::Error> for BridgeError {
    fn from(e: std::io::Error) -> Self {
        match e.kind() {
            std::io::ErrorKind::TimedOut => BridgeError::Timeout,
            _ => BridgeError::IoError(e.to_string()),
        }
    }
}

impl From<BridgeError> for cdcectl_core::Error {
    fn from(e: BridgeError) -> Self {
        log::debug!("bridge: {}", e);
        e.kind()
    }
}
