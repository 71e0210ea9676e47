//! Error types for the printer library

use thiserror::Error;

/// Printer error types
///
/// Everything except [`PrintError::InvalidArgument`] and the configuration
/// variants is treated as a transient device fault by the connection manager.
#[derive(Debug, Error)]
pub enum PrintError {
    /// Connection to the device could not be established
    #[error("Connection failed: {0}")]
    Connection(String),

    /// IO error during printing
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Printer is offline or the session was dropped
    #[error("Printer offline: {0}")]
    Offline(String),

    /// Timeout waiting for printer
    #[error("Timeout: {0}")]
    Timeout(String),

    /// Invalid printer configuration
    #[error("Invalid config: {0}")]
    InvalidConfig(String),

    /// Device descriptor could not be parsed
    #[error("Invalid device descriptor: {0}")]
    InvalidDescriptor(String),

    /// Caller passed a value the printer cannot act on (programming error)
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),
}

/// Result type for printer operations
pub type PrintResult<T> = Result<T, PrintError>;
