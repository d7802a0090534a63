//! Error types for aqlink

/// Result type alias
pub type Result<T> = std::result::Result<T, Error>;

/// aqlink error types
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// Serial port error
    #[error("Serial port error: {0}")]
    Serial(#[from] serialport::Error),

    /// I/O error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Configuration file could not be parsed
    #[error("Config parse error: {0}")]
    ConfigParse(#[from] toml::de::Error),

    /// Configuration could not be serialized
    #[error("Config serialize error: {0}")]
    ConfigSerialize(#[from] toml::ser::Error),

    /// Invalid parameter
    #[error("Invalid parameter: {0}")]
    InvalidParameter(String),

    /// Board profile with no known baud rate mapping
    #[error("Unknown board profile: {0}")]
    UnknownBoard(String),

    /// The device sent an ERR-tagged line
    #[error("Device fault: {0}")]
    DeviceFault(String),

    /// Response line whose tag matches none of the known tags
    #[error("Unrecognized tag in line: {0:?}")]
    UnknownTag(String),

    /// Device write failed
    #[error("Write failed: {0}")]
    WriteFailed(#[source] std::io::Error),

    /// Line grew past the permitted length with no terminator in sight
    #[error("Line too long: {len} bytes without a terminator (cap {max})")]
    LineTooLong {
        /// Maximum permitted line length
        max: usize,
        /// Bytes accumulated when the cap tripped
        len: usize,
    },

    /// Operation interrupted by the cancellation flag
    #[error("Operation cancelled")]
    Cancelled,

    /// Generic error with message
    #[error("{0}")]
    Other(String),
}
