//! Error types for SetuIO

/// Result type alias
pub type Result<T> = std::result::Result<T, Error>;

/// SetuIO error types
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// Serial port error
    #[error("Serial port error: {0}")]
    Serial(#[from] serialport::Error),

    /// I/O error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// SLIP framing error: ESC followed by a byte that is not a valid
    /// escape code
    #[error("Invalid SLIP escape sequence: ESC followed by 0x{0:02X}")]
    InvalidEscape(u8),

    /// Configuration file parse error
    #[error("Config error: {0}")]
    Config(#[from] toml::de::Error),

    /// Invalid parameter
    #[error("Invalid parameter: {0}")]
    InvalidParameter(String),
}
