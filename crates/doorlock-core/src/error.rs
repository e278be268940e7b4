use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum Error {
    // Credential errors
    #[error("Invalid digit: 0x{byte:02X}")]
    InvalidDigit { byte: u8 },

    #[error("Credential must be {expected} digits, got {actual}")]
    InvalidCredentialLength { expected: usize, actual: usize },

    // Protocol errors
    #[error("Unknown command code: 0x{byte:02X}")]
    UnknownCommand { byte: u8 },

    #[error("Unknown reply code: 0x{byte:02X}")]
    UnknownReply { byte: u8 },

    // State machine errors
    #[error("Invalid state transition from {from} to {to}")]
    InvalidStateTransition { from: String, to: String },

    // Display errors
    #[error("Invalid display line {line} (max {max})")]
    InvalidLine { line: usize, max: usize },

    // Configuration errors
    #[error("Configuration error: {0}")]
    Config(String),
}

pub type Result<T> = std::result::Result<T, Error>;
