use doorlock_protocol::Command;
use thiserror::Error;

/// Result type alias for link operations.
pub type Result<T> = std::result::Result<T, LinkError>;

/// Errors that can occur on the serial link.
#[derive(Debug, Error)]
pub enum LinkError {
    /// The peer hung up or the transport closed.
    #[error("Link closed by peer")]
    Closed,

    /// No byte (or connection) arrived within the configured timeout.
    #[error("Timeout after {0}ms")]
    Timeout(u64),

    /// A byte arrived that is not a valid reply to `command`.
    #[error("Unexpected reply 0x{byte:02X} to {command}")]
    UnexpectedReply { command: Command, byte: u8 },

    /// Low-level I/O error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl LinkError {
    /// Returns `true` if the link can no longer be used.
    pub fn is_fatal(&self) -> bool {
        matches!(self, LinkError::Closed | LinkError::Io(_))
    }
}
