use doorlock_hardware::HardwareError;
use doorlock_link::LinkError;
use thiserror::Error;

/// Result type alias for node operations.
pub type Result<T> = std::result::Result<T, NodeError>;

/// Failures that stop a node.
///
/// Protocol outcomes (wrong credential, mismatched entries, unknown command)
/// are not errors; they are handled inside the state machines.
#[derive(Debug, Error)]
pub enum NodeError {
    #[error("Peripheral error: {0}")]
    Hardware(#[from] HardwareError),

    #[error("Link error: {0}")]
    Link(#[from] LinkError),

    #[error(transparent)]
    Core(#[from] doorlock_core::Error),
}

impl NodeError {
    /// Returns `true` if the node stopped because its peer went away.
    pub fn is_link_closed(&self) -> bool {
        matches!(self, NodeError::Link(LinkError::Closed))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_link_closed_detection() {
        assert!(NodeError::from(LinkError::Closed).is_link_closed());
        assert!(!NodeError::from(LinkError::Timeout(10)).is_link_closed());
        assert!(!NodeError::from(HardwareError::disconnected("Keypad")).is_link_closed());
    }

    #[test]
    fn test_error_display_wraps_source() {
        let error = NodeError::from(HardwareError::write_interrupted(0xDD));
        assert_eq!(
            error.to_string(),
            "Peripheral error: Write interrupted at 0x00DD"
        );
    }
}
