//! Error types for peripheral operations.
//!
//! Covers the failure modes of the fixed-contract peripherals: a device that
//! has gone away, an EEPROM access outside the device, a write cut short by
//! power loss, and plain I/O failures of file-backed devices.

pub type Result<T> = std::result::Result<T, HardwareError>;

/// Errors that can occur during peripheral operations.
#[derive(Debug, thiserror::Error)]
pub enum HardwareError {
    /// The device went away, or its input channel closed.
    #[error("Device disconnected: {device}")]
    Disconnected { device: String },

    /// EEPROM address outside the device.
    #[error("Address 0x{address:04X} out of range (size {size})")]
    AddressOutOfRange { address: u16, size: usize },

    /// Power was lost while the byte at `address` was being written.
    #[error("Write interrupted at 0x{address:04X}")]
    WriteInterrupted { address: u16 },

    /// The device produced or holds data that makes no sense.
    #[error("Invalid data: {message}")]
    InvalidData { message: String },

    /// Generic I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl HardwareError {
    pub fn disconnected(device: impl Into<String>) -> Self {
        Self::Disconnected {
            device: device.into(),
        }
    }

    pub fn address_out_of_range(address: u16, size: usize) -> Self {
        Self::AddressOutOfRange { address, size }
    }

    pub fn write_interrupted(address: u16) -> Self {
        Self::WriteInterrupted { address }
    }

    pub fn invalid_data(message: impl Into<String>) -> Self {
        Self::InvalidData {
            message: message.into(),
        }
    }
}
