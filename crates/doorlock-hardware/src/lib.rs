//! Peripheral abstraction layer for the door lock nodes.
//!
//! Defines the device contracts the two nodes are written against, mock
//! implementations for tests and local runs, and a file-backed EEPROM for
//! running the Control node on a host.
//!
//! # Device Traits
//!
//! | Trait | Node | Device |
//! |-------|------|--------|
//! | [`KeypadDevice`] | Interface | 4x4 keypad |
//! | [`DisplayDevice`] | Interface | 2x16 character LCD |
//! | [`MotorDevice`] | Control | DC motor on the bolt |
//! | [`BuzzerDevice`] | Control | Alarm buzzer |
//! | [`Eeprom`] | Control | 256-byte non-volatile store |
//!
//! # Example
//!
//! ```no_run
//! use doorlock_hardware::mock::MockMotor;
//! use doorlock_hardware::{MotorCommand, MotorDevice};
//!
//! # async fn example() -> doorlock_hardware::Result<()> {
//! let (mut motor, handle) = MockMotor::new();
//! motor.rotate(MotorCommand::FORWARD).await?;
//! assert_eq!(handle.last(), Some(MotorCommand::FORWARD));
//! # Ok(())
//! # }
//! ```

pub mod error;
pub mod file_eeprom;
pub mod mock;
pub mod traits;
pub mod types;

pub use error::{HardwareError, Result};
pub use file_eeprom::FileEeprom;
pub use traits::{BuzzerDevice, DisplayDevice, Eeprom, Key, KeypadDevice, MotorDevice};
pub use types::{MotorCommand, MotorDirection};
