//! Fixed constants shared by the Interface node and the Control node.
//!
//! The two nodes never negotiate any of these values over the link. Each
//! node carries its own copy, so changing a tick target on one side without
//! the other desynchronises the status display from the real motor.
//!
//! # Usage
//!
//! ```
//! use doorlock_core::constants::*;
//!
//! let open_sequence = DOOR_UNLOCK_TICKS + DOOR_HOLD_TICKS + DOOR_LOCK_TICKS;
//! assert_eq!(open_sequence, 33);
//! assert_eq!(CREDENTIAL_LEN, 5);
//! ```

// ============================================================================
// Credential
// ============================================================================

/// Number of digits in a credential and in every digit payload on the wire.
pub const CREDENTIAL_LEN: usize = 5;

/// Failed verify attempts tolerated before the alarm is raised.
pub const MAX_ATTEMPTS: u8 = 3;

// ============================================================================
// Persistent storage layout
// ============================================================================

/// EEPROM address of the "credential configured" flag byte.
pub const FLAG_ADDRESS: u16 = 0xDD;

/// EEPROM address of the first credential digit. Digits are sequential.
pub const CREDENTIAL_BASE_ADDRESS: u16 = 0x00;

/// Flag value written once a credential has been fully committed.
pub const FLAG_SET: u8 = 1;

/// Flag value for "no credential configured".
pub const FLAG_CLEAR: u8 = 0;

/// Size in bytes of the emulated EEPROM device.
pub const EEPROM_SIZE: usize = 256;

/// Value of an erased EEPROM cell.
pub const EEPROM_ERASED: u8 = 0xFF;

/// Settling delay after every EEPROM write, in milliseconds.
pub const EEPROM_SETTLE_MS: u64 = 15;

// ============================================================================
// Timing service
// ============================================================================

/// Nominal tick period of the timing service, in milliseconds.
pub const DEFAULT_TICK_PERIOD_MS: u64 = 1000;

/// Ticks the motor rotates forward while unlocking.
pub const DOOR_UNLOCK_TICKS: u32 = 15;

/// Ticks the motor stays stopped while the door is held open.
pub const DOOR_HOLD_TICKS: u32 = 3;

/// Ticks the motor rotates in reverse while locking.
pub const DOOR_LOCK_TICKS: u32 = 15;

/// Ticks the buzzer stays on after the last failed attempt.
pub const ALARM_TICKS: u32 = 60;

// ============================================================================
// Serial link
// ============================================================================

/// Nominal link speed. Informational: the byte transport is an external
/// collaborator and only its blocking contract matters to the nodes.
pub const BAUD_RATE: u32 = 9600;

/// Pacing delay around each payload byte, in milliseconds.
pub const LINK_BYTE_DELAY_MS: u64 = 15;

// ============================================================================
// Motor
// ============================================================================

/// PWM duty cycle for a moving motor.
pub const FULL_SPEED: u8 = 100;

/// PWM duty cycle for a stopped motor.
pub const ZERO_SPEED: u8 = 0;
