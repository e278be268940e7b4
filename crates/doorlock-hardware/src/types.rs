//! Common types shared across peripheral implementations.

use doorlock_core::constants::{FULL_SPEED, ZERO_SPEED};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Direction of the door motor.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum MotorDirection {
    /// Unlocking rotation.
    Forward,

    /// Locking rotation.
    Reverse,

    /// Motor halted.
    Stop,
}

impl fmt::Display for MotorDirection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MotorDirection::Forward => write!(f, "forward"),
            MotorDirection::Reverse => write!(f, "reverse"),
            MotorDirection::Stop => write!(f, "stop"),
        }
    }
}

/// A single motor instruction.
///
/// Speed is a duty percentage in `0..=100`; the door sequence only ever
/// uses full speed or zero.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct MotorCommand {
    pub direction: MotorDirection,
    pub speed: u8,
}

impl MotorCommand {
    /// Rotate forward at full speed.
    pub const FORWARD: MotorCommand = MotorCommand {
        direction: MotorDirection::Forward,
        speed: FULL_SPEED,
    };

    /// Rotate in reverse at full speed.
    pub const REVERSE: MotorCommand = MotorCommand {
        direction: MotorDirection::Reverse,
        speed: FULL_SPEED,
    };

    /// Halt the motor.
    pub const STOP: MotorCommand = MotorCommand {
        direction: MotorDirection::Stop,
        speed: ZERO_SPEED,
    };

    /// Returns `true` if the command leaves the motor turning.
    pub fn is_running(&self) -> bool {
        self.direction != MotorDirection::Stop && self.speed > 0
    }
}

impl fmt::Display for MotorCommand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} @ {}%", self.direction, self.speed)
    }
}
