//! Mock motor that records every instruction it receives.

use std::sync::{Arc, Mutex};

use tokio::time::Instant;

use crate::{Result, traits::MotorDevice, types::MotorCommand};

/// One recorded motor instruction.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MotorEvent {
    pub command: MotorCommand,
    pub at: Instant,
}

/// Mock motor device.
///
/// Instructions are timestamped with [`tokio::time::Instant`], so tests on a
/// paused clock can assert exact phase lengths.
#[derive(Debug, Clone, Default)]
pub struct MockMotor {
    events: Arc<Mutex<Vec<MotorEvent>>>,
}

impl MockMotor {
    /// Create a new mock motor and its observation handle.
    pub fn new() -> (Self, MockMotorHandle) {
        let motor = Self::default();
        let handle = MockMotorHandle {
            events: Arc::clone(&motor.events),
        };
        (motor, handle)
    }
}

impl MotorDevice for MockMotor {
    async fn rotate(&mut self, command: MotorCommand) -> Result<()> {
        let event = MotorEvent {
            command,
            at: Instant::now(),
        };
        self.events
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .push(event);
        Ok(())
    }
}

/// Handle for observing a [`MockMotor`].
#[derive(Debug, Clone)]
pub struct MockMotorHandle {
    events: Arc<Mutex<Vec<MotorEvent>>>,
}

impl MockMotorHandle {
    /// Every instruction received so far, oldest first.
    pub fn events(&self) -> Vec<MotorEvent> {
        self.events
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .clone()
    }

    /// Just the commands, without timestamps.
    pub fn commands(&self) -> Vec<MotorCommand> {
        self.events().into_iter().map(|e| e.command).collect()
    }

    /// The most recent instruction, if any.
    pub fn last(&self) -> Option<MotorCommand> {
        self.commands().last().copied()
    }
}
