//! Mock buzzer that records on/off transitions.

use std::sync::{Arc, Mutex};

use tokio::time::Instant;

use crate::{Result, traits::BuzzerDevice};

/// One recorded buzzer switch.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BuzzerEvent {
    pub active: bool,
    pub at: Instant,
}

/// Mock buzzer device.
#[derive(Debug, Clone, Default)]
pub struct MockBuzzer {
    events: Arc<Mutex<Vec<BuzzerEvent>>>,
}

impl MockBuzzer {
    /// Create a new mock buzzer and its observation handle.
    pub fn new() -> (Self, MockBuzzerHandle) {
        let buzzer = Self::default();
        let handle = MockBuzzerHandle {
            events: Arc::clone(&buzzer.events),
        };
        (buzzer, handle)
    }
}

impl BuzzerDevice for MockBuzzer {
    async fn set_active(&mut self, active: bool) -> Result<()> {
        let event = BuzzerEvent {
            active,
            at: Instant::now(),
        };
        self.events
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .push(event);
        Ok(())
    }
}

/// Handle for observing a [`MockBuzzer`].
#[derive(Debug, Clone)]
pub struct MockBuzzerHandle {
    events: Arc<Mutex<Vec<BuzzerEvent>>>,
}

impl MockBuzzerHandle {
    /// Every switch so far, oldest first.
    pub fn events(&self) -> Vec<BuzzerEvent> {
        self.events
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .clone()
    }

    /// Whether the buzzer is currently sounding.
    pub fn is_active(&self) -> bool {
        self.events().last().is_some_and(|e| e.active)
    }

    /// Number of times the buzzer was switched on.
    pub fn activations(&self) -> usize {
        self.events().iter().filter(|e| e.active).count()
    }
}
