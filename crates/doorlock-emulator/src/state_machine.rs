//! Interface node state machine.
//!
//! # States
//!
//! - `Startup`: splash shown, asking the Control node whether a credential
//!   exists
//! - `Unprovisioned`: collecting and confirming a new credential
//! - `Provisioned`: showing the open / change menu
//!
//! # Valid Transitions
//!
//! - Startup → Unprovisioned | Provisioned
//! - Unprovisioned → Provisioned (entries matched and committed)
//! - Provisioned → Unprovisioned (change credential authorised)
//!
//! # Examples
//!
//! ```
//! use doorlock_emulator::{HmiState, HmiStateMachine};
//!
//! let mut machine = HmiStateMachine::new();
//! assert_eq!(machine.current_state(), HmiState::Startup);
//!
//! machine.transition_to(HmiState::Unprovisioned).unwrap();
//! assert!(machine.transition_to(HmiState::Startup).is_err());
//! ```

use std::collections::VecDeque;
use std::fmt;

use serde::{Deserialize, Serialize};
use tokio::time::Instant;

use doorlock_core::{Error, Result};

/// Maximum number of transitions kept in history.
const MAX_HISTORY_SIZE: usize = 100;

/// Interface node states.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum HmiState {
    Startup,
    Unprovisioned,
    Provisioned,
}

impl fmt::Display for HmiState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let state_str = match self {
            HmiState::Startup => "Startup",
            HmiState::Unprovisioned => "Unprovisioned",
            HmiState::Provisioned => "Provisioned",
        };
        write!(f, "{}", state_str)
    }
}

impl HmiState {
    /// Check if transition to target state is valid from this state.
    ///
    /// ```
    /// use doorlock_emulator::HmiState;
    ///
    /// assert!(HmiState::Startup.can_transition_to(&HmiState::Provisioned));
    /// assert!(!HmiState::Unprovisioned.can_transition_to(&HmiState::Startup));
    /// ```
    pub fn can_transition_to(&self, target: &HmiState) -> bool {
        matches!(
            (self, target),
            (
                HmiState::Startup,
                HmiState::Unprovisioned | HmiState::Provisioned
            ) | (HmiState::Unprovisioned, HmiState::Provisioned)
                | (HmiState::Provisioned, HmiState::Unprovisioned)
        )
    }
}

/// A single state transition with timestamp.
///
/// The timestamp comes from the Tokio clock so paused-time tests see
/// deterministic values. It is not serialized.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StateTransition {
    pub from: HmiState,
    pub to: HmiState,

    #[serde(skip, default = "Instant::now")]
    pub timestamp: Instant,
}

impl StateTransition {
    pub fn new(from: HmiState, to: HmiState) -> Self {
        Self {
            from,
            to,
            timestamp: Instant::now(),
        }
    }
}

/// Tracks the Interface node's state and its recent transitions.
#[derive(Debug)]
pub struct HmiStateMachine {
    current_state: HmiState,
    history: VecDeque<StateTransition>,
}

impl HmiStateMachine {
    /// Create a machine in `Startup`.
    pub fn new() -> Self {
        Self::builder().build()
    }

    pub fn builder() -> HmiStateMachineBuilder {
        HmiStateMachineBuilder::default()
    }

    pub fn current_state(&self) -> HmiState {
        self.current_state
    }

    /// Recent transitions, oldest first.
    pub fn history(&self) -> &VecDeque<StateTransition> {
        &self.history
    }

    /// Transition to a new state, validating the transition.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidStateTransition`] if `new_state` is not
    /// reachable from the current state.
    pub fn transition_to(&mut self, new_state: HmiState) -> Result<StateTransition> {
        if !self.current_state.can_transition_to(&new_state) {
            return Err(Error::InvalidStateTransition {
                from: self.current_state.to_string(),
                to: new_state.to_string(),
            });
        }

        let transition = StateTransition::new(self.current_state, new_state);
        self.current_state = new_state;

        self.history.push_back(transition.clone());
        if self.history.len() > MAX_HISTORY_SIZE {
            self.history.pop_front();
        }

        Ok(transition)
    }
}

impl Default for HmiStateMachine {
    fn default() -> Self {
        Self::new()
    }
}

/// Builder for [`HmiStateMachine`], mainly for starting tests mid-flow.
///
/// ```
/// use doorlock_emulator::{HmiState, HmiStateMachine};
///
/// let machine = HmiStateMachine::builder()
///     .with_initial_state(HmiState::Provisioned)
///     .build();
/// assert_eq!(machine.current_state(), HmiState::Provisioned);
/// ```
#[derive(Debug)]
pub struct HmiStateMachineBuilder {
    initial_state: HmiState,
}

impl Default for HmiStateMachineBuilder {
    fn default() -> Self {
        Self {
            initial_state: HmiState::Startup,
        }
    }
}

impl HmiStateMachineBuilder {
    pub fn with_initial_state(mut self, state: HmiState) -> Self {
        self.initial_state = state;
        self
    }

    pub fn build(self) -> HmiStateMachine {
        HmiStateMachine {
            current_state: self.initial_state,
            history: VecDeque::with_capacity(MAX_HISTORY_SIZE),
        }
    }
}
