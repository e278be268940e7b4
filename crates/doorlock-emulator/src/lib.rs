//! The two door lock nodes.
//!
//! - [`ControlNode`]: protocol server owning the motor, the buzzer, and the
//!   persisted credential ([`CredentialStore`])
//! - [`InterfaceNode`]: protocol client owning the keypad and the display,
//!   driven by [`HmiStateMachine`]
//!
//! Both are generic over the peripheral traits from `doorlock-hardware` and
//! the [`SerialLink`](doorlock_link::SerialLink) from `doorlock-link`, so the
//! same code runs against mocks in tests and against TCP and a terminal in
//! the `doorlock` binary.
//!
//! # Example
//!
//! ```no_run
//! use doorlock_emulator::{ControlConfig, ControlNode, HmiConfig, InterfaceNode, VirtualDisplay};
//! use doorlock_hardware::mock::{MockBuzzer, MockEeprom, MockKeypad, MockMotor};
//! use doorlock_link::MockLink;
//!
//! # async fn example() -> doorlock_emulator::Result<()> {
//! let (hmi_end, control_end) = MockLink::pair();
//! let (motor, _) = MockMotor::new();
//! let (buzzer, _) = MockBuzzer::new();
//! let (eeprom, _) = MockEeprom::new();
//! let (keypad, keys) = MockKeypad::new();
//! let (display, _screen) = VirtualDisplay::new(2, 16);
//!
//! let mut control =
//!     ControlNode::boot(control_end, motor, buzzer, eeprom, ControlConfig::default()).await?;
//! let mut hmi = InterfaceNode::new(hmi_end, keypad, display, HmiConfig::default());
//!
//! keys.send_entry("12345").await?;
//! keys.send_entry("12345").await?;
//! let _ = tokio::join!(control.run(), hmi.run());
//! # Ok(())
//! # }
//! ```

pub mod config;
pub mod control;
pub mod display;
pub mod error;
pub mod hmi;
pub mod state_machine;
pub mod store;

pub use config::{ControlConfig, HmiConfig, TimingConfig};
pub use control::ControlNode;
pub use display::{DisplayEvent, DisplayOp, VirtualDisplay, VirtualDisplayHandle};
pub use error::{NodeError, Result};
pub use hmi::{InterfaceNode, MenuChoice};
pub use state_machine::{HmiState, HmiStateMachine, HmiStateMachineBuilder, StateTransition};
pub use store::CredentialStore;
