//! Mock device implementations for testing and development.
//!
//! Each mock comes with a cloneable handle: input devices are driven through
//! the handle, output devices are observed through it.

pub mod buzzer;
pub mod eeprom;
pub mod keypad;
pub mod motor;

pub use buzzer::{BuzzerEvent, MockBuzzer, MockBuzzerHandle};
pub use eeprom::{MockEeprom, MockEepromHandle};
pub use keypad::{MockKeypad, MockKeypadHandle};
pub use motor::{MockMotor, MockMotorHandle, MotorEvent};
