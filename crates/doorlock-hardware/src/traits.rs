//! Peripheral trait definitions.
//!
//! These traits are the contract between the two node state machines and
//! the devices wired to them: keypad and character display on the Interface
//! node; motor, buzzer, and EEPROM on the Control node. Mock and real
//! implementations are interchangeable behind them.
//!
//! All traits use native `async fn` methods (Rust 1.90 + Edition 2024 RPITIT).
//! They are therefore not object-safe; nodes take them as generic
//! parameters.

#![allow(async_fn_in_trait)]

use doorlock_core::Digit;

use crate::error::{HardwareError, Result};
use crate::types::MotorCommand;

/// A key pressed on the 4x4 keypad.
///
/// Only the keys the door lock reacts to are modelled; every other key on
/// the pad reads as [`Key::Other`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Key {
    /// Numeric digit key.
    Digit(Digit),

    /// `+`: open the door.
    Plus,

    /// `-`: change the credential.
    Minus,

    /// `=`: confirm an entry.
    Equals,

    /// Any other key, carrying its legend.
    Other(char),
}

impl Key {
    /// Map a key legend to a key.
    ///
    /// # Examples
    ///
    /// ```
    /// use doorlock_hardware::traits::Key;
    ///
    /// assert!(matches!(Key::from_char('7'), Key::Digit(_)));
    /// assert_eq!(Key::from_char('='), Key::Equals);
    /// assert_eq!(Key::from_char('%'), Key::Other('%'));
    /// ```
    pub fn from_char(c: char) -> Self {
        match c {
            '+' => Key::Plus,
            '-' => Key::Minus,
            '=' => Key::Equals,
            _ => match Digit::try_from(c) {
                Ok(digit) => Key::Digit(digit),
                Err(_) => Key::Other(c),
            },
        }
    }

    /// The legend printed on the key.
    pub fn as_char(self) -> char {
        match self {
            Key::Digit(digit) => digit.as_char(),
            Key::Plus => '+',
            Key::Minus => '-',
            Key::Equals => '=',
            Key::Other(c) => c,
        }
    }

    /// The digit carried by a digit key.
    pub fn as_digit(self) -> Option<Digit> {
        match self {
            Key::Digit(digit) => Some(digit),
            _ => None,
        }
    }
}

impl TryFrom<u8> for Key {
    type Error = HardwareError;

    /// Decode a keypad scan byte, which is the ASCII legend of the key.
    fn try_from(byte: u8) -> Result<Self> {
        if byte.is_ascii_graphic() {
            Ok(Key::from_char(char::from(byte)))
        } else {
            Err(HardwareError::invalid_data(format!(
                "Keypad byte 0x{byte:02X} is not a key legend"
            )))
        }
    }
}

/// Keypad device abstraction.
///
/// # Examples
///
/// ```no_run
/// use doorlock_hardware::traits::{Key, KeypadDevice};
/// use doorlock_hardware::Result;
///
/// async fn wait_for_confirm<K: KeypadDevice>(keypad: &mut K) -> Result<()> {
///     while keypad.read_key().await? != Key::Equals {}
///     Ok(())
/// }
/// ```
pub trait KeypadDevice: Send + Sync {
    /// Wait for the next key press.
    ///
    /// # Errors
    ///
    /// Returns an error if the device is disconnected.
    async fn read_key(&mut self) -> Result<Key>;
}

/// Character display abstraction (2x16 LCD on the reference board).
pub trait DisplayDevice: Send + Sync {
    /// Blank the whole display and home the cursor.
    async fn clear(&mut self) -> Result<()>;

    /// Move the cursor to `(row, column)`.
    ///
    /// # Errors
    ///
    /// Returns an error if the position lies outside the display.
    async fn move_cursor(&mut self, row: u8, column: u8) -> Result<()>;

    /// Write text at the cursor, advancing it.
    async fn write_str(&mut self, text: &str) -> Result<()>;

    /// Write text starting at `(row, column)`.
    async fn write_at(&mut self, row: u8, column: u8, text: &str) -> Result<()> {
        self.move_cursor(row, column).await?;
        self.write_str(text).await
    }
}

/// DC motor driving the door bolt.
pub trait MotorDevice: Send + Sync {
    /// Apply a direction and speed.
    async fn rotate(&mut self, command: MotorCommand) -> Result<()>;
}

/// Alarm buzzer.
pub trait BuzzerDevice: Send + Sync {
    /// Switch the buzzer on or off.
    async fn set_active(&mut self, active: bool) -> Result<()>;
}

/// Byte-addressable non-volatile memory.
///
/// Implementations may take real time per write; callers pace consecutive
/// writes themselves.
pub trait Eeprom: Send + Sync {
    /// Read the byte stored at `address`.
    ///
    /// # Errors
    ///
    /// Returns [`HardwareError::AddressOutOfRange`] for addresses past the
    /// end of the device.
    async fn read_byte(&mut self, address: u16) -> Result<u8>;

    /// Store `value` at `address`.
    ///
    /// # Errors
    ///
    /// Returns [`HardwareError::AddressOutOfRange`] for addresses past the
    /// end of the device, or [`HardwareError::WriteInterrupted`] if power is
    /// lost mid-write.
    async fn write_byte(&mut self, address: u16, value: u8) -> Result<()>;
}
