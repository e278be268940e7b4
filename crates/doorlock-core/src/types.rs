use crate::{
    Result,
    constants::{CREDENTIAL_LEN, DOOR_HOLD_TICKS, DOOR_LOCK_TICKS, DOOR_UNLOCK_TICKS},
    error::Error,
};
use serde::{Deserialize, Serialize};
use std::fmt;
use subtle::ConstantTimeEq;

/// One keypad digit, stored as its ASCII character (`'0'..='9'`).
///
/// The ASCII form is what travels on the link and what is persisted, so the
/// type keeps it rather than the numeric value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Digit(u8);

impl Digit {
    /// The digit `0`.
    pub const ZERO: Digit = Digit(b'0');

    /// Create a digit from its ASCII character byte.
    ///
    /// # Errors
    /// Returns `Error::InvalidDigit` if `byte` is not in `b'0'..=b'9'`.
    pub fn from_ascii(byte: u8) -> Result<Self> {
        if byte.is_ascii_digit() {
            Ok(Digit(byte))
        } else {
            Err(Error::InvalidDigit { byte })
        }
    }

    /// Create a digit from its numeric value.
    ///
    /// # Errors
    /// Returns `Error::InvalidDigit` if `value` is greater than 9.
    pub fn from_value(value: u8) -> Result<Self> {
        if value > 9 {
            return Err(Error::InvalidDigit { byte: value });
        }
        Ok(Digit(b'0' + value))
    }

    /// The ASCII character byte sent on the wire.
    #[inline]
    #[must_use]
    pub fn as_ascii(self) -> u8 {
        self.0
    }

    /// The numeric value, 0-9.
    #[inline]
    #[must_use]
    pub fn value(self) -> u8 {
        self.0 - b'0'
    }

    /// The digit as a `char`.
    #[inline]
    #[must_use]
    pub fn as_char(self) -> char {
        char::from(self.0)
    }
}

impl TryFrom<u8> for Digit {
    type Error = Error;

    fn try_from(byte: u8) -> Result<Self> {
        Digit::from_ascii(byte)
    }
}

impl TryFrom<char> for Digit {
    type Error = Error;

    fn try_from(c: char) -> Result<Self> {
        u8::try_from(c)
            .map_err(|_| Error::InvalidDigit { byte: 0xFF })
            .and_then(Digit::from_ascii)
    }
}

impl fmt::Display for Digit {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}", self.as_char())
    }
}

/// A full five-digit credential.
///
/// Used for the persisted credential on the Control node, for the two staging
/// slots, and for the pending entry on the Interface node.
///
/// # Security
/// Equality is constant-time and always inspects every position, so a
/// verify takes the same time whichever digit is wrong. `Display` and `Debug`
/// mask the digits; use [`Credential::to_ascii`] when the raw bytes are needed.
#[derive(Clone, Copy, Eq, Serialize, Deserialize)]
pub struct Credential([Digit; CREDENTIAL_LEN]);

impl Credential {
    /// Create a credential from validated digits.
    #[must_use]
    pub fn new(digits: [Digit; CREDENTIAL_LEN]) -> Self {
        Credential(digits)
    }

    /// Create a credential from raw wire or storage bytes.
    ///
    /// # Errors
    /// Returns `Error::InvalidDigit` for the first byte that is not an ASCII digit.
    pub fn from_ascii(bytes: [u8; CREDENTIAL_LEN]) -> Result<Self> {
        let mut digits = [Digit::ZERO; CREDENTIAL_LEN];
        for (slot, byte) in digits.iter_mut().zip(bytes) {
            *slot = Digit::from_ascii(byte)?;
        }
        Ok(Credential(digits))
    }

    /// The raw bytes as sent on the wire and persisted.
    #[must_use]
    pub fn to_ascii(&self) -> [u8; CREDENTIAL_LEN] {
        self.0.map(Digit::as_ascii)
    }

    /// The individual digits.
    #[must_use]
    pub fn digits(&self) -> &[Digit; CREDENTIAL_LEN] {
        &self.0
    }

    /// Compare against raw candidate bytes without short-circuiting.
    ///
    /// All positions are compared even after the first mismatch.
    #[must_use]
    pub fn matches_ascii(&self, candidate: &[u8; CREDENTIAL_LEN]) -> bool {
        self.to_ascii()[..].ct_eq(&candidate[..]).into()
    }
}

impl PartialEq for Credential {
    fn eq(&self, other: &Self) -> bool {
        self.matches_ascii(&other.to_ascii())
    }
}

impl std::str::FromStr for Credential {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        let bytes: [u8; CREDENTIAL_LEN] =
            s.as_bytes()
                .try_into()
                .map_err(|_| Error::InvalidCredentialLength {
                    expected: CREDENTIAL_LEN,
                    actual: s.len(),
                })?;
        Credential::from_ascii(bytes)
    }
}

impl fmt::Display for Credential {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}", "*".repeat(CREDENTIAL_LEN))
    }
}

impl fmt::Debug for Credential {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.debug_tuple("Credential").field(&format_args!("{self}")).finish()
    }
}

/// The three phases of the door open sequence, in execution order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DoorPhase {
    /// Motor rotates forward.
    Unlocking,
    /// Motor stopped, door held open.
    Holding,
    /// Motor rotates in reverse.
    Locking,
}

impl DoorPhase {
    /// Phases in the order they run.
    pub const SEQUENCE: [DoorPhase; 3] =
        [DoorPhase::Unlocking, DoorPhase::Holding, DoorPhase::Locking];

    /// Default tick target of the phase.
    #[must_use]
    pub fn default_ticks(self) -> u32 {
        match self {
            DoorPhase::Unlocking => DOOR_UNLOCK_TICKS,
            DoorPhase::Holding => DOOR_HOLD_TICKS,
            DoorPhase::Locking => DOOR_LOCK_TICKS,
        }
    }

    /// Status text shown on the second display line during the phase.
    #[must_use]
    pub fn status_text(self) -> &'static str {
        match self {
            DoorPhase::Unlocking => "IS UNLOCKING",
            DoorPhase::Holding => "IS HOLDING",
            DoorPhase::Locking => "IS LOCKING",
        }
    }
}

impl fmt::Display for DoorPhase {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            DoorPhase::Unlocking => write!(f, "Unlocking"),
            DoorPhase::Holding => write!(f, "Holding"),
            DoorPhase::Locking => write!(f, "Locking"),
        }
    }
}
