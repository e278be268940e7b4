//! Command and reply codes.
//!
//! # Wire Format
//!
//! Each code is one ASCII letter:
//!
//! | Code | Direction | Meaning |
//! |------|-----------|---------|
//! | `Q` | I→C | Is credential set? |
//! | `W` | C→I | Yes, set |
//! | `E` | C→I | No, not set |
//! | `R` | I→C | Begin verify; 5 digit bytes follow |
//! | `T` | C→I | Verify: correct |
//! | `Y` | C→I | Verify: incorrect |
//! | `U` | I→C | Actuate door open sequence |
//! | `I` | I→C | Actuate alarm |
//! | `O` | I→C | Stage slot A; 5 digit bytes follow |
//! | `P` | I→C | Stage slot B; 5 digit bytes follow |
//! | `A` | I→C | Commit if matched |
//! | `S` | C→I | Committed: matched |
//! | `D` | C→I | Committed: unmatched |
//!
//! # Examples
//!
//! ```
//! use doorlock_protocol::{Command, Reply};
//!
//! let command = Command::try_from(b'R').unwrap();
//! assert_eq!(command, Command::BeginVerify);
//! assert!(command.has_payload());
//!
//! assert_eq!(Reply::Correct.as_byte(), b'T');
//! assert!(Command::try_from(b'Z').is_err());
//! ```

use doorlock_core::{Error, Result};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Request codes sent by the Interface node.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Command {
    QueryCredentialSet, // Q
    BeginVerify,        // R
    ActuateOpen,        // U
    ActuateAlarm,       // I
    StageSlotA,         // O
    StageSlotB,         // P
    CommitIfMatched,    // A
}

impl Command {
    /// Every command, in wire-table order.
    pub const ALL: [Command; 7] = [
        Command::QueryCredentialSet,
        Command::BeginVerify,
        Command::ActuateOpen,
        Command::ActuateAlarm,
        Command::StageSlotA,
        Command::StageSlotB,
        Command::CommitIfMatched,
    ];

    pub fn parse(byte: u8) -> Result<Self> {
        match byte {
            b'Q' => Ok(Command::QueryCredentialSet),
            b'R' => Ok(Command::BeginVerify),
            b'U' => Ok(Command::ActuateOpen),
            b'I' => Ok(Command::ActuateAlarm),
            b'O' => Ok(Command::StageSlotA),
            b'P' => Ok(Command::StageSlotB),
            b'A' => Ok(Command::CommitIfMatched),
            _ => Err(Error::UnknownCommand { byte }),
        }
    }

    pub fn as_byte(self) -> u8 {
        match self {
            Command::QueryCredentialSet => b'Q',
            Command::BeginVerify => b'R',
            Command::ActuateOpen => b'U',
            Command::ActuateAlarm => b'I',
            Command::StageSlotA => b'O',
            Command::StageSlotB => b'P',
            Command::CommitIfMatched => b'A',
        }
    }

    /// Returns `true` if five digit bytes follow the command byte.
    #[inline]
    pub fn has_payload(self) -> bool {
        matches!(
            self,
            Command::BeginVerify | Command::StageSlotA | Command::StageSlotB
        )
    }

    /// Returns `true` if the Control node answers with one reply byte.
    ///
    /// `ActuateOpen`, `ActuateAlarm`, and the two staging commands are
    /// fire-and-forget.
    #[inline]
    pub fn expects_reply(self) -> bool {
        matches!(
            self,
            Command::QueryCredentialSet | Command::BeginVerify | Command::CommitIfMatched
        )
    }

    /// The negative reply to this command, if it expects a reply at all.
    pub fn negative_reply(self) -> Option<Reply> {
        match self {
            Command::QueryCredentialSet => Some(Reply::NotSet),
            Command::BeginVerify => Some(Reply::Incorrect),
            Command::CommitIfMatched => Some(Reply::Unmatched),
            _ => None,
        }
    }
}

impl TryFrom<u8> for Command {
    type Error = Error;

    fn try_from(byte: u8) -> Result<Self> {
        Command::parse(byte)
    }
}

impl From<Command> for u8 {
    fn from(command: Command) -> u8 {
        command.as_byte()
    }
}

impl fmt::Display for Command {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:?} ({})", self, char::from(self.as_byte()))
    }
}

/// Reply codes sent by the Control node.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Reply {
    Set,       // W
    NotSet,    // E
    Correct,   // T
    Incorrect, // Y
    Matched,   // S
    Unmatched, // D
}

impl Reply {
    /// Every reply, in wire-table order.
    pub const ALL: [Reply; 6] = [
        Reply::Set,
        Reply::NotSet,
        Reply::Correct,
        Reply::Incorrect,
        Reply::Matched,
        Reply::Unmatched,
    ];

    pub fn parse(byte: u8) -> Result<Self> {
        match byte {
            b'W' => Ok(Reply::Set),
            b'E' => Ok(Reply::NotSet),
            b'T' => Ok(Reply::Correct),
            b'Y' => Ok(Reply::Incorrect),
            b'S' => Ok(Reply::Matched),
            b'D' => Ok(Reply::Unmatched),
            _ => Err(Error::UnknownReply { byte }),
        }
    }

    pub fn as_byte(self) -> u8 {
        match self {
            Reply::Set => b'W',
            Reply::NotSet => b'E',
            Reply::Correct => b'T',
            Reply::Incorrect => b'Y',
            Reply::Matched => b'S',
            Reply::Unmatched => b'D',
        }
    }

    /// The command this reply answers.
    pub fn answers(self) -> Command {
        match self {
            Reply::Set | Reply::NotSet => Command::QueryCredentialSet,
            Reply::Correct | Reply::Incorrect => Command::BeginVerify,
            Reply::Matched | Reply::Unmatched => Command::CommitIfMatched,
        }
    }

    /// Returns `true` for the positive outcome of its command.
    #[inline]
    pub fn is_positive(self) -> bool {
        matches!(self, Reply::Set | Reply::Correct | Reply::Matched)
    }
}

impl TryFrom<u8> for Reply {
    type Error = Error;

    fn try_from(byte: u8) -> Result<Self> {
        Reply::parse(byte)
    }
}

impl From<Reply> for u8 {
    fn from(reply: Reply) -> u8 {
        reply.as_byte()
    }
}

impl fmt::Display for Reply {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:?} ({})", self, char::from(self.as_byte()))
    }
}
