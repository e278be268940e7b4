//! A command together with its digit payload.
//!
//! # Examples
//!
//! ```
//! use doorlock_protocol::{Command, Request};
//!
//! let request = Request::Verify("12345".parse().unwrap());
//! assert_eq!(request.command(), Command::BeginVerify);
//! assert_eq!(request.payload().map(|c| c.to_ascii()), Some(*b"12345"));
//! ```

use doorlock_core::Credential;
use serde::{Deserialize, Serialize};

use crate::Command;

/// One complete request as the Interface node issues it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Request {
    QueryCredentialSet,
    Verify(Credential),
    Open,
    Alarm,
    StageSlotA(Credential),
    StageSlotB(Credential),
    Commit,
}

impl Request {
    /// The command byte that starts this request.
    pub fn command(&self) -> Command {
        match self {
            Request::QueryCredentialSet => Command::QueryCredentialSet,
            Request::Verify(_) => Command::BeginVerify,
            Request::Open => Command::ActuateOpen,
            Request::Alarm => Command::ActuateAlarm,
            Request::StageSlotA(_) => Command::StageSlotA,
            Request::StageSlotB(_) => Command::StageSlotB,
            Request::Commit => Command::CommitIfMatched,
        }
    }

    /// The digit payload, if the command carries one.
    pub fn payload(&self) -> Option<&Credential> {
        match self {
            Request::Verify(credential)
            | Request::StageSlotA(credential)
            | Request::StageSlotB(credential) => Some(credential),
            _ => None,
        }
    }
}
