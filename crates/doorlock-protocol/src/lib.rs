//! Single-byte command protocol spoken between the Interface node and the
//! Control node.
//!
//! Every exchange starts with one command byte from the Interface node.
//! Commands that carry a credential are followed by exactly five raw digit
//! bytes. Commands that expect an answer receive exactly one reply byte.
//! There is no framing, checksum, or acknowledgement beyond that.

pub mod codec;
pub mod command;
pub mod request;

pub use codec::LinkCodec;
pub use command::{Command, Reply};
pub use request::Request;
