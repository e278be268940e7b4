//! Serial link between the Interface and Control nodes.
//!
//! The wire is a plain byte stream: one command byte, optionally five
//! payload digits, optionally one reply byte. This crate provides the
//! [`SerialLink`] contract both nodes are written against and several ways
//! to satisfy it:
//!
//! - [`StreamLink`]: any `AsyncRead + AsyncWrite`, framed with
//!   [`LinkCodec`](doorlock_protocol::LinkCodec)
//! - [`tcp`]: TCP sockets standing in for the serial cable
//! - [`MockLink`]: an in-memory pair for tests
//! - [`TimeoutLink`]: optional receive deadline around any of the above
//!
//! Protocol helpers (send a command, a paced payload, wait for a reply)
//! come from the blanket [`LinkExt`] trait.

pub mod config;
pub mod error;
pub mod link;
pub mod mock;
pub mod stream;
pub mod tcp;
pub mod timeout;

pub use config::LinkConfig;
pub use error::{LinkError, Result};
pub use link::{LinkExt, SerialLink};
pub use mock::MockLink;
pub use stream::StreamLink;
pub use tcp::{LinkListener, TcpLink};
pub use timeout::TimeoutLink;
