//! Shared building blocks for the two-node door lock.
//!
//! Both the Interface node and the Control node depend on this crate for the
//! credential types, the fixed timing constants, the error type, and the tick
//! based timing service.

pub mod constants;
pub mod error;
pub mod tick;
pub mod types;

pub use error::{Error, Result};
pub use tick::{TickCounter, Ticker, TickerGuard};
pub use types::*;

/// Version info
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
