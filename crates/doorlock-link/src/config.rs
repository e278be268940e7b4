use std::time::Duration;

use serde::{Deserialize, Serialize};

/// Transport settings shared by both nodes.
///
/// # Example
///
/// ```
/// use doorlock_link::LinkConfig;
///
/// let config = LinkConfig::default();
/// assert_eq!(config.recv_timeout(), None);
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LinkConfig {
    /// Give up on a receive after this many milliseconds. `None` blocks
    /// forever.
    pub recv_timeout_ms: Option<u64>,

    /// Timeout for establishing a TCP connection.
    pub connect_timeout_ms: u64,
}

impl Default for LinkConfig {
    fn default() -> Self {
        Self {
            recv_timeout_ms: None,
            connect_timeout_ms: 3000,
        }
    }
}

impl LinkConfig {
    pub fn recv_timeout(&self) -> Option<Duration> {
        self.recv_timeout_ms.map(Duration::from_millis)
    }

    pub fn connect_timeout(&self) -> Duration {
        Duration::from_millis(self.connect_timeout_ms)
    }
}
