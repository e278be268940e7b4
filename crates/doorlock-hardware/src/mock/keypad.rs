//! Mock keypad driven through a channel.

use crate::{
    HardwareError, Result,
    traits::{Key, KeypadDevice},
};
use tokio::sync::mpsc;

const KEY_QUEUE_DEPTH: usize = 64;

/// Mock keypad device for testing and development.
///
/// Key presses are queued through a [`MockKeypadHandle`]. Once every handle
/// is dropped and the queue drains, `read_key` reports the keypad as
/// disconnected.
///
/// # Examples
///
/// ```
/// use doorlock_hardware::mock::MockKeypad;
/// use doorlock_hardware::traits::{Key, KeypadDevice};
///
/// #[tokio::main]
/// async fn main() -> doorlock_hardware::Result<()> {
///     let (mut keypad, handle) = MockKeypad::new();
///
///     handle.send_entry("42").await?;
///
///     assert_eq!(keypad.read_key().await?.as_char(), '4');
///     assert_eq!(keypad.read_key().await?.as_char(), '2');
///     assert_eq!(keypad.read_key().await?, Key::Equals);
///     Ok(())
/// }
/// ```
#[derive(Debug)]
pub struct MockKeypad {
    key_rx: mpsc::Receiver<Key>,
}

impl MockKeypad {
    /// Create a new mock keypad and the handle that presses its keys.
    pub fn new() -> (Self, MockKeypadHandle) {
        let (key_tx, key_rx) = mpsc::channel(KEY_QUEUE_DEPTH);
        (Self { key_rx }, MockKeypadHandle { key_tx })
    }
}

impl KeypadDevice for MockKeypad {
    async fn read_key(&mut self) -> Result<Key> {
        self.key_rx
            .recv()
            .await
            .ok_or_else(|| HardwareError::disconnected("Keypad input channel closed"))
    }
}

/// Handle for pressing keys on a [`MockKeypad`].
#[derive(Debug, Clone)]
pub struct MockKeypadHandle {
    key_tx: mpsc::Sender<Key>,
}

impl MockKeypadHandle {
    /// Press a single key.
    ///
    /// # Errors
    ///
    /// Returns an error if the keypad has been dropped.
    pub async fn send_key(&self, key: Key) -> Result<()> {
        self.key_tx
            .send(key)
            .await
            .map_err(|_| HardwareError::disconnected("Keypad input channel closed"))
    }

    /// Press each key whose legend appears in `keys`, in order.
    pub async fn send_keys(&self, keys: &str) -> Result<()> {
        for c in keys.chars() {
            self.send_key(Key::from_char(c)).await?;
        }
        Ok(())
    }

    /// Type `digits` and confirm with `=`.
    pub async fn send_entry(&self, digits: &str) -> Result<()> {
        self.send_keys(digits).await?;
        self.send_key(Key::Equals).await
    }
}
