//! In-memory link pair for tests and single-process demos.

use tokio::sync::mpsc;

use crate::{LinkError, Result, SerialLink};

/// One end of an in-memory null-modem cable.
///
/// Bytes sent on one end arrive in order on the other. Dropping an end
/// closes the link: the survivor's `recv_byte` drains what is buffered and
/// then fails with [`LinkError::Closed`].
///
/// # Example
///
/// ```
/// use doorlock_link::{MockLink, SerialLink};
///
/// # #[tokio::main(flavor = "current_thread")]
/// # async fn main() -> doorlock_link::Result<()> {
/// let (mut interface, mut control) = MockLink::pair();
/// interface.send_byte(b'Q').await?;
/// assert_eq!(control.recv_byte().await?, b'Q');
/// # Ok(())
/// # }
/// ```
#[derive(Debug)]
pub struct MockLink {
    tx: mpsc::UnboundedSender<u8>,
    rx: mpsc::UnboundedReceiver<u8>,
}

impl MockLink {
    /// Create two connected ends.
    pub fn pair() -> (MockLink, MockLink) {
        let (a_tx, b_rx) = mpsc::unbounded_channel();
        let (b_tx, a_rx) = mpsc::unbounded_channel();
        (
            MockLink { tx: a_tx, rx: a_rx },
            MockLink { tx: b_tx, rx: b_rx },
        )
    }

    /// Take a byte that is already buffered, without waiting.
    pub fn try_recv_byte(&mut self) -> Option<u8> {
        self.rx.try_recv().ok()
    }
}

impl SerialLink for MockLink {
    async fn send_byte(&mut self, byte: u8) -> Result<()> {
        self.tx.send(byte).map_err(|_| LinkError::Closed)
    }

    async fn recv_byte(&mut self) -> Result<u8> {
        self.rx.recv().await.ok_or(LinkError::Closed)
    }

    fn discard_pending(&mut self) -> usize {
        let mut dropped = 0;
        while self.rx.try_recv().is_ok() {
            dropped += 1;
        }
        dropped
    }
}
