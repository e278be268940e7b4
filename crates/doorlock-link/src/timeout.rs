//! Optional receive timeout.
//!
//! The link blocks forever by default. Wrapping it in [`TimeoutLink`] with a
//! duration turns a silent peer into [`LinkError::Timeout`] instead. Sends
//! are never timed out, and neither is
//! [`recv_byte_untimed`](SerialLink::recv_byte_untimed).

use std::time::Duration;

use tracing::warn;

use crate::{LinkError, Result, SerialLink};

/// A link whose receives give up after a deadline.
#[derive(Debug)]
pub struct TimeoutLink<L> {
    inner: L,
    timeout: Option<Duration>,
}

impl<L: SerialLink> TimeoutLink<L> {
    /// Wrap `inner`. `None` keeps the blocking behaviour.
    pub fn new(inner: L, timeout: Option<Duration>) -> Self {
        Self { inner, timeout }
    }

    pub fn timeout(&self) -> Option<Duration> {
        self.timeout
    }

    pub fn get_mut(&mut self) -> &mut L {
        &mut self.inner
    }

    pub fn into_inner(self) -> L {
        self.inner
    }
}

impl<L: SerialLink> SerialLink for TimeoutLink<L> {
    async fn send_byte(&mut self, byte: u8) -> Result<()> {
        self.inner.send_byte(byte).await
    }

    async fn recv_byte(&mut self) -> Result<u8> {
        let Some(timeout) = self.timeout else {
            return self.inner.recv_byte().await;
        };

        match tokio::time::timeout(timeout, self.inner.recv_byte()).await {
            Ok(result) => result,
            Err(_) => {
                let ms = u64::try_from(timeout.as_millis()).unwrap_or(u64::MAX);
                warn!("Receive timeout after {}ms", ms);
                Err(LinkError::Timeout(ms))
            }
        }
    }

    async fn recv_byte_untimed(&mut self) -> Result<u8> {
        self.inner.recv_byte_untimed().await
    }

    fn discard_pending(&mut self) -> usize {
        self.inner.discard_pending()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::MockLink;

    #[tokio::test(start_paused = true)]
    async fn test_timeout_fires_on_silent_peer() {
        let (a, _b) = MockLink::pair();
        let mut link = TimeoutLink::new(a, Some(Duration::from_millis(250)));

        let start = tokio::time::Instant::now();
        let result = link.recv_byte().await;

        assert!(matches!(result, Err(LinkError::Timeout(250))));
        assert_eq!(start.elapsed(), Duration::from_millis(250));
    }

    #[tokio::test(start_paused = true)]
    async fn test_no_timeout_waits_for_late_byte() {
        let (a, mut b) = MockLink::pair();
        let mut link = TimeoutLink::new(a, None);

        tokio::spawn(async move {
            tokio::time::sleep(Duration::from_secs(3600)).await;
            b.send_byte(b'W').await.unwrap();
        });

        assert_eq!(link.recv_byte().await.unwrap(), b'W');
    }

    #[tokio::test(start_paused = true)]
    async fn test_byte_within_deadline_passes_through() {
        let (a, mut b) = MockLink::pair();
        let mut link = TimeoutLink::new(a, Some(Duration::from_secs(1)));

        b.send_byte(b'T').await.unwrap();
        assert_eq!(link.recv_byte().await.unwrap(), b'T');
        assert_eq!(link.timeout(), Some(Duration::from_secs(1)));
    }

    #[tokio::test(start_paused = true)]
    async fn test_untimed_receive_ignores_deadline() {
        let (a, mut b) = MockLink::pair();
        let mut link = TimeoutLink::new(a, Some(Duration::from_millis(250)));

        tokio::spawn(async move {
            tokio::time::sleep(Duration::from_secs(30)).await;
            b.send_byte(b'7').await.unwrap();
        });

        assert_eq!(link.recv_byte_untimed().await.unwrap(), b'7');
    }

    #[tokio::test]
    async fn test_discard_reaches_inner_link() {
        let (a, mut b) = MockLink::pair();
        let mut link = TimeoutLink::new(a, Some(Duration::from_secs(1)));
        b.send_byte(b'T').await.unwrap();

        assert_eq!(link.discard_pending(), 1);
        assert_eq!(link.get_mut().try_recv_byte(), None);
    }
}
