//! Link over any byte stream.
//!
//! Wraps an `AsyncRead + AsyncWrite` transport (a serial adapter, a TCP
//! socket, an in-memory duplex) in `Framed<_, LinkCodec>`.
//!
//! ```text
//! Node ──> StreamLink ──> Framed<S, LinkCodec> ──> S
//! ```

use futures::{FutureExt, SinkExt, StreamExt};
use tokio::io::{AsyncRead, AsyncWrite};
use tokio_util::codec::Framed;
use tracing::{debug, trace, warn};

use doorlock_protocol::LinkCodec;

use crate::{LinkError, Result, SerialLink};

/// [`SerialLink`] over a framed byte stream.
#[derive(Debug)]
pub struct StreamLink<S> {
    framed: Framed<S, LinkCodec>,
}

impl<S> StreamLink<S>
where
    S: AsyncRead + AsyncWrite + Unpin,
{
    pub fn new(stream: S) -> Self {
        Self {
            framed: Framed::new(stream, LinkCodec::new()),
        }
    }

    /// Unwrap the transport. Bytes already read but not yet consumed are
    /// lost.
    pub fn into_inner(self) -> S {
        self.framed.into_inner()
    }
}

impl<S> SerialLink for StreamLink<S>
where
    S: AsyncRead + AsyncWrite + Unpin + Send + Sync,
{
    async fn send_byte(&mut self, byte: u8) -> Result<()> {
        trace!(byte, "TX");
        self.framed.send(byte).await.map_err(|e| {
            warn!("Send failed: {}", e);
            LinkError::from(e)
        })
    }

    async fn recv_byte(&mut self) -> Result<u8> {
        match self.framed.next().await {
            Some(Ok(byte)) => {
                trace!(byte, "RX");
                Ok(byte)
            }
            Some(Err(e)) => Err(e.into()),
            None => Err(LinkError::Closed),
        }
    }

    /// Takes whatever the codec has buffered plus anything the transport
    /// can hand over without blocking. Errors and end of stream are left
    /// for the next `recv_byte`.
    fn discard_pending(&mut self) -> usize {
        let mut dropped = 0;
        while let Some(Some(Ok(byte))) = self.framed.next().now_or_never() {
            debug!(byte, "Discarded");
            dropped += 1;
        }
        dropped
    }
}
