//! The byte-at-a-time link contract and the protocol helpers built on it.
//!
//! # Blocking contract
//!
//! [`SerialLink::recv_byte`] waits for as long as it takes: a peer that never
//! answers stalls the caller forever, exactly like a UART receive loop. The
//! only way out is the transport closing ([`LinkError::Closed`]) or wrapping
//! the link in a [`TimeoutLink`](crate::TimeoutLink).
//!
//! The first byte of a payload is always read without a deadline
//! ([`SerialLink::recv_byte_untimed`]): a peer that announces a request
//! before its user has typed the digits must not be cut off. Once the first
//! digit is in, the rest are subject to the receive timeout again.
//!
//! # Pacing
//!
//! Payload digits are paced: the sender waits after every digit it writes
//! and the receiver waits after every digit it reads. The delay is passed in
//! by the node, which owns its configuration.

#![allow(async_fn_in_trait)]

use std::time::Duration;

use doorlock_core::{Credential, constants::CREDENTIAL_LEN};
use doorlock_protocol::{Command, Reply, Request};
use tracing::{debug, trace};

use crate::error::{LinkError, Result};

/// A half-duplex byte channel between the two nodes.
pub trait SerialLink: Send + Sync {
    /// Send one byte.
    ///
    /// # Errors
    ///
    /// Returns [`LinkError::Closed`] if the peer is gone.
    async fn send_byte(&mut self, byte: u8) -> Result<()>;

    /// Wait for the next byte.
    ///
    /// # Errors
    ///
    /// Returns [`LinkError::Closed`] if the peer is gone.
    async fn recv_byte(&mut self) -> Result<u8>;

    /// Wait for the next byte, ignoring any receive timeout the link has.
    async fn recv_byte_untimed(&mut self) -> Result<u8> {
        self.recv_byte().await
    }

    /// Drop every byte that has already arrived without waiting for more.
    ///
    /// Returns the number of bytes dropped.
    fn discard_pending(&mut self) -> usize;
}

async fn pace(delay: Duration) {
    if !delay.is_zero() {
        tokio::time::sleep(delay).await;
    }
}

/// Protocol-level operations available on every [`SerialLink`].
pub trait LinkExt: SerialLink {
    /// Send a bare command byte.
    async fn send_command(&mut self, command: Command) -> Result<()> {
        debug!(%command, "Sending command");
        self.send_byte(command.as_byte()).await
    }

    /// Send the five digits of `credential`, waiting `delay` after each.
    async fn send_payload(&mut self, credential: &Credential, delay: Duration) -> Result<()> {
        for byte in credential.to_ascii() {
            self.send_byte(byte).await?;
            pace(delay).await;
        }
        trace!("Payload sent");
        Ok(())
    }

    /// Send a command byte followed by its paced payload, if it has one.
    async fn send_request(&mut self, request: &Request, delay: Duration) -> Result<()> {
        self.send_command(request.command()).await?;
        if let Some(credential) = request.payload() {
            self.send_payload(credential, delay).await?;
        }
        Ok(())
    }

    /// Send a reply byte.
    async fn send_reply(&mut self, reply: Reply) -> Result<()> {
        debug!(%reply, "Sending reply");
        self.send_byte(reply.as_byte()).await
    }

    /// Read exactly five raw payload bytes, waiting `delay` after each.
    ///
    /// Bytes are returned as received; deciding what a non-digit means is
    /// up to the caller. The first byte has no deadline.
    async fn recv_payload(&mut self, delay: Duration) -> Result<[u8; CREDENTIAL_LEN]> {
        let mut payload = [0u8; CREDENTIAL_LEN];
        for (index, slot) in payload.iter_mut().enumerate() {
            *slot = if index == 0 {
                self.recv_byte_untimed().await?
            } else {
                self.recv_byte().await?
            };
            pace(delay).await;
        }
        trace!("Payload received");
        Ok(payload)
    }

    /// Wait for the reply to `command`.
    ///
    /// # Errors
    ///
    /// Returns [`LinkError::UnexpectedReply`] if the byte is not one of the
    /// replies `command` can receive.
    async fn recv_reply(&mut self, command: Command) -> Result<Reply> {
        let byte = self.recv_byte().await?;
        match Reply::parse(byte) {
            Ok(reply) if reply.answers() == command => {
                debug!(%reply, "Received reply");
                Ok(reply)
            }
            _ => Err(LinkError::UnexpectedReply { command, byte }),
        }
    }
}

impl<L: SerialLink + ?Sized> LinkExt for L {}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{MockLink, TimeoutLink};

    #[tokio::test(start_paused = true)]
    async fn test_send_request_paces_payload() {
        let (mut interface, mut control) = MockLink::pair();
        let request = Request::StageSlotB("90210".parse().unwrap());

        let start = tokio::time::Instant::now();
        interface
            .send_request(&request, Duration::from_millis(15))
            .await
            .unwrap();

        assert_eq!(start.elapsed(), Duration::from_millis(75));
        let mut wire = Vec::new();
        while let Some(byte) = control.try_recv_byte() {
            wire.push(byte);
        }
        assert_eq!(wire, b"P90210");
    }

    #[tokio::test(start_paused = true)]
    async fn test_send_request_without_payload() {
        let (mut interface, mut control) = MockLink::pair();
        interface
            .send_request(&Request::Commit, Duration::from_millis(15))
            .await
            .unwrap();

        assert_eq!(control.try_recv_byte(), Some(b'A'));
        assert_eq!(control.try_recv_byte(), None);
    }

    #[tokio::test(start_paused = true)]
    async fn test_first_payload_byte_outlasts_timeout() {
        let (mut interface, control) = MockLink::pair();
        let mut control = TimeoutLink::new(control, Some(Duration::from_secs(10)));

        let typist = async move {
            tokio::time::sleep(Duration::from_secs(12)).await;
            let credential: Credential = "12345".parse().unwrap();
            interface
                .send_payload(&credential, Duration::ZERO)
                .await
                .unwrap();
            interface
        };
        let (payload, _interface) = tokio::join!(control.recv_payload(Duration::ZERO), typist);

        assert_eq!(&payload.unwrap(), b"12345");
    }

    #[tokio::test(start_paused = true)]
    async fn test_stalled_payload_times_out_after_first_byte() {
        let (mut interface, control) = MockLink::pair();
        let mut control = TimeoutLink::new(control, Some(Duration::from_secs(1)));
        interface.send_byte(b'1').await.unwrap();

        let result = control.recv_payload(Duration::ZERO).await;

        assert!(matches!(result, Err(LinkError::Timeout(1000))));
    }

    #[tokio::test]
    async fn test_recv_reply_rejects_foreign_reply() {
        let (mut interface, mut control) = MockLink::pair();
        control.send_reply(Reply::Matched).await.unwrap();

        let result = interface.recv_reply(Command::BeginVerify).await;

        assert!(matches!(
            result,
            Err(LinkError::UnexpectedReply { command: Command::BeginVerify, byte: b'S' })
        ));
    }
}
