//! Tokio codec for the byte-at-a-time link.
//!
//! The protocol has no frames: every item on the wire is one byte and its
//! meaning depends on where the receiver is in its state machine. The codec
//! therefore decodes single bytes and leaves interpretation to the nodes.
//! It lets any `AsyncRead + AsyncWrite` transport (serial adapter, TCP
//! socket, in-memory duplex) be wrapped in `Framed` and used as a
//! `Stream`/`Sink` of bytes.
//!
//! # Architecture
//!
//! ```text
//! Transport -> Decoder -> u8 -> node state machine
//! node state machine -> u8 -> Encoder -> Transport
//! ```
//!
//! # Example
//!
//! ```
//! use bytes::BytesMut;
//! use tokio_util::codec::{Decoder, Encoder};
//! use doorlock_protocol::{Command, LinkCodec};
//!
//! let mut codec = LinkCodec::new();
//! let mut buffer = BytesMut::new();
//! codec.encode(Command::QueryCredentialSet.as_byte(), &mut buffer).unwrap();
//!
//! assert_eq!(codec.decode(&mut buffer).unwrap(), Some(b'Q'));
//! assert_eq!(codec.decode(&mut buffer).unwrap(), None);
//! ```

use std::io;

use bytes::{Buf, BufMut, BytesMut};
use tokio_util::codec::{Decoder, Encoder};

/// Single-byte codec for the door lock link.
#[derive(Debug, Clone, Copy, Default)]
pub struct LinkCodec;

impl LinkCodec {
    pub fn new() -> Self {
        Self
    }
}

impl Decoder for LinkCodec {
    type Item = u8;
    type Error = io::Error;

    /// Yield the oldest buffered byte, or `None` when the buffer is empty.
    fn decode(&mut self, src: &mut BytesMut) -> io::Result<Option<u8>> {
        if src.has_remaining() {
            Ok(Some(src.get_u8()))
        } else {
            Ok(None)
        }
    }
}

impl Encoder<u8> for LinkCodec {
    type Error = io::Error;

    fn encode(&mut self, item: u8, dst: &mut BytesMut) -> io::Result<()> {
        dst.put_u8(item);
        Ok(())
    }
}
