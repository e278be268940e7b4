//! TCP as a stand-in for the serial cable.
//!
//! The Control node listens and serves one Interface node at a time; the
//! Interface node connects. Both ends get a [`TimeoutLink`] configured from
//! [`LinkConfig`], which blocks forever unless a receive timeout is set.

use std::net::SocketAddr;

use tokio::net::{TcpListener, TcpStream, ToSocketAddrs};
use tracing::{error, info, warn};

use crate::{LinkConfig, LinkError, Result, StreamLink, TimeoutLink};

/// A TCP-backed link as handed to a node.
pub type TcpLink = TimeoutLink<StreamLink<TcpStream>>;

fn wrap(stream: TcpStream, config: &LinkConfig) -> TcpLink {
    // Single bytes must not sit in Nagle's buffer.
    if let Err(e) = stream.set_nodelay(true) {
        warn!("Failed to set TCP_NODELAY: {}", e);
    }
    TimeoutLink::new(StreamLink::new(stream), config.recv_timeout())
}

/// Connect to a listening Control node.
///
/// # Errors
///
/// Returns [`LinkError::Timeout`] if the connection is not established
/// within `config.connect_timeout_ms`, or an I/O error if it is refused.
pub async fn connect(addr: impl ToSocketAddrs, config: &LinkConfig) -> Result<TcpLink> {
    let timeout = config.connect_timeout();
    match tokio::time::timeout(timeout, TcpStream::connect(addr)).await {
        Ok(Ok(stream)) => {
            if let Ok(peer) = stream.peer_addr() {
                info!("Connected to {}", peer);
            }
            Ok(wrap(stream, config))
        }
        Ok(Err(e)) => {
            error!("Connection failed: {}", e);
            Err(e.into())
        }
        Err(_) => {
            warn!("Connection timeout after {}ms", config.connect_timeout_ms);
            Err(LinkError::Timeout(config.connect_timeout_ms))
        }
    }
}

/// Listening end of the link.
#[derive(Debug)]
pub struct LinkListener {
    listener: TcpListener,
    config: LinkConfig,
}

impl LinkListener {
    /// Bind to `addr`.
    pub async fn bind(addr: impl ToSocketAddrs, config: LinkConfig) -> Result<Self> {
        let listener = TcpListener::bind(addr).await?;
        info!("Listening on {}", listener.local_addr()?);
        Ok(Self { listener, config })
    }

    pub fn local_addr(&self) -> Result<SocketAddr> {
        Ok(self.listener.local_addr()?)
    }

    /// Wait for the next Interface node to connect.
    pub async fn accept(&self) -> Result<(TcpLink, SocketAddr)> {
        let (stream, peer) = self.listener.accept().await?;
        info!("Accepted link from {}", peer);
        Ok((wrap(stream, &self.config), peer))
    }
}
