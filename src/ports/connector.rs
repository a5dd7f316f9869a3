//! Connector port - Interface for opening the raw persistent socket.
//!
//! The transport only needs a way to open a socket that exchanges text
//! frames. Production uses a WebSocket adapter; tests use an in-process
//! peer.

use std::pin::Pin;
use std::time::Duration;

use async_trait::async_trait;
use futures::stream::BoxStream;
use futures::Sink;
use thiserror::Error;
use url::Url;

/// Errors raised by socket adapters.
#[derive(Debug, Clone, Error)]
pub enum TransportError {
    #[error("Connection failed: {0}")]
    ConnectFailed(String),

    #[error("Connection attempt timed out after {0:?}")]
    Timeout(Duration),

    #[error("Connection closed")]
    Closed,

    #[error("Protocol error: {0}")]
    Protocol(String),
}

/// Outgoing half of a socket: accepts text frames.
pub type FrameSink = Pin<Box<dyn Sink<String, Error = TransportError> + Send>>;

/// Incoming half of a socket: yields text frames until the peer closes.
pub type FrameStream = BoxStream<'static, Result<String, TransportError>>;

/// An open socket split into its two halves.
pub struct Socket {
    pub sink: FrameSink,
    pub stream: FrameStream,
}

impl Socket {
    pub fn new(sink: FrameSink, stream: FrameStream) -> Self {
        Self { sink, stream }
    }
}

impl std::fmt::Debug for Socket {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Socket").finish_non_exhaustive()
    }
}

/// Port for opening sockets.
#[async_trait]
pub trait Connector: Send + Sync {
    /// Open a socket to `url`. Resolves once the connection is open.
    async fn connect(&self, url: &Url) -> Result<Socket, TransportError>;
}
