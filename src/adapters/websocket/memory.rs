//! In-process connector for tests and local development.
//!
//! Each successful connect creates a [`MemoryPeer`] standing in for the
//! server end of the socket. Tests pull peers with
//! [`MemoryConnector::accept`], push frames to the client and read the
//! frames the client sent.

use std::collections::VecDeque;
use std::sync::{Arc, Mutex, PoisonError};

use async_trait::async_trait;
use futures::channel::mpsc as frames;
use futures::{SinkExt, StreamExt};
use serde_json::Value as JsonValue;
use tokio::sync::mpsc;
use tokio::time::Instant;
use url::Url;

use crate::domain::realtime::Envelope;
use crate::ports::{Connector, Socket, TransportError};

/// How the next connect attempt behaves.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Scripted {
    Fail,
    Hang,
    BrokenWrites,
}

#[derive(Debug, Default)]
struct Script {
    next: VecDeque<Scripted>,
    refuse_all: bool,
    attempts: Vec<(Instant, Url)>,
}

/// Connector whose sockets are in-process channels.
#[derive(Clone)]
pub struct MemoryConnector {
    script: Arc<Mutex<Script>>,
    peers_tx: mpsc::UnboundedSender<MemoryPeer>,
    peers_rx: Arc<tokio::sync::Mutex<mpsc::UnboundedReceiver<MemoryPeer>>>,
}

impl MemoryConnector {
    pub fn new() -> Self {
        let (peers_tx, peers_rx) = mpsc::unbounded_channel();
        Self {
            script: Arc::new(Mutex::new(Script::default())),
            peers_tx,
            peers_rx: Arc::new(tokio::sync::Mutex::new(peers_rx)),
        }
    }

    fn script(&self) -> std::sync::MutexGuard<'_, Script> {
        self.script.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// The next `count` attempts fail immediately.
    pub fn fail_next(&self, count: usize) {
        let mut script = self.script();
        script.next.extend(std::iter::repeat(Scripted::Fail).take(count));
    }

    /// The next `count` attempts never complete.
    pub fn hang_next(&self, count: usize) {
        let mut script = self.script();
        script.next.extend(std::iter::repeat(Scripted::Hang).take(count));
    }

    /// The next `count` attempts open a socket on which every write fails.
    pub fn break_writes_next(&self, count: usize) {
        let mut script = self.script();
        script.next.extend(std::iter::repeat(Scripted::BrokenWrites).take(count));
    }

    /// While set, every attempt fails.
    pub fn refuse_all(&self, refuse: bool) {
        self.script().refuse_all = refuse;
    }

    /// Number of connect attempts made so far.
    pub fn attempt_count(&self) -> usize {
        self.script().attempts.len()
    }

    /// When each attempt started, on the tokio clock.
    pub fn attempt_times(&self) -> Vec<Instant> {
        self.script().attempts.iter().map(|(at, _)| *at).collect()
    }

    /// URL each attempt was made against.
    pub fn attempt_urls(&self) -> Vec<Url> {
        self.script().attempts.iter().map(|(_, url)| url.clone()).collect()
    }

    /// Waits for the next successfully opened socket.
    pub async fn accept(&self) -> Option<MemoryPeer> {
        self.peers_rx.lock().await.recv().await
    }

    /// Returns an already opened socket, if any, without waiting.
    pub async fn try_accept(&self) -> Option<MemoryPeer> {
        self.peers_rx.lock().await.try_recv().ok()
    }
}

impl Default for MemoryConnector {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl Connector for MemoryConnector {
    async fn connect(&self, url: &Url) -> Result<Socket, TransportError> {
        let scripted = {
            let mut script = self.script();
            script.attempts.push((Instant::now(), url.clone()));
            if script.refuse_all {
                Some(Scripted::Fail)
            } else {
                script.next.pop_front()
            }
        };

        match scripted {
            Some(Scripted::Fail) => {
                return Err(TransportError::ConnectFailed("connection refused".to_string()))
            }
            Some(Scripted::Hang) => futures::future::pending::<()>().await,
            Some(Scripted::BrokenWrites) => {
                let (client_tx, _) = frames::unbounded::<String>();
                let sink = client_tx.sink_map_err(|_| TransportError::Closed);
                let stream = futures::stream::pending::<Result<String, TransportError>>();
                return Ok(Socket::new(Box::pin(sink), stream.boxed()));
            }
            None => {}
        }

        let (client_tx, server_rx) = frames::unbounded::<String>();
        let (server_tx, client_rx) = frames::unbounded::<Result<String, TransportError>>();

        let peer = MemoryPeer {
            url: url.clone(),
            to_client: Some(server_tx),
            from_client: server_rx,
        };
        self.peers_tx
            .send(peer)
            .map_err(|_| TransportError::ConnectFailed("connector dropped".to_string()))?;

        let sink = client_tx.sink_map_err(|_| TransportError::Closed);
        Ok(Socket::new(Box::pin(sink), client_rx.boxed()))
    }
}

/// Server end of an in-process socket.
pub struct MemoryPeer {
    url: Url,
    to_client: Option<frames::UnboundedSender<Result<String, TransportError>>>,
    from_client: frames::UnboundedReceiver<String>,
}

impl MemoryPeer {
    /// URL the client connected to.
    pub fn url(&self) -> &Url {
        &self.url
    }

    /// Pushes a raw text frame to the client.
    pub fn push(&self, frame: impl Into<String>) {
        if let Some(tx) = &self.to_client {
            let _ = tx.unbounded_send(Ok(frame.into()));
        }
    }

    /// Pushes an `{event, payload}` frame to the client.
    pub fn push_event(&self, event: &str, payload: JsonValue) {
        if let Ok(frame) = Envelope::new(event, payload).to_frame() {
            self.push(frame);
        }
    }

    /// Fails the client's stream with an error.
    pub fn fail(&self, error: TransportError) {
        if let Some(tx) = &self.to_client {
            let _ = tx.unbounded_send(Err(error));
        }
    }

    /// Closes the server side; the client sees the stream end.
    pub fn close(&mut self) {
        self.to_client = None;
    }

    /// Next frame the client sent, or `None` once the client closed its side.
    pub async fn next_frame(&mut self) -> Option<String> {
        self.from_client.next().await
    }

    /// Next frame the client sent, parsed as an envelope.
    pub async fn next_envelope(&mut self) -> Option<Envelope> {
        let frame = self.next_frame().await?;
        Envelope::parse(&frame).ok()
    }
}

impl std::fmt::Debug for MemoryPeer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MemoryPeer")
            .field("url", &self.url.as_str())
            .field("open", &self.to_client.is_some())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn url() -> Url {
        Url::parse("ws://memory/ws").unwrap()
    }

    #[tokio::test]
    async fn frames_flow_both_ways() {
        let connector = MemoryConnector::new();
        let mut socket = connector.connect(&url()).await.unwrap();
        let mut peer = connector.accept().await.unwrap();

        socket.sink.send("hello".to_string()).await.unwrap();
        assert_eq!(peer.next_frame().await.as_deref(), Some("hello"));

        peer.push_event("inbox_created", json!({"id": "i1", "name": "Web"}));
        let frame = socket.stream.next().await.unwrap().unwrap();
        assert_eq!(Envelope::parse(&frame).unwrap().event(), "inbox_created");

        peer.close();
        assert!(socket.stream.next().await.is_none());
    }

    #[tokio::test]
    async fn scripted_failures_are_consumed_in_order() {
        let connector = MemoryConnector::new();
        connector.fail_next(2);

        assert!(connector.connect(&url()).await.is_err());
        assert!(connector.connect(&url()).await.is_err());
        assert!(connector.connect(&url()).await.is_ok());
        assert_eq!(connector.attempt_count(), 3);
    }

    #[tokio::test]
    async fn broken_socket_rejects_writes() {
        let connector = MemoryConnector::new();
        connector.break_writes_next(1);

        let mut socket = connector.connect(&url()).await.unwrap();
        assert!(matches!(
            socket.sink.send("hello".to_string()).await,
            Err(TransportError::Closed)
        ));
        assert!(connector.try_accept().await.is_none());
    }

    #[tokio::test]
    async fn dropping_client_socket_is_visible_to_peer() {
        let connector = MemoryConnector::new();
        let socket = connector.connect(&url()).await.unwrap();
        let mut peer = connector.accept().await.unwrap();

        drop(socket);
        assert!(peer.next_frame().await.is_none());
    }
}
