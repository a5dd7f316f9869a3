//! Transport - owner of the single persistent connection.
//!
//! A [`Transport`] is a cloneable handle to a worker task. The worker owns
//! the socket, the subscription set, the outbox and the retry timer, and is
//! the only writer of any of them. Handle methods enqueue a command and
//! return immediately.
//!
//! # Lifecycle
//!
//! ```text
//! connect()        open              peer closes / errors
//! Idle ──────► Connecting ──────► Open ─────────────────────┐
//!   ▲               │  ▲                                    │
//!   │ disconnect()  │  └──── retry timer fires ◄────────────┘
//!   └───────────────┤
//!                   └──► Lost (retries exhausted)
//! ```
//!
//! Every successful open sends, in order: `join`, one `subscribe` per
//! desired topic, then the frames queued while connecting.

use std::collections::VecDeque;
use std::sync::Arc;
use std::time::Duration;

use futures::future::{self, BoxFuture};
use futures::{FutureExt, SinkExt, StreamExt};
use tokio::sync::{mpsc, watch};
use tokio::time::Instant;
use url::Url;

use crate::adapters::events::EventRouter;
use crate::domain::foundation::StateMachine;
use crate::domain::realtime::{
    ConnectionState, ConnectionStatus, Delivery, OutboundEvent, ReconnectPolicy, SessionIdentity,
    SubscriptionSet, Topic,
};
use crate::ports::{Connector, Socket, TransportError};

/// Settings the transport runs with.
#[derive(Debug, Clone)]
pub struct TransportOptions {
    /// Base WebSocket URL; identity query parameters are added per connect.
    pub url: Url,

    /// Upper bound for a single connect attempt.
    pub connect_timeout: Duration,

    /// Frames buffered while reconnecting; oldest dropped beyond this.
    pub outbox_capacity: usize,

    pub reconnect: ReconnectPolicy,
}

impl TransportOptions {
    pub fn new(url: Url) -> Self {
        Self {
            url,
            connect_timeout: Duration::from_secs(10),
            outbox_capacity: 100,
            reconnect: ReconnectPolicy::default(),
        }
    }

    pub fn with_reconnect(mut self, reconnect: ReconnectPolicy) -> Self {
        self.reconnect = reconnect;
        self
    }

    pub fn with_connect_timeout(mut self, connect_timeout: Duration) -> Self {
        self.connect_timeout = connect_timeout;
        self
    }

    pub fn with_outbox_capacity(mut self, outbox_capacity: usize) -> Self {
        self.outbox_capacity = outbox_capacity;
        self
    }
}

#[derive(Debug)]
enum Command {
    Connect(SessionIdentity),
    Disconnect,
    Send(OutboundEvent),
    Subscribe(Topic),
    Unsubscribe(Topic),
    ClearSubscriptions,
}

/// Handle to the transport worker.
///
/// Cloning is cheap; the worker stops (closing any open socket) once every
/// handle has been dropped.
#[derive(Debug, Clone)]
pub struct Transport {
    commands: mpsc::UnboundedSender<Command>,
    status: watch::Receiver<ConnectionStatus>,
}

impl Transport {
    /// Spawns the worker on the current tokio runtime.
    pub fn spawn(
        options: TransportOptions,
        connector: Arc<dyn Connector>,
        router: Arc<EventRouter>,
    ) -> Self {
        let (commands, command_rx) = mpsc::unbounded_channel();
        let (status_tx, status) = watch::channel(ConnectionStatus::default());

        let worker = Worker {
            options,
            connector,
            router,
            status_tx,
            state: ConnectionState::Idle,
            failures: 0,
            identity: None,
            subscriptions: SubscriptionSet::new(),
            outbox: VecDeque::new(),
            socket: None,
            pending: None,
            retry_at: None,
        };
        tokio::spawn(worker.run(command_rx));

        Self { commands, status }
    }

    /// Starts connecting. No-op while already connecting or open.
    pub fn connect(&self, identity: SessionIdentity) {
        self.command(Command::Connect(identity));
    }

    /// Tears the connection down and cancels any pending retry.
    pub fn disconnect(&self) {
        self.command(Command::Disconnect);
    }

    /// Sends a request according to its delivery class.
    ///
    /// `subscribe`/`unsubscribe` go through the desired-topic set so they
    /// are replayed like [`subscribe`](Self::subscribe). `join` is derived
    /// from the identity on every open and is ignored here.
    pub fn send(&self, event: OutboundEvent) {
        let command = match event {
            OutboundEvent::Subscribe(topic) => Command::Subscribe(topic),
            OutboundEvent::Unsubscribe(topic) => Command::Unsubscribe(topic),
            OutboundEvent::Join(_) => {
                tracing::warn!("Join is sent on every open; explicit join ignored");
                return;
            }
            event => Command::Send(event),
        };
        self.command(command);
    }

    /// Adds a topic to the desired set; sent now if open, replayed on every open.
    pub fn subscribe(&self, topic: Topic) {
        self.command(Command::Subscribe(topic));
    }

    /// Removes a topic from the desired set.
    pub fn unsubscribe(&self, topic: Topic) {
        self.command(Command::Unsubscribe(topic));
    }

    /// Forgets every desired topic (e.g. on logout).
    pub fn clear_subscriptions(&self) {
        self.command(Command::ClearSubscriptions);
    }

    /// Current connection status.
    pub fn status(&self) -> ConnectionStatus {
        *self.status.borrow()
    }

    /// Receiver notified on every status change.
    pub fn watch_status(&self) -> watch::Receiver<ConnectionStatus> {
        self.status.clone()
    }

    fn command(&self, command: Command) {
        if self.commands.send(command).is_err() {
            tracing::warn!("Transport worker has stopped; command ignored");
        }
    }
}

type ConnectAttempt = BoxFuture<'static, Result<Socket, TransportError>>;

struct Worker {
    options: TransportOptions,
    connector: Arc<dyn Connector>,
    router: Arc<EventRouter>,
    status_tx: watch::Sender<ConnectionStatus>,

    state: ConnectionState,
    /// Consecutive failures since the last successful open.
    failures: u32,
    identity: Option<SessionIdentity>,
    subscriptions: SubscriptionSet,
    outbox: VecDeque<OutboundEvent>,

    socket: Option<Socket>,
    pending: Option<ConnectAttempt>,
    retry_at: Option<Instant>,
}

impl Worker {
    async fn run(mut self, mut commands: mpsc::UnboundedReceiver<Command>) {
        loop {
            tokio::select! {
                biased;

                command = commands.recv() => match command {
                    Some(command) => self.handle_command(command).await,
                    None => break,
                },
                result = next_attempt_result(&mut self.pending) => {
                    self.pending = None;
                    self.handle_attempt_result(result).await;
                }
                frame = next_frame(&mut self.socket) => self.handle_frame(frame).await,
                () = retry_timer(self.retry_at) => {
                    self.retry_at = None;
                    self.start_attempt();
                }
            }
        }

        tracing::debug!("All transport handles dropped; shutting down");
        self.teardown().await;
    }

    async fn handle_command(&mut self, command: Command) {
        match command {
            Command::Connect(identity) => self.connect(identity),
            Command::Disconnect => self.disconnect().await,
            Command::Send(event) => self.send(event).await,
            Command::Subscribe(topic) => {
                if self.subscriptions.insert(topic.clone()) {
                    tracing::debug!(topic = %topic, "Subscribed");
                    self.send_if_open(OutboundEvent::Subscribe(topic)).await;
                }
            }
            Command::Unsubscribe(topic) => {
                if self.subscriptions.remove(&topic) {
                    tracing::debug!(topic = %topic, "Unsubscribed");
                    self.send_if_open(OutboundEvent::Unsubscribe(topic)).await;
                }
            }
            Command::ClearSubscriptions => {
                let topics: Vec<Topic> = self.subscriptions.iter().cloned().collect();
                self.subscriptions.clear();
                for topic in topics {
                    self.send_if_open(OutboundEvent::Unsubscribe(topic)).await;
                }
            }
        }
    }

    fn connect(&mut self, identity: SessionIdentity) {
        if self.state.is_desired() {
            if self.identity.as_ref() != Some(&identity) {
                tracing::warn!(
                    state = ?self.state,
                    "Connect with a different identity ignored; disconnect first"
                );
            } else {
                tracing::debug!(state = ?self.state, "Already connecting or open");
            }
            return;
        }

        self.identity = Some(identity);
        self.failures = 0;
        self.start_attempt();
    }

    fn start_attempt(&mut self) {
        let Some(identity) = &self.identity else {
            return;
        };

        let url = identity.connection_url(&self.options.url);
        let connector = Arc::clone(&self.connector);
        let timeout = self.options.connect_timeout;

        tracing::info!(url = %url, attempt = self.failures, "Connecting");
        self.pending = Some(
            async move {
                match tokio::time::timeout(timeout, connector.connect(&url)).await {
                    Ok(result) => result,
                    Err(_) => Err(TransportError::Timeout(timeout)),
                }
            }
            .boxed(),
        );
        self.set_state(ConnectionState::Connecting);
    }

    async fn handle_attempt_result(&mut self, result: Result<Socket, TransportError>) {
        match result {
            Ok(socket) => {
                self.socket = Some(socket);
                self.failures = 0;
                self.set_state(ConnectionState::Open);
                tracing::info!(topics = self.subscriptions.len(), "Connection open");
                self.on_open().await;
            }
            Err(e) => {
                tracing::warn!(error = %e, attempt = self.failures, "Connect attempt failed");
                self.failures += 1;
                self.schedule_retry();
            }
        }
    }

    /// Join, replay subscriptions, then flush the outbox.
    ///
    /// A queued frame leaves the outbox only once it has been written, so a
    /// failed replay keeps the rest for the next open.
    async fn on_open(&mut self) {
        let Some(identity) = self.identity.clone() else {
            return;
        };

        let mut control = vec![OutboundEvent::Join(identity)];
        control.extend(self.subscriptions.iter().cloned().map(OutboundEvent::Subscribe));
        for event in control {
            if let Err(e) = self.write(&event).await {
                self.replay_failed(&event, e);
                return;
            }
        }

        while let Some(event) = self.outbox.front().cloned() {
            if let Err(e) = self.write(&event).await {
                self.replay_failed(&event, e);
                return;
            }
            self.outbox.pop_front();
        }
    }

    fn replay_failed(&mut self, event: &OutboundEvent, error: TransportError) {
        tracing::warn!(
            event = event.name(),
            error = %error,
            queued = self.outbox.len(),
            "Write failed during replay"
        );
        self.connection_lost();
    }

    async fn handle_frame(&mut self, frame: Option<Result<String, TransportError>>) {
        match frame {
            Some(Ok(frame)) => {
                let outcome = self.router.dispatch_frame(&frame).await;
                tracing::trace!(?outcome, "Frame dispatched");
            }
            Some(Err(e)) => {
                tracing::warn!(error = %e, "Connection error");
                self.connection_lost();
            }
            None => {
                tracing::info!("Connection closed by peer");
                self.connection_lost();
            }
        }
    }

    /// Unexpected loss of an open socket.
    fn connection_lost(&mut self) {
        self.socket = None;
        self.failures += 1;
        self.schedule_retry();
    }

    fn schedule_retry(&mut self) {
        let policy = &self.options.reconnect;
        let retry = self.failures.saturating_sub(1);

        if !policy.allows_attempt(retry) {
            tracing::error!(
                failures = self.failures,
                dropped = self.outbox.len(),
                "Reconnect attempts exhausted; connection lost"
            );
            self.outbox.clear();
            self.set_state(ConnectionState::Lost);
            return;
        }

        let delay = policy.delay_for(retry);
        tracing::info!(
            attempt = self.failures,
            delay_ms = u64::try_from(delay.as_millis()).unwrap_or(u64::MAX),
            "Reconnect scheduled"
        );
        self.retry_at = Some(Instant::now() + delay);
        self.set_state(ConnectionState::Connecting);
    }

    async fn disconnect(&mut self) {
        if self.state == ConnectionState::Idle {
            return;
        }
        self.teardown().await;
        self.identity = None;
        self.failures = 0;
        self.set_state(ConnectionState::Idle);
        tracing::info!("Disconnected");
    }

    /// Cancels the timer and any in-flight attempt, closes the socket and
    /// drops queued frames.
    async fn teardown(&mut self) {
        self.retry_at = None;
        self.pending = None;
        if let Some(mut socket) = self.socket.take() {
            if let Err(e) = socket.sink.close().await {
                tracing::debug!(error = %e, "Error closing socket");
            }
        }
        if !self.outbox.is_empty() {
            tracing::warn!(dropped = self.outbox.len(), "Dropping queued frames");
            self.outbox.clear();
        }
    }

    async fn send(&mut self, event: OutboundEvent) {
        match (event.delivery(), self.state) {
            (_, ConnectionState::Open) => {
                if let Err(e) = self.write(&event).await {
                    tracing::warn!(event = event.name(), error = %e, "Write failed");
                    if event.delivery() == Delivery::Queued {
                        self.enqueue(event);
                    }
                    self.connection_lost();
                }
            }
            (Delivery::Queued, ConnectionState::Connecting) => self.enqueue(event),
            (Delivery::Queued, state) => {
                tracing::warn!(event = event.name(), ?state, "Not connected; frame dropped");
            }
            (_, state) => {
                tracing::debug!(event = event.name(), ?state, "Not open; frame dropped");
            }
        }
    }

    async fn send_if_open(&mut self, event: OutboundEvent) {
        if self.state != ConnectionState::Open {
            return;
        }
        if let Err(e) = self.write(&event).await {
            tracing::warn!(event = event.name(), error = %e, "Write failed");
            self.connection_lost();
        }
    }

    fn enqueue(&mut self, event: OutboundEvent) {
        if self.options.outbox_capacity == 0 {
            tracing::warn!(event = event.name(), "Outbox disabled; frame dropped");
            return;
        }
        if self.outbox.len() >= self.options.outbox_capacity {
            if let Some(oldest) = self.outbox.pop_front() {
                tracing::warn!(event = oldest.name(), "Outbox full; oldest frame dropped");
            }
        }
        self.outbox.push_back(event);
    }

    async fn write(&mut self, event: &OutboundEvent) -> Result<(), TransportError> {
        let socket = self.socket.as_mut().ok_or(TransportError::Closed)?;
        let frame = event
            .to_envelope()
            .to_frame()
            .map_err(|e| TransportError::Protocol(e.to_string()))?;
        socket.sink.send(frame).await?;
        tracing::trace!(event = event.name(), "Frame sent");
        Ok(())
    }

    fn set_state(&mut self, next: ConnectionState) {
        if self.state != next && !self.state.can_transition_to(&next) {
            tracing::error!(from = ?self.state, to = ?next, "Invalid connection transition");
            return;
        }
        self.state = next;
        self.status_tx.send_replace(ConnectionStatus {
            state: next,
            attempt: self.failures,
        });
    }
}

async fn next_attempt_result(pending: &mut Option<ConnectAttempt>) -> Result<Socket, TransportError> {
    match pending {
        Some(attempt) => attempt.await,
        None => future::pending().await,
    }
}

async fn next_frame(socket: &mut Option<Socket>) -> Option<Result<String, TransportError>> {
    match socket {
        Some(socket) => socket.stream.next().await,
        None => future::pending().await,
    }
}

async fn retry_timer(deadline: Option<Instant>) {
    match deadline {
        Some(at) => tokio::time::sleep_until(at).await,
        None => future::pending().await,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::websocket::MemoryConnector;
    use crate::domain::foundation::ConversationId;
    use crate::domain::realtime::Role;
    use serde_json::json;

    fn identity() -> SessionIdentity {
        SessionIdentity::new("u1", Role::Agent, "t1").unwrap()
    }

    fn options() -> TransportOptions {
        TransportOptions::new(Url::parse("ws://memory/ws").unwrap())
    }

    fn spawn(options: TransportOptions) -> (Transport, MemoryConnector) {
        let connector = MemoryConnector::new();
        let transport = Transport::spawn(
            options,
            Arc::new(connector.clone()),
            Arc::new(EventRouter::new()),
        );
        (transport, connector)
    }

    async fn wait_for_state(transport: &Transport, state: ConnectionState) {
        let mut status = transport.watch_status();
        status.wait_for(|s| s.state == state).await.unwrap();
    }

    fn conversation(id: &str) -> ConversationId {
        ConversationId::new(id).unwrap()
    }

    fn message(content: &str) -> OutboundEvent {
        OutboundEvent::SendMessage {
            conversation_id: conversation("c1"),
            content: content.to_string(),
            is_private: false,
            echo_id: format!("echo-{}", content),
        }
    }

    #[tokio::test]
    async fn connect_builds_url_from_identity() {
        let (transport, connector) = spawn(options());
        transport.connect(identity());

        let peer = connector.accept().await.unwrap();
        assert_eq!(
            peer.url().as_str(),
            "ws://memory/ws?id=u1&role=agent&tenant=t1"
        );
        wait_for_state(&transport, ConnectionState::Open).await;
    }

    #[tokio::test]
    async fn join_is_first_frame_after_open() {
        let (transport, connector) = spawn(options());
        transport.connect(identity());

        let mut peer = connector.accept().await.unwrap();
        let join = peer.next_envelope().await.unwrap();
        assert_eq!(join.event(), "join");
        assert_eq!(join.payload(), &json!({"id": "u1", "role": "agent", "tenant": "t1"}));
    }

    #[tokio::test]
    async fn typing_is_dropped_while_not_open() {
        let (transport, connector) = spawn(options());
        transport.send(OutboundEvent::TypingStart(conversation("c1")));
        transport.connect(identity());

        let mut peer = connector.accept().await.unwrap();
        wait_for_state(&transport, ConnectionState::Open).await;
        transport.send(OutboundEvent::TypingStop(conversation("c1")));

        assert_eq!(peer.next_envelope().await.unwrap().event(), "join");
        assert_eq!(peer.next_envelope().await.unwrap().event(), "typing_stop");
    }

    #[tokio::test]
    async fn queued_frames_flush_after_subscriptions() {
        let (transport, connector) = spawn(options());
        transport.subscribe("conversation:c1".parse().unwrap());
        transport.connect(identity());
        transport.send(message("first"));
        transport.send(message("second"));

        let mut peer = connector.accept().await.unwrap();
        let events: Vec<String> = [
            peer.next_envelope().await.unwrap(),
            peer.next_envelope().await.unwrap(),
            peer.next_envelope().await.unwrap(),
            peer.next_envelope().await.unwrap(),
        ]
        .iter()
        .map(|e| e.event().to_string())
        .collect();

        assert_eq!(
            events,
            vec!["join", "subscribe", "conversation_send_message", "conversation_send_message"]
        );
    }

    #[tokio::test]
    async fn messages_sent_while_idle_are_dropped() {
        let (transport, connector) = spawn(options());
        transport.send(message("lost"));
        transport.connect(identity());

        let mut peer = connector.accept().await.unwrap();
        wait_for_state(&transport, ConnectionState::Open).await;
        assert_eq!(peer.next_envelope().await.unwrap().event(), "join");

        transport.disconnect();
        wait_for_state(&transport, ConnectionState::Idle).await;
        assert!(peer.next_frame().await.is_none());
    }

    #[tokio::test(start_paused = true)]
    async fn connect_attempt_times_out_and_retries() {
        let options = options()
            .with_connect_timeout(Duration::from_secs(5))
            .with_outbox_capacity(2);
        let (transport, connector) = spawn(options);
        connector.hang_next(1);

        transport.connect(identity());
        transport.send(message("a"));
        transport.send(message("b"));
        transport.send(message("c"));

        let mut peer = connector.accept().await.unwrap();
        let times = connector.attempt_times();
        assert_eq!(times.len(), 2);
        // 5s timeout plus the 1s first retry delay.
        assert_eq!(times[1] - times[0], Duration::from_secs(6));

        let mut contents = Vec::new();
        for _ in 0..3 {
            let envelope = peer.next_envelope().await.unwrap();
            if envelope.event() == "conversation_send_message" {
                contents.push(envelope.payload()["content"].as_str().unwrap().to_string());
            }
        }
        assert_eq!(contents, vec!["b", "c"]);
    }

    #[tokio::test(start_paused = true)]
    async fn queued_frames_survive_a_failed_replay() {
        let (transport, connector) = spawn(options());
        connector.break_writes_next(1);
        transport.subscribe("conversation:c1".parse().unwrap());

        transport.connect(identity());
        transport.send(message("kept"));

        let mut peer = connector.accept().await.unwrap();
        assert_eq!(connector.attempt_count(), 2);
        let urls = connector.attempt_urls();
        assert_eq!(urls[0], urls[1]);

        assert_eq!(peer.next_envelope().await.unwrap().event(), "join");
        assert_eq!(peer.next_envelope().await.unwrap().event(), "subscribe");
        let sent = peer.next_envelope().await.unwrap();
        assert_eq!(sent.event(), "conversation_send_message");
        assert_eq!(sent.payload()["content"], "kept");
    }

    #[tokio::test(start_paused = true)]
    async fn sent_subscribe_is_replayed_after_stream_error() {
        let (transport, connector) = spawn(options());
        transport.connect(identity());

        let mut first = connector.accept().await.unwrap();
        assert_eq!(first.next_envelope().await.unwrap().event(), "join");

        transport.send(OutboundEvent::Subscribe("inbox:i1".parse().unwrap()));
        let subscribe = first.next_envelope().await.unwrap();
        assert_eq!(subscribe.payload(), &json!({"topic": "inbox:i1"}));

        first.fail(TransportError::Protocol("connection reset".to_string()));

        let mut second = connector.accept().await.unwrap();
        assert_eq!(second.next_envelope().await.unwrap().event(), "join");
        let replayed = second.next_envelope().await.unwrap();
        assert_eq!(replayed.event(), "subscribe");
        assert_eq!(replayed.payload(), &json!({"topic": "inbox:i1"}));
    }

    #[tokio::test]
    async fn explicit_join_is_not_sent_twice() {
        let (transport, connector) = spawn(options());
        transport.connect(identity());

        let mut peer = connector.accept().await.unwrap();
        assert_eq!(peer.next_envelope().await.unwrap().event(), "join");
        wait_for_state(&transport, ConnectionState::Open).await;

        transport.send(OutboundEvent::Join(identity()));
        transport.send(OutboundEvent::TypingStop(conversation("c1")));
        assert_eq!(peer.next_envelope().await.unwrap().event(), "typing_stop");
    }

    #[tokio::test(start_paused = true)]
    async fn exhausted_retries_report_lost() {
        let policy = ReconnectPolicy::fixed(Duration::from_secs(1)).with_max_attempts(2);
        let options = options().with_reconnect(policy);
        let (transport, connector) = spawn(options);
        connector.refuse_all(true);

        transport.connect(identity());
        wait_for_state(&transport, ConnectionState::Lost).await;

        // Initial attempt plus two retries.
        assert_eq!(connector.attempt_count(), 3);
        assert!(transport.status().is_connection_lost());

        // Lost is not terminal: a new connect starts over.
        connector.refuse_all(false);
        transport.connect(identity());
        assert!(connector.accept().await.is_some());
        wait_for_state(&transport, ConnectionState::Open).await;
        assert_eq!(transport.status().attempt, 0);
    }

    #[tokio::test]
    async fn dropping_all_handles_closes_socket() {
        let (transport, connector) = spawn(options());
        transport.connect(identity());
        let mut peer = connector.accept().await.unwrap();
        assert_eq!(peer.next_envelope().await.unwrap().event(), "join");

        drop(transport);
        assert!(peer.next_frame().await.is_none());
    }
}
