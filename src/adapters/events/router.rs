//! Event router: inbound frames to registered handlers.
//!
//! Every frame is parsed into an [`Envelope`], narrowed into an
//! [`InboundEvent`] once, and fanned out to the handlers registered for its
//! kind in registration order. Nothing a frame or a handler does can stop
//! the next frame from being processed:
//!
//! - malformed frames and payloads are logged and dropped
//! - unknown event names are dropped
//! - a handler returning an error or panicking is logged; the remaining
//!   handlers for the same event still run

use std::any::Any;
use std::collections::HashMap;
use std::panic::AssertUnwindSafe;
use std::sync::{Arc, PoisonError, RwLock};

use futures::FutureExt;

use crate::domain::foundation::{DomainError, ErrorCode};
use crate::domain::realtime::{Envelope, EventKind, InboundEvent};
use crate::ports::{EventHandler, EventSubscriber};

type HandlerMap = HashMap<EventKind, Vec<Arc<dyn EventHandler>>>;

/// What happened to one dispatched frame.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DispatchOutcome {
    /// The frame is not a valid `{event, payload}` envelope.
    Malformed,
    /// Unknown event name, or no handler registered for it.
    Dropped,
    /// Known event whose payload failed schema validation.
    InvalidPayload(EventKind),
    /// Handlers ran; counts of those that succeeded and failed.
    Delivered {
        kind: EventKind,
        succeeded: usize,
        failed: usize,
    },
}

/// Registry of inbound handlers plus the dispatch loop body.
///
/// Registrations live as long as the router, not the connection, so they
/// survive reconnects.
pub struct EventRouter {
    handlers: RwLock<HandlerMap>,
}

impl EventRouter {
    /// Creates a router with no handlers.
    pub fn new() -> Self {
        Self {
            handlers: RwLock::new(HashMap::new()),
        }
    }

    /// Number of handlers registered for a kind.
    pub fn handler_count(&self, kind: EventKind) -> usize {
        self.handlers
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(&kind)
            .map_or(0, Vec::len)
    }

    /// Parses and dispatches one raw text frame.
    pub async fn dispatch_frame(&self, frame: &str) -> DispatchOutcome {
        match Envelope::parse(frame) {
            Ok(envelope) => self.dispatch_envelope(&envelope).await,
            Err(e) => {
                tracing::warn!(error = %e, "Dropping malformed frame");
                DispatchOutcome::Malformed
            }
        }
    }

    /// Validates and dispatches one envelope.
    pub async fn dispatch_envelope(&self, envelope: &Envelope) -> DispatchOutcome {
        let Some(kind) = EventKind::from_name(envelope.event()) else {
            tracing::debug!(event = envelope.event(), "Ignoring unknown event");
            return DispatchOutcome::Dropped;
        };

        if self.handler_count(kind) == 0 {
            tracing::trace!(event = %kind, "No handlers registered");
            return DispatchOutcome::Dropped;
        }

        match InboundEvent::decode_as(kind, envelope) {
            Ok(event) => self.dispatch(&event).await,
            Err(e) => {
                tracing::warn!(event = %kind, error = %e, "Dropping event with invalid payload");
                DispatchOutcome::InvalidPayload(kind)
            }
        }
    }

    /// Invokes every handler registered for the event's kind, in order.
    pub async fn dispatch(&self, event: &InboundEvent) -> DispatchOutcome {
        let kind = event.kind();

        // Clone handlers to release lock before await points
        let handlers: Vec<Arc<dyn EventHandler>> = {
            let map = self.handlers.read().unwrap_or_else(PoisonError::into_inner);
            map.get(&kind).cloned().unwrap_or_default()
        };

        if handlers.is_empty() {
            return DispatchOutcome::Dropped;
        }

        let mut succeeded = 0;
        let mut failed = 0;
        for handler in handlers {
            match AssertUnwindSafe(handler.handle(event)).catch_unwind().await {
                Ok(Ok(())) => succeeded += 1,
                Ok(Err(e)) => {
                    failed += 1;
                    tracing::warn!(
                        handler = handler.name(),
                        event = %kind,
                        topic = %event.topic(),
                        error = %e,
                        "Handler failed"
                    );
                }
                Err(payload) => {
                    failed += 1;
                    tracing::error!(
                        handler = handler.name(),
                        event = %kind,
                        topic = %event.topic(),
                        error = %panic_error(payload),
                        "Handler panicked"
                    );
                }
            }
        }

        DispatchOutcome::Delivered {
            kind,
            succeeded,
            failed,
        }
    }
}

impl Default for EventRouter {
    fn default() -> Self {
        Self::new()
    }
}

impl EventSubscriber for EventRouter {
    fn register(&self, kind: EventKind, handler: Arc<dyn EventHandler>) -> bool {
        let mut map = self.handlers.write().unwrap_or_else(PoisonError::into_inner);
        let registered = map.entry(kind).or_default();
        if registered.iter().any(|h| same_handler(h, &handler)) {
            return false;
        }
        tracing::debug!(handler = handler.name(), event = %kind, "Handler registered");
        registered.push(handler);
        true
    }

    fn unregister(&self, kind: EventKind, handler: &Arc<dyn EventHandler>) -> bool {
        let mut map = self.handlers.write().unwrap_or_else(PoisonError::into_inner);
        let Some(registered) = map.get_mut(&kind) else {
            return false;
        };
        let before = registered.len();
        registered.retain(|h| !same_handler(h, handler));
        let removed = registered.len() != before;
        if registered.is_empty() {
            map.remove(&kind);
        }
        removed
    }
}

/// Carries the panic message, when it has one, into a domain error.
fn panic_error(payload: Box<dyn Any + Send>) -> DomainError {
    let message = payload
        .downcast_ref::<&str>()
        .map(|s| (*s).to_string())
        .or_else(|| payload.downcast_ref::<String>().cloned())
        .unwrap_or_else(|| "handler panicked".to_string());
    DomainError::new(ErrorCode::HandlerPanicked, message)
}

/// Identity comparison on the allocation, ignoring vtable pointers.
fn same_handler(a: &Arc<dyn EventHandler>, b: &Arc<dyn EventHandler>) -> bool {
    Arc::as_ptr(a) as *const () == Arc::as_ptr(b) as *const ()
}
