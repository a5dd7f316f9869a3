//! Typed inbound and outbound events.
//!
//! Inbound envelopes are narrowed into [`InboundEvent`] once, at the router
//! boundary, so handlers only ever see validated payloads. Outbound requests
//! are built as [`OutboundEvent`] and lowered into an [`Envelope`].

use std::fmt;

use serde::de::DeserializeOwned;
use serde_json::json;

use crate::domain::account::Company;
use crate::domain::contact::{Contact, ContactDeleted, ContactNote};
use crate::domain::conversation::{Conversation, ConversationEnded, Message};
use crate::domain::foundation::{ConversationId, UserId};
use crate::domain::inbox::Inbox;

use super::{DecodeError, Envelope, SessionIdentity, Topic};

// ============================================
// Inbound
// ============================================

/// Inbound event names this client understands.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum EventKind {
    ConversationStart,
    ConversationEnd,
    ConversationSendMessage,
    ConversationGetById,
    CompanyUpdated,
    ContactUpdated,
    ContactCreated,
    ContactDeleted,
    ContactNoteCreated,
    InboxUpdated,
    InboxCreated,
}

impl EventKind {
    /// Every recognized inbound kind.
    pub const ALL: [EventKind; 11] = [
        EventKind::ConversationStart,
        EventKind::ConversationEnd,
        EventKind::ConversationSendMessage,
        EventKind::ConversationGetById,
        EventKind::CompanyUpdated,
        EventKind::ContactUpdated,
        EventKind::ContactCreated,
        EventKind::ContactDeleted,
        EventKind::ContactNoteCreated,
        EventKind::InboxUpdated,
        EventKind::InboxCreated,
    ];

    /// Wire name of the event.
    pub fn as_str(&self) -> &'static str {
        match self {
            EventKind::ConversationStart => "conversation_start",
            EventKind::ConversationEnd => "conversation_end",
            EventKind::ConversationSendMessage => "conversation_send_message",
            EventKind::ConversationGetById => "conversation_get_by_id",
            EventKind::CompanyUpdated => "company_updated",
            EventKind::ContactUpdated => "contact_updated",
            EventKind::ContactCreated => "contact_created",
            EventKind::ContactDeleted => "contact_deleted",
            EventKind::ContactNoteCreated => "contact_note_created",
            EventKind::InboxUpdated => "inbox_updated",
            EventKind::InboxCreated => "inbox_created",
        }
    }

    /// Looks up a wire name. Unknown names yield `None`; the server may add
    /// event types this client does not know yet.
    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL.iter().copied().find(|kind| kind.as_str() == name)
    }
}

impl fmt::Display for EventKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A validated inbound event.
#[derive(Debug, Clone, PartialEq)]
pub enum InboundEvent {
    ConversationStart(Conversation),
    ConversationEnd(ConversationEnded),
    ConversationSendMessage(Message),
    ConversationGetById(Conversation),
    CompanyUpdated(Company),
    ContactUpdated(Contact),
    ContactCreated(Contact),
    ContactDeleted(ContactDeleted),
    ContactNoteCreated(ContactNote),
    InboxUpdated(Inbox),
    InboxCreated(Inbox),
}

impl InboundEvent {
    /// Narrows an envelope into a typed event.
    ///
    /// Returns `Ok(None)` for event names this client does not recognize and
    /// `Err` when a recognized event carries a payload of the wrong shape.
    pub fn decode(envelope: &Envelope) -> Result<Option<Self>, DecodeError> {
        let Some(kind) = EventKind::from_name(envelope.event()) else {
            return Ok(None);
        };
        Self::decode_as(kind, envelope).map(Some)
    }

    /// Decodes an envelope whose kind is already known.
    pub fn decode_as(kind: EventKind, envelope: &Envelope) -> Result<Self, DecodeError> {
        let event = match kind {
            EventKind::ConversationStart => {
                InboundEvent::ConversationStart(payload(kind, envelope)?)
            }
            EventKind::ConversationEnd => InboundEvent::ConversationEnd(payload(kind, envelope)?),
            EventKind::ConversationSendMessage => {
                InboundEvent::ConversationSendMessage(payload(kind, envelope)?)
            }
            EventKind::ConversationGetById => {
                InboundEvent::ConversationGetById(payload(kind, envelope)?)
            }
            EventKind::CompanyUpdated => InboundEvent::CompanyUpdated(payload(kind, envelope)?),
            EventKind::ContactUpdated => InboundEvent::ContactUpdated(payload(kind, envelope)?),
            EventKind::ContactCreated => InboundEvent::ContactCreated(payload(kind, envelope)?),
            EventKind::ContactDeleted => InboundEvent::ContactDeleted(payload(kind, envelope)?),
            EventKind::ContactNoteCreated => {
                InboundEvent::ContactNoteCreated(payload(kind, envelope)?)
            }
            EventKind::InboxUpdated => InboundEvent::InboxUpdated(payload(kind, envelope)?),
            EventKind::InboxCreated => InboundEvent::InboxCreated(payload(kind, envelope)?),
        };
        Ok(event)
    }

    /// Kind of this event.
    pub fn kind(&self) -> EventKind {
        match self {
            InboundEvent::ConversationStart(_) => EventKind::ConversationStart,
            InboundEvent::ConversationEnd(_) => EventKind::ConversationEnd,
            InboundEvent::ConversationSendMessage(_) => EventKind::ConversationSendMessage,
            InboundEvent::ConversationGetById(_) => EventKind::ConversationGetById,
            InboundEvent::CompanyUpdated(_) => EventKind::CompanyUpdated,
            InboundEvent::ContactUpdated(_) => EventKind::ContactUpdated,
            InboundEvent::ContactCreated(_) => EventKind::ContactCreated,
            InboundEvent::ContactDeleted(_) => EventKind::ContactDeleted,
            InboundEvent::ContactNoteCreated(_) => EventKind::ContactNoteCreated,
            InboundEvent::InboxUpdated(_) => EventKind::InboxUpdated,
            InboundEvent::InboxCreated(_) => EventKind::InboxCreated,
        }
    }

    /// Topic the event belongs to, used for log correlation.
    pub fn topic(&self) -> Topic {
        match self {
            InboundEvent::ConversationStart(c) | InboundEvent::ConversationGetById(c) => {
                Topic::Conversation(c.id.clone())
            }
            InboundEvent::ConversationEnd(e) => Topic::Conversation(e.conversation_id.clone()),
            InboundEvent::ConversationSendMessage(m) => {
                Topic::Conversation(m.conversation_id.clone())
            }
            InboundEvent::CompanyUpdated(c) => Topic::Company(c.id.clone()),
            InboundEvent::ContactUpdated(c) | InboundEvent::ContactCreated(c) => {
                Topic::Contact(c.id.clone())
            }
            InboundEvent::ContactDeleted(d) => Topic::Contact(d.id.clone()),
            InboundEvent::ContactNoteCreated(n) => Topic::Contact(n.contact_id.clone()),
            InboundEvent::InboxUpdated(i) | InboundEvent::InboxCreated(i) => {
                Topic::Inbox(i.id.clone())
            }
        }
    }
}

fn payload<T: DeserializeOwned>(kind: EventKind, envelope: &Envelope) -> Result<T, DecodeError> {
    T::deserialize(envelope.payload()).map_err(|source| DecodeError::InvalidPayload {
        event: kind.as_str(),
        source,
    })
}

// ============================================
// Outbound
// ============================================

/// How the transport treats a frame while the connection is not open.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Delivery {
    /// Buffered while reconnecting and flushed after the next open.
    Queued,
    /// Dropped unless the connection is open (typing indicators).
    Ephemeral,
    /// Connection control; re-derived from session state on every open.
    Control,
}

/// A request sent from this client to the server.
#[derive(Debug, Clone, PartialEq)]
pub enum OutboundEvent {
    /// Presence announce sent right after every open.
    Join(SessionIdentity),
    Subscribe(Topic),
    Unsubscribe(Topic),
    SendMessage {
        conversation_id: ConversationId,
        content: String,
        is_private: bool,
        echo_id: String,
    },
    TypingStart(ConversationId),
    TypingStop(ConversationId),
    AssignConversation {
        conversation_id: ConversationId,
        agent_id: UserId,
    },
    /// Ask the server to push `conversation_get_by_id` for one conversation.
    RequestConversation(ConversationId),
}

impl OutboundEvent {
    /// Wire name of the request.
    pub fn name(&self) -> &'static str {
        match self {
            OutboundEvent::Join(_) => "join",
            OutboundEvent::Subscribe(_) => "subscribe",
            OutboundEvent::Unsubscribe(_) => "unsubscribe",
            OutboundEvent::SendMessage { .. } => "conversation_send_message",
            OutboundEvent::TypingStart(_) => "typing_start",
            OutboundEvent::TypingStop(_) => "typing_stop",
            OutboundEvent::AssignConversation { .. } => "conversation_assign",
            OutboundEvent::RequestConversation(_) => "conversation_get_by_id",
        }
    }

    /// Delivery class used by the transport.
    pub fn delivery(&self) -> Delivery {
        match self {
            OutboundEvent::Join(_) | OutboundEvent::Subscribe(_) | OutboundEvent::Unsubscribe(_) => {
                Delivery::Control
            }
            OutboundEvent::TypingStart(_) | OutboundEvent::TypingStop(_) => Delivery::Ephemeral,
            OutboundEvent::SendMessage { .. }
            | OutboundEvent::AssignConversation { .. }
            | OutboundEvent::RequestConversation(_) => Delivery::Queued,
        }
    }

    /// Lowers the request into its wire envelope.
    pub fn to_envelope(&self) -> Envelope {
        let payload = match self {
            OutboundEvent::Join(identity) => json!({
                "id": identity.id(),
                "role": identity.role().as_str(),
                "tenant": identity.tenant(),
            }),
            OutboundEvent::Subscribe(topic) | OutboundEvent::Unsubscribe(topic) => {
                json!({ "topic": topic.to_string() })
            }
            OutboundEvent::SendMessage {
                conversation_id,
                content,
                is_private,
                echo_id,
            } => json!({
                "conversationId": conversation_id.as_str(),
                "content": content,
                "isPrivate": is_private,
                "echoId": echo_id,
            }),
            OutboundEvent::TypingStart(id)
            | OutboundEvent::TypingStop(id)
            | OutboundEvent::RequestConversation(id) => {
                json!({ "conversationId": id.as_str() })
            }
            OutboundEvent::AssignConversation {
                conversation_id,
                agent_id,
            } => json!({
                "conversationId": conversation_id.as_str(),
                "agentId": agent_id.as_str(),
            }),
        };
        Envelope::new(self.name(), payload)
    }
}
