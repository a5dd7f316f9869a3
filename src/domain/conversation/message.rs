//! Message entity for support conversations.
//!
//! Messages are pushed by the backend as `conversation_send_message` events
//! and appended to the conversation they belong to. A message sent by this
//! client comes back as an echo carrying the `echo_id` we generated.

use crate::domain::foundation::{ConversationId, MessageId, Timestamp};
use serde::{Deserialize, Serialize};

/// Who authored a message.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SenderType {
    /// Portal user answering the conversation.
    Agent,
    /// Website visitor using the chat bubble.
    #[default]
    Contact,
    /// Automated messages (greetings, assignment notices).
    System,
}

/// A chat message as delivered over the wire.
///
/// `id` is optional: the server omits it for transient system lines, and
/// such messages are never deduplicated.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Message {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<MessageId>,

    pub conversation_id: ConversationId,

    pub content: String,

    /// Private notes are visible to agents only.
    #[serde(default)]
    pub is_private: bool,

    #[serde(default)]
    pub sender_type: SenderType,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sender_id: Option<String>,

    /// Client-generated correlation id, echoed back by the server.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub echo_id: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<Timestamp>,
}

impl Message {
    /// Returns true if both messages are the same delivery of one message.
    ///
    /// Matches on server id first, then on echo id. Messages without
    /// either never match.
    pub fn is_same_delivery(&self, other: &Message) -> bool {
        if let (Some(a), Some(b)) = (&self.id, &other.id) {
            return a == b;
        }
        match (&self.echo_id, &other.echo_id) {
            (Some(a), Some(b)) => a == b,
            _ => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn message(id: Option<&str>, echo: Option<&str>) -> Message {
        Message {
            id: id.map(|s| MessageId::new(s).unwrap()),
            conversation_id: ConversationId::new("c1").unwrap(),
            content: "hi".to_string(),
            is_private: false,
            sender_type: SenderType::Contact,
            sender_id: None,
            echo_id: echo.map(str::to_string),
            created_at: None,
        }
    }

    #[test]
    fn deserializes_minimal_payload() {
        let msg: Message =
            serde_json::from_value(json!({"conversationId": "c1", "content": "hi"})).unwrap();

        assert_eq!(msg.conversation_id.as_str(), "c1");
        assert_eq!(msg.content, "hi");
        assert!(msg.id.is_none());
        assert!(!msg.is_private);
        assert_eq!(msg.sender_type, SenderType::Contact);
    }

    #[test]
    fn deserializes_agent_private_note() {
        let msg: Message = serde_json::from_value(json!({
            "id": "m1",
            "conversationId": "c1",
            "content": "internal",
            "isPrivate": true,
            "senderType": "agent",
            "senderId": "u1",
            "createdAt": "2025-03-01T10:00:00Z"
        }))
        .unwrap();

        assert!(msg.is_private);
        assert_eq!(msg.sender_type, SenderType::Agent);
        assert!(msg.created_at.is_some());
    }

    #[test]
    fn missing_conversation_id_is_rejected() {
        let result = serde_json::from_value::<Message>(json!({"content": "hi"}));
        assert!(result.is_err());
    }

    #[test]
    fn same_delivery_matches_on_id_then_echo() {
        assert!(message(Some("m1"), None).is_same_delivery(&message(Some("m1"), None)));
        assert!(!message(Some("m1"), Some("e1")).is_same_delivery(&message(Some("m2"), Some("e1"))));
        assert!(message(None, Some("e1")).is_same_delivery(&message(Some("m2"), Some("e1"))));
        assert!(!message(None, None).is_same_delivery(&message(None, None)));
    }
}
