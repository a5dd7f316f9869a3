//! Subscription topics.
//!
//! A topic scopes which inbound events a session receives. On the wire it
//! is a `<kind>:<id>` string such as `conversation:c1`.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::domain::foundation::{CompanyId, ContactId, ConversationId, InboxId, ValidationError};

/// A subscription key.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum Topic {
    Conversation(ConversationId),
    Contact(ContactId),
    Inbox(InboxId),
    Company(CompanyId),
}

impl Topic {
    /// Topic for a single conversation.
    pub fn conversation(id: ConversationId) -> Self {
        Topic::Conversation(id)
    }

    /// Topic for a single contact.
    pub fn contact(id: ContactId) -> Self {
        Topic::Contact(id)
    }

    /// Prefix before the `:` separator.
    pub fn kind(&self) -> &'static str {
        match self {
            Topic::Conversation(_) => "conversation",
            Topic::Contact(_) => "contact",
            Topic::Inbox(_) => "inbox",
            Topic::Company(_) => "company",
        }
    }

    fn id_str(&self) -> &str {
        match self {
            Topic::Conversation(id) => id.as_str(),
            Topic::Contact(id) => id.as_str(),
            Topic::Inbox(id) => id.as_str(),
            Topic::Company(id) => id.as_str(),
        }
    }
}

impl fmt::Display for Topic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.kind(), self.id_str())
    }
}

impl FromStr for Topic {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (kind, id) = s
            .split_once(':')
            .ok_or_else(|| ValidationError::invalid_format("topic", "missing ':' separator"))?;

        match kind {
            "conversation" => Ok(Topic::Conversation(id.parse()?)),
            "contact" => Ok(Topic::Contact(id.parse()?)),
            "inbox" => Ok(Topic::Inbox(id.parse()?)),
            "company" => Ok(Topic::Company(id.parse()?)),
            other => Err(ValidationError::invalid_format(
                "topic",
                format!("unknown topic kind '{}'", other),
            )),
        }
    }
}

impl TryFrom<String> for Topic {
    type Error = ValidationError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<Topic> for String {
    fn from(topic: Topic) -> Self {
        topic.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn displays_kind_and_id() {
        let topic = Topic::conversation(ConversationId::new("c1").unwrap());
        assert_eq!(topic.to_string(), "conversation:c1");
    }

    #[test]
    fn parses_every_kind() {
        for raw in ["conversation:c1", "contact:ct1", "inbox:i1", "company:t1"] {
            let topic: Topic = raw.parse().unwrap();
            assert_eq!(topic.to_string(), raw);
        }
    }

    #[test]
    fn id_may_contain_separator() {
        let topic: Topic = "contact:a:b".parse().unwrap();
        assert_eq!(topic, Topic::contact(ContactId::new("a:b").unwrap()));
    }

    #[test]
    fn rejects_malformed_topics() {
        assert!("conversation".parse::<Topic>().is_err());
        assert!("conversation:".parse::<Topic>().is_err());
        assert!("room:r1".parse::<Topic>().is_err());
    }

    #[test]
    fn serializes_as_plain_string() {
        let topic: Topic = "inbox:i1".parse().unwrap();
        assert_eq!(serde_json::to_string(&topic).unwrap(), r#""inbox:i1""#);
        let back: Topic = serde_json::from_str(r#""inbox:i1""#).unwrap();
        assert_eq!(back, topic);
    }
}
