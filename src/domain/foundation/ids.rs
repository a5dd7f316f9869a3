//! Strongly-typed identifier value objects.
//!
//! Identifiers are minted by the backend and arrive as opaque strings, so
//! unlike locally generated ids they wrap a `String` rather than a `Uuid`.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use super::ValidationError;

macro_rules! string_id {
    ($(#[$meta:meta])* $name:ident, $field:literal) => {
        $(#[$meta])*
        #[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(String);

        impl $name {
            /// Creates an identifier, rejecting empty or blank input.
            pub fn new(value: impl Into<String>) -> Result<Self, ValidationError> {
                let value = value.into();
                if value.trim().is_empty() {
                    return Err(ValidationError::empty_field($field));
                }
                Ok(Self(value))
            }

            /// Returns the inner string slice.
            pub fn as_str(&self) -> &str {
                &self.0
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}", self.0)
            }
        }

        impl FromStr for $name {
            type Err = ValidationError;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                Self::new(s)
            }
        }
    };
}

string_id!(
    /// Identifier of a support conversation.
    ConversationId,
    "conversation_id"
);

string_id!(
    /// Identifier of a website visitor (contact).
    ContactId,
    "contact_id"
);

string_id!(
    /// Identifier of an inbox (a channel conversations arrive through).
    InboxId,
    "inbox_id"
);

string_id!(
    /// Identifier of a tenant company.
    CompanyId,
    "company_id"
);

string_id!(
    /// Identifier of a portal user (agent or admin).
    UserId,
    "user_id"
);

string_id!(
    /// Identifier of a chat message.
    MessageId,
    "message_id"
);

string_id!(
    /// Identifier of a note attached to a contact.
    NoteId,
    "note_id"
);
