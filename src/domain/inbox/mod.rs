//! Inbox domain module.

use serde::{Deserialize, Serialize};

use crate::domain::foundation::InboxId;

/// An inbox: the channel (website widget, email, ...) conversations arrive through.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Inbox {
    pub id: InboxId,

    pub name: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub channel_type: Option<String>,

    /// Greeting shown in the chat bubble when a visitor opens it.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub greeting: Option<String>,
}
