//! Contact domain module.
//!
//! Contacts are website visitors known to a tenant. The agent portal keeps a
//! live contact list and per-contact notes in sync through contact events.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::domain::foundation::{ContactId, NoteId, Timestamp, UserId};

/// A contact record as pushed by `contact_created` / `contact_updated`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Contact {
    pub id: ContactId,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,

    /// Tenant-defined attributes, passed through untouched.
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub custom_attributes: BTreeMap<String, serde_json::Value>,
}

/// Payload of `contact_deleted`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ContactDeleted {
    #[serde(alias = "contactId")]
    pub id: ContactId,
}

/// A note an agent attached to a contact.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ContactNote {
    pub id: NoteId,

    pub contact_id: ContactId,

    pub content: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub author_id: Option<UserId>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<Timestamp>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn contact_keeps_custom_attributes() {
        let contact: Contact = serde_json::from_value(json!({
            "id": "ct1",
            "name": "Ada",
            "customAttributes": {"plan": "pro", "seats": 4}
        }))
        .unwrap();

        assert_eq!(contact.name.as_deref(), Some("Ada"));
        assert_eq!(contact.custom_attributes["plan"], json!("pro"));
        assert_eq!(contact.custom_attributes["seats"], json!(4));
    }

    #[test]
    fn contact_deleted_accepts_either_key() {
        let by_id: ContactDeleted = serde_json::from_value(json!({"id": "ct1"})).unwrap();
        let by_contact_id: ContactDeleted =
            serde_json::from_value(json!({"contactId": "ct1"})).unwrap();
        assert_eq!(by_id, by_contact_id);
    }

    #[test]
    fn note_requires_contact_id() {
        let result = serde_json::from_value::<ContactNote>(json!({"id": "n1", "content": "x"}));
        assert!(result.is_err());
    }
}
