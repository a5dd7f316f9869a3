//! Session identity configuration (used by the CLI)

use serde::Deserialize;

use super::error::ValidationError;
use crate::domain::realtime::{Role, SessionIdentity, Topic};

/// Who the CLI connects as and what it subscribes to
#[derive(Debug, Clone, Deserialize)]
pub struct SessionConfig {
    /// User id (agents) or contact id (visitors)
    pub id: String,

    #[serde(default = "default_role")]
    pub role: Role,

    /// Tenant / company id
    pub tenant: String,

    /// Topics to subscribe to (comma-separated, e.g. `conversation:c1,inbox:i1`)
    pub topics: Option<String>,
}

impl SessionConfig {
    pub fn identity(&self) -> Result<SessionIdentity, ValidationError> {
        SessionIdentity::new(self.id.clone(), self.role, self.tenant.clone())
            .map_err(|e| ValidationError::InvalidIdentity(e.to_string()))
    }

    /// Parsed topic list
    pub fn topic_list(&self) -> Result<Vec<Topic>, ValidationError> {
        self.topics
            .as_deref()
            .unwrap_or_default()
            .split(',')
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(|s| {
                s.parse::<Topic>()
                    .map_err(|_| ValidationError::InvalidTopic(s.to_string()))
            })
            .collect()
    }

    /// Validate session configuration
    pub fn validate(&self) -> Result<(), ValidationError> {
        self.identity()?;
        self.topic_list()?;
        Ok(())
    }
}

fn default_role() -> Role {
    Role::Agent
}
