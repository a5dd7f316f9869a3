//! Connection identity and lifecycle.

use std::fmt;

use serde::{Deserialize, Serialize};
use url::Url;

use crate::domain::foundation::{StateMachine, ValidationError};

/// Query parameter names agreed with the backend.
pub const QUERY_ID: &str = "id";
pub const QUERY_ROLE: &str = "role";
pub const QUERY_TENANT: &str = "tenant";

/// Which side of the conversation this session is.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    /// Portal user.
    Agent,
    /// Website visitor in the chat bubble.
    Contact,
}

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::Agent => "agent",
            Role::Contact => "contact",
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for Role {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "agent" => Ok(Role::Agent),
            "contact" => Ok(Role::Contact),
            other => Err(ValidationError::invalid_format(
                "role",
                format!("expected 'agent' or 'contact', got '{}'", other),
            )),
        }
    }
}

/// Who is connecting: user or contact id, role and tenant.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionIdentity {
    id: String,
    role: Role,
    tenant: String,
}

impl SessionIdentity {
    /// Creates an identity, rejecting blank ids.
    pub fn new(
        id: impl Into<String>,
        role: Role,
        tenant: impl Into<String>,
    ) -> Result<Self, ValidationError> {
        let id = id.into();
        let tenant = tenant.into();
        if id.trim().is_empty() {
            return Err(ValidationError::empty_field("id"));
        }
        if tenant.trim().is_empty() {
            return Err(ValidationError::empty_field("tenant"));
        }
        Ok(Self { id, role, tenant })
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn role(&self) -> Role {
        self.role
    }

    pub fn tenant(&self) -> &str {
        &self.tenant
    }

    /// Builds the connection URL for this identity.
    ///
    /// Unrelated query parameters already present on `base` are preserved;
    /// `id`, `role` and `tenant` are replaced.
    pub fn connection_url(&self, base: &Url) -> Url {
        let mut url = base.clone();
        let retained: Vec<(String, String)> = base
            .query_pairs()
            .filter(|(key, _)| key != QUERY_ID && key != QUERY_ROLE && key != QUERY_TENANT)
            .map(|(key, value)| (key.into_owned(), value.into_owned()))
            .collect();

        url.set_query(None);
        {
            let mut query = url.query_pairs_mut();
            for (key, value) in &retained {
                query.append_pair(key, value);
            }
            query
                .append_pair(QUERY_ID, &self.id)
                .append_pair(QUERY_ROLE, self.role.as_str())
                .append_pair(QUERY_TENANT, &self.tenant);
        }
        url
    }
}

/// Lifecycle of the single connection a session owns.
///
/// ```text
/// Idle -> Connecting -> Open -> Connecting (retry) -> ... -> Idle
///                  \-> Lost (retries exhausted) -> Connecting | Idle
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ConnectionState {
    #[default]
    Idle,
    Connecting,
    Open,
    Lost,
}

impl ConnectionState {
    /// True while the session wants a connection (not idle, not given up).
    pub fn is_desired(&self) -> bool {
        matches!(self, ConnectionState::Connecting | ConnectionState::Open)
    }
}

impl StateMachine for ConnectionState {
    fn can_transition_to(&self, target: &Self) -> bool {
        use ConnectionState::*;
        matches!(
            (self, target),
            (Idle, Connecting)
                | (Connecting, Open)
                | (Connecting, Connecting)
                | (Connecting, Idle)
                | (Connecting, Lost)
                | (Open, Connecting)
                | (Open, Idle)
                | (Lost, Connecting)
                | (Lost, Idle)
        )
    }

    fn valid_transitions(&self) -> Vec<Self> {
        use ConnectionState::*;
        match self {
            Idle => vec![Connecting],
            Connecting => vec![Open, Connecting, Idle, Lost],
            Open => vec![Connecting, Idle],
            Lost => vec![Connecting, Idle],
        }
    }
}

/// Snapshot published to observers whenever the connection changes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ConnectionStatus {
    pub state: ConnectionState,
    /// Consecutive failed attempts since the last successful open.
    pub attempt: u32,
}

impl ConnectionStatus {
    /// Only retry exhaustion is reported to the UI as a lost connection.
    pub fn is_connection_lost(&self) -> bool {
        self.state == ConnectionState::Lost
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn identity() -> SessionIdentity {
        SessionIdentity::new("u1", Role::Agent, "t1").unwrap()
    }

    #[test]
    fn connection_url_carries_identity() {
        let base = Url::parse("wss://realtime.example.com/ws").unwrap();
        let url = identity().connection_url(&base);
        assert_eq!(
            url.as_str(),
            "wss://realtime.example.com/ws?id=u1&role=agent&tenant=t1"
        );
    }

    #[test]
    fn connection_url_keeps_unrelated_params_and_replaces_ours() {
        let base = Url::parse("ws://localhost:4000/ws?v=2&id=stale").unwrap();
        let url = identity().connection_url(&base);
        assert_eq!(url.as_str(), "ws://localhost:4000/ws?v=2&id=u1&role=agent&tenant=t1");
    }

    #[test]
    fn connection_url_encodes_values() {
        let base = Url::parse("ws://localhost/ws").unwrap();
        let identity = SessionIdentity::new("a b&c", Role::Contact, "t/1").unwrap();
        let url = identity.connection_url(&base);
        let pairs: Vec<(String, String)> = url
            .query_pairs()
            .map(|(k, v)| (k.into_owned(), v.into_owned()))
            .collect();
        assert_eq!(pairs[0], ("id".to_string(), "a b&c".to_string()));
        assert_eq!(pairs[1], ("role".to_string(), "contact".to_string()));
        assert_eq!(pairs[2], ("tenant".to_string(), "t/1".to_string()));
    }

    #[test]
    fn identity_rejects_blank_fields() {
        assert!(SessionIdentity::new("", Role::Agent, "t1").is_err());
        assert!(SessionIdentity::new("u1", Role::Agent, " ").is_err());
    }

    #[test]
    fn role_round_trips_through_str() {
        assert_eq!("agent".parse::<Role>().unwrap(), Role::Agent);
        assert_eq!(Role::Contact.to_string(), "contact");
        assert!("admin".parse::<Role>().is_err());
    }

    #[test]
    fn open_cannot_jump_to_lost() {
        assert!(!ConnectionState::Open.can_transition_to(&ConnectionState::Lost));
        assert!(ConnectionState::Open
            .transition_to(ConnectionState::Connecting)
            .is_ok());
    }

    #[test]
    fn idle_only_moves_to_connecting() {
        assert_eq!(
            ConnectionState::Idle.valid_transitions(),
            vec![ConnectionState::Connecting]
        );
        assert!(ConnectionState::Idle
            .transition_to(ConnectionState::Open)
            .is_err());
    }

    #[test]
    fn no_state_is_terminal() {
        for state in [
            ConnectionState::Idle,
            ConnectionState::Connecting,
            ConnectionState::Open,
            ConnectionState::Lost,
        ] {
            assert!(!state.is_terminal(), "{:?} should not be terminal", state);
        }
    }

    #[test]
    fn only_lost_is_reported_as_connection_lost() {
        let mut status = ConnectionStatus {
            state: ConnectionState::Connecting,
            attempt: 7,
        };
        assert!(!status.is_connection_lost());
        status.state = ConnectionState::Lost;
        assert!(status.is_connection_lost());
    }
}
