//! CompanyEventHandler - Patches the signed-in user's company.

use std::sync::Arc;

use async_trait::async_trait;

use crate::domain::account::UserPatch;
use crate::domain::foundation::DomainError;
use crate::domain::realtime::{EventKind, InboundEvent};
use crate::ports::{AccountStore, EventHandler};

pub struct CompanyEventHandler {
    store: Arc<dyn AccountStore>,
}

impl CompanyEventHandler {
    pub const KINDS: [EventKind; 1] = [EventKind::CompanyUpdated];

    pub fn new(store: Arc<dyn AccountStore>) -> Self {
        Self { store }
    }
}

#[async_trait]
impl EventHandler for CompanyEventHandler {
    async fn handle(&self, event: &InboundEvent) -> Result<(), DomainError> {
        match event {
            InboundEvent::CompanyUpdated(company) => {
                self.store
                    .update_user(UserPatch::company(company.clone()))
                    .await
            }
            other => {
                tracing::debug!(
                    handler = self.name(),
                    event = %other.kind(),
                    "Event not handled here"
                );
                Ok(())
            }
        }
    }

    fn name(&self) -> &'static str {
        "CompanyEventHandler"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::stores::InMemoryAccountStore;
    use crate::domain::account::Company;
    use crate::domain::foundation::CompanyId;

    #[tokio::test]
    async fn company_update_patches_user() {
        let store = InMemoryAccountStore::new();
        let handler = CompanyEventHandler::new(Arc::new(store.clone()));
        let company = Company {
            id: CompanyId::new("t1").unwrap(),
            name: "Acme Support".to_string(),
            domain: Some("acme.test".to_string()),
            logo_url: None,
        };

        handler
            .handle(&InboundEvent::CompanyUpdated(company.clone()))
            .await
            .unwrap();

        assert_eq!(store.company().await, Some(company));
    }
}
