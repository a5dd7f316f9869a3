//! AccountStore port - The signed-in user and their company.

use async_trait::async_trait;

use crate::domain::account::UserPatch;
use crate::domain::foundation::DomainError;

/// Port for the auth/account store.
#[async_trait]
pub trait AccountStore: Send + Sync {
    /// Apply a partial update to the signed-in user.
    async fn update_user(&self, patch: UserPatch) -> Result<(), DomainError>;
}
