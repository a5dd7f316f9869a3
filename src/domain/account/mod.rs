//! Account domain module.
//!
//! The signed-in user and the company (tenant) they belong to. Company
//! changes reach the client as `company_updated` and are applied to the
//! user record as a patch.

use serde::{Deserialize, Serialize};

use crate::domain::foundation::CompanyId;

/// Tenant company profile.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Company {
    pub id: CompanyId,

    pub name: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub domain: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub logo_url: Option<String>,
}

/// Partial update applied to the signed-in user.
///
/// Fields left `None` are not touched.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct UserPatch {
    pub company: Option<Company>,
}

impl UserPatch {
    /// Patch replacing the user's company.
    pub fn company(company: Company) -> Self {
        Self {
            company: Some(company),
        }
    }

    /// Returns true if the patch changes nothing.
    pub fn is_empty(&self) -> bool {
        self.company.is_none()
    }
}
