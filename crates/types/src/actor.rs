use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::ActorId;

/// Global account category carried by every actor.
///
/// Distinct from the per-supplier membership role: authorization only ever
/// consults `PlatformAdmin` here. The remaining values describe how the
/// account was provisioned and carry no standing of their own — acting for a
/// supplier requires a staff membership, acting for a consumer requires a
/// contact record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AccountCategory {
    Owner,
    Manager,
    Sales,
    ConsumerContact,
    PlatformAdmin,
}

impl AccountCategory {
    pub fn is_platform_admin(self) -> bool {
        matches!(self, AccountCategory::PlatformAdmin)
    }
}

impl std::fmt::Display for AccountCategory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            AccountCategory::Owner => "owner",
            AccountCategory::Manager => "manager",
            AccountCategory::Sales => "sales",
            AccountCategory::ConsumerContact => "consumer_contact",
            AccountCategory::PlatformAdmin => "platform_admin",
        };
        write!(f, "{s}")
    }
}

/// An identity known to the gate. Category is immutable after creation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Actor {
    pub id: ActorId,
    pub name: String,
    pub category: AccountCategory,
    pub created_at: DateTime<Utc>,
}

impl Actor {
    pub fn new(name: impl Into<String>, category: AccountCategory) -> Self {
        Self {
            id: ActorId::generate(),
            name: name.into(),
            category,
            created_at: Utc::now(),
        }
    }
}
