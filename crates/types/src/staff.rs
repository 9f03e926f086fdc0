use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::{ActorId, MembershipId, SupplierId};

/// Role held within one supplier, ordered by escalation seniority.
///
/// The variant order is the escalation chain: complaints climb
/// `Sales -> Manager -> Owner` and never skip or repeat a level.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StaffRole {
    Sales,
    Manager,
    Owner,
}

impl StaffRole {
    /// Priority order used when picking an initial complaint handler.
    pub const ASSIGNMENT_ORDER: [StaffRole; 3] =
        [StaffRole::Sales, StaffRole::Manager, StaffRole::Owner];

    /// The next role up the escalation chain, or `None` at the ceiling.
    pub fn next(self) -> Option<StaffRole> {
        match self {
            StaffRole::Sales => Some(StaffRole::Manager),
            StaffRole::Manager => Some(StaffRole::Owner),
            StaffRole::Owner => None,
        }
    }

    /// Whether this role may manage staff and decide link requests.
    pub fn is_privileged(self) -> bool {
        matches!(self, StaffRole::Manager | StaffRole::Owner)
    }
}

impl std::fmt::Display for StaffRole {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            StaffRole::Sales => "sales",
            StaffRole::Manager => "manager",
            StaffRole::Owner => "owner",
        };
        write!(f, "{s}")
    }
}

/// An actor's standing within one supplier. Unique per (supplier, actor).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StaffMembership {
    pub id: MembershipId,
    pub supplier_id: SupplierId,
    pub actor_id: ActorId,
    pub role: StaffRole,
    pub active: bool,
    pub created_at: DateTime<Utc>,
}

impl StaffMembership {
    pub fn new(supplier_id: SupplierId, actor_id: ActorId, role: StaffRole) -> Self {
        Self {
            id: MembershipId::generate(),
            supplier_id,
            actor_id,
            role,
            active: true,
            created_at: Utc::now(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_chain_advances_in_order() {
        assert_eq!(StaffRole::Sales.next(), Some(StaffRole::Manager));
        assert_eq!(StaffRole::Manager.next(), Some(StaffRole::Owner));
        assert_eq!(StaffRole::Owner.next(), None);
    }

    #[test]
    fn test_chain_matches_assignment_order() {
        let mut walked = vec![StaffRole::ASSIGNMENT_ORDER[0]];
        while let Some(next) = walked.last().unwrap().next() {
            walked.push(next);
        }
        assert_eq!(walked, StaffRole::ASSIGNMENT_ORDER.to_vec());
    }

    #[test]
    fn test_role_ordering_follows_seniority() {
        assert!(StaffRole::Sales < StaffRole::Manager);
        assert!(StaffRole::Manager < StaffRole::Owner);
    }

    #[test]
    fn test_privileged_roles() {
        assert!(!StaffRole::Sales.is_privileged());
        assert!(StaffRole::Manager.is_privileged());
        assert!(StaffRole::Owner.is_privileged());
    }
}
