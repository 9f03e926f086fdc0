use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::{ActorId, ConsumerId, ContactId, LinkId, SupplierId};

/// Lifecycle status of a supplier/consumer relationship.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LinkStatus {
    /// Requested by a consumer contact, awaiting a supplier decision.
    Pending,
    /// Commerce between the pair is open.
    Approved,
    /// Declined from pending. Terminal.
    Rejected,
    /// Shut down by supplier staff. Terminal; existing orders survive.
    Blocked,
}

impl LinkStatus {
    /// The closed transition set of the relationship machine:
    /// pending may move to any decision, approved only to blocked.
    pub fn can_transition_to(self, to: LinkStatus) -> bool {
        matches!(
            (self, to),
            (LinkStatus::Pending, LinkStatus::Approved)
                | (LinkStatus::Pending, LinkStatus::Rejected)
                | (LinkStatus::Pending, LinkStatus::Blocked)
                | (LinkStatus::Approved, LinkStatus::Blocked)
        )
    }
}

impl std::fmt::Display for LinkStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            LinkStatus::Pending => "pending",
            LinkStatus::Approved => "approved",
            LinkStatus::Rejected => "rejected",
            LinkStatus::Blocked => "blocked",
        };
        write!(f, "{s}")
    }
}

/// The approval relationship gating all commerce between one supplier and
/// one consumer. At most one link ever exists per pair.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Link {
    pub id: LinkId,
    pub supplier_id: SupplierId,
    pub consumer_id: ConsumerId,
    pub status: LinkStatus,

    /// Contact that requested the relationship.
    pub requested_by: ContactId,

    /// Reason recorded on rejection or block.
    pub note: Option<String>,

    pub approved_by: Option<ActorId>,
    pub approved_at: Option<DateTime<Utc>>,
    pub blocked_by: Option<ActorId>,
    pub blocked_at: Option<DateTime<Utc>>,

    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Link {
    pub fn new(supplier_id: SupplierId, consumer_id: ConsumerId, requested_by: ContactId) -> Self {
        let now = Utc::now();
        Self {
            id: LinkId::generate(),
            supplier_id,
            consumer_id,
            status: LinkStatus::Pending,
            requested_by,
            note: None,
            approved_by: None,
            approved_at: None,
            blocked_by: None,
            blocked_at: None,
            created_at: now,
            updated_at: now,
        }
    }
}
