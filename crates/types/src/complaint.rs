use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::{ActorId, ComplaintId, ContactId, OrderId, OrderItemId};

/// Lifecycle status of a complaint.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ComplaintStatus {
    /// Filed and assigned to an initial handler.
    Open,
    /// Being worked by the assignee.
    InProgress,
    /// Reassigned up the staff chain at least once.
    Escalated,
    /// Closed with a resolution text. Terminal.
    Resolved,
    /// Administratively closed. Terminal.
    Closed,
}

impl ComplaintStatus {
    /// Whether the complaint still accepts escalation and resolution.
    pub fn is_active(self) -> bool {
        matches!(
            self,
            ComplaintStatus::Open | ComplaintStatus::InProgress | ComplaintStatus::Escalated
        )
    }
}

impl std::fmt::Display for ComplaintStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            ComplaintStatus::Open => "open",
            ComplaintStatus::InProgress => "in_progress",
            ComplaintStatus::Escalated => "escalated",
            ComplaintStatus::Resolved => "resolved",
            ComplaintStatus::Closed => "closed",
        };
        write!(f, "{s}")
    }
}

/// A complaint filed by a consumer contact against an order (optionally a
/// specific line). Always carries a responsible staff actor; the assignment
/// trail is visible through `escalated_to`/`escalated_at`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Complaint {
    pub id: ComplaintId,
    pub order_id: OrderId,
    pub order_item_id: Option<OrderItemId>,

    /// Contact that filed the complaint.
    pub filed_by: ContactId,

    pub description: String,
    pub status: ComplaintStatus,

    /// Staff actor currently responsible.
    pub assigned_to: ActorId,

    pub escalated_to: Option<ActorId>,
    pub escalated_at: Option<DateTime<Utc>>,
    pub resolution: Option<String>,
    pub resolved_at: Option<DateTime<Utc>>,

    pub created_at: DateTime<Utc>,
}

impl Complaint {
    pub fn new(
        order_id: OrderId,
        order_item_id: Option<OrderItemId>,
        filed_by: ContactId,
        description: impl Into<String>,
        assigned_to: ActorId,
    ) -> Self {
        Self {
            id: ComplaintId::generate(),
            order_id,
            order_item_id,
            filed_by,
            description: description.into(),
            status: ComplaintStatus::Open,
            assigned_to,
            escalated_to: None,
            escalated_at: None,
            resolution: None,
            resolved_at: None,
            created_at: Utc::now(),
        }
    }
}
