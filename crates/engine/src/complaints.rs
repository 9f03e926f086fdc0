//! Complaint routing: filing, the escalation chain, and resolution.
//!
//! Every complaint carries a responsible staff actor from the moment it is
//! filed. The initial handler comes from `pick_staff`, which walks the
//! assignment order sales -> manager -> owner and takes the first role with
//! an active member. Escalation moves one level at a time through the same
//! chain and never skips an empty level; reaching past owner is an error.

use chrono::Utc;
use commerce_gate_policy::{Action, DirectoryView, Scope};
use commerce_gate_types::{
    ActorId, Complaint, ComplaintId, ComplaintStatus, OrderId, OrderItemId, StaffMembership,
    StaffRole, SupplierId,
};
use tracing::info;

use crate::error::{EngineError, Result};
use crate::CommerceEngine;

/// Statuses from which escalation and resolution remain open.
const ACTIVE_STATUSES: [ComplaintStatus; 3] = [
    ComplaintStatus::Open,
    ComplaintStatus::InProgress,
    ComplaintStatus::Escalated,
];

impl CommerceEngine {
    /// Files a complaint against an order, routes it to an initial handler,
    /// and guarantees the complaint's conversation exists with that handler
    /// and the filing contact on it.
    pub fn file_complaint(
        &mut self,
        acting: &ActorId,
        order_id: OrderId,
        order_item_id: Option<OrderItemId>,
        description: impl Into<String>,
    ) -> Result<Complaint> {
        let order = self.directory.get_order(&order_id)?;
        let supplier_id = order.supplier_id;
        let consumer_id = order.consumer_id;
        if let Some(item_id) = order_item_id {
            if !order.items.iter().any(|item| item.id == item_id) {
                return Err(EngineError::Validation(format!(
                    "order item {item_id} does not belong to order {order_id}"
                )));
            }
        }
        self.authorize(acting, Action::FileComplaint, Scope::pair(supplier_id, consumer_id))?;
        let filed_by = self.acting_contact(&consumer_id, acting)?.id;

        let description = description.into();
        if description.trim().is_empty() {
            return Err(EngineError::Validation(
                "complaint description must not be empty".into(),
            ));
        }

        let handler = self.pick_staff(&supplier_id)?;
        let handler_actor = handler.actor_id;
        let handler_membership = handler.id;

        let complaint = Complaint::new(order_id, order_item_id, filed_by, description, handler_actor);
        let conversation_id =
            self.directory
                .ensure_conversation(complaint.id, filed_by, handler_membership);
        let complaint = self.directory.insert_complaint(complaint);
        info!(
            complaint_id = %complaint.id,
            order_id = %order_id,
            assigned_to = %handler_actor,
            conversation_id = %conversation_id,
            "complaint filed"
        );
        Ok(complaint)
    }

    /// Reassigns a complaint one level up the chain.
    ///
    /// The next role is computed from the current assignee's membership role,
    /// regardless of that membership's active flag; the target must be an
    /// active member holding exactly that next role. The target's membership
    /// joins the conversation, prior participants stay.
    pub fn escalate_complaint(&mut self, acting: &ActorId, complaint_id: ComplaintId) -> Result<Complaint> {
        let complaint = self.directory.get_complaint(&complaint_id)?;
        let status = complaint.status;
        let assigned_to = complaint.assigned_to;
        let filed_by = complaint.filed_by;
        let order_id = complaint.order_id;
        let supplier_id = self.directory.get_order(&order_id)?.supplier_id;
        self.authorize(acting, Action::EscalateComplaint, Scope::supplier(supplier_id))?;

        if !status.is_active() {
            return Err(EngineError::InvalidTransition {
                entity: "complaint",
                id: complaint_id.to_string(),
                from: status.to_string(),
                to: ComplaintStatus::Escalated.to_string(),
            });
        }

        let current_role = self
            .directory
            .membership_for_pair(&supplier_id, &assigned_to)
            .map(|membership| membership.role)
            .ok_or_else(|| {
                EngineError::Validation(format!(
                    "complaint assignee {assigned_to} holds no membership at supplier {supplier_id}"
                ))
            })?;
        let next_role = current_role
            .next()
            .ok_or(EngineError::AlreadyAtCeiling { complaint_id })?;
        let target = self
            .directory
            .active_staff_with_role(&supplier_id, next_role)
            .ok_or(EngineError::NoStaffAvailable { supplier_id })?;
        let target_actor = target.actor_id;
        let target_membership = target.id;

        self.directory
            .ensure_conversation(complaint_id, filed_by, target_membership);
        let complaint =
            self.directory
                .complaint_transition(&complaint_id, &ACTIVE_STATUSES, ComplaintStatus::Escalated)?;
        complaint.assigned_to = target_actor;
        complaint.escalated_to = Some(target_actor);
        complaint.escalated_at = Some(Utc::now());
        let complaint = complaint.clone();
        info!(
            complaint_id = %complaint.id,
            from_role = %current_role,
            to_role = %next_role,
            assigned_to = %target_actor,
            "complaint escalated"
        );
        Ok(complaint)
    }

    /// Closes a complaint with a resolution text and takes over assignment.
    ///
    /// Open to supplier staff whose active membership already sits in the
    /// complaint's conversation; a consumer contact is forbidden outright.
    pub fn resolve_complaint(
        &mut self,
        acting: &ActorId,
        complaint_id: ComplaintId,
        resolution: impl Into<String>,
    ) -> Result<Complaint> {
        let complaint = self.directory.get_complaint(&complaint_id)?;
        let order_id = complaint.order_id;
        let supplier_id = self.directory.get_order(&order_id)?.supplier_id;
        self.authorize(acting, Action::ResolveComplaint, Scope::supplier(supplier_id))?;

        let resolution = resolution.into();
        if resolution.trim().is_empty() {
            return Err(EngineError::Validation(
                "resolution text must not be empty".into(),
            ));
        }

        if !self.directory.is_platform_admin(acting) {
            let membership = self
                .directory
                .membership_for_pair(&supplier_id, acting)
                .filter(|m| m.active)
                .map(|m| m.id)
                .ok_or_else(|| {
                    EngineError::Forbidden(
                        "resolving requires an active staff membership at the supplier".into(),
                    )
                })?;
            let conversation = self.directory.conversation_for_complaint(&complaint_id)?;
            if !conversation.has_participant(&membership) {
                return Err(EngineError::Forbidden(
                    "only a staff participant of the complaint's conversation may resolve it".into(),
                ));
            }
        }

        let complaint =
            self.directory
                .complaint_transition(&complaint_id, &ACTIVE_STATUSES, ComplaintStatus::Resolved)?;
        complaint.resolution = Some(resolution);
        complaint.resolved_at = Some(Utc::now());
        complaint.assigned_to = *acting;
        let complaint = complaint.clone();
        info!(complaint_id = %complaint.id, resolved_by = %acting, "complaint resolved");
        Ok(complaint)
    }

    /// First active member in assignment order, sales before manager before
    /// owner.
    fn pick_staff(&self, supplier_id: &SupplierId) -> Result<&StaffMembership> {
        StaffRole::ASSIGNMENT_ORDER
            .iter()
            .find_map(|role| self.directory.active_staff_with_role(supplier_id, *role))
            .ok_or(EngineError::NoStaffAvailable {
                supplier_id: *supplier_id,
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testkit::world;

    fn filed() -> (crate::testkit::World, Complaint) {
        let mut w = world();
        w.approve_link();
        let order = w.place_standard_order();
        w.engine.accept_order(&w.sales, order.id).unwrap();
        let complaint = w
            .engine
            .file_complaint(&w.buyer, order.id, None, "two widgets arrived dented")
            .unwrap();
        (w, complaint)
    }

    // ==================== Filing ====================

    #[test]
    fn test_filing_assigns_sales_first() {
        let (w, complaint) = filed();
        assert_eq!(complaint.status, ComplaintStatus::Open);
        assert_eq!(complaint.assigned_to, w.sales);
        assert_eq!(complaint.filed_by, w.buyer_contact);
    }

    #[test]
    fn test_filing_creates_conversation_with_handler_and_contact() {
        let (w, complaint) = filed();
        let conversation = w
            .engine
            .directory()
            .conversation_for_complaint(&complaint.id)
            .unwrap();
        assert_eq!(conversation.contact_id, w.buyer_contact);
        assert!(conversation.has_participant(&w.sales_membership));
        assert_eq!(conversation.participants.len(), 1);
    }

    #[test]
    fn test_filing_without_sales_falls_to_manager() {
        let mut w = world();
        w.approve_link();
        let order = w.place_standard_order();
        w.engine.deactivate_staff(&w.owner, w.sales_membership).unwrap();

        let complaint = w
            .engine
            .file_complaint(&w.buyer, order.id, None, "late delivery")
            .unwrap();
        assert_eq!(complaint.assigned_to, w.manager);
    }

    #[test]
    fn test_filing_with_no_active_staff_fails() {
        let mut w = world();
        w.approve_link();
        let order = w.place_standard_order();
        w.engine.deactivate_staff(&w.owner, w.sales_membership).unwrap();
        w.engine
            .deactivate_staff(&w.owner, w.manager_membership)
            .unwrap();
        w.engine.deactivate_staff(&w.admin, w.owner_membership).unwrap();

        let err = w
            .engine
            .file_complaint(&w.buyer, order.id, None, "late delivery")
            .unwrap_err();
        assert_eq!(err.code(), "no_staff_available");
    }

    #[test]
    fn test_filing_against_a_specific_line() {
        let mut w = world();
        w.approve_link();
        let order = w.place_standard_order();
        let line = order.items[0].id;

        let complaint = w
            .engine
            .file_complaint(&w.buyer, order.id, Some(line), "this line is short two units")
            .unwrap();
        assert_eq!(complaint.order_item_id, Some(line));

        let err = w
            .engine
            .file_complaint(&w.buyer, order.id, Some(OrderItemId::generate()), "x")
            .unwrap_err();
        assert_eq!(err.code(), "validation_error");
    }

    #[test]
    fn test_filing_needs_contact_standing_and_description() {
        let (mut w, _) = filed();
        let order = w.place_standard_order();

        let err = w
            .engine
            .file_complaint(&w.sales, order.id, None, "staff filing")
            .unwrap_err();
        assert_eq!(err.code(), "forbidden");

        let err = w
            .engine
            .file_complaint(&w.buyer, order.id, None, "   ")
            .unwrap_err();
        assert_eq!(err.code(), "validation_error");
    }

    // ==================== Escalation ====================

    #[test]
    fn test_escalation_walks_sales_manager_owner() {
        let (mut w, complaint) = filed();

        let escalated = w.engine.escalate_complaint(&w.sales, complaint.id).unwrap();
        assert_eq!(escalated.status, ComplaintStatus::Escalated);
        assert_eq!(escalated.assigned_to, w.manager);
        assert_eq!(escalated.escalated_to, Some(w.manager));

        let escalated = w.engine.escalate_complaint(&w.manager, complaint.id).unwrap();
        assert_eq!(escalated.assigned_to, w.owner);

        let err = w.engine.escalate_complaint(&w.owner, complaint.id).unwrap_err();
        assert_eq!(err.code(), "already_at_ceiling");
    }

    #[test]
    fn test_escalation_grows_participants_monotonically() {
        let (mut w, complaint) = filed();
        w.engine.escalate_complaint(&w.sales, complaint.id).unwrap();
        w.engine.escalate_complaint(&w.sales, complaint.id).unwrap();

        let conversation = w
            .engine
            .directory()
            .conversation_for_complaint(&complaint.id)
            .unwrap();
        assert!(conversation.has_participant(&w.sales_membership));
        assert!(conversation.has_participant(&w.manager_membership));
        assert!(conversation.has_participant(&w.owner_membership));
        assert_eq!(conversation.participants.len(), 3);
    }

    #[test]
    fn test_escalation_never_skips_an_empty_level() {
        let (mut w, complaint) = filed();
        w.engine
            .deactivate_staff(&w.owner, w.manager_membership)
            .unwrap();

        let err = w.engine.escalate_complaint(&w.sales, complaint.id).unwrap_err();
        assert_eq!(err.code(), "no_staff_available");
    }

    #[test]
    fn test_contact_cannot_escalate() {
        let (mut w, complaint) = filed();
        let err = w.engine.escalate_complaint(&w.buyer, complaint.id).unwrap_err();
        assert_eq!(err.code(), "forbidden");
    }

    #[test]
    fn test_escalation_refused_once_settled() {
        let (mut w, complaint) = filed();
        w.engine
            .resolve_complaint(&w.sales, complaint.id, "replaced both units")
            .unwrap();

        let err = w.engine.escalate_complaint(&w.sales, complaint.id).unwrap_err();
        assert_eq!(err.code(), "invalid_transition");
    }

    // ==================== Resolution ====================

    #[test]
    fn test_participant_resolves_and_takes_assignment() {
        let (mut w, complaint) = filed();

        let resolved = w
            .engine
            .resolve_complaint(&w.sales, complaint.id, "replaced both units")
            .unwrap();
        assert_eq!(resolved.status, ComplaintStatus::Resolved);
        assert_eq!(resolved.resolution.as_deref(), Some("replaced both units"));
        assert!(resolved.resolved_at.is_some());
        assert_eq!(resolved.assigned_to, w.sales);
    }

    #[test]
    fn test_resolution_text_must_be_non_empty() {
        let (mut w, complaint) = filed();
        let err = w
            .engine
            .resolve_complaint(&w.sales, complaint.id, "  ")
            .unwrap_err();
        assert_eq!(err.code(), "validation_error");
    }

    #[test]
    fn test_consumer_contact_cannot_resolve() {
        let (mut w, complaint) = filed();
        let err = w
            .engine
            .resolve_complaint(&w.buyer, complaint.id, "all fine now")
            .unwrap_err();
        assert_eq!(err.code(), "forbidden");
    }

    #[test]
    fn test_non_participant_staff_cannot_resolve() {
        let (mut w, complaint) = filed();
        // The owner staffs the supplier but was never pulled into the
        // conversation.
        let err = w
            .engine
            .resolve_complaint(&w.owner, complaint.id, "closing this")
            .unwrap_err();
        assert_eq!(err.code(), "forbidden");

        w.engine.escalate_complaint(&w.sales, complaint.id).unwrap();
        w.engine.escalate_complaint(&w.sales, complaint.id).unwrap();
        assert!(w
            .engine
            .resolve_complaint(&w.owner, complaint.id, "closing this")
            .is_ok());
    }

    #[test]
    fn test_platform_admin_may_resolve() {
        let (mut w, complaint) = filed();
        let resolved = w
            .engine
            .resolve_complaint(&w.admin, complaint.id, "handled centrally")
            .unwrap();
        assert_eq!(resolved.assigned_to, w.admin);
    }

    #[test]
    fn test_double_resolve_is_invalid() {
        let (mut w, complaint) = filed();
        w.engine
            .resolve_complaint(&w.sales, complaint.id, "replaced both units")
            .unwrap();
        let err = w
            .engine
            .resolve_complaint(&w.sales, complaint.id, "again")
            .unwrap_err();
        assert_eq!(err.code(), "invalid_transition");
    }

    #[test]
    fn test_assignee_role_survives_deactivation_for_chain_position() {
        let (mut w, complaint) = filed();
        // The sales assignee leaves; their recorded role still anchors the
        // chain, so the next stop is manager.
        w.engine.deactivate_staff(&w.owner, w.sales_membership).unwrap();

        let escalated = w.engine.escalate_complaint(&w.manager, complaint.id).unwrap();
        assert_eq!(escalated.assigned_to, w.manager);
    }
}
