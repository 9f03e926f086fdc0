//! The relationship gate: link requests and the supplier decisions on them.
//!
//! A link is the precondition for all commerce between a supplier and a
//! consumer. Requests come from consumer contacts; approve, reject, and
//! block are supplier decisions reserved for manager and owner memberships.
//! Because at most one link ever exists per pair, a rejected or blocked pair
//! stays shut until an operator intervenes out of band.

use chrono::Utc;
use commerce_gate_policy::{Action, Scope};
use commerce_gate_types::{ActorId, ConsumerId, Link, LinkId, LinkStatus, SupplierId};
use tracing::info;

use crate::error::{EngineError, Result};
use crate::CommerceEngine;

impl CommerceEngine {
    /// Opens a pending link request from a contact of `consumer_id` toward
    /// `supplier_id`. Fails with a conflict if any link, whatever its status,
    /// already exists for the pair.
    pub fn request_link(
        &mut self,
        acting: &ActorId,
        supplier_id: SupplierId,
        consumer_id: ConsumerId,
    ) -> Result<Link> {
        self.directory.get_supplier(&supplier_id)?;
        self.directory.get_consumer(&consumer_id)?;
        self.authorize(acting, Action::RequestLink, Scope::pair(supplier_id, consumer_id))?;

        if let Some(existing) = self.directory.link_for_pair(&supplier_id, &consumer_id) {
            return Err(EngineError::Conflict(format!(
                "a link between supplier {supplier_id} and consumer {consumer_id} already exists with status {}",
                existing.status
            )));
        }

        let requested_by = self.acting_contact(&consumer_id, acting)?.id;
        let link = self.directory.insert_link(Link::new(supplier_id, consumer_id, requested_by))?;
        info!(
            link_id = %link.id,
            supplier_id = %supplier_id,
            consumer_id = %consumer_id,
            "link requested"
        );
        Ok(link)
    }

    /// Approves a pending link, opening commerce for the pair.
    pub fn approve_link(&mut self, acting: &ActorId, link_id: LinkId) -> Result<Link> {
        let supplier_id = self.directory.get_link(&link_id)?.supplier_id;
        self.authorize(acting, Action::ApproveLink, Scope::supplier(supplier_id))?;

        let link = self.directory.link_transition(&link_id, LinkStatus::Approved)?;
        link.approved_by = Some(*acting);
        link.approved_at = Some(Utc::now());
        let link = link.clone();
        info!(link_id = %link.id, approved_by = %acting, "link approved");
        Ok(link)
    }

    /// Rejects a pending link. Terminal for the pair.
    pub fn reject_link(
        &mut self,
        acting: &ActorId,
        link_id: LinkId,
        note: Option<String>,
    ) -> Result<Link> {
        let supplier_id = self.directory.get_link(&link_id)?.supplier_id;
        self.authorize(acting, Action::RejectLink, Scope::supplier(supplier_id))?;

        let link = self.directory.link_transition(&link_id, LinkStatus::Rejected)?;
        link.note = note;
        let link = link.clone();
        info!(link_id = %link.id, rejected_by = %acting, "link rejected");
        Ok(link)
    }

    /// Blocks a pending or approved link. New orders and complaints for the
    /// pair are refused from here on; entities created earlier stay valid
    /// and keep moving through their own lifecycles.
    pub fn block_link(
        &mut self,
        acting: &ActorId,
        link_id: LinkId,
        note: Option<String>,
    ) -> Result<Link> {
        let supplier_id = self.directory.get_link(&link_id)?.supplier_id;
        self.authorize(acting, Action::BlockLink, Scope::supplier(supplier_id))?;

        let link = self.directory.link_transition(&link_id, LinkStatus::Blocked)?;
        link.blocked_by = Some(*acting);
        link.blocked_at = Some(Utc::now());
        if note.is_some() {
            link.note = note;
        }
        let link = link.clone();
        info!(link_id = %link.id, blocked_by = %acting, "link blocked");
        Ok(link)
    }
}
