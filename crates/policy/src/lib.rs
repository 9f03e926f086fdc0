//! Authorization policy for the commerce gate.
//!
//! Every mutation consults [`decide`] before the owning engine runs its
//! transition. The policy is pure: it reads directory state through
//! [`DirectoryView`] and holds none of its own, so each decision reflects
//! the link/staff state at the moment of the call — nothing is cached
//! across requests. Entity-level preconditions (being the placing contact,
//! being a conversation participant) belong to the owning engines, not to
//! this role-level gate.
//!
//! Rules, in precedence order:
//! 1. A `platform_admin` account category is allowed everything.
//! 2. An active staff membership on the scoped supplier allows staff-side
//!    actions; link decisions and staff management additionally require a
//!    manager or owner role.
//! 3. A consumer contact of the scoped consumer is allowed consumer-side
//!    actions; creation actions (orders, complaints) additionally require an
//!    approved link to the scoped supplier.
//! 4. Otherwise deny.

use commerce_gate_types::{ActorId, ConsumerId, LinkStatus, StaffRole, SupplierId};

/// Read-only directory access the policy evaluates against.
pub trait DirectoryView {
    /// Whether the actor exists and carries the platform-admin category.
    fn is_platform_admin(&self, actor: &ActorId) -> bool;

    /// Whether the actor is known to the directory at all.
    fn actor_exists(&self, actor: &ActorId) -> bool;

    /// Role of the actor's active membership on the supplier, if any.
    /// Inactive memberships must not be reported.
    fn active_staff_role(&self, supplier: &SupplierId, actor: &ActorId) -> Option<StaffRole>;

    /// Whether the actor is a contact of the consumer.
    fn is_consumer_contact(&self, consumer: &ConsumerId, actor: &ActorId) -> bool;

    /// Current link status of the pair, if a link exists.
    fn link_status(&self, supplier: &SupplierId, consumer: &ConsumerId) -> Option<LinkStatus>;
}

/// The action vocabulary of the gate.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    RequestLink,
    ApproveLink,
    RejectLink,
    BlockLink,
    ManageStaff,
    CreateOrder,
    AcceptOrder,
    RejectOrder,
    CompleteOrder,
    CancelOrder,
    FileComplaint,
    EscalateComplaint,
    ResolveComplaint,
    PostMessage,
    ReadConversation,
}

impl Action {
    /// Staff-side permission for a given membership role.
    fn open_to_staff(self, role: StaffRole) -> bool {
        match self {
            // Link decisions and staff management are privileged.
            Action::ApproveLink
            | Action::RejectLink
            | Action::BlockLink
            | Action::ManageStaff => role.is_privileged(),
            // Day-to-day order and complaint work is open to every role.
            Action::AcceptOrder
            | Action::RejectOrder
            | Action::CompleteOrder
            | Action::CancelOrder
            | Action::EscalateComplaint
            | Action::ResolveComplaint
            | Action::PostMessage
            | Action::ReadConversation => true,
            // Consumer-side actions never come through a membership.
            Action::RequestLink | Action::CreateOrder | Action::FileComplaint => false,
        }
    }

    /// Consumer-side permission.
    fn open_to_contact(self) -> bool {
        matches!(
            self,
            Action::RequestLink
                | Action::CreateOrder
                | Action::FileComplaint
                | Action::CancelOrder
                | Action::PostMessage
                | Action::ReadConversation
        )
    }

    /// Creation actions that re-check the pair's link. Acting on entities
    /// that already exist (cancel, messaging) deliberately does not, so a
    /// later block never strands them.
    fn requires_approved_link(self) -> bool {
        matches!(self, Action::CreateOrder | Action::FileComplaint)
    }
}

impl std::fmt::Display for Action {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            Action::RequestLink => "request_link",
            Action::ApproveLink => "approve_link",
            Action::RejectLink => "reject_link",
            Action::BlockLink => "block_link",
            Action::ManageStaff => "manage_staff",
            Action::CreateOrder => "create_order",
            Action::AcceptOrder => "accept_order",
            Action::RejectOrder => "reject_order",
            Action::CompleteOrder => "complete_order",
            Action::CancelOrder => "cancel_order",
            Action::FileComplaint => "file_complaint",
            Action::EscalateComplaint => "escalate_complaint",
            Action::ResolveComplaint => "resolve_complaint",
            Action::PostMessage => "post_message",
            Action::ReadConversation => "read_conversation",
        };
        write!(f, "{s}")
    }
}

/// The organizations an action is evaluated against.
#[derive(Debug, Clone, Copy, Default)]
pub struct Scope {
    pub supplier: Option<SupplierId>,
    pub consumer: Option<ConsumerId>,
}

impl Scope {
    pub fn supplier(supplier: SupplierId) -> Self {
        Self {
            supplier: Some(supplier),
            consumer: None,
        }
    }

    pub fn consumer(consumer: ConsumerId) -> Self {
        Self {
            supplier: None,
            consumer: Some(consumer),
        }
    }

    pub fn pair(supplier: SupplierId, consumer: ConsumerId) -> Self {
        Self {
            supplier: Some(supplier),
            consumer: Some(consumer),
        }
    }
}

/// Outcome of a policy evaluation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Decision {
    Allow,
    Deny { reason: String },
}

impl Decision {
    pub fn deny(reason: impl Into<String>) -> Self {
        Decision::Deny {
            reason: reason.into(),
        }
    }

    pub fn is_allowed(&self) -> bool {
        matches!(self, Decision::Allow)
    }
}

/// Decide whether `actor` may perform `action` within `scope`.
pub fn decide<V: DirectoryView>(
    view: &V,
    actor: &ActorId,
    action: Action,
    scope: Scope,
) -> Decision {
    if !view.actor_exists(actor) {
        return Decision::deny("actor is not known to the directory");
    }

    // Rule 1: platform admin bypass.
    if view.is_platform_admin(actor) {
        return Decision::Allow;
    }

    // Rule 2: active staff membership on the scoped supplier.
    if let Some(supplier) = &scope.supplier {
        if let Some(role) = view.active_staff_role(supplier, actor) {
            if action.open_to_staff(role) {
                return Decision::Allow;
            }
            // A membership exists but the role does not carry the action.
            // Consumer-side actions fall through: the actor may still hold
            // contact standing.
            if !action.open_to_contact() {
                return Decision::deny(format!(
                    "{action} requires a manager or owner membership, actor holds {role}"
                ));
            }
        }
    }

    // Rule 3: consumer contact, with a link check for creation actions.
    if let Some(consumer) = &scope.consumer {
        if view.is_consumer_contact(consumer, actor) {
            if !action.open_to_contact() {
                return Decision::deny(format!("{action} is not open to consumer contacts"));
            }
            if action.requires_approved_link() {
                let Some(supplier) = &scope.supplier else {
                    return Decision::deny(format!("{action} requires a supplier scope"));
                };
                return match view.link_status(supplier, consumer) {
                    Some(LinkStatus::Approved) => Decision::Allow,
                    Some(status) => Decision::deny(format!(
                        "link between supplier and consumer is {status}, not approved"
                    )),
                    None => Decision::deny("no link exists between supplier and consumer"),
                };
            }
            return Decision::Allow;
        }
    }

    // Rule 4.
    Decision::deny(format!("no staff membership or consumer standing grants {action}"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use commerce_gate_types::{AccountCategory, Actor};
    use std::collections::HashMap;

    // ==================== Mock Directory ====================

    #[derive(Default)]
    struct MockDirectory {
        admins: Vec<ActorId>,
        actors: Vec<ActorId>,
        staff: HashMap<(SupplierId, ActorId), StaffRole>,
        contacts: Vec<(ConsumerId, ActorId)>,
        links: HashMap<(SupplierId, ConsumerId), LinkStatus>,
    }

    impl MockDirectory {
        fn with_actor(mut self, actor: &Actor) -> Self {
            self.actors.push(actor.id);
            if actor.category.is_platform_admin() {
                self.admins.push(actor.id);
            }
            self
        }

        fn with_staff(mut self, supplier: SupplierId, actor: ActorId, role: StaffRole) -> Self {
            self.staff.insert((supplier, actor), role);
            self
        }

        fn with_contact(mut self, consumer: ConsumerId, actor: ActorId) -> Self {
            self.contacts.push((consumer, actor));
            self
        }

        fn with_link(mut self, supplier: SupplierId, consumer: ConsumerId, status: LinkStatus) -> Self {
            self.links.insert((supplier, consumer), status);
            self
        }
    }

    impl DirectoryView for MockDirectory {
        fn is_platform_admin(&self, actor: &ActorId) -> bool {
            self.admins.contains(actor)
        }

        fn actor_exists(&self, actor: &ActorId) -> bool {
            self.actors.contains(actor)
        }

        fn active_staff_role(&self, supplier: &SupplierId, actor: &ActorId) -> Option<StaffRole> {
            self.staff.get(&(*supplier, *actor)).copied()
        }

        fn is_consumer_contact(&self, consumer: &ConsumerId, actor: &ActorId) -> bool {
            self.contacts.contains(&(*consumer, *actor))
        }

        fn link_status(&self, supplier: &SupplierId, consumer: &ConsumerId) -> Option<LinkStatus> {
            self.links.get(&(*supplier, *consumer)).copied()
        }
    }

    fn actor(category: AccountCategory) -> Actor {
        Actor::new("someone", category)
    }

    // ==================== Rule 1: platform admin ====================

    #[test]
    fn test_platform_admin_allowed_everything() {
        let admin = actor(AccountCategory::PlatformAdmin);
        let view = MockDirectory::default().with_actor(&admin);
        let scope = Scope::pair(SupplierId::generate(), ConsumerId::generate());

        for action in [
            Action::ApproveLink,
            Action::ManageStaff,
            Action::CreateOrder,
            Action::ResolveComplaint,
            Action::PostMessage,
        ] {
            assert!(decide(&view, &admin.id, action, scope).is_allowed(), "{action}");
        }
    }

    #[test]
    fn test_unknown_actor_denied() {
        let view = MockDirectory::default();
        let ghost = ActorId::generate();
        let scope = Scope::supplier(SupplierId::generate());

        let decision = decide(&view, &ghost, Action::AcceptOrder, scope);
        assert!(!decision.is_allowed());
    }

    // ==================== Rule 2: staff memberships ====================

    #[test]
    fn test_owner_and_manager_may_decide_links() {
        let supplier = SupplierId::generate();
        for role in [StaffRole::Owner, StaffRole::Manager] {
            let staff = actor(AccountCategory::Manager);
            let view = MockDirectory::default()
                .with_actor(&staff)
                .with_staff(supplier, staff.id, role);

            let decision = decide(&view, &staff.id, Action::ApproveLink, Scope::supplier(supplier));
            assert!(decision.is_allowed(), "{role}");
        }
    }

    #[test]
    fn test_sales_denied_link_decisions_and_staff_management() {
        let supplier = SupplierId::generate();
        let sales = actor(AccountCategory::Sales);
        let view = MockDirectory::default()
            .with_actor(&sales)
            .with_staff(supplier, sales.id, StaffRole::Sales);

        for action in [Action::ApproveLink, Action::BlockLink, Action::ManageStaff] {
            let decision = decide(&view, &sales.id, action, Scope::supplier(supplier));
            assert!(!decision.is_allowed(), "{action}");
        }
    }

    #[test]
    fn test_sales_may_work_orders_and_complaints() {
        let supplier = SupplierId::generate();
        let sales = actor(AccountCategory::Sales);
        let view = MockDirectory::default()
            .with_actor(&sales)
            .with_staff(supplier, sales.id, StaffRole::Sales);

        for action in [
            Action::AcceptOrder,
            Action::RejectOrder,
            Action::CompleteOrder,
            Action::EscalateComplaint,
            Action::ResolveComplaint,
        ] {
            let decision = decide(&view, &sales.id, action, Scope::supplier(supplier));
            assert!(decision.is_allowed(), "{action}");
        }
    }

    #[test]
    fn test_membership_on_other_supplier_does_not_count() {
        let supplier = SupplierId::generate();
        let elsewhere = SupplierId::generate();
        let staff = actor(AccountCategory::Owner);
        let view = MockDirectory::default()
            .with_actor(&staff)
            .with_staff(elsewhere, staff.id, StaffRole::Owner);

        let decision = decide(&view, &staff.id, Action::AcceptOrder, Scope::supplier(supplier));
        assert!(!decision.is_allowed());
    }

    // ==================== Rule 3: consumer contacts ====================

    #[test]
    fn test_contact_with_approved_link_creates_orders() {
        let supplier = SupplierId::generate();
        let consumer = ConsumerId::generate();
        let contact = actor(AccountCategory::ConsumerContact);
        let view = MockDirectory::default()
            .with_actor(&contact)
            .with_contact(consumer, contact.id)
            .with_link(supplier, consumer, LinkStatus::Approved);

        let decision = decide(
            &view,
            &contact.id,
            Action::CreateOrder,
            Scope::pair(supplier, consumer),
        );
        assert!(decision.is_allowed());
    }

    #[test]
    fn test_contact_without_approved_link_denied_creation() {
        let supplier = SupplierId::generate();
        let consumer = ConsumerId::generate();
        let contact = actor(AccountCategory::ConsumerContact);

        for status in [LinkStatus::Pending, LinkStatus::Rejected, LinkStatus::Blocked] {
            let view = MockDirectory::default()
                .with_actor(&contact)
                .with_contact(consumer, contact.id)
                .with_link(supplier, consumer, status);

            let decision = decide(
                &view,
                &contact.id,
                Action::CreateOrder,
                Scope::pair(supplier, consumer),
            );
            assert!(!decision.is_allowed(), "{status}");
        }
    }

    #[test]
    fn test_contact_cancel_skips_link_recheck() {
        // Blocking a pair must not strand already-created orders.
        let supplier = SupplierId::generate();
        let consumer = ConsumerId::generate();
        let contact = actor(AccountCategory::ConsumerContact);
        let view = MockDirectory::default()
            .with_actor(&contact)
            .with_contact(consumer, contact.id)
            .with_link(supplier, consumer, LinkStatus::Blocked);

        let decision = decide(
            &view,
            &contact.id,
            Action::CancelOrder,
            Scope::pair(supplier, consumer),
        );
        assert!(decision.is_allowed());
    }

    #[test]
    fn test_contact_denied_staff_side_actions() {
        let supplier = SupplierId::generate();
        let consumer = ConsumerId::generate();
        let contact = actor(AccountCategory::ConsumerContact);
        let view = MockDirectory::default()
            .with_actor(&contact)
            .with_contact(consumer, contact.id)
            .with_link(supplier, consumer, LinkStatus::Approved);

        for action in [Action::AcceptOrder, Action::ApproveLink, Action::ResolveComplaint] {
            let decision = decide(&view, &contact.id, action, Scope::pair(supplier, consumer));
            assert!(!decision.is_allowed(), "{action}");
        }
    }

    // ==================== Rule 4: default deny ====================

    #[test]
    fn test_outsider_denied() {
        let outsider = actor(AccountCategory::ConsumerContact);
        let view = MockDirectory::default().with_actor(&outsider);
        let scope = Scope::pair(SupplierId::generate(), ConsumerId::generate());

        for action in [Action::CreateOrder, Action::PostMessage, Action::AcceptOrder] {
            let decision = decide(&view, &outsider.id, action, scope);
            assert!(!decision.is_allowed(), "{action}");
        }
    }
}
