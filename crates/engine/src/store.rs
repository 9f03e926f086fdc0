//! In-memory directory of gate entities.
//!
//! The directory is the single owner of every record. Cross-entity
//! relationships live in one-directional lookup indices maintained on insert,
//! never as back-references embedded in the entities themselves. All mutation
//! passes through conditional helpers that re-check the current status
//! immediately before writing, so a stale caller observes a typed failure
//! instead of clobbering a concurrent transition.

use std::collections::HashMap;

use chrono::Utc;
use commerce_gate_policy::DirectoryView;
use commerce_gate_types::{
    Actor, ActorId, Complaint, ComplaintId, ComplaintStatus, Consumer, ConsumerContact, ConsumerId,
    ContactId, Conversation, ConversationId, Link, LinkId, LinkStatus, MembershipId, Message,
    MessageId, Order, OrderId, OrderStatus, Product, ProductId, StaffMembership, StaffRole,
    Supplier, SupplierId,
};

use crate::error::{EngineError, Result};

/// Owning store for every gate entity plus the lookup indices over them.
#[derive(Debug, Default)]
pub struct Directory {
    actors: HashMap<ActorId, Actor>,
    suppliers: HashMap<SupplierId, Supplier>,
    consumers: HashMap<ConsumerId, Consumer>,
    products: HashMap<ProductId, Product>,
    memberships: HashMap<MembershipId, StaffMembership>,
    contacts: HashMap<ContactId, ConsumerContact>,
    links: HashMap<LinkId, Link>,
    orders: HashMap<OrderId, Order>,
    complaints: HashMap<ComplaintId, Complaint>,
    conversations: HashMap<ConversationId, Conversation>,
    messages: HashMap<MessageId, Message>,

    // ═══════════════════════════════════════════════════════════════════
    // Lookup indices (maintained on insert, consulted on read)
    // ═══════════════════════════════════════════════════════════════════
    membership_by_pair: HashMap<(SupplierId, ActorId), MembershipId>,
    memberships_by_supplier: HashMap<SupplierId, Vec<MembershipId>>,
    memberships_by_actor: HashMap<ActorId, Vec<MembershipId>>,
    contact_by_pair: HashMap<(ConsumerId, ActorId), ContactId>,
    contacts_by_actor: HashMap<ActorId, Vec<ContactId>>,
    products_by_supplier: HashMap<SupplierId, Vec<ProductId>>,
    link_by_pair: HashMap<(SupplierId, ConsumerId), LinkId>,
    orders_by_supplier: HashMap<SupplierId, Vec<OrderId>>,
    orders_by_consumer: HashMap<ConsumerId, Vec<OrderId>>,
    complaints_by_order: HashMap<OrderId, Vec<ComplaintId>>,
    conversation_by_key: HashMap<(ComplaintId, ContactId), ConversationId>,
    messages_by_conversation: HashMap<ConversationId, Vec<MessageId>>,
}

impl Directory {
    pub fn new() -> Self {
        Self::default()
    }

    // ═══════════════════════════════════════════════════════════════════
    // Registry inserts
    // ═══════════════════════════════════════════════════════════════════

    pub fn insert_actor(&mut self, actor: Actor) -> Actor {
        self.actors.insert(actor.id, actor.clone());
        actor
    }

    pub fn insert_supplier(&mut self, supplier: Supplier) -> Supplier {
        self.suppliers.insert(supplier.id, supplier.clone());
        supplier
    }

    pub fn insert_consumer(&mut self, consumer: Consumer) -> Consumer {
        self.consumers.insert(consumer.id, consumer.clone());
        consumer
    }

    pub fn insert_product(&mut self, product: Product) -> Result<Product> {
        self.get_supplier(&product.supplier_id)?;
        self.products_by_supplier
            .entry(product.supplier_id)
            .or_default()
            .push(product.id);
        self.products.insert(product.id, product.clone());
        Ok(product)
    }

    /// One membership record per (supplier, actor). Rehiring reuses the
    /// existing record rather than minting a parallel one.
    pub fn insert_membership(&mut self, membership: StaffMembership) -> Result<StaffMembership> {
        self.get_supplier(&membership.supplier_id)?;
        self.get_actor(&membership.actor_id)?;
        let pair = (membership.supplier_id, membership.actor_id);
        if self.membership_by_pair.contains_key(&pair) {
            return Err(EngineError::Conflict(format!(
                "actor {} already holds a membership at supplier {}",
                membership.actor_id, membership.supplier_id
            )));
        }
        self.membership_by_pair.insert(pair, membership.id);
        self.memberships_by_supplier
            .entry(membership.supplier_id)
            .or_default()
            .push(membership.id);
        self.memberships_by_actor
            .entry(membership.actor_id)
            .or_default()
            .push(membership.id);
        self.memberships.insert(membership.id, membership.clone());
        Ok(membership)
    }

    pub fn insert_contact(&mut self, contact: ConsumerContact) -> Result<ConsumerContact> {
        self.get_consumer(&contact.consumer_id)?;
        self.get_actor(&contact.actor_id)?;
        let pair = (contact.consumer_id, contact.actor_id);
        if self.contact_by_pair.contains_key(&pair) {
            return Err(EngineError::Conflict(format!(
                "actor {} is already a contact of consumer {}",
                contact.actor_id, contact.consumer_id
            )));
        }
        self.contact_by_pair.insert(pair, contact.id);
        self.contacts_by_actor
            .entry(contact.actor_id)
            .or_default()
            .push(contact.id);
        self.contacts.insert(contact.id, contact.clone());
        Ok(contact)
    }

    /// At most one link record ever exists per (supplier, consumer) pair.
    pub fn insert_link(&mut self, link: Link) -> Result<Link> {
        let pair = (link.supplier_id, link.consumer_id);
        if self.link_by_pair.contains_key(&pair) {
            return Err(EngineError::Conflict(format!(
                "a link already exists between supplier {} and consumer {}",
                link.supplier_id, link.consumer_id
            )));
        }
        self.link_by_pair.insert(pair, link.id);
        self.links.insert(link.id, link.clone());
        Ok(link)
    }

    pub fn insert_order(&mut self, order: Order) -> Order {
        self.orders_by_supplier
            .entry(order.supplier_id)
            .or_default()
            .push(order.id);
        self.orders_by_consumer
            .entry(order.consumer_id)
            .or_default()
            .push(order.id);
        self.orders.insert(order.id, order.clone());
        order
    }

    pub fn insert_complaint(&mut self, complaint: Complaint) -> Complaint {
        self.complaints_by_order
            .entry(complaint.order_id)
            .or_default()
            .push(complaint.id);
        self.complaints.insert(complaint.id, complaint.clone());
        complaint
    }

    /// Appends a message, preserving strict arrival order per conversation.
    pub fn insert_message(&mut self, message: Message) -> Message {
        self.messages_by_conversation
            .entry(message.conversation_id)
            .or_default()
            .push(message.id);
        self.messages.insert(message.id, message.clone());
        message
    }

    // ═══════════════════════════════════════════════════════════════════
    // Getters
    // ═══════════════════════════════════════════════════════════════════

    pub fn get_actor(&self, id: &ActorId) -> Result<&Actor> {
        self.actors
            .get(id)
            .ok_or_else(|| EngineError::not_found("actor", id))
    }

    pub fn get_supplier(&self, id: &SupplierId) -> Result<&Supplier> {
        self.suppliers
            .get(id)
            .ok_or_else(|| EngineError::not_found("supplier", id))
    }

    pub fn get_consumer(&self, id: &ConsumerId) -> Result<&Consumer> {
        self.consumers
            .get(id)
            .ok_or_else(|| EngineError::not_found("consumer", id))
    }

    pub fn get_product(&self, id: &ProductId) -> Result<&Product> {
        self.products
            .get(id)
            .ok_or_else(|| EngineError::not_found("product", id))
    }

    pub fn get_membership(&self, id: &MembershipId) -> Result<&StaffMembership> {
        self.memberships
            .get(id)
            .ok_or_else(|| EngineError::not_found("staff membership", id))
    }

    pub fn get_contact(&self, id: &ContactId) -> Result<&ConsumerContact> {
        self.contacts
            .get(id)
            .ok_or_else(|| EngineError::not_found("consumer contact", id))
    }

    pub fn get_link(&self, id: &LinkId) -> Result<&Link> {
        self.links
            .get(id)
            .ok_or_else(|| EngineError::not_found("link", id))
    }

    pub fn get_order(&self, id: &OrderId) -> Result<&Order> {
        self.orders
            .get(id)
            .ok_or_else(|| EngineError::not_found("order", id))
    }

    pub fn get_complaint(&self, id: &ComplaintId) -> Result<&Complaint> {
        self.complaints
            .get(id)
            .ok_or_else(|| EngineError::not_found("complaint", id))
    }

    pub fn get_conversation(&self, id: &ConversationId) -> Result<&Conversation> {
        self.conversations
            .get(id)
            .ok_or_else(|| EngineError::not_found("conversation", id))
    }

    pub fn get_message(&self, id: &MessageId) -> Result<&Message> {
        self.messages
            .get(id)
            .ok_or_else(|| EngineError::not_found("message", id))
    }

    // ═══════════════════════════════════════════════════════════════════
    // Index lookups
    // ═══════════════════════════════════════════════════════════════════

    pub fn link_for_pair(&self, supplier_id: &SupplierId, consumer_id: &ConsumerId) -> Option<&Link> {
        let id = self.link_by_pair.get(&(*supplier_id, *consumer_id))?;
        self.links.get(id)
    }

    /// Membership record for an actor at a supplier, active or not.
    pub fn membership_for_pair(
        &self,
        supplier_id: &SupplierId,
        actor_id: &ActorId,
    ) -> Option<&StaffMembership> {
        let id = self.membership_by_pair.get(&(*supplier_id, *actor_id))?;
        self.memberships.get(id)
    }

    pub fn contact_for_pair(
        &self,
        consumer_id: &ConsumerId,
        actor_id: &ActorId,
    ) -> Option<&ConsumerContact> {
        let id = self.contact_by_pair.get(&(*consumer_id, *actor_id))?;
        self.contacts.get(id)
    }

    /// Contact records held by an actor across all consumers.
    pub fn contacts_of_actor(&self, actor_id: &ActorId) -> Vec<&ConsumerContact> {
        self.contacts_by_actor
            .get(actor_id)
            .map(|ids| ids.iter().filter_map(|id| self.contacts.get(id)).collect())
            .unwrap_or_default()
    }

    /// Membership records held by an actor across all suppliers.
    pub fn memberships_of_actor(&self, actor_id: &ActorId) -> Vec<&StaffMembership> {
        self.memberships_by_actor
            .get(actor_id)
            .map(|ids| {
                ids.iter()
                    .filter_map(|id| self.memberships.get(id))
                    .collect()
            })
            .unwrap_or_default()
    }

    pub fn products_of_supplier(&self, supplier_id: &SupplierId) -> Vec<&Product> {
        self.products_by_supplier
            .get(supplier_id)
            .map(|ids| ids.iter().filter_map(|id| self.products.get(id)).collect())
            .unwrap_or_default()
    }

    pub fn orders_of_supplier(&self, supplier_id: &SupplierId) -> Vec<&Order> {
        self.orders_by_supplier
            .get(supplier_id)
            .map(|ids| ids.iter().filter_map(|id| self.orders.get(id)).collect())
            .unwrap_or_default()
    }

    pub fn orders_of_consumer(&self, consumer_id: &ConsumerId) -> Vec<&Order> {
        self.orders_by_consumer
            .get(consumer_id)
            .map(|ids| ids.iter().filter_map(|id| self.orders.get(id)).collect())
            .unwrap_or_default()
    }

    pub fn complaints_of_order(&self, order_id: &OrderId) -> Vec<&Complaint> {
        self.complaints_by_order
            .get(order_id)
            .map(|ids| ids.iter().filter_map(|id| self.complaints.get(id)).collect())
            .unwrap_or_default()
    }

    pub fn all_orders(&self) -> Vec<&Order> {
        self.orders.values().collect()
    }

    /// Earliest active membership of `supplier_id` holding exactly `role`.
    /// Ties on creation time fall back to the membership id so the pick is
    /// deterministic.
    pub fn active_staff_with_role(
        &self,
        supplier_id: &SupplierId,
        role: StaffRole,
    ) -> Option<&StaffMembership> {
        self.memberships_by_supplier
            .get(supplier_id)?
            .iter()
            .filter_map(|id| self.memberships.get(id))
            .filter(|m| m.active && m.role == role)
            .min_by_key(|m| (m.created_at, m.id))
    }

    // ═══════════════════════════════════════════════════════════════════
    // Conditional transitions
    // ═══════════════════════════════════════════════════════════════════

    /// Moves a link to `to` only if the closed transition table permits it
    /// from the status observed at write time.
    pub fn link_transition(&mut self, id: &LinkId, to: LinkStatus) -> Result<&mut Link> {
        let link = self
            .links
            .get_mut(id)
            .ok_or_else(|| EngineError::not_found("link", id))?;
        if !link.status.can_transition_to(to) {
            return Err(EngineError::InvalidTransition {
                entity: "link",
                id: id.to_string(),
                from: link.status.to_string(),
                to: to.to_string(),
            });
        }
        link.status = to;
        link.updated_at = Utc::now();
        Ok(link)
    }

    /// Moves an order to `to` only if its status at write time is one of
    /// `allowed_from`.
    pub fn order_transition(
        &mut self,
        id: &OrderId,
        allowed_from: &[OrderStatus],
        to: OrderStatus,
    ) -> Result<&mut Order> {
        let order = self
            .orders
            .get_mut(id)
            .ok_or_else(|| EngineError::not_found("order", id))?;
        if !allowed_from.contains(&order.status) {
            return Err(EngineError::InvalidTransition {
                entity: "order",
                id: id.to_string(),
                from: order.status.to_string(),
                to: to.to_string(),
            });
        }
        order.status = to;
        Ok(order)
    }

    /// Moves a complaint to `to` only if its status at write time is one of
    /// `allowed_from`.
    pub fn complaint_transition(
        &mut self,
        id: &ComplaintId,
        allowed_from: &[ComplaintStatus],
        to: ComplaintStatus,
    ) -> Result<&mut Complaint> {
        let complaint = self
            .complaints
            .get_mut(id)
            .ok_or_else(|| EngineError::not_found("complaint", id))?;
        if !allowed_from.contains(&complaint.status) {
            return Err(EngineError::InvalidTransition {
                entity: "complaint",
                id: id.to_string(),
                from: complaint.status.to_string(),
                to: to.to_string(),
            });
        }
        complaint.status = to;
        Ok(complaint)
    }

    /// Deactivates a membership in place. The record and its id survive so
    /// conversation participant history stays intact.
    pub fn deactivate_membership(&mut self, id: &MembershipId) -> Result<&mut StaffMembership> {
        let membership = self
            .memberships
            .get_mut(id)
            .ok_or_else(|| EngineError::not_found("staff membership", id))?;
        membership.active = false;
        Ok(membership)
    }

    /// Subtracts `quantity` from a product's stock, refusing to go negative.
    pub fn decrement_stock(&mut self, id: &ProductId, quantity: u32) -> Result<u32> {
        let product = self
            .products
            .get_mut(id)
            .ok_or_else(|| EngineError::not_found("product", id))?;
        match product.stock.checked_sub(quantity) {
            Some(remaining) => {
                product.stock = remaining;
                Ok(remaining)
            }
            None => Err(EngineError::InsufficientStock {
                product_id: *id,
                available: product.stock,
                requested: quantity,
            }),
        }
    }

    /// Flips a product inactive. The record survives so existing order
    /// lines keep resolving.
    pub fn delist_product(&mut self, id: &ProductId) -> Result<&mut Product> {
        let product = self
            .products
            .get_mut(id)
            .ok_or_else(|| EngineError::not_found("product", id))?;
        product.active = false;
        Ok(product)
    }

    // ═══════════════════════════════════════════════════════════════════
    // Conversations
    // ═══════════════════════════════════════════════════════════════════

    /// Returns the conversation keyed by (complaint, filing contact), creating
    /// it on first use. On reuse the initial staff participant is appended to
    /// the participant set if absent; existing participants are never removed.
    pub fn ensure_conversation(
        &mut self,
        complaint_id: ComplaintId,
        contact_id: ContactId,
        staff: MembershipId,
    ) -> ConversationId {
        let key = (complaint_id, contact_id);
        if let Some(id) = self.conversation_by_key.get(&key).copied() {
            if let Some(conversation) = self.conversations.get_mut(&id) {
                conversation.add_participant(staff);
            }
            return id;
        }
        let conversation = Conversation::new(complaint_id, contact_id, staff);
        let id = conversation.id;
        self.conversation_by_key.insert(key, id);
        self.conversations.insert(id, conversation);
        id
    }

    /// Conversation attached to a complaint, resolved through its filing
    /// contact.
    pub fn conversation_for_complaint(&self, complaint_id: &ComplaintId) -> Result<&Conversation> {
        let complaint = self.get_complaint(complaint_id)?;
        let id = self
            .conversation_by_key
            .get(&(*complaint_id, complaint.filed_by))
            .ok_or_else(|| EngineError::not_found("conversation", complaint_id))?;
        self.get_conversation(id)
    }

    /// Messages of a conversation in strict arrival order.
    pub fn messages_of_conversation(&self, conversation_id: &ConversationId) -> Vec<&Message> {
        self.messages_by_conversation
            .get(conversation_id)
            .map(|ids| ids.iter().filter_map(|id| self.messages.get(id)).collect())
            .unwrap_or_default()
    }

    pub fn mark_message_read(&mut self, id: &MessageId) -> Result<&mut Message> {
        let message = self
            .messages
            .get_mut(id)
            .ok_or_else(|| EngineError::not_found("message", id))?;
        message.read = true;
        Ok(message)
    }
}

impl DirectoryView for Directory {
    fn is_platform_admin(&self, actor: &ActorId) -> bool {
        self.actors
            .get(actor)
            .map(|a| a.category.is_platform_admin())
            .unwrap_or(false)
    }

    fn actor_exists(&self, actor: &ActorId) -> bool {
        self.actors.contains_key(actor)
    }

    fn active_staff_role(&self, supplier: &SupplierId, actor: &ActorId) -> Option<StaffRole> {
        let membership = self.membership_for_pair(supplier, actor)?;
        membership.active.then_some(membership.role)
    }

    fn is_consumer_contact(&self, consumer: &ConsumerId, actor: &ActorId) -> bool {
        self.contact_by_pair.contains_key(&(*consumer, *actor))
    }

    fn link_status(&self, supplier: &SupplierId, consumer: &ConsumerId) -> Option<LinkStatus> {
        self.link_for_pair(supplier, consumer).map(|l| l.status)
    }
}
