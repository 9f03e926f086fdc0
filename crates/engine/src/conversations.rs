//! Conversation access control.
//!
//! A conversation is readable and writable by exactly two kinds of actor:
//! the consumer contact who filed the complaint, and staff whose active
//! membership sits in the participant set. Everybody else is refused, loudly.
//! Listing never touches read-state; only the explicit mark-read call does.

use commerce_gate_policy::{Action, DirectoryView, Scope};
use commerce_gate_types::{ActorId, ComplaintId, Conversation, ConversationId, Message, MessageId};
use tracing::info;

use crate::error::{EngineError, Result};
use crate::CommerceEngine;

impl CommerceEngine {
    /// Whether `actor` may read and write the conversation: they are its
    /// filing contact, or they hold an active staff membership present in
    /// the participant set. A deactivated membership stays in the set for
    /// history but carries no access.
    pub fn can_participate(&self, actor: &ActorId, conversation_id: &ConversationId) -> Result<bool> {
        let conversation = self.directory.get_conversation(conversation_id)?;
        let contact = self.directory.get_contact(&conversation.contact_id)?;
        if contact.actor_id == *actor {
            return Ok(true);
        }
        Ok(conversation.participants.iter().any(|membership_id| {
            self.directory
                .get_membership(membership_id)
                .map(|membership| membership.active && membership.actor_id == *actor)
                .unwrap_or(false)
        }))
    }

    /// Appends a message to the conversation. Non-participants get a
    /// forbidden error, never a silent drop.
    pub fn post_message(
        &mut self,
        acting: &ActorId,
        conversation_id: ConversationId,
        body: impl Into<String>,
    ) -> Result<Message> {
        let scope = self.conversation_scope(&conversation_id)?;
        self.authorize(acting, Action::PostMessage, scope)?;
        if !self.directory.is_platform_admin(acting)
            && !self.can_participate(acting, &conversation_id)?
        {
            return Err(EngineError::Forbidden(
                "actor is not a participant of this conversation".into(),
            ));
        }

        let body = body.into();
        if body.trim().is_empty() {
            return Err(EngineError::Validation(
                "message body must not be empty".into(),
            ));
        }

        let message = self
            .directory
            .insert_message(Message::new(conversation_id, *acting, body));
        info!(
            message_id = %message.id,
            conversation_id = %conversation_id,
            sender = %acting,
            "message posted"
        );
        Ok(message)
    }

    /// Messages in creation order. Reading leaves every read flag as it is.
    pub fn list_messages(
        &self,
        acting: &ActorId,
        conversation_id: &ConversationId,
    ) -> Result<Vec<Message>> {
        let scope = self.conversation_scope(conversation_id)?;
        self.authorize(acting, Action::ReadConversation, scope)?;
        if !self.directory.is_platform_admin(acting)
            && !self.can_participate(acting, conversation_id)?
        {
            return Err(EngineError::Forbidden(
                "actor is not a participant of this conversation".into(),
            ));
        }

        Ok(self
            .directory
            .messages_of_conversation(conversation_id)
            .into_iter()
            .cloned()
            .collect())
    }

    /// Resolves the conversation attached to a complaint, for participants
    /// and platform admins only.
    pub fn conversation_for_complaint(
        &self,
        acting: &ActorId,
        complaint_id: &ComplaintId,
    ) -> Result<Conversation> {
        let conversation_id = self.directory.conversation_for_complaint(complaint_id)?.id;
        let scope = self.conversation_scope(&conversation_id)?;
        self.authorize(acting, Action::ReadConversation, scope)?;
        if !self.directory.is_platform_admin(acting)
            && !self.can_participate(acting, &conversation_id)?
        {
            return Err(EngineError::Forbidden(
                "actor is not a participant of this conversation".into(),
            ));
        }

        Ok(self.directory.get_conversation(&conversation_id)?.clone())
    }

    /// The one way a message's read flag ever flips.
    pub fn mark_message_read(&mut self, acting: &ActorId, message_id: MessageId) -> Result<Message> {
        let conversation_id = self.directory.get_message(&message_id)?.conversation_id;
        let scope = self.conversation_scope(&conversation_id)?;
        self.authorize(acting, Action::ReadConversation, scope)?;
        if !self.directory.is_platform_admin(acting)
            && !self.can_participate(acting, &conversation_id)?
        {
            return Err(EngineError::Forbidden(
                "actor is not a participant of this conversation".into(),
            ));
        }

        let message = self.directory.mark_message_read(&message_id)?.clone();
        info!(message_id = %message.id, marked_by = %acting, "message marked read");
        Ok(message)
    }

    /// Supplier/consumer pair a conversation belongs to, resolved through
    /// its complaint's order.
    fn conversation_scope(&self, conversation_id: &ConversationId) -> Result<Scope> {
        let conversation = self.directory.get_conversation(conversation_id)?;
        let complaint = self.directory.get_complaint(&conversation.complaint_id)?;
        let order = self.directory.get_order(&complaint.order_id)?;
        Ok(Scope::pair(order.supplier_id, order.consumer_id))
    }
}
