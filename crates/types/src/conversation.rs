use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::{ActorId, ComplaintId, ContactId, ConversationId, MembershipId, MessageId};

/// The message thread of one complaint, keyed by the filing contact.
///
/// Participants are staff memberships; the set only ever grows — escalation
/// adds the new assignee and never removes earlier handlers. The filing
/// contact participates by construction and is not part of this set.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Conversation {
    pub id: ConversationId,
    pub complaint_id: ComplaintId,
    pub contact_id: ContactId,

    /// Staff memberships admitted so far, in admission order.
    pub participants: Vec<MembershipId>,

    pub created_at: DateTime<Utc>,
}

impl Conversation {
    pub fn new(complaint_id: ComplaintId, contact_id: ContactId, initial: MembershipId) -> Self {
        Self {
            id: ConversationId::generate(),
            complaint_id,
            contact_id,
            participants: vec![initial],
            created_at: Utc::now(),
        }
    }

    /// Admit a staff membership. Returns false when already present;
    /// participants are never removed.
    pub fn add_participant(&mut self, membership: MembershipId) -> bool {
        if self.participants.contains(&membership) {
            return false;
        }
        self.participants.push(membership);
        true
    }

    pub fn has_participant(&self, membership: &MembershipId) -> bool {
        self.participants.contains(membership)
    }
}

/// A single message in a conversation. Append-only, unread until explicitly
/// marked.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Message {
    pub id: MessageId,
    pub conversation_id: ConversationId,
    pub sender: ActorId,
    pub body: String,
    pub read: bool,
    pub created_at: DateTime<Utc>,
}

impl Message {
    pub fn new(conversation_id: ConversationId, sender: ActorId, body: impl Into<String>) -> Self {
        Self {
            id: MessageId::generate(),
            conversation_id,
            sender,
            body: body.into(),
            read: false,
            created_at: Utc::now(),
        }
    }
}
