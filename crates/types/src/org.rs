use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::{ActorId, ConsumerId, ContactId, SupplierId};

/// A supplier organization. Owns staff memberships, products, and orders.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Supplier {
    pub id: SupplierId,
    pub name: String,
    pub created_at: DateTime<Utc>,
}

impl Supplier {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            id: SupplierId::generate(),
            name: name.into(),
            created_at: Utc::now(),
        }
    }
}

/// A consumer organization. Owns contact records.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Consumer {
    pub id: ConsumerId,
    pub name: String,
    pub created_at: DateTime<Utc>,
}

impl Consumer {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            id: ConsumerId::generate(),
            name: name.into(),
            created_at: Utc::now(),
        }
    }
}

/// An actor authorized to act on behalf of one consumer.
/// Unique per (consumer, actor).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConsumerContact {
    pub id: ContactId,
    pub consumer_id: ConsumerId,
    pub actor_id: ActorId,
    pub primary: bool,
    pub created_at: DateTime<Utc>,
}

impl ConsumerContact {
    pub fn new(consumer_id: ConsumerId, actor_id: ActorId) -> Self {
        Self {
            id: ContactId::generate(),
            consumer_id,
            actor_id,
            primary: false,
            created_at: Utc::now(),
        }
    }

    pub fn primary(mut self) -> Self {
        self.primary = true;
        self
    }
}
