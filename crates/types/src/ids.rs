use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use thiserror::Error;
use uuid::Uuid;

/// Error returned when an identifier string is not UUID-shaped.
#[derive(Debug, Error)]
#[error("invalid {kind} id: {value}")]
pub struct ParseIdError {
    pub kind: &'static str,
    pub value: String,
}

macro_rules! entity_id {
    ($(#[$doc:meta])* $name:ident, $kind:literal) => {
        $(#[$doc])*
        #[derive(
            Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
        )]
        #[serde(transparent)]
        pub struct $name(Uuid);

        impl $name {
            /// Generate a fresh random identifier.
            pub fn generate() -> Self {
                Self(Uuid::new_v4())
            }

            pub const fn from_uuid(id: Uuid) -> Self {
                Self(id)
            }

            pub fn as_uuid(&self) -> &Uuid {
                &self.0
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}", self.0)
            }
        }

        impl FromStr for $name {
            type Err = ParseIdError;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                Uuid::parse_str(s).map(Self).map_err(|_| ParseIdError {
                    kind: $kind,
                    value: s.to_string(),
                })
            }
        }
    };
}

entity_id!(
    /// Identity acting in the system (staff, contact, or platform admin).
    ActorId,
    "actor"
);
entity_id!(
    /// A supplier organization.
    SupplierId,
    "supplier"
);
entity_id!(
    /// A consumer organization.
    ConsumerId,
    "consumer"
);
entity_id!(
    /// A staff membership within one supplier.
    MembershipId,
    "membership"
);
entity_id!(
    /// A contact record within one consumer.
    ContactId,
    "contact"
);
entity_id!(
    /// A product in a supplier's catalog.
    ProductId,
    "product"
);
entity_id!(
    /// A supplier/consumer relationship link.
    LinkId,
    "link"
);
entity_id!(
    /// An order placed against an approved link.
    OrderId,
    "order"
);
entity_id!(
    /// A single line of an order.
    OrderItemId,
    "order item"
);
entity_id!(
    /// A complaint filed against an order.
    ComplaintId,
    "complaint"
);
entity_id!(
    /// The message thread attached to a complaint.
    ConversationId,
    "conversation"
);
entity_id!(
    /// A single message within a conversation.
    MessageId,
    "message"
);

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_roundtrip_through_string() {
        let id = OrderId::generate();
        let parsed: OrderId = id.to_string().parse().unwrap();
        assert_eq!(id, parsed);
    }

    #[test]
    fn test_rejects_non_uuid() {
        let err = "not-a-uuid".parse::<ActorId>().unwrap_err();
        assert_eq!(err.kind, "actor");
    }

    #[test]
    fn test_serde_transparent() {
        let id = LinkId::generate();
        let json = serde_json::to_string(&id).unwrap();
        assert_eq!(json, format!("\"{}\"", id));
    }
}
