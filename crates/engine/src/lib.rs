//! Commerce gate engines.
//!
//! One [`CommerceEngine`] owns the in-memory [`Directory`] and exposes every
//! gate operation: relationship links, staff and catalog registry, the order
//! lifecycle, complaint routing, and complaint conversations. Each mutation
//! resolves the entities it references, consults the authorization policy,
//! re-checks status preconditions, and only then writes. The engine is
//! synchronous; callers that need shared access wrap it in their own lock.

pub mod complaints;
pub mod conversations;
pub mod error;
pub mod links;
pub mod orders;
pub mod registry;
pub mod store;

pub use error::{EngineError, Result};
pub use orders::OrderItemSpec;
pub use registry::ProductSpec;
pub use store::Directory;

use commerce_gate_policy::{decide, Action, Decision, Scope};
use commerce_gate_types::{ActorId, ConsumerContact, ConsumerId};
use tracing::debug;

/// Facade over the directory and the state machines acting on it.
#[derive(Debug, Default)]
pub struct CommerceEngine {
    directory: Directory,
}

impl CommerceEngine {
    pub fn new() -> Self {
        Self {
            directory: Directory::new(),
        }
    }

    /// Read-only view of the stored entities.
    pub fn directory(&self) -> &Directory {
        &self.directory
    }

    /// Runs the role-level policy for `actor` and maps a denial to
    /// [`EngineError::Forbidden`].
    fn authorize(&self, actor: &ActorId, action: Action, scope: Scope) -> Result<()> {
        match decide(&self.directory, actor, action, scope) {
            Decision::Allow => Ok(()),
            Decision::Deny { reason } => {
                debug!(actor_id = %actor, %action, reason, "authorization denied");
                Err(EngineError::Forbidden(reason))
            }
        }
    }

    /// Contact record the acting actor holds at `consumer_id`. Operations
    /// that record authorship through a contact id need this even when the
    /// policy already passed, since a platform admin carries no contact
    /// standing of their own.
    fn acting_contact(&self, consumer_id: &ConsumerId, acting: &ActorId) -> Result<&ConsumerContact> {
        self.directory
            .contact_for_pair(consumer_id, acting)
            .ok_or_else(|| {
                EngineError::Validation(format!(
                    "actor {acting} holds no contact record for consumer {consumer_id}"
                ))
            })
    }
}

#[cfg(test)]
pub(crate) mod testkit {
    //! A populated engine shared by the module tests: one supplier with a
    //! full staff ladder, one consumer with a single contact, two products.

    use commerce_gate_types::{
        AccountCategory, ActorId, ConsumerId, ContactId, LinkId, MembershipId, Order, ProductId,
        StaffRole, SupplierId,
    };
    use rust_decimal::Decimal;

    use crate::orders::OrderItemSpec;
    use crate::registry::ProductSpec;
    use crate::CommerceEngine;

    pub struct World {
        pub engine: CommerceEngine,
        pub admin: ActorId,
        pub supplier_id: SupplierId,
        pub consumer_id: ConsumerId,
        pub owner: ActorId,
        pub manager: ActorId,
        pub sales: ActorId,
        pub owner_membership: MembershipId,
        pub manager_membership: MembershipId,
        pub sales_membership: MembershipId,
        pub buyer: ActorId,
        pub buyer_contact: ContactId,
        /// 10.00 a piece, 5 in stock.
        pub widget: ProductId,
        /// 5.00 a piece, 5 in stock.
        pub gadget: ProductId,
    }

    impl World {
        /// Requests and approves the supplier/consumer link.
        pub fn approve_link(&mut self) -> LinkId {
            let link = self
                .engine
                .request_link(&self.buyer, self.supplier_id, self.consumer_id)
                .unwrap();
            self.engine.approve_link(&self.owner, link.id).unwrap();
            link.id
        }

        /// Places the canonical 25.00 order: two widgets plus one gadget.
        pub fn place_standard_order(&mut self) -> Order {
            self.engine
                .create_order(
                    &self.buyer,
                    self.supplier_id,
                    self.consumer_id,
                    vec![
                        OrderItemSpec {
                            product_id: self.widget,
                            quantity: 2,
                        },
                        OrderItemSpec {
                            product_id: self.gadget,
                            quantity: 1,
                        },
                    ],
                )
                .unwrap()
        }
    }

    pub fn product_spec(supplier_id: SupplierId, name: &str, price: &str, stock: u32) -> ProductSpec {
        ProductSpec {
            supplier_id,
            name: name.to_string(),
            price: price.parse().unwrap(),
            discount_percentage: Decimal::ZERO,
            stock,
            min_order_quantity: 1,
        }
    }

    pub fn world() -> World {
        let mut engine = CommerceEngine::new();

        let admin = engine
            .register_actor("root", AccountCategory::PlatformAdmin)
            .id;
        let supplier_id = engine.register_supplier("Acme Wholesale").id;
        let consumer_id = engine.register_consumer("Corner Shop").id;

        let owner = engine.register_actor("olive", AccountCategory::Owner).id;
        let manager = engine.register_actor("mahmoud", AccountCategory::Manager).id;
        let sales = engine.register_actor("sana", AccountCategory::Sales).id;
        let owner_membership = engine
            .add_staff(&admin, supplier_id, owner, StaffRole::Owner)
            .unwrap()
            .id;
        let manager_membership = engine
            .add_staff(&admin, supplier_id, manager, StaffRole::Manager)
            .unwrap()
            .id;
        let sales_membership = engine
            .add_staff(&admin, supplier_id, sales, StaffRole::Sales)
            .unwrap()
            .id;

        let buyer = engine
            .register_actor("cara", AccountCategory::ConsumerContact)
            .id;
        let buyer_contact = engine
            .register_contact(consumer_id, buyer, true)
            .unwrap()
            .id;

        let widget = engine
            .register_product(product_spec(supplier_id, "Widget", "10.00", 5))
            .unwrap()
            .id;
        let gadget = engine
            .register_product(product_spec(supplier_id, "Gadget", "5.00", 5))
            .unwrap()
            .id;

        World {
            engine,
            admin,
            supplier_id,
            consumer_id,
            owner,
            manager,
            sales,
            owner_membership,
            manager_membership,
            sales_membership,
            buyer,
            buyer_contact,
            widget,
            gadget,
        }
    }
}
