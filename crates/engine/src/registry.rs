//! Directory registry: organizations, actors, catalog, staff, contacts.
//!
//! Registration comes from a trusted provisioning path and is not
//! policy-gated, with one exception: staff management runs through
//! [`commerce_gate_policy::Action::ManageStaff`], which only privileged
//! memberships and platform admins carry.

use commerce_gate_policy::{Action, Scope};
use commerce_gate_types::{
    AccountCategory, Actor, ActorId, Consumer, ConsumerContact, ConsumerId, MembershipId, Product,
    ProductId, StaffMembership, StaffRole, Supplier, SupplierId,
};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::error::{EngineError, Result};
use crate::CommerceEngine;

fn default_min_order_quantity() -> u32 {
    1
}

/// Catalog entry as supplied by the provisioning path.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProductSpec {
    pub supplier_id: SupplierId,
    pub name: String,
    pub price: Decimal,
    #[serde(default)]
    pub discount_percentage: Decimal,
    pub stock: u32,
    #[serde(default = "default_min_order_quantity")]
    pub min_order_quantity: u32,
}

impl CommerceEngine {
    pub fn register_actor(&mut self, name: impl Into<String>, category: AccountCategory) -> Actor {
        let actor = self.directory.insert_actor(Actor::new(name, category));
        info!(actor_id = %actor.id, category = %actor.category, "actor registered");
        actor
    }

    pub fn register_supplier(&mut self, name: impl Into<String>) -> Supplier {
        let supplier = self.directory.insert_supplier(Supplier::new(name));
        info!(supplier_id = %supplier.id, "supplier registered");
        supplier
    }

    pub fn register_consumer(&mut self, name: impl Into<String>) -> Consumer {
        let consumer = self.directory.insert_consumer(Consumer::new(name));
        info!(consumer_id = %consumer.id, "consumer registered");
        consumer
    }

    pub fn register_product(&mut self, spec: ProductSpec) -> Result<Product> {
        if spec.name.trim().is_empty() {
            return Err(EngineError::Validation("product name must not be empty".into()));
        }
        if spec.price < Decimal::ZERO {
            return Err(EngineError::Validation(format!(
                "product price must not be negative, got {}",
                spec.price
            )));
        }
        if spec.discount_percentage < Decimal::ZERO || spec.discount_percentage > Decimal::ONE_HUNDRED
        {
            return Err(EngineError::Validation(format!(
                "discount percentage must lie within 0..=100, got {}",
                spec.discount_percentage
            )));
        }
        if spec.min_order_quantity == 0 {
            return Err(EngineError::Validation(
                "minimum order quantity must be at least 1".into(),
            ));
        }

        let product = Product::new(spec.supplier_id, spec.name, spec.price, spec.stock)
            .with_discount(spec.discount_percentage)
            .with_min_order_quantity(spec.min_order_quantity);
        let product = self.directory.insert_product(product)?;
        info!(product_id = %product.id, supplier_id = %product.supplier_id, "product registered");
        Ok(product)
    }

    /// Takes a product off the catalog. New order lines refuse it; lines
    /// already placed keep their frozen price and accept normally.
    pub fn delist_product(&mut self, product_id: ProductId) -> Result<Product> {
        let product = self.directory.delist_product(&product_id)?.clone();
        info!(product_id = %product.id, supplier_id = %product.supplier_id, "product delisted");
        Ok(product)
    }

    pub fn register_contact(
        &mut self,
        consumer_id: ConsumerId,
        actor_id: ActorId,
        primary: bool,
    ) -> Result<ConsumerContact> {
        let mut contact = ConsumerContact::new(consumer_id, actor_id);
        if primary {
            contact = contact.primary();
        }
        let contact = self.directory.insert_contact(contact)?;
        info!(contact_id = %contact.id, consumer_id = %consumer_id, "consumer contact registered");
        Ok(contact)
    }

    /// Adds an active membership at `supplier_id`. Requires manager or owner
    /// standing on that supplier (or platform admin).
    pub fn add_staff(
        &mut self,
        acting: &ActorId,
        supplier_id: SupplierId,
        actor_id: ActorId,
        role: StaffRole,
    ) -> Result<StaffMembership> {
        self.directory.get_supplier(&supplier_id)?;
        self.authorize(acting, Action::ManageStaff, Scope::supplier(supplier_id))?;

        let membership = self
            .directory
            .insert_membership(StaffMembership::new(supplier_id, actor_id, role))?;
        info!(
            membership_id = %membership.id,
            supplier_id = %supplier_id,
            role = %membership.role,
            "staff membership added"
        );
        Ok(membership)
    }

    /// Flips a membership inactive. The record survives so complaint routing
    /// history and conversation participant sets keep resolving.
    pub fn deactivate_staff(
        &mut self,
        acting: &ActorId,
        membership_id: MembershipId,
    ) -> Result<StaffMembership> {
        let supplier_id = self.directory.get_membership(&membership_id)?.supplier_id;
        self.authorize(acting, Action::ManageStaff, Scope::supplier(supplier_id))?;

        let membership = self.directory.deactivate_membership(&membership_id)?.clone();
        info!(membership_id = %membership.id, supplier_id = %supplier_id, "staff membership deactivated");
        Ok(membership)
    }
}
