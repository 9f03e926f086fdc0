//! The order lifecycle.
//!
//! Orders are created by consumer contacts against an approved link, with
//! unit prices captured from the catalog at creation and never re-read. The
//! supplier side moves them through pending -> in_progress -> completed, or
//! out via rejected. Acceptance is the one transition with a side effect:
//! stock for every line is decremented, all lines or none.

use std::collections::HashMap;

use chrono::Utc;
use commerce_gate_policy::{Action, DirectoryView, Scope};
use commerce_gate_types::{
    ActorId, ConsumerId, Order, OrderId, OrderItem, OrderStatus, ProductId, SupplierId,
};
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::error::{EngineError, Result};
use crate::CommerceEngine;

/// One requested order line. Prices are looked up server-side; callers only
/// name the product and the quantity.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OrderItemSpec {
    pub product_id: ProductId,
    pub quantity: u32,
}

impl CommerceEngine {
    /// Places a pending order for `consumer_id` at `supplier_id`.
    ///
    /// Each line captures the product's effective price at this moment; the
    /// order total is the sum of line totals, computed once. Stock is not
    /// touched or reserved here.
    pub fn create_order(
        &mut self,
        acting: &ActorId,
        supplier_id: SupplierId,
        consumer_id: ConsumerId,
        items: Vec<OrderItemSpec>,
    ) -> Result<Order> {
        self.directory.get_supplier(&supplier_id)?;
        self.directory.get_consumer(&consumer_id)?;
        self.authorize(acting, Action::CreateOrder, Scope::pair(supplier_id, consumer_id))?;
        let placed_by = self.acting_contact(&consumer_id, acting)?.id;

        if items.is_empty() {
            return Err(EngineError::Validation(
                "an order needs at least one item".into(),
            ));
        }
        let mut lines = Vec::with_capacity(items.len());
        for spec in &items {
            let product = self.directory.get_product(&spec.product_id)?;
            if product.supplier_id != supplier_id {
                return Err(EngineError::Validation(format!(
                    "product {} belongs to a different supplier",
                    spec.product_id
                )));
            }
            if !product.active {
                return Err(EngineError::Validation(format!(
                    "product {} is not active",
                    spec.product_id
                )));
            }
            if spec.quantity == 0 {
                return Err(EngineError::Validation(
                    "item quantity must be at least 1".into(),
                ));
            }
            if spec.quantity < product.min_order_quantity {
                return Err(EngineError::Validation(format!(
                    "quantity {} is below the minimum order quantity {} of product {}",
                    spec.quantity, product.min_order_quantity, spec.product_id
                )));
            }
            lines.push(OrderItem::new(
                spec.product_id,
                spec.quantity,
                product.effective_price(),
            ));
        }

        let order = self
            .directory
            .insert_order(Order::new(supplier_id, consumer_id, placed_by, lines));
        info!(
            order_id = %order.id,
            supplier_id = %supplier_id,
            consumer_id = %consumer_id,
            total = %order.total_amount,
            "order created"
        );
        Ok(order)
    }

    /// Accepts a pending order and decrements stock for every line.
    ///
    /// All-or-nothing: every decrement is proven against projected stock
    /// before any is applied, so a failing line leaves the catalog and the
    /// order untouched. Duplicate lines for one product are summed by the
    /// projection rather than checked independently.
    pub fn accept_order(&mut self, acting: &ActorId, order_id: OrderId) -> Result<Order> {
        let order = self.directory.get_order(&order_id)?;
        let supplier_id = order.supplier_id;
        let status = order.status;
        let demands: Vec<(ProductId, u32)> = order
            .items
            .iter()
            .map(|item| (item.product_id, item.quantity))
            .collect();
        self.authorize(acting, Action::AcceptOrder, Scope::supplier(supplier_id))?;

        if status != OrderStatus::Pending {
            return Err(EngineError::InvalidTransition {
                entity: "order",
                id: order_id.to_string(),
                from: status.to_string(),
                to: OrderStatus::InProgress.to_string(),
            });
        }

        let mut projected: HashMap<ProductId, u32> = HashMap::new();
        for (product_id, quantity) in &demands {
            let available = match projected.get(product_id) {
                Some(remaining) => *remaining,
                None => self.directory.get_product(product_id)?.stock,
            };
            match available.checked_sub(*quantity) {
                Some(remaining) => {
                    projected.insert(*product_id, remaining);
                }
                None => {
                    return Err(EngineError::InsufficientStock {
                        product_id: *product_id,
                        available,
                        requested: *quantity,
                    })
                }
            }
        }
        for (product_id, quantity) in &demands {
            self.directory.decrement_stock(product_id, *quantity)?;
        }

        let order = self.directory.order_transition(
            &order_id,
            &[OrderStatus::Pending],
            OrderStatus::InProgress,
        )?;
        order.accepted_at = Some(Utc::now());
        let order = order.clone();
        info!(order_id = %order.id, accepted_by = %acting, "order accepted");
        Ok(order)
    }

    /// Rejects a pending order. Stock is untouched.
    pub fn reject_order(&mut self, acting: &ActorId, order_id: OrderId) -> Result<Order> {
        let supplier_id = self.directory.get_order(&order_id)?.supplier_id;
        self.authorize(acting, Action::RejectOrder, Scope::supplier(supplier_id))?;

        let order = self
            .directory
            .order_transition(&order_id, &[OrderStatus::Pending], OrderStatus::Rejected)?
            .clone();
        info!(order_id = %order.id, rejected_by = %acting, "order rejected");
        Ok(order)
    }

    /// Marks an in-progress order fulfilled.
    pub fn complete_order(&mut self, acting: &ActorId, order_id: OrderId) -> Result<Order> {
        let supplier_id = self.directory.get_order(&order_id)?.supplier_id;
        self.authorize(acting, Action::CompleteOrder, Scope::supplier(supplier_id))?;

        let order = self.directory.order_transition(
            &order_id,
            &[OrderStatus::InProgress],
            OrderStatus::Completed,
        )?;
        order.completed_at = Some(Utc::now());
        let order = order.clone();
        info!(order_id = %order.id, completed_by = %acting, "order completed");
        Ok(order)
    }

    /// Cancels a pending or in-progress order. Open to the contact who placed
    /// it and to the supplier's staff; other contacts of the same consumer
    /// are refused. A later block of the pair's link does not close this off.
    /// Decremented stock is not restored.
    pub fn cancel_order(&mut self, acting: &ActorId, order_id: OrderId) -> Result<Order> {
        let order = self.directory.get_order(&order_id)?;
        let supplier_id = order.supplier_id;
        let consumer_id = order.consumer_id;
        let placed_by = order.placed_by;
        self.authorize(acting, Action::CancelOrder, Scope::pair(supplier_id, consumer_id))?;

        let is_staff = self.directory.active_staff_role(&supplier_id, acting).is_some();
        let is_admin = self.directory.is_platform_admin(acting);
        if !is_staff && !is_admin {
            let placer = self.directory.get_contact(&placed_by)?.actor_id;
            if placer != *acting {
                return Err(EngineError::Forbidden(
                    "only the placing contact or supplier staff may cancel an order".into(),
                ));
            }
        }

        let order = self
            .directory
            .order_transition(
                &order_id,
                &[OrderStatus::Pending, OrderStatus::InProgress],
                OrderStatus::Cancelled,
            )?
            .clone();
        info!(order_id = %order.id, cancelled_by = %acting, "order cancelled");
        Ok(order)
    }

    /// Orders visible to the acting actor: every order of each supplier they
    /// actively staff plus every order of each consumer they represent.
    /// Platform admins see all orders.
    pub fn visible_orders(&self, acting: &ActorId) -> Result<Vec<Order>> {
        if !self.directory.actor_exists(acting) {
            return Err(EngineError::Forbidden(
                "actor is not known to the directory".into(),
            ));
        }

        let mut orders: Vec<Order> = if self.directory.is_platform_admin(acting) {
            self.directory.all_orders().into_iter().cloned().collect()
        } else {
            let mut seen = std::collections::HashSet::new();
            let mut out = Vec::new();
            for membership in self.directory.memberships_of_actor(acting) {
                if !membership.active {
                    continue;
                }
                for order in self.directory.orders_of_supplier(&membership.supplier_id) {
                    if seen.insert(order.id) {
                        out.push(order.clone());
                    }
                }
            }
            for contact in self.directory.contacts_of_actor(acting) {
                for order in self.directory.orders_of_consumer(&contact.consumer_id) {
                    if seen.insert(order.id) {
                        out.push(order.clone());
                    }
                }
            }
            out
        };
        orders.sort_by_key(|order| (order.created_at, order.id));
        Ok(orders)
    }
}
