use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::{ProductId, SupplierId};

/// A catalog product. The gate only reads price, stock, and ordering
/// constraints; catalog curation lives outside the core.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Product {
    pub id: ProductId,
    pub supplier_id: SupplierId,
    pub name: String,

    /// List price before discount.
    pub price: Decimal,

    /// Percentage discount applied on top of the list price, 0..=100.
    pub discount_percentage: Decimal,

    /// Units currently available. Decremented on order acceptance.
    pub stock: u32,

    /// Smallest quantity a single order line may carry.
    pub min_order_quantity: u32,

    pub active: bool,
    pub created_at: DateTime<Utc>,
}

impl Product {
    pub fn new(supplier_id: SupplierId, name: impl Into<String>, price: Decimal, stock: u32) -> Self {
        Self {
            id: ProductId::generate(),
            supplier_id,
            name: name.into(),
            price,
            discount_percentage: Decimal::ZERO,
            stock,
            min_order_quantity: 1,
            active: true,
            created_at: Utc::now(),
        }
    }

    pub fn with_discount(mut self, percentage: Decimal) -> Self {
        self.discount_percentage = percentage;
        self
    }

    pub fn with_min_order_quantity(mut self, quantity: u32) -> Self {
        self.min_order_quantity = quantity;
        self
    }

    /// List price with the discount applied. This is the unit price captured
    /// on order lines at creation time.
    pub fn effective_price(&self) -> Decimal {
        self.price * (Decimal::ONE_HUNDRED - self.discount_percentage) / Decimal::ONE_HUNDRED
    }
}
