use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::{ConsumerId, ContactId, OrderId, OrderItemId, ProductId, SupplierId};

/// Lifecycle status of an order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OrderStatus {
    /// Placed, awaiting a supplier decision.
    Pending,
    /// Accepted by supplier staff; stock has been decremented.
    InProgress,
    /// Acknowledged by supplier staff. Part of the stored vocabulary; the
    /// transition machine routes acceptance straight to `InProgress`.
    Accepted,
    /// Declined from pending. Terminal.
    Rejected,
    /// Fulfilled. Terminal.
    Completed,
    /// Withdrawn by the placing contact or supplier staff. Terminal.
    Cancelled,
}

impl OrderStatus {
    pub fn is_terminal(self) -> bool {
        matches!(
            self,
            OrderStatus::Rejected | OrderStatus::Completed | OrderStatus::Cancelled
        )
    }

    /// Cancellation is open while the order is pending or in progress.
    pub fn can_cancel(self) -> bool {
        matches!(self, OrderStatus::Pending | OrderStatus::InProgress)
    }
}

impl std::fmt::Display for OrderStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            OrderStatus::Pending => "pending",
            OrderStatus::InProgress => "in_progress",
            OrderStatus::Accepted => "accepted",
            OrderStatus::Rejected => "rejected",
            OrderStatus::Completed => "completed",
            OrderStatus::Cancelled => "cancelled",
        };
        write!(f, "{s}")
    }
}

/// One line of an order. Unit price is captured from the product's effective
/// price at creation and never re-read afterward.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OrderItem {
    pub id: OrderItemId,
    pub product_id: ProductId,
    pub quantity: u32,
    pub unit_price: Decimal,
    pub line_total: Decimal,
}

impl OrderItem {
    pub fn new(product_id: ProductId, quantity: u32, unit_price: Decimal) -> Self {
        Self {
            id: OrderItemId::generate(),
            product_id,
            quantity,
            unit_price,
            line_total: unit_price * Decimal::from(quantity),
        }
    }
}

/// An order between one supplier and one consumer, created only while their
/// link is approved. Items and the total are fixed at creation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Order {
    pub id: OrderId,
    pub supplier_id: SupplierId,
    pub consumer_id: ConsumerId,

    /// Contact that placed the order.
    pub placed_by: ContactId,

    pub status: OrderStatus,
    pub items: Vec<OrderItem>,

    /// Sum of line totals, computed once at creation.
    pub total_amount: Decimal,

    pub created_at: DateTime<Utc>,
    pub accepted_at: Option<DateTime<Utc>>,
    pub completed_at: Option<DateTime<Utc>>,
}

impl Order {
    pub fn new(
        supplier_id: SupplierId,
        consumer_id: ConsumerId,
        placed_by: ContactId,
        items: Vec<OrderItem>,
    ) -> Self {
        let total_amount = items.iter().map(|item| item.line_total).sum();
        Self {
            id: OrderId::generate(),
            supplier_id,
            consumer_id,
            placed_by,
            status: OrderStatus::Pending,
            items,
            total_amount,
            created_at: Utc::now(),
            accepted_at: None,
            completed_at: None,
        }
    }
}
