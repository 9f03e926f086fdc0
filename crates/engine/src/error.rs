//! Error taxonomy shared by every gate operation.
//!
//! Each variant maps to exactly one stable machine-readable code via
//! [`EngineError::code`], so transports can surface `{code, message}` pairs
//! without inspecting variant internals.

use commerce_gate_types::{ComplaintId, ProductId, SupplierId};
use thiserror::Error;

/// Failure modes for gate operations.
#[derive(Debug, Error)]
pub enum EngineError {
    /// The request payload is malformed or violates a field-level rule.
    #[error("validation failed: {0}")]
    Validation(String),

    /// The acting identity is known but not permitted to perform the action.
    #[error("forbidden: {0}")]
    Forbidden(String),

    /// A referenced entity does not exist.
    #[error("{kind} not found: {id}")]
    NotFound { kind: &'static str, id: String },

    /// The request conflicts with existing state, such as a duplicate link.
    #[error("conflict: {0}")]
    Conflict(String),

    /// The entity's current status does not permit the requested transition.
    #[error("{entity} {id} cannot transition from {from} to {to}")]
    InvalidTransition {
        entity: &'static str,
        id: String,
        from: String,
        to: String,
    },

    /// An order acceptance would drive a product's stock negative.
    #[error("insufficient stock for product {product_id}: {available} available, {requested} requested")]
    InsufficientStock {
        product_id: ProductId,
        available: u32,
        requested: u32,
    },

    /// Complaint routing found no active staff membership to assign.
    #[error("no active staff available for supplier {supplier_id}")]
    NoStaffAvailable { supplier_id: SupplierId },

    /// The complaint is already assigned at the top of the escalation chain.
    #[error("complaint {complaint_id} is already assigned at the owner level")]
    AlreadyAtCeiling { complaint_id: ComplaintId },
}

impl EngineError {
    /// Stable snake_case code for wire-level error payloads.
    pub fn code(&self) -> &'static str {
        match self {
            EngineError::Validation(_) => "validation_error",
            EngineError::Forbidden(_) => "forbidden",
            EngineError::NotFound { .. } => "not_found",
            EngineError::Conflict(_) => "conflict",
            EngineError::InvalidTransition { .. } => "invalid_transition",
            EngineError::InsufficientStock { .. } => "insufficient_stock",
            EngineError::NoStaffAvailable { .. } => "no_staff_available",
            EngineError::AlreadyAtCeiling { .. } => "already_at_ceiling",
        }
    }

    /// Shorthand for a [`EngineError::NotFound`] over any displayable id.
    pub fn not_found(kind: &'static str, id: impl ToString) -> Self {
        EngineError::NotFound {
            kind,
            id: id.to_string(),
        }
    }
}

/// Convenience alias used throughout the engine crate.
pub type Result<T> = std::result::Result<T, EngineError>;
