//! HTTP surface for the supplier/consumer commerce gate.
//!
//! [`build_router`] wires the REST endpoints onto a [`SharedState`]; the
//! binary owns startup (config, tracing, bind) and serves the router.
//! Splitting the router out keeps it drivable in-process from tests.

pub mod api;
pub mod state;

pub use state::{AppState, SharedState};

use axum::routing::{get, post};
use axum::Router;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

pub fn build_router(state: SharedState) -> Router {
    // CORS configuration for browser-based callers
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        // Health check
        .route("/health", get(api::health_check))
        // Registry ingestion seam
        .route("/registry/actors", post(api::register_actor))
        .route("/registry/suppliers", post(api::register_supplier))
        .route("/registry/consumers", post(api::register_consumer))
        .route("/registry/products", post(api::register_product))
        .route("/registry/contacts", post(api::register_contact))
        // Staff management
        .route("/suppliers/:id/staff", post(api::add_staff))
        .route("/staff/:id/deactivate", post(api::deactivate_staff))
        // Relationship links
        .route("/links", post(api::request_link))
        .route("/links/:id", get(api::get_link))
        .route("/links/:id/approve", post(api::approve_link))
        .route("/links/:id/reject", post(api::reject_link))
        .route("/links/:id/block", post(api::block_link))
        // Orders
        .route("/orders", post(api::create_order))
        .route("/orders", get(api::list_orders))
        .route("/orders/:id", get(api::get_order))
        .route("/orders/:id/accept", post(api::accept_order))
        .route("/orders/:id/reject", post(api::reject_order))
        .route("/orders/:id/complete", post(api::complete_order))
        .route("/orders/:id/cancel", post(api::cancel_order))
        // Complaints
        .route("/complaints", post(api::file_complaint))
        .route("/complaints/:id", get(api::get_complaint))
        .route("/complaints/:id/escalate", post(api::escalate_complaint))
        .route("/complaints/:id/resolve", post(api::resolve_complaint))
        .route(
            "/complaints/:id/conversation",
            get(api::get_complaint_conversation),
        )
        // Conversations
        .route("/conversations/:id/send-message", post(api::send_message))
        .route("/conversations/:id/messages", get(api::list_messages))
        .route("/messages/:id/mark-read", post(api::mark_message_read))
        // Layers
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
