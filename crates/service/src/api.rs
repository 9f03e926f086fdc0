//! REST API handlers

use axum::extract::{Path, State};
use axum::http::{HeaderMap, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::{Deserialize, Serialize};

use commerce_gate_engine::{EngineError, OrderItemSpec, ProductSpec};
use commerce_gate_types::{
    AccountCategory, Actor, ActorId, Complaint, ComplaintId, Consumer, ConsumerContact,
    ConsumerId, Conversation, ConversationId, Link, LinkId, MembershipId, Message, MessageId,
    Order, OrderId, OrderItemId, Product, StaffMembership, StaffRole, Supplier, SupplierId,
};

use crate::state::SharedState;

/// Header carrying the caller identity. Authentication itself lives outside
/// this service; the header value is taken at face value.
pub const ACTOR_HEADER: &str = "x-actor-id";

/// Error envelope every endpoint returns on failure.
#[derive(Debug)]
pub struct ApiError {
    status: StatusCode,
    code: &'static str,
    message: String,
}

impl ApiError {
    fn validation(message: impl Into<String>) -> Self {
        Self {
            status: StatusCode::BAD_REQUEST,
            code: "validation_error",
            message: message.into(),
        }
    }
}

impl From<EngineError> for ApiError {
    fn from(err: EngineError) -> Self {
        let status = match err {
            EngineError::Forbidden(_) => StatusCode::FORBIDDEN,
            EngineError::NotFound { .. } => StatusCode::NOT_FOUND,
            _ => StatusCode::BAD_REQUEST,
        };
        Self {
            status,
            code: err.code(),
            message: err.to_string(),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        (
            self.status,
            Json(serde_json::json!({ "code": self.code, "message": self.message })),
        )
            .into_response()
    }
}

fn acting_actor(headers: &HeaderMap) -> Result<ActorId, ApiError> {
    let value = headers
        .get(ACTOR_HEADER)
        .ok_or_else(|| ApiError::validation("missing X-Actor-Id header"))?
        .to_str()
        .map_err(|_| ApiError::validation("malformed X-Actor-Id header"))?;

    value
        .parse()
        .map_err(|_| ApiError::validation(format!("malformed X-Actor-Id header: {value}")))
}

// Health

#[derive(Serialize)]
pub struct HealthResponse {
    status: String,
    service: String,
    version: String,
    uptime_seconds: u64,
}

pub async fn health_check(State(state): State<SharedState>) -> Json<HealthResponse> {
    let state = state.read().await;
    Json(HealthResponse {
        status: "healthy".to_string(),
        service: env!("CARGO_PKG_NAME").to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        uptime_seconds: state.started_at.elapsed().as_secs(),
    })
}

// Registry ingestion (trusted seam, no caller identity required)

#[derive(Debug, Deserialize)]
pub struct RegisterActorRequest {
    pub name: String,
    pub category: AccountCategory,
}

pub async fn register_actor(
    State(state): State<SharedState>,
    Json(req): Json<RegisterActorRequest>,
) -> (StatusCode, Json<Actor>) {
    let mut state = state.write().await;
    let actor = state.engine.register_actor(req.name, req.category);
    (StatusCode::CREATED, Json(actor))
}

#[derive(Debug, Deserialize)]
pub struct RegisterOrgRequest {
    pub name: String,
}

pub async fn register_supplier(
    State(state): State<SharedState>,
    Json(req): Json<RegisterOrgRequest>,
) -> (StatusCode, Json<Supplier>) {
    let mut state = state.write().await;
    let supplier = state.engine.register_supplier(req.name);
    (StatusCode::CREATED, Json(supplier))
}

pub async fn register_consumer(
    State(state): State<SharedState>,
    Json(req): Json<RegisterOrgRequest>,
) -> (StatusCode, Json<Consumer>) {
    let mut state = state.write().await;
    let consumer = state.engine.register_consumer(req.name);
    (StatusCode::CREATED, Json(consumer))
}

pub async fn register_product(
    State(state): State<SharedState>,
    Json(spec): Json<ProductSpec>,
) -> Result<(StatusCode, Json<Product>), ApiError> {
    let mut state = state.write().await;
    let product = state.engine.register_product(spec)?;
    Ok((StatusCode::CREATED, Json(product)))
}

#[derive(Debug, Deserialize)]
pub struct RegisterContactRequest {
    pub consumer_id: ConsumerId,
    pub actor_id: ActorId,
    #[serde(default)]
    pub primary: bool,
}

pub async fn register_contact(
    State(state): State<SharedState>,
    Json(req): Json<RegisterContactRequest>,
) -> Result<(StatusCode, Json<ConsumerContact>), ApiError> {
    let mut state = state.write().await;
    let contact = state
        .engine
        .register_contact(req.consumer_id, req.actor_id, req.primary)?;
    Ok((StatusCode::CREATED, Json(contact)))
}

// Staff management

#[derive(Debug, Deserialize)]
pub struct AddStaffRequest {
    pub actor_id: ActorId,
    pub role: StaffRole,
}

pub async fn add_staff(
    State(state): State<SharedState>,
    Path(supplier_id): Path<SupplierId>,
    headers: HeaderMap,
    Json(req): Json<AddStaffRequest>,
) -> Result<(StatusCode, Json<StaffMembership>), ApiError> {
    let acting = acting_actor(&headers)?;
    let mut state = state.write().await;
    let membership = state
        .engine
        .add_staff(&acting, supplier_id, req.actor_id, req.role)?;
    Ok((StatusCode::CREATED, Json(membership)))
}

pub async fn deactivate_staff(
    State(state): State<SharedState>,
    Path(membership_id): Path<MembershipId>,
    headers: HeaderMap,
) -> Result<Json<StaffMembership>, ApiError> {
    let acting = acting_actor(&headers)?;
    let mut state = state.write().await;
    let membership = state.engine.deactivate_staff(&acting, membership_id)?;
    Ok(Json(membership))
}

// Relationship links

#[derive(Debug, Deserialize)]
pub struct RequestLinkRequest {
    pub supplier_id: SupplierId,
    pub consumer_id: ConsumerId,
}

pub async fn request_link(
    State(state): State<SharedState>,
    headers: HeaderMap,
    Json(req): Json<RequestLinkRequest>,
) -> Result<(StatusCode, Json<Link>), ApiError> {
    let acting = acting_actor(&headers)?;
    let mut state = state.write().await;
    let link = state
        .engine
        .request_link(&acting, req.supplier_id, req.consumer_id)?;
    Ok((StatusCode::CREATED, Json(link)))
}

pub async fn get_link(
    State(state): State<SharedState>,
    Path(id): Path<LinkId>,
    headers: HeaderMap,
) -> Result<Json<Link>, ApiError> {
    acting_actor(&headers)?;
    let state = state.read().await;
    let link = state.engine.directory().get_link(&id)?.clone();
    Ok(Json(link))
}

pub async fn approve_link(
    State(state): State<SharedState>,
    Path(id): Path<LinkId>,
    headers: HeaderMap,
) -> Result<Json<Link>, ApiError> {
    let acting = acting_actor(&headers)?;
    let mut state = state.write().await;
    let link = state.engine.approve_link(&acting, id)?;
    Ok(Json(link))
}

/// Optional body for the link decisions that carry a free-text reason.
#[derive(Debug, Deserialize)]
pub struct NoteRequest {
    pub note: Option<String>,
}

pub async fn reject_link(
    State(state): State<SharedState>,
    Path(id): Path<LinkId>,
    headers: HeaderMap,
    body: Option<Json<NoteRequest>>,
) -> Result<Json<Link>, ApiError> {
    let acting = acting_actor(&headers)?;
    let note = body.and_then(|Json(req)| req.note);
    let mut state = state.write().await;
    let link = state.engine.reject_link(&acting, id, note)?;
    Ok(Json(link))
}

pub async fn block_link(
    State(state): State<SharedState>,
    Path(id): Path<LinkId>,
    headers: HeaderMap,
    body: Option<Json<NoteRequest>>,
) -> Result<Json<Link>, ApiError> {
    let acting = acting_actor(&headers)?;
    let note = body.and_then(|Json(req)| req.note);
    let mut state = state.write().await;
    let link = state.engine.block_link(&acting, id, note)?;
    Ok(Json(link))
}

// Orders

#[derive(Debug, Deserialize)]
pub struct CreateOrderRequest {
    pub supplier_id: SupplierId,
    pub consumer_id: ConsumerId,
    pub items: Vec<OrderItemSpec>,
}

pub async fn create_order(
    State(state): State<SharedState>,
    headers: HeaderMap,
    Json(req): Json<CreateOrderRequest>,
) -> Result<(StatusCode, Json<Order>), ApiError> {
    let acting = acting_actor(&headers)?;
    let mut state = state.write().await;
    let order = state
        .engine
        .create_order(&acting, req.supplier_id, req.consumer_id, req.items)?;
    Ok((StatusCode::CREATED, Json(order)))
}

#[derive(Serialize)]
pub struct OrderListResponse {
    pub orders: Vec<Order>,
    pub total: usize,
}

pub async fn list_orders(
    State(state): State<SharedState>,
    headers: HeaderMap,
) -> Result<Json<OrderListResponse>, ApiError> {
    let acting = acting_actor(&headers)?;
    let state = state.read().await;
    let orders = state.engine.visible_orders(&acting)?;
    let total = orders.len();
    Ok(Json(OrderListResponse { orders, total }))
}

pub async fn get_order(
    State(state): State<SharedState>,
    Path(id): Path<OrderId>,
    headers: HeaderMap,
) -> Result<Json<Order>, ApiError> {
    acting_actor(&headers)?;
    let state = state.read().await;
    let order = state.engine.directory().get_order(&id)?.clone();
    Ok(Json(order))
}

pub async fn accept_order(
    State(state): State<SharedState>,
    Path(id): Path<OrderId>,
    headers: HeaderMap,
) -> Result<Json<Order>, ApiError> {
    let acting = acting_actor(&headers)?;
    let mut state = state.write().await;
    let order = state.engine.accept_order(&acting, id)?;
    Ok(Json(order))
}

pub async fn reject_order(
    State(state): State<SharedState>,
    Path(id): Path<OrderId>,
    headers: HeaderMap,
) -> Result<Json<Order>, ApiError> {
    let acting = acting_actor(&headers)?;
    let mut state = state.write().await;
    let order = state.engine.reject_order(&acting, id)?;
    Ok(Json(order))
}

pub async fn complete_order(
    State(state): State<SharedState>,
    Path(id): Path<OrderId>,
    headers: HeaderMap,
) -> Result<Json<Order>, ApiError> {
    let acting = acting_actor(&headers)?;
    let mut state = state.write().await;
    let order = state.engine.complete_order(&acting, id)?;
    Ok(Json(order))
}

pub async fn cancel_order(
    State(state): State<SharedState>,
    Path(id): Path<OrderId>,
    headers: HeaderMap,
) -> Result<Json<Order>, ApiError> {
    let acting = acting_actor(&headers)?;
    let mut state = state.write().await;
    let order = state.engine.cancel_order(&acting, id)?;
    Ok(Json(order))
}

// Complaints

#[derive(Debug, Deserialize)]
pub struct FileComplaintRequest {
    pub order_id: OrderId,
    #[serde(default)]
    pub order_item_id: Option<OrderItemId>,
    pub description: String,
}

pub async fn file_complaint(
    State(state): State<SharedState>,
    headers: HeaderMap,
    Json(req): Json<FileComplaintRequest>,
) -> Result<(StatusCode, Json<Complaint>), ApiError> {
    let acting = acting_actor(&headers)?;
    let mut state = state.write().await;
    let complaint =
        state
            .engine
            .file_complaint(&acting, req.order_id, req.order_item_id, req.description)?;
    Ok((StatusCode::CREATED, Json(complaint)))
}

pub async fn get_complaint(
    State(state): State<SharedState>,
    Path(id): Path<ComplaintId>,
    headers: HeaderMap,
) -> Result<Json<Complaint>, ApiError> {
    acting_actor(&headers)?;
    let state = state.read().await;
    let complaint = state.engine.directory().get_complaint(&id)?.clone();
    Ok(Json(complaint))
}

pub async fn escalate_complaint(
    State(state): State<SharedState>,
    Path(id): Path<ComplaintId>,
    headers: HeaderMap,
) -> Result<Json<Complaint>, ApiError> {
    let acting = acting_actor(&headers)?;
    let mut state = state.write().await;
    let complaint = state.engine.escalate_complaint(&acting, id)?;
    Ok(Json(complaint))
}

#[derive(Debug, Deserialize)]
pub struct ResolveComplaintRequest {
    pub resolution: String,
}

pub async fn resolve_complaint(
    State(state): State<SharedState>,
    Path(id): Path<ComplaintId>,
    headers: HeaderMap,
    Json(req): Json<ResolveComplaintRequest>,
) -> Result<Json<Complaint>, ApiError> {
    let acting = acting_actor(&headers)?;
    let mut state = state.write().await;
    let complaint = state.engine.resolve_complaint(&acting, id, req.resolution)?;
    Ok(Json(complaint))
}

/// Participant-gated lookup of the conversation a complaint opened. This is
/// how a client discovers the conversation id after filing.
pub async fn get_complaint_conversation(
    State(state): State<SharedState>,
    Path(id): Path<ComplaintId>,
    headers: HeaderMap,
) -> Result<Json<Conversation>, ApiError> {
    let acting = acting_actor(&headers)?;
    let state = state.read().await;
    let conversation = state.engine.conversation_for_complaint(&acting, &id)?;
    Ok(Json(conversation))
}

// Conversations

#[derive(Debug, Deserialize)]
pub struct SendMessageRequest {
    pub body: String,
}

pub async fn send_message(
    State(state): State<SharedState>,
    Path(id): Path<ConversationId>,
    headers: HeaderMap,
    Json(req): Json<SendMessageRequest>,
) -> Result<Json<Message>, ApiError> {
    let acting = acting_actor(&headers)?;
    let mut state = state.write().await;
    let message = state.engine.post_message(&acting, id, req.body)?;
    Ok(Json(message))
}

#[derive(Serialize)]
pub struct MessageListResponse {
    pub messages: Vec<Message>,
    pub total: usize,
}

pub async fn list_messages(
    State(state): State<SharedState>,
    Path(id): Path<ConversationId>,
    headers: HeaderMap,
) -> Result<Json<MessageListResponse>, ApiError> {
    let acting = acting_actor(&headers)?;
    let state = state.read().await;
    let messages = state.engine.list_messages(&acting, &id)?;
    let total = messages.len();
    Ok(Json(MessageListResponse { messages, total }))
}

pub async fn mark_message_read(
    State(state): State<SharedState>,
    Path(id): Path<MessageId>,
    headers: HeaderMap,
) -> Result<Json<Message>, ApiError> {
    let acting = acting_actor(&headers)?;
    let mut state = state.write().await;
    let message = state.engine.mark_message_read(&acting, id)?;
    Ok(Json(message))
}
