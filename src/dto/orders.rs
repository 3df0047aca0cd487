use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

use crate::{
    models::{Order, OrderItem, StatusChange},
    services::reconciliation_service::PaymentSummary,
};

#[derive(Debug, Deserialize, ToSchema)]
pub struct CreateOrderLine {
    pub item_id: Uuid,
    pub quantity: i32,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct CreateOrderRequest {
    pub lines: Vec<CreateOrderLine>,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct OrderWithItems {
    pub order: Order,
    pub items: Vec<OrderItem>,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct OrderList {
    pub items: Vec<Order>,
}

/// Result of a lifecycle operation on one line.
#[derive(Debug, Serialize, ToSchema)]
pub struct TransitionResult {
    pub order: Order,
    pub item: OrderItem,
    /// False when the operation was a no-op.
    pub changed: bool,
    pub changes: Vec<StatusChange>,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct DeletedLine {
    pub order_item_id: Uuid,
    pub order_id: Uuid,
    /// The header goes with its last line.
    pub order_deleted: bool,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct CapacityQuery {
    pub quantity: i32,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct CapacityCheck {
    pub item_id: Uuid,
    pub requested: i32,
    /// None when the item has no capacity limit.
    pub capacity: Option<i32>,
    pub committed: i64,
    pub allowed: bool,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct OrderSummariesRequest {
    pub order_ids: Vec<Uuid>,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct OrderSummaries {
    pub items: Vec<PaymentSummary>,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct BusinessOrder {
    pub order: Order,
    pub payment: PaymentSummary,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct BusinessOrderList {
    pub items: Vec<BusinessOrder>,
}
