use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

use crate::entity::{
    order_items::Model as OrderItemModel, order_status_history::Model as StatusHistoryModel,
    orders::Model as OrderModel, payment_transactions::Model as PaymentTransactionModel,
    sea_orm_active_enums::OrderStatus,
};

/// Ledger statuses written by this service. Adapter statuses are stored
/// uppercased next to these.
pub mod ledger_status {
    pub const CREATED: &str = "CREATED";
    pub const OFFLINE_PENDING: &str = "OFFLINE_PENDING";
    pub const PAID: &str = "PAID";
    pub const FAILED: &str = "FAILED";
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct Order {
    pub id: Uuid,
    pub tenant_id: Uuid,
    pub user_id: Uuid,
    pub status: OrderStatus,
    pub status_label: String,
    /// True once the order only moves again through a business action.
    pub terminal: bool,
    #[schema(value_type = String)]
    pub total_price: Decimal,
    pub currency: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct OrderItem {
    pub id: Uuid,
    pub order_id: Uuid,
    pub item_id: Uuid,
    pub user_id: Uuid,
    pub quantity: i32,
    #[schema(value_type = String)]
    pub unit_price: Decimal,
    pub currency: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct PaymentTransaction {
    pub id: Uuid,
    pub tenant_id: Uuid,
    pub order_id: Uuid,
    pub provider_code: String,
    pub provider_payment_id: Option<String>,
    #[schema(value_type = String)]
    pub amount: Decimal,
    pub currency: String,
    pub status: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct StatusChange {
    pub order_item_id: Uuid,
    pub from_status: OrderStatus,
    pub to_status: OrderStatus,
    pub operation: String,
    pub actor_id: Uuid,
    pub created_at: DateTime<Utc>,
}

impl From<OrderModel> for Order {
    fn from(model: OrderModel) -> Self {
        Order {
            id: model.id,
            tenant_id: model.tenant_id,
            user_id: model.user_id,
            status_label: model.status.label().to_string(),
            terminal: model.status.is_terminal(),
            status: model.status,
            total_price: model.total_price,
            currency: model.currency,
            created_at: model.created_at.with_timezone(&Utc),
            updated_at: model.updated_at.with_timezone(&Utc),
        }
    }
}

impl From<OrderItemModel> for OrderItem {
    fn from(model: OrderItemModel) -> Self {
        OrderItem {
            id: model.id,
            order_id: model.order_id,
            item_id: model.item_id,
            user_id: model.user_id,
            quantity: model.quantity,
            unit_price: model.unit_price,
            currency: model.currency,
            created_at: model.created_at.with_timezone(&Utc),
            updated_at: model.updated_at.with_timezone(&Utc),
        }
    }
}

impl From<PaymentTransactionModel> for PaymentTransaction {
    fn from(model: PaymentTransactionModel) -> Self {
        PaymentTransaction {
            id: model.id,
            tenant_id: model.tenant_id,
            order_id: model.order_id,
            provider_code: model.provider_code,
            provider_payment_id: model.provider_payment_id,
            amount: model.amount,
            currency: model.currency,
            status: model.status,
            created_at: model.created_at.with_timezone(&Utc),
            updated_at: model.updated_at.with_timezone(&Utc),
        }
    }
}

impl From<StatusHistoryModel> for StatusChange {
    fn from(model: StatusHistoryModel) -> Self {
        StatusChange {
            order_item_id: model.order_item_id,
            from_status: model.from_status,
            to_status: model.to_status,
            operation: model.operation,
            actor_id: model.actor_id,
            created_at: model.created_at.with_timezone(&Utc),
        }
    }
}
