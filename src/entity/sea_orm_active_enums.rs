use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// Order header status. The set is closed; every transition between values
/// goes through [`crate::lifecycle::transition`].
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, EnumIter, DeriveActiveEnum, Serialize, Deserialize, ToSchema,
)]
#[sea_orm(rs_type = "String", db_type = "Text")]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum OrderStatus {
    #[sea_orm(string_value = "PENDING")]
    Pending,
    #[sea_orm(string_value = "CANCEL_REQUESTED")]
    CancelRequested,
    #[sea_orm(string_value = "CANCELED")]
    Canceled,
    #[sea_orm(string_value = "COMPLETED")]
    Completed,
    #[sea_orm(string_value = "REFUNDED")]
    Refunded,
    #[sea_orm(string_value = "REJECTED")]
    Rejected,
}

impl OrderStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            OrderStatus::Pending => "PENDING",
            OrderStatus::CancelRequested => "CANCEL_REQUESTED",
            OrderStatus::Canceled => "CANCELED",
            OrderStatus::Completed => "COMPLETED",
            OrderStatus::Refunded => "REFUNDED",
            OrderStatus::Rejected => "REJECTED",
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            OrderStatus::Pending => "Pending",
            OrderStatus::CancelRequested => "Cancellation requested",
            OrderStatus::Canceled => "Canceled",
            OrderStatus::Completed => "Completed",
            OrderStatus::Refunded => "Refunded",
            OrderStatus::Rejected => "Rejected",
        }
    }

    /// Terminal states only leave through an explicit business action.
    pub fn is_terminal(&self) -> bool {
        matches!(
            self,
            OrderStatus::Canceled
                | OrderStatus::Completed
                | OrderStatus::Refunded
                | OrderStatus::Rejected
        )
    }
}

impl std::fmt::Display for OrderStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(
    Debug, Clone, Copy, PartialEq, Eq, EnumIter, DeriveActiveEnum, Serialize, Deserialize, ToSchema,
)]
#[sea_orm(rs_type = "String", db_type = "Text")]
#[serde(rename_all = "snake_case")]
pub enum ItemKind {
    #[sea_orm(string_value = "product")]
    Product,
    #[sea_orm(string_value = "event")]
    Event,
    #[sea_orm(string_value = "service")]
    Service,
}
