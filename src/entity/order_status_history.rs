use sea_orm::entity::prelude::*;

use super::sea_orm_active_enums::OrderStatus;

/// One row per applied status flip; a two-step transition writes two rows.
#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "order_status_history")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    pub order_id: Uuid,
    pub order_item_id: Uuid,
    pub from_status: OrderStatus,
    pub to_status: OrderStatus,
    pub operation: String,
    pub actor_id: Uuid,
    pub created_at: DateTimeWithTimeZone,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}
