//! Applies lifecycle operations to a line and its order header.

use chrono::Utc;
use sea_orm::sea_query::LockType;
use sea_orm::{
    ActiveModelTrait, DatabaseTransaction, EntityTrait, QuerySelect, Set, TransactionTrait,
};
use tracing::info;
use uuid::Uuid;

use crate::{
    audit::{self, AuditEvent},
    dto::orders::TransitionResult,
    entity::{
        items::Entity as Items,
        order_items::{ActiveModel as OrderItemActive, Entity as OrderItems, Model as OrderItemModel},
        order_status_history::ActiveModel as StatusHistoryActive,
        orders::{ActiveModel as OrderActive, Entity as Orders, Model as OrderModel},
        sea_orm_active_enums::OrderStatus,
    },
    error::{AppError, AppResult},
    lifecycle::{Actor, Operation, Transition, transition},
    middleware::auth::AuthUser,
    models::{Order, OrderItem, StatusChange},
    response::{ApiResponse, Meta},
    services::capacity_service,
    state::AppState,
};

/// Loads and locks the line and its header, checks who may act, then
/// persists every step of the transition in one database transaction.
pub async fn apply(
    state: &AppState,
    user: &AuthUser,
    line_id: Uuid,
    operation: Operation,
) -> AppResult<ApiResponse<TransitionResult>> {
    let txn = state.orm.begin().await?;

    let line = OrderItems::find_by_id(line_id)
        .lock(LockType::Update)
        .one(&txn)
        .await?
        .ok_or(AppError::NotFound)?;

    let order = Orders::find_by_id(line.order_id)
        .lock(LockType::Update)
        .one(&txn)
        .await?
        .ok_or(AppError::NotFound)?;

    if order.tenant_id != user.tenant_id {
        return Err(AppError::NotFound);
    }
    authorize(&txn, user, &line, operation).await?;

    let plan = transition(operation, order.status)?;
    if order.status != OrderStatus::Completed
        && plan.final_status() == Some(OrderStatus::Completed)
    {
        capacity_service::ensure_completion_fits(&txn, order.id).await?;
    }

    let (order, line, changes) = match plan {
        Transition::Noop => (order, line, Vec::new()),
        Transition::Apply(steps) => persist_steps(&txn, user, order, line, operation, &steps).await?,
    };

    txn.commit().await?;

    let changed = !changes.is_empty();
    if changed {
        info!(
            order_id = %order.id,
            order_item_id = %line.id,
            %operation,
            status = %order.status,
            "order status changed"
        );
    }
    if changed && order.status == OrderStatus::Completed {
        info!(order_id = %order.id, "order completed");
        audit::record(
            &state.pool,
            user,
            AuditEvent::OrderCompleted,
            serde_json::json!({
                "order_id": order.id,
                "order_item_id": line.id,
                "total_price": order.total_price,
            }),
        )
        .await;
    }

    let message = if changed { "Status updated" } else { "Nothing to change" };
    Ok(ApiResponse::success(
        message,
        TransitionResult {
            order: Order::from(order),
            item: OrderItem::from(line),
            changed,
            changes,
        },
        Some(Meta::empty()),
    ))
}

/// Customer operations belong to the line's user, business operations to the
/// business selling the line's item. A mismatch looks like a missing line.
async fn authorize(
    txn: &DatabaseTransaction,
    user: &AuthUser,
    line: &OrderItemModel,
    operation: Operation,
) -> AppResult<()> {
    let is_customer = line.user_id == user.user_id;
    let is_business = match user.business_id {
        Some(business_id) => {
            let item = Items::find_by_id(line.item_id)
                .one(txn)
                .await?
                .ok_or(AppError::NotFound)?;
            item.business_id == business_id
        }
        None => false,
    };

    let allowed = match operation.actor() {
        Actor::Customer => is_customer,
        Actor::Business => is_business,
        Actor::Either => is_customer || is_business,
    };
    if !allowed {
        return Err(AppError::NotFound);
    }
    Ok(())
}

async fn persist_steps(
    txn: &DatabaseTransaction,
    user: &AuthUser,
    mut order: OrderModel,
    mut line: OrderItemModel,
    operation: Operation,
    steps: &[OrderStatus],
) -> AppResult<(OrderModel, OrderItemModel, Vec<StatusChange>)> {
    let mut changes = Vec::with_capacity(steps.len());

    for &next in steps {
        let from = order.status;
        let now = Utc::now();

        let mut header: OrderActive = order.into();
        header.status = Set(next);
        header.updated_at = Set(now.into());
        order = header.update(txn).await?;

        let mut item: OrderItemActive = line.into();
        item.updated_at = Set(now.into());
        line = item.update(txn).await?;

        let history = StatusHistoryActive {
            id: Set(Uuid::new_v4()),
            order_id: Set(order.id),
            order_item_id: Set(line.id),
            from_status: Set(from),
            to_status: Set(next),
            operation: Set(operation.as_str().to_string()),
            actor_id: Set(user.user_id),
            created_at: Set(now.into()),
        }
        .insert(txn)
        .await?;
        changes.push(StatusChange::from(history));
    }

    Ok((order, line, changes))
}
