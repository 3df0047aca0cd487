use std::collections::BTreeMap;

use chrono::Utc;
use rust_decimal::Decimal;
use sea_orm::ActiveValue::NotSet;
use sea_orm::sea_query::LockType;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, Condition, ConnectionTrait, EntityTrait, ModelTrait,
    PaginatorTrait, QueryFilter, QueryOrder, QuerySelect, Set, TransactionTrait,
};
use tracing::info;
use uuid::Uuid;

use crate::{
    audit::{self, AuditEvent},
    catalog::{CatalogItem, HasCapacity, HasDisplayName, fits_capacity},
    dto::orders::{CreateOrderRequest, DeletedLine, OrderList, OrderWithItems},
    entity::{
        items::{Column as ItemCol, Entity as Items},
        order_items::{
            ActiveModel as OrderItemActive, Column as OrderItemCol, Entity as OrderItems,
        },
        orders::{ActiveModel as OrderActive, Column as OrderCol, Entity as Orders},
        sea_orm_active_enums::OrderStatus,
    },
    error::{AppError, AppResult},
    middleware::auth::AuthUser,
    models::{Order, OrderItem},
    response::{ApiResponse, Meta},
    routes::params::{OrderListQuery, SortOrder},
    services::capacity_service,
    state::AppState,
};

const MAX_LINES: usize = 50;

pub async fn create_order(
    state: &AppState,
    user: &AuthUser,
    payload: CreateOrderRequest,
) -> AppResult<ApiResponse<OrderWithItems>> {
    if payload.lines.is_empty() {
        return Err(AppError::BadRequest("Order needs at least one line".into()));
    }
    if payload.lines.len() > MAX_LINES {
        return Err(AppError::BadRequest(format!(
            "Order can have at most {MAX_LINES} lines"
        )));
    }
    if payload.lines.iter().any(|line| line.quantity <= 0) {
        return Err(AppError::BadRequest("quantity must be positive".into()));
    }

    // Requested quantity per item, over all lines that name it.
    let mut requested: BTreeMap<Uuid, i64> = BTreeMap::new();
    for line in &payload.lines {
        *requested.entry(line.item_id).or_default() += i64::from(line.quantity);
    }

    let txn = state.orm.begin().await?;

    // Ordered locks keep concurrent creations from deadlocking each other.
    let items: BTreeMap<Uuid, CatalogItem> = Items::find()
        .filter(
            Condition::all()
                .add(ItemCol::Id.is_in(requested.keys().copied()))
                .add(ItemCol::TenantId.eq(user.tenant_id)),
        )
        .order_by_asc(ItemCol::Id)
        .lock(LockType::Update)
        .all(&txn)
        .await?
        .into_iter()
        .map(|model| (model.id, CatalogItem::from(model)))
        .collect();

    if items.len() != requested.len() {
        return Err(AppError::NotFound);
    }

    let currency = items
        .values()
        .next()
        .map(|item| item.info().currency.clone())
        .ok_or(AppError::NotFound)?;
    if items.values().any(|item| item.info().currency != currency) {
        return Err(AppError::BadRequest(
            "All items of an order must share one currency".into(),
        ));
    }

    for (item_id, quantity) in &requested {
        let item = &items[item_id];
        if item.capacity().is_none() {
            continue;
        }
        let committed = capacity_service::committed_quantity(&txn, *item_id).await?;
        if !fits_capacity(item.capacity(), committed, *quantity) {
            return Err(AppError::Conflict(format!(
                "not enough capacity left for {}",
                item.display_name()
            )));
        }
    }

    let total_price: Decimal = payload
        .lines
        .iter()
        .map(|line| items[&line.item_id].info().price * Decimal::from(line.quantity))
        .sum();

    let order = OrderActive {
        id: Set(Uuid::new_v4()),
        tenant_id: Set(user.tenant_id),
        user_id: Set(user.user_id),
        status: Set(OrderStatus::Pending),
        total_price: Set(total_price),
        currency: Set(currency),
        created_at: NotSet,
        updated_at: NotSet,
    }
    .insert(&txn)
    .await?;

    let mut order_items = Vec::with_capacity(payload.lines.len());
    for line in &payload.lines {
        let info = items[&line.item_id].info();
        let item = OrderItemActive {
            id: Set(Uuid::new_v4()),
            order_id: Set(order.id),
            item_id: Set(info.id),
            user_id: Set(user.user_id),
            quantity: Set(line.quantity),
            unit_price: Set(info.price),
            currency: Set(info.currency.clone()),
            created_at: NotSet,
            updated_at: NotSet,
        }
        .insert(&txn)
        .await?;
        order_items.push(OrderItem::from(item));
    }

    txn.commit().await?;

    info!(order_id = %order.id, total = %order.total_price, "order created");
    audit::record(
        &state.pool,
        user,
        AuditEvent::OrderCreated,
        serde_json::json!({ "order_id": order.id, "total_price": order.total_price }),
    )
    .await;

    Ok(ApiResponse::success(
        "Order created",
        OrderWithItems {
            order: Order::from(order),
            items: order_items,
        },
        Some(Meta::empty()),
    ))
}

pub async fn list_orders(
    state: &AppState,
    user: &AuthUser,
    query: OrderListQuery,
) -> AppResult<ApiResponse<OrderList>> {
    let (page, limit, offset) = query.pagination.normalize();
    let mut condition = Condition::all()
        .add(OrderCol::UserId.eq(user.user_id))
        .add(OrderCol::TenantId.eq(user.tenant_id));
    if let Some(status) = query.status {
        condition = condition.add(OrderCol::Status.eq(status));
    }

    let sort_order = query.sort_order.unwrap_or(SortOrder::Desc);

    let mut finder = Orders::find().filter(condition);
    finder = match sort_order {
        SortOrder::Asc => finder.order_by_asc(OrderCol::CreatedAt),
        SortOrder::Desc => finder.order_by_desc(OrderCol::CreatedAt),
    };

    let total = finder.clone().count(&state.orm).await? as i64;

    let orders = finder
        .limit(limit as u64)
        .offset(offset as u64)
        .all(&state.orm)
        .await?
        .into_iter()
        .map(Order::from)
        .collect();

    let meta = Meta::new(page, limit, total);
    Ok(ApiResponse::success(
        "Ok",
        OrderList { items: orders },
        Some(meta),
    ))
}

pub async fn get_order(
    state: &AppState,
    user: &AuthUser,
    id: Uuid,
) -> AppResult<ApiResponse<OrderWithItems>> {
    let order = Orders::find()
        .filter(
            Condition::all()
                .add(OrderCol::UserId.eq(user.user_id))
                .add(OrderCol::TenantId.eq(user.tenant_id))
                .add(OrderCol::Id.eq(id)),
        )
        .one(&state.orm)
        .await?
        .ok_or(AppError::NotFound)?;

    let items = order
        .find_related(OrderItems)
        .order_by_asc(OrderItemCol::CreatedAt)
        .all(&state.orm)
        .await?
        .into_iter()
        .map(OrderItem::from)
        .collect();

    Ok(ApiResponse::success(
        "OK",
        OrderWithItems {
            order: Order::from(order),
            items,
        },
        Some(Meta::empty()),
    ))
}

/// Removes one line whatever its status. The header goes with its last line;
/// ledger entries stay.
pub async fn delete_line(
    state: &AppState,
    user: &AuthUser,
    line_id: Uuid,
) -> AppResult<ApiResponse<DeletedLine>> {
    let txn = state.orm.begin().await?;

    let line = OrderItems::find_by_id(line_id)
        .filter(OrderItemCol::UserId.eq(user.user_id))
        .lock(LockType::Update)
        .one(&txn)
        .await?
        .ok_or(AppError::NotFound)?;

    let order = Orders::find_by_id(line.order_id)
        .filter(OrderCol::TenantId.eq(user.tenant_id))
        .lock(LockType::Update)
        .one(&txn)
        .await?
        .ok_or(AppError::NotFound)?;

    line.delete(&txn).await?;

    let remaining = OrderItems::find()
        .filter(OrderItemCol::OrderId.eq(order.id))
        .count(&txn)
        .await?;
    let order_deleted = remaining == 0;
    if order_deleted {
        Orders::delete_by_id(order.id).exec(&txn).await?;
    } else {
        let mut active: OrderActive = order.clone().into();
        active.updated_at = Set(Utc::now().into());
        active.update(&txn).await?;
    }

    txn.commit().await?;

    audit::record(
        &state.pool,
        user,
        AuditEvent::OrderItemDeleted,
        serde_json::json!({
            "order_item_id": line_id,
            "order_id": order.id,
            "order_deleted": order_deleted,
        }),
    )
    .await;

    Ok(ApiResponse::success(
        "Order item deleted",
        DeletedLine {
            order_item_id: line_id,
            order_id: order.id,
            order_deleted,
        },
        Some(Meta::empty()),
    ))
}

/// Whether any line of the order books an item of `business_id`.
pub async fn business_owns_order<C: ConnectionTrait>(
    db: &C,
    order_id: Uuid,
    business_id: Uuid,
) -> AppResult<bool> {
    let count = OrderItems::find()
        .inner_join(Items)
        .filter(OrderItemCol::OrderId.eq(order_id))
        .filter(ItemCol::BusinessId.eq(business_id))
        .count(db)
        .await?;
    Ok(count > 0)
}
