use std::collections::BTreeMap;

use sea_orm::{
    ColumnTrait, ConnectionTrait, EntityTrait, QueryFilter, QueryOrder, QuerySelect,
    sea_query::{Expr, LockType},
};
use uuid::Uuid;

use crate::{
    catalog::{CatalogItem, HasCapacity, HasDisplayName, fits_capacity},
    dto::orders::CapacityCheck,
    entity::{
        items::{Column as ItemCol, Entity as Items},
        order_items::{Column as OrderItemCol, Entity as OrderItems},
        orders::{Column as OrderCol, Entity as Orders},
        sea_orm_active_enums::OrderStatus,
    },
    error::{AppError, AppResult},
    middleware::auth::AuthUser,
    response::ApiResponse,
    state::AppState,
};

/// Quantity already committed for an item: lines whose order is COMPLETED.
pub async fn committed_quantity<C: ConnectionTrait>(db: &C, item_id: Uuid) -> AppResult<i64> {
    let committed: Option<Option<i64>> = OrderItems::find()
        .select_only()
        .column_as(
            Expr::col((OrderItems, OrderItemCol::Quantity)).sum(),
            "committed",
        )
        .inner_join(Orders)
        .filter(OrderItemCol::ItemId.eq(item_id))
        .filter(OrderCol::Status.eq(OrderStatus::Completed))
        .into_tuple()
        .one(db)
        .await?;

    Ok(committed.flatten().unwrap_or(0))
}

/// Evaluates a request against an already loaded item. Callers that go on to
/// create lines must hold a row lock on the item for the check to stay valid.
pub async fn evaluate<C: ConnectionTrait>(
    db: &C,
    item: &CatalogItem,
    requested: i32,
) -> AppResult<CapacityCheck> {
    if requested <= 0 {
        return Err(AppError::BadRequest("quantity must be positive".into()));
    }
    let capacity = item.capacity();
    let committed = match capacity {
        Some(_) => committed_quantity(db, item.info().id).await?,
        None => 0,
    };
    Ok(CapacityCheck {
        item_id: item.info().id,
        requested,
        capacity,
        committed,
        allowed: fits_capacity(capacity, committed, i64::from(requested)),
    })
}

/// `checkCapacity(itemId, requestedQty)`: whether the item can take the
/// requested quantity right now.
pub async fn check_capacity<C: ConnectionTrait>(
    db: &C,
    tenant_id: Uuid,
    item_id: Uuid,
    requested: i32,
) -> AppResult<bool> {
    let item = find_item(db, tenant_id, item_id).await?;
    Ok(evaluate(db, &item, requested).await?.allowed)
}

pub async fn item_capacity(
    state: &AppState,
    user: &AuthUser,
    item_id: Uuid,
    requested: i32,
) -> AppResult<ApiResponse<CapacityCheck>> {
    let item = find_item(&state.orm, user.tenant_id, item_id).await?;
    let check = evaluate(&state.orm, &item, requested).await?;
    Ok(ApiResponse::ok(check))
}

/// Checks that completing `order_id` keeps every item of the order within
/// capacity. Locks the items in id order, so it must run inside the
/// transaction that flips the order to COMPLETED.
pub async fn ensure_completion_fits<C: ConnectionTrait>(db: &C, order_id: Uuid) -> AppResult<()> {
    let lines: Vec<(Uuid, i32)> = OrderItems::find()
        .select_only()
        .column(OrderItemCol::ItemId)
        .column(OrderItemCol::Quantity)
        .filter(OrderItemCol::OrderId.eq(order_id))
        .into_tuple()
        .all(db)
        .await?;

    let mut requested: BTreeMap<Uuid, i64> = BTreeMap::new();
    for (item_id, quantity) in lines {
        *requested.entry(item_id).or_default() += i64::from(quantity);
    }
    if requested.is_empty() {
        return Ok(());
    }

    let items = Items::find()
        .filter(ItemCol::Id.is_in(requested.keys().copied()))
        .order_by_asc(ItemCol::Id)
        .lock(LockType::Update)
        .all(db)
        .await?;

    for model in items {
        let item = CatalogItem::from(model);
        let Some(capacity) = item.capacity() else {
            continue;
        };
        let id = item.info().id;
        let quantity = requested.get(&id).copied().unwrap_or(0);
        // The order is not COMPLETED yet, so its own lines are not counted here.
        let committed = committed_quantity(db, id).await?;
        if !fits_capacity(Some(capacity), committed, quantity) {
            return Err(AppError::Conflict(format!(
                "not enough capacity left for {}",
                item.display_name()
            )));
        }
    }
    Ok(())
}

async fn find_item<C: ConnectionTrait>(
    db: &C,
    tenant_id: Uuid,
    item_id: Uuid,
) -> AppResult<CatalogItem> {
    Items::find_by_id(item_id)
        .filter(ItemCol::TenantId.eq(tenant_id))
        .one(db)
        .await?
        .map(CatalogItem::from)
        .ok_or(AppError::NotFound)
}
