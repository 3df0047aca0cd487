//! "How much has actually been paid", derived from the ledger only. Order
//! status is never consulted here.

use std::collections::HashMap;

use rust_decimal::Decimal;
use sea_orm::{
    ColumnTrait, Condition, ConnectionTrait, EntityTrait, FromQueryResult, PaginatorTrait,
    QueryFilter, QueryOrder, QuerySelect, QueryTrait, sea_query::Expr,
};
use serde::Serialize;
use utoipa::ToSchema;
use uuid::Uuid;

use crate::{
    dto::orders::{BusinessOrder, BusinessOrderList, OrderSummaries, OrderSummariesRequest},
    entity::{
        items::{Column as ItemCol, Entity as Items},
        order_items::{Column as OrderItemCol, Entity as OrderItems},
        orders::{Column as OrderCol, Entity as Orders},
        payment_transactions::{Column as TxCol, Entity as PaymentTransactions},
    },
    error::{AppError, AppResult},
    middleware::auth::AuthUser,
    models::{Order, ledger_status},
    response::{ApiResponse, Meta},
    routes::params::{OrderListQuery, SortOrder},
    services::order_service,
    state::AppState,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, ToSchema)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum PaymentState {
    Unpaid,
    PartiallyPaid,
    Paid,
}

#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
pub struct PaymentSummary {
    pub order_id: Uuid,
    #[schema(value_type = String)]
    pub total: Decimal,
    #[schema(value_type = String)]
    pub paid: Decimal,
    #[schema(value_type = String)]
    pub remaining: Decimal,
    pub fully_paid: bool,
    pub state: PaymentState,
}

impl PaymentSummary {
    pub fn compute(order_id: Uuid, total: Decimal, paid: Decimal) -> Self {
        let remaining = (total - paid).max(Decimal::ZERO);
        let fully_paid = total <= Decimal::ZERO || paid >= total;
        let state = if fully_paid {
            PaymentState::Paid
        } else if paid > Decimal::ZERO {
            PaymentState::PartiallyPaid
        } else {
            PaymentState::Unpaid
        };
        Self {
            order_id,
            total,
            paid,
            remaining,
            fully_paid,
            state,
        }
    }
}

#[derive(Debug, FromQueryResult)]
struct PaidRow {
    order_id: Uuid,
    paid: Option<Decimal>,
}

/// Sum of PAID ledger amounts per order, in one grouped query.
pub async fn paid_amounts<C: ConnectionTrait>(
    db: &C,
    order_ids: &[Uuid],
) -> AppResult<HashMap<Uuid, Decimal>> {
    if order_ids.is_empty() {
        return Ok(HashMap::new());
    }

    let rows = PaymentTransactions::find()
        .select_only()
        .column(TxCol::OrderId)
        .column_as(Expr::col(TxCol::Amount).sum(), "paid")
        .filter(TxCol::OrderId.is_in(order_ids.iter().copied()))
        .filter(TxCol::Status.eq(ledger_status::PAID))
        .group_by(TxCol::OrderId)
        .into_model::<PaidRow>()
        .all(db)
        .await?;

    Ok(rows
        .into_iter()
        .map(|row| (row.order_id, row.paid.unwrap_or(Decimal::ZERO)))
        .collect())
}

pub async fn summary_for_order<C: ConnectionTrait>(
    db: &C,
    order_id: Uuid,
    order_total: Decimal,
) -> AppResult<PaymentSummary> {
    let paid = paid_amounts(db, &[order_id])
        .await?
        .remove(&order_id)
        .unwrap_or(Decimal::ZERO);
    Ok(PaymentSummary::compute(order_id, order_total, paid))
}

/// Batched variant; output follows the input order.
pub async fn summaries_for_orders<C: ConnectionTrait>(
    db: &C,
    orders: &[(Uuid, Decimal)],
) -> AppResult<Vec<PaymentSummary>> {
    let ids: Vec<Uuid> = orders.iter().map(|(id, _)| *id).collect();
    let paid = paid_amounts(db, &ids).await?;
    Ok(orders
        .iter()
        .map(|(id, total)| {
            PaymentSummary::compute(*id, *total, paid.get(id).copied().unwrap_or(Decimal::ZERO))
        })
        .collect())
}

/// Summary for the order's customer or for the business that sells it.
pub async fn order_payment_summary(
    state: &AppState,
    user: &AuthUser,
    order_id: Uuid,
) -> AppResult<ApiResponse<PaymentSummary>> {
    let order = Orders::find_by_id(order_id)
        .filter(OrderCol::TenantId.eq(user.tenant_id))
        .one(&state.orm)
        .await?
        .ok_or(AppError::NotFound)?;

    let visible = order.user_id == user.user_id
        || match user.business_id {
            Some(business_id) => {
                order_service::business_owns_order(&state.orm, order.id, business_id).await?
            }
            None => false,
        };
    if !visible {
        return Err(AppError::NotFound);
    }

    let summary = summary_for_order(&state.orm, order.id, order.total_price).await?;
    Ok(ApiResponse::ok(summary))
}

/// Summaries for several of the caller's own orders. Unknown ids are skipped.
pub async fn order_summaries(
    state: &AppState,
    user: &AuthUser,
    payload: OrderSummariesRequest,
) -> AppResult<ApiResponse<OrderSummaries>> {
    if payload.order_ids.len() > 100 {
        return Err(AppError::BadRequest("at most 100 orders per request".into()));
    }

    let orders: Vec<(Uuid, Decimal)> = Orders::find()
        .filter(
            Condition::all()
                .add(OrderCol::Id.is_in(payload.order_ids.iter().copied()))
                .add(OrderCol::UserId.eq(user.user_id))
                .add(OrderCol::TenantId.eq(user.tenant_id)),
        )
        .order_by_desc(OrderCol::CreatedAt)
        .all(&state.orm)
        .await?
        .into_iter()
        .map(|o| (o.id, o.total_price))
        .collect();

    let items = summaries_for_orders(&state.orm, &orders).await?;
    let meta = Meta::count(items.len());
    Ok(ApiResponse::success(
        "OK",
        OrderSummaries { items },
        Some(meta),
    ))
}

/// Owner view: the business's orders with their ledger-derived payment state.
pub async fn list_business_orders(
    state: &AppState,
    user: &AuthUser,
    query: OrderListQuery,
) -> AppResult<ApiResponse<BusinessOrderList>> {
    let business_id = user.business_id()?;
    let (page, limit, offset) = query.pagination.normalize();

    let business_order_ids = OrderItems::find()
        .select_only()
        .column(OrderItemCol::OrderId)
        .inner_join(Items)
        .filter(ItemCol::BusinessId.eq(business_id))
        .into_query();

    let mut condition = Condition::all()
        .add(OrderCol::TenantId.eq(user.tenant_id))
        .add(OrderCol::Id.in_subquery(business_order_ids));
    if let Some(status) = query.status {
        condition = condition.add(OrderCol::Status.eq(status));
    }

    let mut finder = Orders::find().filter(condition);
    finder = match query.sort_order.unwrap_or(SortOrder::Desc) {
        SortOrder::Asc => finder.order_by_asc(OrderCol::CreatedAt),
        SortOrder::Desc => finder.order_by_desc(OrderCol::CreatedAt),
    };

    let total = finder.clone().count(&state.orm).await? as i64;
    let orders = finder
        .limit(limit as u64)
        .offset(offset as u64)
        .all(&state.orm)
        .await?;

    let totals: Vec<(Uuid, Decimal)> = orders.iter().map(|o| (o.id, o.total_price)).collect();
    let summaries = summaries_for_orders(&state.orm, &totals).await?;

    let items = orders
        .into_iter()
        .zip(summaries)
        .map(|(order, payment)| BusinessOrder {
            order: Order::from(order),
            payment,
        })
        .collect();

    Ok(ApiResponse::success(
        "Orders",
        BusinessOrderList { items },
        Some(Meta::new(page, limit, total)),
    ))
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn unpaid_order() {
        let s = PaymentSummary::compute(Uuid::nil(), dec!(20.00), Decimal::ZERO);
        assert_eq!(s.state, PaymentState::Unpaid);
        assert_eq!(s.remaining, dec!(20.00));
        assert!(!s.fully_paid);
    }

    #[test]
    fn partially_paid_order() {
        let s = PaymentSummary::compute(Uuid::nil(), dec!(20.00), dec!(5.50));
        assert_eq!(s.state, PaymentState::PartiallyPaid);
        assert_eq!(s.remaining, dec!(14.50));
        assert!(!s.fully_paid);
    }

    #[test]
    fn fully_paid_order() {
        let s = PaymentSummary::compute(Uuid::nil(), dec!(20.00), dec!(20.00));
        assert_eq!(s.state, PaymentState::Paid);
        assert_eq!(s.remaining, dec!(0.00));
        assert!(s.fully_paid);
    }

    #[test]
    fn overpayment_never_goes_negative() {
        let s = PaymentSummary::compute(Uuid::nil(), dec!(20.00), dec!(25.00));
        assert_eq!(s.remaining, Decimal::ZERO);
        assert!(s.fully_paid);
    }

    #[test]
    fn non_positive_total_is_always_paid() {
        for total in [Decimal::ZERO, dec!(-3)] {
            let s = PaymentSummary::compute(Uuid::nil(), total, Decimal::ZERO);
            assert!(s.fully_paid);
            assert_eq!(s.state, PaymentState::Paid);
            assert_eq!(s.remaining, Decimal::ZERO);
        }
    }
}
