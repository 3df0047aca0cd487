use axum::{
    Json, Router,
    extract::{Path, Query, State},
    routing::{get, post},
};
use uuid::Uuid;

use crate::{
    dto::orders::{BusinessOrderList, TransitionResult},
    error::AppResult,
    lifecycle::Operation,
    middleware::auth::AuthUser,
    response::ApiResponse,
    routes::params::OrderListQuery,
    services::{booking_service, reconciliation_service},
    state::AppState,
};

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/orders", get(list_business_orders))
        .route("/order-items/{id}/approve-cancel", post(approve_cancel))
        .route("/order-items/{id}/reject-cancel", post(reject_cancel))
        .route("/order-items/{id}/mark-paid", post(mark_paid))
        .route("/order-items/{id}/mark-refunded", post(mark_refunded))
        .route("/order-items/{id}/reject", post(reject_order))
        .route("/order-items/{id}/unreject", post(unreject_order))
        .route("/order-items/{id}/refund", post(refund))
}

async fn run(
    state: &AppState,
    user: &AuthUser,
    id: Uuid,
    operation: Operation,
) -> AppResult<Json<ApiResponse<TransitionResult>>> {
    let resp = booking_service::apply(state, user, id, operation).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    get,
    path = "/api/business/orders",
    params(
        ("page" = Option<i64>, Query, description = "Page number, default 1"),
        ("per_page" = Option<i64>, Query, description = "Items per page, default 20"),
        ("status" = Option<String>, Query, description = "Filter by status"),
        ("sort_order" = Option<String>, Query, description = "Sort order: asc, desc")
    ),
    responses(
        (status = 200, description = "Orders of the caller's business with payment summaries", body = ApiResponse<BusinessOrderList>),
        (status = 403, description = "Caller is not a business member"),
    ),
    security(("bearer_auth" = [])),
    tag = "Business"
)]
pub async fn list_business_orders(
    State(state): State<AppState>,
    user: AuthUser,
    Query(query): Query<OrderListQuery>,
) -> AppResult<Json<ApiResponse<BusinessOrderList>>> {
    let resp = reconciliation_service::list_business_orders(&state, &user, query).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    post,
    path = "/api/business/order-items/{id}/approve-cancel",
    params(("id" = Uuid, Path, description = "Order item ID")),
    responses(
        (status = 200, description = "Cancellation approved", body = ApiResponse<TransitionResult>),
        (status = 404, description = "Not Found"),
        (status = 409, description = "Conflict"),
    ),
    security(("bearer_auth" = [])),
    tag = "Business"
)]
pub async fn approve_cancel(
    State(state): State<AppState>,
    user: AuthUser,
    Path(id): Path<Uuid>,
) -> AppResult<Json<ApiResponse<TransitionResult>>> {
    run(&state, &user, id, Operation::ApproveCancel).await
}

#[utoipa::path(
    post,
    path = "/api/business/order-items/{id}/reject-cancel",
    params(("id" = Uuid, Path, description = "Order item ID")),
    responses(
        (status = 200, description = "Cancellation request declined", body = ApiResponse<TransitionResult>),
        (status = 404, description = "Not Found"),
        (status = 409, description = "Conflict"),
    ),
    security(("bearer_auth" = [])),
    tag = "Business"
)]
pub async fn reject_cancel(
    State(state): State<AppState>,
    user: AuthUser,
    Path(id): Path<Uuid>,
) -> AppResult<Json<ApiResponse<TransitionResult>>> {
    run(&state, &user, id, Operation::RejectCancel).await
}

#[utoipa::path(
    post,
    path = "/api/business/order-items/{id}/mark-paid",
    params(("id" = Uuid, Path, description = "Order item ID")),
    responses(
        (status = 200, description = "Order completed", body = ApiResponse<TransitionResult>),
        (status = 404, description = "Not Found"),
        (status = 409, description = "Conflict"),
    ),
    security(("bearer_auth" = [])),
    tag = "Business"
)]
pub async fn mark_paid(
    State(state): State<AppState>,
    user: AuthUser,
    Path(id): Path<Uuid>,
) -> AppResult<Json<ApiResponse<TransitionResult>>> {
    run(&state, &user, id, Operation::MarkPaid).await
}

#[utoipa::path(
    post,
    path = "/api/business/order-items/{id}/mark-refunded",
    params(("id" = Uuid, Path, description = "Order item ID")),
    responses(
        (status = 200, description = "Order refunded", body = ApiResponse<TransitionResult>),
        (status = 404, description = "Not Found"),
    ),
    security(("bearer_auth" = [])),
    tag = "Business"
)]
pub async fn mark_refunded(
    State(state): State<AppState>,
    user: AuthUser,
    Path(id): Path<Uuid>,
) -> AppResult<Json<ApiResponse<TransitionResult>>> {
    run(&state, &user, id, Operation::MarkRefunded).await
}

#[utoipa::path(
    post,
    path = "/api/business/order-items/{id}/reject",
    params(("id" = Uuid, Path, description = "Order item ID")),
    responses(
        (status = 200, description = "Order rejected", body = ApiResponse<TransitionResult>),
        (status = 404, description = "Not Found"),
        (status = 409, description = "Conflict"),
    ),
    security(("bearer_auth" = [])),
    tag = "Business"
)]
pub async fn reject_order(
    State(state): State<AppState>,
    user: AuthUser,
    Path(id): Path<Uuid>,
) -> AppResult<Json<ApiResponse<TransitionResult>>> {
    run(&state, &user, id, Operation::RejectOrder).await
}

#[utoipa::path(
    post,
    path = "/api/business/order-items/{id}/unreject",
    params(("id" = Uuid, Path, description = "Order item ID")),
    responses(
        (status = 200, description = "Order back to pending", body = ApiResponse<TransitionResult>),
        (status = 404, description = "Not Found"),
        (status = 409, description = "Conflict"),
    ),
    security(("bearer_auth" = [])),
    tag = "Business"
)]
pub async fn unreject_order(
    State(state): State<AppState>,
    user: AuthUser,
    Path(id): Path<Uuid>,
) -> AppResult<Json<ApiResponse<TransitionResult>>> {
    run(&state, &user, id, Operation::UnrejectOrder).await
}

#[utoipa::path(
    post,
    path = "/api/business/order-items/{id}/refund",
    params(("id" = Uuid, Path, description = "Order item ID")),
    responses(
        (status = 200, description = "Order refunded", body = ApiResponse<TransitionResult>),
        (status = 404, description = "Not Found"),
        (status = 409, description = "Order is not eligible for a refund"),
    ),
    security(("bearer_auth" = [])),
    tag = "Business"
)]
pub async fn refund(
    State(state): State<AppState>,
    user: AuthUser,
    Path(id): Path<Uuid>,
) -> AppResult<Json<ApiResponse<TransitionResult>>> {
    run(&state, &user, id, Operation::RefundIfEligible).await
}
