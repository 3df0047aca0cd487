use axum::{
    Json, Router,
    extract::{Path, Query, State},
    routing::{get, post},
};
use uuid::Uuid;

use crate::{
    dto::orders::{
        CreateOrderRequest, OrderList, OrderSummaries, OrderSummariesRequest, OrderWithItems,
    },
    error::AppResult,
    middleware::auth::AuthUser,
    response::ApiResponse,
    routes::params::OrderListQuery,
    services::{order_service, reconciliation_service, reconciliation_service::PaymentSummary},
    state::AppState,
};

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(list_orders).post(create_order))
        .route("/summaries", post(order_summaries))
        .route("/{id}", get(get_order))
        .route("/{id}/payment-summary", get(payment_summary))
}

#[utoipa::path(
    post,
    path = "/api/orders",
    request_body = CreateOrderRequest,
    responses(
        (status = 200, description = "Order created with its lines", body = ApiResponse<OrderWithItems>),
        (status = 400, description = "Invalid lines"),
        (status = 404, description = "Unknown item"),
        (status = 409, description = "Not enough capacity"),
    ),
    security(("bearer_auth" = [])),
    tag = "Orders"
)]
pub async fn create_order(
    State(state): State<AppState>,
    user: AuthUser,
    Json(payload): Json<CreateOrderRequest>,
) -> AppResult<Json<ApiResponse<OrderWithItems>>> {
    let resp = order_service::create_order(&state, &user, payload).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    get,
    path = "/api/orders",
    params(
        ("page" = Option<i64>, Query, description = "Page number, default 1"),
        ("per_page" = Option<i64>, Query, description = "Items per page, default 20"),
        ("status" = Option<String>, Query, description = "Filter by status, e.g. PENDING"),
        ("sort_order" = Option<String>, Query, description = "Sort order: asc, desc")
    ),
    responses(
        (status = 200, description = "Orders of the current user", body = ApiResponse<OrderList>),
    ),
    security(("bearer_auth" = [])),
    tag = "Orders"
)]
pub async fn list_orders(
    State(state): State<AppState>,
    user: AuthUser,
    Query(query): Query<OrderListQuery>,
) -> AppResult<Json<ApiResponse<OrderList>>> {
    let resp = order_service::list_orders(&state, &user, query).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    get,
    path = "/api/orders/{id}",
    params(("id" = Uuid, Path, description = "Order ID")),
    responses(
        (status = 200, description = "Order with its lines", body = ApiResponse<OrderWithItems>),
        (status = 404, description = "Not Found"),
    ),
    security(("bearer_auth" = [])),
    tag = "Orders"
)]
pub async fn get_order(
    State(state): State<AppState>,
    user: AuthUser,
    Path(id): Path<Uuid>,
) -> AppResult<Json<ApiResponse<OrderWithItems>>> {
    let resp = order_service::get_order(&state, &user, id).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    get,
    path = "/api/orders/{id}/payment-summary",
    params(("id" = Uuid, Path, description = "Order ID")),
    responses(
        (status = 200, description = "Paid and remaining amounts from the ledger", body = ApiResponse<PaymentSummary>),
        (status = 404, description = "Not Found"),
    ),
    security(("bearer_auth" = [])),
    tag = "Orders"
)]
pub async fn payment_summary(
    State(state): State<AppState>,
    user: AuthUser,
    Path(id): Path<Uuid>,
) -> AppResult<Json<ApiResponse<PaymentSummary>>> {
    let resp = reconciliation_service::order_payment_summary(&state, &user, id).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    post,
    path = "/api/orders/summaries",
    request_body = OrderSummariesRequest,
    responses(
        (status = 200, description = "Payment summaries for several orders", body = ApiResponse<OrderSummaries>),
        (status = 400, description = "Too many orders"),
    ),
    security(("bearer_auth" = [])),
    tag = "Orders"
)]
pub async fn order_summaries(
    State(state): State<AppState>,
    user: AuthUser,
    Json(payload): Json<OrderSummariesRequest>,
) -> AppResult<Json<ApiResponse<OrderSummaries>>> {
    let resp = reconciliation_service::order_summaries(&state, &user, payload).await?;
    Ok(Json(resp))
}
