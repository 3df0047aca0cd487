use axum::{
    Json, Router,
    extract::{Path, State},
    routing::{delete, post},
};
use uuid::Uuid;

use crate::{
    dto::orders::{DeletedLine, TransitionResult},
    error::AppResult,
    lifecycle::Operation,
    middleware::auth::AuthUser,
    response::ApiResponse,
    services::{booking_service, order_service},
    state::AppState,
};

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/{id}", delete(delete_line))
        .route("/{id}/cancel", post(cancel))
        .route("/{id}/reset", post(reset_to_pending))
        .route("/{id}/request-cancel", post(request_cancel))
        .route("/{id}/refund", post(refund))
}

#[utoipa::path(
    post,
    path = "/api/order-items/{id}/cancel",
    params(("id" = Uuid, Path, description = "Order item ID")),
    responses(
        (status = 200, description = "Order canceled, or already canceled", body = ApiResponse<TransitionResult>),
        (status = 404, description = "Not Found"),
        (status = 409, description = "Order can no longer be canceled"),
    ),
    security(("bearer_auth" = [])),
    tag = "Order items"
)]
pub async fn cancel(
    State(state): State<AppState>,
    user: AuthUser,
    Path(id): Path<Uuid>,
) -> AppResult<Json<ApiResponse<TransitionResult>>> {
    let resp = booking_service::apply(&state, &user, id, Operation::Cancel).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    post,
    path = "/api/order-items/{id}/reset",
    params(("id" = Uuid, Path, description = "Order item ID")),
    responses(
        (status = 200, description = "Order back to pending", body = ApiResponse<TransitionResult>),
        (status = 404, description = "Not Found"),
        (status = 409, description = "Conflict"),
    ),
    security(("bearer_auth" = [])),
    tag = "Order items"
)]
pub async fn reset_to_pending(
    State(state): State<AppState>,
    user: AuthUser,
    Path(id): Path<Uuid>,
) -> AppResult<Json<ApiResponse<TransitionResult>>> {
    let resp = booking_service::apply(&state, &user, id, Operation::ResetToPending).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    post,
    path = "/api/order-items/{id}/request-cancel",
    params(("id" = Uuid, Path, description = "Order item ID")),
    responses(
        (status = 200, description = "Cancellation requested", body = ApiResponse<TransitionResult>),
        (status = 404, description = "Not Found"),
        (status = 409, description = "Conflict"),
    ),
    security(("bearer_auth" = [])),
    tag = "Order items"
)]
pub async fn request_cancel(
    State(state): State<AppState>,
    user: AuthUser,
    Path(id): Path<Uuid>,
) -> AppResult<Json<ApiResponse<TransitionResult>>> {
    let resp = booking_service::apply(&state, &user, id, Operation::RequestCancel).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    post,
    path = "/api/order-items/{id}/refund",
    params(("id" = Uuid, Path, description = "Order item ID")),
    responses(
        (status = 200, description = "Order refunded", body = ApiResponse<TransitionResult>),
        (status = 404, description = "Not Found"),
        (status = 409, description = "Order is not eligible for a refund"),
    ),
    security(("bearer_auth" = [])),
    tag = "Order items"
)]
pub async fn refund(
    State(state): State<AppState>,
    user: AuthUser,
    Path(id): Path<Uuid>,
) -> AppResult<Json<ApiResponse<TransitionResult>>> {
    let resp = booking_service::apply(&state, &user, id, Operation::RefundIfEligible).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    delete,
    path = "/api/order-items/{id}",
    params(("id" = Uuid, Path, description = "Order item ID")),
    responses(
        (status = 200, description = "Line removed; the order too if it was the last line", body = ApiResponse<DeletedLine>),
        (status = 404, description = "Not Found"),
    ),
    security(("bearer_auth" = [])),
    tag = "Order items"
)]
pub async fn delete_line(
    State(state): State<AppState>,
    user: AuthUser,
    Path(id): Path<Uuid>,
) -> AppResult<Json<ApiResponse<DeletedLine>>> {
    let resp = order_service::delete_line(&state, &user, id).await?;
    Ok(Json(resp))
}
