use axum::{
    Json, Router,
    extract::{Path, Query, State},
    routing::get,
};
use uuid::Uuid;

use crate::{
    dto::orders::{CapacityCheck, CapacityQuery},
    error::AppResult,
    middleware::auth::AuthUser,
    response::ApiResponse,
    services::capacity_service,
    state::AppState,
};

pub fn router() -> Router<AppState> {
    Router::new().route("/{id}/capacity", get(item_capacity))
}

#[utoipa::path(
    get,
    path = "/api/items/{id}/capacity",
    params(
        ("id" = Uuid, Path, description = "Item ID"),
        ("quantity" = i32, Query, description = "Requested quantity")
    ),
    responses(
        (status = 200, description = "Whether the quantity still fits", body = ApiResponse<CapacityCheck>),
        (status = 400, description = "Invalid quantity"),
        (status = 404, description = "Not Found"),
    ),
    security(("bearer_auth" = [])),
    tag = "Items"
)]
pub async fn item_capacity(
    State(state): State<AppState>,
    user: AuthUser,
    Path(id): Path<Uuid>,
    Query(query): Query<CapacityQuery>,
) -> AppResult<Json<ApiResponse<CapacityCheck>>> {
    let resp = capacity_service::item_capacity(&state, &user, id, query.quantity).await?;
    Ok(Json(resp))
}
