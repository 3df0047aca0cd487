use axum::{
    Json, Router,
    extract::{Path, State},
    routing::{get, put},
};
use uuid::Uuid;

use crate::{
    dto::payment_configs::{
        PaymentConfigList, PaymentConfigView, PublicPaymentConfig, UpsertPaymentConfigRequest,
    },
    error::AppResult,
    middleware::auth::AuthUser,
    response::ApiResponse,
    services::payment_config_service,
    state::AppState,
};

/// Tenant admin routes, nested under `/admin`.
pub fn admin_router() -> Router<AppState> {
    Router::new()
        .route("/payment-configs", get(list_configs))
        .route("/payment-configs/{code}", put(upsert_config))
}

/// Unauthenticated checkout settings, nested under `/tenants`.
pub fn public_router() -> Router<AppState> {
    Router::new().route(
        "/{tenant_id}/payment-configs/{code}/public",
        get(public_config),
    )
}

#[utoipa::path(
    get,
    path = "/api/admin/payment-configs",
    responses(
        (status = 200, description = "Provider settings of the tenant, secrets omitted", body = ApiResponse<PaymentConfigList>),
        (status = 403, description = "Forbidden"),
    ),
    security(("bearer_auth" = [])),
    tag = "Payment configs"
)]
pub async fn list_configs(
    State(state): State<AppState>,
    user: AuthUser,
) -> AppResult<Json<ApiResponse<PaymentConfigList>>> {
    let resp = payment_config_service::list_configs(&state, &user).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    put,
    path = "/api/admin/payment-configs/{code}",
    params(("code" = String, Path, description = "Provider code, e.g. STRIPE")),
    request_body = UpsertPaymentConfigRequest,
    responses(
        (status = 200, description = "Settings validated and saved", body = ApiResponse<PaymentConfigView>),
        (status = 400, description = "Unknown provider or invalid settings"),
        (status = 403, description = "Forbidden"),
    ),
    security(("bearer_auth" = [])),
    tag = "Payment configs"
)]
pub async fn upsert_config(
    State(state): State<AppState>,
    user: AuthUser,
    Path(code): Path<String>,
    Json(payload): Json<UpsertPaymentConfigRequest>,
) -> AppResult<Json<ApiResponse<PaymentConfigView>>> {
    let resp = payment_config_service::upsert_config(&state, &user, &code, payload).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    get,
    path = "/api/tenants/{tenant_id}/payment-configs/{code}/public",
    params(
        ("tenant_id" = Uuid, Path, description = "Tenant ID"),
        ("code" = String, Path, description = "Provider code")
    ),
    responses(
        (status = 200, description = "Client-safe settings of an enabled provider", body = ApiResponse<PublicPaymentConfig>),
        (status = 400, description = "Unknown provider"),
        (status = 404, description = "Provider not enabled for this tenant"),
    ),
    tag = "Payment configs"
)]
pub async fn public_config(
    State(state): State<AppState>,
    Path((tenant_id, code)): Path<(Uuid, String)>,
) -> AppResult<Json<ApiResponse<PublicPaymentConfig>>> {
    let resp = payment_config_service::public_config(&state, tenant_id, &code).await?;
    Ok(Json(resp))
}
