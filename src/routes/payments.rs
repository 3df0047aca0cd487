use axum::{
    Json, Router,
    extract::State,
    routing::{get, post},
};

use crate::{
    dto::payments::{
        CashConfirmRequest, PayPalCaptureRequest, ProviderList, StartPaymentRequest,
        StartPaymentResponse,
    },
    error::AppResult,
    middleware::auth::AuthUser,
    models::PaymentTransaction,
    response::ApiResponse,
    services::{capture_service, payment_config_service, payment_service},
    state::AppState,
};

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/providers", get(list_providers))
        .route("/start", post(start_payment))
        .route("/paypal/capture", post(capture_paypal))
        .route("/cash/confirm", post(confirm_cash))
}

#[utoipa::path(
    get,
    path = "/api/payments/providers",
    responses(
        (status = 200, description = "Registered providers and their settings form", body = ApiResponse<ProviderList>),
    ),
    tag = "Payments"
)]
pub async fn list_providers(State(state): State<AppState>) -> Json<ApiResponse<ProviderList>> {
    Json(payment_config_service::list_providers(&state))
}

#[utoipa::path(
    post,
    path = "/api/payments/start",
    request_body = StartPaymentRequest,
    responses(
        (status = 200, description = "Payment created with the provider", body = ApiResponse<StartPaymentResponse>),
        (status = 400, description = "Unknown, unconfigured or disabled provider"),
        (status = 404, description = "Order not found"),
        (status = 502, description = "Provider call failed; the attempt is kept as FAILED"),
    ),
    security(("bearer_auth" = [])),
    tag = "Payments"
)]
pub async fn start_payment(
    State(state): State<AppState>,
    user: AuthUser,
    Json(payload): Json<StartPaymentRequest>,
) -> AppResult<Json<ApiResponse<StartPaymentResponse>>> {
    let resp = payment_service::start_payment(&state, &user, payload).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    post,
    path = "/api/payments/paypal/capture",
    request_body = PayPalCaptureRequest,
    responses(
        (status = 200, description = "Ledger entry settled as PAID or FAILED", body = ApiResponse<PaymentTransaction>),
        (status = 404, description = "No ledger entry for this PayPal order"),
        (status = 502, description = "PayPal could not be reached"),
    ),
    security(("bearer_auth" = [])),
    tag = "Payments"
)]
pub async fn capture_paypal(
    State(state): State<AppState>,
    user: AuthUser,
    Json(payload): Json<PayPalCaptureRequest>,
) -> AppResult<Json<ApiResponse<PaymentTransaction>>> {
    let resp = capture_service::capture_paypal(&state, &user, payload).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    post,
    path = "/api/payments/cash/confirm",
    request_body = CashConfirmRequest,
    responses(
        (status = 200, description = "Cash collected; ledger entry is PAID", body = ApiResponse<PaymentTransaction>),
        (status = 403, description = "Caller is not a business member"),
        (status = 404, description = "Not Found"),
    ),
    security(("bearer_auth" = [])),
    tag = "Payments"
)]
pub async fn confirm_cash(
    State(state): State<AppState>,
    user: AuthUser,
    Json(payload): Json<CashConfirmRequest>,
) -> AppResult<Json<ApiResponse<PaymentTransaction>>> {
    let resp = capture_service::confirm_cash(&state, &user, payload).await?;
    Ok(Json(resp))
}
