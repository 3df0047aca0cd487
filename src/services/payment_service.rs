//! Payment orchestration.
//!
//! `start_payment` runs as a small saga: the ledger attempt is committed
//! first, the provider is called outside any database transaction, and the
//! entry is then finalized or marked FAILED. Every attempt leaves a row.

use chrono::Utc;
use rust_decimal::Decimal;
use sea_orm::ActiveValue::NotSet;
use sea_orm::{ActiveModelTrait, ColumnTrait, Condition, EntityTrait, QueryFilter, Set};
use serde_json::json;
use tracing::{info, warn};
use uuid::Uuid;

use crate::{
    audit::{self, AuditEvent},
    dto::payments::{StartPaymentRequest, StartPaymentResponse},
    entity::{
        orders::{Column as OrderCol, Entity as Orders},
        payment_transactions::{ActiveModel as TxActive, Model as TxModel},
    },
    error::{AppError, AppResult},
    gateways::{CreatePaymentCommand, GatewayError, GatewayPayment, ProviderConfig},
    middleware::auth::AuthUser,
    models::ledger_status,
    response::{ApiResponse, Meta},
    services::payment_config_service,
    state::AppState,
};

/// Largest amount the ledger's `NUMERIC(12, 2)` column holds.
const MAX_AMOUNT: Decimal = Decimal::from_parts(0xD4A5_0FFF, 0xE8, 0, false, 2); // 9_999_999_999.99

pub fn validate_request(payload: &StartPaymentRequest, user: &AuthUser) -> AppResult<()> {
    if payload.tenant_id != user.tenant_id {
        return Err(AppError::NotFound);
    }
    if payload.amount <= Decimal::ZERO {
        return Err(AppError::BadRequest("amount must be positive".into()));
    }
    if payload.amount.normalize().scale() > 2 {
        return Err(AppError::BadRequest(
            "amount must have at most two decimal places".into(),
        ));
    }
    if payload.amount > MAX_AMOUNT {
        return Err(AppError::BadRequest(format!(
            "amount must not exceed {MAX_AMOUNT}"
        )));
    }
    let currency = payload.currency.trim();
    if currency.len() != 3 || !currency.chars().all(|c| c.is_ascii_alphabetic()) {
        return Err(AppError::BadRequest(
            "currency must be a three-letter code".into(),
        ));
    }
    Ok(())
}

/// Key handed to the client alongside a Stripe payment. Other providers have
/// none.
pub fn publishable_key(config: &ProviderConfig) -> AppResult<Option<String>> {
    match config {
        ProviderConfig::Stripe(stripe) => Ok(stripe.publishable_key()?.map(str::to_string)),
        _ => Ok(None),
    }
}

pub async fn start_payment(
    state: &AppState,
    user: &AuthUser,
    payload: StartPaymentRequest,
) -> AppResult<ApiResponse<StartPaymentResponse>> {
    validate_request(&payload, user)?;

    let gateway = state.gateways.resolve(&payload.payment_method)?;
    let provider_code = gateway.code();
    let config =
        payment_config_service::load_enabled(&state.orm, payload.tenant_id, provider_code).await?;
    let publishable_key = publishable_key(&config)?;

    let order = Orders::find()
        .filter(
            Condition::all()
                .add(OrderCol::Id.eq(payload.order_id))
                .add(OrderCol::TenantId.eq(payload.tenant_id))
                .add(OrderCol::UserId.eq(user.user_id)),
        )
        .one(&state.orm)
        .await?
        .ok_or(AppError::NotFound)?;

    let currency = payload.currency.trim().to_uppercase();
    if currency != order.currency {
        return Err(AppError::BadRequest(format!(
            "currency {currency} does not match the order currency {}",
            order.currency
        )));
    }
    let entry = TxActive {
        id: Set(Uuid::new_v4()),
        tenant_id: Set(payload.tenant_id),
        order_id: Set(payload.order_id),
        provider_code: Set(provider_code.to_string()),
        provider_payment_id: Set(None),
        amount: Set(payload.amount),
        currency: Set(currency.clone()),
        status: Set(ledger_status::CREATED.to_string()),
        raw_payload: Set(None),
        created_at: NotSet,
        updated_at: NotSet,
    }
    .insert(&state.orm)
    .await?;

    let command = CreatePaymentCommand {
        tenant_id: payload.tenant_id,
        order_id: payload.order_id,
        amount: payload.amount,
        currency,
        destination_account_id: payload.destination_account_id.clone(),
        description: Some(format!("Order {}", payload.order_id)),
    };

    let payment = match gateway.create_payment(&command, &config).await {
        Ok(payment) => payment,
        Err(err) => {
            mark_failed(state, entry, &err).await;
            return Err(err.into());
        }
    };

    let entry = record_success(state, entry, &payment).await?;

    info!(
        transaction_id = %entry.id,
        order_id = %entry.order_id,
        provider = provider_code,
        status = %entry.status,
        "payment started"
    );
    audit::record(
        &state.pool,
        user,
        AuditEvent::PaymentStarted,
        json!({
            "transaction_id": entry.id,
            "order_id": entry.order_id,
            "provider_code": provider_code,
            "amount": entry.amount,
        }),
    )
    .await;

    Ok(ApiResponse::success(
        "Payment started",
        StartPaymentResponse {
            transaction_id: entry.id,
            provider_code: provider_code.to_string(),
            provider_payment_id: payment.provider_payment_id,
            client_secret: payment.client_secret,
            redirect_url: payment.redirect_url,
            status: entry.status,
            publishable_key,
        },
        Some(Meta::empty()),
    ))
}

async fn record_success(
    state: &AppState,
    entry: TxModel,
    payment: &GatewayPayment,
) -> AppResult<TxModel> {
    let mut active: TxActive = entry.into();
    active.provider_payment_id = Set(Some(payment.provider_payment_id.clone()));
    active.status = Set(payment.status.clone());
    active.raw_payload = Set(Some(payment.raw.clone()));
    active.updated_at = Set(Utc::now().into());
    Ok(active.update(&state.orm).await?)
}

/// Compensating step. A failure to write it is logged; the provider error is
/// what the caller gets back.
async fn mark_failed(state: &AppState, entry: TxModel, err: &GatewayError) {
    let transaction_id = entry.id;
    warn!(%transaction_id, provider = %entry.provider_code, error = %err, "payment provider call failed");

    let mut active: TxActive = entry.into();
    active.status = Set(ledger_status::FAILED.to_string());
    active.raw_payload = Set(Some(json!({ "error": err.to_string() })));
    active.updated_at = Set(Utc::now().into());
    if let Err(db_err) = active.update(&state.orm).await {
        warn!(%transaction_id, error = %db_err, "could not mark payment attempt as failed");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::gateways::config::{CashConfig, StripeConfig};
    use rust_decimal_macros::dec;

    fn user(tenant_id: Uuid) -> AuthUser {
        AuthUser {
            user_id: Uuid::new_v4(),
            role: "customer".into(),
            tenant_id,
            business_id: None,
        }
    }

    fn request(tenant_id: Uuid, amount: Decimal, currency: &str) -> StartPaymentRequest {
        StartPaymentRequest {
            tenant_id,
            order_id: Uuid::new_v4(),
            payment_method: "cash".into(),
            amount,
            currency: currency.into(),
            destination_account_id: None,
        }
    }

    #[test]
    fn rejects_non_positive_amount_and_bad_currency() {
        let tenant = Uuid::new_v4();
        assert!(validate_request(&request(tenant, dec!(20.00), "usd"), &user(tenant)).is_ok());
        assert!(matches!(
            validate_request(&request(tenant, Decimal::ZERO, "USD"), &user(tenant)),
            Err(AppError::BadRequest(_))
        ));
        assert!(matches!(
            validate_request(&request(tenant, dec!(1), "US"), &user(tenant)),
            Err(AppError::BadRequest(_))
        ));
    }

    #[test]
    fn rejects_sub_cent_and_oversized_amounts() {
        let tenant = Uuid::new_v4();
        assert!(matches!(
            validate_request(&request(tenant, dec!(0.125), "USD"), &user(tenant)),
            Err(AppError::BadRequest(_))
        ));
        // Trailing zeros are not extra precision.
        assert!(validate_request(&request(tenant, dec!(10.5000), "USD"), &user(tenant)).is_ok());

        assert_eq!(MAX_AMOUNT, dec!(9999999999.99));
        assert!(validate_request(&request(tenant, dec!(9999999999.99), "USD"), &user(tenant)).is_ok());
        assert!(matches!(
            validate_request(&request(tenant, dec!(10000000000.00), "USD"), &user(tenant)),
            Err(AppError::BadRequest(_))
        ));
    }

    #[test]
    fn other_tenant_is_not_found() {
        let result = validate_request(
            &request(Uuid::new_v4(), dec!(5), "USD"),
            &user(Uuid::new_v4()),
        );
        assert!(matches!(result, Err(AppError::NotFound)));
    }

    #[test]
    fn publishable_key_only_for_stripe() {
        let stripe = ProviderConfig::Stripe(StripeConfig {
            secret_key: "sk_test_1".into(),
            publishable_key: Some("pk_test_1".into()),
            webhook_secret: None,
            platform_fee_percent: None,
        });
        assert_eq!(publishable_key(&stripe).unwrap().as_deref(), Some("pk_test_1"));
        assert_eq!(
            publishable_key(&ProviderConfig::Cash(CashConfig::default())).unwrap(),
            None
        );
    }

    #[test]
    fn secret_looking_publishable_key_is_refused() {
        let stripe = ProviderConfig::Stripe(StripeConfig {
            secret_key: "sk_test_1".into(),
            publishable_key: Some("sk_live_leak".into()),
            webhook_secret: None,
            platform_fee_percent: None,
        });
        let err = publishable_key(&stripe).unwrap_err();
        assert_eq!(err.status(), axum::http::StatusCode::BAD_REQUEST);
    }
}
