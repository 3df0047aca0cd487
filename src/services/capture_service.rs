//! Follow-up steps that settle a pending ledger entry.

use chrono::Utc;
use rust_decimal::Decimal;
use sea_orm::ActiveValue::NotSet;
use sea_orm::sea_query::LockType;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, Condition, EntityTrait, QueryFilter, QueryOrder, QuerySelect,
    Set, TransactionTrait,
};
use serde_json::json;
use tracing::{info, warn};
use uuid::Uuid;

use crate::{
    audit::{self, AuditEvent},
    dto::payments::{CashConfirmRequest, PayPalCaptureRequest},
    entity::{
        orders::{Column as OrderCol, Entity as Orders},
        payment_transactions::{
            ActiveModel as TxActive, Column as TxCol, Entity as PaymentTransactions,
        },
    },
    error::{AppError, AppResult},
    gateways::{CASH, PAYPAL, cash::CashGateway},
    middleware::auth::AuthUser,
    models::{PaymentTransaction, ledger_status},
    response::{ApiResponse, Meta},
    services::{order_service, payment_config_service},
    state::AppState,
};

/// Captures an approved PayPal order and settles its ledger entry.
pub async fn capture_paypal(
    state: &AppState,
    user: &AuthUser,
    payload: PayPalCaptureRequest,
) -> AppResult<ApiResponse<PaymentTransaction>> {
    let provider_payment_id = payload.provider_payment_id.trim();
    if provider_payment_id.is_empty() {
        return Err(AppError::BadRequest("providerPaymentId is required".into()));
    }

    let entry = PaymentTransactions::find()
        .filter(
            Condition::all()
                .add(TxCol::ProviderCode.eq(PAYPAL))
                .add(TxCol::ProviderPaymentId.eq(provider_payment_id))
                .add(TxCol::TenantId.eq(user.tenant_id)),
        )
        .order_by_desc(TxCol::CreatedAt)
        .one(&state.orm)
        .await?
        .ok_or(AppError::NotFound)?;

    if entry.status == ledger_status::PAID {
        return Ok(ApiResponse::success(
            "Payment already captured",
            PaymentTransaction::from(entry),
            Some(Meta::empty()),
        ));
    }

    let gateway = state.gateways.resolve(PAYPAL)?;
    let config = payment_config_service::load_enabled(&state.orm, entry.tenant_id, PAYPAL).await?;

    let outcome = match gateway.capture_payment(provider_payment_id, &config).await {
        Ok(outcome) => outcome,
        Err(err) => {
            warn!(transaction_id = %entry.id, error = %err, "paypal capture failed");
            let mut active: TxActive = entry.into();
            active.raw_payload = Set(Some(json!({ "capture_error": err.to_string() })));
            active.updated_at = Set(Utc::now().into());
            if let Err(db_err) = active.update(&state.orm).await {
                warn!(error = %db_err, "could not record capture error");
            }
            return Err(err.into());
        }
    };

    let status = if outcome.succeeded {
        ledger_status::PAID
    } else {
        ledger_status::FAILED
    };
    let mut active: TxActive = entry.into();
    active.status = Set(status.to_string());
    active.raw_payload = Set(Some(outcome.raw));
    active.updated_at = Set(Utc::now().into());
    let entry = active.update(&state.orm).await?;

    info!(
        transaction_id = %entry.id,
        order_id = %entry.order_id,
        http_status = outcome.http_status,
        status,
        "paypal payment settled"
    );
    audit::record(
        &state.pool,
        user,
        AuditEvent::PaymentCaptured,
        json!({ "transaction_id": entry.id, "order_id": entry.order_id, "status": status }),
    )
    .await;

    let message = if outcome.succeeded {
        "Payment captured"
    } else {
        "Payment capture failed"
    };
    Ok(ApiResponse::success(
        message,
        PaymentTransaction::from(entry),
        Some(Meta::empty()),
    ))
}

/// The business confirms cash was collected for an order.
pub async fn confirm_cash(
    state: &AppState,
    user: &AuthUser,
    payload: CashConfirmRequest,
) -> AppResult<ApiResponse<PaymentTransaction>> {
    let business_id = user.business_id()?;

    let txn = state.orm.begin().await?;

    let order = Orders::find_by_id(payload.order_id)
        .filter(OrderCol::TenantId.eq(user.tenant_id))
        .one(&txn)
        .await?
        .ok_or(AppError::NotFound)?;
    if !order_service::business_owns_order(&txn, order.id, business_id).await? {
        return Err(AppError::NotFound);
    }

    let latest = PaymentTransactions::find()
        .filter(
            Condition::all()
                .add(TxCol::OrderId.eq(order.id))
                .add(TxCol::ProviderCode.eq(CASH)),
        )
        .order_by_desc(TxCol::CreatedAt)
        .lock(LockType::Update)
        .one(&txn)
        .await?;

    let now = Utc::now();
    let entry = match latest {
        Some(entry) => {
            let amount = if entry.amount == Decimal::ZERO {
                order.total_price
            } else {
                entry.amount
            };
            let mut active: TxActive = entry.into();
            active.amount = Set(amount);
            active.status = Set(ledger_status::PAID.to_string());
            active.updated_at = Set(now.into());
            active.update(&txn).await?
        }
        None => {
            TxActive {
                id: Set(Uuid::new_v4()),
                tenant_id: Set(order.tenant_id),
                order_id: Set(order.id),
                provider_code: Set(CASH.to_string()),
                provider_payment_id: Set(Some(CashGateway::reference_for(order.id))),
                amount: Set(order.total_price),
                currency: Set(order.currency.clone()),
                status: Set(ledger_status::PAID.to_string()),
                raw_payload: Set(Some(json!({ "confirmed_by": user.user_id }))),
                created_at: NotSet,
                updated_at: NotSet,
            }
            .insert(&txn)
            .await?
        }
    };

    txn.commit().await?;

    info!(transaction_id = %entry.id, order_id = %order.id, amount = %entry.amount, "cash confirmed");
    audit::record(
        &state.pool,
        user,
        AuditEvent::CashConfirmed,
        json!({ "transaction_id": entry.id, "order_id": order.id, "amount": entry.amount }),
    )
    .await;

    Ok(ApiResponse::success(
        "Cash payment confirmed",
        PaymentTransaction::from(entry),
        Some(Meta::empty()),
    ))
}
