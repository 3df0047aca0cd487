mod common;

use axum::{
    Json, Router,
    extract::Path,
    http::StatusCode,
    routing::post,
};
use booking_payments_api::{
    dto::{
        orders::OrderSummariesRequest,
        payments::{PayPalCaptureRequest, StartPaymentRequest},
    },
    entity::{
        payment_transactions::ActiveModel as TxActive,
        sea_orm_active_enums::{ItemKind, OrderStatus},
    },
    error::AppError,
    gateways::GatewayError,
    lifecycle::Operation,
    routes::params::{OrderListQuery, Pagination},
    services::{
        booking_service, capture_service, payment_config_service, payment_service,
        reconciliation_service::{self, PaymentState},
    },
    state::AppState,
};
use common::{Tenant, database_url, ledger, setup_state, spawn_fake_provider};
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use sea_orm::{ActiveModelTrait, ActiveValue::NotSet, Set};
use serde_json::{Value, json};
use uuid::Uuid;

fn fake_paypal() -> Router {
    Router::new()
        .route(
            "/v1/oauth2/token",
            post(|| async { Json(json!({ "access_token": "token-1", "token_type": "Bearer" })) }),
        )
        .route(
            "/v2/checkout/orders",
            post(|| async {
                Json(json!({
                    "id": "PAYPAL-ORDER-1",
                    "status": "CREATED",
                    "links": [
                        { "rel": "approve", "href": "https://paypal.test/checkoutnow?token=PAYPAL-ORDER-1" }
                    ]
                }))
            }),
        )
        .route(
            "/v2/checkout/orders/{id}/capture",
            post(|Path(id): Path<String>| async move {
                (StatusCode::CREATED, Json(json!({ "id": id, "status": "COMPLETED" })))
            }),
        )
}

fn paypal_settings() -> Value {
    json!({
        "client_id": "client",
        "client_secret": "secret",
        "return_url": "https://shop.test/paypal/return",
        "cancel_url": "https://shop.test/paypal/cancel"
    })
}

#[tokio::test]
async fn paypal_start_then_capture_marks_entry_paid() -> anyhow::Result<()> {
    let Some(url) = database_url() else {
        return Ok(());
    };
    let paypal_base = spawn_fake_provider(fake_paypal()).await?;
    let state = setup_state(&url, None, Some(paypal_base)).await?;
    let tenant = Tenant::new();

    let item_id = tenant
        .item(&state, ItemKind::Service, dec!(30.00), None)
        .await?;
    let created = tenant.order(&state, item_id, 1).await?;
    tenant
        .enable_provider(&state, "PAYPAL", paypal_settings())
        .await?;

    let started = payment_service::start_payment(
        &state,
        &tenant.customer,
        StartPaymentRequest {
            tenant_id: tenant.tenant_id,
            order_id: created.order.id,
            payment_method: "paypal".into(),
            amount: dec!(30.00),
            currency: "usd".into(),
            destination_account_id: None,
        },
    )
    .await?
    .data
    .expect("start data");
    assert_eq!(started.provider_payment_id, "PAYPAL-ORDER-1");
    assert_eq!(
        started.redirect_url.as_deref(),
        Some("https://paypal.test/checkoutnow?token=PAYPAL-ORDER-1")
    );

    let captured = capture_service::capture_paypal(
        &state,
        &tenant.customer,
        PayPalCaptureRequest {
            provider_payment_id: "PAYPAL-ORDER-1".into(),
        },
    )
    .await?
    .data
    .expect("capture data");
    assert_eq!(captured.status, "PAID");
    assert_eq!(captured.amount, dec!(30.00));

    let entries = ledger(&state, created.order.id).await?;
    assert_eq!(entries.len(), 1);
    assert_eq!(entries[0].currency, "USD");

    Ok(())
}

#[tokio::test]
async fn failed_provider_call_keeps_attempt_as_failed() -> anyhow::Result<()> {
    let Some(url) = database_url() else {
        return Ok(());
    };
    let stripe = Router::new().route(
        "/v1/payment_intents",
        post(|| async {
            (
                StatusCode::PAYMENT_REQUIRED,
                Json(json!({ "error": { "message": "card declined" } })),
            )
        }),
    );
    let stripe_base = spawn_fake_provider(stripe).await?;
    let state = setup_state(&url, Some(stripe_base), None).await?;
    let tenant = Tenant::new();

    let item_id = tenant
        .item(&state, ItemKind::Product, dec!(49.99), None)
        .await?;
    let created = tenant.order(&state, item_id, 1).await?;
    tenant
        .enable_provider(
            &state,
            "STRIPE",
            json!({ "secret_key": "sk_test_1", "publishable_key": "pk_test_1" }),
        )
        .await?;

    let request = || StartPaymentRequest {
        tenant_id: tenant.tenant_id,
        order_id: created.order.id,
        payment_method: "STRIPE".into(),
        amount: dec!(49.99),
        currency: "USD".into(),
        destination_account_id: None,
    };

    for _ in 0..2 {
        let err = payment_service::start_payment(&state, &tenant.customer, request())
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            AppError::Gateway(GatewayError::Api { status: 402, .. })
        ));
    }

    // Each attempt leaves its own row.
    let entries = ledger(&state, created.order.id).await?;
    assert_eq!(entries.len(), 2);
    for entry in &entries {
        assert_eq!(entry.status, "FAILED");
        assert!(entry.provider_payment_id.is_none());
        let raw = entry.raw_payload.clone().expect("raw payload");
        assert!(raw["error"].as_str().unwrap_or_default().contains("402"));
    }

    Ok(())
}

#[tokio::test]
async fn disabled_provider_is_refused_and_public_config_hides_secrets() -> anyhow::Result<()> {
    let Some(url) = database_url() else {
        return Ok(());
    };
    let state = setup_state(&url, None, None).await?;
    let tenant = Tenant::new();

    let item_id = tenant
        .item(&state, ItemKind::Product, dec!(10.00), None)
        .await?;
    let created = tenant.order(&state, item_id, 1).await?;

    tenant
        .enable_provider(
            &state,
            "stripe",
            json!({ "secret_key": "sk_test_hidden", "publishable_key": "pk_test_shown" }),
        )
        .await?;
    let public = payment_config_service::public_config(&state, tenant.tenant_id, "STRIPE")
        .await?
        .data
        .expect("public data");
    assert_eq!(public.config, json!({ "publishable_key": "pk_test_shown" }));
    assert!(!public.config.to_string().contains("sk_test_hidden"));

    // Cash was never configured for this tenant.
    let err = payment_service::start_payment(
        &state,
        &tenant.customer,
        StartPaymentRequest {
            tenant_id: tenant.tenant_id,
            order_id: created.order.id,
            payment_method: "CASH".into(),
            amount: dec!(10.00),
            currency: "USD".into(),
            destination_account_id: None,
        },
    )
    .await
    .unwrap_err();
    assert!(matches!(err, AppError::BadRequest(_)));
    assert!(ledger(&state, created.order.id).await?.is_empty());

    Ok(())
}

async fn ledger_entry(
    state: &AppState,
    tenant: &Tenant,
    order_id: Uuid,
    amount: Decimal,
    status: &str,
) -> anyhow::Result<()> {
    TxActive {
        id: Set(Uuid::new_v4()),
        tenant_id: Set(tenant.tenant_id),
        order_id: Set(order_id),
        provider_code: Set("CASH".into()),
        provider_payment_id: Set(Some(format!("CASH_ORDER_{order_id}"))),
        amount: Set(amount),
        currency: Set("USD".into()),
        status: Set(status.into()),
        raw_payload: Set(None),
        created_at: NotSet,
        updated_at: NotSet,
    }
    .insert(&state.orm)
    .await?;
    Ok(())
}

#[tokio::test]
async fn batched_summaries_count_only_paid_entries() -> anyhow::Result<()> {
    let Some(url) = database_url() else {
        return Ok(());
    };
    let state = setup_state(&url, None, None).await?;
    let tenant = Tenant::new();
    let stranger = Tenant::new();

    let item_id = tenant
        .item(&state, ItemKind::Product, dec!(10.00), None)
        .await?;
    let partial = tenant.order(&state, item_id, 2).await?;
    let settled = tenant.order(&state, item_id, 3).await?;
    booking_service::apply(&state, &tenant.owner, partial.items[0].id, Operation::MarkPaid)
        .await?;

    for (amount, status) in [
        (dec!(5.00), "PAID"),
        (dec!(100.00), "FAILED"),
        (dec!(20.00), "OFFLINE_PENDING"),
        (dec!(5.00), "PAID"),
    ] {
        ledger_entry(&state, &tenant, partial.order.id, amount, status).await?;
    }
    ledger_entry(&state, &tenant, settled.order.id, dec!(30.00), "PAID").await?;
    ledger_entry(&state, &tenant, settled.order.id, dec!(30.00), "FAILED").await?;

    // Output follows the input order.
    let summaries = reconciliation_service::summaries_for_orders(
        &state.orm,
        &[
            (settled.order.id, settled.order.total_price),
            (partial.order.id, partial.order.total_price),
        ],
    )
    .await?;
    let ids: Vec<_> = summaries.iter().map(|s| s.order_id).collect();
    assert_eq!(ids, vec![settled.order.id, partial.order.id]);

    assert_eq!(summaries[0].paid, dec!(30.00));
    assert_eq!(summaries[0].remaining, dec!(0.00));
    assert_eq!(summaries[0].state, PaymentState::Paid);

    // COMPLETED status does not make the order paid.
    assert_eq!(summaries[1].total, dec!(20.00));
    assert_eq!(summaries[1].paid, dec!(10.00));
    assert_eq!(summaries[1].remaining, dec!(10.00));
    assert_eq!(summaries[1].state, PaymentState::PartiallyPaid);

    // Customer view: newest first, foreign and unknown ids skipped.
    let foreign_item = stranger
        .item(&state, ItemKind::Product, dec!(1.00), None)
        .await?;
    let foreign = stranger.order(&state, foreign_item, 1).await?;
    let mine = reconciliation_service::order_summaries(
        &state,
        &tenant.customer,
        OrderSummariesRequest {
            order_ids: vec![
                partial.order.id,
                foreign.order.id,
                Uuid::new_v4(),
                settled.order.id,
            ],
        },
    )
    .await?;
    assert_eq!(mine.meta.as_ref().and_then(|m| m.total), Some(2));
    let items = mine.data.expect("summaries").items;
    let ids: Vec<_> = items.iter().map(|s| s.order_id).collect();
    assert_eq!(ids, vec![settled.order.id, partial.order.id]);

    // Business view carries status and ledger state side by side.
    let owned = reconciliation_service::list_business_orders(
        &state,
        &tenant.owner,
        OrderListQuery {
            pagination: Pagination {
                page: None,
                per_page: None,
            },
            status: None,
            sort_order: None,
        },
    )
    .await?
    .data
    .expect("business orders")
    .items;
    assert_eq!(owned.len(), 2);
    let completed = owned
        .iter()
        .find(|o| o.order.id == partial.order.id)
        .expect("completed order listed");
    assert_eq!(completed.order.status, OrderStatus::Completed);
    assert_eq!(completed.payment.paid, dec!(10.00));
    assert_eq!(completed.payment.state, PaymentState::PartiallyPaid);

    Ok(())
}

#[tokio::test]
async fn payment_currency_must_match_order() -> anyhow::Result<()> {
    let Some(url) = database_url() else {
        return Ok(());
    };
    let state = setup_state(&url, None, None).await?;
    let tenant = Tenant::new();

    let item_id = tenant
        .item(&state, ItemKind::Product, dec!(10.00), None)
        .await?;
    let created = tenant.order(&state, item_id, 1).await?;
    tenant.enable_provider(&state, "CASH", json!({})).await?;

    let err = payment_service::start_payment(
        &state,
        &tenant.customer,
        StartPaymentRequest {
            tenant_id: tenant.tenant_id,
            order_id: created.order.id,
            payment_method: "CASH".into(),
            amount: dec!(10.00),
            currency: "eur".into(),
            destination_account_id: None,
        },
    )
    .await
    .unwrap_err();
    assert!(matches!(err, AppError::BadRequest(_)));
    assert!(ledger(&state, created.order.id).await?.is_empty());

    Ok(())
}
