#![allow(dead_code)]

use std::time::Duration;

use booking_payments_api::{
    config::AppConfig,
    db::{create_orm_conn, run_migrations},
    dto::{
        orders::{CreateOrderLine, CreateOrderRequest, OrderWithItems},
        payment_configs::UpsertPaymentConfigRequest,
    },
    entity::{
        items::ActiveModel as ItemActive,
        payment_transactions::{Column as TxCol, Entity as PaymentTransactions, Model as TxModel},
        sea_orm_active_enums::ItemKind,
    },
    gateways::GatewayRegistry,
    middleware::auth::AuthUser,
    services::{order_service, payment_config_service},
    state::AppState,
};
use rust_decimal::Decimal;
use sea_orm::ActiveValue::NotSet;
use sea_orm::{ActiveModelTrait, ColumnTrait, EntityTrait, QueryFilter, QueryOrder, Set};
use serde_json::Value;
use uuid::Uuid;

/// Skips the calling test when no database is configured.
pub fn database_url() -> Option<String> {
    match std::env::var("TEST_DATABASE_URL").or_else(|_| std::env::var("DATABASE_URL")) {
        Ok(url) => Some(url),
        Err(_) => {
            eprintln!(
                "Skipping test: set TEST_DATABASE_URL or DATABASE_URL to run integration flow tests."
            );
            None
        }
    }
}

pub async fn setup_state(
    database_url: &str,
    stripe_api_base: Option<String>,
    paypal_api_base: Option<String>,
) -> anyhow::Result<AppState> {
    let orm = create_orm_conn(database_url).await?;
    run_migrations(&orm).await?;

    let config = AppConfig {
        database_url: database_url.to_string(),
        host: "127.0.0.1".into(),
        port: 0,
        payment_http_timeout: Duration::from_secs(5),
        stripe_api_base,
        paypal_api_base,
        max_body_bytes: 1024 * 1024,
        concurrency_limit: 16,
    };
    let gateways = GatewayRegistry::with_defaults(config.http_client()?, &config);
    Ok(AppState::new(orm, gateways))
}

/// A fresh tenant with one business, a customer and a business admin, so
/// tests never see each other's rows.
pub struct Tenant {
    pub tenant_id: Uuid,
    pub business_id: Uuid,
    pub customer: AuthUser,
    pub owner: AuthUser,
}

impl Tenant {
    pub fn new() -> Self {
        let tenant_id = Uuid::new_v4();
        let business_id = Uuid::new_v4();
        Self {
            tenant_id,
            business_id,
            customer: AuthUser {
                user_id: Uuid::new_v4(),
                role: "customer".into(),
                tenant_id,
                business_id: None,
            },
            owner: AuthUser {
                user_id: Uuid::new_v4(),
                role: "admin".into(),
                tenant_id,
                business_id: Some(business_id),
            },
        }
    }

    pub async fn item(
        &self,
        state: &AppState,
        kind: ItemKind,
        price: Decimal,
        capacity: Option<i32>,
    ) -> anyhow::Result<Uuid> {
        let item = ItemActive {
            id: Set(Uuid::new_v4()),
            tenant_id: Set(self.tenant_id),
            business_id: Set(self.business_id),
            name: Set("Test booking".into()),
            kind: Set(kind),
            price: Set(price),
            currency: Set("USD".into()),
            capacity: Set(capacity),
            created_at: NotSet,
        }
        .insert(&state.orm)
        .await?;
        Ok(item.id)
    }

    pub async fn order(
        &self,
        state: &AppState,
        item_id: Uuid,
        quantity: i32,
    ) -> anyhow::Result<OrderWithItems> {
        let resp = order_service::create_order(
            state,
            &self.customer,
            CreateOrderRequest {
                lines: vec![CreateOrderLine { item_id, quantity }],
            },
        )
        .await?;
        Ok(resp.data.expect("order data"))
    }

    pub async fn enable_provider(
        &self,
        state: &AppState,
        code: &str,
        config: Value,
    ) -> anyhow::Result<()> {
        payment_config_service::upsert_config(
            state,
            &self.owner,
            code,
            UpsertPaymentConfigRequest {
                enabled: true,
                config,
            },
        )
        .await?;
        Ok(())
    }
}

pub async fn ledger(state: &AppState, order_id: Uuid) -> anyhow::Result<Vec<TxModel>> {
    Ok(PaymentTransactions::find()
        .filter(TxCol::OrderId.eq(order_id))
        .order_by_asc(TxCol::CreatedAt)
        .all(&state.orm)
        .await?)
}

pub async fn spawn_fake_provider(app: axum::Router) -> anyhow::Result<String> {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await?;
    let addr = listener.local_addr()?;
    tokio::spawn(async move {
        let _ = axum::serve(listener, app).await;
    });
    Ok(format!("http://{addr}"))
}
