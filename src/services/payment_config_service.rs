//! Tenant-scoped provider settings.
//!
//! Documents are validated into a [`ProviderConfig`] on every write and every
//! read, so a row that no longer parses is refused instead of reaching an
//! adapter. Nothing served from here carries a secret.

use chrono::Utc;
use sea_orm::sea_query::OnConflict;
use sea_orm::{
    ColumnTrait, Condition, ConnectionTrait, EntityTrait, QueryFilter, QueryOrder, Set,
};
use serde_json::json;
use tracing::info;
use uuid::Uuid;

use crate::{
    audit::{self, AuditEvent},
    dto::payment_configs::{
        PaymentConfigList, PaymentConfigView, PublicPaymentConfig, UpsertPaymentConfigRequest,
    },
    dto::payments::{ProviderInfo, ProviderList},
    entity::tenant_payment_configs::{
        ActiveModel as ConfigActive, Column as ConfigCol, Entity as TenantPaymentConfigs,
        Model as ConfigModel,
    },
    error::{AppError, AppResult},
    gateways::{PaymentGateway, ProviderConfig},
    middleware::auth::{AuthUser, ensure_admin},
    response::{ApiResponse, Meta},
    state::AppState,
};

/// A stored row together with its parsed settings.
#[derive(Debug, Clone)]
pub struct LoadedConfig {
    pub enabled: bool,
    pub config: ProviderConfig,
    pub row: ConfigModel,
}

pub async fn load_config<C: ConnectionTrait>(
    db: &C,
    tenant_id: Uuid,
    provider_code: &str,
) -> AppResult<Option<LoadedConfig>> {
    let Some(row) = TenantPaymentConfigs::find()
        .filter(
            Condition::all()
                .add(ConfigCol::TenantId.eq(tenant_id))
                .add(ConfigCol::ProviderCode.eq(provider_code)),
        )
        .one(db)
        .await?
    else {
        return Ok(None);
    };

    let config = ProviderConfig::parse(provider_code, &row.config)?;
    Ok(Some(LoadedConfig {
        enabled: row.enabled,
        config,
        row,
    }))
}

/// Settings the orchestrator may use: present and switched on.
pub async fn load_enabled<C: ConnectionTrait>(
    db: &C,
    tenant_id: Uuid,
    provider_code: &str,
) -> AppResult<ProviderConfig> {
    match load_config(db, tenant_id, provider_code).await? {
        Some(loaded) if loaded.enabled => Ok(loaded.config),
        Some(_) => Err(AppError::BadRequest(format!(
            "{provider_code} is disabled for this tenant"
        ))),
        None => Err(AppError::BadRequest(format!(
            "{provider_code} is not configured for this tenant"
        ))),
    }
}

pub async fn upsert_config(
    state: &AppState,
    user: &AuthUser,
    code: &str,
    payload: UpsertPaymentConfigRequest,
) -> AppResult<ApiResponse<PaymentConfigView>> {
    ensure_admin(user)?;
    let gateway = state.gateways.resolve(code)?;
    let provider_code = gateway.code();
    let parsed = ProviderConfig::parse(provider_code, &payload.config)?;

    let now = Utc::now();
    let row = ConfigActive {
        id: Set(Uuid::new_v4()),
        tenant_id: Set(user.tenant_id),
        provider_code: Set(provider_code.to_string()),
        enabled: Set(payload.enabled),
        config: Set(payload.config),
        created_at: Set(now.into()),
        updated_at: Set(now.into()),
    };

    let saved = TenantPaymentConfigs::insert(row)
        .on_conflict(
            OnConflict::columns([ConfigCol::TenantId, ConfigCol::ProviderCode])
                .update_columns([ConfigCol::Enabled, ConfigCol::Config, ConfigCol::UpdatedAt])
                .to_owned(),
        )
        .exec_with_returning(&state.orm)
        .await?;

    info!(
        tenant_id = %user.tenant_id,
        provider = provider_code,
        enabled = saved.enabled,
        "payment config saved"
    );
    audit::record(
        &state.pool,
        user,
        AuditEvent::PaymentConfigUpdated,
        json!({ "provider_code": provider_code, "enabled": saved.enabled }),
    )
    .await;

    Ok(ApiResponse::success(
        "Payment config saved",
        view(gateway.as_ref(), &saved, &parsed),
        Some(Meta::empty()),
    ))
}

pub async fn list_configs(
    state: &AppState,
    user: &AuthUser,
) -> AppResult<ApiResponse<PaymentConfigList>> {
    ensure_admin(user)?;

    let rows = TenantPaymentConfigs::find()
        .filter(ConfigCol::TenantId.eq(user.tenant_id))
        .order_by_asc(ConfigCol::ProviderCode)
        .all(&state.orm)
        .await?;

    let mut items = Vec::with_capacity(rows.len());
    for row in rows {
        // Rows for providers that are no longer registered are skipped.
        let Ok(gateway) = state.gateways.resolve(&row.provider_code) else {
            continue;
        };
        let public_config = match ProviderConfig::parse(gateway.code(), &row.config) {
            Ok(parsed) => gateway.public_checkout_config(&parsed),
            Err(_) => json!({}),
        };
        items.push(PaymentConfigView {
            provider_code: row.provider_code,
            enabled: row.enabled,
            public_config,
            updated_at: row.updated_at.with_timezone(&Utc),
        });
    }

    let meta = Meta::count(items.len());
    Ok(ApiResponse::success(
        "Payment configs",
        PaymentConfigList { items },
        Some(meta),
    ))
}

/// What a client app may see for an enabled provider of a tenant.
pub async fn public_config(
    state: &AppState,
    tenant_id: Uuid,
    code: &str,
) -> AppResult<ApiResponse<PublicPaymentConfig>> {
    let gateway = state.gateways.resolve(code)?;
    let config = match load_config(&state.orm, tenant_id, gateway.code()).await? {
        Some(loaded) if loaded.enabled => loaded.config,
        _ => return Err(AppError::NotFound),
    };

    Ok(ApiResponse::ok(PublicPaymentConfig {
        provider_code: gateway.code().to_string(),
        config: gateway.public_checkout_config(&config),
    }))
}

pub fn list_providers(state: &AppState) -> ApiResponse<ProviderList> {
    let items: Vec<ProviderInfo> = state
        .gateways
        .iter()
        .map(|gateway| ProviderInfo {
            code: gateway.code().to_string(),
            fields: gateway.config_schema(),
        })
        .collect();
    let meta = Meta::count(items.len());
    ApiResponse::success("Providers", ProviderList { items }, Some(meta))
}

fn view(
    gateway: &dyn PaymentGateway,
    row: &ConfigModel,
    parsed: &ProviderConfig,
) -> PaymentConfigView {
    PaymentConfigView {
        provider_code: row.provider_code.clone(),
        enabled: row.enabled,
        public_config: gateway.public_checkout_config(parsed),
        updated_at: row.updated_at.with_timezone(&Utc),
    }
}
