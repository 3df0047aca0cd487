use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use utoipa::ToSchema;

#[derive(Debug, Deserialize, ToSchema)]
pub struct UpsertPaymentConfigRequest {
    pub enabled: bool,
    #[schema(value_type = Object)]
    pub config: Value,
}

/// What an administrator gets back: never the stored secrets.
#[derive(Debug, Serialize, ToSchema)]
pub struct PaymentConfigView {
    pub provider_code: String,
    pub enabled: bool,
    #[schema(value_type = Object)]
    pub public_config: Value,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct PaymentConfigList {
    pub items: Vec<PaymentConfigView>,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct PublicPaymentConfig {
    pub provider_code: String,
    #[schema(value_type = Object)]
    pub config: Value,
}
