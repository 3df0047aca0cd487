use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

use crate::gateways::ConfigField;

#[derive(Debug, Clone, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct StartPaymentRequest {
    pub tenant_id: Uuid,
    pub order_id: Uuid,
    /// Provider code, e.g. `STRIPE`, `PAYPAL`, `CASH`.
    pub payment_method: String,
    #[schema(value_type = String)]
    pub amount: Decimal,
    pub currency: String,
    #[serde(default)]
    pub destination_account_id: Option<String>,
}

#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct StartPaymentResponse {
    pub transaction_id: Uuid,
    pub provider_code: String,
    pub provider_payment_id: String,
    pub client_secret: Option<String>,
    pub redirect_url: Option<String>,
    pub status: String,
    pub publishable_key: Option<String>,
}

#[derive(Debug, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct PayPalCaptureRequest {
    /// PayPal order id, returned to the return URL as `token`.
    pub provider_payment_id: String,
}

#[derive(Debug, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CashConfirmRequest {
    pub order_id: Uuid,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct ProviderInfo {
    pub code: String,
    pub fields: Vec<ConfigField>,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct ProviderList {
    pub items: Vec<ProviderInfo>,
}
