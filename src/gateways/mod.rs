//! Payment provider integrations.
//!
//! Every provider is an adapter behind [`PaymentGateway`]. Adapters are
//! stateless apart from a shared HTTP client; tenant credentials are passed in
//! per call as an already validated [`ProviderConfig`].

pub mod cash;
pub mod config;
pub mod paypal;
mod registry;
pub mod stripe;

use async_trait::async_trait;
use rust_decimal::Decimal;
use serde::Serialize;
use serde_json::Value;
use thiserror::Error;
use utoipa::ToSchema;
use uuid::Uuid;

pub use config::ProviderConfig;
pub use registry::GatewayRegistry;

pub const STRIPE: &str = "STRIPE";
pub const PAYPAL: &str = "PAYPAL";
pub const CASH: &str = "CASH";

#[derive(Debug, Error)]
pub enum GatewayError {
    #[error("unknown payment provider {0}")]
    UnknownProvider(String),

    #[error("invalid {provider} configuration: {message}")]
    InvalidConfig {
        provider: &'static str,
        message: String,
    },

    #[error("provider request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("provider returned {status}: {body}")]
    Api { status: u16, body: String },

    #[error("provider response is missing {0}")]
    MissingField(&'static str),

    #[error("{provider} does not support {operation}")]
    Unsupported {
        provider: &'static str,
        operation: &'static str,
    },
}

impl GatewayError {
    pub fn invalid_config(provider: &'static str, message: impl Into<String>) -> Self {
        GatewayError::InvalidConfig {
            provider,
            message: message.into(),
        }
    }
}

pub type GatewayResult<T> = std::result::Result<T, GatewayError>;

/// Field type used to render the tenant settings form.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum FieldType {
    Text,
    Secret,
    Url,
    Number,
    Select,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, ToSchema)]
pub struct ConfigField {
    pub key: &'static str,
    pub label: &'static str,
    pub field_type: FieldType,
    pub required: bool,
}

impl ConfigField {
    pub const fn new(
        key: &'static str,
        label: &'static str,
        field_type: FieldType,
        required: bool,
    ) -> Self {
        Self {
            key,
            label,
            field_type,
            required,
        }
    }
}

/// What the orchestrator asks an adapter to do.
#[derive(Debug, Clone)]
pub struct CreatePaymentCommand {
    pub tenant_id: Uuid,
    pub order_id: Uuid,
    pub amount: Decimal,
    pub currency: String,
    pub destination_account_id: Option<String>,
    pub description: Option<String>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct GatewayPayment {
    pub provider_payment_id: String,
    pub client_secret: Option<String>,
    pub redirect_url: Option<String>,
    /// Provider status, normalized to uppercase.
    pub status: String,
    pub raw: Value,
}

/// Result of a capture call. A non-2xx answer is a failed outcome, not an
/// error: the ledger still records it.
#[derive(Debug, Clone, PartialEq)]
pub struct CaptureOutcome {
    pub succeeded: bool,
    pub http_status: u16,
    pub raw: Value,
}

#[async_trait]
pub trait PaymentGateway: Send + Sync {
    /// Stable uppercase identifier matching the tenant configuration key.
    fn code(&self) -> &'static str;

    /// Fields a tenant administrator fills in. Never contains values.
    fn config_schema(&self) -> Vec<ConfigField>;

    /// Subset of the configuration a client application may see.
    fn public_checkout_config(&self, config: &ProviderConfig) -> Value;

    async fn create_payment(
        &self,
        command: &CreatePaymentCommand,
        config: &ProviderConfig,
    ) -> GatewayResult<GatewayPayment>;

    async fn capture_payment(
        &self,
        _provider_payment_id: &str,
        _config: &ProviderConfig,
    ) -> GatewayResult<CaptureOutcome> {
        Err(GatewayError::Unsupported {
            provider: self.code(),
            operation: "capture",
        })
    }
}

pub fn normalize_status(status: &str) -> String {
    status.trim().to_uppercase()
}

/// Reads a response body as JSON, keeping the raw text when it is not JSON.
pub(crate) async fn read_body(response: reqwest::Response) -> GatewayResult<Value> {
    let text = response.text().await?;
    if text.trim().is_empty() {
        return Ok(Value::Null);
    }
    Ok(serde_json::from_str(&text).unwrap_or(Value::String(text)))
}
