//! PayPal Orders v2: client-credentials token, order creation with an
//! approval redirect, and capture once the buyer comes back.

use async_trait::async_trait;
use reqwest::Client as HttpClient;
use rust_decimal::{Decimal, RoundingStrategy};
use serde::Deserialize;
use serde_json::{Value, json};
use tracing::{debug, info};

use super::{
    CaptureOutcome, ConfigField, CreatePaymentCommand, FieldType, GatewayError, GatewayPayment,
    GatewayResult, PAYPAL, PaymentGateway, ProviderConfig,
    config::{PayPalConfig, PayPalMode},
    normalize_status, read_body,
};

pub const SANDBOX_API_BASE: &str = "https://api-m.sandbox.paypal.com";
pub const LIVE_API_BASE: &str = "https://api-m.paypal.com";

const DEFAULT_BRAND_NAME: &str = "Checkout";
const APPROVAL_RELS: [&str; 2] = ["approve", "payer-action"];

#[derive(Debug, Deserialize)]
struct TokenResponse {
    access_token: Option<String>,
}

#[derive(Clone)]
pub struct PayPalGateway {
    http: HttpClient,
    base_url_override: Option<String>,
}

impl PayPalGateway {
    pub fn new(http: HttpClient) -> Self {
        Self {
            http,
            base_url_override: None,
        }
    }

    /// Sends every call to `base_url` regardless of the tenant's mode.
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url_override = Some(base_url.into().trim_end_matches('/').to_string());
        self
    }

    fn base_url(&self, config: &PayPalConfig) -> String {
        if let Some(base) = &self.base_url_override {
            return base.clone();
        }
        match config.mode {
            PayPalMode::Sandbox => SANDBOX_API_BASE.to_string(),
            PayPalMode::Live => LIVE_API_BASE.to_string(),
        }
    }

    async fn access_token(&self, base_url: &str, config: &PayPalConfig) -> GatewayResult<String> {
        let response = self
            .http
            .post(format!("{base_url}/v1/oauth2/token"))
            .basic_auth(&config.client_id, Some(&config.client_secret))
            .form(&[("grant_type", "client_credentials")])
            .send()
            .await?;

        let status = response.status();
        let raw = read_body(response).await?;
        if !status.is_success() {
            return Err(GatewayError::Api {
                status: status.as_u16(),
                body: raw.to_string(),
            });
        }

        serde_json::from_value::<TokenResponse>(raw)
            .ok()
            .and_then(|token| token.access_token)
            .filter(|token| !token.is_empty())
            .ok_or(GatewayError::MissingField("access_token"))
    }
}

fn paypal_config(config: &ProviderConfig) -> GatewayResult<&PayPalConfig> {
    match config {
        ProviderConfig::PayPal(paypal) => Ok(paypal),
        _ => Err(GatewayError::invalid_config(PAYPAL, "expected paypal settings")),
    }
}

/// PayPal wants amounts as strings with exactly two decimals.
pub fn format_amount(amount: Decimal) -> String {
    let mut value = amount.round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero);
    value.rescale(2);
    value.to_string()
}

pub fn order_request_body(command: &CreatePaymentCommand, config: &PayPalConfig) -> Value {
    let description = command
        .description
        .clone()
        .unwrap_or_else(|| format!("Order {}", command.order_id));
    json!({
        "intent": "CAPTURE",
        "purchase_units": [{
            "amount": {
                "currency_code": command.currency.to_uppercase(),
                "value": format_amount(command.amount),
            },
            "custom_id": command.order_id.to_string(),
            "description": description,
        }],
        "application_context": {
            "brand_name": config.brand_name.as_deref().unwrap_or(DEFAULT_BRAND_NAME),
            "return_url": config.return_url,
            "cancel_url": config.cancel_url,
            "user_action": "PAY_NOW",
        },
    })
}

/// First link whose rel is `approve` or `payer-action`.
pub fn approval_link(response: &Value) -> Option<String> {
    response
        .get("links")?
        .as_array()?
        .iter()
        .find(|link| {
            link.get("rel")
                .and_then(Value::as_str)
                .is_some_and(|rel| APPROVAL_RELS.contains(&rel))
        })
        .and_then(|link| link.get("href"))
        .and_then(Value::as_str)
        .map(str::to_string)
}

#[async_trait]
impl PaymentGateway for PayPalGateway {
    fn code(&self) -> &'static str {
        PAYPAL
    }

    fn config_schema(&self) -> Vec<ConfigField> {
        vec![
            ConfigField::new("client_id", "Client ID", FieldType::Text, true),
            ConfigField::new("client_secret", "Client secret", FieldType::Secret, true),
            ConfigField::new("mode", "Mode (sandbox or live)", FieldType::Select, false),
            ConfigField::new("brand_name", "Brand name on the PayPal page", FieldType::Text, false),
            ConfigField::new("return_url", "Return URL after approval", FieldType::Url, true),
            ConfigField::new("cancel_url", "Cancel URL", FieldType::Url, true),
        ]
    }

    fn public_checkout_config(&self, config: &ProviderConfig) -> Value {
        match config {
            ProviderConfig::PayPal(paypal) => json!({
                "client_id": paypal.client_id,
                "mode": paypal.mode.as_str(),
            }),
            _ => json!({}),
        }
    }

    async fn create_payment(
        &self,
        command: &CreatePaymentCommand,
        config: &ProviderConfig,
    ) -> GatewayResult<GatewayPayment> {
        let paypal = paypal_config(config)?;
        let base_url = self.base_url(paypal);
        let token = self.access_token(&base_url, paypal).await?;

        debug!(order_id = %command.order_id, "creating paypal order");
        let response = self
            .http
            .post(format!("{base_url}/v2/checkout/orders"))
            .bearer_auth(&token)
            .json(&order_request_body(command, paypal))
            .send()
            .await?;

        let status = response.status();
        let raw = read_body(response).await?;
        if !status.is_success() {
            return Err(GatewayError::Api {
                status: status.as_u16(),
                body: raw.to_string(),
            });
        }

        let order_id = raw
            .get("id")
            .and_then(Value::as_str)
            .map(str::to_string)
            .ok_or(GatewayError::MissingField("id"))?;
        let redirect_url = approval_link(&raw).ok_or(GatewayError::MissingField("approval link"))?;
        let order_status = raw
            .get("status")
            .and_then(Value::as_str)
            .map(normalize_status)
            .unwrap_or_else(|| "CREATED".to_string());

        Ok(GatewayPayment {
            provider_payment_id: order_id,
            client_secret: None,
            redirect_url: Some(redirect_url),
            status: order_status,
            raw,
        })
    }

    async fn capture_payment(
        &self,
        provider_payment_id: &str,
        config: &ProviderConfig,
    ) -> GatewayResult<CaptureOutcome> {
        let paypal = paypal_config(config)?;
        let base_url = self.base_url(paypal);
        let token = self.access_token(&base_url, paypal).await?;

        let response = self
            .http
            .post(format!(
                "{base_url}/v2/checkout/orders/{provider_payment_id}/capture"
            ))
            .bearer_auth(&token)
            .json(&json!({}))
            .send()
            .await?;

        let status = response.status();
        let raw = read_body(response).await?;
        info!(
            provider_payment_id,
            status = status.as_u16(),
            "paypal capture finished"
        );

        Ok(CaptureOutcome {
            succeeded: status.is_success(),
            http_status: status.as_u16(),
            raw,
        })
    }
}
