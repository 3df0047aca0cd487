//! Stripe payment intents, with optional destination charges for connected
//! accounts.

use async_trait::async_trait;
use reqwest::Client as HttpClient;
use rust_decimal::{Decimal, RoundingStrategy, prelude::ToPrimitive};
use serde::Deserialize;
use serde_json::{Value, json};
use tracing::{debug, warn};

use super::{
    ConfigField, CreatePaymentCommand, FieldType, GatewayError, GatewayPayment, GatewayResult,
    PaymentGateway, ProviderConfig, STRIPE, config::StripeConfig, normalize_status, read_body,
};

/// Production Stripe API endpoint.
pub const DEFAULT_API_BASE: &str = "https://api.stripe.com";

#[derive(Debug, Deserialize)]
struct PaymentIntentResponse {
    id: String,
    client_secret: Option<String>,
    status: String,
}

#[derive(Clone)]
pub struct StripeGateway {
    http: HttpClient,
    base_url: String,
}

impl StripeGateway {
    pub fn new(http: HttpClient) -> Self {
        Self {
            http,
            base_url: DEFAULT_API_BASE.to_string(),
        }
    }

    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into().trim_end_matches('/').to_string();
        self
    }
}

/// Converts a decimal amount to minor units. Assumes a two-decimal currency.
pub fn to_minor_units(amount: Decimal) -> GatewayResult<i64> {
    (amount * Decimal::ONE_HUNDRED)
        .round_dp_with_strategy(0, RoundingStrategy::MidpointAwayFromZero)
        .to_i64()
        .ok_or_else(|| GatewayError::invalid_config(STRIPE, "amount out of range"))
}

/// Platform fee in minor units for a given percentage.
pub fn application_fee(minor_amount: i64, percent: Decimal) -> i64 {
    (Decimal::from(minor_amount) * percent / Decimal::ONE_HUNDRED)
        .round_dp_with_strategy(0, RoundingStrategy::MidpointAwayFromZero)
        .to_i64()
        .unwrap_or(0)
}

/// Form fields of the create-payment-intent call.
pub fn payment_intent_params(
    command: &CreatePaymentCommand,
    config: &StripeConfig,
) -> GatewayResult<Vec<(String, String)>> {
    let amount = to_minor_units(command.amount)?;
    let mut params = vec![
        ("amount".to_string(), amount.to_string()),
        ("currency".to_string(), command.currency.to_lowercase()),
        (
            "automatic_payment_methods[enabled]".to_string(),
            "true".to_string(),
        ),
        ("metadata[orderId]".to_string(), command.order_id.to_string()),
        ("metadata[tenantId]".to_string(), command.tenant_id.to_string()),
    ];
    if let Some(description) = &command.description {
        params.push(("description".to_string(), description.clone()));
    }

    if let Some(destination) = command
        .destination_account_id
        .as_deref()
        .filter(|d| !d.trim().is_empty())
    {
        if let Some(percent) = config.platform_fee_percent.filter(|p| *p > Decimal::ZERO) {
            params.push((
                "application_fee_amount".to_string(),
                application_fee(amount, percent).to_string(),
            ));
        }
        params.push((
            "transfer_data[destination]".to_string(),
            destination.to_string(),
        ));
    }

    Ok(params)
}

#[async_trait]
impl PaymentGateway for StripeGateway {
    fn code(&self) -> &'static str {
        STRIPE
    }

    fn config_schema(&self) -> Vec<ConfigField> {
        vec![
            ConfigField::new("secret_key", "Secret key", FieldType::Secret, true),
            ConfigField::new("publishable_key", "Publishable key", FieldType::Text, false),
            ConfigField::new("webhook_secret", "Webhook signing secret", FieldType::Secret, false),
            ConfigField::new(
                "platform_fee_percent",
                "Platform fee (%) on connected-account charges",
                FieldType::Number,
                false,
            ),
        ]
    }

    fn public_checkout_config(&self, config: &ProviderConfig) -> Value {
        match config {
            ProviderConfig::Stripe(stripe) => match stripe.publishable_key() {
                Ok(key) => json!({ "publishable_key": key }),
                Err(err) => {
                    warn!(error = %err, "refusing to expose stripe key");
                    json!({})
                }
            },
            _ => json!({}),
        }
    }

    async fn create_payment(
        &self,
        command: &CreatePaymentCommand,
        config: &ProviderConfig,
    ) -> GatewayResult<GatewayPayment> {
        let ProviderConfig::Stripe(stripe) = config else {
            return Err(GatewayError::invalid_config(STRIPE, "expected stripe settings"));
        };

        let params = payment_intent_params(command, stripe)?;
        debug!(order_id = %command.order_id, "creating stripe payment intent");

        let response = self
            .http
            .post(format!("{}/v1/payment_intents", self.base_url))
            .bearer_auth(&stripe.secret_key)
            .form(&params)
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

        let intent: PaymentIntentResponse =
            serde_json::from_value(raw.clone()).map_err(|_| GatewayError::MissingField("id"))?;

        Ok(GatewayPayment {
            provider_payment_id: intent.id,
            client_secret: intent.client_secret,
            redirect_url: None,
            status: normalize_status(&intent.status),
            raw,
        })
    }
}
