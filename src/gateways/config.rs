//! Typed tenant payment configuration.
//!
//! The store keeps one JSON document per (tenant, provider). It is parsed into
//! a [`ProviderConfig`] variant once, when loaded or saved, so adapters never
//! deal with missing keys at call time.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::{CASH, GatewayError, GatewayResult, PAYPAL, STRIPE};

const SECRET_KEY_PREFIXES: [&str; 2] = ["sk_", "rk_"];

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct StripeConfig {
    pub secret_key: String,
    #[serde(default)]
    pub publishable_key: Option<String>,
    #[serde(default)]
    pub webhook_secret: Option<String>,
    #[serde(default)]
    pub platform_fee_percent: Option<Decimal>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum PayPalMode {
    #[default]
    Sandbox,
    Live,
}

impl PayPalMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            PayPalMode::Sandbox => "sandbox",
            PayPalMode::Live => "live",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct PayPalConfig {
    pub client_id: String,
    pub client_secret: String,
    #[serde(default)]
    pub mode: PayPalMode,
    #[serde(default)]
    pub brand_name: Option<String>,
    pub return_url: String,
    pub cancel_url: String,
}

#[derive(Debug, Clone, PartialEq, Default, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct CashConfig {
    #[serde(default)]
    pub instructions: Option<String>,
}

#[derive(Debug, Clone, PartialEq)]
pub enum ProviderConfig {
    Stripe(StripeConfig),
    PayPal(PayPalConfig),
    Cash(CashConfig),
}

impl ProviderConfig {
    /// Parses and validates the stored document for `code`.
    pub fn parse(code: &str, value: &Value) -> GatewayResult<Self> {
        match code {
            STRIPE => {
                let config: StripeConfig = from_value(STRIPE, value)?;
                config.validate()?;
                Ok(ProviderConfig::Stripe(config))
            }
            PAYPAL => {
                let config: PayPalConfig = from_value(PAYPAL, value)?;
                config.validate()?;
                Ok(ProviderConfig::PayPal(config))
            }
            CASH => {
                // An enabled cash provider needs no settings at all.
                if value.is_null() {
                    return Ok(ProviderConfig::Cash(CashConfig::default()));
                }
                Ok(ProviderConfig::Cash(from_value(CASH, value)?))
            }
            other => Err(GatewayError::UnknownProvider(other.to_string())),
        }
    }

    pub fn code(&self) -> &'static str {
        match self {
            ProviderConfig::Stripe(_) => STRIPE,
            ProviderConfig::PayPal(_) => PAYPAL,
            ProviderConfig::Cash(_) => CASH,
        }
    }
}

fn from_value<T: for<'de> Deserialize<'de>>(
    provider: &'static str,
    value: &Value,
) -> GatewayResult<T> {
    serde_json::from_value(value.clone())
        .map_err(|err| GatewayError::invalid_config(provider, err.to_string()))
}

fn require(provider: &'static str, key: &str, value: &str) -> GatewayResult<()> {
    if value.trim().is_empty() {
        return Err(GatewayError::invalid_config(
            provider,
            format!("{key} must not be empty"),
        ));
    }
    Ok(())
}

pub fn looks_like_secret_key(value: &str) -> bool {
    SECRET_KEY_PREFIXES
        .iter()
        .any(|prefix| value.trim_start().starts_with(prefix))
}

impl StripeConfig {
    fn validate(&self) -> GatewayResult<()> {
        require(STRIPE, "secret_key", &self.secret_key)?;
        if !looks_like_secret_key(&self.secret_key) {
            return Err(GatewayError::invalid_config(
                STRIPE,
                "secret_key must be a secret (sk_) or restricted (rk_) key",
            ));
        }
        if let Some(key) = &self.publishable_key {
            self.checked_publishable_key(key)?;
        }
        if let Some(percent) = self.platform_fee_percent {
            if percent < Decimal::ZERO || percent > Decimal::ONE_HUNDRED {
                return Err(GatewayError::invalid_config(
                    STRIPE,
                    "platform_fee_percent must be between 0 and 100",
                ));
            }
        }
        Ok(())
    }

    fn checked_publishable_key<'a>(&self, key: &'a str) -> GatewayResult<&'a str> {
        if looks_like_secret_key(key) || !key.starts_with("pk_") {
            return Err(GatewayError::invalid_config(
                STRIPE,
                "publishable_key must be a pk_ key",
            ));
        }
        Ok(key)
    }

    /// The key handed to client applications. A value that looks like a
    /// secret key is refused outright, whatever was stored.
    pub fn publishable_key(&self) -> GatewayResult<Option<&str>> {
        match self.publishable_key.as_deref() {
            Some(key) => self.checked_publishable_key(key).map(Some),
            None => Ok(None),
        }
    }
}

impl PayPalConfig {
    fn validate(&self) -> GatewayResult<()> {
        require(PAYPAL, "client_id", &self.client_id)?;
        require(PAYPAL, "client_secret", &self.client_secret)?;
        require(PAYPAL, "return_url", &self.return_url)?;
        require(PAYPAL, "cancel_url", &self.cancel_url)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn parses_stripe_config() {
        let config = ProviderConfig::parse(
            STRIPE,
            &json!({
                "secret_key": "sk_test_123",
                "publishable_key": "pk_test_123",
                "platform_fee_percent": "2.5"
            }),
        )
        .unwrap();
        let ProviderConfig::Stripe(stripe) = config else {
            panic!("expected stripe config");
        };
        assert_eq!(stripe.publishable_key().unwrap(), Some("pk_test_123"));
        assert_eq!(stripe.platform_fee_percent, Some(Decimal::new(25, 1)));
    }

    #[test]
    fn rejects_secret_key_in_publishable_slot() {
        let err = ProviderConfig::parse(
            STRIPE,
            &json!({ "secret_key": "sk_test_123", "publishable_key": "sk_live_oops" }),
        )
        .unwrap_err();
        assert!(matches!(err, GatewayError::InvalidConfig { .. }));
    }

    #[test]
    fn publishable_key_guard_applies_after_load() {
        let stripe = StripeConfig {
            secret_key: "sk_test_1".into(),
            publishable_key: Some("rk_live_2".into()),
            webhook_secret: None,
            platform_fee_percent: None,
        };
        assert!(stripe.publishable_key().is_err());
    }

    #[test]
    fn missing_required_paypal_field_is_rejected() {
        let err = ProviderConfig::parse(
            PAYPAL,
            &json!({ "client_id": "abc", "client_secret": "def", "return_url": "https://r" }),
        )
        .unwrap_err();
        assert!(err.to_string().contains("cancel_url"));
    }

    #[test]
    fn paypal_mode_defaults_to_sandbox() {
        let config = ProviderConfig::parse(
            PAYPAL,
            &json!({
                "client_id": "abc",
                "client_secret": "def",
                "return_url": "https://shop.test/return",
                "cancel_url": "https://shop.test/cancel"
            }),
        )
        .unwrap();
        let ProviderConfig::PayPal(paypal) = config else {
            panic!("expected paypal config");
        };
        assert_eq!(paypal.mode, PayPalMode::Sandbox);
    }

    #[test]
    fn cash_accepts_empty_document() {
        assert_eq!(
            ProviderConfig::parse(CASH, &Value::Null).unwrap(),
            ProviderConfig::Cash(CashConfig::default())
        );
        assert!(ProviderConfig::parse(CASH, &json!({})).is_ok());
    }

    #[test]
    fn unknown_code_is_rejected() {
        assert!(matches!(
            ProviderConfig::parse("BITCOIN", &json!({})),
            Err(GatewayError::UnknownProvider(_))
        ));
    }
}
