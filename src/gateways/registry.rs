//! Lookup from provider code to adapter.

use std::collections::BTreeMap;
use std::sync::Arc;

use reqwest::Client as HttpClient;
use tracing::info;

use super::{
    GatewayError, GatewayResult, PaymentGateway, cash::CashGateway, paypal::PayPalGateway,
    stripe::StripeGateway,
};
use crate::config::AppConfig;

/// Immutable after startup; shared through `AppState`.
#[derive(Clone, Default)]
pub struct GatewayRegistry {
    gateways: BTreeMap<&'static str, Arc<dyn PaymentGateway>>,
}

impl GatewayRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Stripe, PayPal and cash, wired to the configured endpoints.
    pub fn with_defaults(http: HttpClient, config: &AppConfig) -> Self {
        let mut stripe = StripeGateway::new(http.clone());
        if let Some(base) = &config.stripe_api_base {
            stripe = stripe.with_base_url(base.clone());
        }
        let mut paypal = PayPalGateway::new(http);
        if let Some(base) = &config.paypal_api_base {
            paypal = paypal.with_base_url(base.clone());
        }

        let mut registry = Self::new();
        registry.register(Arc::new(stripe));
        registry.register(Arc::new(paypal));
        registry.register(Arc::new(CashGateway::new()));
        registry
    }

    pub fn register(&mut self, gateway: Arc<dyn PaymentGateway>) {
        let code = gateway.code();
        info!(provider = code, "registering payment gateway");
        self.gateways.insert(code, gateway);
    }

    /// Resolves a provider code, case-insensitively.
    pub fn resolve(&self, code: &str) -> GatewayResult<Arc<dyn PaymentGateway>> {
        let normalized = code.trim().to_uppercase();
        self.gateways
            .get(normalized.as_str())
            .cloned()
            .ok_or(GatewayError::UnknownProvider(normalized))
    }

    pub fn codes(&self) -> Vec<&'static str> {
        self.gateways.keys().copied().collect()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Arc<dyn PaymentGateway>> {
        self.gateways.values()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::gateways::{CASH, PAYPAL, STRIPE};

    #[test]
    fn resolves_registered_codes_case_insensitively() {
        let mut registry = GatewayRegistry::new();
        registry.register(Arc::new(CashGateway::new()));

        assert_eq!(registry.resolve("cash").unwrap().code(), CASH);
        assert_eq!(registry.resolve(" CASH ").unwrap().code(), CASH);
    }

    #[test]
    fn unknown_code_fails_fast() {
        let registry = GatewayRegistry::new();
        let err = registry.resolve("bitcoin").err().unwrap();
        assert!(matches!(err, GatewayError::UnknownProvider(code) if code == "BITCOIN"));
    }

    #[test]
    fn defaults_register_all_providers() {
        let config = AppConfig::for_tests();
        let registry = GatewayRegistry::with_defaults(HttpClient::new(), &config);
        assert_eq!(registry.codes(), vec![CASH, PAYPAL, STRIPE]);
    }
}
