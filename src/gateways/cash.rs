//! Offline payment: funds are collected out of band and confirmed later by
//! the business.

use async_trait::async_trait;
use serde_json::{Value, json};

use super::{
    CASH, ConfigField, CreatePaymentCommand, FieldType, GatewayError, GatewayPayment,
    GatewayResult, PaymentGateway, ProviderConfig,
};

pub const OFFLINE_PENDING: &str = "OFFLINE_PENDING";

#[derive(Debug, Default, Clone)]
pub struct CashGateway;

impl CashGateway {
    pub fn new() -> Self {
        Self
    }

    pub fn reference_for(order_id: uuid::Uuid) -> String {
        format!("CASH_ORDER_{order_id}")
    }
}

#[async_trait]
impl PaymentGateway for CashGateway {
    fn code(&self) -> &'static str {
        CASH
    }

    fn config_schema(&self) -> Vec<ConfigField> {
        vec![ConfigField::new(
            "instructions",
            "Payment instructions shown to customers",
            FieldType::Text,
            false,
        )]
    }

    fn public_checkout_config(&self, config: &ProviderConfig) -> Value {
        match config {
            ProviderConfig::Cash(cash) => json!({ "instructions": cash.instructions }),
            _ => json!({}),
        }
    }

    async fn create_payment(
        &self,
        command: &CreatePaymentCommand,
        config: &ProviderConfig,
    ) -> GatewayResult<GatewayPayment> {
        if !matches!(config, ProviderConfig::Cash(_)) {
            return Err(GatewayError::invalid_config(CASH, "expected cash settings"));
        }
        let reference = Self::reference_for(command.order_id);
        Ok(GatewayPayment {
            provider_payment_id: reference.clone(),
            client_secret: None,
            redirect_url: None,
            status: OFFLINE_PENDING.to_string(),
            raw: json!({ "reference": reference, "status": OFFLINE_PENDING }),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::gateways::config::CashConfig;
    use rust_decimal_macros::dec;
    use uuid::Uuid;

    #[tokio::test]
    async fn returns_synthetic_reference() {
        let order_id = Uuid::new_v4();
        let command = CreatePaymentCommand {
            tenant_id: Uuid::new_v4(),
            order_id,
            amount: dec!(20.00),
            currency: "USD".into(),
            destination_account_id: None,
            description: None,
        };
        let payment = CashGateway::new()
            .create_payment(&command, &ProviderConfig::Cash(CashConfig::default()))
            .await
            .unwrap();

        assert_eq!(payment.provider_payment_id, format!("CASH_ORDER_{order_id}"));
        assert_eq!(payment.status, "OFFLINE_PENDING");
        assert!(payment.client_secret.is_none());
        assert!(payment.redirect_url.is_none());
    }

    #[test]
    fn public_config_only_exposes_instructions() {
        let config = ProviderConfig::Cash(CashConfig {
            instructions: Some("Pay at the front desk".into()),
        });
        assert_eq!(
            CashGateway::new().public_checkout_config(&config),
            json!({ "instructions": "Pay at the front desk" })
        );
    }
}
