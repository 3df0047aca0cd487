use serde_json::Value;
use uuid::Uuid;

use crate::{db::DbPool, error::AppResult, middleware::auth::AuthUser};

/// Business events appended to `audit_logs`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AuditEvent {
    OrderCreated,
    OrderItemDeleted,
    OrderCompleted,
    PaymentStarted,
    PaymentCaptured,
    CashConfirmed,
    PaymentConfigUpdated,
}

impl AuditEvent {
    pub fn action(self) -> &'static str {
        match self {
            Self::OrderCreated => "order_created",
            Self::OrderItemDeleted => "order_item_deleted",
            Self::OrderCompleted => "order_completed",
            Self::PaymentStarted => "payment_started",
            Self::PaymentCaptured => "payment_captured",
            Self::CashConfirmed => "cash_confirmed",
            Self::PaymentConfigUpdated => "payment_config_updated",
        }
    }

    /// Table the event is about.
    pub fn resource(self) -> &'static str {
        match self {
            Self::OrderCreated | Self::OrderCompleted => "orders",
            Self::OrderItemDeleted => "order_items",
            Self::PaymentStarted | Self::PaymentCaptured | Self::CashConfirmed => {
                "payment_transactions"
            }
            Self::PaymentConfigUpdated => "tenant_payment_configs",
        }
    }
}

pub async fn log_audit(
    pool: &DbPool,
    actor: &AuthUser,
    event: AuditEvent,
    metadata: &Value,
) -> AppResult<()> {
    sqlx::query(
        r#"
        INSERT INTO audit_logs (id, tenant_id, user_id, action, resource, metadata)
        VALUES ($1, $2, $3, $4, $5, $6)
        "#,
    )
    .bind(Uuid::new_v4())
    .bind(actor.tenant_id)
    .bind(actor.user_id)
    .bind(event.action())
    .bind(event.resource())
    .bind(metadata)
    .execute(pool)
    .await?;

    Ok(())
}

/// Best-effort audit write; a failure is logged and never fails the caller.
pub async fn record(pool: &DbPool, actor: &AuthUser, event: AuditEvent, metadata: Value) {
    if let Err(err) = log_audit(pool, actor, event, &metadata).await {
        tracing::warn!(error = %err, action = event.action(), "audit log failed");
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn payment_events_point_at_the_ledger() {
        for event in [
            AuditEvent::PaymentStarted,
            AuditEvent::PaymentCaptured,
            AuditEvent::CashConfirmed,
        ] {
            assert_eq!(event.resource(), "payment_transactions");
        }
        assert_eq!(AuditEvent::OrderItemDeleted.action(), "order_item_deleted");
    }
}
