use utoipa::{
    Modify, OpenApi,
    openapi::{
        self,
        OpenApi as OpenApiSpec,
        security::{HttpAuthScheme, HttpBuilder, SecurityScheme},
    },
};
use utoipa_scalar::{Scalar, Servable};

use crate::{
    dto::{
        orders::{
            BusinessOrder, BusinessOrderList, CapacityCheck, CreateOrderLine, CreateOrderRequest,
            DeletedLine, OrderList, OrderSummaries, OrderSummariesRequest, OrderWithItems,
            TransitionResult,
        },
        payment_configs::{
            PaymentConfigList, PaymentConfigView, PublicPaymentConfig, UpsertPaymentConfigRequest,
        },
        payments::{
            CashConfirmRequest, PayPalCaptureRequest, ProviderInfo, ProviderList,
            StartPaymentRequest, StartPaymentResponse,
        },
    },
    entity::sea_orm_active_enums::OrderStatus,
    gateways::{ConfigField, FieldType},
    lifecycle::Operation,
    models::{Order, OrderItem, PaymentTransaction, StatusChange},
    response::{ApiResponse, Meta},
    routes::{business, health, items, order_items, orders, params, payment_configs, payments},
    services::reconciliation_service::{PaymentState, PaymentSummary},
};

struct SecurityAddon;

impl Modify for SecurityAddon {
    fn modify(&self, openapi: &mut openapi::OpenApi) {
        let components = openapi.components.get_or_insert_with(Default::default);
        components.add_security_scheme(
            "bearer_auth",
            SecurityScheme::Http(
                HttpBuilder::new()
                    .scheme(HttpAuthScheme::Bearer)
                    .bearer_format("JWT")
                    .build(),
            ),
        );
    }
}

#[derive(OpenApi)]
#[openapi(
    paths(
        health::health_check,
        orders::create_order,
        orders::list_orders,
        orders::get_order,
        orders::payment_summary,
        orders::order_summaries,
        order_items::cancel,
        order_items::reset_to_pending,
        order_items::request_cancel,
        order_items::refund,
        order_items::delete_line,
        business::list_business_orders,
        business::approve_cancel,
        business::reject_cancel,
        business::mark_paid,
        business::mark_refunded,
        business::reject_order,
        business::unreject_order,
        business::refund,
        items::item_capacity,
        payments::list_providers,
        payments::start_payment,
        payments::capture_paypal,
        payments::confirm_cash,
        payment_configs::list_configs,
        payment_configs::upsert_config,
        payment_configs::public_config
    ),
    components(
        schemas(
            Order,
            OrderItem,
            OrderStatus,
            Operation,
            StatusChange,
            PaymentTransaction,
            PaymentState,
            PaymentSummary,
            CreateOrderLine,
            CreateOrderRequest,
            OrderWithItems,
            OrderList,
            TransitionResult,
            DeletedLine,
            CapacityCheck,
            OrderSummariesRequest,
            OrderSummaries,
            BusinessOrder,
            BusinessOrderList,
            StartPaymentRequest,
            StartPaymentResponse,
            PayPalCaptureRequest,
            CashConfirmRequest,
            ConfigField,
            FieldType,
            ProviderInfo,
            ProviderList,
            UpsertPaymentConfigRequest,
            PaymentConfigView,
            PaymentConfigList,
            PublicPaymentConfig,
            params::Pagination,
            params::OrderListQuery,
            Meta,
            ApiResponse<OrderWithItems>,
            ApiResponse<OrderList>,
            ApiResponse<TransitionResult>,
            ApiResponse<PaymentSummary>,
            ApiResponse<StartPaymentResponse>,
            ApiResponse<PaymentTransaction>
        )
    ),
    security(
        ("bearer_auth" = [])
    ),
    modifiers(&SecurityAddon),
    tags(
        (name = "Health", description = "Health check endpoint"),
        (name = "Orders", description = "Order creation and customer views"),
        (name = "Order items", description = "Customer lifecycle actions on a booking"),
        (name = "Business", description = "Business lifecycle actions and owner views"),
        (name = "Items", description = "Capacity check"),
        (name = "Payments", description = "Payment start, capture and cash confirmation"),
        (name = "Payment configs", description = "Tenant provider settings"),
    )
)]
pub struct ApiDoc;

pub fn scalar_docs() -> Scalar<OpenApiSpec> {
    Scalar::with_url("/docs", ApiDoc::openapi())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn openapi_lists_lifecycle_and_payment_routes() {
        let doc = ApiDoc::openapi();
        for path in [
            "/api/orders",
            "/api/order-items/{id}/refund",
            "/api/business/order-items/{id}/mark-paid",
            "/api/payments/start",
            "/api/tenants/{tenant_id}/payment-configs/{code}/public",
        ] {
            assert!(doc.paths.paths.contains_key(path), "missing {path}");
        }
    }
}
