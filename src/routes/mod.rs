use axum::Router;

use crate::state::AppState;

pub mod business;
pub mod doc;
pub mod health;
pub mod items;
pub mod order_items;
pub mod orders;
pub mod params;
pub mod payment_configs;
pub mod payments;

// Build the API router without binding state; it will be provided at the top level.
pub fn create_api_router() -> Router<AppState> {
    Router::new()
        .nest("/orders", orders::router())
        .nest("/order-items", order_items::router())
        .nest("/business", business::router())
        .nest("/items", items::router())
        .nest("/payments", payments::router())
        .nest("/tenants", payment_configs::public_router())
        .nest("/admin", payment_configs::admin_router())
}
