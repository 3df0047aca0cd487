pub mod booking_service;
pub mod capacity_service;
pub mod capture_service;
pub mod order_service;
pub mod payment_config_service;
pub mod payment_service;
pub mod reconciliation_service;
