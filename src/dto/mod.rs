pub mod auth;
pub mod orders;
pub mod payment_configs;
pub mod payments;
