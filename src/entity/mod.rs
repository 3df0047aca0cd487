pub mod items;
pub mod order_items;
pub mod order_status_history;
pub mod orders;
pub mod payment_transactions;
pub mod sea_orm_active_enums;
pub mod tenant_payment_configs;

pub use items::Entity as Items;
pub use order_items::Entity as OrderItems;
pub use order_status_history::Entity as OrderStatusHistory;
pub use orders::Entity as Orders;
pub use payment_transactions::Entity as PaymentTransactions;
pub use tenant_payment_configs::Entity as TenantPaymentConfigs;
