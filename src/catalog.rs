//! Read-only view of catalog items.
//!
//! Item kinds expose capabilities through traits instead of optional columns
//! read ad hoc: only kinds that book a limited resource have a capacity.

use rust_decimal::Decimal;
use uuid::Uuid;

use crate::entity::{items::Model as ItemModel, sea_orm_active_enums::ItemKind};

pub trait HasCapacity {
    /// Units available in total, or `None` when the item is unconstrained.
    fn capacity(&self) -> Option<i32>;
}

pub trait HasDisplayName {
    fn display_name(&self) -> &str;
}

#[derive(Debug, Clone, PartialEq)]
pub struct ItemInfo {
    pub id: Uuid,
    pub tenant_id: Uuid,
    pub business_id: Uuid,
    pub name: String,
    pub price: Decimal,
    pub currency: String,
}

#[derive(Debug, Clone, PartialEq)]
pub enum CatalogItem {
    /// Physical goods; stock is the catalog's business, not a booking limit.
    Product(ItemInfo),
    Event { info: ItemInfo, seats: Option<i32> },
    Service { info: ItemInfo, slots: Option<i32> },
}

impl CatalogItem {
    pub fn info(&self) -> &ItemInfo {
        match self {
            CatalogItem::Product(info)
            | CatalogItem::Event { info, .. }
            | CatalogItem::Service { info, .. } => info,
        }
    }
}

impl From<ItemModel> for CatalogItem {
    fn from(model: ItemModel) -> Self {
        let info = ItemInfo {
            id: model.id,
            tenant_id: model.tenant_id,
            business_id: model.business_id,
            name: model.name,
            price: model.price,
            currency: model.currency,
        };
        match model.kind {
            ItemKind::Product => CatalogItem::Product(info),
            ItemKind::Event => CatalogItem::Event {
                info,
                seats: model.capacity,
            },
            ItemKind::Service => CatalogItem::Service {
                info,
                slots: model.capacity,
            },
        }
    }
}

impl HasCapacity for CatalogItem {
    fn capacity(&self) -> Option<i32> {
        match self {
            CatalogItem::Product(_) => None,
            CatalogItem::Event { seats, .. } => *seats,
            CatalogItem::Service { slots, .. } => *slots,
        }
    }
}

impl HasDisplayName for CatalogItem {
    fn display_name(&self) -> &str {
        &self.info().name
    }
}

/// `requested` fits when it does not exceed `capacity - committed`.
pub fn fits_capacity(capacity: Option<i32>, committed: i64, requested: i64) -> bool {
    match capacity {
        None => true,
        Some(capacity) => requested <= i64::from(capacity) - committed,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use rust_decimal_macros::dec;

    fn model(kind: ItemKind, capacity: Option<i32>) -> ItemModel {
        ItemModel {
            id: Uuid::new_v4(),
            tenant_id: Uuid::new_v4(),
            business_id: Uuid::new_v4(),
            name: "Yoga class".into(),
            kind,
            price: dec!(10.00),
            currency: "USD".into(),
            capacity,
            created_at: Utc::now().into(),
        }
    }

    #[test]
    fn products_are_unconstrained() {
        let item = CatalogItem::from(model(ItemKind::Product, Some(3)));
        assert_eq!(item.capacity(), None);
        assert!(fits_capacity(item.capacity(), 1_000, 1_000));
    }

    #[test]
    fn events_and_services_expose_capacity() {
        assert_eq!(CatalogItem::from(model(ItemKind::Event, Some(30))).capacity(), Some(30));
        assert_eq!(CatalogItem::from(model(ItemKind::Service, None)).capacity(), None);
    }

    #[test]
    fn capacity_boundaries() {
        assert!(fits_capacity(Some(10), 8, 2));
        assert!(!fits_capacity(Some(10), 8, 3));
        assert!(!fits_capacity(Some(0), 0, 1));
        assert!(!fits_capacity(Some(5), 7, 1));
    }

    #[test]
    fn display_name_comes_from_the_item() {
        let item = CatalogItem::from(model(ItemKind::Event, Some(1)));
        assert_eq!(item.display_name(), "Yoga class");
    }
}
