//! Purchase queue entity - Replenishment requests for inventory items

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::core::entity::Entity;
use crate::core::identity::{EntityId, EntityPrefix};
use crate::entities::item::{InventoryItem, ItemCategory};

/// Purchase request status
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum QueueStatus {
    #[default]
    Pending,
    Ordered,
    Completed,
}

impl QueueStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            QueueStatus::Pending => "pending",
            QueueStatus::Ordered => "ordered",
            QueueStatus::Completed => "completed",
        }
    }

    /// Pending and ordered requests still represent an open need
    pub fn is_active(&self) -> bool {
        !matches!(self, QueueStatus::Completed)
    }
}

impl std::fmt::Display for QueueStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for QueueStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "pending" => Ok(QueueStatus::Pending),
            "ordered" => Ok(QueueStatus::Ordered),
            "completed" => Ok(QueueStatus::Completed),
            _ => Err(format!("Unknown queue status: {}", s)),
        }
    }
}

/// A replenishment request, snapshotting the item at enqueue time
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PurchaseQueueItem {
    pub id: EntityId,

    pub item_id: EntityId,

    pub item_name: String,

    pub item_code: String,

    pub category: ItemCategory,

    /// Stock level when the request was queued
    pub current_stock: i64,

    pub reorder_level: i64,

    pub standard_stock_level: i64,

    pub price: f64,

    pub unit: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub supplier_id: Option<EntityId>,

    pub status: QueueStatus,

    pub queued_at: DateTime<Utc>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub order_date: Option<DateTime<Utc>>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub expected_arrival_date: Option<DateTime<Utc>>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ordered_qty: Option<i64>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub received_qty: Option<i64>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub completed_at: Option<DateTime<Utc>>,
}

impl PurchaseQueueItem {
    /// Create a pending request from the item's current attributes
    pub fn snapshot(item: &InventoryItem, now: DateTime<Utc>) -> Self {
        Self {
            id: EntityId::new(EntityPrefix::Pq),
            item_id: item.id,
            item_name: item.name.clone(),
            item_code: item.code.clone(),
            category: item.category,
            current_stock: item.current_stock,
            reorder_level: item.reorder_level,
            standard_stock_level: item.standard_stock_level,
            price: item.price,
            unit: item.unit.clone(),
            supplier_id: item.supplier_id,
            status: QueueStatus::Pending,
            queued_at: now,
            order_date: None,
            expected_arrival_date: None,
            ordered_qty: None,
            received_qty: None,
            completed_at: None,
        }
    }

    /// `max(0, standardStockLevel - currentStock)` over the snapshot
    pub fn recommended_quantity(&self) -> i64 {
        (self.standard_stock_level - self.current_stock).max(0)
    }
}

impl Entity for PurchaseQueueItem {
    const PREFIX: EntityPrefix = EntityPrefix::Pq;

    fn id(&self) -> &EntityId {
        &self.id
    }

    fn title(&self) -> &str {
        &self.item_name
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_snapshot_copies_item_state() {
        let mut item = InventoryItem::new("GLUE-PVA", "PVA glue", ItemCategory::WorkshopSupply);
        item.current_stock = 2;
        item.reorder_level = 3;
        item.standard_stock_level = 12;
        item.price = 4.5;

        let entry = PurchaseQueueItem::snapshot(&item, Utc::now());
        assert_eq!(entry.item_id, item.id);
        assert_eq!(entry.item_code, "GLUE-PVA");
        assert_eq!(entry.category, ItemCategory::WorkshopSupply);
        assert_eq!(entry.status, QueueStatus::Pending);
        assert_eq!(entry.recommended_quantity(), 10);
        assert!(entry.order_date.is_none());
    }

    #[test]
    fn test_active_statuses() {
        assert!(QueueStatus::Pending.is_active());
        assert!(QueueStatus::Ordered.is_active());
        assert!(!QueueStatus::Completed.is_active());
    }
}
