//! Inventory item entity - Stocked components, raw materials, supplies and products

use serde::{Deserialize, Serialize};

use crate::core::entity::Entity;
use crate::core::error::ShopError;
use crate::core::identity::{EntityId, EntityPrefix};

/// Inventory item class
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum ItemCategory {
    Component,
    #[serde(rename = "Raw Material")]
    RawMaterial,
    #[serde(rename = "Workshop Supply")]
    WorkshopSupply,
    Product,
}

impl ItemCategory {
    /// Categories that jobs consume from, in lookup order
    pub const CONSUMABLE: [ItemCategory; 3] = [
        ItemCategory::Component,
        ItemCategory::RawMaterial,
        ItemCategory::WorkshopSupply,
    ];

    pub const ALL: [ItemCategory; 4] = [
        ItemCategory::Component,
        ItemCategory::RawMaterial,
        ItemCategory::WorkshopSupply,
        ItemCategory::Product,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            ItemCategory::Component => "Component",
            ItemCategory::RawMaterial => "Raw Material",
            ItemCategory::WorkshopSupply => "Workshop Supply",
            ItemCategory::Product => "Product",
        }
    }
}

impl std::fmt::Display for ItemCategory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for ItemCategory {
    type Err = ShopError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized: String = s
            .chars()
            .filter(|c| !matches!(c, ' ' | '-' | '_'))
            .collect::<String>()
            .to_lowercase();
        match normalized.as_str() {
            "component" | "components" => Ok(ItemCategory::Component),
            "rawmaterial" | "rawmaterials" => Ok(ItemCategory::RawMaterial),
            "workshopsupply" | "workshopsupplies" | "supply" | "supplies" => {
                Ok(ItemCategory::WorkshopSupply)
            }
            "product" | "products" => Ok(ItemCategory::Product),
            _ => Err(ShopError::UnknownCategory(s.to_string())),
        }
    }
}

/// A stocked inventory item
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InventoryItem {
    pub id: EntityId,

    /// Stock keeping code, unique across all categories
    pub code: String,

    pub name: String,

    pub category: ItemCategory,

    pub current_stock: i64,

    /// Stock threshold below which replenishment is requested
    pub reorder_level: i64,

    /// Target stock level used for recommended order quantities
    pub standard_stock_level: i64,

    pub price: f64,

    #[serde(default = "default_unit")]
    pub unit: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub supplier_id: Option<EntityId>,
}

fn default_unit() -> String {
    "pcs".to_string()
}

impl InventoryItem {
    /// Create a new item with zero stock and no reorder threshold
    pub fn new(code: impl Into<String>, name: impl Into<String>, category: ItemCategory) -> Self {
        Self {
            id: EntityId::new(EntityPrefix::Itm),
            code: code.into(),
            name: name.into(),
            category,
            current_stock: 0,
            reorder_level: 0,
            standard_stock_level: 0,
            price: 0.0,
            unit: default_unit(),
            supplier_id: None,
        }
    }

    /// Stock is below the reorder threshold
    pub fn is_low(&self) -> bool {
        self.current_stock < self.reorder_level
    }

    /// `max(0, standardStockLevel - currentStock)`
    pub fn recommended_order_qty(&self) -> i64 {
        (self.standard_stock_level - self.current_stock).max(0)
    }

    /// Check attribute constraints before the item is written
    pub fn validate(&self) -> Result<(), ShopError> {
        if self.code.trim().is_empty() {
            return Err(ShopError::Validation {
                field: "code".to_string(),
                message: "must not be empty".to_string(),
            });
        }
        if self.current_stock < 0 {
            return Err(ShopError::Validation {
                field: "currentStock".to_string(),
                message: format!("must be zero or more (got {})", self.current_stock),
            });
        }
        if self.reorder_level < 0 {
            return Err(ShopError::Validation {
                field: "reorderLevel".to_string(),
                message: format!("must be zero or more (got {})", self.reorder_level),
            });
        }
        if self.standard_stock_level < self.reorder_level {
            return Err(ShopError::Validation {
                field: "standardStockLevel".to_string(),
                message: format!(
                    "must be at least the reorder level ({} < {})",
                    self.standard_stock_level, self.reorder_level
                ),
            });
        }
        if !self.price.is_finite() || self.price < 0.0 {
            return Err(ShopError::Validation {
                field: "price".to_string(),
                message: format!("must be a non-negative amount (got {})", self.price),
            });
        }
        Ok(())
    }
}

impl Entity for InventoryItem {
    const PREFIX: EntityPrefix = EntityPrefix::Itm;

    fn id(&self) -> &EntityId {
        &self.id
    }

    fn title(&self) -> &str {
        &self.name
    }
}
