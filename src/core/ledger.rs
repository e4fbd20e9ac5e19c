//! Inventory ledger - stock levels across the inventory stores
//!
//! Each item category lives in its own store table. The mapping from category
//! to table is closed: every category has exactly one table and there is no
//! string-built lookup. Stock only moves through [`adjust_stock`], which runs
//! inside the caller's transaction so the movement commits together with the
//! state change that caused it.

use rusqlite::{params, Connection, OptionalExtension, Row};

use crate::core::error::{ShopError, ShopResult};
use crate::core::identity::EntityId;
use crate::core::store::{Collection, Store, Tx};
use crate::entities::item::{InventoryItem, ItemCategory};

/// Store table holding items of `category`
pub fn store_table(category: ItemCategory) -> &'static str {
    match category {
        ItemCategory::Component => "components",
        ItemCategory::RawMaterial => "raw_materials",
        ItemCategory::WorkshopSupply => "workshop_supplies",
        ItemCategory::Product => "products",
    }
}

const ITEM_COLUMNS: &str =
    "id, code, name, current_stock, reorder_level, standard_stock_level, price, unit, supplier_id";

fn item_from_row(row: &Row<'_>, category: ItemCategory) -> rusqlite::Result<InventoryItem> {
    Ok(InventoryItem {
        id: row.get(0)?,
        code: row.get(1)?,
        name: row.get(2)?,
        category,
        current_stock: row.get(3)?,
        reorder_level: row.get(4)?,
        standard_stock_level: row.get(5)?,
        price: row.get(6)?,
        unit: row.get(7)?,
        supplier_id: row.get(8)?,
    })
}

/// A stock movement applied by [`adjust_stock`]
#[derive(Debug, Clone, PartialEq)]
pub struct StockChange {
    /// Item state before the movement
    pub item: InventoryItem,
    pub before: i64,
    pub after: i64,
}

/// Load an item from one category's store
pub(crate) fn load_item(
    conn: &Connection,
    id: &str,
    category: ItemCategory,
) -> ShopResult<Option<InventoryItem>> {
    let sql = format!(
        "SELECT {ITEM_COLUMNS} FROM {} WHERE id = ?1",
        store_table(category)
    );
    let item = conn
        .query_row(&sql, params![id], |row| item_from_row(row, category))
        .optional()?;
    Ok(item)
}

/// Find an item by ID
///
/// With a category hint only that store is searched; without one the three
/// consumable stores are searched in order.
pub(crate) fn locate_item(
    conn: &Connection,
    id: &str,
    hint: Option<ItemCategory>,
) -> ShopResult<Option<InventoryItem>> {
    match hint {
        Some(category) => load_item(conn, id, category),
        None => {
            for category in ItemCategory::CONSUMABLE {
                if let Some(item) = load_item(conn, id, category)? {
                    return Ok(Some(item));
                }
            }
            Ok(None)
        }
    }
}

/// Find an item in any store, including products
pub(crate) fn locate_any(conn: &Connection, id: &str) -> ShopResult<Option<InventoryItem>> {
    for category in ItemCategory::ALL {
        if let Some(item) = load_item(conn, id, category)? {
            return Ok(Some(item));
        }
    }
    Ok(None)
}

fn find_by_code(conn: &Connection, code: &str) -> ShopResult<Option<InventoryItem>> {
    for category in ItemCategory::ALL {
        let sql = format!(
            "SELECT {ITEM_COLUMNS} FROM {} WHERE code = ?1 COLLATE NOCASE",
            store_table(category)
        );
        let item = conn
            .query_row(&sql, params![code], |row| item_from_row(row, category))
            .optional()?;
        if item.is_some() {
            return Ok(item);
        }
    }
    Ok(None)
}

/// Apply `delta` to an item's stock inside an open transaction
///
/// Fails with `ItemNotFound` if no store holds the item.
pub(crate) fn adjust_stock(
    tx: &mut Tx<'_>,
    id: &str,
    hint: Option<ItemCategory>,
    delta: i64,
) -> ShopResult<StockChange> {
    let item = locate_item(tx, id, hint)?.ok_or_else(|| ShopError::ItemNotFound(id.to_string()))?;

    let before = item.current_stock;
    let after = before.checked_add(delta).ok_or_else(|| ShopError::Validation {
        field: "currentStock".to_string(),
        message: format!("adjusting {} by {} overflows", before, delta),
    })?;
    if after < 0 {
        return Err(ShopError::Validation {
            field: "currentStock".to_string(),
            message: format!("{} on hand, cannot remove {}", before, -delta),
        });
    }

    let sql = format!(
        "UPDATE {} SET current_stock = ?1 WHERE id = ?2",
        store_table(item.category)
    );
    tx.execute(&sql, params![after, id])?;
    tx.touch(Collection::Inventory, id);

    tracing::debug!(item = %item.code, before, after, delta, "Stock adjusted");

    Ok(StockChange {
        item,
        before,
        after,
    })
}

/// Inventory management over the record store
pub struct Ledger<'a> {
    store: &'a Store,
}

impl<'a> Ledger<'a> {
    pub fn new(store: &'a Store) -> Self {
        Self { store }
    }

    /// Add a new item to its category's store
    pub fn create_item(&self, item: &InventoryItem) -> ShopResult<()> {
        item.validate()?;
        self.store.transact(|tx| {
            if find_by_code(tx, &item.code)?.is_some() {
                return Err(ShopError::DuplicateCode(item.code.clone()));
            }
            let sql = format!(
                "INSERT INTO {} ({ITEM_COLUMNS}) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9)",
                store_table(item.category)
            );
            tx.execute(
                &sql,
                params![
                    item.id,
                    item.code,
                    item.name,
                    item.current_stock,
                    item.reorder_level,
                    item.standard_stock_level,
                    item.price,
                    item.unit,
                    item.supplier_id,
                ],
            )?;
            tx.touch(Collection::Inventory, item.id);
            Ok(())
        })?;

        tracing::info!(item = %item.code, category = %item.category, "Inventory item created");
        Ok(())
    }

    /// Update an item's attributes
    ///
    /// Stock is left as stored; it only moves through adjustments. The
    /// category cannot change.
    pub fn update_item(&self, item: &InventoryItem) -> ShopResult<InventoryItem> {
        item.validate()?;
        self.store.transact(|tx| {
            let id = item.id.to_string();
            let existing =
                locate_any(tx, &id)?.ok_or_else(|| ShopError::ItemNotFound(id.clone()))?;
            if existing.category != item.category {
                return Err(ShopError::Validation {
                    field: "category".to_string(),
                    message: format!(
                        "cannot move {} from {} to {}",
                        existing.code, existing.category, item.category
                    ),
                });
            }
            if let Some(other) = find_by_code(tx, &item.code)? {
                if other.id != item.id {
                    return Err(ShopError::DuplicateCode(item.code.clone()));
                }
            }

            let sql = format!(
                "UPDATE {} SET code = ?1, name = ?2, reorder_level = ?3, standard_stock_level = ?4,
                 price = ?5, unit = ?6, supplier_id = ?7 WHERE id = ?8",
                store_table(item.category)
            );
            tx.execute(
                &sql,
                params![
                    item.code,
                    item.name,
                    item.reorder_level,
                    item.standard_stock_level,
                    item.price,
                    item.unit,
                    item.supplier_id,
                    id,
                ],
            )?;
            tx.touch(Collection::Inventory, &id);

            load_item(tx, &id, item.category)?.ok_or(ShopError::ItemNotFound(id))
        })
    }

    /// Remove an item from its store
    pub fn delete_item(&self, id: &EntityId) -> ShopResult<InventoryItem> {
        let removed = self.store.transact(|tx| {
            let key = id.to_string();
            let item = locate_any(tx, &key)?.ok_or_else(|| ShopError::ItemNotFound(key.clone()))?;
            let sql = format!("DELETE FROM {} WHERE id = ?1", store_table(item.category));
            tx.execute(&sql, params![key])?;
            tx.touch(Collection::Inventory, &key);
            Ok(item)
        })?;

        tracing::info!(item = %removed.code, "Inventory item deleted");
        Ok(removed)
    }

    /// Get an item by ID from any store
    pub fn get_item(&self, id: &EntityId) -> ShopResult<Option<InventoryItem>> {
        locate_any(self.store.conn(), &id.to_string())
    }

    /// Resolve an item by full ID or item code
    pub fn find_item(&self, id_or_code: &str) -> ShopResult<InventoryItem> {
        let conn = self.store.conn();
        let found = match id_or_code.parse::<EntityId>() {
            Ok(id) => locate_any(conn, &id.to_string())?,
            Err(_) => find_by_code(conn, id_or_code)?,
        };
        found.ok_or_else(|| ShopError::ItemNotFound(id_or_code.to_string()))
    }

    /// List items, optionally restricted to one category
    pub fn list_items(&self, category: Option<ItemCategory>) -> ShopResult<Vec<InventoryItem>> {
        let categories: Vec<ItemCategory> = match category {
            Some(c) => vec![c],
            None => ItemCategory::ALL.to_vec(),
        };

        let mut items = Vec::new();
        for category in categories {
            let sql = format!(
                "SELECT {ITEM_COLUMNS} FROM {} ORDER BY code",
                store_table(category)
            );
            let mut stmt = self.store.conn().prepare(&sql)?;
            let rows = stmt.query_map([], |row| item_from_row(row, category))?;
            for row in rows {
                items.push(row?);
            }
        }
        Ok(items)
    }

    /// Items whose stock is below their reorder level
    pub fn low_stock(&self) -> ShopResult<Vec<InventoryItem>> {
        Ok(self
            .list_items(None)?
            .into_iter()
            .filter(|item| item.is_low())
            .collect())
    }

    /// Apply a stock movement as its own transaction
    pub fn adjust_stock(
        &self,
        id: &EntityId,
        hint: Option<ItemCategory>,
        delta: i64,
    ) -> ShopResult<StockChange> {
        let key = id.to_string();
        self.store.transact(|tx| adjust_stock(tx, &key, hint, delta))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn stocked(code: &str, category: ItemCategory, stock: i64) -> InventoryItem {
        let mut item = InventoryItem::new(code, format!("{} item", code), category);
        item.current_stock = stock;
        item.reorder_level = 2;
        item.standard_stock_level = 10;
        item.price = 1.25;
        item
    }

    #[test]
    fn test_category_tables_are_distinct() {
        let mut tables: Vec<_> = ItemCategory::ALL.iter().map(|c| store_table(*c)).collect();
        tables.sort();
        tables.dedup();
        assert_eq!(tables.len(), 4);
    }

    #[test]
    fn test_create_and_get_item() {
        let store = Store::open_in_memory().unwrap();
        let ledger = Ledger::new(&store);
        let item = stocked("OAK-20", ItemCategory::RawMaterial, 5);
        ledger.create_item(&item).unwrap();

        let loaded = ledger.get_item(&item.id).unwrap().unwrap();
        assert_eq!(loaded, item);

        let by_code = ledger.find_item("oak-20").unwrap();
        assert_eq!(by_code.id, item.id);
    }

    #[test]
    fn test_duplicate_code_rejected_across_categories() {
        let store = Store::open_in_memory().unwrap();
        let ledger = Ledger::new(&store);
        ledger
            .create_item(&stocked("X1", ItemCategory::Component, 1))
            .unwrap();

        let err = ledger
            .create_item(&stocked("X1", ItemCategory::WorkshopSupply, 1))
            .unwrap_err();
        assert!(matches!(err, ShopError::DuplicateCode(_)));
    }

    #[test]
    fn test_adjust_stock_both_directions() {
        let store = Store::open_in_memory().unwrap();
        let ledger = Ledger::new(&store);
        let item = stocked("SCREW-4", ItemCategory::Component, 10);
        ledger.create_item(&item).unwrap();

        let change = ledger.adjust_stock(&item.id, None, -4).unwrap();
        assert_eq!((change.before, change.after), (10, 6));

        let change = ledger
            .adjust_stock(&item.id, Some(ItemCategory::Component), 9)
            .unwrap();
        assert_eq!((change.before, change.after), (6, 15));
    }

    #[test]
    fn test_adjust_stock_below_zero_is_rejected() {
        let store = Store::open_in_memory().unwrap();
        let ledger = Ledger::new(&store);
        let item = stocked("OAK", ItemCategory::RawMaterial, 4);
        ledger.create_item(&item).unwrap();

        let err = ledger.adjust_stock(&item.id, None, -10).unwrap_err();
        assert!(matches!(err, ShopError::Validation { ref field, .. } if field == "currentStock"));
        assert_eq!(ledger.get_item(&item.id).unwrap().unwrap().current_stock, 4);

        let change = ledger.adjust_stock(&item.id, None, -4).unwrap();
        assert_eq!(change.after, 0);
    }

    #[test]
    fn test_create_rejects_negative_stock() {
        let store = Store::open_in_memory().unwrap();
        let ledger = Ledger::new(&store);

        let err = ledger
            .create_item(&stocked("OAK", ItemCategory::RawMaterial, -4))
            .unwrap_err();
        assert!(matches!(err, ShopError::Validation { ref field, .. } if field == "currentStock"));
        assert!(ledger.list_items(None).unwrap().is_empty());
    }

    #[test]
    fn test_adjust_stock_missing_item() {
        let store = Store::open_in_memory().unwrap();
        let ledger = Ledger::new(&store);
        let missing = EntityId::new(crate::core::identity::EntityPrefix::Itm);

        let err = ledger.adjust_stock(&missing, None, 1).unwrap_err();
        assert!(matches!(err, ShopError::ItemNotFound(_)));
    }

    #[test]
    fn test_adjust_stock_with_wrong_hint_is_not_found() {
        let store = Store::open_in_memory().unwrap();
        let ledger = Ledger::new(&store);
        let item = stocked("SAND-120", ItemCategory::WorkshopSupply, 3);
        ledger.create_item(&item).unwrap();

        let err = ledger
            .adjust_stock(&item.id, Some(ItemCategory::Component), -1)
            .unwrap_err();
        assert!(matches!(err, ShopError::ItemNotFound(_)));
        assert_eq!(ledger.get_item(&item.id).unwrap().unwrap().current_stock, 3);
    }

    #[test]
    fn test_update_keeps_stock_and_category() {
        let store = Store::open_in_memory().unwrap();
        let ledger = Ledger::new(&store);
        let item = stocked("HINGE", ItemCategory::Component, 8);
        ledger.create_item(&item).unwrap();

        let mut edited = item.clone();
        edited.name = "Brass hinge".to_string();
        edited.current_stock = 999;
        edited.price = 3.0;
        let updated = ledger.update_item(&edited).unwrap();
        assert_eq!(updated.name, "Brass hinge");
        assert_eq!(updated.current_stock, 8);
        assert_eq!(updated.price, 3.0);

        edited.category = ItemCategory::Product;
        assert!(matches!(
            ledger.update_item(&edited),
            Err(ShopError::Validation { .. })
        ));
    }

    #[test]
    fn test_list_and_low_stock() {
        let store = Store::open_in_memory().unwrap();
        let ledger = Ledger::new(&store);
        ledger
            .create_item(&stocked("A", ItemCategory::Component, 1))
            .unwrap();
        ledger
            .create_item(&stocked("B", ItemCategory::RawMaterial, 5))
            .unwrap();
        ledger
            .create_item(&stocked("C", ItemCategory::Product, 0))
            .unwrap();

        assert_eq!(ledger.list_items(None).unwrap().len(), 3);
        assert_eq!(
            ledger
                .list_items(Some(ItemCategory::RawMaterial))
                .unwrap()
                .len(),
            1
        );

        let low: Vec<_> = ledger
            .low_stock()
            .unwrap()
            .into_iter()
            .map(|i| i.code)
            .collect();
        assert_eq!(low, vec!["A".to_string(), "C".to_string()]);
    }

    #[test]
    fn test_delete_item() {
        let store = Store::open_in_memory().unwrap();
        let ledger = Ledger::new(&store);
        let item = stocked("GONE", ItemCategory::WorkshopSupply, 1);
        ledger.create_item(&item).unwrap();

        ledger.delete_item(&item.id).unwrap();
        assert!(ledger.get_item(&item.id).unwrap().is_none());
        assert!(matches!(
            ledger.delete_item(&item.id),
            Err(ShopError::ItemNotFound(_))
        ));
    }
}
