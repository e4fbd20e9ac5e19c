//! Purchase queue - replenishment requests from creation to receipt
//!
//! A request is created as a snapshot of its item, placed with a supplier
//! (`mark_ordered`), and closed when goods arrive (`receive`). Receiving and
//! the stock increment commit together.

use std::collections::HashMap;
use std::io::Write;

use chrono::{DateTime, Duration, Utc};
use rusqlite::{params, Connection, OptionalExtension, Row};
use serde::Serialize;

use crate::core::config::PurchasingConfig;
use crate::core::directory::load_supplier;
use crate::core::error::{ShopError, ShopResult};
use crate::core::identity::EntityId;
use crate::core::ledger::{self, locate_item};
use crate::core::store::{Collection, Store, Tx};
use crate::entities::item::InventoryItem;
use crate::entities::purchase::{PurchaseQueueItem, QueueStatus};

const QUEUE_COLUMNS: &str = "id, item_id, item_name, item_code, category, current_stock, \
     reorder_level, standard_stock_level, price, unit, supplier_id, status, queued_at, \
     order_date, expected_arrival_date, ordered_qty, received_qty, completed_at";

fn entry_from_row(row: &Row<'_>) -> rusqlite::Result<PurchaseQueueItem> {
    Ok(PurchaseQueueItem {
        id: row.get(0)?,
        item_id: row.get(1)?,
        item_name: row.get(2)?,
        item_code: row.get(3)?,
        category: row.get(4)?,
        current_stock: row.get(5)?,
        reorder_level: row.get(6)?,
        standard_stock_level: row.get(7)?,
        price: row.get(8)?,
        unit: row.get(9)?,
        supplier_id: row.get(10)?,
        status: row.get(11)?,
        queued_at: row.get(12)?,
        order_date: row.get(13)?,
        expected_arrival_date: row.get(14)?,
        ordered_qty: row.get(15)?,
        received_qty: row.get(16)?,
        completed_at: row.get(17)?,
    })
}

pub(crate) fn load_entry(conn: &Connection, id: &str) -> ShopResult<Option<PurchaseQueueItem>> {
    let sql = format!("SELECT {QUEUE_COLUMNS} FROM purchase_queue WHERE id = ?1");
    Ok(conn.query_row(&sql, params![id], entry_from_row).optional()?)
}

fn active_entry_for(conn: &Connection, item_id: &EntityId) -> ShopResult<Option<PurchaseQueueItem>> {
    let sql = format!(
        "SELECT {QUEUE_COLUMNS} FROM purchase_queue
         WHERE item_id = ?1 AND status IN ('pending', 'ordered')"
    );
    Ok(conn
        .query_row(&sql, params![item_id], entry_from_row)
        .optional()?)
}

fn require_entry(conn: &Connection, id: &EntityId) -> ShopResult<PurchaseQueueItem> {
    load_entry(conn, &id.to_string())?.ok_or_else(|| ShopError::QueueItemNotFound(id.to_string()))
}

/// Result of queueing a request for an item
#[derive(Debug, Clone, PartialEq)]
pub enum Enqueued {
    /// A new pending request was created
    Created(PurchaseQueueItem),
    /// The item already had an open request; nothing was written
    Existing(PurchaseQueueItem),
}

impl Enqueued {
    pub fn entry(&self) -> &PurchaseQueueItem {
        match self {
            Enqueued::Created(entry) | Enqueued::Existing(entry) => entry,
        }
    }

    pub fn is_new(&self) -> bool {
        matches!(self, Enqueued::Created(_))
    }
}

/// Queue a pending snapshot of `item` inside an open transaction
///
/// An item has at most one open (pending or ordered) request.
pub(crate) fn enqueue_snapshot(
    tx: &mut Tx<'_>,
    item: &InventoryItem,
    now: DateTime<Utc>,
) -> ShopResult<Enqueued> {
    if let Some(existing) = active_entry_for(tx, &item.id)? {
        tracing::debug!(item = %item.code, entry = %existing.id, "Open request already queued");
        return Ok(Enqueued::Existing(existing));
    }

    let entry = PurchaseQueueItem::snapshot(item, now);
    let sql = format!(
        "INSERT INTO purchase_queue ({QUEUE_COLUMNS})
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13, ?14, ?15, ?16, ?17, ?18)"
    );
    tx.execute(
        &sql,
        params![
            entry.id,
            entry.item_id,
            entry.item_name,
            entry.item_code,
            entry.category,
            entry.current_stock,
            entry.reorder_level,
            entry.standard_stock_level,
            entry.price,
            entry.unit,
            entry.supplier_id,
            entry.status,
            entry.queued_at,
            entry.order_date,
            entry.expected_arrival_date,
            entry.ordered_qty,
            entry.received_qty,
            entry.completed_at,
        ],
    )?;
    tx.touch(Collection::PurchaseQueue, entry.id);

    tracing::info!(
        item = %item.code,
        stock = item.current_stock,
        reorder_level = item.reorder_level,
        entry = %entry.id,
        "Replenishment request queued"
    );
    Ok(Enqueued::Created(entry))
}

/// What `requeue_or_cancel` did with an entry
#[derive(Debug, Clone, PartialEq)]
pub enum CancelOutcome {
    /// Stock is still low; the entry is pending again
    Requeued(PurchaseQueueItem),
    /// The entry was removed
    Deleted,
}

/// One row of the purchasing CSV export
#[derive(Debug, Serialize)]
struct ExportRow<'a> {
    id: String,
    item_code: &'a str,
    item_name: &'a str,
    category: &'a str,
    status: &'a str,
    current_stock: i64,
    reorder_level: i64,
    recommended_qty: i64,
    ordered_qty: Option<i64>,
    unit: &'a str,
    unit_price: f64,
    supplier_id: Option<String>,
    order_date: Option<String>,
    expected_arrival: Option<String>,
}

/// Purchase queue manager
pub struct PurchaseQueue<'a> {
    store: &'a Store,
    default_eta_days: u32,
}

impl<'a> PurchaseQueue<'a> {
    pub fn new(store: &'a Store) -> Self {
        Self::with_config(store, &PurchasingConfig::default())
    }

    pub fn with_config(store: &'a Store, config: &PurchasingConfig) -> Self {
        Self {
            store,
            default_eta_days: config.default_eta_days,
        }
    }

    /// Queue a replenishment request for an item
    pub fn enqueue(&self, item_id: &EntityId, now: DateTime<Utc>) -> ShopResult<Enqueued> {
        let key = item_id.to_string();
        self.store.transact(|tx| {
            let item = ledger::locate_any(tx, &key)?
                .ok_or_else(|| ShopError::ItemNotFound(key.clone()))?;
            enqueue_snapshot(tx, &item, now)
        })
    }

    /// Place pending requests with a supplier
    ///
    /// All entries are updated in one transaction; if any entry is missing or
    /// not pending, none are changed.
    pub fn mark_ordered(
        &self,
        supplier: Option<&EntityId>,
        entries: &[EntityId],
        overrides: &HashMap<EntityId, i64>,
        now: DateTime<Utc>,
    ) -> ShopResult<Vec<PurchaseQueueItem>> {
        if let Some((_, qty)) = overrides.iter().find(|(_, qty)| **qty < 0) {
            return Err(ShopError::InvalidQuantity(*qty));
        }

        let ordered = self.store.transact(|tx| {
            let eta_days = match supplier {
                Some(id) => match load_supplier(tx, &id.to_string())? {
                    Some(found) => found.eta_days,
                    None => {
                        tracing::warn!(supplier = %id, "Unknown supplier, using default lead time");
                        self.default_eta_days
                    }
                },
                None => self.default_eta_days,
            };
            let arrival = now + Duration::days(i64::from(eta_days));

            let mut ordered: Vec<PurchaseQueueItem> = Vec::with_capacity(entries.len());
            for id in entries {
                if ordered.iter().any(|e| e.id == *id) {
                    continue;
                }
                let mut entry = require_entry(tx, id)?;
                if entry.status != QueueStatus::Pending {
                    return Err(ShopError::WrongQueueStatus {
                        id: id.to_string(),
                        expected: "pending",
                        actual: entry.status,
                    });
                }

                let qty = overrides
                    .get(id)
                    .copied()
                    .unwrap_or_else(|| entry.recommended_quantity());

                entry.status = QueueStatus::Ordered;
                entry.order_date = Some(now);
                entry.expected_arrival_date = Some(arrival);
                entry.ordered_qty = Some(qty);
                if let Some(supplier) = supplier {
                    entry.supplier_id = Some(*supplier);
                }

                tx.execute(
                    "UPDATE purchase_queue SET status = ?1, order_date = ?2,
                     expected_arrival_date = ?3, ordered_qty = ?4, supplier_id = ?5
                     WHERE id = ?6",
                    params![
                        entry.status,
                        entry.order_date,
                        entry.expected_arrival_date,
                        entry.ordered_qty,
                        entry.supplier_id,
                        entry.id,
                    ],
                )?;
                tx.touch(Collection::PurchaseQueue, entry.id);
                ordered.push(entry);
            }
            Ok(ordered)
        })?;

        tracing::info!(
            count = ordered.len(),
            supplier = ?supplier.map(|s| s.to_string()),
            "Purchase order placed"
        );
        Ok(ordered)
    }

    /// Record goods received against a request
    ///
    /// The stock increment and the status change commit together.
    pub fn receive(
        &self,
        id: &EntityId,
        quantity: i64,
        now: DateTime<Utc>,
    ) -> ShopResult<PurchaseQueueItem> {
        if quantity <= 0 {
            return Err(ShopError::InvalidQuantity(quantity));
        }

        let received = self.store.transact(|tx| {
            let mut entry = require_entry(tx, id)?;
            if !entry.status.is_active() {
                return Err(ShopError::WrongQueueStatus {
                    id: id.to_string(),
                    expected: "pending or ordered",
                    actual: entry.status,
                });
            }

            ledger::adjust_stock(tx, &entry.item_id.to_string(), Some(entry.category), quantity)?;

            entry.status = QueueStatus::Completed;
            entry.received_qty = Some(quantity);
            entry.completed_at = Some(now);
            tx.execute(
                "UPDATE purchase_queue SET status = ?1, received_qty = ?2, completed_at = ?3
                 WHERE id = ?4",
                params![entry.status, entry.received_qty, entry.completed_at, entry.id],
            )?;
            tx.touch(Collection::PurchaseQueue, entry.id);
            Ok(entry)
        })?;

        tracing::info!(entry = %received.id, item = %received.item_code, quantity, "Goods received");
        Ok(received)
    }

    /// Put a request back in the queue if its item is still low, else drop it
    pub fn requeue_or_cancel(&self, id: &EntityId) -> ShopResult<CancelOutcome> {
        let outcome = self.store.transact(|tx| {
            let entry = require_entry(tx, id)?;
            let item = locate_item(tx, &entry.item_id.to_string(), Some(entry.category))?;

            let requeue = match &item {
                Some(item) if item.is_low() => {
                    // A completed entry cannot reopen while another request is open
                    let other_open = active_entry_for(tx, &item.id)?
                        .is_some_and(|other| other.id != entry.id);
                    !other_open
                }
                _ => false,
            };

            match item {
                Some(item) if requeue => {
                    tx.execute(
                        "UPDATE purchase_queue SET status = 'pending', current_stock = ?1,
                         order_date = NULL, expected_arrival_date = NULL, ordered_qty = NULL,
                         received_qty = NULL, completed_at = NULL
                         WHERE id = ?2",
                        params![item.current_stock, entry.id],
                    )?;
                    tx.touch(Collection::PurchaseQueue, entry.id);
                    let refreshed = require_entry(tx, id)?;
                    Ok(CancelOutcome::Requeued(refreshed))
                }
                _ => {
                    tx.execute("DELETE FROM purchase_queue WHERE id = ?1", params![entry.id])?;
                    tx.touch(Collection::PurchaseQueue, entry.id);
                    Ok(CancelOutcome::Deleted)
                }
            }
        })?;

        match &outcome {
            CancelOutcome::Requeued(entry) => {
                tracing::info!(entry = %entry.id, "Request returned to pending")
            }
            CancelOutcome::Deleted => tracing::info!(entry = %id, "Request cancelled"),
        }
        Ok(outcome)
    }

    /// Delete a pending request
    pub fn remove(&self, id: &EntityId) -> ShopResult<PurchaseQueueItem> {
        self.store.transact(|tx| {
            let entry = require_entry(tx, id)?;
            if entry.status != QueueStatus::Pending {
                return Err(ShopError::WrongQueueStatus {
                    id: id.to_string(),
                    expected: "pending",
                    actual: entry.status,
                });
            }
            tx.execute("DELETE FROM purchase_queue WHERE id = ?1", params![entry.id])?;
            tx.touch(Collection::PurchaseQueue, entry.id);
            Ok(entry)
        })
    }

    pub fn get(&self, id: &EntityId) -> ShopResult<Option<PurchaseQueueItem>> {
        load_entry(self.store.conn(), &id.to_string())
    }

    /// List requests, oldest first
    pub fn list(&self, status: Option<QueueStatus>) -> ShopResult<Vec<PurchaseQueueItem>> {
        let conn = self.store.conn();
        let mut entries = Vec::new();
        match status {
            Some(status) => {
                let sql = format!(
                    "SELECT {QUEUE_COLUMNS} FROM purchase_queue WHERE status = ?1 ORDER BY queued_at, id"
                );
                let mut stmt = conn.prepare(&sql)?;
                for row in stmt.query_map(params![status], entry_from_row)? {
                    entries.push(row?);
                }
            }
            None => {
                let sql = format!("SELECT {QUEUE_COLUMNS} FROM purchase_queue ORDER BY queued_at, id");
                let mut stmt = conn.prepare(&sql)?;
                for row in stmt.query_map([], entry_from_row)? {
                    entries.push(row?);
                }
            }
        }
        Ok(entries)
    }

    /// The open (pending or ordered) request for an item, if any
    pub fn active_for_item(&self, item_id: &EntityId) -> ShopResult<Option<PurchaseQueueItem>> {
        active_entry_for(self.store.conn(), item_id)
    }

    /// Write the requests accepted by `keep` as CSV, one row per entry
    pub fn export_csv<W, F>(&self, writer: W, keep: F) -> ShopResult<usize>
    where
        W: Write,
        F: Fn(&PurchaseQueueItem) -> bool,
    {
        let entries: Vec<PurchaseQueueItem> =
            self.list(None)?.into_iter().filter(|e| keep(e)).collect();
        let mut out = csv::Writer::from_writer(writer);
        for entry in &entries {
            out.serialize(ExportRow {
                id: entry.id.to_string(),
                item_code: &entry.item_code,
                item_name: &entry.item_name,
                category: entry.category.as_str(),
                status: entry.status.as_str(),
                current_stock: entry.current_stock,
                reorder_level: entry.reorder_level,
                recommended_qty: entry.recommended_quantity(),
                ordered_qty: entry.ordered_qty,
                unit: &entry.unit,
                unit_price: entry.price,
                supplier_id: entry.supplier_id.map(|s| s.to_string()),
                order_date: entry.order_date.map(|d| d.format("%Y-%m-%d").to_string()),
                expected_arrival: entry
                    .expected_arrival_date
                    .map(|d| d.format("%Y-%m-%d").to_string()),
            })
            .map_err(|e| ShopError::Validation {
                field: "export".to_string(),
                message: e.to_string(),
            })?;
        }
        out.flush().map_err(|e| ShopError::Store(e.into()))?;
        Ok(entries.len())
    }
}
