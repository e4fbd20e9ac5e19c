//! Store schema creation and version checks

use rusqlite::{params, Connection, OptionalExtension};

use crate::core::ledger::store_table;
use crate::entities::item::ItemCategory;

use super::StoreError;

/// Current schema version
pub const SCHEMA_VERSION: i32 = 1;

pub(super) fn init(conn: &Connection) -> Result<(), StoreError> {
    conn.execute_batch(
        r#"
        CREATE TABLE IF NOT EXISTS schema_version (
            version INTEGER PRIMARY KEY
        );
        "#,
    )?;

    let found: Option<i32> = conn
        .query_row("SELECT MAX(version) FROM schema_version", [], |row| {
            row.get::<_, Option<i32>>(0)
        })
        .optional()?
        .flatten();

    if let Some(found) = found {
        if found > SCHEMA_VERSION {
            return Err(StoreError::UnsupportedSchema {
                found,
                supported: SCHEMA_VERSION,
            });
        }
    }

    conn.execute_batch(
        r#"
        -- Job cards (never deleted, only archived)
        CREATE TABLE IF NOT EXISTS jobs (
            id TEXT PRIMARY KEY,
            job_code TEXT NOT NULL UNIQUE,
            part_id TEXT,
            department_id TEXT,
            employee_id TEXT,
            status TEXT NOT NULL,
            quantity INTEGER NOT NULL,
            estimated_time INTEGER,
            started_at TEXT,
            paused_at TEXT,
            completed_at TEXT,
            total_paused_ms INTEGER NOT NULL DEFAULT 0 CHECK (total_paused_ms >= 0),
            consumables TEXT NOT NULL DEFAULT '[]',  -- JSON array
            material_cost REAL,
            labor_cost REAL,
            total_cost REAL,
            issue_reason TEXT,
            notes TEXT,
            created_at TEXT NOT NULL
        );
        CREATE INDEX IF NOT EXISTS idx_jobs_status ON jobs(status);

        -- Replenishment requests
        CREATE TABLE IF NOT EXISTS purchase_queue (
            id TEXT PRIMARY KEY,
            item_id TEXT NOT NULL,
            item_name TEXT NOT NULL,
            item_code TEXT NOT NULL,
            category TEXT NOT NULL,
            current_stock INTEGER NOT NULL,
            reorder_level INTEGER NOT NULL,
            standard_stock_level INTEGER NOT NULL,
            price REAL NOT NULL,
            unit TEXT NOT NULL,
            supplier_id TEXT,
            status TEXT NOT NULL,
            queued_at TEXT NOT NULL,
            order_date TEXT,
            expected_arrival_date TEXT,
            ordered_qty INTEGER,
            received_qty INTEGER,
            completed_at TEXT
        );
        CREATE INDEX IF NOT EXISTS idx_queue_status ON purchase_queue(status);
        -- At most one open request per item
        CREATE UNIQUE INDEX IF NOT EXISTS idx_queue_active_item
            ON purchase_queue(item_id) WHERE status IN ('pending', 'ordered');

        CREATE TABLE IF NOT EXISTS suppliers (
            id TEXT PRIMARY KEY,
            name TEXT NOT NULL,
            eta_days INTEGER NOT NULL DEFAULT 0,
            contact TEXT,
            created_at TEXT NOT NULL
        );

        CREATE TABLE IF NOT EXISTS employees (
            id TEXT PRIMARY KEY,
            name TEXT NOT NULL,
            department_id TEXT,
            hourly_rate REAL,
            created_at TEXT NOT NULL
        );

        -- Named sequences (job codes); value is the last number issued
        CREATE TABLE IF NOT EXISTS counters (
            name TEXT PRIMARY KEY,
            value INTEGER NOT NULL
        );
        "#,
    )?;

    // One table per inventory category; names come from the closed category mapping
    for category in ItemCategory::ALL {
        let table = store_table(category);
        conn.execute_batch(&format!(
            r#"
            CREATE TABLE IF NOT EXISTS {table} (
                id TEXT PRIMARY KEY,
                code TEXT NOT NULL UNIQUE,
                name TEXT NOT NULL,
                current_stock INTEGER NOT NULL DEFAULT 0,
                reorder_level INTEGER NOT NULL DEFAULT 0,
                standard_stock_level INTEGER NOT NULL DEFAULT 0,
                price REAL NOT NULL DEFAULT 0,
                unit TEXT NOT NULL DEFAULT 'pcs',
                supplier_id TEXT
            );
            "#
        ))?;
    }

    if found.is_none() {
        conn.execute(
            "INSERT INTO schema_version (version) VALUES (?1)",
            params![SCHEMA_VERSION],
        )?;
    }

    Ok(())
}
