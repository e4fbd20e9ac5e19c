//! QC settlement - closing a job on its quality-control decision
//!
//! Approval finalizes cost, deducts consumed stock and queues replenishment
//! for items that fall below their reorder level. Rejection records the reason
//! and touches nothing else. Either way the whole settlement is one
//! transaction: a failure part way leaves the job, stock and queue untouched.

use chrono::{DateTime, Utc};
use rusqlite::params;
use serde::Serialize;

use crate::core::directory::load_employee;
use crate::core::error::{ShopError, ShopResult};
use crate::core::identity::EntityId;
use crate::core::ledger::{adjust_stock, locate_item};
use crate::core::lifecycle::load_job;
use crate::core::purchasing::{enqueue_snapshot, Enqueued};
use crate::core::store::{Collection, Store, Tx};
use crate::entities::item::{InventoryItem, ItemCategory};
use crate::entities::job::{JobCard, JobStatus};
use crate::entities::purchase::PurchaseQueueItem;

/// Outcome of quality control
#[derive(Debug, Clone, PartialEq)]
pub enum QcDecision {
    Approved,
    Rejected { reason: String },
}

impl QcDecision {
    fn target(&self) -> JobStatus {
        match self {
            QcDecision::Approved => JobStatus::Complete,
            QcDecision::Rejected { .. } => JobStatus::Issue,
        }
    }
}

/// Final costs of an approved job
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct JobCosts {
    pub material_cost: f64,
    pub labor_cost: f64,
    pub total_cost: f64,
    pub active_hours: f64,
}

/// Stock taken for one item during settlement
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StockDeduction {
    pub item_id: EntityId,
    pub item_code: String,
    pub category: ItemCategory,
    /// Quantity the job consumed
    pub consumed: i64,
    /// Quantity actually removed from stock
    pub deducted: i64,
    pub before: i64,
    pub after: i64,
}

impl StockDeduction {
    /// Stock did not cover what the job consumed
    pub fn is_short(&self) -> bool {
        self.deducted < self.consumed
    }
}

/// Everything a settlement changed
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SettlementReport {
    pub job: JobCard,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub costs: Option<JobCosts>,
    pub deductions: Vec<StockDeduction>,
    /// Replenishment requests created by this settlement
    pub reorders: Vec<PurchaseQueueItem>,
}

/// Active hours between `started` and `now`, less whole seconds paused
///
/// `max(0, ((now - started) / 1000 - floor(paused_ms / 1000)) / 3600)`
pub fn labor_hours(started: Option<DateTime<Utc>>, paused_ms: i64, now: DateTime<Utc>) -> f64 {
    let Some(started) = started else {
        return 0.0;
    };
    let elapsed_secs = (now - started).num_milliseconds() as f64 / 1000.0;
    let paused_secs = paused_ms.div_euclid(1000) as f64;
    ((elapsed_secs - paused_secs) / 3600.0).max(0.0)
}

/// Stock moved from at-or-above the reorder level to below it
///
/// A level of zero never triggers.
pub fn crosses_reorder_level(before: i64, after: i64, reorder_level: i64) -> bool {
    reorder_level > 0 && before >= reorder_level && after < reorder_level
}

/// Consumption of one live item across a job's consumables
struct Draw {
    item: InventoryItem,
    quantity: i64,
}

/// Settles jobs awaiting quality control
pub struct SettlementEngine<'a> {
    store: &'a Store,
}

impl<'a> SettlementEngine<'a> {
    pub fn new(store: &'a Store) -> Self {
        Self { store }
    }

    /// Apply a QC decision to a job awaiting QC
    pub fn settle(
        &self,
        job_id: &EntityId,
        decision: QcDecision,
        now: DateTime<Utc>,
    ) -> ShopResult<SettlementReport> {
        let report = self.store.transact(|tx| settle_in(tx, job_id, &decision, now))?;

        match &report.costs {
            Some(costs) => tracing::info!(
                job = %report.job.job_code,
                material = costs.material_cost,
                labor = costs.labor_cost,
                total = costs.total_cost,
                deductions = report.deductions.len(),
                reorders = report.reorders.len(),
                "Job approved"
            ),
            None => tracing::info!(
                job = %report.job.job_code,
                reason = report.job.issue_reason.as_deref().unwrap_or(""),
                "Job rejected"
            ),
        }
        Ok(report)
    }

    pub fn approve(&self, job_id: &EntityId, now: DateTime<Utc>) -> ShopResult<SettlementReport> {
        self.settle(job_id, QcDecision::Approved, now)
    }

    pub fn reject(
        &self,
        job_id: &EntityId,
        reason: impl Into<String>,
        now: DateTime<Utc>,
    ) -> ShopResult<SettlementReport> {
        self.settle(
            job_id,
            QcDecision::Rejected {
                reason: reason.into(),
            },
            now,
        )
    }
}

fn settle_in(
    tx: &mut Tx<'_>,
    job_id: &EntityId,
    decision: &QcDecision,
    now: DateTime<Utc>,
) -> ShopResult<SettlementReport> {
    let key = job_id.to_string();
    let job = load_job(tx, &key)?.ok_or_else(|| ShopError::JobNotFound(key.clone()))?;

    if job.status != JobStatus::AwaitingQc {
        return Err(ShopError::InvalidTransition {
            from: job.status,
            to: decision.target(),
        });
    }

    let reason = match decision {
        QcDecision::Rejected { reason } => reason,
        QcDecision::Approved => return approve_in(tx, job, now),
    };

    tx.execute(
        "UPDATE jobs SET status = ?1, issue_reason = ?2 WHERE id = ?3",
        params![JobStatus::Issue, reason, key],
    )?;
    tx.touch(Collection::Jobs, &key);

    let job = load_job(tx, &key)?.ok_or(ShopError::JobNotFound(key))?;
    Ok(SettlementReport {
        job,
        costs: None,
        deductions: Vec::new(),
        reorders: Vec::new(),
    })
}

fn approve_in(tx: &mut Tx<'_>, job: JobCard, now: DateTime<Utc>) -> ShopResult<SettlementReport> {
    let key = job.id.to_string();

    // Price every consumable and group the live ones by item
    let mut material_cost = 0.0;
    let mut draws: Vec<Draw> = Vec::new();
    for consumable in &job.processed_consumables {
        let hint = consumable
            .category
            .as_deref()
            .map(str::parse::<ItemCategory>)
            .transpose()?;
        let live = locate_item(tx, &consumable.item_id, hint)?;

        let unit_price = match &live {
            Some(item) => item.price,
            None => consumable.unit_price.unwrap_or(0.0),
        };
        material_cost += unit_price * f64::from(consumable.quantity);

        if let Some(item) = live {
            let quantity = i64::from(consumable.quantity);
            match draws.iter_mut().find(|d| d.item.id == item.id) {
                Some(draw) => draw.quantity += quantity,
                None => draws.push(Draw { item, quantity }),
            }
        }
    }

    let mut deductions = Vec::with_capacity(draws.len());
    let mut reorders = Vec::new();
    for draw in draws {
        let before = draw.item.current_stock;
        let deducted = draw.quantity.min(before.max(0));
        if deducted < draw.quantity {
            tracing::warn!(
                job = %job.job_code,
                item = %draw.item.code,
                stock = before,
                consumed = draw.quantity,
                "Stock short for consumed quantity, deducting what is on hand"
            );
        }

        let change = adjust_stock(tx, &draw.item.id.to_string(), Some(draw.item.category), -deducted)?;

        if crosses_reorder_level(change.before, change.after, draw.item.reorder_level) {
            let mut snapshot = draw.item.clone();
            snapshot.current_stock = change.after;
            if let Enqueued::Created(entry) = enqueue_snapshot(tx, &snapshot, now)? {
                reorders.push(entry);
            }
        }

        deductions.push(StockDeduction {
            item_id: draw.item.id,
            item_code: draw.item.code,
            category: draw.item.category,
            consumed: draw.quantity,
            deducted,
            before: change.before,
            after: change.after,
        });
    }

    let rate = match &job.employee_id {
        Some(employee) => load_employee(tx, &employee.to_string())?.and_then(|e| e.hourly_rate),
        None => None,
    };
    let active_hours = labor_hours(job.started_at, job.total_paused_milliseconds, now);
    let labor_cost = rate.map(|r| active_hours * r).unwrap_or(0.0);
    let total_cost = material_cost + labor_cost;

    tx.execute(
        "UPDATE jobs SET status = ?1, completed_at = ?2, material_cost = ?3, labor_cost = ?4,
         total_cost = ?5, issue_reason = NULL WHERE id = ?6",
        params![
            JobStatus::Complete,
            now,
            material_cost,
            labor_cost,
            total_cost,
            key
        ],
    )?;
    tx.touch(Collection::Jobs, &key);

    let job = load_job(tx, &key)?.ok_or(ShopError::JobNotFound(key))?;
    Ok(SettlementReport {
        job,
        costs: Some(JobCosts {
            material_cost,
            labor_cost,
            total_cost,
            active_hours,
        }),
        deductions,
        reorders,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, TimeZone};

    fn t0() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 1, 15, 8, 0, 0).unwrap()
    }

    #[test]
    fn test_labor_hours() {
        assert_eq!(labor_hours(Some(t0()), 0, t0() + Duration::hours(2)), 2.0);
        assert_eq!(
            labor_hours(Some(t0()), 30 * 60 * 1000, t0() + Duration::hours(2)),
            1.5
        );
        assert_eq!(labor_hours(None, 0, t0()), 0.0);
    }

    #[test]
    fn test_labor_hours_floors_paused_seconds() {
        // 1999 ms paused counts as one whole second
        let hours = labor_hours(Some(t0()), 1_999, t0() + Duration::seconds(3601));
        assert_eq!(hours, 1.0);
    }

    #[test]
    fn test_labor_hours_never_negative() {
        assert_eq!(
            labor_hours(Some(t0()), 10 * 60 * 1000, t0() + Duration::minutes(1)),
            0.0
        );
    }

    #[test]
    fn test_reorder_edge_trigger() {
        assert!(crosses_reorder_level(10, 7, 8));
        assert!(crosses_reorder_level(8, 7, 8));
        assert!(!crosses_reorder_level(7, 5, 8));
        assert!(!crosses_reorder_level(12, 8, 8));
        assert!(!crosses_reorder_level(5, 0, 0));
    }
}
