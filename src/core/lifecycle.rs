//! Job lifecycle - status transitions and their timestamp side effects
//!
//! ```text
//! Pending → In Progress ⇄ Paused → Awaiting QC → { Complete | Issue } → Archived
//! ```
//!
//! Complete and Issue are entered only through settlement. Pause time is
//! accumulated with an in-place SQL increment so concurrent resumes add up.

use chrono::{DateTime, Utc};
use rusqlite::types::Type;
use rusqlite::{params, Connection, OptionalExtension, Row};

use crate::core::directory::load_employee;
use crate::core::error::{ShopError, ShopResult};
use crate::core::identity::EntityId;
use crate::core::store::{Collection, Store, Tx};
use crate::entities::item::ItemCategory;
use crate::entities::job::{Consumable, JobCard, JobStatus};

const JOB_COLUMNS: &str = "id, job_code, part_id, department_id, employee_id, status, quantity, \
     estimated_time, started_at, paused_at, completed_at, total_paused_ms, consumables, \
     material_cost, labor_cost, total_cost, issue_reason, notes, created_at";

const JOB_CODE_COUNTER: &str = "job_code";

fn job_from_row(row: &Row<'_>) -> rusqlite::Result<JobCard> {
    let consumables: String = row.get(12)?;
    let processed_consumables = serde_json::from_str(&consumables)
        .map_err(|e| rusqlite::Error::FromSqlConversionFailure(12, Type::Text, Box::new(e)))?;

    Ok(JobCard {
        id: row.get(0)?,
        job_code: row.get(1)?,
        part_id: row.get(2)?,
        department_id: row.get(3)?,
        employee_id: row.get(4)?,
        status: row.get(5)?,
        quantity: row.get(6)?,
        estimated_time: row.get(7)?,
        started_at: row.get(8)?,
        paused_at: row.get(9)?,
        completed_at: row.get(10)?,
        total_paused_milliseconds: row.get(11)?,
        processed_consumables,
        material_cost: row.get(13)?,
        labor_cost: row.get(14)?,
        total_cost: row.get(15)?,
        issue_reason: row.get(16)?,
        notes: row.get(17)?,
        created_at: row.get(18)?,
    })
}

pub(crate) fn load_job(conn: &Connection, id: &str) -> ShopResult<Option<JobCard>> {
    let sql = format!("SELECT {JOB_COLUMNS} FROM jobs WHERE id = ?1");
    Ok(conn.query_row(&sql, params![id], job_from_row).optional()?)
}

fn require_job(conn: &Connection, id: &EntityId) -> ShopResult<JobCard> {
    load_job(conn, &id.to_string())?.ok_or_else(|| ShopError::JobNotFound(id.to_string()))
}

/// Check if a manual status change is allowed
pub fn is_valid_transition(from: JobStatus, to: JobStatus) -> bool {
    matches!(
        (from, to),
        // Forward work
        (JobStatus::Pending, JobStatus::InProgress)
            | (JobStatus::InProgress, JobStatus::Paused)
            | (JobStatus::Paused, JobStatus::InProgress)
            | (JobStatus::InProgress, JobStatus::AwaitingQc)
            | (JobStatus::Paused, JobStatus::AwaitingQc)
            // Sent back
            | (JobStatus::InProgress, JobStatus::Pending)
            | (JobStatus::AwaitingQc, JobStatus::InProgress)
            // Rework after a failed QC
            | (JobStatus::Issue, JobStatus::InProgress)
            // Closed jobs
            | (JobStatus::Complete, JobStatus::Archived)
            | (JobStatus::Issue, JobStatus::Archived)
    )
}

/// Statuses reachable from `current` without a QC decision
pub fn allowed_transitions(current: JobStatus) -> Vec<JobStatus> {
    match current {
        JobStatus::Pending => vec![JobStatus::InProgress],
        JobStatus::InProgress => vec![JobStatus::Paused, JobStatus::AwaitingQc, JobStatus::Pending],
        JobStatus::Paused => vec![JobStatus::InProgress, JobStatus::AwaitingQc],
        JobStatus::AwaitingQc => vec![JobStatus::InProgress],
        JobStatus::Complete => vec![JobStatus::Archived],
        JobStatus::Issue => vec![JobStatus::InProgress, JobStatus::Archived],
        JobStatus::Archived => vec![],
    }
}

/// Attributes for a new job card
#[derive(Debug, Clone, Default)]
pub struct NewJob {
    pub quantity: u32,
    pub part_id: Option<String>,
    pub department_id: Option<String>,
    pub employee_id: Option<EntityId>,
    pub estimated_time: Option<u32>,
    pub notes: Option<String>,
    pub consumables: Vec<Consumable>,
}

fn check_consumable(consumable: &Consumable) -> ShopResult<()> {
    if consumable.quantity == 0 {
        return Err(ShopError::InvalidQuantity(0));
    }
    if let Some(hint) = &consumable.category {
        let category = hint.parse::<ItemCategory>()?;
        if !ItemCategory::CONSUMABLE.contains(&category) {
            return Err(ShopError::Validation {
                field: "category".to_string(),
                message: format!("{} items cannot be consumed by a job", category),
            });
        }
    }
    Ok(())
}

fn next_job_code(tx: &Tx<'_>) -> ShopResult<String> {
    let value: i64 = tx.query_row(
        "INSERT INTO counters (name, value) VALUES (?1, 1)
         ON CONFLICT(name) DO UPDATE SET value = value + 1
         RETURNING value",
        params![JOB_CODE_COUNTER],
        |row| row.get(0),
    )?;
    Ok(format!("JC-{:04}", value))
}

/// Job card state machine over the record store
pub struct JobLifecycle<'a> {
    store: &'a Store,
}

impl<'a> JobLifecycle<'a> {
    pub fn new(store: &'a Store) -> Self {
        Self { store }
    }

    /// Create a pending job with the next job code
    pub fn create_job(&self, new: NewJob, now: DateTime<Utc>) -> ShopResult<JobCard> {
        if new.quantity == 0 {
            return Err(ShopError::InvalidQuantity(0));
        }
        for consumable in &new.consumables {
            check_consumable(consumable)?;
        }

        let job = self.store.transact(|tx| {
            if let Some(employee) = &new.employee_id {
                if load_employee(tx, &employee.to_string())?.is_none() {
                    return Err(ShopError::EmployeeNotFound(employee.to_string()));
                }
            }

            let mut job = JobCard::new(next_job_code(tx)?, new.quantity, now);
            job.part_id = new.part_id.clone();
            job.department_id = new.department_id.clone();
            job.employee_id = new.employee_id;
            job.estimated_time = new.estimated_time;
            job.notes = new.notes.clone();
            job.processed_consumables = new.consumables.clone();

            let consumables = serde_json::to_string(&job.processed_consumables)?;
            let sql = format!(
                "INSERT INTO jobs ({JOB_COLUMNS})
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13, ?14, ?15, ?16, ?17, ?18, ?19)"
            );
            tx.execute(
                &sql,
                params![
                    job.id,
                    job.job_code,
                    job.part_id,
                    job.department_id,
                    job.employee_id,
                    job.status,
                    job.quantity,
                    job.estimated_time,
                    job.started_at,
                    job.paused_at,
                    job.completed_at,
                    job.total_paused_milliseconds,
                    consumables,
                    job.material_cost,
                    job.labor_cost,
                    job.total_cost,
                    job.issue_reason,
                    job.notes,
                    job.created_at,
                ],
            )?;
            tx.touch(Collection::Jobs, job.id);
            Ok(job)
        })?;

        tracing::info!(job = %job.job_code, id = %job.id, "Job created");
        Ok(job)
    }

    /// Move a job to `new`, applying the timestamp side effects of the move
    pub fn set_status(
        &self,
        id: &EntityId,
        new: JobStatus,
        now: DateTime<Utc>,
    ) -> ShopResult<JobCard> {
        let job = self.store.transact(|tx| {
            let job = require_job(tx, id)?;
            let from = job.status;
            if !is_valid_transition(from, new) {
                return Err(ShopError::InvalidTransition { from, to: new });
            }

            let key = job.id.to_string();

            if from == JobStatus::Paused {
                let paused_ms = job
                    .paused_at
                    .map(|paused| (now - paused).num_milliseconds().max(0))
                    .unwrap_or(0);
                tx.execute(
                    "UPDATE jobs SET total_paused_ms = total_paused_ms + ?1, paused_at = NULL
                     WHERE id = ?2",
                    params![paused_ms, key],
                )?;
            }

            match new {
                JobStatus::InProgress => {
                    tx.execute(
                        "UPDATE jobs SET started_at = COALESCE(started_at, ?1) WHERE id = ?2",
                        params![now, key],
                    )?;
                }
                JobStatus::Paused => {
                    tx.execute(
                        "UPDATE jobs SET paused_at = ?1 WHERE id = ?2",
                        params![now, key],
                    )?;
                }
                JobStatus::AwaitingQc => {
                    tx.execute(
                        "UPDATE jobs SET completed_at = ?1 WHERE id = ?2",
                        params![now, key],
                    )?;
                }
                _ => {}
            }

            tx.execute(
                "UPDATE jobs SET status = ?1 WHERE id = ?2",
                params![new, key],
            )?;
            tx.touch(Collection::Jobs, &key);

            require_job(tx, id)
        })?;

        tracing::info!(job = %job.job_code, status = %job.status, "Job status changed");
        Ok(job)
    }

    /// Record material used by an open job
    pub fn add_consumable(&self, id: &EntityId, consumable: Consumable) -> ShopResult<JobCard> {
        check_consumable(&consumable)?;
        self.store.transact(|tx| {
            let mut job = require_job(tx, id)?;
            if job.status.is_closed() {
                return Err(ShopError::JobClosed {
                    job: job.job_code.clone(),
                    status: job.status,
                });
            }
            job.processed_consumables.push(consumable.clone());
            let consumables = serde_json::to_string(&job.processed_consumables)?;
            tx.execute(
                "UPDATE jobs SET consumables = ?1 WHERE id = ?2",
                params![consumables, job.id],
            )?;
            tx.touch(Collection::Jobs, job.id);
            Ok(job)
        })
    }

    /// Archive a completed or failed job
    pub fn archive(&self, id: &EntityId, now: DateTime<Utc>) -> ShopResult<JobCard> {
        self.set_status(id, JobStatus::Archived, now)
    }

    pub fn get_job(&self, id: &EntityId) -> ShopResult<Option<JobCard>> {
        load_job(self.store.conn(), &id.to_string())
    }

    /// Resolve a job by full ID or job code
    pub fn find_job(&self, id_or_code: &str) -> ShopResult<JobCard> {
        let found = match id_or_code.parse::<EntityId>() {
            Ok(id) => self.get_job(&id)?,
            Err(_) => {
                let sql = format!("SELECT {JOB_COLUMNS} FROM jobs WHERE job_code = ?1 COLLATE NOCASE");
                self.store
                    .conn()
                    .query_row(&sql, params![id_or_code], job_from_row)
                    .optional()?
            }
        };
        found.ok_or_else(|| ShopError::JobNotFound(id_or_code.to_string()))
    }

    /// List jobs in creation order
    pub fn list_jobs(&self, status: Option<JobStatus>) -> ShopResult<Vec<JobCard>> {
        let conn = self.store.conn();
        let jobs = match status {
            Some(status) => {
                let sql =
                    format!("SELECT {JOB_COLUMNS} FROM jobs WHERE status = ?1 ORDER BY job_code");
                let mut stmt = conn.prepare(&sql)?;
                let rows = stmt.query_map(params![status], job_from_row)?;
                rows.collect::<Result<Vec<_>, _>>()?
            }
            None => {
                let sql = format!("SELECT {JOB_COLUMNS} FROM jobs ORDER BY job_code");
                let mut stmt = conn.prepare(&sql)?;
                let rows = stmt.query_map([], job_from_row)?;
                rows.collect::<Result<Vec<_>, _>>()?
            }
        };
        Ok(jobs)
    }
}
