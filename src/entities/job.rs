//! Job card entity - One unit of tracked production work

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};

use crate::core::entity::Entity;
use crate::core::identity::{EntityId, EntityPrefix};

/// Job card status
///
/// The serialized strings are read by external reporting and must not change.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub enum JobStatus {
    #[default]
    Pending,
    #[serde(rename = "In Progress")]
    InProgress,
    Paused,
    #[serde(rename = "Awaiting QC")]
    AwaitingQc,
    Complete,
    Issue,
    Archived,
}

impl JobStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            JobStatus::Pending => "Pending",
            JobStatus::InProgress => "In Progress",
            JobStatus::Paused => "Paused",
            JobStatus::AwaitingQc => "Awaiting QC",
            JobStatus::Complete => "Complete",
            JobStatus::Issue => "Issue",
            JobStatus::Archived => "Archived",
        }
    }

    pub fn all() -> &'static [JobStatus] {
        &[
            JobStatus::Pending,
            JobStatus::InProgress,
            JobStatus::Paused,
            JobStatus::AwaitingQc,
            JobStatus::Complete,
            JobStatus::Issue,
            JobStatus::Archived,
        ]
    }

    /// Whether the job has received a QC decision (or been archived)
    pub fn is_closed(&self) -> bool {
        matches!(
            self,
            JobStatus::Complete | JobStatus::Issue | JobStatus::Archived
        )
    }
}

impl std::fmt::Display for JobStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for JobStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized: String = s
            .chars()
            .filter(|c| !matches!(c, ' ' | '-' | '_'))
            .collect::<String>()
            .to_lowercase();
        match normalized.as_str() {
            "pending" => Ok(JobStatus::Pending),
            "inprogress" => Ok(JobStatus::InProgress),
            "paused" => Ok(JobStatus::Paused),
            "awaitingqc" => Ok(JobStatus::AwaitingQc),
            "complete" => Ok(JobStatus::Complete),
            "issue" => Ok(JobStatus::Issue),
            "archived" => Ok(JobStatus::Archived),
            _ => Err(format!("Unknown job status: {}", s)),
        }
    }
}

/// A material quantity consumed by a job
///
/// Either linked to a real inventory item through `item_id`, or a free-text
/// entry carrying its own `unit_price`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Consumable {
    pub item_id: String,

    pub quantity: u32,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub unit_price: Option<f64>,

    /// Category hint used to pick the inventory store
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,

    /// Display name for free-text entries
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
}

impl Consumable {
    pub fn new(item_id: impl Into<String>, quantity: u32) -> Self {
        Self {
            item_id: item_id.into(),
            quantity,
            unit_price: None,
            category: None,
            name: None,
        }
    }

    pub fn with_unit_price(mut self, price: f64) -> Self {
        self.unit_price = Some(price);
        self
    }

    pub fn with_category(mut self, category: impl Into<String>) -> Self {
        self.category = Some(category.into());
        self
    }

    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }
}

/// A job card
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct JobCard {
    pub id: EntityId,

    /// Human-readable job code (e.g., "JC-0007")
    pub job_code: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub part_id: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub department_id: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub employee_id: Option<EntityId>,

    pub status: JobStatus,

    pub quantity: u32,

    /// Estimated work time in minutes
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub estimated_time: Option<u32>,

    pub started_at: Option<DateTime<Utc>>,

    pub paused_at: Option<DateTime<Utc>>,

    pub completed_at: Option<DateTime<Utc>>,

    pub total_paused_milliseconds: i64,

    #[serde(default)]
    pub processed_consumables: Vec<Consumable>,

    pub material_cost: Option<f64>,

    pub labor_cost: Option<f64>,

    pub total_cost: Option<f64>,

    pub issue_reason: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,

    pub created_at: DateTime<Utc>,
}

impl JobCard {
    /// Create a new pending job card
    pub fn new(job_code: String, quantity: u32, now: DateTime<Utc>) -> Self {
        Self {
            id: EntityId::new(EntityPrefix::Job),
            job_code,
            part_id: None,
            department_id: None,
            employee_id: None,
            status: JobStatus::Pending,
            quantity,
            estimated_time: None,
            started_at: None,
            paused_at: None,
            completed_at: None,
            total_paused_milliseconds: 0,
            processed_consumables: Vec::new(),
            material_cost: None,
            labor_cost: None,
            total_cost: None,
            issue_reason: None,
            notes: None,
            created_at: now,
        }
    }

    /// Time spent actively working: `(completedAt - startedAt) - paused`, floored at zero
    ///
    /// Returns `None` until the job has both started and finished work.
    pub fn active_time(&self) -> Option<Duration> {
        let started = self.started_at?;
        let completed = self.completed_at?;
        let active = (completed - started) - Duration::milliseconds(self.total_paused_milliseconds);
        Some(active.max(Duration::zero()))
    }
}

impl Entity for JobCard {
    const PREFIX: EntityPrefix = EntityPrefix::Job;

    fn id(&self) -> &EntityId {
        &self.id
    }

    fn title(&self) -> &str {
        &self.job_code
    }
}
