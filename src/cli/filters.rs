//! Value enums and filters shared by CLI commands
//!
//! Each maps onto the corresponding domain enum so clap can offer the
//! accepted values in `--help` and completions.

use clap::ValueEnum;

use crate::entities::item::ItemCategory;
use crate::entities::job::JobStatus;
use crate::entities::purchase::QueueStatus;

/// Job status as typed on the command line
#[derive(Debug, Clone, Copy, ValueEnum, PartialEq, Eq)]
pub enum CliJobStatus {
    Pending,
    InProgress,
    Paused,
    AwaitingQc,
    Complete,
    Issue,
    Archived,
}

impl From<CliJobStatus> for JobStatus {
    fn from(status: CliJobStatus) -> Self {
        match status {
            CliJobStatus::Pending => JobStatus::Pending,
            CliJobStatus::InProgress => JobStatus::InProgress,
            CliJobStatus::Paused => JobStatus::Paused,
            CliJobStatus::AwaitingQc => JobStatus::AwaitingQc,
            CliJobStatus::Complete => JobStatus::Complete,
            CliJobStatus::Issue => JobStatus::Issue,
            CliJobStatus::Archived => JobStatus::Archived,
        }
    }
}

/// Status filter for `job list`
#[derive(Debug, Clone, Copy, ValueEnum, Default, PartialEq, Eq)]
pub enum JobStatusFilter {
    Pending,
    InProgress,
    Paused,
    AwaitingQc,
    Complete,
    Issue,
    Archived,
    /// Everything not yet through QC - default
    #[default]
    Open,
    /// All statuses
    All,
}

impl JobStatusFilter {
    pub fn matches(&self, status: JobStatus) -> bool {
        match self {
            JobStatusFilter::Pending => status == JobStatus::Pending,
            JobStatusFilter::InProgress => status == JobStatus::InProgress,
            JobStatusFilter::Paused => status == JobStatus::Paused,
            JobStatusFilter::AwaitingQc => status == JobStatus::AwaitingQc,
            JobStatusFilter::Complete => status == JobStatus::Complete,
            JobStatusFilter::Issue => status == JobStatus::Issue,
            JobStatusFilter::Archived => status == JobStatus::Archived,
            JobStatusFilter::Open => !status.is_closed(),
            JobStatusFilter::All => true,
        }
    }
}

/// Inventory category as typed on the command line
#[derive(Debug, Clone, Copy, ValueEnum, PartialEq, Eq)]
pub enum CliCategory {
    Component,
    RawMaterial,
    WorkshopSupply,
    Product,
}

impl From<CliCategory> for ItemCategory {
    fn from(category: CliCategory) -> Self {
        match category {
            CliCategory::Component => ItemCategory::Component,
            CliCategory::RawMaterial => ItemCategory::RawMaterial,
            CliCategory::WorkshopSupply => ItemCategory::WorkshopSupply,
            CliCategory::Product => ItemCategory::Product,
        }
    }
}

/// Status filter for `queue list`
#[derive(Debug, Clone, Copy, ValueEnum, Default, PartialEq, Eq)]
pub enum QueueStatusFilter {
    Pending,
    Ordered,
    Completed,
    /// Pending and ordered - default
    #[default]
    Active,
    All,
}

impl QueueStatusFilter {
    pub fn matches(&self, status: QueueStatus) -> bool {
        match self {
            QueueStatusFilter::Pending => status == QueueStatus::Pending,
            QueueStatusFilter::Ordered => status == QueueStatus::Ordered,
            QueueStatusFilter::Completed => status == QueueStatus::Completed,
            QueueStatusFilter::Active => status.is_active(),
            QueueStatusFilter::All => true,
        }
    }

    /// Single status to query for, when the filter names exactly one
    pub fn as_status(&self) -> Option<QueueStatus> {
        match self {
            QueueStatusFilter::Pending => Some(QueueStatus::Pending),
            QueueStatusFilter::Ordered => Some(QueueStatus::Ordered),
            QueueStatusFilter::Completed => Some(QueueStatus::Completed),
            QueueStatusFilter::Active | QueueStatusFilter::All => None,
        }
    }
}
