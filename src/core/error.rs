//! Error taxonomy for workshop operations

use miette::Diagnostic;
use thiserror::Error;

use crate::core::store::StoreError;
use crate::entities::job::JobStatus;
use crate::entities::purchase::QueueStatus;

/// Errors surfaced by the ledger, purchase queue, job lifecycle and settlement engine
///
/// None of the operations that return these errors leave partially applied state.
#[derive(Debug, Error, Diagnostic)]
pub enum ShopError {
    #[error("Job not found: {0}")]
    #[diagnostic(code(shopfloor::job_not_found))]
    JobNotFound(String),

    #[error("Inventory item not found: {0}")]
    #[diagnostic(code(shopfloor::item_not_found))]
    ItemNotFound(String),

    #[error("Purchase request not found: {0}")]
    #[diagnostic(code(shopfloor::queue_item_not_found))]
    QueueItemNotFound(String),

    #[error("Supplier not found: {0}")]
    #[diagnostic(code(shopfloor::supplier_not_found))]
    SupplierNotFound(String),

    #[error("Employee not found: {0}")]
    #[diagnostic(code(shopfloor::employee_not_found))]
    EmployeeNotFound(String),

    #[error("Invalid quantity: {0} (must be greater than zero)")]
    #[diagnostic(code(shopfloor::invalid_quantity))]
    InvalidQuantity(i64),

    #[error("Unknown inventory category: '{0}'")]
    #[diagnostic(
        code(shopfloor::unknown_category),
        help("Valid categories: Component, Raw Material, Workshop Supply, Product")
    )]
    UnknownCategory(String),

    #[error("Invalid status transition: {from} → {to}")]
    #[diagnostic(
        code(shopfloor::invalid_transition),
        help("Complete and Issue are reached through a QC decision (approve/reject) on an Awaiting QC job")
    )]
    InvalidTransition { from: JobStatus, to: JobStatus },

    #[error("Job {job} is closed ({status}) and can no longer be modified")]
    #[diagnostic(code(shopfloor::job_closed))]
    JobClosed { job: String, status: JobStatus },

    #[error("Purchase request {id} is {actual}, expected {expected}")]
    #[diagnostic(code(shopfloor::wrong_queue_status))]
    WrongQueueStatus {
        id: String,
        expected: &'static str,
        actual: QueueStatus,
    },

    #[error("Item code already in use: {0}")]
    #[diagnostic(code(shopfloor::duplicate_code))]
    DuplicateCode(String),

    #[error("Invalid {field}: {message}")]
    #[diagnostic(code(shopfloor::validation))]
    Validation { field: String, message: String },

    #[error(transparent)]
    #[diagnostic(transparent)]
    Store(#[from] StoreError),
}

impl ShopError {
    /// Whether the failure is a store lock conflict that a fresh attempt may resolve
    pub fn is_conflict(&self) -> bool {
        match self {
            ShopError::Store(e) => e.is_busy(),
            _ => false,
        }
    }
}

impl From<rusqlite::Error> for ShopError {
    fn from(e: rusqlite::Error) -> Self {
        ShopError::Store(StoreError::Sqlite(e))
    }
}

impl From<serde_json::Error> for ShopError {
    fn from(e: serde_json::Error) -> Self {
        ShopError::Store(StoreError::Encode(e))
    }
}

/// Result alias for workshop operations
pub type ShopResult<T> = std::result::Result<T, ShopError>;
